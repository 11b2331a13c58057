// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Gene-to-structure browser.
//!
//! Given a gene identifier, structview resolves the PDB structures of the
//! gene's first protein, lists them with a search filter, renders the
//! selected one in a chosen mode and shows its deposited title.
//!
//! # Key entry points
//!
//! - [`widget::Widget`] - the runtime owning state, engine and lookups
//! - [`state::ViewState`] - immutable view state and its reducer
//! - [`view::ViewModel`] - what the widget shows, rendered to HTML
//! - [`engine::SceneEngine`] - PDB parsing and scene construction
//! - [`options::Options`] - runtime configuration (viewer, endpoints)
//!
//! # Architecture
//!
//! Every change goes through [`state::ViewState::reduce`], which returns
//! the next state plus effects. The widget runs remote effects on
//! background threads ([`resolver`], [`loader`], [`detail`] over a
//! [`service::Backend`]) and feeds their completions back as actions.
//! Completions are tagged with per-role tickets so only the latest request
//! of each kind is applied.

pub mod detail;
pub mod engine;
pub mod error;
#[cfg(feature = "gui")]
pub mod gui;
pub mod loader;
pub mod options;
pub mod resolver;
pub mod service;
pub mod state;
pub mod view;
#[cfg(feature = "gui")]
pub mod viewer;
pub mod widget;

pub use error::StructviewError;
#[cfg(feature = "gui")]
pub use viewer::{Viewer, ViewerBuilder, DEFAULT_SERVICE_URL};
pub use widget::Widget;
