//! Native-side GUI layer: a wry webview showing the widget HTML.
//!
//! The webview is created as a child of the winit window and communicates
//! with the widget via a minimal JSON IPC bridge.

/// Panel controller syncing the webview with the widget.
pub(crate) mod panel;
/// Wry webview creation, IPC handler, and view push helper.
pub mod webview;
