//! Crate-level error types.

use std::fmt;

/// Message shown when a lookup fails without a service-supplied message.
pub const RESOLVE_FALLBACK_MESSAGE: &str =
    "Could not download PDB file, please try again later!";

/// Errors produced by the structview crate.
#[derive(Debug)]
pub enum StructviewError {
    /// Transport-level HTTP failure (connection, status code, body read).
    Http(String),
    /// A lookup service answered with its own human-readable message.
    Message(String),
    /// A response body could not be decoded into the expected shape.
    Decode(String),
    /// The gene lookup returned no protein records.
    NoProteins {
        /// Gene identifier that was looked up.
        gene_id: String,
    },
    /// The description endpoint returned an empty record list.
    EmptyDescription {
        /// Structure identifier that was described.
        id: String,
    },
    /// Structure payload could not be turned into a scene.
    StructureParse(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl StructviewError {
    /// Text shown to the user for a failed resolve.
    ///
    /// Only a message supplied by the lookup service passes through
    /// verbatim; every other failure collapses to
    /// [`RESOLVE_FALLBACK_MESSAGE`].
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Message(msg) => msg.clone(),
            _ => RESOLVE_FALLBACK_MESSAGE.to_owned(),
        }
    }
}

impl fmt::Display for StructviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(msg) => write!(f, "HTTP error: {msg}"),
            Self::Message(msg) => f.write_str(msg),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
            Self::NoProteins { gene_id } => {
                write!(f, "no proteins found for gene {gene_id}")
            }
            Self::EmptyDescription { id } => {
                write!(f, "no description available for {id}")
            }
            Self::StructureParse(msg) => {
                write!(f, "structure parse error: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for StructviewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StructviewError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StructviewError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
