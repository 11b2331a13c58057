//! Human-readable details per structure.

use crate::error::StructviewError;
use crate::service::Backend;

/// Title of structure `id`: the first description record's title.
///
/// # Errors
///
/// Propagates lookup failures; an empty record list yields
/// [`StructviewError::EmptyDescription`].
pub fn fetch_title(
    backend: &dyn Backend,
    id: &str,
) -> Result<String, StructviewError> {
    backend
        .describe_structure(id)?
        .into_iter()
        .next()
        .map(|record| record.title)
        .ok_or_else(|| StructviewError::EmptyDescription { id: id.to_owned() })
}
