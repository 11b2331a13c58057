//! Structure download and hand-off to the rendering engine.

use crate::engine::{RenderEngine, SceneSummary};
use crate::error::StructviewError;
use crate::options::{RenderMode, ViewerOptions};
use crate::service::Backend;

/// Download the structure file for `id`.
///
/// # Errors
///
/// Propagates the backend failure.
pub fn download(
    backend: &dyn Backend,
    id: &str,
) -> Result<String, StructviewError> {
    let payload = backend.download_structure(id)?;
    log::debug!("downloaded {id}: {} bytes", payload.len());
    Ok(payload)
}

/// Replace the engine's scene with `payload` rendered under `mode`.
///
/// The previous scene is torn down before the new one is built, even when
/// the build then fails.
///
/// # Errors
///
/// Returns the engine's build error; the surface is left empty.
pub fn present<E: RenderEngine + ?Sized>(
    engine: &mut E,
    id: &str,
    payload: &str,
    mode: RenderMode,
    options: &ViewerOptions,
) -> Result<SceneSummary, StructviewError> {
    engine.teardown();
    engine.build(id, payload, mode, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::tiny_pdb;
    use crate::engine::SceneEngine;
    use crate::service::mock::{Call, MockBackend};

    #[test]
    fn download_hits_backend_once() {
        let backend = MockBackend::with_ids(&["1ABC"]);
        let payload = download(&backend, "1ABC").unwrap();
        assert_eq!(payload, tiny_pdb());
        assert_eq!(backend.calls(), vec![Call::Download("1ABC".into())]);
    }

    #[test]
    fn present_replaces_scene() {
        let mut engine = SceneEngine::new();
        let opts = ViewerOptions::default();
        let _ = present(&mut engine, "1ABC", &tiny_pdb(), RenderMode::Tube, &opts)
            .unwrap();
        let summary =
            present(&mut engine, "2XYZ", &tiny_pdb(), RenderMode::Lines, &opts)
                .unwrap();
        assert_eq!(summary.id, "2XYZ");
        assert_eq!(engine.scene().map(|s| s.id.as_str()), Some("2XYZ"));
    }

    #[test]
    fn failed_present_clears_old_scene() {
        let mut engine = SceneEngine::new();
        let opts = ViewerOptions::default();
        let _ = present(&mut engine, "1ABC", &tiny_pdb(), RenderMode::Tube, &opts)
            .unwrap();
        assert!(present(&mut engine, "0BAD", "", RenderMode::Tube, &opts).is_err());
        assert!(engine.scene().is_none());
    }
}
