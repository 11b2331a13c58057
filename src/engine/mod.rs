//! Rendering engine seam and the built-in scene engine.
//!
//! The widget never draws by itself. It hands a downloaded structure to a
//! [`RenderEngine`], which owns the scene bound to the display surface.
//! Replacing the structure or the render mode always tears the old scene
//! down before the new one is built, so two scenes never overlap.
//!
//! [`SceneEngine`] is the default engine: it parses PDB text, generates
//! mode-specific geometry, colors it by secondary-structure succession and
//! places the camera along the structure's principal axes.

/// Camera placement (principal axes, auto zoom, slab).
pub mod camera;
/// Per-residue coloring policies.
pub mod color;
/// SVG projection of a scene through its camera.
pub mod draw;
/// Scene geometry per render mode.
pub mod scene;
/// Secondary structure assignment.
pub mod secondary;
/// PDB parsing.
pub mod structure;

pub use scene::{Scene, SceneSummary};
pub use structure::Structure;

use crate::error::StructviewError;
use crate::options::{RenderMode, ViewerOptions};

/// Owner of the scene drawn on the display surface.
pub trait RenderEngine {
    /// Drop the current scene, leaving the surface empty.
    fn teardown(&mut self);

    /// Build a scene for `payload` (structure file text) under `mode`.
    ///
    /// Callers tear the previous scene down first.
    fn build(
        &mut self,
        id: &str,
        payload: &str,
        mode: RenderMode,
        options: &ViewerOptions,
    ) -> Result<SceneSummary, StructviewError>;

    /// Scene currently on the surface, if any.
    fn scene(&self) -> Option<&Scene>;
}

/// CPU-side engine producing [`Scene`]s.
#[derive(Debug, Default)]
pub struct SceneEngine {
    scene: Option<Scene>,
    builds: u64,
}

impl SceneEngine {
    /// Create an engine with an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scenes built since creation.
    #[must_use]
    pub fn builds(&self) -> u64 {
        self.builds
    }
}

impl RenderEngine for SceneEngine {
    fn teardown(&mut self) {
        if let Some(old) = self.scene.take() {
            log::debug!("tearing down scene for {} ({})", old.id, old.mode);
        }
    }

    fn build(
        &mut self,
        id: &str,
        payload: &str,
        mode: RenderMode,
        options: &ViewerOptions,
    ) -> Result<SceneSummary, StructviewError> {
        if self.scene.is_some() {
            log::warn!("build for {id} without teardown; replacing scene");
            self.teardown();
        }
        let structure = Structure::parse(payload)?;
        let scene = Scene::build(id, &structure, mode, options);
        let summary = scene.summary();
        log::info!(
            "built {mode} scene for {id}: {} atoms, {} copies",
            summary.atoms,
            summary.copies
        );
        self.scene = Some(scene);
        self.builds += 1;
        Ok(summary)
    }

    fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }
}
