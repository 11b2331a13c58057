use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Molecular depiction style.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum RenderMode {
    /// Smoothed Cα line.
    Sline,
    /// Bonds between atoms as lines.
    Lines,
    /// Cα trace as cylinders.
    Trace,
    /// Cα trace as lines.
    LineTrace,
    /// Secondary-structure cartoon.
    #[default]
    Cartoon,
    /// Smoothed Cα tube.
    Tube,
    /// Space-filling atom spheres.
    Spheres,
}

impl RenderMode {
    /// Every mode, in selector order.
    pub const ALL: [Self; 7] = [
        Self::Sline,
        Self::Lines,
        Self::Trace,
        Self::LineTrace,
        Self::Cartoon,
        Self::Tube,
        Self::Spheres,
    ];

    /// Wire name used by the selector and in TOML.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sline => "sline",
            Self::Lines => "lines",
            Self::Trace => "trace",
            Self::LineTrace => "lineTrace",
            Self::Cartoon => "cartoon",
            Self::Tube => "tube",
            Self::Spheres => "spheres",
        }
    }

    /// Whether the mode is drawn from the Cα backbone only.
    #[must_use]
    pub fn is_backbone(self) -> bool {
        !matches!(self, Self::Lines | Self::Spheres)
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown render mode: {s}"))
    }
}

/// Tessellation quality of the generated scene.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Coarse splines.
    Low,
    /// Balanced detail.
    #[default]
    Medium,
    /// Fine splines.
    High,
}

impl Quality {
    /// Spline subdivisions between consecutive Cα atoms.
    #[must_use]
    pub fn spline_detail(self) -> usize {
        match self {
            Self::Low => 3,
            Self::Medium => 5,
            Self::High => 9,
        }
    }
}

/// How near/far clipping planes are chosen.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SlabMode {
    /// Fit the slab to the structure's extent after every build.
    #[default]
    Auto,
    /// Keep the camera's configured near/far planes.
    Fixed,
}

/// Scene coloring policy.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// Gradient over helices and strands in order of succession; coil grey.
    #[default]
    SsSuccession,
    /// One gradient step per chain.
    Chain,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Viewer", inline)]
#[serde(default)]
/// Options handed to the rendering engine for every scene it builds.
pub struct ViewerOptions {
    /// Tessellation quality.
    #[schemars(title = "Quality")]
    pub quality: Quality,
    /// Whether the surface is drawn with antialiasing.
    #[schemars(title = "Antialias")]
    pub antialias: bool,
    /// Whether silhouettes are outlined.
    #[schemars(title = "Outline")]
    pub outline: bool,
    /// Clipping-plane policy.
    #[schemars(title = "Slab Mode")]
    pub slab_mode: SlabMode,
    /// Mode selected when the widget mounts.
    #[schemars(title = "Render Mode")]
    pub render_mode: RenderMode,
    /// Coloring policy.
    #[schemars(title = "Color")]
    pub color: ColorScheme,
    /// Whether biological assembly copies are shown.
    #[schemars(title = "Show Related")]
    pub show_related: bool,
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0))]
    pub fovy: f32,
    /// Near clipping plane distance when the slab is fixed.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance when the slab is fixed.
    #[schemars(skip)]
    pub zfar: f32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            quality: Quality::Medium,
            antialias: true,
            outline: false,
            slab_mode: SlabMode::Auto,
            render_mode: RenderMode::Cartoon,
            color: ColorScheme::SsSuccession,
            show_related: true,
            fovy: 45.0,
            znear: 5.0,
            zfar: 2000.0,
        }
    }
}
