//! Mode-specific scene geometry.
//!
//! A [`Scene`] is the drawable description of one structure under one
//! render mode: a flat list of primitives, the assembly copies to instance
//! them with, and the camera placement. Turning primitives into GPU
//! buffers is left to whatever surface hosts the scene.

use glam::{Mat4, Vec3};
use serde::Serialize;

use super::camera::CameraPlacement;
use super::color::{residue_colors, Rgb};
use super::secondary::SsKind;
use super::structure::Structure;
use crate::options::{Quality, RenderMode, ViewerOptions};

/// Bond length cutoff when deriving connectivity from distances.
const MAX_BOND: f32 = 1.9;
/// Cylinder radius of the `trace` mode.
const TRACE_RADIUS: f32 = 0.3;
/// Radius of the `tube` mode.
const TUBE_RADIUS: f32 = 0.35;
/// Ligand sphere radius drawn next to backbone-only modes.
const LIGAND_RADIUS: f32 = 0.4;

/// A drawable element.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Single-pixel line segment.
    Line {
        /// Start point.
        from: Vec3,
        /// End point.
        to: Vec3,
        /// Segment color.
        color: Rgb,
    },
    /// Capped cylinder.
    Cylinder {
        /// Start point.
        from: Vec3,
        /// End point.
        to: Vec3,
        /// Radius in Å.
        radius: f32,
        /// Cylinder color.
        color: Rgb,
    },
    /// Sphere.
    Sphere {
        /// Center.
        center: Vec3,
        /// Radius in Å.
        radius: f32,
        /// Sphere color.
        color: Rgb,
    },
    /// Smooth polyline through spline samples.
    Polyline {
        /// Sample points.
        points: Vec<Vec3>,
        /// One color per sample.
        colors: Vec<Rgb>,
    },
    /// Swept tube with per-sample radius.
    Tube {
        /// Sample points.
        points: Vec<Vec3>,
        /// One radius per sample.
        radii: Vec<f32>,
        /// One color per sample.
        colors: Vec<Rgb>,
    },
}

/// An instanced copy of (part of) the structure.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneCopy {
    /// Chains drawn by this copy; empty means all.
    pub chains: Vec<char>,
    /// World transform of the copy.
    pub transform: Mat4,
}

/// Surface settings fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSettings {
    /// Tessellation quality.
    pub quality: Quality,
    /// Antialiasing on or off.
    pub antialias: bool,
    /// Silhouette outline on or off.
    pub outline: bool,
}

/// Built scene for one structure under one render mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Structure identifier the scene was built for.
    pub id: String,
    /// Render mode the primitives were generated for.
    pub mode: RenderMode,
    /// Surface settings.
    pub surface: SurfaceSettings,
    /// Geometry in structure coordinates, tagged with the chain it belongs
    /// to.
    pub primitives: Vec<(char, Primitive)>,
    /// Copies to draw; always at least one.
    pub copies: Vec<SceneCopy>,
    /// Camera framing every copy.
    pub camera: CameraPlacement,
    /// Number of atoms in the source structure.
    pub atom_count: usize,
    /// Number of residues in the source structure.
    pub residue_count: usize,
    /// Number of chains in the source structure.
    pub chain_count: usize,
}

/// Serializable digest of a [`Scene`] for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    /// Structure identifier.
    pub id: String,
    /// Render mode.
    pub mode: RenderMode,
    /// Atom count.
    pub atoms: usize,
    /// Residue count.
    pub residues: usize,
    /// Chain count.
    pub chains: usize,
    /// Assembly copies drawn.
    pub copies: usize,
    /// Primitive count of one copy.
    pub primitives: usize,
    /// Camera distance from the target.
    pub camera_distance: f32,
    /// Bounding-sphere radius.
    pub radius: f32,
}

impl Scene {
    /// Build the scene for `structure`.
    #[must_use]
    pub fn build(
        id: &str,
        structure: &Structure,
        mode: RenderMode,
        options: &ViewerOptions,
    ) -> Self {
        let colors = residue_colors(structure, options.color);
        let builder = Builder {
            structure,
            colors: &colors,
            detail: options.quality.spline_detail(),
        };
        let primitives = match mode {
            RenderMode::Lines => builder.lines(),
            RenderMode::Spheres => builder.spheres(),
            RenderMode::Trace => builder.trace(),
            RenderMode::LineTrace => builder.line_trace(),
            RenderMode::Sline => builder.sline(),
            RenderMode::Tube => builder.tube(|_| TUBE_RADIUS),
            RenderMode::Cartoon => builder.tube(cartoon_radius),
        };
        let mut primitives = primitives;
        if mode.is_backbone() {
            primitives.extend(builder.ligands());
        }

        let copies = if options.show_related && !structure.assembly.is_empty()
        {
            structure
                .assembly
                .iter()
                .map(|op| SceneCopy {
                    chains: op.chains.clone(),
                    transform: op.matrix,
                })
                .collect()
        } else {
            vec![SceneCopy {
                chains: Vec::new(),
                transform: Mat4::IDENTITY,
            }]
        };

        let framed = framed_positions(structure, &copies);
        let camera = CameraPlacement::frame(&framed, options);

        Self {
            id: id.to_owned(),
            mode,
            surface: SurfaceSettings {
                quality: options.quality,
                antialias: options.antialias,
                outline: options.outline,
            },
            primitives,
            copies,
            camera,
            atom_count: structure.atoms.len(),
            residue_count: structure.residues.len(),
            chain_count: structure.chains().len(),
        }
    }

    /// Digest for display.
    #[must_use]
    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            id: self.id.clone(),
            mode: self.mode,
            atoms: self.atom_count,
            residues: self.residue_count,
            chains: self.chain_count,
            copies: self.copies.len(),
            primitives: self.primitives.len(),
            camera_distance: self.camera.distance,
            radius: self.camera.radius,
        }
    }
}

fn cartoon_radius(ss: SsKind) -> f32 {
    match ss {
        SsKind::Helix => 1.2,
        SsKind::Strand => 1.0,
        SsKind::Coil => 0.3,
    }
}

/// Every atom position as drawn by every copy.
fn framed_positions(structure: &Structure, copies: &[SceneCopy]) -> Vec<Vec3> {
    let mut out = Vec::new();
    for copy in copies {
        for residue in &structure.residues {
            if !copy.chains.is_empty() && !copy.chains.contains(&residue.chain)
            {
                continue;
            }
            out.extend(
                structure.atoms[residue.first_atom..residue.end_atom]
                    .iter()
                    .map(|a| copy.transform.transform_point3(a.position)),
            );
        }
    }
    out
}

struct Builder<'a> {
    structure: &'a Structure,
    colors: &'a [Rgb],
    detail: usize,
}

impl Builder<'_> {
    /// Bonds inferred from distance within residues and across peptide
    /// links. Waters are skipped.
    fn lines(&self) -> Vec<(char, Primitive)> {
        let atoms = &self.structure.atoms;
        let mut out = Vec::new();
        let mut prev_c: Option<(char, usize)> = None;

        for (ri, residue) in self.structure.residues.iter().enumerate() {
            if residue.name == "HOH" {
                continue;
            }
            let color = self.colors[ri];
            let range = residue.first_atom..residue.end_atom;
            for i in range.clone() {
                for j in (i + 1)..residue.end_atom {
                    if atoms[i].position.distance(atoms[j].position) <= MAX_BOND
                    {
                        out.push((
                            residue.chain,
                            Primitive::Line {
                                from: atoms[i].position,
                                to: atoms[j].position,
                                color,
                            },
                        ));
                    }
                }
            }
            let n = range.clone().find(|&i| atoms[i].name == "N");
            if let (Some((chain, c)), Some(n)) = (prev_c, n) {
                if chain == residue.chain
                    && atoms[c].position.distance(atoms[n].position) <= MAX_BOND
                {
                    out.push((
                        residue.chain,
                        Primitive::Line {
                            from: atoms[c].position,
                            to: atoms[n].position,
                            color,
                        },
                    ));
                }
            }
            prev_c = range
                .clone()
                .find(|&i| atoms[i].name == "C")
                .map(|c| (residue.chain, c));
        }
        out
    }

    fn spheres(&self) -> Vec<(char, Primitive)> {
        let atoms = &self.structure.atoms;
        let mut out = Vec::new();
        for (ri, residue) in self.structure.residues.iter().enumerate() {
            if residue.name == "HOH" {
                continue;
            }
            for atom in &atoms[residue.first_atom..residue.end_atom] {
                out.push((
                    residue.chain,
                    Primitive::Sphere {
                        center: atom.position,
                        radius: vdw_radius(&atom.element),
                        color: self.colors[ri],
                    },
                ));
            }
        }
        out
    }

    fn trace(&self) -> Vec<(char, Primitive)> {
        let mut out = Vec::new();
        for (chain, points, colors) in self.segments() {
            for (k, (&p, &color)) in points.iter().zip(&colors).enumerate() {
                out.push((
                    chain,
                    Primitive::Sphere {
                        center: p,
                        radius: TRACE_RADIUS,
                        color,
                    },
                ));
                if let Some(&next) = points.get(k + 1) {
                    out.push((
                        chain,
                        Primitive::Cylinder {
                            from: p,
                            to: next,
                            radius: TRACE_RADIUS,
                            color,
                        },
                    ));
                }
            }
        }
        out
    }

    fn line_trace(&self) -> Vec<(char, Primitive)> {
        let mut out = Vec::new();
        for (chain, points, colors) in self.segments() {
            for (pair, &color) in points.windows(2).zip(&colors) {
                out.push((
                    chain,
                    Primitive::Line {
                        from: pair[0],
                        to: pair[1],
                        color,
                    },
                ));
            }
        }
        out
    }

    fn sline(&self) -> Vec<(char, Primitive)> {
        self.segments()
            .into_iter()
            .filter(|(_, points, _)| points.len() >= 2)
            .map(|(chain, points, colors)| {
                let (points, owners) = catmull_rom(&points, self.detail);
                let colors = owners.iter().map(|&k| colors[k]).collect();
                (chain, Primitive::Polyline { points, colors })
            })
            .collect()
    }

    fn tube(&self, radius_of: fn(SsKind) -> f32) -> Vec<(char, Primitive)> {
        let mut out = Vec::new();
        for segment in self.structure.backbone_segments() {
            if segment.len() < 2 {
                continue;
            }
            let chain = self.structure.residues[segment[0]].chain;
            let ca = self.ca_positions(&segment);
            let (points, owners) = catmull_rom(&ca, self.detail);
            let residue_at = |k: usize| segment[k];
            out.push((
                chain,
                Primitive::Tube {
                    radii: owners
                        .iter()
                        .map(|&k| radius_of(self.structure.residues[residue_at(k)].ss))
                        .collect(),
                    colors: owners.iter().map(|&k| self.colors[residue_at(k)]).collect(),
                    points,
                },
            ));
        }
        out
    }

    /// Non-water hetero atoms as small spheres.
    fn ligands(&self) -> Vec<(char, Primitive)> {
        let atoms = &self.structure.atoms;
        let mut out = Vec::new();
        for (ri, residue) in self.structure.residues.iter().enumerate() {
            if residue.name == "HOH" {
                continue;
            }
            for atom in &atoms[residue.first_atom..residue.end_atom] {
                if atom.hetero {
                    out.push((
                        residue.chain,
                        Primitive::Sphere {
                            center: atom.position,
                            radius: LIGAND_RADIUS,
                            color: self.colors[ri],
                        },
                    ));
                }
            }
        }
        out
    }

    /// `(chain, Cα positions, residue colors)` per backbone segment.
    fn segments(&self) -> Vec<(char, Vec<Vec3>, Vec<Rgb>)> {
        self.structure
            .backbone_segments()
            .into_iter()
            .map(|segment| {
                let chain = self.structure.residues[segment[0]].chain;
                let colors = segment.iter().map(|&ri| self.colors[ri]).collect();
                (chain, self.ca_positions(&segment), colors)
            })
            .collect()
    }

    fn ca_positions(&self, segment: &[usize]) -> Vec<Vec3> {
        segment
            .iter()
            .filter_map(|&ri| self.structure.residues[ri].ca(&self.structure.atoms))
            .map(|ai| self.structure.atoms[ai].position)
            .collect()
    }
}

/// Uniform Catmull-Rom samples through `points`.
///
/// Returns the samples and, for each, the index of the control point whose
/// span it belongs to. Endpoints are duplicated as phantom controls.
fn catmull_rom(points: &[Vec3], detail: usize) -> (Vec<Vec3>, Vec<usize>) {
    let n = points.len();
    let detail = detail.max(1);
    let mut samples = Vec::with_capacity(n.saturating_sub(1) * detail + 1);
    let mut owners = Vec::with_capacity(samples.capacity());
    for i in 0..n.saturating_sub(1) {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(n - 1)];
        for step in 0..detail {
            let t = step as f32 / detail as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            let p = 0.5
                * ((2.0 * p1)
                    + (p2 - p0) * t
                    + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                    + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3);
            samples.push(p);
            owners.push(if t < 0.5 { i } else { i + 1 });
        }
    }
    if let Some(&last) = points.last() {
        samples.push(last);
        owners.push(n - 1);
    }
    (samples, owners)
}

/// Van der Waals radius by element symbol, in Å.
fn vdw_radius(element: &str) -> f32 {
    match element {
        "H" => 1.1,
        "C" => 1.7,
        "N" => 1.55,
        "O" => 1.52,
        "S" => 1.8,
        "P" => 1.8,
        "FE" => 1.94,
        "ZN" => 1.39,
        "MG" => 1.73,
        _ => 1.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::tiny_pdb;

    fn build(mode: RenderMode) -> Scene {
        let structure = Structure::parse(&tiny_pdb()).unwrap();
        Scene::build("1ABC", &structure, mode, &ViewerOptions::default())
    }

    #[test]
    fn catmull_rom_passes_through_controls() {
        let pts = [Vec3::ZERO, Vec3::X, Vec3::new(2.0, 1.0, 0.0)];
        let (samples, owners) = catmull_rom(&pts, 4);
        assert_eq!(samples.len(), 2 * 4 + 1);
        assert_eq!(samples[0], pts[0]);
        assert_eq!(samples[4], pts[1]);
        assert_eq!(samples[8], pts[2]);
        assert_eq!(owners.len(), samples.len());
        assert_eq!(owners[8], 2);
    }

    #[test]
    fn cartoon_is_one_tube_per_segment_with_wider_helix() {
        let scene = build(RenderMode::Cartoon);
        let tubes: Vec<&Vec<f32>> = scene
            .primitives
            .iter()
            .filter_map(|(_, p)| match p {
                Primitive::Tube { radii, .. } => Some(radii),
                _ => None,
            })
            .collect();
        assert_eq!(tubes.len(), 1);
        let max = tubes[0].iter().copied().fold(0.0f32, f32::max);
        let min = tubes[0].iter().copied().fold(f32::MAX, f32::min);
        assert_eq!(max, 1.2);
        assert_eq!(min, 0.3);
    }

    #[test]
    fn trace_draws_spheres_and_links() {
        let scene = build(RenderMode::Trace);
        let spheres = scene
            .primitives
            .iter()
            .filter(|(_, p)| matches!(p, Primitive::Sphere { .. }))
            .count();
        let cylinders = scene
            .primitives
            .iter()
            .filter(|(_, p)| matches!(p, Primitive::Cylinder { .. }))
            .count();
        assert_eq!(spheres, 6);
        assert_eq!(cylinders, 5);
    }

    #[test]
    fn line_trace_and_lines() {
        assert_eq!(build(RenderMode::LineTrace).primitives.len(), 5);
        // N–CA inside each residue; the fixture has no carbonyl C, so no
        // peptide links.
        assert_eq!(build(RenderMode::Lines).primitives.len(), 6);
    }

    #[test]
    fn spheres_cover_every_atom() {
        let scene = build(RenderMode::Spheres);
        assert_eq!(scene.primitives.len(), scene.atom_count);
    }

    #[test]
    fn related_copies_are_instanced_and_framed() {
        let scene = build(RenderMode::Tube);
        assert_eq!(scene.copies.len(), 2);
        // Copies 50 Å apart: the frame must cover both.
        assert!(scene.camera.radius > 25.0);

        let structure = Structure::parse(&tiny_pdb()).unwrap();
        let alone = Scene::build(
            "1ABC",
            &structure,
            RenderMode::Tube,
            &ViewerOptions {
                show_related: false,
                ..ViewerOptions::default()
            },
        );
        assert_eq!(alone.copies.len(), 1);
        assert!(alone.camera.radius < scene.camera.radius);
    }

    #[test]
    fn summary_reflects_scene() {
        let summary = build(RenderMode::Sline).summary();
        assert_eq!(summary.id, "1ABC");
        assert_eq!(summary.mode, RenderMode::Sline);
        assert_eq!(summary.residues, 6);
        assert_eq!(summary.chains, 1);
        assert_eq!(summary.copies, 2);
        assert_eq!(summary.primitives, 1);
    }
}
