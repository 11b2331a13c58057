//! Flat SVG drawing of a [`Scene`] as seen from its camera.
//!
//! Every primitive of every assembly copy is projected with the scene's
//! perspective camera and emitted as SVG `line`/`circle` elements, far to
//! near. Geometry outside the slab is clipped per element.

use std::fmt::Write;

use glam::{Mat4, Vec2, Vec3};

use super::color::Rgb;
use super::scene::{Primitive, Scene};

/// Stroke width of single-pixel lines and polylines.
const LINE_WIDTH: f32 = 1.5;
/// Outline stroke width added around filled shapes.
const OUTLINE_WIDTH: f32 = 1.0;

/// Camera projection of one scene onto a `width` × `height` viewport.
struct Projector {
    view: Mat4,
    proj: Mat4,
    znear: f32,
    zfar: f32,
    focal: f32,
    size: Vec2,
}

/// A point on screen with its distance from the eye.
#[derive(Clone, Copy)]
struct ScreenPoint {
    at: Vec2,
    depth: f32,
}

/// One emitted element and the depth it is sorted by.
struct Shape {
    depth: f32,
    markup: String,
}

impl Projector {
    fn new(scene: &Scene, width: u32, height: u32) -> Self {
        let camera = &scene.camera;
        let view = Mat4::from_translation(-Vec3::Z * camera.distance)
            * Mat4::from_quat(camera.rotation)
            * Mat4::from_translation(-camera.target);
        let fovy = camera.fovy.to_radians();
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let znear = camera.znear.max(f32::EPSILON);
        let zfar = camera.zfar.max(znear * 2.0);
        Self {
            view,
            proj: Mat4::perspective_rh(fovy, aspect, znear, zfar),
            znear,
            zfar,
            focal: 1.0 / (fovy / 2.0).tan(),
            size: Vec2::new(width as f32, height as f32),
        }
    }

    /// Screen position of a world point, or `None` outside the slab.
    fn point(&self, world: Vec3) -> Option<ScreenPoint> {
        let eye = self.view.transform_point3(world);
        let depth = -eye.z;
        if depth < self.znear || depth > self.zfar {
            return None;
        }
        let ndc = self.proj.project_point3(eye);
        Some(ScreenPoint {
            at: Vec2::new(
                (ndc.x + 1.0) / 2.0 * self.size.x,
                (1.0 - ndc.y) / 2.0 * self.size.y,
            ),
            depth,
        })
    }

    /// On-screen length of `radius` Å at `depth`.
    fn scale(&self, radius: f32, depth: f32) -> f32 {
        radius * self.focal / depth * self.size.y / 2.0
    }
}

/// Render `scene` as a standalone SVG document.
#[must_use]
pub fn to_svg(scene: &Scene, width: u32, height: u32) -> String {
    let projector = Projector::new(scene, width, height);
    let outline = scene.surface.outline;
    let mut shapes = Vec::new();

    for copy in &scene.copies {
        for (chain, primitive) in &scene.primitives {
            if !copy.chains.is_empty() && !copy.chains.contains(chain) {
                continue;
            }
            let at = |p: Vec3| projector.point(copy.transform.transform_point3(p));
            match primitive {
                Primitive::Line { from, to, color } => {
                    push_segment(&mut shapes, at(*from), at(*to), *color, None);
                }
                Primitive::Cylinder {
                    from,
                    to,
                    radius,
                    color,
                } => push_segment(
                    &mut shapes,
                    at(*from),
                    at(*to),
                    *color,
                    Some((&projector, *radius, outline)),
                ),
                Primitive::Sphere {
                    center,
                    radius,
                    color,
                } => {
                    if let Some(c) = at(*center) {
                        shapes.push(circle(
                            c,
                            projector.scale(*radius, c.depth),
                            *color,
                            outline,
                        ));
                    }
                }
                Primitive::Polyline { points, colors } => {
                    for (k, pair) in points.windows(2).enumerate() {
                        push_segment(
                            &mut shapes,
                            at(pair[0]),
                            at(pair[1]),
                            colors[k],
                            None,
                        );
                    }
                }
                Primitive::Tube {
                    points,
                    radii,
                    colors,
                } => {
                    for (k, pair) in points.windows(2).enumerate() {
                        push_segment(
                            &mut shapes,
                            at(pair[0]),
                            at(pair[1]),
                            colors[k],
                            Some((&projector, radii[k], outline)),
                        );
                    }
                }
            }
        }
    }

    shapes.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    let rendering = if scene.surface.antialias {
        "geometricPrecision"
    } else {
        "crispEdges"
    };
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="scene-drawing" width="{width}" height="{height}" viewBox="0 0 {width} {height}" shape-rendering="{rendering}" data-id="{}" data-mode="{}">"#,
        crate::view::escape(&scene.id),
        scene.mode,
    );
    for shape in shapes {
        out.push_str(&shape.markup);
    }
    out.push_str("</svg>");
    out
}

/// Push a segment; `thick` carries the projector, radius in Å and outline
/// flag of cylinders and tube spans. Segments with a clipped end are
/// dropped.
fn push_segment(
    shapes: &mut Vec<Shape>,
    from: Option<ScreenPoint>,
    to: Option<ScreenPoint>,
    color: Rgb,
    thick: Option<(&Projector, f32, bool)>,
) {
    let (Some(a), Some(b)) = (from, to) else {
        return;
    };
    let depth = (a.depth + b.depth) / 2.0;
    let (width, outline) = match thick {
        Some((projector, radius, outline)) => {
            (2.0 * projector.scale(radius, depth), outline)
        }
        None => (LINE_WIDTH, false),
    };
    let mut markup = String::new();
    if outline {
        let _ = write!(
            markup,
            r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#000000" stroke-width="{:.1}" stroke-linecap="round"/>"##,
            a.at.x,
            a.at.y,
            b.at.x,
            b.at.y,
            width + 2.0 * OUTLINE_WIDTH,
        );
    }
    let _ = write!(
        markup,
        r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{:.1}" stroke-linecap="round"/>"#,
        a.at.x,
        a.at.y,
        b.at.x,
        b.at.y,
        hex(color),
        width,
    );
    shapes.push(Shape { depth, markup });
}

fn circle(center: ScreenPoint, radius: f32, color: Rgb, outline: bool) -> Shape {
    let stroke = if outline {
        format!(r##" stroke="#000000" stroke-width="{OUTLINE_WIDTH:.1}""##)
    } else {
        String::new()
    };
    Shape {
        depth: center.depth,
        markup: format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}"{stroke}/>"#,
            center.at.x,
            center.at.y,
            radius,
            hex(color),
        ),
    }
}

/// `#rrggbb` of a linear color.
fn hex(color: Rgb) -> String {
    let [r, g, b] = color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    format!("#{r:02x}{g:02x}{b:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::structure::Structure;
    use crate::engine::tests::tiny_pdb;
    use crate::options::{RenderMode, SlabMode, ViewerOptions};

    fn draw(mode: RenderMode, options: &ViewerOptions) -> String {
        let structure = Structure::parse(&tiny_pdb()).unwrap();
        let scene = Scene::build("1ABC", &structure, mode, options);
        to_svg(&scene, 400, 300)
    }

    fn count(svg: &str, element: &str) -> usize {
        svg.matches(&format!("<{element} ")).count()
    }

    #[test]
    fn every_copy_of_every_primitive_is_drawn() {
        let opts = ViewerOptions::default();
        // Two assembly copies of the six-residue fixture.
        let trace = draw(RenderMode::Trace, &opts);
        assert_eq!(count(&trace, "circle"), 12);
        assert_eq!(count(&trace, "line"), 10);
        assert_eq!(count(&draw(RenderMode::Spheres, &opts), "circle"), 24);
        assert_eq!(count(&draw(RenderMode::LineTrace, &opts), "line"), 10);
        assert_eq!(count(&draw(RenderMode::Lines, &opts), "line"), 12);
        assert_eq!(count(&draw(RenderMode::Lines, &opts), "circle"), 0);
    }

    #[test]
    fn residue_colors_reach_the_drawing() {
        let svg = draw(RenderMode::Trace, &ViewerOptions::default());
        // Coil ends grey, the single helix at the start of the gradient.
        assert!(svg.contains(r##"fill="#cccccc""##));
        assert!(svg.contains(r##"fill="#0000ff""##));
        assert!(svg.contains(r##"stroke="#0000ff""##));
    }

    #[test]
    fn single_copy_draws_half() {
        let opts = ViewerOptions {
            show_related: false,
            ..ViewerOptions::default()
        };
        assert_eq!(count(&draw(RenderMode::Spheres, &opts), "circle"), 12);
    }

    #[test]
    fn shapes_lie_inside_the_viewport() {
        let svg = draw(RenderMode::Spheres, &ViewerOptions::default());
        for cx in svg.split(r#"cx=""#).skip(1) {
            let x: f32 = cx.split('"').next().unwrap().parse().unwrap();
            assert!((0.0..=400.0).contains(&x), "cx {x}");
        }
        for cy in svg.split(r#"cy=""#).skip(1) {
            let y: f32 = cy.split('"').next().unwrap().parse().unwrap();
            assert!((0.0..=300.0).contains(&y), "cy {y}");
        }
    }

    #[test]
    fn surface_settings_change_the_markup() {
        let plain = draw(RenderMode::Trace, &ViewerOptions::default());
        assert!(plain.contains(r#"shape-rendering="geometricPrecision""#));
        assert!(!plain.contains("#000000"));

        let styled = draw(
            RenderMode::Trace,
            &ViewerOptions {
                antialias: false,
                outline: true,
                ..ViewerOptions::default()
            },
        );
        assert!(styled.contains(r#"shape-rendering="crispEdges""#));
        assert!(styled.contains(r##"stroke="#000000""##));
    }

    #[test]
    fn geometry_outside_the_slab_is_clipped() {
        let opts = ViewerOptions {
            slab_mode: SlabMode::Fixed,
            znear: 1.0,
            zfar: 2.0,
            ..ViewerOptions::default()
        };
        let svg = draw(RenderMode::Spheres, &opts);
        assert_eq!(count(&svg, "circle"), 0);
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn hex_rounds_components() {
        assert_eq!(hex([0.8, 0.8, 0.8]), "#cccccc");
        assert_eq!(hex([0.0, 0.0, 1.0]), "#0000ff");
        assert_eq!(hex([2.0, -1.0, 0.5]), "#ff0080");
    }
}
