//! Deterministic camera placement for a freshly built scene.
//!
//! The structure is rotated so its principal axes line up with the screen
//! (largest extent horizontal, second largest vertical), then the camera
//! backs off until the bounding sphere fits the field of view.

use glam::{Mat3, Quat, Vec3};

use crate::options::{SlabMode, ViewerOptions};

/// Padding applied on top of the exact bounding-sphere fit distance.
const FIT_PADDING: f32 = 1.5;
/// Slab margin around the bounding sphere when the slab is automatic.
const SLAB_MARGIN: f32 = 1.05;
/// Closest the near plane may get to the eye.
const MIN_ZNEAR: f32 = 0.1;

/// Camera pose and projection chosen for a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPlacement {
    /// World-to-view rotation aligning the principal axes to the screen.
    pub rotation: Quat,
    /// Look-at point (centroid of the framed positions).
    pub target: Vec3,
    /// Bounding-sphere radius around `target`.
    pub radius: f32,
    /// Eye distance from `target`.
    pub distance: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl CameraPlacement {
    /// Place the camera for `positions` under `options`.
    ///
    /// An empty point set yields an identity pose at the origin.
    #[must_use]
    pub fn frame(positions: &[Vec3], options: &ViewerOptions) -> Self {
        let rotation = Quat::from_mat3(&principal_axes(positions));
        let (target, radius) = bounding_sphere(positions);
        let fovy_rad = options.fovy.to_radians();
        let distance = radius / (fovy_rad / 2.0).tan() * FIT_PADDING;

        let (znear, zfar) = match options.slab_mode {
            SlabMode::Auto => (
                (distance - radius * SLAB_MARGIN).max(MIN_ZNEAR),
                (distance + radius * SLAB_MARGIN).max(MIN_ZNEAR * 2.0),
            ),
            SlabMode::Fixed => (options.znear, options.zfar),
        };

        Self {
            rotation,
            target,
            radius,
            distance,
            fovy: options.fovy,
            znear,
            zfar,
        }
    }

    /// Eye position in world space.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        // View space looks down -Z; the eye sits on +Z in view space.
        self.target + self.rotation.inverse() * (Vec3::Z * self.distance)
    }
}

/// Centroid and bounding-sphere radius around it.
#[must_use]
pub fn bounding_sphere(positions: &[Vec3]) -> (Vec3, f32) {
    if positions.is_empty() {
        return (Vec3::ZERO, 0.0);
    }
    let centroid =
        positions.iter().copied().sum::<Vec3>() / positions.len() as f32;
    let radius = positions
        .iter()
        .map(|p| p.distance(centroid))
        .fold(0.0f32, f32::max);
    (centroid, radius)
}

/// Rotation whose rows are the principal axes of `positions`, sorted by
/// decreasing variance.
///
/// Eigenvector signs are fixed so the largest-magnitude component of the
/// first two axes is positive; the third axis completes a right-handed
/// frame. Degenerate inputs fall back to the identity.
#[must_use]
pub fn principal_axes(positions: &[Vec3]) -> Mat3 {
    if positions.len() < 2 {
        return Mat3::IDENTITY;
    }
    let (centroid, _) = bounding_sphere(positions);
    let mut cov = [[0.0f32; 3]; 3];
    for p in positions {
        let d = (*p - centroid).to_array();
        for (r, row) in cov.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell += d[r] * d[c];
            }
        }
    }

    let (values, vectors) = symmetric_eigen(cov);
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let axis = |i: usize| {
        let v = Vec3::new(vectors[0][i], vectors[1][i], vectors[2][i]);
        canonical_sign(v.normalize_or_zero())
    };
    let first = axis(order[0]);
    let second = axis(order[1]);
    if first == Vec3::ZERO || second == Vec3::ZERO {
        return Mat3::IDENTITY;
    }
    let third = first.cross(second);
    Mat3::from_cols(first, second, third).transpose()
}

fn canonical_sign(v: Vec3) -> Vec3 {
    let dominant = v
        .to_array()
        .into_iter()
        .fold(0.0f32, |acc, x| if x.abs() > acc.abs() { x } else { acc });
    if dominant < 0.0 {
        -v
    } else {
        v
    }
}

/// Cyclic Jacobi eigen-decomposition of a symmetric 3×3 matrix.
///
/// Returns `(eigenvalues, eigenvectors)` with eigenvector `i` stored in
/// column `i`.
fn symmetric_eigen(mut a: [[f32; 3]; 3]) -> ([f32; 3], [[f32; 3]; 3]) {
    let mut v = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    for _sweep in 0..32 {
        let off = a[0][1].powi(2) + a[0][2].powi(2) + a[1][2].powi(2);
        if off < 1e-12 {
            break;
        }
        for (p, q) in [(0, 1), (0, 2), (1, 2)] {
            if a[p][q].abs() < 1e-12 {
                continue;
            }
            let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
            let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
            let c = 1.0 / (t * t + 1.0).sqrt();
            let s = t * c;
            for k in 0..3 {
                let (kp, kq) = (a[k][p], a[k][q]);
                a[k][p] = c * kp - s * kq;
                a[k][q] = s * kp + c * kq;
            }
            for k in 0..3 {
                let (pk, qk) = (a[p][k], a[q][k]);
                a[p][k] = c * pk - s * qk;
                a[q][k] = s * pk + c * qk;
            }
            for row in &mut v {
                let (kp, kq) = (row[p], row[q]);
                row[p] = c * kp - s * kq;
                row[q] = s * kp + c * kq;
            }
        }
    }
    ([a[0][0], a[1][1], a[2][2]], v)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    /// Box of points with extents 20 (x), 10 (y), 2 (z), optionally rotated.
    fn slab(rotation: Quat) -> Vec<Vec3> {
        let mut pts = Vec::new();
        for x in [-10.0, 10.0] {
            for y in [-5.0, 5.0] {
                for z in [-1.0, 1.0] {
                    pts.push(rotation * Vec3::new(x, y, z));
                }
            }
        }
        pts
    }

    #[test]
    fn axis_aligned_slab_keeps_identity() {
        let m = principal_axes(&slab(Quat::IDENTITY));
        assert!(approx(m * Vec3::X, Vec3::X), "{m:?}");
        assert!(approx(m * Vec3::Y, Vec3::Y), "{m:?}");
        assert!(approx(m * Vec3::Z, Vec3::Z), "{m:?}");
    }

    #[test]
    fn longest_extent_maps_to_screen_x() {
        // Longest axis along world Z, second along world X.
        let rot = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let pts = slab(rot);
        let m = principal_axes(&pts);
        let longest = (rot * Vec3::X).normalize();
        let mapped = m * longest;
        assert!((mapped.x.abs() - 1.0).abs() < EPSILON, "{mapped:?}");
        let det = m.determinant();
        assert!((det - 1.0).abs() < EPSILON, "det {det}");
    }

    #[test]
    fn placement_is_deterministic() {
        let pts = slab(Quat::from_rotation_z(0.3));
        let opts = ViewerOptions::default();
        assert_eq!(
            CameraPlacement::frame(&pts, &opts),
            CameraPlacement::frame(&pts, &opts)
        );
    }

    #[test]
    fn auto_zoom_frames_bounding_sphere() {
        let pts = slab(Quat::IDENTITY);
        let opts = ViewerOptions::default();
        let cam = CameraPlacement::frame(&pts, &opts);
        let expected_radius = Vec3::new(10.0, 5.0, 1.0).length();
        assert!((cam.radius - expected_radius).abs() < EPSILON);
        assert!(approx(cam.target, Vec3::ZERO));
        let half_fov = (opts.fovy.to_radians() / 2.0).tan();
        assert!(cam.radius / cam.distance < half_fov);
        // Auto slab hugs the structure.
        assert!(cam.znear < cam.distance - cam.radius);
        assert!(cam.zfar > cam.distance + cam.radius);
        assert!((cam.eye().distance(cam.target) - cam.distance).abs() < 1e-3);
    }

    #[test]
    fn fixed_slab_uses_configured_planes() {
        let opts = ViewerOptions {
            slab_mode: SlabMode::Fixed,
            ..ViewerOptions::default()
        };
        let cam = CameraPlacement::frame(&slab(Quat::IDENTITY), &opts);
        assert_eq!((cam.znear, cam.zfar), (opts.znear, opts.zfar));
    }

    #[test]
    fn degenerate_inputs_fall_back_to_identity() {
        assert_eq!(principal_axes(&[]), Mat3::IDENTITY);
        assert_eq!(principal_axes(&[Vec3::ONE]), Mat3::IDENTITY);
        let cam = CameraPlacement::frame(&[], &ViewerOptions::default());
        assert_eq!(cam.radius, 0.0);
    }
}
