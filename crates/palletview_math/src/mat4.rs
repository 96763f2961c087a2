//! 4x4 Matrix utilities for 3D transformations
//!
//! Matrices are stored column-major as `[[f32; 4]; 4]`, indexed `m[column][row]`,
//! which is the layout scene documents use for object transforms and the layout
//! WGSL expects for `mat4x4<f32>` uniforms. Projection helpers target a `[0, 1]`
//! clip-space depth range.

use crate::Vec3;

/// 4x4 matrix type (column-major)
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Build a matrix from 16 column-major elements
pub fn from_column_major(elements: &[f32; 16]) -> Mat4 {
    let mut m = IDENTITY;
    for (col, column) in m.iter_mut().enumerate() {
        column.copy_from_slice(&elements[col * 4..col * 4 + 4]);
    }
    m
}

/// Flatten a matrix to 16 column-major elements
pub fn to_column_major(m: &Mat4) -> [f32; 16] {
    let mut out = [0.0f32; 16];
    for (col, column) in m.iter().enumerate() {
        out[col * 4..col * 4 + 4].copy_from_slice(column);
    }
    out
}

/// Translation matrix
pub fn translation(t: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[3][0] = t.x;
    m[3][1] = t.y;
    m[3][2] = t.z;
    m
}

/// Read the translation part of an affine matrix
pub fn get_translation(m: &Mat4) -> Vec3 {
    Vec3::new(m[3][0], m[3][1], m[3][2])
}

/// Multiply two 4x4 matrices: result = a * b
///
/// In column-major convention, this applies b first, then a.
#[allow(clippy::needless_range_loop)]
pub fn mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }

    result
}

/// Transform a point (w = 1) by an affine matrix
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0],
        m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1],
        m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2],
    )
}

/// Transform a direction (w = 0); translation is ignored
pub fn transform_direction(m: &Mat4, d: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * d.x + m[1][0] * d.y + m[2][0] * d.z,
        m[0][1] * d.x + m[1][1] * d.y + m[2][1] * d.z,
        m[0][2] * d.x + m[1][2] * d.y + m[2][2] * d.z,
    )
}

/// Transpose a matrix
pub fn transpose(m: Mat4) -> Mat4 {
    [
        [m[0][0], m[1][0], m[2][0], m[3][0]],
        [m[0][1], m[1][1], m[2][1], m[3][1]],
        [m[0][2], m[1][2], m[2][2], m[3][2]],
        [m[0][3], m[1][3], m[2][3], m[3][3]],
    ]
}

/// Right-handed perspective projection with `[0, 1]` depth
///
/// `fov_y` is the vertical field of view in radians.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y / 2.0).tan();
    let r = far / (near - far);

    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, r, -1.0],
        [0.0, 0.0, r * near, 0.0],
    ]
}

/// Right-handed orthographic projection with `[0, 1]` depth
pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rcp_w = 1.0 / (right - left);
    let rcp_h = 1.0 / (top - bottom);
    let r = 1.0 / (near - far);

    [
        [2.0 * rcp_w, 0.0, 0.0, 0.0],
        [0.0, 2.0 * rcp_h, 0.0, 0.0],
        [0.0, 0.0, r, 0.0],
        [-(left + right) * rcp_w, -(top + bottom) * rcp_h, r * near, 1.0],
    ]
}

/// Right-handed look-at view matrix
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalized();
    let s = f.cross(up).normalized();
    let u = s.cross(f);

    [
        [s.x, u.x, -f.x, 0.0],
        [s.y, u.y, -f.y, 0.0],
        [s.z, u.z, -f.z, 0.0],
        [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    #[test]
    fn test_column_major_round_trip_layout() {
        let elements = [
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 5.0, 6.0, 7.0, 1.0,
        ];
        let m = from_column_major(&elements);
        // Translation lives in the last column
        assert_eq!(get_translation(&m), Vec3::new(5.0, 6.0, 7.0));
        assert_eq!(to_column_major(&m), elements);
    }

    #[test]
    fn test_transform_point_translates() {
        let m = translation(Vec3::new(1.0, 2.0, 3.0));
        let p = transform_point(&m, Vec3::new(1.0, 1.0, 1.0));
        assert!(vec_approx_eq(p, Vec3::new(2.0, 3.0, 4.0)));
    }

    #[test]
    fn test_transform_direction_ignores_translation() {
        let m = translation(Vec3::new(100.0, 100.0, 100.0));
        let d = transform_direction(&m, Vec3::X);
        assert!(vec_approx_eq(d, Vec3::X));
    }

    #[test]
    fn test_mul_applies_right_first() {
        let t = translation(Vec3::new(1.0, 0.0, 0.0));
        let mut s = IDENTITY;
        s[0][0] = 2.0;
        // Scale first, then translate
        let m = mul(t, s);
        let p = transform_point(&m, Vec3::new(1.0, 0.0, 0.0));
        assert!(vec_approx_eq(p, Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_look_at_maps_target_to_negative_z() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let view = look_at(eye, Vec3::ZERO, Vec3::Y);
        let p = transform_point(&view, Vec3::ZERO);
        assert!(vec_approx_eq(p, Vec3::new(0.0, 0.0, -5.0)), "got {:?}", p);
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        // A point on the near plane maps to depth 0
        let near_z = proj[2][2] * -0.1 + proj[3][2];
        let near_w = proj[2][3] * -0.1;
        assert!(approx_eq(near_z / near_w, 0.0));
        // A point on the far plane maps to depth 1
        let far_z = proj[2][2] * -100.0 + proj[3][2];
        let far_w = proj[2][3] * -100.0;
        assert!(approx_eq(far_z / far_w, 1.0));
    }

    #[test]
    fn test_orthographic_maps_box_to_clip() {
        let proj = orthographic(-2.0, 2.0, -1.0, 1.0, 0.0, 10.0);
        let p = transform_point(&proj, Vec3::new(2.0, 1.0, -10.0));
        assert!(vec_approx_eq(p, Vec3::new(1.0, 1.0, 1.0)), "got {:?}", p);
    }

    #[test]
    fn test_transpose_involution() {
        let m = translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transpose(transpose(m)), m);
    }
}
