use crate::error::{Error, Result};
use std::ops::{Add, Mul};

/// A homogeneous 2D point (`w = 1`) or direction (`w = 0`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub w: f64,
}

impl Vec3 {
    pub const fn point(x: f64, y: f64) -> Self {
        Self { x, y, w: 1.0 }
    }

    pub const fn direction(x: f64, y: f64) -> Self {
        Self { x, y, w: 0.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat3 {
    // Row-major 3x3 matrix.
    m: [[f64; 3]; 3],
}

impl Mat3 {
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub const fn from_rows(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    pub const fn rows(&self) -> [[f64; 3]; 3] {
        self.m
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.m[r][c]
    }

    /// Counter-clockwise rotation (in a y-up frame) by `angle_deg` degrees.
    pub fn rotation(angle_deg: f64) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        Self {
            m: [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            m: [[1.0, 0.0, dx], [0.0, 1.0, dy], [0.0, 0.0, 1.0]],
        }
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self {
            m: [[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Matrix product `self * rhs`.
    ///
    /// Applied to a column vector, the result applies `rhs` first and `self` second.
    pub fn multiply(&self, rhs: &Mat3) -> Mat3 {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (0..3).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Mat3 { m: out }
    }

    pub fn transpose(&self) -> Mat3 {
        let m = &self.m;
        Mat3 {
            m: [
                [m[0][0], m[1][0], m[2][0]],
                [m[0][1], m[1][1], m[2][1]],
                [m[0][2], m[1][2], m[2][2]],
            ],
        }
    }

    /// Full matrix-vector product, including the homogeneous row.
    pub fn apply(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3 {
            x: m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.w,
            y: m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.w,
            w: m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.w,
        }
    }

    /// Applies this transform to a 2D point (implicitly using homogeneous `w=1`).
    #[inline]
    pub fn transform_point2(&self, x: f64, y: f64) -> (f64, f64) {
        let x2 = self.m[0][0] * x + self.m[0][1] * y + self.m[0][2];
        let y2 = self.m[1][0] * x + self.m[1][1] * y + self.m[1][2];
        (x2, y2)
    }

    pub fn determinant(&self) -> f64 {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.m;
        a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
    }

    /// Inverse via the adjugate.
    ///
    /// Only an exactly-zero determinant is rejected; nearly singular matrices
    /// invert to very large entries.
    pub fn inverse(&self) -> Result<Mat3> {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.m;
        let det = self.determinant();
        if det == 0.0 {
            return Err(Error::SingularMatrix { det });
        }

        Ok(Mat3 {
            m: [
                [(e * i - f * h) / det, (c * h - b * i) / det, (b * f - c * e) / det],
                [(f * g - d * i) / det, (a * i - c * g) / det, (c * d - a * f) / det],
                [(d * h - e * g) / det, (b * g - a * h) / det, (a * e - b * d) / det],
            ],
        })
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Mat3 {
        self.multiply(&rhs)
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.apply(rhs)
    }
}

/// Element-wise sum.
impl Add for Mat3 {
    type Output = Mat3;

    fn add(self, rhs: Mat3) -> Mat3 {
        let mut out = self.m;
        for (row, rhs_row) in out.iter_mut().zip(rhs.m.iter()) {
            for (v, r) in row.iter_mut().zip(rhs_row.iter()) {
                *v += r;
            }
        }
        Mat3 { m: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::assert_mat_near;

    const EPS: f64 = 1e-9;

    #[test]
    fn rotation_then_inverse_rotation_is_identity() {
        for deg in [-270.0, -45.0, 0.0, 5.0, 33.3, 90.0, 180.0, 359.0, 725.0] {
            let m = Mat3::rotation(deg) * Mat3::rotation(-deg);
            assert_mat_near(&m, &Mat3::identity(), EPS);
        }
    }

    #[test]
    fn identity_is_left_and_right_neutral() {
        let a = Mat3::from_rows([[1.5, -2.0, 3.0], [4.0, 0.25, -6.0], [7.0, 8.0, 9.0]]);
        assert_eq!(a * Mat3::identity(), a);
        assert_eq!(Mat3::identity() * a, a);
    }

    #[test]
    fn mul_applies_rhs_first() {
        // Translate then scale: (1, 1) -> (11, 1) -> (22, 3).
        let m = Mat3::scaling(2.0, 3.0) * Mat3::translation(10.0, 0.0);
        let p = m * Vec3::point(1.0, 1.0);
        assert_eq!(p, Vec3::point(22.0, 3.0));

        // The other order: (1, 1) -> (2, 3) -> (12, 3).
        let m = Mat3::translation(10.0, 0.0) * Mat3::scaling(2.0, 3.0);
        assert_eq!(m.transform_point2(1.0, 1.0), (12.0, 3.0));
    }

    #[test]
    fn rotation_by_90_maps_x_axis_to_y_axis() {
        let p = Mat3::rotation(90.0).apply(Vec3::point(1.0, 0.0));
        approx::assert_abs_diff_eq!(p.x, 0.0, epsilon = EPS);
        approx::assert_abs_diff_eq!(p.y, 1.0, epsilon = EPS);
        assert_eq!(p.w, 1.0);
    }

    #[test]
    fn directions_ignore_translation() {
        let v = Mat3::translation(5.0, 7.0).apply(Vec3::direction(1.0, 2.0));
        assert_eq!(v, Vec3::direction(1.0, 2.0));
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let m = Mat3::translation(12.0, -3.0) * Mat3::rotation(27.0) * Mat3::scaling(0.5, 4.0);
        let inv = m.inverse().unwrap();
        assert_mat_near(&(inv * m), &Mat3::identity(), EPS);
        assert_mat_near(&(m * inv), &Mat3::identity(), EPS);

        // Non-affine bottom row, det = -10.5.
        let general = Mat3::from_rows([[2.0, -1.0, 0.5], [1.0, 3.0, 2.0], [4.0, 1.0, 1.0]]);
        approx::assert_abs_diff_eq!(general.determinant(), -10.5, epsilon = EPS);
        let inv = general.inverse().unwrap();
        assert_mat_near(&(general * inv), &Mat3::identity(), EPS);
        assert_mat_near(&(inv * general), &Mat3::identity(), EPS);
    }

    #[test]
    fn inverse_of_zero_row_matrix_is_singular() {
        let m = Mat3::from_rows([[1.0, 2.0, 3.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        match m.inverse() {
            Err(Error::SingularMatrix { det }) => assert_eq!(det, 0.0),
            other => panic!("expected SingularMatrix, got {other:?}"),
        }
        assert!(Mat3::scaling(0.0, 1.0).inverse().is_err());
    }

    #[test]
    fn transpose_swaps_rows_and_columns() {
        let m = Mat3::from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let t = m.transpose();
        assert_eq!(t.rows(), [[1.0, 4.0, 7.0], [2.0, 5.0, 8.0], [3.0, 6.0, 9.0]]);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn add_is_element_wise() {
        let a = Mat3::translation(1.0, 2.0);
        let b = Mat3::scaling(3.0, 4.0);
        let s = a + b;
        assert_eq!(s.rows(), [[4.0, 0.0, 1.0], [0.0, 5.0, 2.0], [0.0, 0.0, 2.0]]);
    }
}
