// Per-frame composite transforms.
//
// Every matrix built here maps a destination (frame buffer) pixel coordinate
// to a source image pixel coordinate, which is what the resampler consumes.

use crate::mat3::Mat3;
use crate::resample::SampleOrigin;
use std::f64::consts::FRAC_PI_2;

/// Rotation angle reached after `elapsed_frames` ticks.
pub fn angle_for_frame(elapsed_frames: u64, step_deg: f64) -> f64 {
    elapsed_frames as f64 * step_deg
}

/// Scale that keeps a rotated square's corners inside the unrotated square.
///
/// The rotated bounding box grows by `sin(t) + cos(t)` with `t` reduced into
/// `[0, pi/2)`, so sampling is spread by the same factor.
pub fn fit_scale(angle_deg: f64) -> f64 {
    let theta = angle_deg.to_radians().rem_euclid(FRAC_PI_2);
    theta.sin() + theta.cos()
}

/// Composite for one animation frame.
///
/// Built as `to_origin * aspect * rot * fit * from_origin`, so a target pixel is
/// first centred on the target, scaled by the fit factor, rotated, stretched into
/// source units and finally moved to the source centre. Any other order pivots
/// the rotation around the wrong point.
pub fn frame_transform(src_w: usize, src_h: usize, target_size: usize, angle_deg: f64) -> Mat3 {
    let (src_w, src_h, target) = (src_w as f64, src_h as f64, target_size as f64);

    let to_origin = Mat3::translation(src_w / 2.0, src_h / 2.0);
    let aspect = Mat3::scaling(src_w / target, src_h / target);
    let rot = Mat3::rotation(angle_deg);
    let s = fit_scale(angle_deg);
    let fit = Mat3::scaling(s, s);
    let from_origin = Mat3::translation(-target / 2.0, -target / 2.0);

    to_origin * aspect * rot * fit * from_origin
}

/// Static preview: the image mirrored top-to-bottom at its own size.
///
/// One-based reads already sit a row up, so that origin flips about `h`
/// while zero-based reads flip about `h - 1`.
pub fn preview_transform(src_h: usize, origin: SampleOrigin) -> Mat3 {
    let h = src_h as f64;
    let offset = match origin {
        SampleOrigin::ZeroBased => h - 1.0,
        SampleOrigin::OneBased => h,
    };
    Mat3::translation(0.0, offset) * Mat3::scaling(1.0, -1.0)
}

/// Three-line dump of a matrix, values truncated to two decimals.
///
/// ```text
/// row 1:[ 1,	0,	0 ]
/// ```
pub fn format_matrix(m: &Mat3) -> String {
    m.rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let vals: Vec<String> = row
                .iter()
                // `+ 0.0` turns -0 into 0.
                .map(|v| ((v * 100.0).floor() / 100.0 + 0.0).to_string())
                .collect();
            format!("row {}:[ {} ]", i + 1, vals.join(",\t"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::assert_mat_near;
    use approx::assert_abs_diff_eq;

    #[test]
    fn angle_advances_by_step() {
        assert_eq!(angle_for_frame(0, 5.0), 0.0);
        assert_eq!(angle_for_frame(3, 5.0), 15.0);
        assert_eq!(angle_for_frame(4, -2.5), -10.0);
    }

    #[test]
    fn fit_scale_peaks_at_45_degrees() {
        assert_abs_diff_eq!(fit_scale(0.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit_scale(45.0), 2f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(fit_scale(135.0), 2f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(fit_scale(90.0), 1.0, epsilon = 1e-9);
        // Negative angles fold into the same range.
        assert_abs_diff_eq!(fit_scale(-30.0), fit_scale(60.0), epsilon = 1e-12);
        assert!(fit_scale(10.0) > 1.0);
    }

    #[test]
    fn unrotated_frame_stretches_source_over_target() {
        let m = frame_transform(40, 20, 100, 0.0);
        let (x, y) = m.transform_point2(0.0, 0.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-9);

        let (x, y) = m.transform_point2(100.0, 100.0);
        assert_abs_diff_eq!(x, 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn target_centre_maps_to_source_centre_at_any_angle() {
        for angle in [0.0, 5.0, 37.0, 90.0, 200.0, -45.0] {
            let m = frame_transform(30, 50, 64, angle);
            let (x, y) = m.transform_point2(32.0, 32.0);
            assert_abs_diff_eq!(x, 15.0, epsilon = 1e-9);
            assert_abs_diff_eq!(y, 25.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn composite_matches_explicit_chain() {
        let angle = 25.0;
        let s = fit_scale(angle);
        let expected = Mat3::translation(8.0, 4.0)
            .multiply(&Mat3::scaling(16.0 / 32.0, 8.0 / 32.0))
            .multiply(&Mat3::rotation(angle))
            .multiply(&Mat3::scaling(s, s))
            .multiply(&Mat3::translation(-16.0, -16.0));
        assert_mat_near(&frame_transform(16, 8, 32, angle), &expected, 1e-12);
    }

    #[test]
    fn rotated_corners_stay_inside_source() {
        // With fit scaling the source corners land inside the target square,
        // i.e. the target corners map outside (or onto) the source.
        let (w, h, t) = (64usize, 64usize, 64usize);
        for angle in [10.0, 30.0, 45.0, 80.0] {
            let inv = frame_transform(w, h, t, angle).inverse().unwrap();
            for (sx, sy) in [(0.0, 0.0), (64.0, 0.0), (0.0, 64.0), (64.0, 64.0)] {
                let (x, y) = inv.transform_point2(sx, sy);
                assert!(x >= -1e-9 && x <= t as f64 + 1e-9, "angle {angle}: x={x}");
                assert!(y >= -1e-9 && y <= t as f64 + 1e-9, "angle {angle}: y={y}");
            }
        }
    }

    #[test]
    fn preview_flips_rows() {
        let m = preview_transform(10, SampleOrigin::ZeroBased);
        assert_eq!(m.transform_point2(3.0, 0.0), (3.0, 9.0));
        assert_eq!(m.transform_point2(3.0, 9.0), (3.0, 0.0));

        let m = preview_transform(2, SampleOrigin::OneBased);
        assert_eq!(m.transform_point2(0.0, 0.0), (0.0, 2.0));
        assert_eq!(m.transform_point2(0.0, 2.0), (0.0, 0.0));
    }

    #[test]
    fn format_matrix_truncates_to_two_decimals() {
        let m = Mat3::from_rows([[1.0, -0.0, 12.3456], [0.999, -1.234, 0.5], [0.0, 0.0, 1.0]]);
        assert_eq!(
            format_matrix(&m),
            "row 1:[ 1,\t0,\t12.34 ]\nrow 2:[ 0.99,\t-1.24,\t0.5 ]\nrow 3:[ 0,\t0,\t1 ]"
        );
    }
}
