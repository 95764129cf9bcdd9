use crate::im::RGBAIm;
use crate::mat3::Mat3;

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];
pub const YELLOW: [u8; 4] = [255, 255, 0, 255];

/// 2x2 image with red, green on top and blue, yellow below.
pub fn quadrant_im() -> RGBAIm {
    rgba_im_from_ascii("RG\nBY")
}

/// Builds an image from rows of `R`, `G`, `B`, `Y` (opaque colours) and `.` (opaque black).
pub fn rgba_im_from_ascii(grid: &str) -> RGBAIm {
    let rows: Vec<&str> = grid
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let h = rows.len();
    assert!(h > 0, "grid must have at least one non-empty row");
    let w = rows[0].len();
    for r in &rows {
        assert_eq!(r.len(), w, "all rows must have equal length");
    }

    let mut im = RGBAIm::new(w, h);
    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            let px = match ch {
                'R' => RED,
                'G' => GREEN,
                'B' => BLUE,
                'Y' => YELLOW,
                '.' => [0, 0, 0, 255],
                _ => panic!("invalid pixel char '{ch}'"),
            };
            let base = y * im.s + x * 4;
            im.arr[base..base + 4].copy_from_slice(&px);
        }
    }
    im
}

/// Inverse of [`rgba_im_from_ascii`]. Transparent pixels print as `_`, anything
/// unrecognised as `?`.
pub fn rgba_to_ascii(im: &RGBAIm) -> String {
    let mut out = String::new();
    for y in 0..im.h {
        for x in 0..im.w {
            let px = im.pixel(x, y).unwrap_or_default();
            let ch = if px[3] == 0 {
                '_'
            } else {
                match px {
                    RED => 'R',
                    GREEN => 'G',
                    BLUE => 'B',
                    YELLOW => 'Y',
                    [0, 0, 0, 255] => '.',
                    _ => '?',
                }
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

pub fn assert_mat_near(a: &Mat3, b: &Mat3, eps: f64) {
    for r in 0..3 {
        for c in 0..3 {
            approx::assert_abs_diff_eq!(a.get(r, c), b.get(r, c), epsilon = eps);
        }
    }
}
