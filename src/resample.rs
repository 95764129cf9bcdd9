use crate::error::Result;
use crate::im::RGBAIm;
use crate::mat3::Mat3;
use serde::Deserialize;

/// How a mapped source coordinate is snapped to a pixel index.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Round half up (`floor(x + 0.5)`), so `-0.5` lands on pixel 0.
    #[default]
    Nearest,
    /// Truncate toward negative infinity.
    Floor,
}

impl Rounding {
    #[inline(always)]
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Rounding::Nearest => (v + 0.5).floor(),
            Rounding::Floor => v.floor(),
        }
    }
}

/// Where pixel `(sx, sy)` is read from in the source buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleOrigin {
    /// `(sy * w + sx) * 4`.
    #[default]
    ZeroBased,
    /// `((sy - 1) * w + (sx - 1)) * 4`, reading one pixel up and to the left.
    /// Offsets that fall before the buffer read as black.
    OneBased,
}

impl SampleOrigin {
    #[inline(always)]
    fn byte_offset(self, sx: i64, sy: i64, src_w: i64) -> Option<usize> {
        let px = match self {
            SampleOrigin::ZeroBased => sy * src_w + sx,
            SampleOrigin::OneBased => (sy - 1) * src_w + (sx - 1),
        };
        usize::try_from(px * 4).ok()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sampling {
    pub rounding: Rounding,
    pub origin: SampleOrigin,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResampleStats {
    /// Pixels copied from the source (alpha 255).
    pub sampled: usize,
    /// Pixels whose sample fell outside the source (alpha 0).
    pub blanked: usize,
}

/// Nearest-neighbour resample of `src` into every pixel of `dst`.
///
/// `m` maps destination pixel coordinates to source pixel coordinates.
/// Samples outside `[0, w) x [0, h)` only clear the destination alpha and
/// leave its colour channels as they were.
pub fn resample_into(
    src: &RGBAIm,
    dst: &mut RGBAIm,
    m: &Mat3,
    sampling: Sampling,
) -> Result<ResampleStats> {
    src.check_len()?;
    dst.check_len()?;

    let dst_w = dst.w;
    let src_w = src.w as f64;
    let src_h = src.h as f64;
    let mut stats = ResampleStats::default();

    for (i, px) in dst.arr.chunks_exact_mut(4).enumerate() {
        let dx = (i % dst_w) as f64;
        let dy = (i / dst_w) as f64;
        let (fx, fy) = m.transform_point2(dx, dy);
        let sx = sampling.rounding.apply(fx);
        let sy = sampling.rounding.apply(fy);

        // Written as a negation so NaN coordinates are also out of bounds.
        if !(sx >= 0.0 && sx < src_w && sy >= 0.0 && sy < src_h) {
            px[3] = 0;
            stats.blanked += 1;
            continue;
        }

        let rgb = sampling
            .origin
            .byte_offset(sx as i64, sy as i64, src.w as i64)
            .and_then(|off| src.arr.get(off..off + 3));
        match rgb {
            Some(rgb) => px[..3].copy_from_slice(rgb),
            None => px[..3].fill(0),
        }
        px[3] = 255;
        stats.sampled += 1;
    }

    Ok(stats)
}

/// Like [`resample_into`] but allocates a fresh `w` x `h` target.
pub fn resample(src: &RGBAIm, m: &Mat3, w: usize, h: usize, sampling: Sampling) -> Result<RGBAIm> {
    let mut dst = RGBAIm::new(w, h);
    resample_into(src, &mut dst, m, sampling)?;
    Ok(dst)
}
