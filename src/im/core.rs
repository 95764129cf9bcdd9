use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Im<T, const N_CH: usize> {
    pub w: usize,
    pub h: usize,
    pub s: usize, // stride in elements (w * N_CH)
    pub arr: Vec<T>,
}

// Constructors
// -----------------------------------------------------------------------------
impl<T: Copy + Default, const N_CH: usize> Im<T, N_CH> {
    pub fn new(w: usize, h: usize) -> Self {
        let s = w * N_CH;
        let arr = vec![T::default(); s * h];
        Self { w, h, s, arr }
    }
}

impl<T, const N_CH: usize> Im<T, N_CH> {
    /// Wraps a tightly packed, row-major buffer.
    pub fn from_raw(w: usize, h: usize, arr: Vec<T>) -> Result<Self> {
        let expected = w * h * N_CH;
        if arr.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: arr.len(),
            });
        }
        Ok(Self { w, h, s: w * N_CH, arr })
    }

    /// Errors unless `arr` holds exactly `h` rows of `s` elements.
    pub fn check_len(&self) -> Result<()> {
        let expected = self.s * self.h;
        if self.arr.len() != expected || self.s != self.w * N_CH {
            return Err(Error::BufferSize {
                expected: self.w * self.h * N_CH,
                actual: self.arr.len(),
            });
        }
        Ok(())
    }

    #[inline(always)]
    pub fn n_pixels(&self) -> usize {
        self.w * self.h
    }
}

impl<T: Copy, const N_CH: usize> Im<T, N_CH> {
    /// Channels of the pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[T; N_CH]> {
        if x >= self.w || y >= self.h {
            return None;
        }
        let base = y * self.s + x * N_CH;
        let px = self.arr.get(base..base + N_CH)?;
        px.try_into().ok()
    }
}

pub type RGBAIm = Im<u8, 4>;
pub type RGBIm = Im<u8, 3>;

impl RGBIm {
    /// Expands to RGBA with alpha fixed at 255.
    pub fn to_rgba_im(&self) -> RGBAIm {
        let mut out = RGBAIm::new(self.w, self.h);
        for y in 0..self.h {
            let src_row = &self.arr[y * self.s..y * self.s + self.w * 3];
            let dst_row = &mut out.arr[y * self.w * 4..(y + 1) * self.w * 4];
            for (src, dst) in src_row.chunks_exact(3).zip(dst_row.chunks_exact_mut(4)) {
                dst[..3].copy_from_slice(src);
                dst[3] = 255;
            }
        }
        out
    }
}

impl RGBAIm {
    /// Fills every pixel with the same RGBA value.
    pub fn fill_rgba(&mut self, rgba: [u8; 4]) {
        for px in self.arr.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_new_rgba_im() {
        let im = RGBAIm::new(3, 2);
        assert_eq!(im.w, 3);
        assert_eq!(im.h, 2);
        assert_eq!(im.s, 12);
        assert_eq!(im.arr.len(), 3 * 2 * 4);
        assert!(im.arr.iter().all(|&v| v == 0));
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = RGBAIm::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, Error::BufferSize { expected: 16, actual: 15 }));
        assert!(RGBAIm::from_raw(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn pixel_reads_channels_and_bounds() {
        let arr: Vec<u8> = (0..16).collect();
        let im = RGBAIm::from_raw(2, 2, arr).unwrap();
        assert_eq!(im.pixel(1, 0), Some([4, 5, 6, 7]));
        assert_eq!(im.pixel(0, 1), Some([8, 9, 10, 11]));
        assert_eq!(im.pixel(2, 0), None);
        assert_eq!(im.pixel(0, 2), None);
    }

    #[test]
    fn rgb_expands_with_opaque_alpha() {
        let rgb = RGBIm::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let rgba = rgb.to_rgba_im();
        assert_eq!(rgba.arr, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn fill_rgba_sets_every_pixel() {
        let mut im = RGBAIm::new(2, 3);
        im.fill_rgba([9, 8, 7, 6]);
        assert!(im.arr.chunks_exact(4).all(|px| px == [9, 8, 7, 6]));
    }
}
