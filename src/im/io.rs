use super::core::RGBAIm;
use crate::error::{Error, Result};
use std::path::Path;

fn dim_mismatch_err() -> image::ImageError {
    image::ImageError::Parameter(image::error::ParameterError::from_kind(
        image::error::ParameterErrorKind::DimensionMismatch,
    ))
}

// PNG I/O
// -----------------------------------------------------------------------------
impl RGBAIm {
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let img = image::RgbaImage::from_raw(self.w as u32, self.h as u32, self.arr.clone())
            .ok_or_else(dim_mismatch_err)?;

        img.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Loads any format the `image` crate understands, converted to RGBA8.
    pub fn load_any<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = image::open(path)?.into_rgba8();
        let w = img.width() as usize;
        let h = img.height() as usize;
        if w == 0 || h == 0 {
            return Err(Error::InvalidHeader(format!("{w}x{h} image is empty")));
        }
        RGBAIm::from_raw(w, h, img.into_raw())
    }
}

// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_save_then_load_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        let arr: Vec<u8> = (0..2 * 3 * 4).map(|v| (v * 10) as u8).collect();
        let im = RGBAIm::from_raw(2, 3, arr).unwrap();
        im.save_png(&path).unwrap();

        let back = RGBAIm::load_any(&path).unwrap();
        assert_eq!(back, im);
    }

    #[test]
    fn load_any_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RGBAIm::load_any(dir.path().join("nope.png")).is_err());
    }
}
