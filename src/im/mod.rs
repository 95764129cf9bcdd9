pub mod core;
#[allow(unused_imports)]
pub use core::{Im, RGBAIm, RGBIm};

pub mod ppm;
#[allow(unused_imports)]
pub use ppm::{decode_ppm, encode_ppm, read_ppm, PpmHeader};

// Optional extras
// -----------------------------------------------------------------------------

#[cfg(feature = "im-io")]
pub mod io;

use crate::error::Result;
use std::path::Path;

/// Reads `.ppm` files with the raw decoder and anything else through `image`.
pub fn read_any<P: AsRef<Path>>(path: P) -> Result<RGBAIm> {
    let path = path.as_ref();
    let is_ppm = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ppm"));

    #[cfg(feature = "im-io")]
    if !is_ppm {
        return RGBAIm::load_any(path);
    }

    #[cfg(not(feature = "im-io"))]
    if !is_ppm {
        log::warn!("{} has no .ppm extension, decoding as raw PPM", path.display());
    }

    read_ppm(path)
}
