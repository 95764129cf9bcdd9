// Raw PPM-style decoder.
//
// The header is four tokens (magic, width, height, max value) separated by
// whitespace, where `#` starts a comment that runs to the end of the line.
// The pixel block is the last `w * h * 3` bytes of the file; whatever sits
// between the header and the pixels is ignored.

use super::core::{RGBAIm, RGBIm};
use crate::error::{Error, Result};
use std::path::Path;

const N_HEADER_TOKENS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpmHeader {
    pub magic: String,
    pub w: usize,
    pub h: usize,
    pub max_value: u32,
}

impl PpmHeader {
    pub fn pixel_bytes(&self) -> Result<usize> {
        self.w
            .checked_mul(self.h)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| Error::InvalidHeader(format!("{}x{} is too large", self.w, self.h)))
    }
}

/// Byte ranges of up to `N_HEADER_TOKENS` header tokens.
fn scan_header_tokens(bytes: &[u8]) -> Vec<(usize, usize)> {
    let mut tokens = Vec::with_capacity(N_HEADER_TOKENS);
    let mut i = 0;
    while i < bytes.len() && tokens.len() < N_HEADER_TOKENS {
        let b = bytes[i];
        if b == b'#' {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'#' {
            i += 1;
        }
        tokens.push((start, i));
    }
    tokens
}

fn token_str(bytes: &[u8], (start, end): (usize, usize)) -> String {
    String::from_utf8_lossy(&bytes[start..end]).into_owned()
}

fn parse_dim(name: &str, tok: &str) -> Result<usize> {
    match tok.parse::<usize>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::InvalidHeader(format!(
            "{name} must be a positive integer, got {tok:?}"
        ))),
    }
}

fn count_tokens_before(tokens: &[(usize, usize)], limit: usize) -> usize {
    tokens.iter().filter(|(_, end)| *end <= limit).count()
}

/// Parses the dimension at `tokens[i]`.
///
/// The pixel block holds at least `min_pixel_bytes`, so an unparseable token
/// reaching into that tail was scanned out of pixel data and the header is
/// really short of tokens.
fn parse_dim_token(
    bytes: &[u8],
    tokens: &[(usize, usize)],
    i: usize,
    name: &str,
    min_pixel_bytes: usize,
) -> Result<usize> {
    parse_dim(name, &token_str(bytes, tokens[i])).map_err(|e| {
        let limit = bytes.len().saturating_sub(min_pixel_bytes);
        if tokens[i].1 > limit {
            Error::MalformedHeader {
                found: count_tokens_before(tokens, limit),
            }
        } else {
            e
        }
    })
}

/// Decodes a raw RGB image, expanding it to RGBA with alpha 255.
pub fn decode_ppm(bytes: &[u8]) -> Result<RGBAIm> {
    let tokens = scan_header_tokens(bytes);
    if tokens.len() < N_HEADER_TOKENS {
        return Err(Error::MalformedHeader {
            found: tokens.len(),
        });
    }

    let magic = token_str(bytes, tokens[0]);
    let w = parse_dim_token(bytes, &tokens, 1, "width", 3)?;
    let h = parse_dim_token(bytes, &tokens, 2, "height", w.saturating_mul(3))?;
    let mut header = PpmHeader {
        magic,
        w,
        h,
        max_value: 0,
    };

    let n_bytes = header.pixel_bytes()?;
    if n_bytes > bytes.len() {
        return Err(Error::TruncatedPixels {
            expected: n_bytes,
            actual: bytes.len(),
        });
    }

    // Tokens that only exist because the scan ran into the pixel block don't count.
    let pixel_start = bytes.len() - n_bytes;
    let header_tokens = count_tokens_before(&tokens, pixel_start);
    if header_tokens < N_HEADER_TOKENS {
        return Err(Error::MalformedHeader {
            found: header_tokens,
        });
    }

    let max_tok = token_str(bytes, tokens[3]);
    header.max_value = max_tok
        .parse::<u32>()
        .map_err(|_| Error::InvalidHeader(format!("max value must be an integer, got {max_tok:?}")))?;

    if header.magic != "P6" {
        log::warn!("unexpected image magic {:?}, decoding as raw RGB", header.magic);
    }
    log::debug!(
        "Format: {} Width: {} Height: {} Max Value: {}",
        header.magic,
        header.w,
        header.h,
        header.max_value
    );

    let rgb = RGBIm::from_raw(header.w, header.h, bytes[pixel_start..].to_vec())?;
    Ok(rgb.to_rgba_im())
}

pub fn read_ppm<P: AsRef<Path>>(path: P) -> Result<RGBAIm> {
    let bytes = std::fs::read(path.as_ref())?;
    log::info!("read {} ({} bytes)", path.as_ref().display(), bytes.len());
    decode_ppm(&bytes)
}

/// Encodes as binary P6 with max value 255, alpha dropped.
pub fn encode_ppm(im: &RGBAIm) -> Vec<u8> {
    let header = format!("P6\n{} {}\n255\n", im.w, im.h);
    let mut out = Vec::with_capacity(header.len() + im.n_pixels() * 3);
    out.extend_from_slice(header.as_bytes());
    for px in im.arr.chunks_exact(4) {
        out.extend_from_slice(&px[..3]);
    }
    out
}
