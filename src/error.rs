/// Errors produced while loading, transforming or presenting an image.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The matrix has a determinant of exactly zero and has no inverse.
    #[error("Matrix is singular and cannot be inverted (det={det})")]
    SingularMatrix { det: f64 },

    /// The raw image header has fewer than the four required tokens.
    #[error("Malformed image header: expected 4 tokens (magic, width, height, max), found {found}")]
    MalformedHeader { found: usize },

    /// A header value (width, height or max value) is not a usable number.
    #[error("Invalid image header: {0}")]
    InvalidHeader(String),

    /// The file is shorter than the pixel block the header promises.
    #[error("Truncated pixel data: expected {expected} bytes, file has {actual}")]
    TruncatedPixels { expected: usize, actual: usize },

    /// An image buffer's length does not match its declared dimensions.
    #[error("Buffer length ({actual}) does not match the image size ({expected})")]
    BufferSize { expected: usize, actual: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "im-io")]
    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),

    /// The viewer window failed to start or run.
    #[error("Viewer error: {0}")]
    Viewer(String),
}

pub type Result<T> = std::result::Result<T, Error>;
