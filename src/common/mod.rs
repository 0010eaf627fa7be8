pub(crate) mod aligned_bytes;
pub(crate) mod error;
pub(crate) mod pixel_format;
#[cfg(test)]
pub(crate) mod test_utils;

// Public API
pub use aligned_bytes::AlignedBytes;
pub use error::{Error, Result};
pub use pixel_format::PixelFormat;
