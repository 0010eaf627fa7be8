use std::fmt;

/// Single-channel pixel formats supported by the transfer and shift paths.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum PixelFormat {
    GrayU8,
    GrayU16,
}

impl PixelFormat {
    /// Returns the number of bytes per pixel.
    pub fn byte_count(&self) -> usize {
        match self {
            PixelFormat::GrayU8 => 1,
            PixelFormat::GrayU16 => 2,
        }
    }

    /// Returns the number of bits per pixel.
    pub fn bit_count(&self) -> u32 {
        match self {
            PixelFormat::GrayU8 => 8,
            PixelFormat::GrayU16 => 16,
        }
    }

    /// Returns the maximum representable pixel value.
    pub fn max_value(&self) -> u32 {
        match self {
            PixelFormat::GrayU8 => u8::MAX as u32,
            PixelFormat::GrayU16 => u16::MAX as u32,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::GrayU8 => write!(f, "GRAY_U8"),
            PixelFormat::GrayU16 => write!(f, "GRAY_U16"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_and_bit_counts() {
        assert_eq!(PixelFormat::GrayU8.byte_count(), 1);
        assert_eq!(PixelFormat::GrayU8.bit_count(), 8);
        assert_eq!(PixelFormat::GrayU16.byte_count(), 2);
        assert_eq!(PixelFormat::GrayU16.bit_count(), 16);
    }

    #[test]
    fn test_max_values() {
        assert_eq!(PixelFormat::GrayU8.max_value(), 0xFF);
        assert_eq!(PixelFormat::GrayU16.max_value(), 0xFFFF);
    }

    #[test]
    fn test_display() {
        assert_eq!(PixelFormat::GrayU8.to_string(), "GRAY_U8");
        assert_eq!(PixelFormat::GrayU16.to_string(), "GRAY_U16");
    }
}
