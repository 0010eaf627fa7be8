mod stride;


use crate::common::{AlignedBytes, Error, PixelFormat, Result};

use stride::align_stride;

/// Geometry of a single-channel image buffer.
///
/// `stride` is the byte distance between the starts of consecutive rows and
/// travels with the buffer everywhere; it is never re-derived from the width.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub pixel_format: PixelFormat,
}

impl ImageDesc {
    /// Creates a descriptor with 4-byte aligned stride.
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            stride: align_stride(width as usize * pixel_format.byte_count()),
            pixel_format,
        }
    }

    /// Creates a descriptor with tightly packed rows (stride equals row bytes).
    pub fn packed(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            stride: width as usize * pixel_format.byte_count(),
            pixel_format,
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.height as usize * self.stride
    }

    /// Returns the number of bytes per row without padding.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.pixel_format.byte_count()
    }

    /// Returns true if stride equals row bytes (no padding).
    pub fn is_packed(&self) -> bool {
        self.stride == self.row_bytes()
    }

    /// Returns true if the stride is 4-byte aligned.
    pub fn is_aligned(&self) -> bool {
        self.stride.is_multiple_of(4)
    }

    /// Returns a new descriptor with 4-byte aligned stride.
    pub fn with_aligned_stride(self) -> Self {
        Self {
            stride: align_stride(self.row_bytes()),
            ..self
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "image dimensions must be non-zero, got {}",
                self
            )));
        }
        if self.stride < self.row_bytes() {
            return Err(Error::InvalidConfig(format!(
                "stride {} is smaller than row bytes {}",
                self.stride,
                self.row_bytes()
            )));
        }
        if !self.stride.is_multiple_of(self.pixel_format.byte_count()) {
            return Err(Error::InvalidConfig(format!(
                "stride {} is not a multiple of the {} pixel size",
                self.stride, self.pixel_format
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for ImageDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.pixel_format)
    }
}

/// Host-side image buffer with explicit stride.
#[derive(Clone, Debug)]
pub struct Image {
    desc: ImageDesc,
    bytes: AlignedBytes,
}

impl Image {
    pub fn new_empty(desc: ImageDesc) -> Result<Image> {
        desc.validate()?;

        let bytes = AlignedBytes::new_zeroed(desc.size_in_bytes());

        Ok(Image { desc, bytes })
    }

    /// Returns the image descriptor.
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    /// Returns the image bytes as a slice.
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Returns the image bytes as a mutable slice.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        self.bytes.as_mut_slice()
    }

    /// Overwrites every logical pixel with `value`. Stride padding is left as is.
    pub fn fill(&mut self, value: u32) {
        assert!(
            value <= self.desc.pixel_format.max_value(),
            "fill value {} does not fit {}",
            value,
            self.desc.pixel_format
        );

        match self.desc.pixel_format {
            PixelFormat::GrayU8 => {
                for y in 0..self.desc.height {
                    self.row_u8_mut(y).fill(value as u8);
                }
            }
            PixelFormat::GrayU16 => {
                for y in 0..self.desc.height {
                    self.row_u16_mut(y).fill(value as u16);
                }
            }
        }
    }

    pub fn row_u8(&self, y: u32) -> &[u8] {
        debug_assert_eq!(self.desc.pixel_format, PixelFormat::GrayU8);
        let start = y as usize * self.desc.stride;
        &self.bytes.as_slice()[start..start + self.desc.row_bytes()]
    }

    pub fn row_u8_mut(&mut self, y: u32) -> &mut [u8] {
        debug_assert_eq!(self.desc.pixel_format, PixelFormat::GrayU8);
        let start = y as usize * self.desc.stride;
        let row_bytes = self.desc.row_bytes();
        &mut self.bytes.as_mut_slice()[start..start + row_bytes]
    }

    pub fn row_u16(&self, y: u32) -> &[u16] {
        debug_assert_eq!(self.desc.pixel_format, PixelFormat::GrayU16);
        let start = y as usize * self.desc.stride;
        bytemuck::cast_slice(&self.bytes.as_slice()[start..start + self.desc.row_bytes()])
    }

    pub fn row_u16_mut(&mut self, y: u32) -> &mut [u16] {
        debug_assert_eq!(self.desc.pixel_format, PixelFormat::GrayU16);
        let start = y as usize * self.desc.stride;
        let row_bytes = self.desc.row_bytes();
        bytemuck::cast_slice_mut(&mut self.bytes.as_mut_slice()[start..start + row_bytes])
    }
}
