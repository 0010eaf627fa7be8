mod cpu;
mod gpu;
mod pipeline;

use crate::common::{Error, PixelFormat, Result};
use crate::gpu::{Gpu, GpuImage};
use crate::image::Image;
use crate::processing_context::ProcessingContext;

pub use self::pipeline::GpuRightShiftPipeline;

/// In-place right bit shift over every pixel of a single-channel image.
#[derive(Debug, Clone, Copy)]
pub struct RightShift {
    /// Number of bits each pixel value is shifted right by.
    pub bits: u32,
}

impl RightShift {
    pub fn new(bits: u32) -> Self {
        Self { bits }
    }

    /// The shift must leave at least one bit of the pixel depth.
    fn check_shift(&self, format: PixelFormat) -> Result<()> {
        if self.bits >= format.bit_count() {
            return Err(Error::UnsupportedFormat(format!(
                "right shift by {} bits exceeds the {} pixel depth",
                self.bits, format
            )));
        }

        Ok(())
    }

    /// Applies the shift on the CPU. Reference implementation for the GPU path.
    pub fn apply_cpu(&self, image: &mut Image) -> Result<()> {
        self.check_shift(image.desc().pixel_format)?;
        cpu::apply(self, image);
        Ok(())
    }

    /// Applies the shift to a device image using an already created pipeline.
    pub fn apply_gpu(
        &self,
        ctx: &Gpu,
        pipeline: &GpuRightShiftPipeline,
        image: &mut GpuImage,
    ) -> Result<()> {
        gpu::apply(self, ctx, pipeline, image)
    }

    /// Applies the shift on the context's GPU, creating the pipeline on first use.
    pub fn execute(&self, ctx: &mut ProcessingContext, image: &mut GpuImage) -> Result<()> {
        let gpu_ctx = ctx.gpu_context();
        let gpu = gpu_ctx.gpu().clone();
        let pipeline = gpu_ctx.get_or_create(GpuRightShiftPipeline::new)?;

        self.apply_gpu(&gpu, pipeline, image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageDesc;

    #[test]
    fn test_cpu_shift_u16() {
        let mut img =
            Image::new_empty(ImageDesc::packed(32, 8, PixelFormat::GrayU16)).unwrap();
        img.fill(0xFFFF);

        RightShift::new(6).apply_cpu(&mut img).unwrap();

        for y in 0..8 {
            assert!(img.row_u16(y).iter().all(|&px| px == 1023));
        }
    }

    #[test]
    fn test_cpu_shift_u8() {
        let mut img = Image::new_empty(ImageDesc::packed(9, 3, PixelFormat::GrayU8)).unwrap();
        img.fill(0xF0);

        RightShift::new(4).apply_cpu(&mut img).unwrap();

        for y in 0..3 {
            assert!(img.row_u8(y).iter().all(|&px| px == 0x0F));
        }
    }

    #[test]
    fn test_cpu_shift_zero_bits_is_identity() {
        let mut img =
            Image::new_empty(ImageDesc::packed(7, 2, PixelFormat::GrayU16)).unwrap();
        img.fill(0x1234);

        RightShift::new(0).apply_cpu(&mut img).unwrap();

        for y in 0..2 {
            assert!(img.row_u16(y).iter().all(|&px| px == 0x1234));
        }
    }

    #[test]
    fn test_cpu_shift_leaves_padding_untouched() {
        // Width 3 u8 rows leave one padding byte per row
        let desc = ImageDesc::new(3, 4, PixelFormat::GrayU8);
        let mut img = Image::new_empty(desc).unwrap();
        img.fill(0xFF);
        for y in 0..desc.height as usize {
            img.bytes_mut()[y * desc.stride + desc.row_bytes()] = 0x5A;
        }

        RightShift::new(1).apply_cpu(&mut img).unwrap();

        for y in 0..desc.height as usize {
            assert_eq!(img.bytes()[y * desc.stride + desc.row_bytes()], 0x5A);
        }
    }

    #[test]
    fn test_shift_wider_than_depth_rejected() {
        let mut img =
            Image::new_empty(ImageDesc::packed(4, 4, PixelFormat::GrayU16)).unwrap();

        let err = RightShift::new(16).apply_cpu(&mut img).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));

        let mut img = Image::new_empty(ImageDesc::packed(4, 4, PixelFormat::GrayU8)).unwrap();
        let err = RightShift::new(8).apply_cpu(&mut img).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
