//! Upload, shift, download loop over one large device surface.
//!
//! Every run fills the host image with the format's maximum value, uploads it,
//! shifts each pixel right on the GPU, downloads the result and checks every
//! pixel. The first divergence aborts the loop with its coordinate.

use tracing::{error, info};

use crate::common::{Error, PixelFormat, Result};
use crate::gpu::GpuImage;
use crate::image::{Image, ImageDesc};
use crate::ops::RightShift;
use crate::processing_context::{ContextMode, ProcessingContext};


/// Configuration of the repro loop.
#[derive(Debug, Clone, Copy)]
pub struct ReproConfig {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub shift_bits: u32,
    pub runs: u32,
    pub context_mode: ContextMode,
}

impl Default for ReproConfig {
    fn default() -> Self {
        Self {
            width: 4096,
            height: 4096,
            pixel_format: PixelFormat::GrayU16,
            shift_bits: 6,
            runs: 10,
            context_mode: ContextMode::Shared,
        }
    }
}

impl ReproConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "surface dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.runs == 0 {
            return Err(Error::InvalidConfig(
                "run count must be non-zero".to_string(),
            ));
        }
        if self.shift_bits >= self.pixel_format.bit_count() {
            return Err(Error::InvalidConfig(format!(
                "shift by {} bits exceeds the {} pixel depth",
                self.shift_bits, self.pixel_format
            )));
        }

        Ok(())
    }

    /// Value every pixel is filled with before upload.
    pub fn fill_value(&self) -> u32 {
        self.pixel_format.max_value()
    }

    /// Value every pixel must hold after the shift.
    pub fn expected_value(&self) -> u32 {
        self.fill_value() >> self.shift_bits
    }
}

/// Outcome of a completed repro loop.
#[derive(Debug, Clone, Copy)]
pub struct ReproReport {
    pub runs: u32,
    pub pixels_verified: u64,
}

/// Drives the upload, shift, download, verify loop on one surface.
#[derive(Debug)]
pub struct ReproHarness {
    config: ReproConfig,
    ctx: ProcessingContext,
    host_image: Image,
    device_image: GpuImage,
}

impl ReproHarness {
    pub fn new(config: ReproConfig) -> Result<Self> {
        config.validate()?;

        let ctx = ProcessingContext::acquire(config.context_mode)?;
        info!("context mode: {}", ctx.mode());

        // Host rows stay packed; the device buffer carries its own pitch. The
        // device allocation is checked against the adapter limits first, so an
        // oversized surface fails before the host buffer is built.
        let desc = ImageDesc::packed(config.width, config.height, config.pixel_format);
        let device_image = GpuImage::new_empty(ctx.gpu(), desc)?;
        let host_image = Image::new_empty(desc)?;

        info!(
            "allocated {} surface, {} bytes on device",
            device_image.desc(),
            device_image.desc().size_in_bytes()
        );

        Ok(Self {
            config,
            ctx,
            host_image,
            device_image,
        })
    }

    /// Runs all configured iterations, stopping at the first failure.
    pub fn run(&mut self) -> Result<ReproReport> {
        for run in 0..self.config.runs {
            info!("run {}/{}", run + 1, self.config.runs);
            self.run_once()?;
        }

        let pixels = self.config.width as u64 * self.config.height as u64;
        Ok(ReproReport {
            runs: self.config.runs,
            pixels_verified: pixels * self.config.runs as u64,
        })
    }

    /// One full cycle: fill, upload, shift, download, verify.
    fn run_once(&mut self) -> Result<()> {
        self.host_image.fill(self.config.fill_value());
        self.device_image.upload(self.ctx.gpu(), &self.host_image)?;

        let shift = RightShift::new(self.config.shift_bits);
        shift.execute(&mut self.ctx, &mut self.device_image)?;

        let readback = self.device_image.begin_readback(self.ctx.gpu());
        self.ctx.sync()?;
        self.ctx.sync_all()?;

        readback.resolve(&mut self.host_image)?;
        verify(&self.host_image, self.config.expected_value())
    }
}

/// Checks every logical pixel, reporting the first mismatch in row-major order.
fn verify(image: &Image, expected: u32) -> Result<()> {
    let desc = *image.desc();

    match desc.pixel_format {
        PixelFormat::GrayU8 => {
            for y in 0..desc.height {
                for (x, &px) in image.row_u8(y).iter().enumerate() {
                    if px as u32 != expected {
                        return Err(mismatch(x as u32, y, expected, px as u32));
                    }
                }
            }
        }
        PixelFormat::GrayU16 => {
            for y in 0..desc.height {
                for (x, &px) in image.row_u16(y).iter().enumerate() {
                    if px as u32 != expected {
                        return Err(mismatch(x as u32, y, expected, px as u32));
                    }
                }
            }
        }
    }

    Ok(())
}

/// Logs the diagnostic line at the detection site, then hands the typed
/// error up for the caller to abort on.
fn mismatch(x: u32, y: u32, expected: u32, actual: u32) -> Error {
    error!(
        "mismatch at ({}, {}): expected {} != actual {}",
        x, y, expected, actual
    );

    Error::Mismatch {
        x,
        y,
        expected,
        actual,
    }
}
