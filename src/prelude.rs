// Pixel formats and raw storage
pub use crate::common::{AlignedBytes, PixelFormat};

// Error handling
pub use crate::common::{Error, Result};

// Image types
pub use crate::image::{Image, ImageDesc};

// Context selection and pipeline cache
pub use crate::processing_context::{ContextMode, GpuContext, GpuPipeline, ProcessingContext};

// Operations
pub use crate::ops::{GpuRightShiftPipeline, RightShift};

// GPU
pub use crate::gpu::{Gpu, GpuImage, PendingReadback, WriteBuffer};

// Repro harness
pub use crate::repro::{ReproConfig, ReproHarness, ReproReport};
