mod right_shift;

pub use right_shift::{GpuRightShiftPipeline, RightShift};
