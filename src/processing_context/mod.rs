mod gpu_context;

pub use gpu_context::{GpuContext, GpuPipeline};

use crate::prelude::*;

/// Selects which execution context device work runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextMode {
    /// The process-wide shared context, created lazily on first use.
    #[default]
    Shared,
    /// A freshly created context with its own device and queue. Work here has
    /// no ordering relative to the shared context.
    Dedicated,
}

impl std::fmt::Display for ContextMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextMode::Shared => write!(f, "shared"),
            ContextMode::Dedicated => write!(f, "dedicated"),
        }
    }
}

/// Binds all device work of one consumer to a single execution context,
/// chosen once at acquisition, and caches that context's pipelines.
#[derive(Debug)]
pub struct ProcessingContext {
    mode: ContextMode,
    gpu_context: GpuContext,
}

impl ProcessingContext {
    /// Acquires the context selected by `mode`. Fails when no adapter or
    /// device is available.
    pub fn acquire(mode: ContextMode) -> Result<Self> {
        let gpu = match mode {
            ContextMode::Shared => Gpu::shared()?,
            ContextMode::Dedicated => Gpu::new()?,
        };

        Ok(Self {
            mode,
            gpu_context: GpuContext::new(gpu),
        })
    }

    /// Returns the mode this context was acquired with.
    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    /// Returns a reference to the GPU context.
    pub fn gpu(&self) -> &Gpu {
        self.gpu_context.gpu()
    }

    /// Returns a mutable reference to the pipeline cache.
    pub fn gpu_context(&mut self) -> &mut GpuContext {
        &mut self.gpu_context
    }

    /// Blocks until all work submitted to this context has completed.
    pub fn sync(&self) -> Result<()> {
        self.gpu().wait()
    }

    /// Blocks until every known context is idle: this one, plus the shared
    /// one when this context is a different device.
    pub fn sync_all(&self) -> Result<()> {
        self.sync()?;

        if let Some(shared) = Gpu::shared_if_initialized() {
            if !shared.same_device(self.gpu()) {
                shared.wait()?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::init_tracing;

    fn acquire_or_skip(mode: ContextMode) -> Option<ProcessingContext> {
        match ProcessingContext::acquire(mode) {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                eprintln!("Skipping test - no GPU available: {}", e);
                None
            }
        }
    }

    #[test]
    fn test_context_mode_display() {
        assert_eq!(ContextMode::Shared.to_string(), "shared");
        assert_eq!(ContextMode::Dedicated.to_string(), "dedicated");
        assert_eq!(ContextMode::default(), ContextMode::Shared);
    }

    #[test]
    fn test_shared_contexts_use_one_device() {
        init_tracing();
        let Some(first) = acquire_or_skip(ContextMode::Shared) else {
            return;
        };
        let second = ProcessingContext::acquire(ContextMode::Shared).unwrap();

        assert_eq!(first.mode(), ContextMode::Shared);
        assert!(first.gpu().same_device(second.gpu()));
    }

    #[test]
    fn test_dedicated_context_is_independent() {
        init_tracing();
        let Some(dedicated) = acquire_or_skip(ContextMode::Dedicated) else {
            return;
        };
        let shared = ProcessingContext::acquire(ContextMode::Shared).unwrap();

        assert_eq!(dedicated.mode(), ContextMode::Dedicated);
        assert!(!dedicated.gpu().same_device(shared.gpu()));
    }

    #[test]
    fn test_sync_all_covers_both_contexts() {
        init_tracing();
        let Some(dedicated) = acquire_or_skip(ContextMode::Dedicated) else {
            return;
        };
        // Force the shared context into existence so sync_all has to drain it too.
        let _shared = ProcessingContext::acquire(ContextMode::Shared).unwrap();

        dedicated.sync().unwrap();
        dedicated.sync_all().unwrap();
    }
}
