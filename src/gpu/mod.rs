mod gpu_image;

use std::sync::Arc;

use parking_lot::Mutex;

pub use self::gpu_image::{GpuImage, PendingReadback, WriteBuffer};

use crate::common::{Error, Result};

/// Process-wide default context, created lazily on first use.
static SHARED_GPU: Mutex<Option<Gpu>> = Mutex::new(None);

/// GPU context holding wgpu device and queue for compute operations.
///
/// Each `Gpu` owns its own queue; work submitted to one context executes in
/// submission order, while separate contexts have no ordering between them.
#[derive(Debug, Clone)]
pub struct Gpu {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl Gpu {
    /// Creates a new GPU context with its own device and queue.
    pub fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| Error::Gpu(format!("failed to find suitable GPU adapter: {}", e)))?;

        let info = adapter.get_info();
        tracing::info!("adapter: {} ({:?})", info.name, info.backend);

        // Default buffer limits cap storage bindings well below what large
        // surfaces need, so request the adapter's maxima.
        let adapter_limits = adapter.limits();
        let required_limits = wgpu::Limits {
            max_buffer_size: adapter_limits.max_buffer_size,
            max_storage_buffer_binding_size: adapter_limits.max_storage_buffer_binding_size,
            ..wgpu::Limits::default()
        };

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("umbra_device"),
            required_limits,
            ..Default::default()
        }))
        .map_err(|e| Error::Gpu(format!("failed to create device: {}", e)))?;

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Returns the process-wide shared context, creating it on first call.
    pub fn shared() -> Result<Self> {
        let mut slot = SHARED_GPU.lock();
        match &*slot {
            Some(gpu) => Ok(gpu.clone()),
            None => {
                let gpu = Self::new()?;
                *slot = Some(gpu.clone());
                Ok(gpu)
            }
        }
    }

    /// Returns the shared context only if a previous call already created it.
    pub fn shared_if_initialized() -> Option<Self> {
        SHARED_GPU.lock().clone()
    }

    /// Returns a reference to the wgpu device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a clone of the Arc to the wgpu device.
    pub fn device_arc(&self) -> Arc<wgpu::Device> {
        Arc::clone(&self.device)
    }

    /// Returns a reference to the wgpu queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns a clone of the Arc to the wgpu queue.
    pub fn queue_arc(&self) -> Arc<wgpu::Queue> {
        Arc::clone(&self.queue)
    }

    /// Returns true if both contexts drive the same device.
    pub fn same_device(&self, other: &Gpu) -> bool {
        Arc::ptr_eq(&self.device, &other.device)
    }

    /// Blocks until all work submitted to this context has completed.
    pub fn wait(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| Error::Gpu(format!("device wait failed: {}", e)))?;
        Ok(())
    }
}
