use std::borrow::Cow;
use std::sync::mpsc;

use wgpu::util::DeviceExt;

use crate::prelude::*;

/// Wrapper for writable buffer access.
#[derive(Debug)]
pub struct WriteBuffer<'a>(pub(crate) &'a wgpu::Buffer);

impl WriteBuffer<'_> {
    /// Returns the entire buffer as a binding resource.
    pub fn as_entire_binding(&self) -> wgpu::BindingResource<'_> {
        self.0.as_entire_binding()
    }
}

/// Image data stored on the GPU as a buffer with aligned stride.
#[derive(Debug)]
pub struct GpuImage {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) desc: ImageDesc,
}

impl GpuImage {
    /// Creates an empty GPU image with the given descriptor, validated
    /// against the device's buffer limits before any allocation happens.
    pub fn new_empty(ctx: &Gpu, desc: ImageDesc) -> Result<Self> {
        let desc = desc.with_aligned_stride();
        desc.validate()?;
        let size = check_allocation(ctx, &desc)?;

        let buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu_image_buffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self { buffer, desc })
    }

    /// Creates a new GPU image from CPU image data.
    pub fn from_image(ctx: &Gpu, image: &Image) -> Result<Self> {
        let desc = image.desc().with_aligned_stride();
        check_allocation(ctx, &desc)?;

        let bytes = restride_rows(image, &desc);

        let buffer = ctx
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("gpu_image_buffer"),
                contents: &bytes,
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST,
            });

        Ok(Self { buffer, desc })
    }

    /// Stages host rows into the device buffer, re-striding when the pitches
    /// differ. The data lands on the device ahead of the next submit on this
    /// context's queue.
    pub fn upload(&mut self, ctx: &Gpu, image: &Image) -> Result<()> {
        if image.desc().width != self.desc.width
            || image.desc().height != self.desc.height
            || image.desc().pixel_format != self.desc.pixel_format
        {
            return Err(Error::Gpu(format!(
                "upload source {} does not match destination {}",
                image.desc(),
                self.desc
            )));
        }

        let bytes = restride_rows(image, &self.desc);
        ctx.queue().write_buffer(&self.buffer, 0, &bytes);

        Ok(())
    }

    /// Schedules a download of the buffer on this context.
    ///
    /// The copy and the map request are submitted here; the bytes only become
    /// available once the context has been synchronized. Resolve the returned
    /// handle after that.
    pub fn begin_readback(&self, ctx: &Gpu) -> PendingReadback {
        let size = self.desc.size_in_bytes() as u64;

        let staging = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu_image_staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gpu_image_download_encoder"),
            });

        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, size);
        ctx.queue().submit(std::iter::once(encoder.finish()));

        let (sender, receiver) = mpsc::channel();
        staging.slice(..).map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        PendingReadback {
            staging,
            desc: self.desc,
            receiver,
        }
    }

    /// Returns the image descriptor.
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    /// Returns a writable buffer wrapper for binding in shaders.
    ///
    /// Note: `&mut self` is intentional to prevent accidental writes to non-mutable buffers.
    pub fn write_buffer(&mut self) -> WriteBuffer<'_> {
        WriteBuffer(&self.buffer)
    }
}

/// A download in flight on one context.
///
/// The map result arrives once that context is synchronized; `resolve` blocks
/// on it, so synchronize first.
#[derive(Debug)]
pub struct PendingReadback {
    staging: wgpu::Buffer,
    desc: ImageDesc,
    receiver: mpsc::Receiver<std::result::Result<(), wgpu::BufferAsyncError>>,
}

impl PendingReadback {
    /// Copies the downloaded rows into `target`, honoring both strides.
    pub fn resolve(self, target: &mut Image) -> Result<()> {
        let desc = self.desc;
        if target.desc().width != desc.width
            || target.desc().height != desc.height
            || target.desc().pixel_format != desc.pixel_format
        {
            return Err(Error::Gpu(format!(
                "readback target {} does not match source {}",
                target.desc(),
                desc
            )));
        }

        self.receiver
            .recv()
            .map_err(|_| Error::Gpu("readback completion was never reported".to_string()))?
            .map_err(|e| Error::Gpu(format!("readback map failed: {}", e)))?;

        let data = self.staging.slice(..).get_mapped_range();
        let row_bytes = desc.row_bytes();
        let dst_stride = target.desc().stride;
        let dst = target.bytes_mut();
        for y in 0..desc.height as usize {
            dst[y * dst_stride..y * dst_stride + row_bytes]
                .copy_from_slice(&data[y * desc.stride..y * desc.stride + row_bytes]);
        }
        drop(data);
        self.staging.unmap();

        Ok(())
    }
}

fn restride_rows<'a>(image: &'a Image, desc: &ImageDesc) -> Cow<'a, [u8]> {
    if image.desc().stride == desc.stride {
        Cow::Borrowed(image.bytes())
    } else {
        // Copy pixel rows over to the destination pitch
        let src = image.bytes();
        let src_stride = image.desc().stride;
        let row_bytes = image.desc().row_bytes();
        let mut buf = vec![0u8; desc.size_in_bytes()];
        for y in 0..desc.height as usize {
            buf[y * desc.stride..y * desc.stride + row_bytes]
                .copy_from_slice(&src[y * src_stride..y * src_stride + row_bytes]);
        }
        Cow::Owned(buf)
    }
}

fn check_allocation(ctx: &Gpu, desc: &ImageDesc) -> Result<u64> {
    let size = (desc.height as u64)
        .checked_mul(desc.stride as u64)
        .ok_or_else(|| Error::Gpu(format!("surface size overflows for {}", desc)))?;

    let limits = ctx.device().limits();
    if size > limits.max_buffer_size || size > limits.max_storage_buffer_binding_size as u64 {
        return Err(Error::Gpu(format!(
            "cannot allocate {} surface: {} bytes exceeds device limits \
             (max buffer size {}, max storage binding size {})",
            desc, size, limits.max_buffer_size, limits.max_storage_buffer_binding_size
        )));
    }

    Ok(size)
}
