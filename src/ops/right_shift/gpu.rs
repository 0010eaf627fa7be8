use wgpu::util::DeviceExt;

use super::RightShift;
use super::pipeline::GpuRightShiftPipeline;
use crate::common::{PixelFormat, Result};
use crate::gpu::{Gpu, GpuImage};
use crate::image::ImageDesc;

// Format type constants matching shader
const FORMAT_GRAY_U8: u32 = 0;
const FORMAT_GRAY_U16: u32 = 1;

fn format_type(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::GrayU8 => FORMAT_GRAY_U8,
        PixelFormat::GrayU16 => FORMAT_GRAY_U16,
    }
}

/// Number of 32-bit words holding one row's logical pixels.
fn words_per_row(desc: &ImageDesc) -> u32 {
    desc.row_bytes().div_ceil(4) as u32
}

/// GPU shader parameters buffer layout.
/// Must match the WGSL struct exactly (32 bytes, aligned).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Params {
    width: u32,
    height: u32,
    stride_words: u32,
    shift_bits: u32,
    format_type: u32,
    _padding: [u32; 3],
}

/// Applies the right shift in place using the GPU.
pub(super) fn apply(
    params: &RightShift,
    ctx: &Gpu,
    pipeline: &GpuRightShiftPipeline,
    image: &mut GpuImage,
) -> Result<()> {
    params.check_shift(image.desc().pixel_format)?;

    let device = ctx.device();
    let queue = ctx.queue();

    let desc = *image.desc();
    debug_assert!(desc.is_aligned(), "GPU image stride must be 4-byte aligned");

    let uniform_params = Params {
        width: desc.width,
        height: desc.height,
        stride_words: (desc.stride / 4) as u32,
        shift_bits: params.bits,
        format_type: format_type(desc.pixel_format),
        _padding: [0; 3],
    };

    let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("right_shift_params_buffer"),
        contents: bytemuck::bytes_of(&uniform_params),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("right_shift_bind_group"),
        layout: &pipeline.bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: image.write_buffer().as_entire_binding(),
            },
        ],
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("right_shift_encoder"),
    });

    {
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("right_shift_pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&pipeline.compute_pipeline);
        compute_pass.set_bind_group(0, &bind_group, &[]);

        // One thread per packed 32-bit word, 16x16 threads per group
        let workgroups_x = words_per_row(&desc).div_ceil(16);
        let workgroups_y = desc.height.div_ceil(16);
        compute_pass.dispatch_workgroups(workgroups_x, workgroups_y, 1);
    }

    queue.submit(std::iter::once(encoder.finish()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::test_gpu;
    use crate::image::Image;

    fn numbered_u16_image(width: u32, height: u32) -> Image {
        let mut img = Image::new_empty(ImageDesc::packed(width, height, PixelFormat::GrayU16))
            .unwrap();
        for y in 0..height {
            for (x, px) in img.row_u16_mut(y).iter_mut().enumerate() {
                *px = ((y * width + x as u32) * 13 % 0x10000) as u16;
            }
        }
        img
    }

    fn numbered_u8_image(width: u32, height: u32) -> Image {
        let mut img =
            Image::new_empty(ImageDesc::packed(width, height, PixelFormat::GrayU8)).unwrap();
        for y in 0..height {
            for (x, px) in img.row_u8_mut(y).iter_mut().enumerate() {
                *px = ((y * width + x as u32) * 7 % 256) as u8;
            }
        }
        img
    }

    fn shift_on_gpu(ctx: &Gpu, src: &Image, bits: u32) -> Image {
        let pipeline = GpuRightShiftPipeline::new(ctx).unwrap();
        let mut gpu_image = GpuImage::from_image(ctx, src).unwrap();

        RightShift::new(bits)
            .apply_gpu(ctx, &pipeline, &mut gpu_image)
            .unwrap();

        let readback = gpu_image.begin_readback(ctx);
        ctx.wait().unwrap();

        let mut result = Image::new_empty(*src.desc()).unwrap();
        readback.resolve(&mut result).unwrap();
        result
    }

    #[test]
    fn test_gpu_shift_matches_cpu_u16() {
        let Some(ctx) = test_gpu() else {
            return;
        };

        // Odd width exercises the tail word's partial lane
        let src = numbered_u16_image(33, 7);
        let gpu_result = shift_on_gpu(&ctx, &src, 3);

        let mut cpu_result = src.clone();
        RightShift::new(3).apply_cpu(&mut cpu_result).unwrap();

        for y in 0..7 {
            assert_eq!(
                gpu_result.row_u16(y),
                cpu_result.row_u16(y),
                "row {} differs",
                y
            );
        }
    }

    #[test]
    fn test_gpu_shift_matches_cpu_u8() {
        let Some(ctx) = test_gpu() else {
            return;
        };

        let src = numbered_u8_image(13, 5);
        let gpu_result = shift_on_gpu(&ctx, &src, 2);

        let mut cpu_result = src.clone();
        RightShift::new(2).apply_cpu(&mut cpu_result).unwrap();

        for y in 0..5 {
            assert_eq!(
                gpu_result.row_u8(y),
                cpu_result.row_u8(y),
                "row {} differs",
                y
            );
        }
    }

    #[test]
    fn test_gpu_shift_max_u16_by_6() {
        let Some(ctx) = test_gpu() else {
            return;
        };

        let mut src =
            Image::new_empty(ImageDesc::packed(64, 16, PixelFormat::GrayU16)).unwrap();
        src.fill(0xFFFF);

        let result = shift_on_gpu(&ctx, &src, 6);

        for y in 0..16 {
            assert!(
                result.row_u16(y).iter().all(|&px| px == 1023),
                "row {} not fully shifted",
                y
            );
        }
    }

    #[test]
    fn test_gpu_shift_zero_bits_is_identity() {
        let Some(ctx) = test_gpu() else {
            return;
        };

        let src = numbered_u16_image(16, 4);
        let result = shift_on_gpu(&ctx, &src, 0);

        assert_eq!(result.bytes(), src.bytes());
    }

    #[test]
    fn test_gpu_shift_preserves_stride_padding() {
        let Some(ctx) = test_gpu() else {
            return;
        };

        // Width 5 u16 rows: 10 pixel bytes plus 2 padding bytes per row
        let desc = ImageDesc::new(5, 3, PixelFormat::GrayU16);
        let mut src = Image::new_empty(desc).unwrap();
        src.fill(0xFFFF);
        for y in 0..desc.height as usize {
            let row_start = y * desc.stride;
            src.bytes_mut()[row_start + desc.row_bytes()..row_start + desc.stride].fill(0xAB);
        }

        let pipeline = GpuRightShiftPipeline::new(&ctx).unwrap();
        let mut gpu_image = GpuImage::from_image(&ctx, &src).unwrap();
        RightShift::new(6)
            .apply_gpu(&ctx, &pipeline, &mut gpu_image)
            .unwrap();

        // Raw copy of the whole buffer, padding included
        let size = gpu_image.desc().size_in_bytes() as u64;
        let staging = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("right_shift_test_staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        encoder.copy_buffer_to_buffer(&gpu_image.buffer, 0, &staging, 0, size);
        ctx.queue().submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        ctx.wait().unwrap();

        let raw = slice.get_mapped_range();
        for y in 0..desc.height as usize {
            let row_start = y * desc.stride;
            let pixels: &[u16] =
                bytemuck::cast_slice(&raw[row_start..row_start + desc.row_bytes()]);
            assert!(pixels.iter().all(|&px| px == 1023), "row {} not shifted", y);

            let padding = &raw[row_start + desc.row_bytes()..row_start + desc.stride];
            assert!(
                padding.iter().all(|&b| b == 0xAB),
                "row {} padding modified",
                y
            );
        }
        drop(raw);
        staging.unmap();
    }

    #[test]
    fn test_gpu_shift_pipeline_reuse() {
        let Some(ctx) = test_gpu() else {
            return;
        };

        let pipeline = GpuRightShiftPipeline::new(&ctx).unwrap();
        let src = numbered_u16_image(8, 8);
        let mut gpu_image = GpuImage::from_image(&ctx, &src).unwrap();

        // Execute twice with the same pipeline
        apply(&RightShift::new(1), &ctx, &pipeline, &mut gpu_image).unwrap();
        apply(&RightShift::new(2), &ctx, &pipeline, &mut gpu_image).unwrap();

        let readback = gpu_image.begin_readback(&ctx);
        ctx.wait().unwrap();
        let mut result = Image::new_empty(*src.desc()).unwrap();
        readback.resolve(&mut result).unwrap();

        let mut expected = src.clone();
        RightShift::new(3).apply_cpu(&mut expected).unwrap();
        assert_eq!(result.bytes(), expected.bytes());
    }
}
