use crate::common::Result;
use crate::gpu::Gpu;
use crate::processing_context::GpuPipeline;

const RIGHT_SHIFT_SHADER: &str = include_str!("right_shift.wgsl");

/// Cached GPU pipeline for the in-place right shift.
/// Create once and reuse for multiple executions.
#[derive(Debug)]
pub struct GpuRightShiftPipeline {
    pub(super) compute_pipeline: wgpu::ComputePipeline,
    pub(super) bind_group_layout: wgpu::BindGroupLayout,
}

impl GpuRightShiftPipeline {
    /// Creates a new cached pipeline for right shift operations.
    pub fn new(ctx: &Gpu) -> Result<Self> {
        let device = ctx.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("right_shift_shader"),
            source: wgpu::ShaderSource::Wgsl(RIGHT_SHIFT_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("right_shift_bind_group_layout"),
            entries: &[
                // Params uniform
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Pixel words, shifted in place
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("right_shift_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            ..Default::default()
        });

        let compute_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("right_shift_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Ok(Self {
            compute_pipeline,
            bind_group_layout,
        })
    }
}

impl GpuPipeline for GpuRightShiftPipeline {}
