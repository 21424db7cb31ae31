//! Real-device backend on top of `wgpu`.
//!
//! `wgpu` tracks hazards itself, so recorded barriers carry no encoder-side
//! operation here; they are still validated and logged so captures read the
//! same on every backend.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::gpu::api::GraphicsApi;
use crate::gpu::descriptor::{
    BufferDesc, Filter, Format, ResourceUsage, SamplerDesc, TextureAddressMode, TextureDesc,
};
use crate::gpu::pipeline::Binding;
use crate::gpu::resource::{BufferStorage, TextureHandle, TextureStorage};

/// Handles to a live `wgpu` device.
#[derive(Debug, Clone)]
pub(crate) struct WgpuDevice {
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    pub(crate) api: Option<GraphicsApi>,
}

impl WgpuDevice {
    pub(crate) fn create_texture(&self, desc: &TextureDesc) -> TextureStorage {
        let format = texture_format(desc.format, desc.usage);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.name),
            size: wgpu::Extent3d {
                width: desc.width.max(1),
                height: desc.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: desc.mip_levels.max(1),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: texture_usages(desc.usage),
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        TextureStorage::Wgpu { texture, view }
    }

    pub(crate) fn create_buffer(&self, desc: &BufferDesc, data: Option<&[u8]>) -> BufferStorage {
        let usage = buffer_usages(desc.usage);
        let buffer = match data {
            Some(contents) => self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(desc.name),
                    contents,
                    usage,
                }),
            None => self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(desc.name),
                size: desc.size_bytes().max(4),
                usage,
                mapped_at_creation: false,
            }),
        };
        BufferStorage::Wgpu(buffer)
    }

    pub(crate) fn create_sampler(&self, desc: &SamplerDesc) -> wgpu::Sampler {
        let address_mode = match desc.address_mode {
            TextureAddressMode::Clamp => wgpu::AddressMode::ClampToEdge,
            TextureAddressMode::Wrap => wgpu::AddressMode::Repeat,
            TextureAddressMode::Mirror => wgpu::AddressMode::MirrorRepeat,
        };
        let (mag, min, mip) = match desc.filter {
            Filter::Point => (
                wgpu::FilterMode::Nearest,
                wgpu::FilterMode::Nearest,
                wgpu::FilterMode::Nearest,
            ),
            Filter::Bilinear => (
                wgpu::FilterMode::Linear,
                wgpu::FilterMode::Linear,
                wgpu::FilterMode::Nearest,
            ),
            Filter::Trilinear => (
                wgpu::FilterMode::Linear,
                wgpu::FilterMode::Linear,
                wgpu::FilterMode::Linear,
            ),
        };
        self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: None,
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: mag,
            min_filter: min,
            mipmap_filter: mip,
            ..Default::default()
        })
    }

    pub(crate) fn create_pipeline(
        &self,
        label: &'static str,
        source: &'static str,
        entry: &'static str,
    ) -> Arc<wgpu::ComputePipeline> {
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        let pipeline = self
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: None,
                module: &module,
                entry_point: Some(entry),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });
        Arc::new(pipeline)
    }

    /// Encodes one compute dispatch with an ad-hoc bind group.
    pub(crate) fn encode_dispatch(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipeline: &wgpu::ComputePipeline,
        label: &'static str,
        bindings: &[(u32, Binding)],
        (x, y, z): (u32, u32, u32),
    ) {
        let mut entries = Vec::with_capacity(bindings.len());
        // Uniform payloads get a transient buffer each; the bind group keeps
        // them alive through submission.
        let mut uniforms = Vec::new();
        for (slot, binding) in bindings {
            if let Binding::Uniform(data) = binding {
                uniforms.push((
                    *slot,
                    self.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(label),
                            contents: data,
                            usage: wgpu::BufferUsages::UNIFORM,
                        }),
                ));
            }
        }
        for (slot, binding) in bindings {
            let resource = match binding {
                Binding::TextureSrv(view) => view
                    .texture()
                    .and_then(|t| t.wgpu_view())
                    .map(wgpu::BindingResource::TextureView),
                Binding::TextureUav(view) => view
                    .texture()
                    .and_then(|t| t.wgpu_view())
                    .map(wgpu::BindingResource::TextureView),
                Binding::BufferSrv(view) => view
                    .buffer()
                    .and_then(|b| b.wgpu_buffer())
                    .map(wgpu::Buffer::as_entire_binding),
                Binding::BufferUav(view) => view
                    .buffer()
                    .and_then(|b| b.wgpu_buffer())
                    .map(wgpu::Buffer::as_entire_binding),
                Binding::Sampler(sampler) => {
                    sampler.wgpu_sampler().map(wgpu::BindingResource::Sampler)
                }
                Binding::Uniform(_) => uniforms
                    .iter()
                    .find(|(uniform_slot, _)| uniform_slot == slot)
                    .map(|(_, buffer)| buffer.as_entire_binding()),
            };
            if let Some(resource) = resource {
                entries.push(wgpu::BindGroupEntry {
                    binding: *slot,
                    resource,
                });
            } else {
                log::error!("pipeline '{label}': binding {slot} has no backing resource");
                return;
            }
        }
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &pipeline.get_bind_group_layout(0),
            entries: &entries,
        });
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(label),
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(x, y, z);
    }
}

/// Maps a descriptor format to a `wgpu` format, promoting formats without
/// storage capability when a storage binding is required.
pub(crate) fn texture_format(format: Format, usage: ResourceUsage) -> wgpu::TextureFormat {
    let storage = usage == ResourceUsage::GpuReadWrite;
    match format {
        Format::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
        Format::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        Format::R11G11B10Float => {
            if storage {
                wgpu::TextureFormat::Rgba16Float
            } else {
                wgpu::TextureFormat::Rg11b10Ufloat
            }
        }
        Format::R32Float => wgpu::TextureFormat::R32Float,
        Format::R32Uint => wgpu::TextureFormat::R32Uint,
        Format::R8Unorm => {
            if storage {
                wgpu::TextureFormat::R32Float
            } else {
                wgpu::TextureFormat::R8Unorm
            }
        }
        Format::R8Uint => {
            if storage {
                wgpu::TextureFormat::R32Uint
            } else {
                wgpu::TextureFormat::R8Uint
            }
        }
        Format::Structured => wgpu::TextureFormat::Rgba8Unorm,
    }
}

fn texture_usages(usage: ResourceUsage) -> wgpu::TextureUsages {
    let base = wgpu::TextureUsages::TEXTURE_BINDING
        | wgpu::TextureUsages::COPY_SRC
        | wgpu::TextureUsages::COPY_DST;
    match usage {
        ResourceUsage::GpuRead => base,
        ResourceUsage::GpuReadWrite => base | wgpu::TextureUsages::STORAGE_BINDING,
        ResourceUsage::GpuRenderTarget => base | wgpu::TextureUsages::RENDER_ATTACHMENT,
    }
}

fn buffer_usages(usage: ResourceUsage) -> wgpu::BufferUsages {
    let base = wgpu::BufferUsages::STORAGE
        | wgpu::BufferUsages::COPY_SRC
        | wgpu::BufferUsages::COPY_DST;
    match usage {
        ResourceUsage::GpuRead | ResourceUsage::GpuReadWrite | ResourceUsage::GpuRenderTarget => {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_promotion() {
        assert_eq!(
            texture_format(Format::R8Unorm, ResourceUsage::GpuReadWrite),
            wgpu::TextureFormat::R32Float
        );
        assert_eq!(
            texture_format(Format::R8Uint, ResourceUsage::GpuReadWrite),
            wgpu::TextureFormat::R32Uint
        );
        assert_eq!(
            texture_format(Format::R11G11B10Float, ResourceUsage::GpuReadWrite),
            wgpu::TextureFormat::Rgba16Float
        );
    }

    #[test]
    fn test_sampled_formats_unpromoted() {
        assert_eq!(
            texture_format(Format::R8Unorm, ResourceUsage::GpuRead),
            wgpu::TextureFormat::R8Unorm
        );
        assert_eq!(
            texture_format(Format::R11G11B10Float, ResourceUsage::GpuRead),
            wgpu::TextureFormat::Rg11b10Ufloat
        );
        assert_eq!(
            texture_format(Format::Rgba16Float, ResourceUsage::GpuReadWrite),
            wgpu::TextureFormat::Rgba16Float
        );
    }
}
