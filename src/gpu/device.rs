//! Device construction and resource factories.

use std::sync::Arc;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::gpu::api::GraphicsApi;
use crate::gpu::barrier::Semaphore;
use crate::gpu::command_list::{CommandList, ListBackend};
use crate::gpu::descriptor::{BufferDesc, SamplerDesc, TextureDesc};
use crate::gpu::headless::HeadlessMetrics;
use crate::gpu::pipeline::{ComputeKernel, Pipeline};
use crate::gpu::resource::{
    BufferResource, BufferStorage, Sampler, TextureResource, TextureStorage,
};
use crate::gpu::wgpu_backend::WgpuDevice;

#[derive(Debug)]
enum DeviceBackend {
    Wgpu(WgpuDevice),
    Headless {
        metrics: HeadlessMetrics,
        api: Option<GraphicsApi>,
    },
}

/// Resource, pipeline and command-list factory.
///
/// The backend is fixed at construction: either a real `wgpu` device or a
/// headless device that allocates nothing and only keeps
/// [`HeadlessMetrics`] accounting.
#[derive(Debug)]
pub struct Device {
    backend: DeviceBackend,
}

impl Device {
    /// Wraps an existing `wgpu` device and queue.
    ///
    /// `adapter_backend` decides the barrier payload encoding; backends
    /// without one (GL, browser WebGPU) yield a device on which every
    /// transition fails closed.
    #[must_use]
    pub fn from_wgpu(
        device: wgpu::Device,
        queue: wgpu::Queue,
        adapter_backend: wgpu::Backend,
    ) -> Self {
        let api = GraphicsApi::from_wgpu_backend(adapter_backend);
        match api {
            Some(api) => log::info!("device created, barrier backend {api}"),
            None => log::warn!("device created without a barrier backend ({adapter_backend:?})"),
        }
        Self {
            backend: DeviceBackend::Wgpu(WgpuDevice { device, queue, api }),
        }
    }

    /// An accounting-only device encoding barriers for `api`.
    #[must_use]
    pub fn headless(api: GraphicsApi) -> Self {
        Self {
            backend: DeviceBackend::Headless {
                metrics: HeadlessMetrics::new(),
                api: Some(api),
            },
        }
    }

    /// An accounting-only device with no barrier backend at all.
    #[must_use]
    pub fn headless_unknown_api() -> Self {
        Self {
            backend: DeviceBackend::Headless {
                metrics: HeadlessMetrics::new(),
                api: None,
            },
        }
    }

    /// The barrier-capable API this device encodes for, if any.
    #[must_use]
    pub fn api(&self) -> Option<GraphicsApi> {
        match &self.backend {
            DeviceBackend::Wgpu(wgpu) => wgpu.api,
            DeviceBackend::Headless { api, .. } => *api,
        }
    }

    /// Allocation counters, on the headless backend only.
    #[must_use]
    pub fn metrics(&self) -> Option<&HeadlessMetrics> {
        match &self.backend {
            DeviceBackend::Wgpu(_) => None,
            DeviceBackend::Headless { metrics, .. } => Some(metrics),
        }
    }

    /// Allocates a texture in [`ResourceState::Common`](crate::gpu::ResourceState::Common).
    #[must_use]
    pub fn create_texture(&self, desc: TextureDesc) -> Arc<TextureResource> {
        log::debug!(
            "texture '{}' {}x{} {:?}",
            desc.name,
            desc.width,
            desc.height,
            desc.format
        );
        let storage = match &self.backend {
            DeviceBackend::Wgpu(wgpu) => wgpu.create_texture(&desc),
            DeviceBackend::Headless { metrics, .. } => {
                TextureStorage::Headless(metrics.track_texture(texture_bytes(&desc)))
            }
        };
        Arc::new(TextureResource::new(desc, storage))
    }

    /// Allocates an uninitialized buffer.
    #[must_use]
    pub fn create_buffer(&self, desc: BufferDesc) -> Arc<BufferResource> {
        self.create_buffer_inner(desc, None)
    }

    /// Allocates a buffer initialized with `data`.
    #[must_use]
    pub fn create_buffer_with_data(&self, desc: BufferDesc, data: &[u8]) -> Arc<BufferResource> {
        debug_assert!(
            data.len() as u64 == desc.size_bytes(),
            "buffer '{}': init data is {} bytes, descriptor says {}",
            desc.name,
            data.len(),
            desc.size_bytes()
        );
        self.create_buffer_inner(desc, Some(data))
    }

    fn create_buffer_inner(&self, desc: BufferDesc, data: Option<&[u8]>) -> Arc<BufferResource> {
        log::debug!("buffer '{}' {} bytes", desc.name, desc.size_bytes());
        let storage = match &self.backend {
            DeviceBackend::Wgpu(wgpu) => wgpu.create_buffer(&desc, data),
            DeviceBackend::Headless { metrics, .. } => {
                BufferStorage::Headless(metrics.track_buffer(desc.size_bytes()))
            }
        };
        Arc::new(BufferResource::new(desc, storage))
    }

    /// Mints a cross-queue synchronization token for split barriers.
    #[must_use]
    pub fn create_semaphore(&self) -> Semaphore {
        static NEXT_SEMAPHORE: AtomicU64 = AtomicU64::new(1);
        Semaphore(NEXT_SEMAPHORE.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates a sampler.
    #[must_use]
    pub fn create_sampler(&self, desc: SamplerDesc) -> Sampler {
        let wgpu = match &self.backend {
            DeviceBackend::Wgpu(device) => Some(Arc::new(device.create_sampler(&desc))),
            DeviceBackend::Headless { .. } => None,
        };
        Sampler::new(desc, wgpu)
    }

    /// Compiles `cs` into a pipeline carrying it as the argument struct.
    #[must_use]
    pub fn create_pipeline<K: ComputeKernel>(&self, cs: K) -> Pipeline<K> {
        let wgpu = match &self.backend {
            DeviceBackend::Wgpu(device) => {
                Some(device.create_pipeline(K::LABEL, K::SOURCE, K::ENTRY))
            }
            DeviceBackend::Headless { .. } => None,
        };
        Pipeline::new(cs, wgpu)
    }

    /// Opens a command list for recording.
    #[must_use]
    pub fn create_command_list(&self, label: &'static str) -> CommandList {
        let backend = match &self.backend {
            DeviceBackend::Wgpu(device) => ListBackend::Wgpu {
                device: device.clone(),
                encoder: device
                    .device
                    .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some(label),
                    }),
            },
            DeviceBackend::Headless { .. } => ListBackend::Headless,
        };
        CommandList::new(label, self.api(), backend)
    }

    /// Submits a finished command list.
    pub fn submit(&self, list: CommandList) {
        log::trace!(
            "submit '{}', {} commands",
            list.label(),
            list.commands().len()
        );
        let buffer = list.finish();
        if let (DeviceBackend::Wgpu(device), Some(buffer)) = (&self.backend, buffer) {
            device.queue.submit(std::iter::once(buffer));
        }
    }
}

fn texture_bytes(desc: &TextureDesc) -> u64 {
    let per_texel = u64::from(desc.format.bytes_per_element());
    (0..desc.mip_levels.max(1))
        .map(|mip| {
            let w = u64::from((desc.width >> mip).max(1));
            let h = u64::from((desc.height >> mip).max(1));
            w * h * per_texel
        })
        .sum()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;
    use crate::gpu::descriptor::Format;
    use crate::gpu::resource::TrackedResource;
    use crate::gpu::state::ResourceState;

    #[test]
    fn test_headless_device_counts_allocations() {
        let device = Device::headless(GraphicsApi::Vulkan);
        let metrics = device.metrics().cloned().unwrap_or_default();
        let tex = device.create_texture(
            TextureDesc::new()
                .width(16)
                .height(16)
                .format(Format::Rgba16Float)
                .name("count me"),
        );
        let buf = device.create_buffer(BufferDesc::new().elements(256).format(Format::R32Uint));
        assert_eq!(metrics.live_textures(), 1);
        assert_eq!(metrics.live_buffers(), 1);
        assert_eq!(metrics.texture_bytes(), 16 * 16 * 8);

        drop(tex);
        drop(buf);
        assert_eq!(metrics.live_textures(), 0);
        assert_eq!(metrics.live_buffers(), 0);
    }

    #[test]
    fn test_command_list_inherits_api() {
        let device = Device::headless(GraphicsApi::Metal);
        let cmd = device.create_command_list("frame");
        assert_eq!(cmd.api(), Some(GraphicsApi::Metal));

        let device = Device::headless_unknown_api();
        let cmd = device.create_command_list("frame");
        assert_eq!(cmd.api(), None);
    }

    #[test]
    fn test_transition_round_trip_through_list() {
        let device = Device::headless(GraphicsApi::D3d12);
        let tex = device.create_texture(TextureDesc::new().width(8).height(8).name("t"));
        let mut cmd = device.create_command_list("frame");
        let uav = tex.uav();

        cmd.transition(&uav, ResourceState::UnorderedAccess)
            .unwrap_or_else(|e| panic!("transition failed: {e}"));
        assert_eq!(tex.tracking().state(), ResourceState::UnorderedAccess);
        assert_eq!(
            cmd.tracked_state(tex.tracking().id()),
            Some(ResourceState::UnorderedAccess)
        );

        // Same-state transition records nothing.
        let recorded = cmd.commands().len();
        cmd.transition(&uav, ResourceState::UnorderedAccess)
            .unwrap_or_else(|e| panic!("no-op transition failed: {e}"));
        assert_eq!(cmd.commands().len(), recorded);
        device.submit(cmd);
    }

    #[test]
    fn test_unknown_api_transition_fails_closed() {
        let device = Device::headless_unknown_api();
        let tex = device.create_texture(TextureDesc::new().width(8).height(8).name("t"));
        let mut cmd = device.create_command_list("frame");
        let result = cmd.transition(&tex.uav(), ResourceState::UnorderedAccess);
        assert!(result.is_err(), "transition must not silently no-op");
        assert_eq!(
            tex.tracking().state(),
            ResourceState::Common,
            "failed transition must not change tracked state"
        );
    }

    #[test]
    fn test_semaphores_are_unique() {
        let device = Device::headless(GraphicsApi::Vulkan);
        let a = device.create_semaphore();
        let b = device.create_semaphore();
        assert_ne!(a, b);
    }

    #[test]
    fn test_split_barrier_carries_semaphores() {
        use crate::gpu::barrier::{Barrier, BarrierFlags};
        use crate::gpu::command_list::Command;

        let device = Device::headless(GraphicsApi::Vulkan);
        let tex = device.create_texture(TextureDesc::new().width(8).height(8).name("split"));
        let wait = device.create_semaphore();
        let signal = device.create_semaphore();

        let barrier = Barrier::new(
            device.api(),
            &tex.uav(),
            ResourceState::Common,
            ResourceState::UnorderedAccess,
        )
        .unwrap_or_else(|e| panic!("barrier failed: {e}"))
        .with_flags(BarrierFlags::BeginOnly)
        .with_subresource(0)
        .with_wait(wait)
        .with_signal(signal);

        let mut cmd = device.create_command_list("frame");
        cmd.emit_barrier(barrier);
        assert_eq!(
            cmd.tracked_state(tex.tracking().id()),
            Some(ResourceState::UnorderedAccess)
        );
        let recorded = cmd
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::Transition(b) => Some(b.clone()),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no barrier recorded"));
        assert_eq!(recorded.flags, BarrierFlags::BeginOnly);
        assert_eq!(recorded.subresource, 0);
        assert_eq!(recorded.wait, Some(wait));
        assert_eq!(recorded.signal, Some(signal));
    }

    #[test]
    fn test_mip_chain_byte_accounting() {
        let desc = TextureDesc::new()
            .width(4)
            .height(4)
            .format(Format::R32Float)
            .mip_levels(3);
        // 4x4 + 2x2 + 1x1 texels at 4 bytes each.
        assert_eq!(texture_bytes(&desc), (16 + 4 + 1) * 4);
    }
}
