//! GPU resources, views and state tracking.
//!
//! Owners ([`TextureResource`], [`BufferResource`]) hold the allocation and
//! the resource's current [`ResourceState`]. Views are cheap clonable
//! handles sharing the owner through an `Arc`; a default-constructed view is
//! invalid and binds nothing, which is how lazily allocated targets read
//! before their first frame.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crate::gpu::descriptor::{BufferDesc, SamplerDesc, TextureDesc};
use crate::gpu::headless::AllocationGuard;
use crate::gpu::state::ResourceState;

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a live resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub(crate) u64);

impl ResourceId {
    fn next() -> Self {
        Self(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity plus tracked usage state, shared by every view of a resource.
#[derive(Debug)]
pub struct ResourceTracking {
    id: ResourceId,
    name: &'static str,
    // Command lists are recorded from one thread; Relaxed is sufficient.
    state: AtomicU32,
}

impl ResourceTracking {
    fn new(name: &'static str) -> Self {
        Self {
            id: ResourceId::next(),
            name,
            state: AtomicU32::new(ResourceState::Common.to_u32()),
        }
    }

    /// Resource identity.
    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Debug name from the creation descriptor.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current tracked usage state.
    #[must_use]
    pub fn state(&self) -> ResourceState {
        ResourceState::from_u32(self.state.load(Ordering::Relaxed))
    }

    /// Records a new usage state.
    pub fn set_state(&self, state: ResourceState) {
        self.state.store(state.to_u32(), Ordering::Relaxed);
    }
}

/// Backend storage behind a texture.
#[derive(Debug)]
pub(crate) enum TextureStorage {
    /// Real allocation.
    Wgpu {
        /// The texture itself, needed for copies.
        texture: wgpu::Texture,
        /// Full-resource view used for all bindings.
        view: wgpu::TextureView,
    },
    /// Accounting-only allocation.
    Headless(AllocationGuard),
}

/// An owned texture allocation.
#[derive(Debug)]
pub struct TextureResource {
    tracking: ResourceTracking,
    desc: TextureDesc,
    storage: TextureStorage,
}

impl TextureResource {
    pub(crate) fn new(desc: TextureDesc, storage: TextureStorage) -> Self {
        Self {
            tracking: ResourceTracking::new(desc.name),
            desc,
            storage,
        }
    }

    /// Creation descriptor.
    #[must_use]
    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    /// Width in texels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    /// Height in texels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.desc.height
    }

    /// Identity and state tracking.
    #[must_use]
    pub fn tracking(&self) -> &ResourceTracking {
        &self.tracking
    }

    pub(crate) fn wgpu_view(&self) -> Option<&wgpu::TextureView> {
        match &self.storage {
            TextureStorage::Wgpu { view, .. } => Some(view),
            TextureStorage::Headless(_) => None,
        }
    }

    pub(crate) fn wgpu_texture(&self) -> Option<&wgpu::Texture> {
        match &self.storage {
            TextureStorage::Wgpu { texture, .. } => Some(texture),
            TextureStorage::Headless(_) => None,
        }
    }

    /// Read-write view of this texture.
    #[must_use]
    pub fn uav(self: &Arc<Self>) -> TextureUav {
        TextureUav(Some(Arc::clone(self)))
    }

    /// Shader-read view of this texture.
    #[must_use]
    pub fn srv(self: &Arc<Self>) -> TextureSrv {
        TextureSrv(Some(Arc::clone(self)))
    }

    /// Render-target view of this texture.
    #[must_use]
    pub fn rtv(self: &Arc<Self>) -> TextureRtv {
        TextureRtv(Some(Arc::clone(self)))
    }
}

/// Backend storage behind a buffer.
#[derive(Debug)]
pub(crate) enum BufferStorage {
    /// Real allocation.
    Wgpu(wgpu::Buffer),
    /// Accounting-only allocation.
    Headless(AllocationGuard),
}

/// An owned buffer allocation.
#[derive(Debug)]
pub struct BufferResource {
    tracking: ResourceTracking,
    desc: BufferDesc,
    storage: BufferStorage,
}

impl BufferResource {
    pub(crate) fn new(desc: BufferDesc, storage: BufferStorage) -> Self {
        Self {
            tracking: ResourceTracking::new(desc.name),
            desc,
            storage,
        }
    }

    /// Creation descriptor.
    #[must_use]
    pub fn desc(&self) -> &BufferDesc {
        &self.desc
    }

    /// Identity and state tracking.
    #[must_use]
    pub fn tracking(&self) -> &ResourceTracking {
        &self.tracking
    }

    pub(crate) fn wgpu_buffer(&self) -> Option<&wgpu::Buffer> {
        match &self.storage {
            BufferStorage::Wgpu(buffer) => Some(buffer),
            BufferStorage::Headless(_) => None,
        }
    }

    /// Read-write view of this buffer.
    #[must_use]
    pub fn uav(self: &Arc<Self>) -> BufferUav {
        BufferUav(Some(Arc::clone(self)))
    }

    /// Shader-read view of this buffer.
    #[must_use]
    pub fn srv(self: &Arc<Self>) -> BufferSrv {
        BufferSrv(Some(Arc::clone(self)))
    }
}

/// Anything a barrier or copy can target: a view over a tracked resource.
pub trait TrackedResource {
    /// The shared tracking record, `None` for an invalid view.
    fn tracking(&self) -> Option<&ResourceTracking>;

    /// Whether the view has a live backing resource.
    fn valid(&self) -> bool {
        self.tracking().is_some()
    }

    /// Debug name, `"<invalid>"` for an invalid view.
    fn debug_name(&self) -> &'static str {
        self.tracking().map_or("<invalid>", ResourceTracking::name)
    }
}

/// Texture views, for operations that need the backing texture itself.
pub trait TextureHandle: TrackedResource {
    /// Backing texture, if the view is valid.
    fn texture(&self) -> Option<&Arc<TextureResource>>;
}

macro_rules! texture_view {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default)]
        pub struct $name(Option<Arc<TextureResource>>);

        impl $name {
            /// Width of the backing texture, zero when invalid.
            #[must_use]
            pub fn width(&self) -> u32 {
                self.0.as_ref().map_or(0, |t| t.width())
            }

            /// Height of the backing texture, zero when invalid.
            #[must_use]
            pub fn height(&self) -> u32 {
                self.0.as_ref().map_or(0, |t| t.height())
            }
        }

        impl TrackedResource for $name {
            fn tracking(&self) -> Option<&ResourceTracking> {
                self.0.as_deref().map(TextureResource::tracking)
            }
        }

        impl TextureHandle for $name {
            fn texture(&self) -> Option<&Arc<TextureResource>> {
                self.0.as_ref()
            }
        }
    };
}

texture_view!(
    /// Read-write (storage) texture view.
    TextureUav
);
texture_view!(
    /// Shader-read (sampled) texture view.
    TextureSrv
);
texture_view!(
    /// Render-target texture view.
    TextureRtv
);

macro_rules! buffer_view {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default)]
        pub struct $name(Option<Arc<BufferResource>>);

        impl $name {
            /// Backing buffer, if the view is valid.
            #[must_use]
            pub fn buffer(&self) -> Option<&Arc<BufferResource>> {
                self.0.as_ref()
            }
        }

        impl TrackedResource for $name {
            fn tracking(&self) -> Option<&ResourceTracking> {
                self.0.as_deref().map(BufferResource::tracking)
            }
        }
    };
}

buffer_view!(
    /// Read-write (storage) buffer view.
    BufferUav
);
buffer_view!(
    /// Shader-read buffer view.
    BufferSrv
);

/// A sampler object.
#[derive(Debug, Clone)]
pub struct Sampler {
    desc: SamplerDesc,
    wgpu: Option<Arc<wgpu::Sampler>>,
}

impl Sampler {
    pub(crate) fn new(desc: SamplerDesc, wgpu: Option<Arc<wgpu::Sampler>>) -> Self {
        Self { desc, wgpu }
    }

    /// Creation descriptor.
    #[must_use]
    pub fn desc(&self) -> &SamplerDesc {
        &self.desc
    }

    pub(crate) fn wgpu_sampler(&self) -> Option<&wgpu::Sampler> {
        self.wgpu.as_deref()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::gpu::headless::HeadlessMetrics;

    fn headless_texture(name: &'static str) -> Arc<TextureResource> {
        let metrics = HeadlessMetrics::new();
        let guard = metrics.track_texture(64 * 64 * 8);
        Arc::new(TextureResource::new(
            TextureDesc::new().width(64).height(64).name(name),
            TextureStorage::Headless(guard),
        ))
    }

    #[test]
    fn test_default_views_are_invalid() {
        assert!(!TextureUav::default().valid());
        assert!(!TextureSrv::default().valid());
        assert!(!BufferSrv::default().valid());
        assert_eq!(TextureUav::default().debug_name(), "<invalid>");
        assert_eq!(TextureUav::default().width(), 0);
    }

    #[test]
    fn test_views_share_tracking() {
        let tex = headless_texture("shared");
        let uav = tex.uav();
        let srv = tex.srv();
        assert!(uav.valid() && srv.valid());
        let uav_tracking = uav.tracking().unwrap();
        let srv_tracking = srv.tracking().unwrap();
        assert_eq!(uav_tracking.id(), srv_tracking.id());

        uav_tracking.set_state(ResourceState::UnorderedAccess);
        assert_eq!(
            srv_tracking.state(),
            ResourceState::UnorderedAccess,
            "state changes must be visible through every view"
        );
    }

    #[test]
    fn test_resources_start_in_common() {
        let tex = headless_texture("fresh");
        assert_eq!(tex.tracking().state(), ResourceState::Common);
    }

    #[test]
    fn test_resource_ids_are_unique() {
        let a = headless_texture("a");
        let b = headless_texture("b");
        assert_ne!(a.tracking().id(), b.tracking().id());
    }
}
