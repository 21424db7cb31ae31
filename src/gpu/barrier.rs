//! Explicit resource barriers.

use crate::error::Error;
use crate::gpu::api::GraphicsApi;
use crate::gpu::backend::BarrierPayload;
use crate::gpu::resource::{ResourceId, TrackedResource};
use crate::gpu::state::ResourceState;

/// Targets every subresource of the barrier's resource.
pub const SUBRESOURCE_ALL: u32 = u32::MAX;

/// Split-barrier placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarrierFlags {
    /// Whole barrier at one point.
    #[default]
    None,
    /// Begin half of a split barrier.
    BeginOnly,
    /// End half of a split barrier.
    EndOnly,
}

/// Cross-queue synchronization token a barrier may wait on or signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Semaphore(pub u64);

/// A single resource state transition.
///
/// Holds a non-owning [`ResourceId`] rather than the resource itself so a
/// recorded barrier never extends resource lifetime. The API-specific
/// `payload` is computed at construction; an unknown or barrier-less device
/// API is an error, never a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barrier {
    /// API the payload was encoded for.
    pub api: GraphicsApi,
    /// Target resource.
    pub resource: ResourceId,
    /// Subresource index, [`SUBRESOURCE_ALL`] for the whole resource.
    pub subresource: u32,
    /// State before the barrier.
    pub before: ResourceState,
    /// State after the barrier.
    pub after: ResourceState,
    /// Split-barrier placement.
    pub flags: BarrierFlags,
    /// Semaphore to wait on before the transition.
    pub wait: Option<Semaphore>,
    /// Semaphore to signal after the transition.
    pub signal: Option<Semaphore>,
    /// API-specific transition encoding.
    pub payload: BarrierPayload,
}

impl Barrier {
    /// Builds a whole-resource barrier for `resource` on a device whose API
    /// is `api`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedBackend`] when `api` is `None` and
    /// [`Error::InvalidResource`] when the view has no backing allocation.
    pub fn new(
        api: Option<GraphicsApi>,
        resource: &dyn TrackedResource,
        before: ResourceState,
        after: ResourceState,
    ) -> Result<Self, Error> {
        let api = api.ok_or(Error::UnsupportedBackend(None))?;
        let tracking = resource.tracking().ok_or_else(|| Error::InvalidResource {
            name: resource.debug_name().to_owned(),
        })?;
        Ok(Self {
            api,
            resource: tracking.id(),
            subresource: SUBRESOURCE_ALL,
            before,
            after,
            flags: BarrierFlags::None,
            wait: None,
            signal: None,
            payload: BarrierPayload::encode(api, before, after),
        })
    }

    /// Narrows the barrier to one subresource.
    #[must_use]
    pub fn with_subresource(mut self, subresource: u32) -> Self {
        self.subresource = subresource;
        self
    }

    /// Sets split-barrier placement.
    #[must_use]
    pub fn with_flags(mut self, flags: BarrierFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Waits on a semaphore before transitioning.
    #[must_use]
    pub fn with_wait(mut self, semaphore: Semaphore) -> Self {
        self.wait = Some(semaphore);
        self
    }

    /// Signals a semaphore after transitioning.
    #[must_use]
    pub fn with_signal(mut self, semaphore: Semaphore) -> Self {
        self.signal = Some(semaphore);
        self
    }

    /// Rewrites the transition endpoints, re-encoding the payload.
    pub fn update(&mut self, before: ResourceState, after: ResourceState) {
        self.before = before;
        self.after = after;
        self.payload = BarrierPayload::encode(self.api, before, after);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use super::*;
    use crate::gpu::descriptor::TextureDesc;
    use crate::gpu::headless::HeadlessMetrics;
    use crate::gpu::resource::{TextureResource, TextureStorage, TextureUav};

    fn test_texture() -> Arc<TextureResource> {
        let metrics = HeadlessMetrics::new();
        Arc::new(TextureResource::new(
            TextureDesc::new().width(4).height(4).name("barrier target"),
            TextureStorage::Headless(metrics.track_texture(128)),
        ))
    }

    #[test]
    fn test_unknown_api_fails_closed() {
        let tex = test_texture();
        let result = Barrier::new(
            None,
            &tex.uav(),
            ResourceState::Common,
            ResourceState::UnorderedAccess,
        );
        assert!(
            matches!(result, Err(Error::UnsupportedBackend(None))),
            "a missing barrier backend must be an error, not a no-op"
        );
    }

    #[test]
    fn test_invalid_view_is_rejected() {
        let result = Barrier::new(
            Some(GraphicsApi::Vulkan),
            &TextureUav::default(),
            ResourceState::Common,
            ResourceState::UnorderedAccess,
        );
        assert!(matches!(result, Err(Error::InvalidResource { .. })));
    }

    #[test]
    fn test_payload_matches_api() {
        let tex = test_texture();
        let barrier = Barrier::new(
            Some(GraphicsApi::D3d12),
            &tex.uav(),
            ResourceState::Common,
            ResourceState::UnorderedAccess,
        )
        .unwrap();
        assert!(matches!(barrier.payload, BarrierPayload::D3d12 { .. }));
        assert_eq!(barrier.subresource, SUBRESOURCE_ALL);
        assert_eq!(barrier.flags, BarrierFlags::None);
    }

    #[test]
    fn test_update_reencodes_payload() {
        let tex = test_texture();
        let mut barrier = Barrier::new(
            Some(GraphicsApi::D3d12),
            &tex.uav(),
            ResourceState::Common,
            ResourceState::UnorderedAccess,
        )
        .unwrap();
        let old_payload = barrier.payload;
        barrier.update(
            ResourceState::UnorderedAccess,
            ResourceState::NonPixelShaderResource,
        );
        assert_eq!(barrier.before, ResourceState::UnorderedAccess);
        assert_eq!(barrier.after, ResourceState::NonPixelShaderResource);
        assert_ne!(barrier.payload, old_payload);
    }
}
