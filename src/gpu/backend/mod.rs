//! Per-API barrier payloads.
//!
//! Each graphics API describes a state transition with different data:
//! Direct3D 12 with resource-state bitmasks, Vulkan with access/stage masks
//! and image layouts, Metal with hazard scopes. The payload for a barrier is
//! computed once at construction by matching on the device's
//! [`GraphicsApi`](crate::gpu::GraphicsApi); the closed enum here is the
//! whole set of supported backends.

pub mod d3d12;
pub mod metal;
pub mod vulkan;

use crate::gpu::{GraphicsApi, ResourceState};

pub use d3d12::D3d12ResourceStates;
pub use metal::MetalHazard;
pub use vulkan::{VulkanAccess, VulkanImageLayout, VulkanStages, VulkanTransition};

/// API-specific encoding of a single state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierPayload {
    /// Direct3D 12 transition barrier operand states.
    D3d12 {
        /// `D3D12_RESOURCE_STATES` before the barrier.
        before: D3d12ResourceStates,
        /// `D3D12_RESOURCE_STATES` after the barrier.
        after: D3d12ResourceStates,
    },
    /// Vulkan memory/image barrier masks and layouts.
    Vulkan(VulkanTransition),
    /// Metal fence update/wait hazard scopes.
    Metal(MetalHazard),
}

impl BarrierPayload {
    /// Encodes a `before -> after` transition for the given API.
    #[must_use]
    pub fn encode(api: GraphicsApi, before: ResourceState, after: ResourceState) -> Self {
        match api {
            GraphicsApi::D3d12 => Self::D3d12 {
                before: D3d12ResourceStates::from_state(before),
                after: D3d12ResourceStates::from_state(after),
            },
            GraphicsApi::Vulkan => Self::Vulkan(VulkanTransition::encode(before, after)),
            GraphicsApi::Metal => Self::Metal(MetalHazard::encode(before, after)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_variant_follows_api() {
        let before = ResourceState::Common;
        let after = ResourceState::UnorderedAccess;
        assert!(matches!(
            BarrierPayload::encode(GraphicsApi::D3d12, before, after),
            BarrierPayload::D3d12 { .. }
        ));
        assert!(matches!(
            BarrierPayload::encode(GraphicsApi::Vulkan, before, after),
            BarrierPayload::Vulkan(_)
        ));
        assert!(matches!(
            BarrierPayload::encode(GraphicsApi::Metal, before, after),
            BarrierPayload::Metal(_)
        ));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let a = BarrierPayload::encode(
            GraphicsApi::Vulkan,
            ResourceState::CopyDest,
            ResourceState::NonPixelShaderResource,
        );
        let b = BarrierPayload::encode(
            GraphicsApi::Vulkan,
            ResourceState::CopyDest,
            ResourceState::NonPixelShaderResource,
        );
        assert_eq!(a, b, "payload encoding must be a pure function");
    }
}
