//! Metal barrier encoding.
//!
//! Metal tracks residency and layouts itself; a transition only needs to
//! scope the hazard so the encoder can fence the right resource class and
//! know whether the producing side wrote.

use crate::gpu::ResourceState;

/// Resource class a Metal fence must cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetalScope {
    /// Buffer-only hazard.
    Buffers,
    /// Texture hazard.
    Textures,
    /// Render-target hazard (color or depth attachments).
    RenderTargets,
}

/// Hazard description for one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetalHazard {
    /// Resource class the fence covers.
    pub scope: MetalScope,
    /// Whether the state before the barrier could have written.
    pub producer_writes: bool,
    /// Whether the state after the barrier will write.
    pub consumer_writes: bool,
}

impl MetalHazard {
    /// Encodes the hazard scope for a transition.
    #[must_use]
    pub fn encode(before: ResourceState, after: ResourceState) -> Self {
        Self {
            scope: scope_for(after).or_else(|| scope_for(before)).unwrap_or(MetalScope::Textures),
            producer_writes: !before.is_read_only(),
            consumer_writes: !after.is_read_only(),
        }
    }
}

fn scope_for(state: ResourceState) -> Option<MetalScope> {
    match state {
        ResourceState::RenderTarget
        | ResourceState::DepthWrite
        | ResourceState::DepthRead
        | ResourceState::ResolveDest
        | ResourceState::ResolveSource => Some(MetalScope::RenderTargets),
        ResourceState::VertexAndConstantBuffer
        | ResourceState::IndexBuffer
        | ResourceState::StreamOut
        | ResourceState::IndirectArgument
        | ResourceState::Predication => Some(MetalScope::Buffers),
        ResourceState::NonPixelShaderResource | ResourceState::PixelShaderResource => {
            Some(MetalScope::Textures)
        }
        // Ambiguous between buffers and textures; resolved by the other side.
        ResourceState::Common
        | ResourceState::UnorderedAccess
        | ResourceState::CopyDest
        | ResourceState::CopySource
        | ResourceState::GenericRead
        | ResourceState::Present => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_to_read_hazard() {
        let h = MetalHazard::encode(
            ResourceState::UnorderedAccess,
            ResourceState::NonPixelShaderResource,
        );
        assert!(h.producer_writes);
        assert!(!h.consumer_writes);
        assert_eq!(h.scope, MetalScope::Textures);
    }

    #[test]
    fn test_attachment_scope() {
        let h = MetalHazard::encode(
            ResourceState::RenderTarget,
            ResourceState::PixelShaderResource,
        );
        assert_eq!(h.scope, MetalScope::Textures, "consumer side picks scope");
        let h = MetalHazard::encode(ResourceState::CopyDest, ResourceState::DepthRead);
        assert_eq!(h.scope, MetalScope::RenderTargets);
    }

    #[test]
    fn test_indirect_argument_is_buffer_scope() {
        let h = MetalHazard::encode(
            ResourceState::UnorderedAccess,
            ResourceState::IndirectArgument,
        );
        assert_eq!(h.scope, MetalScope::Buffers);
    }
}
