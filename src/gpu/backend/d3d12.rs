//! Direct3D 12 barrier encoding.
//!
//! Bit values match `D3D12_RESOURCE_STATES` so captured barriers can be
//! compared directly against PIX output.

use std::fmt;

use crate::gpu::ResourceState;

const VERTEX_AND_CONSTANT_BUFFER: u32 = 0x1;
const INDEX_BUFFER: u32 = 0x2;
const RENDER_TARGET: u32 = 0x4;
const UNORDERED_ACCESS: u32 = 0x8;
const DEPTH_WRITE: u32 = 0x10;
const DEPTH_READ: u32 = 0x20;
const NON_PIXEL_SHADER_RESOURCE: u32 = 0x40;
const PIXEL_SHADER_RESOURCE: u32 = 0x80;
const STREAM_OUT: u32 = 0x100;
const INDIRECT_ARGUMENT: u32 = 0x200;
const COPY_DEST: u32 = 0x400;
const COPY_SOURCE: u32 = 0x800;
const RESOLVE_DEST: u32 = 0x1000;
const RESOLVE_SOURCE: u32 = 0x2000;

/// A `D3D12_RESOURCE_STATES` bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct D3d12ResourceStates(pub u32);

impl D3d12ResourceStates {
    /// `D3D12_RESOURCE_STATE_COMMON`, shared with `PRESENT`.
    pub const COMMON: Self = Self(0);

    /// Maps a usage state onto the corresponding D3D12 state bits.
    #[must_use]
    pub fn from_state(state: ResourceState) -> Self {
        let bits = match state {
            ResourceState::Common | ResourceState::Present => 0,
            ResourceState::VertexAndConstantBuffer => VERTEX_AND_CONSTANT_BUFFER,
            ResourceState::IndexBuffer => INDEX_BUFFER,
            ResourceState::RenderTarget => RENDER_TARGET,
            ResourceState::UnorderedAccess => UNORDERED_ACCESS,
            ResourceState::DepthWrite => DEPTH_WRITE,
            ResourceState::DepthRead => DEPTH_READ,
            ResourceState::NonPixelShaderResource => NON_PIXEL_SHADER_RESOURCE,
            ResourceState::PixelShaderResource => PIXEL_SHADER_RESOURCE,
            ResourceState::StreamOut => STREAM_OUT,
            // Predication shares a bit with indirect arguments in D3D12.
            ResourceState::IndirectArgument | ResourceState::Predication => INDIRECT_ARGUMENT,
            ResourceState::CopyDest => COPY_DEST,
            ResourceState::CopySource => COPY_SOURCE,
            ResourceState::ResolveDest => RESOLVE_DEST,
            ResourceState::ResolveSource => RESOLVE_SOURCE,
            ResourceState::GenericRead => {
                VERTEX_AND_CONSTANT_BUFFER
                    | INDEX_BUFFER
                    | NON_PIXEL_SHADER_RESOURCE
                    | PIXEL_SHADER_RESOURCE
                    | INDIRECT_ARGUMENT
                    | COPY_SOURCE
            }
        };
        Self(bits)
    }

    /// Whether every bit of `other` is set in `self`.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Display for D3d12ResourceStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_state_bits() {
        assert_eq!(
            D3d12ResourceStates::from_state(ResourceState::RenderTarget).0,
            0x4
        );
        assert_eq!(
            D3d12ResourceStates::from_state(ResourceState::UnorderedAccess).0,
            0x8
        );
        assert_eq!(
            D3d12ResourceStates::from_state(ResourceState::CopyDest).0,
            0x400
        );
        assert_eq!(
            D3d12ResourceStates::from_state(ResourceState::CopySource).0,
            0x800
        );
    }

    #[test]
    fn test_present_and_common_share_zero() {
        assert_eq!(
            D3d12ResourceStates::from_state(ResourceState::Present),
            D3d12ResourceStates::COMMON
        );
        assert_eq!(
            D3d12ResourceStates::from_state(ResourceState::Common),
            D3d12ResourceStates::COMMON
        );
    }

    #[test]
    fn test_generic_read_is_a_read_combo() {
        let generic = D3d12ResourceStates::from_state(ResourceState::GenericRead);
        for read in [
            ResourceState::VertexAndConstantBuffer,
            ResourceState::IndexBuffer,
            ResourceState::NonPixelShaderResource,
            ResourceState::PixelShaderResource,
            ResourceState::IndirectArgument,
            ResourceState::CopySource,
        ] {
            assert!(
                generic.contains(D3d12ResourceStates::from_state(read)),
                "GenericRead missing bits for {read}"
            );
        }
        assert!(!generic.contains(D3d12ResourceStates::from_state(
            ResourceState::UnorderedAccess
        )));
    }
}
