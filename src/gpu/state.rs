//! Resource usage states.

use std::fmt;

/// Usage state of a GPU resource.
///
/// A resource's declared state must match the state assumed by the next
/// operation that reads or writes it; changing category requires a
/// [`crate::gpu::Barrier`] between the two operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResourceState {
    /// No specific usage; the creation state of every resource.
    Common,
    /// Bound as a vertex or constant buffer.
    VertexAndConstantBuffer,
    /// Bound as an index buffer.
    IndexBuffer,
    /// Written as a color render target.
    RenderTarget,
    /// Read-write access from a shader (UAV / storage binding).
    UnorderedAccess,
    /// Written as a depth attachment.
    DepthWrite,
    /// Read as a depth attachment.
    DepthRead,
    /// Sampled or loaded from a non-pixel (compute/vertex) shader.
    NonPixelShaderResource,
    /// Sampled or loaded from a pixel shader.
    PixelShaderResource,
    /// Written through stream output.
    StreamOut,
    /// Read as an indirect-dispatch argument buffer.
    IndirectArgument,
    /// Destination of a copy.
    CopyDest,
    /// Source of a copy.
    CopySource,
    /// Destination of a multisample resolve.
    ResolveDest,
    /// Source of a multisample resolve.
    ResolveSource,
    /// Combined read-only state usable by several read categories.
    GenericRead,
    /// Ready for presentation.
    Present,
    /// Read as a predication buffer.
    Predication,
}

impl ResourceState {
    /// Stable name, matching the engine's diagnostic vocabulary.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::VertexAndConstantBuffer => "VertexAndConstantBuffer",
            Self::IndexBuffer => "IndexBuffer",
            Self::RenderTarget => "RenderTarget",
            Self::UnorderedAccess => "UnorderedAccess",
            Self::DepthWrite => "DepthWrite",
            Self::DepthRead => "DepthRead",
            Self::NonPixelShaderResource => "NonPixelShaderResource",
            Self::PixelShaderResource => "PixelShaderResource",
            Self::StreamOut => "StreamOut",
            Self::IndirectArgument => "IndirectArgument",
            Self::CopyDest => "CopyDest",
            Self::CopySource => "CopySource",
            Self::ResolveDest => "ResolveDest",
            Self::ResolveSource => "ResolveSource",
            Self::GenericRead => "GenericRead",
            Self::Present => "Present",
            Self::Predication => "Predication",
        }
    }

    /// Whether this state only ever reads the resource.
    #[must_use]
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            Self::VertexAndConstantBuffer
                | Self::IndexBuffer
                | Self::DepthRead
                | Self::NonPixelShaderResource
                | Self::PixelShaderResource
                | Self::IndirectArgument
                | Self::CopySource
                | Self::ResolveSource
                | Self::GenericRead
                | Self::Predication
        )
    }

    /// Whether a shader read (SRV binding) is legal in this state.
    #[must_use]
    pub fn is_shader_readable(self) -> bool {
        matches!(
            self,
            Self::NonPixelShaderResource | Self::PixelShaderResource | Self::GenericRead
        )
    }

    pub(crate) fn to_u32(self) -> u32 {
        self as u32
    }

    pub(crate) fn from_u32(value: u32) -> Self {
        match value {
            1 => Self::VertexAndConstantBuffer,
            2 => Self::IndexBuffer,
            3 => Self::RenderTarget,
            4 => Self::UnorderedAccess,
            5 => Self::DepthWrite,
            6 => Self::DepthRead,
            7 => Self::NonPixelShaderResource,
            8 => Self::PixelShaderResource,
            9 => Self::StreamOut,
            10 => Self::IndirectArgument,
            11 => Self::CopyDest,
            12 => Self::CopySource,
            13 => Self::ResolveDest,
            14 => Self::ResolveSource,
            15 => Self::GenericRead,
            16 => Self::Present,
            17 => Self::Predication,
            _ => Self::Common,
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_u32_round_trip() {
        for value in 0..18 {
            let state = ResourceState::from_u32(value);
            assert_eq!(state.to_u32(), value, "state {state} lost its tag");
        }
    }

    #[test]
    fn test_read_only_categories() {
        assert!(ResourceState::CopySource.is_read_only());
        assert!(ResourceState::GenericRead.is_read_only());
        assert!(!ResourceState::UnorderedAccess.is_read_only());
        assert!(!ResourceState::RenderTarget.is_read_only());
        assert!(!ResourceState::CopyDest.is_read_only());
    }

    #[test]
    fn test_shader_readable_categories() {
        assert!(ResourceState::NonPixelShaderResource.is_shader_readable());
        assert!(ResourceState::PixelShaderResource.is_shader_readable());
        assert!(!ResourceState::UnorderedAccess.is_shader_readable());
        assert!(!ResourceState::CopySource.is_shader_readable());
    }
}
