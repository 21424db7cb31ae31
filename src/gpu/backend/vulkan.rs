//! Vulkan barrier encoding.
//!
//! A usage-state change in Vulkan is a triple of source/destination access
//! masks, source/destination pipeline stages and (for images) old/new
//! layouts. Bit values match the Vulkan 1.x core enums.

use crate::gpu::ResourceState;

/// `VkAccessFlags` bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VulkanAccess(pub u32);

impl VulkanAccess {
    /// `VK_ACCESS_INDIRECT_COMMAND_READ_BIT`
    pub const INDIRECT_COMMAND_READ: Self = Self(0x1);
    /// `VK_ACCESS_INDEX_READ_BIT`
    pub const INDEX_READ: Self = Self(0x2);
    /// `VK_ACCESS_VERTEX_ATTRIBUTE_READ_BIT`
    pub const VERTEX_ATTRIBUTE_READ: Self = Self(0x4);
    /// `VK_ACCESS_UNIFORM_READ_BIT`
    pub const UNIFORM_READ: Self = Self(0x8);
    /// `VK_ACCESS_SHADER_READ_BIT`
    pub const SHADER_READ: Self = Self(0x20);
    /// `VK_ACCESS_SHADER_WRITE_BIT`
    pub const SHADER_WRITE: Self = Self(0x40);
    /// `VK_ACCESS_COLOR_ATTACHMENT_READ_BIT`
    pub const COLOR_ATTACHMENT_READ: Self = Self(0x80);
    /// `VK_ACCESS_COLOR_ATTACHMENT_WRITE_BIT`
    pub const COLOR_ATTACHMENT_WRITE: Self = Self(0x100);
    /// `VK_ACCESS_DEPTH_STENCIL_ATTACHMENT_READ_BIT`
    pub const DEPTH_STENCIL_READ: Self = Self(0x200);
    /// `VK_ACCESS_DEPTH_STENCIL_ATTACHMENT_WRITE_BIT`
    pub const DEPTH_STENCIL_WRITE: Self = Self(0x400);
    /// `VK_ACCESS_TRANSFER_READ_BIT`
    pub const TRANSFER_READ: Self = Self(0x800);
    /// `VK_ACCESS_TRANSFER_WRITE_BIT`
    pub const TRANSFER_WRITE: Self = Self(0x1000);
    /// `VK_ACCESS_MEMORY_READ_BIT`
    pub const MEMORY_READ: Self = Self(0x8000);
    /// No access.
    pub const NONE: Self = Self(0);

    /// Union of two masks.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether any write bit is set.
    #[must_use]
    pub fn is_write(self) -> bool {
        const WRITES: u32 = 0x40 | 0x100 | 0x400 | 0x1000;
        self.0 & WRITES != 0
    }
}

/// `VkPipelineStageFlags` bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VulkanStages(pub u32);

impl VulkanStages {
    /// `VK_PIPELINE_STAGE_TOP_OF_PIPE_BIT`
    pub const TOP_OF_PIPE: Self = Self(0x1);
    /// `VK_PIPELINE_STAGE_DRAW_INDIRECT_BIT`
    pub const DRAW_INDIRECT: Self = Self(0x2);
    /// `VK_PIPELINE_STAGE_VERTEX_INPUT_BIT`
    pub const VERTEX_INPUT: Self = Self(0x4);
    /// `VK_PIPELINE_STAGE_VERTEX_SHADER_BIT`
    pub const VERTEX_SHADER: Self = Self(0x8);
    /// `VK_PIPELINE_STAGE_FRAGMENT_SHADER_BIT`
    pub const FRAGMENT_SHADER: Self = Self(0x80);
    /// `VK_PIPELINE_STAGE_EARLY_FRAGMENT_TESTS_BIT`
    pub const EARLY_FRAGMENT_TESTS: Self = Self(0x100);
    /// `VK_PIPELINE_STAGE_LATE_FRAGMENT_TESTS_BIT`
    pub const LATE_FRAGMENT_TESTS: Self = Self(0x200);
    /// `VK_PIPELINE_STAGE_COLOR_ATTACHMENT_OUTPUT_BIT`
    pub const COLOR_ATTACHMENT_OUTPUT: Self = Self(0x400);
    /// `VK_PIPELINE_STAGE_COMPUTE_SHADER_BIT`
    pub const COMPUTE_SHADER: Self = Self(0x800);
    /// `VK_PIPELINE_STAGE_TRANSFER_BIT`
    pub const TRANSFER: Self = Self(0x1000);
    /// `VK_PIPELINE_STAGE_BOTTOM_OF_PIPE_BIT`
    pub const BOTTOM_OF_PIPE: Self = Self(0x2000);

    /// Union of two masks.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// `VkImageLayout` for the states that imply one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VulkanImageLayout {
    /// `VK_IMAGE_LAYOUT_GENERAL`
    General,
    /// `VK_IMAGE_LAYOUT_COLOR_ATTACHMENT_OPTIMAL`
    ColorAttachmentOptimal,
    /// `VK_IMAGE_LAYOUT_DEPTH_STENCIL_ATTACHMENT_OPTIMAL`
    DepthStencilAttachmentOptimal,
    /// `VK_IMAGE_LAYOUT_DEPTH_STENCIL_READ_ONLY_OPTIMAL`
    DepthStencilReadOnlyOptimal,
    /// `VK_IMAGE_LAYOUT_SHADER_READ_ONLY_OPTIMAL`
    ShaderReadOnlyOptimal,
    /// `VK_IMAGE_LAYOUT_TRANSFER_SRC_OPTIMAL`
    TransferSrcOptimal,
    /// `VK_IMAGE_LAYOUT_TRANSFER_DST_OPTIMAL`
    TransferDstOptimal,
    /// `VK_IMAGE_LAYOUT_PRESENT_SRC_KHR`
    PresentSrc,
}

/// One half of a transition: the masks and layout implied by a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VulkanStateInfo {
    /// Access mask for this state.
    pub access: VulkanAccess,
    /// Pipeline stages touching the resource in this state.
    pub stages: VulkanStages,
    /// Image layout, where the state implies one.
    pub layout: VulkanImageLayout,
}

/// A full `before -> after` Vulkan barrier description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VulkanTransition {
    /// Source side of the barrier.
    pub src: VulkanStateInfo,
    /// Destination side of the barrier.
    pub dst: VulkanStateInfo,
}

impl VulkanTransition {
    /// Encodes both sides of a transition.
    #[must_use]
    pub fn encode(before: ResourceState, after: ResourceState) -> Self {
        Self {
            src: state_info(before),
            dst: state_info(after),
        }
    }
}

fn state_info(state: ResourceState) -> VulkanStateInfo {
    match state {
        ResourceState::Common => VulkanStateInfo {
            access: VulkanAccess::NONE,
            stages: VulkanStages::TOP_OF_PIPE,
            layout: VulkanImageLayout::General,
        },
        ResourceState::VertexAndConstantBuffer => VulkanStateInfo {
            access: VulkanAccess::VERTEX_ATTRIBUTE_READ.union(VulkanAccess::UNIFORM_READ),
            stages: VulkanStages::VERTEX_INPUT.union(VulkanStages::VERTEX_SHADER),
            layout: VulkanImageLayout::General,
        },
        ResourceState::IndexBuffer => VulkanStateInfo {
            access: VulkanAccess::INDEX_READ,
            stages: VulkanStages::VERTEX_INPUT,
            layout: VulkanImageLayout::General,
        },
        ResourceState::RenderTarget => VulkanStateInfo {
            access: VulkanAccess::COLOR_ATTACHMENT_READ.union(VulkanAccess::COLOR_ATTACHMENT_WRITE),
            stages: VulkanStages::COLOR_ATTACHMENT_OUTPUT,
            layout: VulkanImageLayout::ColorAttachmentOptimal,
        },
        ResourceState::UnorderedAccess => VulkanStateInfo {
            access: VulkanAccess::SHADER_READ.union(VulkanAccess::SHADER_WRITE),
            stages: VulkanStages::COMPUTE_SHADER,
            layout: VulkanImageLayout::General,
        },
        ResourceState::DepthWrite => VulkanStateInfo {
            access: VulkanAccess::DEPTH_STENCIL_WRITE,
            stages: VulkanStages::EARLY_FRAGMENT_TESTS.union(VulkanStages::LATE_FRAGMENT_TESTS),
            layout: VulkanImageLayout::DepthStencilAttachmentOptimal,
        },
        ResourceState::DepthRead => VulkanStateInfo {
            access: VulkanAccess::DEPTH_STENCIL_READ,
            stages: VulkanStages::EARLY_FRAGMENT_TESTS.union(VulkanStages::LATE_FRAGMENT_TESTS),
            layout: VulkanImageLayout::DepthStencilReadOnlyOptimal,
        },
        ResourceState::NonPixelShaderResource => VulkanStateInfo {
            access: VulkanAccess::SHADER_READ,
            stages: VulkanStages::VERTEX_SHADER.union(VulkanStages::COMPUTE_SHADER),
            layout: VulkanImageLayout::ShaderReadOnlyOptimal,
        },
        ResourceState::PixelShaderResource => VulkanStateInfo {
            access: VulkanAccess::SHADER_READ,
            stages: VulkanStages::FRAGMENT_SHADER,
            layout: VulkanImageLayout::ShaderReadOnlyOptimal,
        },
        ResourceState::StreamOut => VulkanStateInfo {
            access: VulkanAccess::SHADER_WRITE,
            stages: VulkanStages::VERTEX_SHADER,
            layout: VulkanImageLayout::General,
        },
        ResourceState::IndirectArgument | ResourceState::Predication => VulkanStateInfo {
            access: VulkanAccess::INDIRECT_COMMAND_READ,
            stages: VulkanStages::DRAW_INDIRECT,
            layout: VulkanImageLayout::General,
        },
        ResourceState::CopyDest | ResourceState::ResolveDest => VulkanStateInfo {
            access: VulkanAccess::TRANSFER_WRITE,
            stages: VulkanStages::TRANSFER,
            layout: VulkanImageLayout::TransferDstOptimal,
        },
        ResourceState::CopySource | ResourceState::ResolveSource => VulkanStateInfo {
            access: VulkanAccess::TRANSFER_READ,
            stages: VulkanStages::TRANSFER,
            layout: VulkanImageLayout::TransferSrcOptimal,
        },
        ResourceState::GenericRead => VulkanStateInfo {
            access: VulkanAccess::MEMORY_READ,
            stages: VulkanStages::TOP_OF_PIPE.union(VulkanStages::BOTTOM_OF_PIPE),
            layout: VulkanImageLayout::General,
        },
        ResourceState::Present => VulkanStateInfo {
            access: VulkanAccess::MEMORY_READ,
            stages: VulkanStages::BOTTOM_OF_PIPE,
            layout: VulkanImageLayout::PresentSrc,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uav_transition_is_general_layout() {
        let t = VulkanTransition::encode(ResourceState::Common, ResourceState::UnorderedAccess);
        assert_eq!(t.dst.layout, VulkanImageLayout::General);
        assert!(t.dst.access.is_write());
        assert_eq!(t.dst.stages, VulkanStages::COMPUTE_SHADER);
    }

    #[test]
    fn test_copy_then_sample_layouts() {
        let t = VulkanTransition::encode(
            ResourceState::CopyDest,
            ResourceState::NonPixelShaderResource,
        );
        assert_eq!(t.src.layout, VulkanImageLayout::TransferDstOptimal);
        assert_eq!(t.dst.layout, VulkanImageLayout::ShaderReadOnlyOptimal);
        assert!(t.src.access.is_write());
        assert!(!t.dst.access.is_write());
    }

    #[test]
    fn test_present_transition() {
        let t = VulkanTransition::encode(ResourceState::CopyDest, ResourceState::Present);
        assert_eq!(t.dst.layout, VulkanImageLayout::PresentSrc);
        assert_eq!(t.dst.stages, VulkanStages::BOTTOM_OF_PIPE);
    }
}
