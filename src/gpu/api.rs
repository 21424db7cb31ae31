//! Graphics API identification.

use std::fmt;

/// The graphics APIs with a barrier backend.
///
/// Detected once at device construction and fixed for the device's
/// lifetime; barrier payloads are selected by matching on this value, never
/// through runtime virtual dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphicsApi {
    /// Direct3D 12: transition barriers over `D3D12_RESOURCE_STATES`.
    D3d12,
    /// Vulkan: image/buffer memory barriers over access and stage masks.
    Vulkan,
    /// Metal: hazard-scope fences; no explicit image layouts.
    Metal,
}

impl GraphicsApi {
    /// Maps a wgpu adapter backend onto a barrier-capable API.
    ///
    /// GL and browser WebGPU have no explicit barrier model, so they map to
    /// `None` and barrier construction against such a device fails closed.
    #[must_use]
    pub fn from_wgpu_backend(backend: wgpu::Backend) -> Option<Self> {
        match backend {
            wgpu::Backend::Dx12 => Some(Self::D3d12),
            wgpu::Backend::Vulkan => Some(Self::Vulkan),
            wgpu::Backend::Metal => Some(Self::Metal),
            _ => None,
        }
    }
}

impl fmt::Display for GraphicsApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::D3d12 => "Direct3D 12",
            Self::Vulkan => "Vulkan",
            Self::Metal => "Metal",
        };
        f.write_str(name)
    }
}
