//! Resource creation descriptors.

/// Texel/element formats used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// Four-channel 16-bit float, the HDR working format.
    #[default]
    Rgba16Float,
    /// Four-channel 8-bit unorm.
    Rgba8Unorm,
    /// Packed small-float HDR format.
    R11G11B10Float,
    /// Single-channel 32-bit float.
    R32Float,
    /// Single-channel 32-bit unsigned integer.
    R32Uint,
    /// Single-channel 8-bit unorm.
    R8Unorm,
    /// Single-channel 8-bit unsigned integer.
    R8Uint,
    /// Formatless structured data; element size comes from the descriptor.
    Structured,
}

impl Format {
    /// Bytes per texel or element, zero for structured data.
    #[must_use]
    pub fn bytes_per_element(self) -> u32 {
        match self {
            Self::Rgba16Float => 8,
            Self::Rgba8Unorm | Self::R11G11B10Float | Self::R32Float | Self::R32Uint => 4,
            Self::R8Unorm | Self::R8Uint => 1,
            Self::Structured => 0,
        }
    }
}

/// How the GPU may access a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceUsage {
    /// Shader-readable only.
    #[default]
    GpuRead,
    /// Shader read-write (storage/UAV binding allowed).
    GpuReadWrite,
    /// Renderable color target that is also shader-readable.
    GpuRenderTarget,
}

/// Texture creation descriptor with fluent setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Texel format.
    pub format: Format,
    /// GPU access mode.
    pub usage: ResourceUsage,
    /// Mip level count.
    pub mip_levels: u32,
    /// Debug name.
    pub name: &'static str,
}

impl Default for TextureDesc {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            format: Format::Rgba16Float,
            usage: ResourceUsage::GpuRead,
            mip_levels: 1,
            name: "texture",
        }
    }
}

impl TextureDesc {
    /// New descriptor with default fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the width.
    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Sets the height.
    #[must_use]
    pub fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Sets the format.
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Sets the usage.
    #[must_use]
    pub fn usage(mut self, usage: ResourceUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Sets the mip level count.
    #[must_use]
    pub fn mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    /// Sets the debug name.
    #[must_use]
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

/// Buffer creation descriptor with fluent setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDesc {
    /// Element count.
    pub elements: u32,
    /// Size of one element in bytes.
    pub element_size: u32,
    /// Element format, [`Format::Structured`] for raw structured data.
    pub format: Format,
    /// GPU access mode.
    pub usage: ResourceUsage,
    /// Debug name.
    pub name: &'static str,
}

impl Default for BufferDesc {
    fn default() -> Self {
        Self {
            elements: 1,
            element_size: 4,
            format: Format::Structured,
            usage: ResourceUsage::GpuRead,
            name: "buffer",
        }
    }
}

impl BufferDesc {
    /// New descriptor with default fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the element count.
    #[must_use]
    pub fn elements(mut self, elements: u32) -> Self {
        self.elements = elements;
        self
    }

    /// Sets the per-element size in bytes.
    #[must_use]
    pub fn element_size(mut self, element_size: u32) -> Self {
        self.element_size = element_size;
        self
    }

    /// Sets the element format and, for sized formats, the element size.
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        if format != Format::Structured {
            self.element_size = format.bytes_per_element();
        }
        self
    }

    /// Sets the usage.
    #[must_use]
    pub fn usage(mut self, usage: ResourceUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Sets the debug name.
    #[must_use]
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Total size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        u64::from(self.elements) * u64::from(self.element_size)
    }
}

/// Sampler filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    /// Nearest-neighbor.
    Point,
    /// Linear min/mag, nearest mip.
    #[default]
    Bilinear,
    /// Linear min/mag/mip.
    Trilinear,
}

/// Sampler coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureAddressMode {
    /// Clamp to edge.
    #[default]
    Clamp,
    /// Repeat.
    Wrap,
    /// Mirrored repeat.
    Mirror,
}

/// Sampler creation descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplerDesc {
    /// Filtering mode.
    pub filter: Filter,
    /// Address mode for all axes.
    pub address_mode: TextureAddressMode,
}

impl SamplerDesc {
    /// New descriptor with default fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the address mode.
    #[must_use]
    pub fn address_mode(mut self, address_mode: TextureAddressMode) -> Self {
        self.address_mode = address_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_desc_builder() {
        let desc = TextureDesc::new()
            .width(1920)
            .height(1080)
            .format(Format::R32Uint)
            .usage(ResourceUsage::GpuReadWrite)
            .name("luma lr");
        assert_eq!(desc.width, 1920);
        assert_eq!(desc.height, 1080);
        assert_eq!(desc.format, Format::R32Uint);
        assert_eq!(desc.usage, ResourceUsage::GpuReadWrite);
        assert_eq!(desc.mip_levels, 1);
    }

    #[test]
    fn test_buffer_desc_sized_format_sets_element_size() {
        let desc = BufferDesc::new().elements(256).format(Format::R32Uint);
        assert_eq!(desc.element_size, 4);
        assert_eq!(desc.size_bytes(), 1024);
    }

    #[test]
    fn test_buffer_desc_structured() {
        let desc = BufferDesc::new().elements(8).element_size(4);
        assert_eq!(desc.format, Format::Structured);
        assert_eq!(desc.size_bytes(), 32);
    }
}
