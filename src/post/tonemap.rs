//! The tonemap pass and its four variants.
//!
//! All four entry points live in one shader module; the variant is a pure
//! function of the vignette and chromatic-aberration toggles and decides
//! which pipeline runs. Plain variants rework the color buffer in place;
//! the chromatic ones scatter reads around each texel and therefore read
//! one buffer and write another.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::error::Error;
use crate::gpu::{
    dispatch_extent, needs_resize, Binding, BufferSrv, CommandList, ComputeKernel, Device, Filter,
    Format, Pipeline, ResourceState, ResourceUsage, Sampler, SamplerDesc, TextureDesc,
    TextureResource, TextureSrv, TextureUav, TrackedResource,
};
use crate::post::settings::PostprocessSettings;

const TILE: u32 = 8;

/// Which tonemap entry point runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TonemapVariant {
    /// Plain tonemap.
    Default,
    /// Tonemap with vignette.
    Vignette,
    /// Tonemap with chromatic aberration.
    Chromatic,
    /// Tonemap with both.
    VignetteChromatic,
}

impl TonemapVariant {
    /// Picks the variant from the two effect toggles.
    #[must_use]
    pub fn select(vignette: bool, chromatic_aberration: bool) -> Self {
        match (vignette, chromatic_aberration) {
            (false, false) => Self::Default,
            (true, false) => Self::Vignette,
            (false, true) => Self::Chromatic,
            (true, true) => Self::VignetteChromatic,
        }
    }

    /// Whether this variant reads a separate color input instead of
    /// reworking the color buffer in place.
    #[must_use]
    pub fn reads_color_input(self) -> bool {
        matches!(self, Self::Chromatic | Self::VignetteChromatic)
    }
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct TonemapParams {
    rcp_buffer_dim: Vec2,
    buffer_dim: Vec2,
    bloom_strength: f32,
    chroma_strength: f32,
    vignette_inner: f32,
    vignette_outer: f32,
    vignette_opacity: f32,
    _pad: [f32; 3],
}

/// Arguments shared by all four variants.
#[derive(Debug)]
struct TonemapArgs {
    exposure: BufferSrv,
    bloom: TextureSrv,
    color: TextureUav,
    color_input: TextureSrv,
    color_out: TextureUav,
    out_luma: TextureUav,
    linear_sampler: Sampler,
    params: TonemapParams,
}

impl TonemapArgs {
    fn new(linear_sampler: Sampler) -> Self {
        Self {
            exposure: BufferSrv::default(),
            bloom: TextureSrv::default(),
            color: TextureUav::default(),
            color_input: TextureSrv::default(),
            color_out: TextureUav::default(),
            out_luma: TextureUav::default(),
            linear_sampler,
            params: TonemapParams::zeroed(),
        }
    }

    fn bindings(&self, reads_color_input: bool) -> Vec<(u32, Binding)> {
        let mut bindings = vec![
            (0, Binding::BufferSrv(self.exposure.clone())),
            (1, Binding::TextureSrv(self.bloom.clone())),
            (4, Binding::TextureUav(self.out_luma.clone())),
            (5, Binding::Sampler(self.linear_sampler.clone())),
            (6, Binding::Uniform(bytemuck::bytes_of(&self.params).to_vec())),
        ];
        if reads_color_input {
            bindings.push((2, Binding::TextureSrv(self.color_input.clone())));
            bindings.push((7, Binding::TextureUav(self.color_out.clone())));
        } else {
            bindings.push((3, Binding::TextureUav(self.color.clone())));
        }
        bindings
    }
}

macro_rules! tonemap_kernel {
    ($name:ident, $label:literal, $entry:literal, $reads_input:literal) => {
        #[derive(Debug)]
        struct $name {
            args: TonemapArgs,
        }

        impl ComputeKernel for $name {
            const LABEL: &'static str = $label;
            const SOURCE: &'static str = include_str!("../../assets/shaders/post/tonemap.wgsl");
            const ENTRY: &'static str = $entry;

            fn bindings(&self) -> Vec<(u32, Binding)> {
                self.args.bindings($reads_input)
            }
        }
    };
}

tonemap_kernel!(DefaultKernel, "tonemap", "main_default", false);
tonemap_kernel!(VignetteKernel, "tonemap vignette", "main_vignette", false);
tonemap_kernel!(ChromaticKernel, "tonemap chromatic", "main_chromatic", true);
tonemap_kernel!(
    VignetteChromaticKernel,
    "tonemap vignette chromatic",
    "main_vignette_chromatic",
    true
);

/// The tonemap pass.
#[derive(Debug)]
pub struct Tonemapper {
    default_pipe: Pipeline<DefaultKernel>,
    vignette_pipe: Pipeline<VignetteKernel>,
    chromatic_pipe: Pipeline<ChromaticKernel>,
    vignette_chromatic_pipe: Pipeline<VignetteChromaticKernel>,
    fallback_bloom: Arc<TextureResource>,
    luma: Option<Arc<TextureResource>>,
}

impl Tonemapper {
    /// Compiles the four variant pipelines and the black bloom fallback.
    #[must_use]
    pub fn new(device: &Device) -> Self {
        let sampler = device.create_sampler(SamplerDesc::new().filter(Filter::Bilinear));
        // Bound whenever bloom is disabled; never written, stays black.
        let fallback_bloom = device.create_texture(
            TextureDesc::new()
                .width(1)
                .height(1)
                .format(Format::Rgba16Float)
                .usage(ResourceUsage::GpuRead)
                .name("bloom fallback"),
        );
        Self {
            default_pipe: device.create_pipeline(DefaultKernel {
                args: TonemapArgs::new(sampler.clone()),
            }),
            vignette_pipe: device.create_pipeline(VignetteKernel {
                args: TonemapArgs::new(sampler.clone()),
            }),
            chromatic_pipe: device.create_pipeline(ChromaticKernel {
                args: TonemapArgs::new(sampler.clone()),
            }),
            vignette_chromatic_pipe: device.create_pipeline(VignetteChromaticKernel {
                args: TonemapArgs::new(sampler),
            }),
            fallback_bloom,
            luma: None,
        }
    }

    /// Full-resolution luminance written by the most recent pass.
    #[must_use]
    pub fn luma(&self) -> TextureSrv {
        self.luma.as_ref().map_or_else(TextureSrv::default, |l| l.srv())
    }

    /// Tonemaps into `color` (plain variants) or from `color_input` into
    /// `color_out` (chromatic variants), returning the variant that ran.
    ///
    /// An invalid `bloom` view selects the black fallback texture.
    ///
    /// # Errors
    ///
    /// Propagates barrier failures from the command list.
    pub fn tonemap(
        &mut self,
        device: &Device,
        cmd: &mut CommandList,
        color: &TextureUav,
        color_input: &TextureSrv,
        color_out: &TextureUav,
        bloom: &TextureSrv,
        exposure: &BufferSrv,
        settings: &PostprocessSettings,
    ) -> Result<TonemapVariant, Error> {
        let variant = TonemapVariant::select(
            settings.vignette.enabled,
            settings.chromatic_aberration.enabled,
        );
        let (width, height) = if variant.reads_color_input() {
            (color_input.width(), color_input.height())
        } else {
            (color.width(), color.height())
        };
        self.ensure_luma(device, width, height);
        let Some(luma) = self.luma.clone() else {
            return Ok(variant);
        };

        cmd.push_debug_group("tonemap");
        let bloom = if bloom.valid() {
            bloom.clone()
        } else {
            self.fallback_bloom.srv()
        };
        cmd.transition(&bloom, ResourceState::NonPixelShaderResource)?;
        cmd.transition(exposure, ResourceState::NonPixelShaderResource)?;
        let luma_uav = luma.uav();
        cmd.transition(&luma_uav, ResourceState::UnorderedAccess)?;
        if variant.reads_color_input() {
            cmd.transition(color_input, ResourceState::NonPixelShaderResource)?;
            cmd.transition(color_out, ResourceState::UnorderedAccess)?;
        } else {
            cmd.transition(color, ResourceState::UnorderedAccess)?;
        }

        let params = TonemapParams {
            rcp_buffer_dim: Vec2::new(1.0 / width as f32, 1.0 / height as f32),
            buffer_dim: Vec2::new(width as f32, height as f32),
            bloom_strength: settings.bloom.strength,
            chroma_strength: settings.chromatic_aberration.strength,
            vignette_inner: settings.vignette.inner_radius,
            vignette_outer: settings.vignette.outer_radius,
            vignette_opacity: settings.vignette.opacity,
            _pad: [0.0; 3],
        };
        let (x, y) = dispatch_extent(width, height, TILE, TILE);
        match variant {
            TonemapVariant::Default => {
                let args = &mut self.default_pipe.cs.args;
                args.exposure = exposure.clone();
                args.bloom = bloom;
                args.color = color.clone();
                args.out_luma = luma_uav;
                args.params = params;
                cmd.bind_pipe(&self.default_pipe);
            }
            TonemapVariant::Vignette => {
                let args = &mut self.vignette_pipe.cs.args;
                args.exposure = exposure.clone();
                args.bloom = bloom;
                args.color = color.clone();
                args.out_luma = luma_uav;
                args.params = params;
                cmd.bind_pipe(&self.vignette_pipe);
            }
            TonemapVariant::Chromatic => {
                let args = &mut self.chromatic_pipe.cs.args;
                args.exposure = exposure.clone();
                args.bloom = bloom;
                args.color_input = color_input.clone();
                args.color_out = color_out.clone();
                args.out_luma = luma_uav;
                args.params = params;
                cmd.bind_pipe(&self.chromatic_pipe);
            }
            TonemapVariant::VignetteChromatic => {
                let args = &mut self.vignette_chromatic_pipe.cs.args;
                args.exposure = exposure.clone();
                args.bloom = bloom;
                args.color_input = color_input.clone();
                args.color_out = color_out.clone();
                args.out_luma = luma_uav;
                args.params = params;
                cmd.bind_pipe(&self.vignette_chromatic_pipe);
            }
        }
        cmd.dispatch(x, y, 1);
        cmd.pop_debug_group();
        Ok(variant)
    }

    fn ensure_luma(&mut self, device: &Device, width: u32, height: u32) {
        let stale = self
            .luma
            .as_ref()
            .is_none_or(|l| needs_resize(l.width(), l.height(), width, height));
        if stale && width > 0 && height > 0 {
            self.luma = Some(device.create_texture(
                TextureDesc::new()
                    .width(width)
                    .height(height)
                    .format(Format::R8Unorm)
                    .usage(ResourceUsage::GpuReadWrite)
                    .name("luma"),
            ));
        }
    }
}
