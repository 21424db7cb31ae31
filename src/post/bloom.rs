//! Bloom extraction and the cascaded blur chain.
//!
//! The first pass thresholds the color buffer into the half-resolution
//! bloom base while also writing the low-res luma used by next frame's
//! histogram. Four more levels are produced in a single dispatch, then
//! blurred smallest-first, each upsample blending into the next larger
//! level until the composited result lands back in level zero.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::error::Error;
use crate::gpu::{
    dispatch_extent, needs_resize, Binding, BufferSrv, CommandList, ComputeKernel, Device, Filter,
    Format, Pipeline, ResourceState, ResourceUsage, Sampler, SamplerDesc, TextureDesc,
    TextureResource, TextureSrv, TextureUav,
};
use crate::post::settings::BloomSettings;

/// Levels in the bloom chain.
pub const BLOOM_LEVELS: usize = 5;
/// Weight of the blurred lower level when upsampling into the next.
pub const UPSAMPLE_BLEND: f32 = 0.65;

const TILE: u32 = 8;

/// Half the frame extent, clamped so tiny frames still get one texel.
#[must_use]
pub fn bloom_base_extent(frame_width: u32, frame_height: u32) -> (u32, u32) {
    ((frame_width >> 1).max(1), (frame_height >> 1).max(1))
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct ExtractParams {
    inverse_output_size: Vec2,
    bloom_threshold: f32,
    _pad: f32,
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct FilterParams {
    inverse_dimensions: Vec2,
    _pad: [f32; 2],
}

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct UpsampleParams {
    inverse_dimensions: Vec2,
    upsample_blend_factor: f32,
    _pad: f32,
}

#[derive(Debug)]
struct ExtractBloomKernel {
    source: TextureSrv,
    exposure: BufferSrv,
    bloom: TextureUav,
    luma: TextureUav,
    linear_sampler: Sampler,
    params: ExtractParams,
}

impl ComputeKernel for ExtractBloomKernel {
    const LABEL: &'static str = "extract bloom and luminance";
    const SOURCE: &'static str =
        include_str!("../../assets/shaders/post/extract_bloom_luminance.wgsl");

    fn bindings(&self) -> Vec<(u32, Binding)> {
        vec![
            (0, Binding::TextureSrv(self.source.clone())),
            (1, Binding::BufferSrv(self.exposure.clone())),
            (2, Binding::TextureUav(self.bloom.clone())),
            (3, Binding::TextureUav(self.luma.clone())),
            (4, Binding::Uniform(bytemuck::bytes_of(&self.params).to_vec())),
            (5, Binding::Sampler(self.linear_sampler.clone())),
        ]
    }
}

#[derive(Debug)]
struct ExtractLumaKernel {
    source: TextureSrv,
    exposure: BufferSrv,
    luma: TextureUav,
    linear_sampler: Sampler,
    params: ExtractParams,
}

impl ComputeKernel for ExtractLumaKernel {
    const LABEL: &'static str = "extract luminance";
    const SOURCE: &'static str = include_str!("../../assets/shaders/post/extract_luminance.wgsl");

    fn bindings(&self) -> Vec<(u32, Binding)> {
        vec![
            (0, Binding::TextureSrv(self.source.clone())),
            (1, Binding::BufferSrv(self.exposure.clone())),
            (2, Binding::TextureUav(self.luma.clone())),
            (3, Binding::Uniform(bytemuck::bytes_of(&self.params).to_vec())),
            (4, Binding::Sampler(self.linear_sampler.clone())),
        ]
    }
}

#[derive(Debug)]
struct Downsample4Kernel {
    source: TextureSrv,
    outputs: [TextureUav; 4],
    linear_sampler: Sampler,
    params: FilterParams,
}

impl ComputeKernel for Downsample4Kernel {
    const LABEL: &'static str = "downsample bloom 4";
    const SOURCE: &'static str =
        include_str!("../../assets/shaders/post/downsample_bloom4.wgsl");

    fn bindings(&self) -> Vec<(u32, Binding)> {
        vec![
            (0, Binding::TextureSrv(self.source.clone())),
            (1, Binding::TextureUav(self.outputs[0].clone())),
            (2, Binding::TextureUav(self.outputs[1].clone())),
            (3, Binding::TextureUav(self.outputs[2].clone())),
            (4, Binding::TextureUav(self.outputs[3].clone())),
            (5, Binding::Uniform(bytemuck::bytes_of(&self.params).to_vec())),
            (6, Binding::Sampler(self.linear_sampler.clone())),
        ]
    }
}

#[derive(Debug)]
struct BlurKernel {
    source: TextureSrv,
    output: TextureUav,
    linear_sampler: Sampler,
    params: FilterParams,
}

impl ComputeKernel for BlurKernel {
    const LABEL: &'static str = "bloom blur";
    const SOURCE: &'static str = include_str!("../../assets/shaders/post/bloom_blur.wgsl");

    fn bindings(&self) -> Vec<(u32, Binding)> {
        vec![
            (0, Binding::TextureSrv(self.source.clone())),
            (1, Binding::TextureUav(self.output.clone())),
            (2, Binding::Uniform(bytemuck::bytes_of(&self.params).to_vec())),
            (3, Binding::Sampler(self.linear_sampler.clone())),
        ]
    }
}

#[derive(Debug)]
struct UpsampleBlurKernel {
    higher_res: TextureSrv,
    lower_res: TextureSrv,
    output: TextureUav,
    linear_sampler: Sampler,
    params: UpsampleParams,
}

impl ComputeKernel for UpsampleBlurKernel {
    const LABEL: &'static str = "upsample and blur";
    const SOURCE: &'static str =
        include_str!("../../assets/shaders/post/upsample_and_blur.wgsl");

    fn bindings(&self) -> Vec<(u32, Binding)> {
        vec![
            (0, Binding::TextureSrv(self.higher_res.clone())),
            (1, Binding::TextureSrv(self.lower_res.clone())),
            (2, Binding::TextureUav(self.output.clone())),
            (3, Binding::Uniform(bytemuck::bytes_of(&self.params).to_vec())),
            (4, Binding::Sampler(self.linear_sampler.clone())),
        ]
    }
}

/// One bloom level: slot `a` holds the downsampled input, slot `b` the
/// blurred result.
#[derive(Debug, Clone)]
struct BloomLevel {
    slots: [Arc<TextureResource>; 2],
}

/// Bloom extraction, downsampling and the cascaded blur.
#[derive(Debug)]
pub struct BloomAndLuminance {
    extract_bloom: Pipeline<ExtractBloomKernel>,
    extract_luma: Pipeline<ExtractLumaKernel>,
    downsample: Pipeline<Downsample4Kernel>,
    blur: Pipeline<BlurKernel>,
    upsample_blur: Pipeline<UpsampleBlurKernel>,
    sampler: Sampler,
    levels: Option<[BloomLevel; BLOOM_LEVELS]>,
    luma: Option<Arc<TextureResource>>,
}

impl BloomAndLuminance {
    /// Compiles all five kernels. Targets are allocated on first use.
    #[must_use]
    pub fn new(device: &Device) -> Self {
        let sampler = device.create_sampler(SamplerDesc::new().filter(Filter::Bilinear));
        Self {
            extract_bloom: device.create_pipeline(ExtractBloomKernel {
                source: TextureSrv::default(),
                exposure: BufferSrv::default(),
                bloom: TextureUav::default(),
                luma: TextureUav::default(),
                linear_sampler: sampler.clone(),
                params: ExtractParams::zeroed(),
            }),
            extract_luma: device.create_pipeline(ExtractLumaKernel {
                source: TextureSrv::default(),
                exposure: BufferSrv::default(),
                luma: TextureUav::default(),
                linear_sampler: sampler.clone(),
                params: ExtractParams::zeroed(),
            }),
            downsample: device.create_pipeline(Downsample4Kernel {
                source: TextureSrv::default(),
                outputs: [
                    TextureUav::default(),
                    TextureUav::default(),
                    TextureUav::default(),
                    TextureUav::default(),
                ],
                linear_sampler: sampler.clone(),
                params: FilterParams::zeroed(),
            }),
            blur: device.create_pipeline(BlurKernel {
                source: TextureSrv::default(),
                output: TextureUav::default(),
                linear_sampler: sampler.clone(),
                params: FilterParams::zeroed(),
            }),
            upsample_blur: device.create_pipeline(UpsampleBlurKernel {
                higher_res: TextureSrv::default(),
                lower_res: TextureSrv::default(),
                output: TextureUav::default(),
                linear_sampler: sampler.clone(),
                params: UpsampleParams::zeroed(),
            }),
            sampler,
            levels: None,
            luma: None,
        }
    }

    /// The composited bloom result, the blurred slot of level zero.
    ///
    /// Invalid while bloom is disabled or has never run; the tonemapper
    /// substitutes its black fallback then.
    #[must_use]
    pub fn bloom(&self) -> TextureSrv {
        self.levels
            .as_ref()
            .map_or_else(TextureSrv::default, |levels| levels[0].slots[1].srv())
    }

    /// The low-res luma written by the most recent extract pass.
    #[must_use]
    pub fn luma(&self) -> TextureSrv {
        self.luma.as_ref().map_or_else(TextureSrv::default, |l| l.srv())
    }

    /// Texels in the low-res luma target, the histogram's population.
    #[must_use]
    pub fn luma_pixel_count(&self) -> u32 {
        self.luma.as_ref().map_or(0, |l| l.width() * l.height())
    }

    /// Thresholds `source` into the bloom chain and writes low-res luma,
    /// then downsamples and blurs the chain.
    ///
    /// With bloom disabled only the luma write runs and the chain is
    /// released.
    ///
    /// # Errors
    ///
    /// Propagates barrier failures from the command list.
    pub fn extract(
        &mut self,
        device: &Device,
        cmd: &mut CommandList,
        source: &TextureSrv,
        exposure: &BufferSrv,
        settings: &BloomSettings,
    ) -> Result<(), Error> {
        self.ensure_targets(device, source.width(), source.height(), settings.enabled);
        let Some(luma) = self.luma.clone() else {
            return Ok(());
        };
        let (bw, bh) = (luma.width(), luma.height());
        let (x, y) = dispatch_extent(bw, bh, TILE, TILE);
        let inverse_output_size = Vec2::new(1.0 / bw as f32, 1.0 / bh as f32);

        cmd.push_debug_group("bloom extract");
        cmd.transition(source, ResourceState::NonPixelShaderResource)?;
        cmd.transition(exposure, ResourceState::NonPixelShaderResource)?;
        let luma_uav = luma.uav();
        cmd.transition(&luma_uav, ResourceState::UnorderedAccess)?;

        if let Some(levels) = self.levels.clone() {
            let bloom_uav = levels[0].slots[0].uav();
            cmd.transition(&bloom_uav, ResourceState::UnorderedAccess)?;
            self.extract_bloom.cs.source = source.clone();
            self.extract_bloom.cs.exposure = exposure.clone();
            self.extract_bloom.cs.bloom = bloom_uav;
            self.extract_bloom.cs.luma = luma_uav;
            self.extract_bloom.cs.params = ExtractParams {
                inverse_output_size,
                bloom_threshold: settings.threshold,
                _pad: 0.0,
            };
            cmd.bind_pipe(&self.extract_bloom);
            cmd.dispatch(x, y, 1);
            cmd.pop_debug_group();
            self.downsample_and_blur(cmd, &levels)?;
        } else {
            self.extract_luma.cs.source = source.clone();
            self.extract_luma.cs.exposure = exposure.clone();
            self.extract_luma.cs.luma = luma_uav;
            self.extract_luma.cs.params = ExtractParams {
                inverse_output_size,
                bloom_threshold: 0.0,
                _pad: 0.0,
            };
            cmd.bind_pipe(&self.extract_luma);
            cmd.dispatch(x, y, 1);
            cmd.pop_debug_group();
        }
        Ok(())
    }

    fn downsample_and_blur(
        &mut self,
        cmd: &mut CommandList,
        levels: &[BloomLevel; BLOOM_LEVELS],
    ) -> Result<(), Error> {
        let base = &levels[0].slots[0];
        let inverse_base = Vec2::new(1.0 / base.width() as f32, 1.0 / base.height() as f32);

        cmd.push_debug_group("bloom downsample");
        let base_srv = base.srv();
        cmd.transition(&base_srv, ResourceState::NonPixelShaderResource)?;
        let mut outputs: [TextureUav; 4] = Default::default();
        for (level, output) in levels[1..].iter().zip(&mut outputs) {
            let uav = level.slots[0].uav();
            cmd.transition(&uav, ResourceState::UnorderedAccess)?;
            *output = uav;
        }
        self.downsample.cs.source = base_srv;
        self.downsample.cs.outputs = outputs;
        self.downsample.cs.params = FilterParams {
            inverse_dimensions: inverse_base,
            _pad: [0.0; 2],
        };
        let one = &levels[1].slots[0];
        let (x, y) = dispatch_extent(one.width(), one.height(), TILE, TILE);
        cmd.bind_pipe(&self.downsample);
        cmd.dispatch(x, y, 1);
        cmd.pop_debug_group();

        cmd.push_debug_group("bloom blur");
        // Smallest level gets a plain blur into its b slot.
        let smallest = &levels[BLOOM_LEVELS - 1];
        let small_srv = smallest.slots[0].srv();
        let small_uav = smallest.slots[1].uav();
        cmd.transition(&small_srv, ResourceState::NonPixelShaderResource)?;
        cmd.transition(&small_uav, ResourceState::UnorderedAccess)?;
        self.blur.cs.source = small_srv;
        self.blur.cs.output = small_uav;
        self.blur.cs.params = FilterParams {
            inverse_dimensions: Vec2::new(
                1.0 / smallest.slots[0].width() as f32,
                1.0 / smallest.slots[0].height() as f32,
            ),
            _pad: [0.0; 2],
        };
        let (x, y) = dispatch_extent(
            smallest.slots[0].width(),
            smallest.slots[0].height(),
            TILE,
            TILE,
        );
        cmd.bind_pipe(&self.blur);
        cmd.dispatch(x, y, 1);

        // Each remaining level blends the blurred lower level in while
        // blurring its own downsampled data, largest last.
        for index in (0..BLOOM_LEVELS - 1).rev() {
            let level = &levels[index];
            let lower = &levels[index + 1];
            let higher_srv = level.slots[0].srv();
            let lower_srv = lower.slots[1].srv();
            let output = level.slots[1].uav();
            cmd.transition(&higher_srv, ResourceState::NonPixelShaderResource)?;
            cmd.transition(&lower_srv, ResourceState::NonPixelShaderResource)?;
            cmd.transition(&output, ResourceState::UnorderedAccess)?;
            self.upsample_blur.cs.higher_res = higher_srv;
            self.upsample_blur.cs.lower_res = lower_srv;
            self.upsample_blur.cs.output = output;
            self.upsample_blur.cs.params = UpsampleParams {
                inverse_dimensions: Vec2::new(
                    1.0 / level.slots[0].width() as f32,
                    1.0 / level.slots[0].height() as f32,
                ),
                upsample_blend_factor: UPSAMPLE_BLEND,
                _pad: 0.0,
            };
            let (x, y) = dispatch_extent(level.slots[0].width(), level.slots[0].height(), TILE, TILE);
            cmd.bind_pipe(&self.upsample_blur);
            cmd.dispatch(x, y, 1);
        }
        cmd.pop_debug_group();
        Ok(())
    }

    /// Drops every chain view held by the kernel argument structs.
    ///
    /// The arguments keep owning handles from the last bind; clearing them
    /// is what actually frees a released chain.
    fn release_chain_bindings(&mut self) {
        self.extract_bloom.cs.source = TextureSrv::default();
        self.extract_bloom.cs.bloom = TextureUav::default();
        self.extract_bloom.cs.luma = TextureUav::default();
        self.downsample.cs.source = TextureSrv::default();
        self.downsample.cs.outputs = Default::default();
        self.blur.cs.source = TextureSrv::default();
        self.blur.cs.output = TextureUav::default();
        self.upsample_blur.cs.higher_res = TextureSrv::default();
        self.upsample_blur.cs.lower_res = TextureSrv::default();
        self.upsample_blur.cs.output = TextureUav::default();
    }

    /// Sizes the luma target and bloom chain against the frame.
    ///
    /// The chain is keyed on level zero: any mismatch reallocates all five
    /// levels wholesale, clearing the kernel argument views first so no
    /// stale handle keeps a dropped level alive. Disabling bloom releases
    /// the chain but keeps luma, which next frame's histogram still needs.
    fn ensure_targets(&mut self, device: &Device, frame_width: u32, frame_height: u32, bloom: bool) {
        let (bw, bh) = bloom_base_extent(frame_width, frame_height);

        let luma_stale = self
            .luma
            .as_ref()
            .is_none_or(|l| needs_resize(l.width(), l.height(), bw, bh));
        if luma_stale {
            self.luma = Some(device.create_texture(
                TextureDesc::new()
                    .width(bw)
                    .height(bh)
                    .format(Format::R8Uint)
                    .usage(ResourceUsage::GpuReadWrite)
                    .name("bloom luma lr"),
            ));
        }

        if !bloom {
            if self.levels.is_some() {
                log::debug!("bloom disabled, releasing chain");
                self.release_chain_bindings();
                self.levels = None;
            }
            return;
        }

        let chain_stale = self.levels.as_ref().is_none_or(|levels| {
            let base = &levels[0].slots[0];
            needs_resize(base.width(), base.height(), bw, bh)
        });
        if chain_stale {
            log::debug!("bloom chain realloc at {bw}x{bh}");
            if self.levels.is_some() {
                self.release_chain_bindings();
            }
            self.levels = Some(std::array::from_fn(|index| {
                let w = (bw >> index).max(1);
                let h = (bh >> index).max(1);
                BloomLevel {
                    slots: std::array::from_fn(|_| {
                        device.create_texture(
                            TextureDesc::new()
                                .width(w)
                                .height(h)
                                .format(Format::Rgba16Float)
                                .usage(ResourceUsage::GpuReadWrite)
                                .name("bloom level"),
                        )
                    }),
                }
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;
    use crate::gpu::{Command, GraphicsApi, TrackedResource};
    use crate::post::exposure::Exposure;

    fn frame(device: &Device, w: u32, h: u32) -> TextureSrv {
        device
            .create_texture(
                TextureDesc::new()
                    .width(w)
                    .height(h)
                    .usage(ResourceUsage::GpuRenderTarget)
                    .name("frame"),
            )
            .srv()
    }

    fn enabled() -> BloomSettings {
        BloomSettings {
            enabled: true,
            ..BloomSettings::default()
        }
    }

    #[test]
    fn test_base_extent_halves_and_clamps() {
        assert_eq!(bloom_base_extent(1920, 1080), (960, 540));
        assert_eq!(bloom_base_extent(1, 1), (1, 1));
        assert_eq!(bloom_base_extent(3, 2), (1, 1));
    }

    #[test]
    fn test_chain_allocates_five_double_buffered_levels() {
        let device = Device::headless(GraphicsApi::Vulkan);
        let metrics = device.metrics().cloned().unwrap_or_default();
        let mut bloom = BloomAndLuminance::new(&device);
        let source = frame(&device, 1920, 1080);
        let exposure = Exposure::new(&device);
        let mut cmd = device.create_command_list("frame");

        let before = metrics.live_textures();
        bloom
            .extract(&device, &mut cmd, &source, &exposure.srv(), &enabled())
            .unwrap_or_else(|e| panic!("extract failed: {e}"));
        // Ten chain textures plus the luma target.
        assert_eq!(metrics.live_textures() - before, 11);
        assert!(bloom.bloom().valid());
        assert_eq!(bloom.bloom().width(), 960);
        assert_eq!(bloom.luma_pixel_count(), 960 * 540);
    }

    #[test]
    fn test_chain_extents_floor_halve() {
        let device = Device::headless(GraphicsApi::Vulkan);
        let mut bloom = BloomAndLuminance::new(&device);
        let exposure = Exposure::new(&device);
        let mut cmd = device.create_command_list("frame");

        bloom
            .extract(&device, &mut cmd, &frame(&device, 1920, 1080), &exposure.srv(), &enabled())
            .unwrap_or_else(|e| panic!("extract failed: {e}"));
        let levels = bloom.levels.as_ref().unwrap_or_else(|| panic!("no chain"));
        let extents: Vec<(u32, u32)> = levels
            .iter()
            .map(|level| (level.slots[0].width(), level.slots[0].height()))
            .collect();
        // Each level floor-halves the one above it; 540 bottoms out at 33.
        assert_eq!(
            extents,
            vec![(960, 540), (480, 270), (240, 135), (120, 67), (60, 33)],
            "chain extents drifted"
        );
        for level in levels.iter() {
            assert_eq!(level.slots[0].width(), level.slots[1].width());
            assert_eq!(level.slots[0].height(), level.slots[1].height());
        }
    }

    #[test]
    fn test_resize_reallocates_wholesale() {
        let device = Device::headless(GraphicsApi::Vulkan);
        let metrics = device.metrics().cloned().unwrap_or_default();
        let mut bloom = BloomAndLuminance::new(&device);
        let exposure = Exposure::new(&device);

        let mut cmd = device.create_command_list("frame");
        bloom
            .extract(&device, &mut cmd, &frame(&device, 1920, 1080), &exposure.srv(), &enabled())
            .unwrap_or_else(|e| panic!("extract failed: {e}"));
        let after_first = metrics.total_allocations();

        let mut cmd = device.create_command_list("frame");
        bloom
            .extract(&device, &mut cmd, &frame(&device, 1280, 720), &exposure.srv(), &enabled())
            .unwrap_or_else(|e| panic!("extract after resize failed: {e}"));
        assert_eq!(
            metrics.total_allocations() - after_first,
            12,
            "resize must recreate all ten chain textures, luma and the frame"
        );
        assert_eq!(bloom.bloom().width(), 640);
    }

    #[test]
    fn test_steady_state_reuses_targets() {
        let device = Device::headless(GraphicsApi::Vulkan);
        let metrics = device.metrics().cloned().unwrap_or_default();
        let mut bloom = BloomAndLuminance::new(&device);
        let exposure = Exposure::new(&device);
        let source = frame(&device, 1024, 512);

        let mut cmd = device.create_command_list("frame");
        bloom
            .extract(&device, &mut cmd, &source, &exposure.srv(), &enabled())
            .unwrap_or_else(|e| panic!("first extract failed: {e}"));
        let after_first = metrics.total_allocations();

        let mut cmd = device.create_command_list("frame");
        bloom
            .extract(&device, &mut cmd, &source, &exposure.srv(), &enabled())
            .unwrap_or_else(|e| panic!("second extract failed: {e}"));
        assert_eq!(
            metrics.total_allocations(),
            after_first,
            "matching frames must not allocate"
        );
    }

    #[test]
    fn test_disable_releases_chain_keeps_luma() {
        let device = Device::headless(GraphicsApi::D3d12);
        let metrics = device.metrics().cloned().unwrap_or_default();
        let mut bloom = BloomAndLuminance::new(&device);
        let exposure = Exposure::new(&device);
        let source = frame(&device, 1920, 1080);

        let mut cmd = device.create_command_list("frame");
        bloom
            .extract(&device, &mut cmd, &source, &exposure.srv(), &enabled())
            .unwrap_or_else(|e| panic!("extract failed: {e}"));
        let with_chain = metrics.live_textures();

        let mut cmd = device.create_command_list("frame");
        bloom
            .extract(&device, &mut cmd, &source, &exposure.srv(), &BloomSettings::default())
            .unwrap_or_else(|e| panic!("disabled extract failed: {e}"));
        assert_eq!(
            with_chain - metrics.live_textures(),
            10,
            "disabling bloom must release the ten chain textures"
        );
        assert!(!bloom.bloom().valid());
        assert!(bloom.luma().valid(), "luma stays for the histogram");
    }

    #[test]
    fn test_downsample_is_one_dispatch_for_four_levels() {
        let device = Device::headless(GraphicsApi::Vulkan);
        let mut bloom = BloomAndLuminance::new(&device);
        let exposure = Exposure::new(&device);
        let mut cmd = device.create_command_list("frame");

        bloom
            .extract(&device, &mut cmd, &frame(&device, 1920, 1080), &exposure.srv(), &enabled())
            .unwrap_or_else(|e| panic!("extract failed: {e}"));
        let dispatches: Vec<&'static str> = cmd
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::Dispatch { label, .. } => Some(*label),
                _ => None,
            })
            .collect();
        // Extract, one downsample, one blur, four upsample blends.
        assert_eq!(dispatches.len(), 7, "dispatches: {dispatches:?}");
        assert_eq!(
            dispatches
                .iter()
                .filter(|l| **l == "downsample bloom 4")
                .count(),
            1
        );
        assert_eq!(
            dispatches
                .iter()
                .filter(|l| **l == "upsample and blur")
                .count(),
            BLOOM_LEVELS - 1
        );
    }

    #[test]
    fn test_blur_runs_smallest_to_largest() {
        let device = Device::headless(GraphicsApi::Vulkan);
        let mut bloom = BloomAndLuminance::new(&device);
        let exposure = Exposure::new(&device);
        let mut cmd = device.create_command_list("frame");

        bloom
            .extract(&device, &mut cmd, &frame(&device, 1920, 1080), &exposure.srv(), &enabled())
            .unwrap_or_else(|e| panic!("extract failed: {e}"));
        let upsample_grids: Vec<(u32, u32, u32)> = cmd
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::Dispatch { label, groups, .. } if *label == "upsample and blur" => {
                    Some(*groups)
                }
                _ => None,
            })
            .collect();
        for pair in upsample_grids.windows(2) {
            assert!(
                pair[0].0 <= pair[1].0 && pair[0].1 <= pair[1].1,
                "upsample dispatches must grow toward level zero: {upsample_grids:?}"
            );
        }
    }
}
