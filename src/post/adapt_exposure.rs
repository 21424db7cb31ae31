//! Histogram-driven exposure adaptation.

use bytemuck::{Pod, Zeroable};

use crate::error::Error;
use crate::gpu::{
    Binding, BufferSrv, BufferUav, CommandList, ComputeKernel, Device, Pipeline, ResourceState,
};
use crate::post::exposure::{MAX_LOG_LUMINANCE, MIN_LOG_LUMINANCE};
use crate::post::histogram::HISTOGRAM_BINS;
use crate::post::settings::AdaptiveExposureSettings;

#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct AdaptParams {
    target_luminance: f32,
    adaptation_rate: f32,
    min_exposure: f32,
    max_exposure: f32,
    pixel_count: u32,
    _pad: [u32; 3],
}

#[derive(Debug)]
struct AdaptKernel {
    histogram: BufferSrv,
    exposure: BufferUav,
    params: AdaptParams,
}

impl ComputeKernel for AdaptKernel {
    const LABEL: &'static str = "adapt exposure";
    const SOURCE: &'static str = include_str!("../../assets/shaders/post/adapt_exposure.wgsl");

    fn bindings(&self) -> Vec<(u32, Binding)> {
        vec![
            (0, Binding::BufferSrv(self.histogram.clone())),
            (1, Binding::BufferUav(self.exposure.clone())),
            (2, Binding::Uniform(bytemuck::bytes_of(&self.params).to_vec())),
        ]
    }
}

/// The single-workgroup adaptation pass.
#[derive(Debug)]
pub struct AdaptExposure {
    pipeline: Pipeline<AdaptKernel>,
}

impl AdaptExposure {
    /// Compiles the kernel.
    #[must_use]
    pub fn new(device: &Device) -> Self {
        Self {
            pipeline: device.create_pipeline(AdaptKernel {
                histogram: BufferSrv::default(),
                exposure: BufferUav::default(),
                params: AdaptParams::zeroed(),
            }),
        }
    }

    /// Reduces the histogram and rewrites the exposure buffer in place.
    ///
    /// One workgroup, one dispatch; the reduction fits in shared memory.
    ///
    /// # Errors
    ///
    /// Propagates barrier failures from the command list.
    pub fn adapt(
        &mut self,
        cmd: &mut CommandList,
        histogram: &BufferSrv,
        exposure: &BufferUav,
        settings: &AdaptiveExposureSettings,
        pixel_count: u32,
    ) -> Result<(), Error> {
        cmd.push_debug_group("adapt exposure");
        cmd.transition(histogram, ResourceState::NonPixelShaderResource)?;
        cmd.transition(exposure, ResourceState::UnorderedAccess)?;

        self.pipeline.cs.histogram = histogram.clone();
        self.pipeline.cs.exposure = exposure.clone();
        self.pipeline.cs.params = AdaptParams {
            target_luminance: settings.target_luminance,
            adaptation_rate: settings.adaptation_rate,
            min_exposure: settings.min_exposure,
            max_exposure: settings.max_exposure,
            pixel_count,
            _pad: [0; 3],
        };
        cmd.bind_pipe(&self.pipeline);
        cmd.dispatch(1, 1, 1);
        cmd.pop_debug_group();
        Ok(())
    }
}

/// The adaptation the kernel computes, as a host-side reference.
///
/// Bin zero holds pixels darker than the histogram range and is excluded
/// from the weighted average, matching the shader. The result is always
/// clamped to `[min_exposure, max_exposure]`.
#[must_use]
pub fn adapted_exposure(
    histogram: &[u32; HISTOGRAM_BINS as usize],
    previous_exposure: f32,
    settings: &AdaptiveExposureSettings,
    pixel_count: u32,
) -> f32 {
    let weighted_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(bin, count)| bin as f64 * f64::from(*count))
        .sum();
    let considered = pixel_count.saturating_sub(histogram[0]).max(1);
    let weighted_average = (weighted_sum / f64::from(considered) - 1.0).max(0.0) as f32;

    let log_range = MAX_LOG_LUMINANCE - MIN_LOG_LUMINANCE;
    let average_luminance =
        (weighted_average / (HISTOGRAM_BINS - 2) as f32 * log_range + MIN_LOG_LUMINANCE).exp2();
    let target = settings.target_luminance / average_luminance;

    let adapted =
        previous_exposure + (target - previous_exposure) * settings.adaptation_rate;
    adapted.clamp(settings.min_exposure, settings.max_exposure)
}
