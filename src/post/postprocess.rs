//! The frame-level orchestrator.

use std::sync::Arc;

use crate::error::Error;
use crate::gpu::{
    needs_resize, CommandList, Device, Format, ResourceState, ResourceUsage, TextureDesc,
    TextureResource, TextureRtv, TextureSrv, TrackedResource,
};
use crate::post::adapt_exposure::AdaptExposure;
use crate::post::bloom::BloomAndLuminance;
use crate::post::exposure::Exposure;
use crate::post::histogram::Histogram;
use crate::post::settings::PostprocessSettings;
use crate::post::tonemap::Tonemapper;

/// Records the whole HDR pipeline onto one command list per frame.
///
/// Stage order is fixed: histogram, exposure adaptation, bloom extraction,
/// tonemap. The histogram therefore reads the low-res luma written by the
/// previous frame's extract pass and is skipped on the very first frame,
/// before that target exists.
#[derive(Debug)]
pub struct Postprocess {
    exposure: Exposure,
    histogram: Histogram,
    adapt: AdaptExposure,
    bloom: BloomAndLuminance,
    tonemapper: Tonemapper,
    // Ping-pong pair: [0] receives the frame copy, [1] is the chromatic
    // variants' output.
    color: Option<[Arc<TextureResource>; 2]>,
}

impl Postprocess {
    /// Builds every component. Frame-sized targets are allocated lazily.
    #[must_use]
    pub fn new(device: &Device) -> Self {
        Self {
            exposure: Exposure::new(device),
            histogram: Histogram::new(device),
            adapt: AdaptExposure::new(device),
            bloom: BloomAndLuminance::new(device),
            tonemapper: Tonemapper::new(device),
            color: None,
        }
    }

    /// Runs the pipeline over `frame` and copies the result into `target`,
    /// leaving `target` in [`ResourceState::Present`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidResource`] when `frame` or `target` is dangling, and
    /// any barrier failure from the command list.
    pub fn render(
        &mut self,
        device: &Device,
        cmd: &mut CommandList,
        target: &TextureRtv,
        frame: &TextureSrv,
        settings: &PostprocessSettings,
        draw_histogram_debug: bool,
    ) -> Result<(), Error> {
        if !frame.valid() {
            return Err(Error::InvalidResource {
                name: frame.debug_name().to_owned(),
            });
        }
        let (width, height) = (frame.width(), frame.height());
        self.ensure_color_buffers(device, width, height);
        let Some([color_a, color_b]) = self.color.clone() else {
            return Err(Error::InvalidResource {
                name: frame.debug_name().to_owned(),
            });
        };

        cmd.push_debug_group("postprocess");

        // Bring the frame into the working buffer.
        cmd.transition(frame, ResourceState::CopySource)?;
        let input = color_a.srv();
        cmd.transition(&input, ResourceState::CopyDest)?;
        cmd.copy_texture(frame, &input)?;
        cmd.transition(&input, ResourceState::NonPixelShaderResource)?;

        // Exposure from last frame's luminance.
        let luma_lr = self.bloom.luma();
        if luma_lr.valid() {
            self.histogram.generate(cmd, &luma_lr)?;
            self.adapt.adapt(
                cmd,
                &self.histogram.srv(),
                &self.exposure.uav(),
                &settings.adaptive_exposure,
                self.bloom.luma_pixel_count(),
            )?;
        }

        self.bloom
            .extract(device, cmd, &input, &self.exposure.srv(), &settings.bloom)?;

        let variant = self.tonemapper.tonemap(
            device,
            cmd,
            &color_a.uav(),
            &input,
            &color_b.uav(),
            &self.bloom.bloom(),
            &self.exposure.srv(),
            settings,
        )?;
        let result = if variant.reads_color_input() {
            &color_b
        } else {
            &color_a
        };

        if draw_histogram_debug {
            self.histogram
                .draw_debug(cmd, &self.exposure.srv(), &result.uav())?;
        }

        // Deliver and hand the target to the presenter.
        let result_srv = result.srv();
        cmd.transition(&result_srv, ResourceState::CopySource)?;
        cmd.transition(target, ResourceState::CopyDest)?;
        cmd.copy_texture(&result_srv, target)?;
        cmd.transition(target, ResourceState::Present)?;

        cmd.pop_debug_group();
        Ok(())
    }

    /// Full-resolution luminance from the most recent frame.
    #[must_use]
    pub fn luma(&self) -> TextureSrv {
        self.tonemapper.luma()
    }

    fn ensure_color_buffers(&mut self, device: &Device, width: u32, height: u32) {
        let stale = self.color.as_ref().is_none_or(|[a, _]| {
            needs_resize(a.width(), a.height(), width, height)
        });
        if stale && width > 0 && height > 0 {
            log::debug!("color ping-pong realloc at {width}x{height}");
            self.color = Some(std::array::from_fn(|_| {
                device.create_texture(
                    TextureDesc::new()
                        .width(width)
                        .height(height)
                        .format(Format::Rgba16Float)
                        .usage(ResourceUsage::GpuReadWrite)
                        .name("postprocess color"),
                )
            }));
        }
    }
}
