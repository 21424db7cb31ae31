//! Luminance histogram generation and debug overlay.

use std::sync::Arc;

use crate::error::Error;
use crate::gpu::{
    dispatch_extent, Binding, BufferDesc, BufferResource, BufferSrv, BufferUav, CommandList,
    ComputeKernel, Device, Format, Pipeline, ResourceState, ResourceUsage, TextureSrv, TextureUav,
};

/// Histogram bin count, one per quantized log-luminance value.
pub const HISTOGRAM_BINS: u32 = 256;
/// Pixels covered per workgroup axis by the generate pass.
pub const HISTOGRAM_TILE: u32 = 16;
/// Height in workgroup rows of the debug overlay.
pub const DEBUG_DRAW_ROWS: u32 = 32;

#[derive(Debug)]
struct GenerateKernel {
    luma: TextureSrv,
    histogram: BufferUav,
}

impl ComputeKernel for GenerateKernel {
    const LABEL: &'static str = "generate histogram";
    const SOURCE: &'static str =
        include_str!("../../assets/shaders/post/generate_histogram.wgsl");

    fn bindings(&self) -> Vec<(u32, Binding)> {
        vec![
            (0, Binding::TextureSrv(self.luma.clone())),
            (1, Binding::BufferUav(self.histogram.clone())),
        ]
    }
}

#[derive(Debug)]
struct DebugDrawKernel {
    histogram: BufferSrv,
    exposure: BufferSrv,
    output: TextureUav,
}

impl ComputeKernel for DebugDrawKernel {
    const LABEL: &'static str = "debug draw histogram";
    const SOURCE: &'static str =
        include_str!("../../assets/shaders/post/debug_draw_histogram.wgsl");

    fn bindings(&self) -> Vec<(u32, Binding)> {
        vec![
            (0, Binding::BufferSrv(self.histogram.clone())),
            (1, Binding::BufferSrv(self.exposure.clone())),
            (2, Binding::TextureUav(self.output.clone())),
        ]
    }
}

/// The 256-bin log-luminance histogram.
#[derive(Debug)]
pub struct Histogram {
    buffer: Arc<BufferResource>,
    generate: Pipeline<GenerateKernel>,
    debug_draw: Pipeline<DebugDrawKernel>,
}

impl Histogram {
    /// Allocates the bin buffer and compiles both kernels.
    #[must_use]
    pub fn new(device: &Device) -> Self {
        let buffer = device.create_buffer(
            BufferDesc::new()
                .elements(HISTOGRAM_BINS)
                .format(Format::R32Uint)
                .usage(ResourceUsage::GpuReadWrite)
                .name("luminance histogram"),
        );
        Self {
            buffer,
            generate: device.create_pipeline(GenerateKernel {
                luma: TextureSrv::default(),
                histogram: BufferUav::default(),
            }),
            debug_draw: device.create_pipeline(DebugDrawKernel {
                histogram: BufferSrv::default(),
                exposure: BufferSrv::default(),
                output: TextureUav::default(),
            }),
        }
    }

    /// Read view of the bins, for the adaptation pass.
    #[must_use]
    pub fn srv(&self) -> BufferSrv {
        self.buffer.srv()
    }

    /// Clears the bins and accumulates `luma` into them.
    ///
    /// One workgroup covers a [`HISTOGRAM_TILE`]-square pixel tile.
    ///
    /// # Errors
    ///
    /// Propagates barrier and clear failures from the command list.
    pub fn generate(&mut self, cmd: &mut CommandList, luma: &TextureSrv) -> Result<(), Error> {
        cmd.push_debug_group("histogram");
        let uav = self.buffer.uav();
        cmd.transition(&uav, ResourceState::CopyDest)?;
        cmd.clear_buffer(&uav)?;
        cmd.transition(&uav, ResourceState::UnorderedAccess)?;
        cmd.transition(luma, ResourceState::NonPixelShaderResource)?;

        self.generate.cs.luma = luma.clone();
        self.generate.cs.histogram = uav;
        cmd.bind_pipe(&self.generate);
        let (x, y) = dispatch_extent(luma.width(), luma.height(), HISTOGRAM_TILE, HISTOGRAM_TILE);
        cmd.dispatch(x, y, 1);
        cmd.pop_debug_group();
        Ok(())
    }

    /// Draws the histogram and current exposure marker over `output`.
    ///
    /// # Errors
    ///
    /// Propagates barrier failures from the command list.
    pub fn draw_debug(
        &mut self,
        cmd: &mut CommandList,
        exposure: &BufferSrv,
        output: &TextureUav,
    ) -> Result<(), Error> {
        cmd.push_debug_group("histogram debug overlay");
        let srv = self.buffer.srv();
        cmd.transition(&srv, ResourceState::NonPixelShaderResource)?;
        cmd.transition(exposure, ResourceState::NonPixelShaderResource)?;
        cmd.transition(output, ResourceState::UnorderedAccess)?;

        self.debug_draw.cs.histogram = srv;
        self.debug_draw.cs.exposure = exposure.clone();
        self.debug_draw.cs.output = output.clone();
        cmd.bind_pipe(&self.debug_draw);
        cmd.dispatch(1, DEBUG_DRAW_ROWS, 1);
        cmd.pop_debug_group();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;
    use crate::gpu::{Command, GraphicsApi, TextureDesc};

    #[test]
    fn test_generate_clears_then_accumulates() {
        let device = Device::headless(GraphicsApi::D3d12);
        let mut histogram = Histogram::new(&device);
        let luma = device.create_texture(
            TextureDesc::new()
                .width(256)
                .height(128)
                .format(Format::R8Uint)
                .usage(ResourceUsage::GpuReadWrite)
                .name("luma lr"),
        );
        let mut cmd = device.create_command_list("frame");

        histogram
            .generate(&mut cmd, &luma.srv())
            .unwrap_or_else(|e| panic!("generate failed: {e}"));

        let commands = cmd.commands();
        let clear_at = commands
            .iter()
            .position(|c| matches!(c, Command::ClearBuffer { .. }))
            .unwrap_or(usize::MAX);
        let dispatch_at = commands
            .iter()
            .position(|c| matches!(c, Command::Dispatch { .. }))
            .unwrap_or(0);
        assert!(
            clear_at < dispatch_at,
            "bins must be cleared before accumulation"
        );
        assert!(matches!(
            commands[dispatch_at],
            Command::Dispatch {
                groups: (16, 8, 1),
                ..
            }
        ));
        assert_eq!(
            histogram.buffer.tracking().state(),
            ResourceState::UnorderedAccess
        );
    }

    #[test]
    fn test_debug_draw_is_one_by_thirtytwo() {
        let device = Device::headless(GraphicsApi::Vulkan);
        let mut histogram = Histogram::new(&device);
        let exposure = device.create_buffer(
            BufferDesc::new()
                .elements(8)
                .format(Format::R32Float)
                .usage(ResourceUsage::GpuReadWrite)
                .name("exposure"),
        );
        let color = device.create_texture(
            TextureDesc::new()
                .width(1920)
                .height(1080)
                .usage(ResourceUsage::GpuReadWrite)
                .name("color"),
        );
        let mut cmd = device.create_command_list("frame");

        histogram
            .draw_debug(&mut cmd, &exposure.srv(), &color.uav())
            .unwrap_or_else(|e| panic!("debug draw failed: {e}"));
        assert!(cmd.commands().iter().any(|c| matches!(
            c,
            Command::Dispatch {
                groups: (1, 32, 1),
                ..
            }
        )));
    }
}
