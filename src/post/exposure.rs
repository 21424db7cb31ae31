//! The shared exposure buffer.

use std::sync::Arc;

use crate::gpu::{BufferDesc, BufferResource, BufferSrv, BufferUav, Device, Format, ResourceUsage};

/// Exposure the pipeline starts from before any adaptation has run.
pub const INITIAL_EXPOSURE: f32 = 2.0;
/// Lower bound of the log-luminance range the histogram covers.
pub const MIN_LOG_LUMINANCE: f32 = -12.0;
/// Upper bound of the log-luminance range the histogram covers.
pub const MAX_LOG_LUMINANCE: f32 = 4.0;

/// Number of floats in the exposure buffer.
pub const EXPOSURE_BUFFER_ELEMENTS: u32 = 8;

/// The eight-float exposure buffer every pass reads.
///
/// Layout: `[exposure, 1/exposure, exposure, 0, min_log, max_log,
/// log_range, 1/log_range]`. The adaptation pass rewrites the first four
/// entries in place; the log range is fixed.
#[derive(Debug)]
pub struct Exposure {
    buffer: Arc<BufferResource>,
}

impl Exposure {
    /// Allocates and initializes the buffer.
    #[must_use]
    pub fn new(device: &Device) -> Self {
        let initial = initial_contents();
        let buffer = device.create_buffer_with_data(
            BufferDesc::new()
                .elements(EXPOSURE_BUFFER_ELEMENTS)
                .format(Format::R32Float)
                .usage(ResourceUsage::GpuReadWrite)
                .name("exposure"),
            bytemuck::cast_slice(&initial),
        );
        Self { buffer }
    }

    /// Read view for the extract and tonemap passes.
    #[must_use]
    pub fn srv(&self) -> BufferSrv {
        self.buffer.srv()
    }

    /// Write view for the adaptation pass.
    #[must_use]
    pub fn uav(&self) -> BufferUav {
        self.buffer.uav()
    }
}

/// Initial buffer contents.
#[must_use]
pub fn initial_contents() -> [f32; EXPOSURE_BUFFER_ELEMENTS as usize] {
    let log_range = MAX_LOG_LUMINANCE - MIN_LOG_LUMINANCE;
    [
        INITIAL_EXPOSURE,
        1.0 / INITIAL_EXPOSURE,
        INITIAL_EXPOSURE,
        0.0,
        MIN_LOG_LUMINANCE,
        MAX_LOG_LUMINANCE,
        log_range,
        1.0 / log_range,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::GraphicsApi;

    #[test]
    fn test_initial_contents() {
        let contents = initial_contents();
        assert_eq!(
            contents,
            [2.0, 0.5, 2.0, 0.0, -12.0, 4.0, 16.0, 0.0625],
            "exposure buffer initialization drifted"
        );
    }

    #[test]
    fn test_buffer_is_eight_floats() {
        let device = Device::headless(GraphicsApi::Vulkan);
        let metrics = device.metrics().cloned().unwrap_or_default();
        let exposure = Exposure::new(&device);
        assert_eq!(metrics.buffer_bytes(), 32);
        assert!(exposure.srv().buffer().is_some());
    }
}
