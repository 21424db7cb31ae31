//! HDR post-processing components.
//!
//! Each stage owns its pipelines and intermediate targets and records onto
//! a shared [`CommandList`](crate::gpu::CommandList); [`Postprocess`] wires
//! them together in the fixed per-frame order.

pub mod adapt_exposure;
pub mod bloom;
pub mod exposure;
pub mod histogram;
pub mod postprocess;
pub mod settings;
pub mod tonemap;

pub use adapt_exposure::{adapted_exposure, AdaptExposure};
pub use bloom::{bloom_base_extent, BloomAndLuminance, BLOOM_LEVELS, UPSAMPLE_BLEND};
pub use exposure::{Exposure, INITIAL_EXPOSURE, MAX_LOG_LUMINANCE, MIN_LOG_LUMINANCE};
pub use histogram::{Histogram, DEBUG_DRAW_ROWS, HISTOGRAM_BINS, HISTOGRAM_TILE};
pub use postprocess::Postprocess;
pub use settings::{
    AdaptiveExposureSettings, BloomSettings, ChromaticAberrationSettings, PostprocessSettings,
    VignetteSettings,
};
pub use tonemap::{TonemapVariant, Tonemapper};
