//! GPU hardware-abstraction layer.
//!
//! A deliberately small device/command-list surface with two backends
//! selected once at [`Device`] construction: a real `wgpu` backend and a
//! headless backend for GPU-free tests and allocation accounting. The layer
//! is state-explicit: every resource carries its current [`ResourceState`],
//! and usage-category changes between passes are expressed as [`Barrier`]s
//! with a per-API payload.

pub mod api;
pub mod backend;
pub mod barrier;
pub mod command_list;
pub mod descriptor;
pub mod device;
pub mod extent;
pub mod headless;
pub mod pipeline;
pub mod resource;
pub mod state;
pub mod wgpu_backend;

pub use api::GraphicsApi;
pub use backend::BarrierPayload;
pub use barrier::{Barrier, BarrierFlags, Semaphore, SUBRESOURCE_ALL};
pub use command_list::{Command, CommandList};
pub use descriptor::{
    BufferDesc, Filter, Format, ResourceUsage, SamplerDesc, TextureAddressMode, TextureDesc,
};
pub use device::Device;
pub use extent::{dispatch_extent, needs_resize, round_up_to_multiple};
pub use headless::HeadlessMetrics;
pub use pipeline::{Binding, ComputeKernel, Pipeline, PipelineId};
pub use resource::{
    BufferResource, BufferSrv, BufferUav, ResourceId, ResourceTracking, Sampler, TextureHandle,
    TextureResource, TextureRtv, TextureSrv, TextureUav, TrackedResource,
};
pub use state::ResourceState;
