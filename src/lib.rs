// -- Lint policy ---------------------------------------------------------
// Crate-wide lint levels live in Cargo.toml; the denies here are the ones
// that must hold regardless of how the crate is consumed.

// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]

//! HDR post-processing core built on an explicit GPU resource-barrier layer.
//!
//! Afterglow records a fixed multi-pass tonemapping pipeline (luminance
//! histogram, adaptive exposure, bloom extraction with a cascaded mip-chain
//! blur, and a four-variant tonemap) onto a single per-frame command list.
//! Every cross-pass hazard is expressed as an explicit [`gpu::Barrier`]
//! describing the resource's transition between usage states, with one
//! backend payload per graphics API (Direct3D 12, Vulkan, Metal).
//!
//! # Key entry points
//!
//! - [`gpu::Device`] - resource, pipeline and command-list factory
//! - [`gpu::CommandList`] - per-frame recording context
//! - [`post::Postprocess`] - the pipeline orchestrator
//! - [`post::PostprocessSettings`] - per-frame effect configuration
//!
//! # Architecture
//!
//! The [`gpu`] module is a thin hardware-abstraction layer with two device
//! backends selected once at construction: a real `wgpu` backend and a
//! headless backend used for GPU-free testing and allocation accounting.
//! Intermediate textures (low-res luma, the five bloom levels, the
//! ping-pong color buffers) are sized lazily against the incoming frame and
//! recreated only when [`gpu::needs_resize`] says so.

pub mod error;
pub mod gpu;
pub mod post;

pub use error::Error;
