//! Compute kernels and pipeline objects.
//!
//! A kernel is a plain struct whose public fields are its shader arguments;
//! recording code fills the fields and hands the pipeline to
//! [`CommandList::bind_pipe`](crate::gpu::CommandList::bind_pipe). The
//! [`ComputeKernel::bindings`] implementation flattens the fields into
//! numbered bind-group entries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::gpu::resource::{
    BufferSrv, BufferUav, Sampler, TextureSrv, TextureUav, TrackedResource,
};

static NEXT_PIPELINE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a compiled pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineId(pub(crate) u64);

impl PipelineId {
    fn next() -> Self {
        Self(NEXT_PIPELINE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One shader argument at a numbered binding slot.
#[derive(Debug, Clone)]
pub enum Binding {
    /// Sampled texture.
    TextureSrv(TextureSrv),
    /// Storage texture.
    TextureUav(TextureUav),
    /// Read-only storage buffer.
    BufferSrv(BufferSrv),
    /// Read-write storage buffer.
    BufferUav(BufferUav),
    /// Sampler.
    Sampler(Sampler),
    /// Uniform data, uploaded per dispatch.
    Uniform(Vec<u8>),
}

impl Binding {
    /// The tracked resource behind this binding, if it is a view.
    #[must_use]
    pub fn tracked(&self) -> Option<&dyn TrackedResource> {
        match self {
            Self::TextureSrv(view) => Some(view),
            Self::TextureUav(view) => Some(view),
            Self::BufferSrv(view) => Some(view),
            Self::BufferUav(view) => Some(view),
            Self::Sampler(_) | Self::Uniform(_) => None,
        }
    }

    /// Whether the binding can be bound as-is.
    #[must_use]
    pub fn is_bindable(&self) -> bool {
        self.tracked().is_none_or(|view| view.valid())
    }
}

/// A compute shader with typed arguments.
pub trait ComputeKernel {
    /// Debug label, also used for pass markers.
    const LABEL: &'static str;
    /// WGSL module source.
    const SOURCE: &'static str;
    /// Entry point within the module.
    const ENTRY: &'static str = "main";

    /// Flattens the argument fields into `(slot, binding)` pairs.
    fn bindings(&self) -> Vec<(u32, Binding)>;
}

/// A compiled compute pipeline carrying its argument struct.
#[derive(Debug)]
pub struct Pipeline<K: ComputeKernel> {
    /// Shader arguments, filled by recording code before each bind.
    pub cs: K,
    id: PipelineId,
    wgpu: Option<Arc<wgpu::ComputePipeline>>,
}

impl<K: ComputeKernel> Pipeline<K> {
    pub(crate) fn new(cs: K, wgpu: Option<Arc<wgpu::ComputePipeline>>) -> Self {
        Self {
            cs,
            id: PipelineId::next(),
            wgpu,
        }
    }

    /// Pipeline identity.
    #[must_use]
    pub fn id(&self) -> PipelineId {
        self.id
    }

    /// Debug label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        K::LABEL
    }

    pub(crate) fn wgpu_pipeline(&self) -> Option<&Arc<wgpu::ComputePipeline>> {
        self.wgpu.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopKernel {
        input: TextureSrv,
    }

    impl ComputeKernel for NoopKernel {
        const LABEL: &'static str = "noop";
        const SOURCE: &'static str = "";

        fn bindings(&self) -> Vec<(u32, Binding)> {
            vec![(0, Binding::TextureSrv(self.input.clone()))]
        }
    }

    #[test]
    fn test_invalid_view_is_not_bindable() {
        let kernel = NoopKernel {
            input: TextureSrv::default(),
        };
        let bindings = kernel.bindings();
        assert_eq!(bindings.len(), 1);
        assert!(!bindings[0].1.is_bindable());
    }

    #[test]
    fn test_uniform_is_always_bindable() {
        let binding = Binding::Uniform(vec![0u8; 16]);
        assert!(binding.is_bindable());
        assert!(binding.tracked().is_none());
    }

    #[test]
    fn test_pipeline_ids_are_unique() {
        let a = Pipeline::new(
            NoopKernel {
                input: TextureSrv::default(),
            },
            None,
        );
        let b = Pipeline::new(
            NoopKernel {
                input: TextureSrv::default(),
            },
            None,
        );
        assert_ne!(a.id(), b.id());
        assert_eq!(a.label(), "noop");
    }
}
