//! Per-frame command recording.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::gpu::api::GraphicsApi;
use crate::gpu::barrier::Barrier;
use crate::gpu::pipeline::{Binding, ComputeKernel, Pipeline, PipelineId};
use crate::gpu::resource::{
    BufferUav, ResourceId, TextureHandle, TrackedResource,
};
use crate::gpu::state::ResourceState;
use crate::gpu::wgpu_backend::WgpuDevice;

/// One recorded operation, kept for capture inspection on every backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A pipeline and its arguments were bound.
    BindPipeline {
        /// Bound pipeline.
        pipeline: PipelineId,
        /// Pipeline debug label.
        label: &'static str,
    },
    /// A compute dispatch.
    Dispatch {
        /// Dispatched pipeline.
        pipeline: PipelineId,
        /// Pipeline debug label.
        label: &'static str,
        /// Workgroup counts.
        groups: (u32, u32, u32),
    },
    /// A buffer was cleared to zero.
    ClearBuffer {
        /// Cleared buffer.
        buffer: ResourceId,
    },
    /// A whole-texture copy.
    CopyTexture {
        /// Copy source.
        src: ResourceId,
        /// Copy destination.
        dst: ResourceId,
    },
    /// A resource state transition.
    Transition(Barrier),
    /// Start of a named debug region.
    PushDebugGroup(&'static str),
    /// End of the innermost debug region.
    PopDebugGroup,
}

#[derive(Debug)]
struct PendingDispatch {
    id: PipelineId,
    label: &'static str,
    bindings: Vec<(u32, Binding)>,
    wgpu: Option<Arc<wgpu::ComputePipeline>>,
}

#[derive(Debug)]
pub(crate) enum ListBackend {
    Wgpu {
        device: WgpuDevice,
        encoder: wgpu::CommandEncoder,
    },
    Headless,
}

/// Records compute passes, copies and barriers for one submission.
///
/// Recording is single-threaded; the list validates resource states as it
/// goes and keeps a replayable [`Command`] log regardless of backend.
#[derive(Debug)]
pub struct CommandList {
    label: &'static str,
    api: Option<GraphicsApi>,
    backend: ListBackend,
    log: Vec<Command>,
    pending: Option<PendingDispatch>,
    states: FxHashMap<ResourceId, ResourceState>,
}

impl CommandList {
    pub(crate) fn new(
        label: &'static str,
        api: Option<GraphicsApi>,
        backend: ListBackend,
    ) -> Self {
        Self {
            label,
            api,
            backend,
            log: Vec::new(),
            pending: None,
            states: FxHashMap::default(),
        }
    }

    /// Debug label given at creation.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// API the device reported, `None` when barriers cannot be encoded.
    #[must_use]
    pub fn api(&self) -> Option<GraphicsApi> {
        self.api
    }

    /// Everything recorded so far, in order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.log
    }

    /// The state this list last transitioned `id` into, if it did.
    #[must_use]
    pub fn tracked_state(&self, id: ResourceId) -> Option<ResourceState> {
        self.states.get(&id).copied()
    }

    /// Opens a named debug region.
    pub fn push_debug_group(&mut self, label: &'static str) {
        if let ListBackend::Wgpu { encoder, .. } = &mut self.backend {
            encoder.push_debug_group(label);
        }
        self.log.push(Command::PushDebugGroup(label));
    }

    /// Closes the innermost debug region.
    pub fn pop_debug_group(&mut self) {
        if let ListBackend::Wgpu { encoder, .. } = &mut self.backend {
            encoder.pop_debug_group();
        }
        self.log.push(Command::PopDebugGroup);
    }

    /// Binds a pipeline and snapshots its current arguments.
    ///
    /// Every view argument must be valid and in a state matching its
    /// binding kind; violations are recording bugs and assert in debug
    /// builds.
    pub fn bind_pipe<K: ComputeKernel>(&mut self, pipeline: &Pipeline<K>) {
        let bindings = pipeline.cs.bindings();
        for (slot, binding) in &bindings {
            debug_assert!(
                binding.is_bindable(),
                "pipeline '{}': binding {slot} is an invalid view",
                pipeline.label()
            );
            if let Some(tracked) = binding.tracked() {
                if let Some(tracking) = tracked.tracking() {
                    let state = tracking.state();
                    match binding {
                        Binding::TextureUav(_) | Binding::BufferUav(_) => debug_assert!(
                            state == ResourceState::UnorderedAccess,
                            "pipeline '{}': '{}' bound for write in state {state}",
                            pipeline.label(),
                            tracking.name()
                        ),
                        Binding::TextureSrv(_) | Binding::BufferSrv(_) => debug_assert!(
                            state.is_shader_readable(),
                            "pipeline '{}': '{}' bound for read in state {state}",
                            pipeline.label(),
                            tracking.name()
                        ),
                        Binding::Sampler(_) | Binding::Uniform(_) => {}
                    }
                }
            }
        }
        self.log.push(Command::BindPipeline {
            pipeline: pipeline.id(),
            label: pipeline.label(),
        });
        self.pending = Some(PendingDispatch {
            id: pipeline.id(),
            label: pipeline.label(),
            bindings,
            wgpu: pipeline.wgpu_pipeline().map(Arc::clone),
        });
    }

    /// Dispatches the bound pipeline.
    pub fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        let Some(pending) = &self.pending else {
            log::error!("list '{}': dispatch with no pipeline bound", self.label);
            return;
        };
        if let ListBackend::Wgpu { device, encoder } = &mut self.backend {
            if let Some(wgpu_pipeline) = &pending.wgpu {
                device.encode_dispatch(
                    encoder,
                    wgpu_pipeline,
                    pending.label,
                    &pending.bindings,
                    (x, y, z),
                );
            }
        }
        self.log.push(Command::Dispatch {
            pipeline: pending.id,
            label: pending.label,
            groups: (x, y, z),
        });
    }

    /// Zero-fills a buffer. The buffer must be in [`ResourceState::CopyDest`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidResource`] for a dangling view,
    /// [`Error::StateMismatch`] when the buffer is in the wrong state.
    pub fn clear_buffer(&mut self, buffer: &BufferUav) -> Result<(), Error> {
        let tracking = buffer.tracking().ok_or_else(|| Error::InvalidResource {
            name: buffer.debug_name().to_owned(),
        })?;
        if tracking.state() != ResourceState::CopyDest {
            return Err(Error::StateMismatch {
                name: tracking.name().to_owned(),
                expected: ResourceState::CopyDest,
                actual: tracking.state(),
            });
        }
        if let (ListBackend::Wgpu { encoder, .. }, Some(resource)) =
            (&mut self.backend, buffer.buffer())
        {
            if let Some(wgpu_buffer) = resource.wgpu_buffer() {
                encoder.clear_buffer(wgpu_buffer, 0, None);
            }
        }
        self.log.push(Command::ClearBuffer {
            buffer: tracking.id(),
        });
        Ok(())
    }

    /// Copies the overlapping extent of `src` into `dst`.
    ///
    /// `src` must be in [`ResourceState::CopySource`] and `dst` in
    /// [`ResourceState::CopyDest`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidResource`] or [`Error::StateMismatch`] as for
    /// [`Self::clear_buffer`].
    pub fn copy_texture<S, D>(&mut self, src: &S, dst: &D) -> Result<(), Error>
    where
        S: TextureHandle,
        D: TextureHandle,
    {
        let src_tracking = src.tracking().ok_or_else(|| Error::InvalidResource {
            name: src.debug_name().to_owned(),
        })?;
        let dst_tracking = dst.tracking().ok_or_else(|| Error::InvalidResource {
            name: dst.debug_name().to_owned(),
        })?;
        check_state(src_tracking.name(), src_tracking.state(), ResourceState::CopySource)?;
        check_state(dst_tracking.name(), dst_tracking.state(), ResourceState::CopyDest)?;
        if let (ListBackend::Wgpu { encoder, .. }, Some(src_res), Some(dst_res)) =
            (&mut self.backend, src.texture(), dst.texture())
        {
            if let (Some(src_tex), Some(dst_tex)) = (src_res.wgpu_texture(), dst_res.wgpu_texture())
            {
                encoder.copy_texture_to_texture(
                    src_tex.as_image_copy(),
                    dst_tex.as_image_copy(),
                    wgpu::Extent3d {
                        width: src_res.width().min(dst_res.width()),
                        height: src_res.height().min(dst_res.height()),
                        depth_or_array_layers: 1,
                    },
                );
            }
        }
        self.log.push(Command::CopyTexture {
            src: src_tracking.id(),
            dst: dst_tracking.id(),
        });
        Ok(())
    }

    /// Transitions `resource` from its tracked state into `after`.
    ///
    /// A transition into the current state is a permitted no-op and records
    /// nothing.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedBackend`] when the device has no barrier backend
    /// and [`Error::InvalidResource`] for a dangling view.
    pub fn transition(
        &mut self,
        resource: &dyn TrackedResource,
        after: ResourceState,
    ) -> Result<(), Error> {
        let tracking = resource.tracking().ok_or_else(|| Error::InvalidResource {
            name: resource.debug_name().to_owned(),
        })?;
        let before = tracking.state();
        if before == after {
            return Ok(());
        }
        let barrier = Barrier::new(self.api, resource, before, after)?;
        self.emit_barrier(barrier);
        tracking.set_state(after);
        Ok(())
    }

    /// Records a pre-built barrier verbatim.
    ///
    /// Used for split barriers and semaphore-carrying transitions; callers
    /// are responsible for keeping tracked state coherent.
    pub fn emit_barrier(&mut self, barrier: Barrier) {
        self.states.insert(barrier.resource, barrier.after);
        self.log.push(Command::Transition(barrier));
    }

    pub(crate) fn finish(self) -> Option<wgpu::CommandBuffer> {
        match self.backend {
            ListBackend::Wgpu { encoder, .. } => Some(encoder.finish()),
            ListBackend::Headless => None,
        }
    }
}

fn check_state(
    name: &'static str,
    actual: ResourceState,
    expected: ResourceState,
) -> Result<(), Error> {
    if actual == expected {
        Ok(())
    } else {
        Err(Error::StateMismatch {
            name: name.to_owned(),
            expected,
            actual,
        })
    }
}
