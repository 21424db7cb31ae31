//! Headless backend accounting.
//!
//! The headless device allocates nothing on a GPU; it only tracks what a
//! real device would have allocated. Components that promise "release on
//! disable" or "wholesale reallocation" are tested against these counters.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct MetricsInner {
    live_textures: AtomicUsize,
    live_buffers: AtomicUsize,
    texture_bytes: AtomicU64,
    buffer_bytes: AtomicU64,
    total_allocations: AtomicUsize,
}

/// Live-resource counters for a headless device.
#[derive(Debug, Clone, Default)]
pub struct HeadlessMetrics {
    inner: Arc<MetricsInner>,
}

impl HeadlessMetrics {
    /// New counter set with everything at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently live textures.
    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.inner.live_textures.load(Ordering::Relaxed)
    }

    /// Number of currently live buffers.
    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.inner.live_buffers.load(Ordering::Relaxed)
    }

    /// Bytes held by live textures.
    #[must_use]
    pub fn texture_bytes(&self) -> u64 {
        self.inner.texture_bytes.load(Ordering::Relaxed)
    }

    /// Bytes held by live buffers.
    #[must_use]
    pub fn buffer_bytes(&self) -> u64 {
        self.inner.buffer_bytes.load(Ordering::Relaxed)
    }

    /// Total allocations ever made, live or not.
    #[must_use]
    pub fn total_allocations(&self) -> usize {
        self.inner.total_allocations.load(Ordering::Relaxed)
    }

    pub(crate) fn track_texture(&self, bytes: u64) -> AllocationGuard {
        self.inner.live_textures.fetch_add(1, Ordering::Relaxed);
        self.inner.texture_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.inner.total_allocations.fetch_add(1, Ordering::Relaxed);
        AllocationGuard {
            inner: Arc::clone(&self.inner),
            kind: AllocationKind::Texture,
            bytes,
        }
    }

    pub(crate) fn track_buffer(&self, bytes: u64) -> AllocationGuard {
        self.inner.live_buffers.fetch_add(1, Ordering::Relaxed);
        self.inner.buffer_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.inner.total_allocations.fetch_add(1, Ordering::Relaxed);
        AllocationGuard {
            inner: Arc::clone(&self.inner),
            kind: AllocationKind::Buffer,
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum AllocationKind {
    Texture,
    Buffer,
}

/// Decrements the live counters when the owning resource drops.
#[derive(Debug)]
pub(crate) struct AllocationGuard {
    inner: Arc<MetricsInner>,
    kind: AllocationKind,
    bytes: u64,
}

impl Drop for AllocationGuard {
    fn drop(&mut self) {
        match self.kind {
            AllocationKind::Texture => {
                self.inner.live_textures.fetch_sub(1, Ordering::Relaxed);
                self.inner
                    .texture_bytes
                    .fetch_sub(self.bytes, Ordering::Relaxed);
            }
            AllocationKind::Buffer => {
                self.inner.live_buffers.fetch_sub(1, Ordering::Relaxed);
                self.inner
                    .buffer_bytes
                    .fetch_sub(self.bytes, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_counts_live_resources() {
        let metrics = HeadlessMetrics::new();
        let a = metrics.track_texture(1024);
        let b = metrics.track_texture(2048);
        let c = metrics.track_buffer(64);
        assert_eq!(metrics.live_textures(), 2);
        assert_eq!(metrics.live_buffers(), 1);
        assert_eq!(metrics.texture_bytes(), 3072);
        assert_eq!(metrics.buffer_bytes(), 64);

        drop(a);
        assert_eq!(metrics.live_textures(), 1);
        assert_eq!(metrics.texture_bytes(), 2048);

        drop(b);
        drop(c);
        assert_eq!(metrics.live_textures(), 0);
        assert_eq!(metrics.live_buffers(), 0);
        assert_eq!(metrics.texture_bytes(), 0);
        assert_eq!(metrics.buffer_bytes(), 0);
        assert_eq!(metrics.total_allocations(), 3, "total never decrements");
    }
}
