//! Pure extent and dispatch-grid math.
//!
//! Kept free of any device types so the sizing rules used by the lazy
//! allocators can be unit tested directly.

/// Rounds `value` up to the next multiple of `multiple`.
///
/// `multiple` must be non-zero.
#[must_use]
pub fn round_up_to_multiple(value: u32, multiple: u32) -> u32 {
    debug_assert!(multiple > 0, "rounding to a zero multiple");
    value.div_ceil(multiple) * multiple
}

/// Number of workgroups needed to cover a `width` x `height` extent with
/// workgroups of `tile_x` x `tile_y` threads.
#[must_use]
pub fn dispatch_extent(width: u32, height: u32, tile_x: u32, tile_y: u32) -> (u32, u32) {
    debug_assert!(tile_x > 0 && tile_y > 0, "zero-sized workgroup tile");
    (width.div_ceil(tile_x), height.div_ceil(tile_y))
}

/// Whether a lazily allocated target of `(current_width, current_height)`
/// must be recreated to serve a `(required_width, required_height)` frame.
///
/// `current_*` of zero means "never allocated". The predicate is an exact
/// match, not a greater-or-equal test: intermediate targets track the frame
/// size so that shrinking frames release memory instead of oversampling.
#[must_use]
pub fn needs_resize(
    current_width: u32,
    current_height: u32,
    required_width: u32,
    required_height: u32,
) -> bool {
    current_width != required_width || current_height != required_height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_up_to_multiple() {
        assert_eq!(round_up_to_multiple(0, 16), 0);
        assert_eq!(round_up_to_multiple(1, 16), 16);
        assert_eq!(round_up_to_multiple(16, 16), 16);
        assert_eq!(round_up_to_multiple(17, 16), 32);
        assert_eq!(round_up_to_multiple(1080, 64), 1088);
    }

    #[test]
    fn test_dispatch_extent_exact_and_partial_tiles() {
        assert_eq!(dispatch_extent(256, 128, 16, 16), (16, 8));
        assert_eq!(dispatch_extent(17, 1, 16, 16), (2, 1));
        assert_eq!(dispatch_extent(1920, 1080, 8, 8), (240, 135));
        assert_eq!(dispatch_extent(1, 1, 8, 8), (1, 1));
    }

    #[test]
    fn test_needs_resize() {
        assert!(needs_resize(0, 0, 1920, 1080), "unallocated target");
        assert!(needs_resize(1920, 1080, 1280, 720), "shrinking frame");
        assert!(needs_resize(1280, 720, 1920, 1080), "growing frame");
        assert!(!needs_resize(1920, 1080, 1920, 1080), "matching target");
    }
}
