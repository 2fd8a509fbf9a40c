//! Winner resolution
//!
//! Pure functions of a final rotation and the item sequence, usable outside a
//! live session for replays and tests.

use super::segment::segment_index_at;

/// Index of the item under the pointer (probe angle 0)
#[inline]
pub fn resolve_index(final_rotation: f64, item_count: usize) -> usize {
    segment_index_at(final_rotation, item_count, 0.0)
}

/// Item under the pointer, or None for an empty slice
pub fn resolve<T>(final_rotation: f64, items: &[T]) -> Option<&T> {
    items.get(resolve_index(final_rotation, items.len()))
}
