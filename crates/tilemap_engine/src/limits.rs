//! Size and history limits.
//!
//! These limits prevent arithmetic overflow and excessive memory
//! allocation when decoding malformed artifacts.

/// Maximum map width in cells
pub const MAX_MAP_WIDTH: i32 = 1080;

/// Maximum map height in cells
pub const MAX_MAP_HEIGHT: i32 = 1080;

/// Number of addressable ports on a map (4 cardinal edges + 3 interior waypoints)
pub const PORT_COUNT: usize = 7;

/// Maximum number of entries kept on a map's undo stack.
/// Recording past this bound evicts the oldest entry.
pub const UNDO_LIMIT: usize = 30;

/// Check if map dimensions are within safe limits
#[inline]
pub fn is_within_limits(width: i32, height: i32) -> bool {
    (0..=MAX_MAP_WIDTH).contains(&width) && (0..=MAX_MAP_HEIGHT).contains(&height)
}
