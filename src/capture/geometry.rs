//! Window rectangle geometry and the maximized-window border correction.

use serde::{Deserialize, Serialize};

/// A rectangle in screen coordinates, stored as its four edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Horizontal extent, saturating at the `i32` range.
    pub const fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub const fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// A rect with no area (zero or negative extent on either axis).
    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Smallest rect containing both `self` and `other`.
    ///
    /// Empty rects contribute nothing to the union; the union of two empty
    /// rects is the zero rect.
    pub fn union(&self, other: &Rect) -> Rect {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => Rect::default(),
            (true, false) => *other,
            (false, true) => *self,
            (false, false) => Rect {
                left: self.left.min(other.left),
                top: self.top.min(other.top),
                right: self.right.max(other.right),
                bottom: self.bottom.max(other.bottom),
            },
        }
    }
}

/// Coarse generation of the desktop compositor.
///
/// Maximized windows report a rect that overhangs the visible screen by an
/// invisible resize border, and the overhang differs between generations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositorTier {
    /// Vista and later.
    Modern,
    /// XP and earlier.
    Legacy,
}

/// Signed adjustments applied to each edge of a maximized window's rect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeDeltas {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Per-tier edge adjustments for a maximized window.
///
/// These are observed OS values, not a formula. The legacy row moves the
/// horizontal edges outward and the vertical edges inward; keep it that way.
pub const fn maximized_deltas(tier: CompositorTier) -> EdgeDeltas {
    match tier {
        CompositorTier::Modern => EdgeDeltas {
            left: 8,
            top: 8,
            right: -8,
            bottom: -8,
        },
        CompositorTier::Legacy => EdgeDeltas {
            left: -4,
            top: 4,
            right: 4,
            bottom: -4,
        },
    }
}

/// Computes the rect that should actually be captured for a window.
///
/// Restored windows are returned unchanged. Maximized windows have the
/// invisible border trimmed according to [`maximized_deltas`]. A result with
/// no area collapses to a 1x1 rect at its top-left corner.
pub fn correct(window_rect: Rect, is_maximized: bool, tier: CompositorTier) -> Rect {
    if !is_maximized {
        return window_rect;
    }

    let d = maximized_deltas(tier);
    let mut rect = Rect {
        left: window_rect.left.saturating_add(d.left),
        top: window_rect.top.saturating_add(d.top),
        right: window_rect.right.saturating_add(d.right),
        bottom: window_rect.bottom.saturating_add(d.bottom),
    };

    if rect.width() <= 0 {
        rect.right = rect.left.saturating_add(1);
    }
    if rect.height() <= 0 {
        rect.bottom = rect.top.saturating_add(1);
    }

    rect
}
