//=========================================================================
// Viewport
//=========================================================================
//
// Letterboxed mapping between window pixels and the fixed logical
// resolution the application reasons in.
//
// ```text
//   window 1280x1000, logical 640x400
//   ┌──────────────────────┐
//   │        (bar)         │  viewport: x=0, y=100, 1280x800
//   │┌────────────────────┐│
//   ││  logical 640x400   ││
//   │└────────────────────┘│
//   │        (bar)         │
//   └──────────────────────┘
// ```
//
//=========================================================================

use serde::{Deserialize, Serialize};

//=== LogicalResolution ===================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicalResolution {
    pub width: u32,
    pub height: u32,
}

impl LogicalResolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for LogicalResolution {
    fn default() -> Self {
        Self::new(640, 400)
    }
}

//=== Viewport ============================================================

/// Region of the window covered by the logical screen, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    logical: LogicalResolution,
}

impl Viewport {
    /// Largest centered, aspect-preserving fit of `logical` in the window.
    ///
    /// Returns `None` when either window or logical size is zero.
    pub fn letterbox(window_width: u32, window_height: u32, logical: LogicalResolution) -> Option<Self> {
        if window_width == 0 || window_height == 0 || logical.width == 0 || logical.height == 0 {
            return None;
        }

        let window_w = window_width as f32;
        let window_h = window_height as f32;
        let logical_w = logical.width as f32;
        let logical_h = logical.height as f32;

        // Wider than logical → bars left/right, otherwise top/bottom
        let wider = u64::from(window_width) * u64::from(logical.height)
            > u64::from(window_height) * u64::from(logical.width);
        let (width, height) = if wider {
            (window_h * logical_w / logical_h, window_h)
        } else {
            (window_w, window_w * logical_h / logical_w)
        };

        Some(Self {
            x: (window_w - width) / 2.0,
            y: (window_h - height) / 2.0,
            width,
            height,
            logical,
        })
    }

    /// Maps a window-space point into logical space.
    ///
    /// Points over the bars map outside `[0, logical)`; callers clamp if needed.
    pub fn to_logical(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.x) / self.width * self.logical.width as f32,
            (y - self.y) / self.height * self.logical.height as f32,
        )
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
