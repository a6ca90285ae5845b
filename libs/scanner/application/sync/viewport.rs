//! Windowed view over a table's rows
//!
//! Only rows inside the visible window plus `overscan` rows on either side are
//! mounted. Mounted rows hold pair subscriptions; the rest do not.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Index of the first visible row
    pub offset: usize,
    /// Number of visible rows
    pub height: usize,
    pub overscan: usize,
}

impl Viewport {
    pub fn new(height: usize, overscan: usize) -> Self {
        Self {
            offset: 0,
            height,
            overscan,
        }
    }

    /// Rows drawn on screen
    pub fn visible_range(&self, len: usize) -> Range<usize> {
        let start = self.offset.min(len);
        let end = (self.offset + self.height).min(len);
        start..end
    }

    /// Rows that count as mounted (visible plus overscan)
    pub fn mounted_range(&self, len: usize) -> Range<usize> {
        let visible = self.visible_range(len);
        if visible.is_empty() {
            return visible;
        }
        let start = visible.start.saturating_sub(self.overscan);
        let end = (visible.end + self.overscan).min(len);
        start..end
    }

    pub fn max_offset(&self, len: usize) -> usize {
        len.saturating_sub(self.height)
    }

    /// Keep the offset inside `[0, max_offset]`
    pub fn clamp(&mut self, len: usize) {
        self.offset = self.offset.min(self.max_offset(len));
    }

    pub fn set_height(&mut self, height: usize, len: usize) {
        self.height = height;
        self.clamp(len);
    }

    pub fn scroll_by(&mut self, delta: isize, len: usize) {
        let target = if delta.is_negative() {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta as usize)
        };
        self.offset = target.min(self.max_offset(len));
    }

    pub fn page_down(&mut self, len: usize) {
        self.scroll_by(self.height.max(1) as isize, len);
    }

    pub fn page_up(&mut self, len: usize) {
        self.scroll_by(-(self.height.max(1) as isize), len);
    }

    pub fn home(&mut self) {
        self.offset = 0;
    }

    pub fn end(&mut self, len: usize) {
        self.offset = self.max_offset(len);
    }

    /// Scroll the minimum amount needed to show row `index`
    pub fn ensure_visible(&mut self, index: usize, len: usize) {
        if index < self.offset {
            self.offset = index;
        } else if self.height > 0 && index >= self.offset + self.height {
            self.offset = index + 1 - self.height;
        }
        self.clamp(len);
    }

    /// Whether the last visible row is within `threshold` rows of the end
    pub fn near_end(&self, len: usize, threshold: usize) -> bool {
        if len == 0 {
            return false;
        }
        self.visible_range(len).end + threshold >= len
    }
}
