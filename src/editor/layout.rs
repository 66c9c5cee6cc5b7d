use super::document::Document;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Monospace layout: one row per block, fixed cell size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub origin: ScreenPoint,
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            origin: ScreenPoint::new(0.0, 0.0),
            char_width: 8.0,
            line_height: 16.0,
        }
    }
}

impl GridLayout {
    /// Position of the character boundary left of the cell under `point`.
    /// Points right of a row's text map to the row's end.
    pub fn pos_at_coords(&self, doc: &Document, point: ScreenPoint) -> Option<usize> {
        let dx = point.x - self.origin.x;
        let dy = point.y - self.origin.y;
        if !dx.is_finite() || !dy.is_finite() || dx < 0.0 || dy < 0.0 {
            return None;
        }

        let row = (dy / self.line_height).floor() as usize;
        let column = (dx / self.char_width).floor() as usize;
        let block = doc.block(row)?;
        let start = doc.block_start(row)?;
        Some(start + column.min(block.len()))
    }

    pub fn coords_at_pos(&self, doc: &Document, pos: usize) -> Option<ScreenPoint> {
        let resolved = doc.resolve(pos)?;
        Some(ScreenPoint::new(
            self.origin.x + (resolved.parent_offset as f64 + 0.5) * self.char_width,
            self.origin.y + (resolved.block as f64 + 0.5) * self.line_height,
        ))
    }
}
