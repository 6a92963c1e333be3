//! Board-to-canvas layout
//!
//! The same layout drives drawing and pointer hit testing, so the two can
//! never disagree about where a cell is.

use glam::Vec2;

use crate::board::GridCoord;

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Square tiles, as large as fit, centered in the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub board_width: usize,
    pub board_height: usize,
    pub tile_size: f32,
    pub start_x: f32,
    pub start_y: f32,
}

impl GridLayout {
    /// Recomputed every frame: the container can change size without a resize event
    pub fn compute(canvas: (f32, f32), board: (usize, usize)) -> Self {
        let (canvas_width, canvas_height) = canvas;
        let (board_width, board_height) = board;
        if board_width == 0 || board_height == 0 || canvas_width <= 0.0 || canvas_height <= 0.0 {
            return Self {
                canvas_width,
                canvas_height,
                board_width,
                board_height,
                tile_size: 0.0,
                start_x: 0.0,
                start_y: 0.0,
            };
        }

        let tile_size =
            (canvas_width / board_width as f32).min(canvas_height / board_height as f32);
        let start_x = (canvas_width - tile_size * board_width as f32) / 2.0;
        let start_y = (canvas_height - tile_size * board_height as f32) / 2.0;

        Self {
            canvas_width,
            canvas_height,
            board_width,
            board_height,
            tile_size,
            start_x,
            start_y,
        }
    }

    pub fn is_drawable(&self) -> bool {
        self.tile_size > 0.0
    }

    pub fn resolution(&self) -> Vec2 {
        Vec2::new(self.canvas_width, self.canvas_height)
    }

    /// Top-left pixel of a (possibly fractional) grid position
    pub fn cell_origin(&self, pos: Vec2) -> Vec2 {
        Vec2::new(self.start_x, self.start_y) + pos * self.tile_size
    }

    pub fn cell_rect(&self, pos: Vec2) -> Rect {
        let origin = self.cell_origin(pos);
        Rect {
            x: origin.x,
            y: origin.y,
            w: self.tile_size,
            h: self.tile_size,
        }
    }

    /// Board cell under a canvas pixel, if any
    pub fn cell_at(&self, px: f32, py: f32) -> Option<GridCoord> {
        if !self.is_drawable() {
            return None;
        }
        let gx = ((px - self.start_x) / self.tile_size).floor();
        let gy = ((py - self.start_y) / self.tile_size).floor();
        if gx < 0.0 || gy < 0.0 || gx >= self.board_width as f32 || gy >= self.board_height as f32
        {
            return None;
        }
        Some(GridCoord::new(gx as i32, gy as i32))
    }
}
