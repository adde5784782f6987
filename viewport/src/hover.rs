use playback::{BodyGroup, BodyInfo};
use render_canvas::{BoardDims, TileCoord};

use crate::mapping::{DisplayRect, TileMapper};

/// The hovered tile's rectangle in wrapper-local coordinates, used to place
/// the outline and the info popup next to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileAnchor {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl TileAnchor {
    /// Where the popup itself goes: inset past the tile's lower-right
    /// corner so it does not cover the hovered body.
    pub fn popup_origin(&self) -> (f32, f32) {
        (self.left + self.width * 0.75, self.top + self.height * 0.75)
    }
}

/// One evaluation of the pointer against the canvas: the hovered game tile,
/// its on-screen anchor, and whether the pointer is over the canvas at all.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverQuery {
    pub tile: TileCoord,
    pub anchor: TileAnchor,
    pub visible: bool,
}

impl HoverQuery {
    /// `wrapper_origin` is the top-left of the element the popup is
    /// positioned within; anchors come back relative to it.
    pub fn compute(
        mouse: (f32, f32),
        canvas_rect: DisplayRect,
        wrapper_origin: (f32, f32),
        dims: BoardDims,
    ) -> Self {
        let mapper = TileMapper::new(dims);
        let tile = mapper.tile_at(mouse.0, mouse.1, canvas_rect);
        let tile_w = if dims.width > 0 {
            canvas_rect.width / dims.width as f32
        } else {
            0.0
        };
        let tile_h = if dims.height > 0 {
            canvas_rect.height / dims.height as f32
        } else {
            0.0
        };
        // Anchor uses canvas orientation: row 0 of the board sits at the
        // bottom of the displayed rectangle.
        let screen_row = dims.height.saturating_sub(1).saturating_sub(tile.row);
        let anchor = TileAnchor {
            left: canvas_rect.left - wrapper_origin.0 + tile.col as f32 * tile_w,
            top: canvas_rect.top - wrapper_origin.1 + screen_row as f32 * tile_h,
            width: tile_w,
            height: tile_h,
        };
        Self {
            tile,
            anchor,
            visible: canvas_rect.contains(mouse.0, mouse.1),
        }
    }

    pub fn hovered_body(&self, bodies: &dyn BodyGroup) -> Option<BodyInfo> {
        if !self.visible {
            return None;
        }
        bodies.body_at(self.tile)
    }
}

/// Click-to-pin: a clicked body's panel stays open until cleared.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
    clicked: Option<BodyInfo>,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clicked(&self) -> Option<&BodyInfo> {
        self.clicked.as_ref()
    }

    /// Clicking a body pins it; clicking empty ground clears the pin.
    pub fn on_click(&mut self, hovered: Option<BodyInfo>) {
        self.clicked = hovered;
    }

    pub fn clear(&mut self) {
        self.clicked = None;
    }
}
