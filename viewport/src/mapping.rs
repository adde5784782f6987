use render_canvas::{BoardDims, TileCoord};

/// Where the canvas actually sits on screen, in logical pixels. The backing
/// resolution may differ from this displayed size; the mapping only needs
/// the displayed rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left
            && x <= self.left + self.width
            && y >= self.top
            && y <= self.top + self.height
    }
}

/// Converts pointer positions over the displayed canvas into clamped,
/// Y-flipped game tile coordinates.
#[derive(Clone, Copy, Debug)]
pub struct TileMapper {
    dims: BoardDims,
}

impl TileMapper {
    pub fn new(dims: BoardDims) -> Self {
        Self { dims }
    }

    pub fn dims(&self) -> BoardDims {
        self.dims
    }

    /// Positions outside the rectangle still produce an in-bounds tile.
    pub fn tile_at(&self, x: f32, y: f32, rect: DisplayRect) -> TileCoord {
        let col = if rect.width > 0.0 {
            ((x - rect.left) / rect.width * self.dims.width as f32).floor()
        } else {
            0.0
        };
        let row = if rect.height > 0.0 {
            ((1.0 - (y - rect.top) / rect.height) * self.dims.height as f32).floor()
        } else {
            0.0
        };
        TileCoord::new(
            clamp_axis(col, self.dims.width),
            clamp_axis(row, self.dims.height),
        )
    }
}

fn clamp_axis(value: f32, extent: u32) -> u32 {
    if extent == 0 {
        return 0;
    }
    let max = (extent - 1) as f32;
    value.clamp(0.0, max) as u32
}

/// Suppresses duplicate drag notifications while the pointer stays inside
/// one tile.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragTracker {
    mouse_down: bool,
    last_fired: Option<TileCoord>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.mouse_down
    }

    pub fn press(&mut self) {
        self.mouse_down = true;
        self.last_fired = None;
    }

    pub fn release(&mut self) {
        self.mouse_down = false;
        self.last_fired = None;
    }

    /// Returns the tile to notify for, or None when the pointer is up or
    /// has not crossed a tile boundary since the last notification.
    pub fn motion(&mut self, tile: TileCoord) -> Option<TileCoord> {
        if !self.mouse_down || self.last_fired == Some(tile) {
            return None;
        }
        self.last_fired = Some(tile);
        Some(tile)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextEdge {
    Pressed,
    Released,
}

/// Edge detector for the right mouse button. The native context menu is
/// suppressed on the canvases, so press/release transitions are reported
/// as their own notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContextToggle {
    down: bool,
}

impl ContextToggle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, down: bool) -> Option<ContextEdge> {
        if down == self.down {
            return None;
        }
        self.down = down;
        Some(if down {
            ContextEdge::Pressed
        } else {
            ContextEdge::Released
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> TileMapper {
        TileMapper::new(BoardDims::new(10, 8))
    }

    fn rect() -> DisplayRect {
        DisplayRect::new(100.0, 50.0, 400.0, 320.0)
    }

    #[test]
    fn visual_top_maps_to_highest_game_row() {
        let tile = mapper().tile_at(100.0, 50.0, rect());
        assert_eq!(tile.row, 7);
    }

    #[test]
    fn visual_bottom_maps_to_row_zero() {
        let tile = mapper().tile_at(100.0, 50.0 + 319.9, rect());
        assert_eq!(tile.row, 0);
    }

    #[test]
    fn positions_outside_the_rect_clamp_into_the_board() {
        let far = mapper().tile_at(-5000.0, 9000.0, rect());
        assert_eq!(far, TileCoord::new(0, 0));
        let far = mapper().tile_at(9000.0, -5000.0, rect());
        assert_eq!(far, TileCoord::new(9, 7));
    }

    #[test]
    fn columns_partition_the_display_width_evenly() {
        let m = mapper();
        let r = rect();
        // 400px over 10 columns: 40px per column.
        assert_eq!(m.tile_at(100.0 + 39.0, 200.0, r).col, 0);
        assert_eq!(m.tile_at(100.0 + 40.0, 200.0, r).col, 1);
        assert_eq!(m.tile_at(100.0 + 399.0, 200.0, r).col, 9);
    }

    #[test]
    fn degenerate_display_rect_yields_origin_tile() {
        let tile = mapper().tile_at(10.0, 10.0, DisplayRect::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(tile.col, 0);
    }

    #[test]
    fn drag_fires_once_per_tile() {
        let mut drag = DragTracker::new();
        drag.press();
        let a = TileCoord::new(3, 3);
        let b = TileCoord::new(3, 4);
        assert_eq!(drag.motion(a), Some(a));
        assert_eq!(drag.motion(a), None);
        assert_eq!(drag.motion(b), Some(b));
        assert_eq!(drag.motion(b), None);
    }

    #[test]
    fn drag_does_not_fire_while_pointer_is_up() {
        let mut drag = DragTracker::new();
        assert_eq!(drag.motion(TileCoord::new(1, 1)), None);
        drag.press();
        drag.release();
        assert_eq!(drag.motion(TileCoord::new(1, 1)), None);
    }

    #[test]
    fn new_press_refires_even_in_the_same_tile() {
        let mut drag = DragTracker::new();
        let tile = TileCoord::new(2, 2);
        drag.press();
        assert_eq!(drag.motion(tile), Some(tile));
        drag.release();
        drag.press();
        assert_eq!(drag.motion(tile), Some(tile));
    }

    #[test]
    fn context_toggle_reports_each_edge_once() {
        let mut toggle = ContextToggle::new();
        assert_eq!(toggle.observe(false), None);
        assert_eq!(toggle.observe(true), Some(ContextEdge::Pressed));
        assert_eq!(toggle.observe(true), None);
        assert_eq!(toggle.observe(false), Some(ContextEdge::Released));
        assert_eq!(toggle.observe(false), None);
    }
}
