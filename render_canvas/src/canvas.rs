use crate::geometry::{BoardDims, TileCoord};

/// Pixels of canvas backing per board tile. Draw calls use tile units; the
/// scale is applied once when the canvas is sized.
pub const TILE_RESOLUTION: u32 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// An RGBA canvas sized to a board, addressed in tile units.
///
/// Pixel row 0 is the top of the image; callers that work in game
/// coordinates (row 0 at the bottom) flip before drawing, the same way the
/// pointer mapping flips on the way in.
pub struct TileCanvas {
    dims: BoardDims,
    pixels: Vec<u8>,
}

impl TileCanvas {
    pub fn new(dims: BoardDims) -> Self {
        let mut canvas = Self {
            dims,
            pixels: Vec::new(),
        };
        canvas.resize(dims);
        canvas
    }

    pub fn dims(&self) -> BoardDims {
        self.dims
    }

    pub fn width_px(&self) -> u32 {
        self.dims.width * TILE_RESOLUTION
    }

    pub fn height_px(&self) -> u32 {
        self.dims.height * TILE_RESOLUTION
    }

    /// Reallocates the backing store for a new board size and clears it.
    pub fn resize(&mut self, dims: BoardDims) {
        self.dims = dims;
        let len = self.width_px() as usize * self.height_px() as usize * 4;
        self.pixels.clear();
        self.pixels.resize(len, 0);
    }

    /// Clears to fully transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = self.pixel_index(x, y);
        Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }

    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width_px() as usize + x as usize) * 4
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width_px() || y >= self.height_px() {
            return;
        }
        let idx = self.pixel_index(x, y);
        if color.a == 255 {
            self.pixels[idx] = color.r;
            self.pixels[idx + 1] = color.g;
            self.pixels[idx + 2] = color.b;
            self.pixels[idx + 3] = 255;
            return;
        }
        if color.a == 0 {
            return;
        }
        // Source-over blend in integer math.
        let sa = color.a as u32;
        let da = self.pixels[idx + 3] as u32;
        let out_a = sa + da * (255 - sa) / 255;
        if out_a == 0 {
            return;
        }
        let blend = |src: u8, dst: u8| -> u8 {
            let s = src as u32 * sa;
            let d = dst as u32 * da * (255 - sa) / 255;
            ((s + d) / out_a) as u8
        };
        self.pixels[idx] = blend(color.r, self.pixels[idx]);
        self.pixels[idx + 1] = blend(color.g, self.pixels[idx + 1]);
        self.pixels[idx + 2] = blend(color.b, self.pixels[idx + 2]);
        self.pixels[idx + 3] = out_a as u8;
    }

    /// Fills a rectangle given in tile units.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let scale = TILE_RESOLUTION as f32;
        let x0 = (x * scale).floor().max(0.0) as u32;
        let y0 = (y * scale).floor().max(0.0) as u32;
        let x1 = ((x + w) * scale).ceil().max(0.0) as u32;
        let y1 = ((y + h) * scale).ceil().max(0.0) as u32;
        for py in y0..y1.min(self.height_px()) {
            for px in x0..x1.min(self.width_px()) {
                self.blend_pixel(px, py, color);
            }
        }
    }

    /// Fills one whole tile. `tile` is in canvas orientation (row 0 at the
    /// top); see the module note on flipping.
    pub fn fill_tile(&mut self, tile: TileCoord, color: Color) {
        self.fill_rect(tile.col as f32, tile.row as f32, 1.0, 1.0, color);
    }

    /// Fills a circle with center and radius in tile units.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let scale = TILE_RESOLUTION as f32;
        let pcx = cx * scale;
        let pcy = cy * scale;
        let pr = radius * scale;
        let x0 = (pcx - pr).floor().max(0.0) as u32;
        let y0 = (pcy - pr).floor().max(0.0) as u32;
        let x1 = ((pcx + pr).ceil().max(0.0) as u32).min(self.width_px());
        let y1 = ((pcy + pr).ceil().max(0.0) as u32).min(self.height_px());
        let r2 = pr * pr;
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - pcx;
                let dy = py as f32 + 0.5 - pcy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }

    /// Strokes a straight segment between two tile-unit points.
    pub fn stroke_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, width: f32, color: Color) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            self.fill_circle(x0, y0, width / 2.0, color);
            return;
        }
        let steps = (len * TILE_RESOLUTION as f32).ceil() as u32;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            self.fill_circle(x0 + dx * t, y0 + dy * t, width / 2.0, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_reallocates_backing_to_board_times_resolution() {
        let mut canvas = TileCanvas::new(BoardDims::new(2, 3));
        assert_eq!(canvas.width_px(), 2 * TILE_RESOLUTION);
        assert_eq!(canvas.height_px(), 3 * TILE_RESOLUTION);
        assert_eq!(
            canvas.as_rgba().len(),
            (2 * TILE_RESOLUTION * 3 * TILE_RESOLUTION * 4) as usize
        );
        canvas.resize(BoardDims::new(1, 1));
        assert_eq!(
            canvas.as_rgba().len(),
            (TILE_RESOLUTION * TILE_RESOLUTION * 4) as usize
        );
    }

    #[test]
    fn fill_tile_paints_only_inside_the_tile() {
        let mut canvas = TileCanvas::new(BoardDims::new(2, 2));
        let red = Color::rgb(255, 0, 0);
        canvas.fill_tile(TileCoord::new(1, 0), red);
        let inside = canvas.pixel(TILE_RESOLUTION + 1, 1);
        let outside = canvas.pixel(1, 1);
        assert_eq!(inside, red);
        assert_eq!(outside.a, 0);
    }

    #[test]
    fn clear_resets_every_pixel_to_transparent() {
        let mut canvas = TileCanvas::new(BoardDims::new(1, 1));
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Color::rgb(1, 2, 3));
        canvas.clear();
        assert!(canvas.as_rgba().iter().all(|&byte| byte == 0));
    }

    #[test]
    fn opaque_fill_overwrites_translucent_blend_accumulates() {
        let mut canvas = TileCanvas::new(BoardDims::new(1, 1));
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Color::rgb(100, 100, 100));
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Color::rgba(200, 0, 0, 128));
        let px = canvas.pixel(5, 5);
        assert_eq!(px.a, 255);
        assert!(px.r > 100, "red should increase, got {}", px.r);
        assert!(px.g < 100, "green should decrease, got {}", px.g);
    }

    #[test]
    fn fill_rect_clamps_to_canvas_bounds() {
        let mut canvas = TileCanvas::new(BoardDims::new(1, 1));
        canvas.fill_rect(-5.0, -5.0, 20.0, 20.0, Color::rgb(9, 9, 9));
        assert_eq!(canvas.pixel(0, 0), Color::rgb(9, 9, 9));
        assert_eq!(
            canvas.pixel(TILE_RESOLUTION - 1, TILE_RESOLUTION - 1),
            Color::rgb(9, 9, 9)
        );
    }
}
