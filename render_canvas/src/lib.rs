#![forbid(unsafe_code)]

//! CPU tile canvases and the layered scene renderer for the match viewer.
//!
//! Everything here draws in tile-unit coordinates; the per-tile pixel
//! backing scale is applied once when a canvas is sized to a board.

mod canvas;
mod geometry;
mod scene;
mod snapshot;

pub use canvas::{Color, TileCanvas, TILE_RESOLUTION};
pub use geometry::{BoardDims, TileCoord};
pub use scene::{Layer, SceneRenderer, SceneSource};
pub use snapshot::{write_png, SnapshotError};

/// Anything the scene renderer can paint onto a layer.
///
/// The renderer depends only on this capability, never on the concrete
/// map/body/action types behind it.
pub trait Drawable {
    fn draw(&self, canvas: &mut TileCanvas);
}
