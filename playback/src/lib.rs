#![forbid(unsafe_code)]

//! The viewer's inbound game-state seam.
//!
//! Turn-log parsing happens upstream; the viewer consumes pre-built match
//! data through these traits and never touches concrete game types.

mod replay;

pub use replay::{ReplayAction, ReplayBody, ReplayMatch, ReplayTurn, StaticMap, Team};

use render_canvas::{BoardDims, Drawable, SceneSource, TileCanvas, TileCoord};

/// A located game entity summary, enough for the hover tooltip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BodyInfo {
    pub id: u32,
    pub summary: String,
}

/// The dynamic body set of one turn: drawable as a whole, queryable by tile.
///
/// `body_at` takes game coordinates (row 0 at the bottom).
pub trait BodyGroup: Drawable {
    fn body_at(&self, tile: TileCoord) -> Option<BodyInfo>;
}

/// One discrete simulation step's full state.
pub trait TurnView {
    fn dims(&self) -> BoardDims;
    fn turn_number(&self) -> u32;
    fn static_map(&self) -> &dyn Drawable;
    fn map_overlay(&self) -> &dyn Drawable;
    fn bodies(&self) -> &dyn BodyGroup;
    fn actions(&self) -> &dyn Drawable;
}

/// An active match: the current turn plus a step-forward operation.
pub trait MatchView {
    /// Stable identity used by the scene renderer to detect match changes.
    fn key(&self) -> u64;
    fn turn_count(&self) -> u32;
    fn current_turn(&self) -> &dyn TurnView;
    fn step_turn(&mut self, delta: i32);
}

/// Adapts a match to the renderer's `SceneSource` without the renderer ever
/// depending on these traits.
pub struct MatchScene<'a, M: MatchView + ?Sized>(pub &'a M);

impl<'a, M: MatchView + ?Sized> SceneSource for MatchScene<'a, M> {
    fn match_key(&self) -> u64 {
        self.0.key()
    }

    fn dims(&self) -> BoardDims {
        self.0.current_turn().dims()
    }

    fn draw_background(&self, canvas: &mut TileCanvas) {
        self.0.current_turn().static_map().draw(canvas);
    }

    fn draw_dynamic(&self, canvas: &mut TileCanvas) {
        let turn = self.0.current_turn();
        turn.map_overlay().draw(canvas);
        turn.bodies().draw(canvas);
        turn.actions().draw(canvas);
    }
}
