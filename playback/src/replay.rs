use std::sync::Arc;

use crate::{BodyGroup, BodyInfo, MatchView, TurnView};
use render_canvas::{BoardDims, Color, Drawable, TileCanvas, TileCoord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Team {
    A,
    B,
}

impl Team {
    fn color(self) -> Color {
        match self {
            Team::A => Color::rgb(214, 72, 72),
            Team::B => Color::rgb(64, 96, 216),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Team::A => "Team A",
            Team::B => "Team B",
        }
    }
}

const FLOOR: Color = Color::rgb(212, 200, 168);
const WALL: Color = Color::rgb(84, 78, 66);

/// Static terrain, shared by every turn of a match and drawn once per match
/// onto the background layer.
pub struct StaticMap {
    dims: BoardDims,
    walls: Vec<bool>,
}

impl StaticMap {
    /// `walls` is row-major in game coordinates (row 0 at the bottom).
    pub fn new(dims: BoardDims, walls: Vec<bool>) -> Self {
        debug_assert_eq!(walls.len(), dims.tile_count());
        Self { dims, walls }
    }

    pub fn dims(&self) -> BoardDims {
        self.dims
    }

    fn is_wall(&self, tile: TileCoord) -> bool {
        self.walls[tile.row as usize * self.dims.width as usize + tile.col as usize]
    }
}

impl Drawable for StaticMap {
    fn draw(&self, canvas: &mut TileCanvas) {
        for row in 0..self.dims.height {
            for col in 0..self.dims.width {
                let tile = TileCoord::new(col, row);
                let color = if self.is_wall(tile) { WALL } else { FLOOR };
                let canvas_tile = TileCoord::new(col, self.dims.height - 1 - row);
                canvas.fill_tile(canvas_tile, color);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReplayBody {
    pub id: u32,
    pub tile: TileCoord,
    pub team: Team,
    pub health: u32,
}

struct Bodies {
    dims: BoardDims,
    bodies: Vec<ReplayBody>,
}

impl Drawable for Bodies {
    fn draw(&self, canvas: &mut TileCanvas) {
        for body in &self.bodies {
            let cx = body.tile.col as f32 + 0.5;
            let cy = (self.dims.height - 1 - body.tile.row) as f32 + 0.5;
            canvas.fill_circle(cx, cy, 0.4, body.team.color());
        }
    }
}

impl BodyGroup for Bodies {
    fn body_at(&self, tile: TileCoord) -> Option<BodyInfo> {
        self.bodies
            .iter()
            .find(|body| body.tile == tile)
            .map(|body| BodyInfo {
                id: body.id,
                summary: format!("#{} {} | hp {}", body.id, body.team.label(), body.health),
            })
    }
}

#[derive(Clone, Debug)]
pub struct ReplayAction {
    pub from: TileCoord,
    pub to: TileCoord,
}

struct Actions {
    dims: BoardDims,
    actions: Vec<ReplayAction>,
}

impl Drawable for Actions {
    fn draw(&self, canvas: &mut TileCanvas) {
        let flip = |tile: TileCoord| {
            (
                tile.col as f32 + 0.5,
                (self.dims.height - 1 - tile.row) as f32 + 0.5,
            )
        };
        for action in &self.actions {
            let (x0, y0) = flip(action.from);
            let (x1, y1) = flip(action.to);
            canvas.stroke_line(x0, y0, x1, y1, 0.12, Color::rgba(255, 220, 64, 200));
        }
    }
}

/// Per-turn map overlay (clouds, ruins and the like), translucent over the
/// static terrain.
struct Overlay {
    dims: BoardDims,
    tiles: Vec<TileCoord>,
}

impl Drawable for Overlay {
    fn draw(&self, canvas: &mut TileCanvas) {
        for tile in &self.tiles {
            let canvas_tile = TileCoord::new(tile.col, self.dims.height - 1 - tile.row);
            canvas.fill_tile(canvas_tile, Color::rgba(120, 160, 120, 90));
        }
    }
}

pub struct ReplayTurn {
    number: u32,
    map: Arc<StaticMap>,
    overlay: Overlay,
    bodies: Bodies,
    actions: Actions,
}

impl ReplayTurn {
    pub fn new(
        map: Arc<StaticMap>,
        number: u32,
        overlay_tiles: Vec<TileCoord>,
        bodies: Vec<ReplayBody>,
        actions: Vec<ReplayAction>,
    ) -> Self {
        let dims = map.dims();
        Self {
            number,
            map,
            overlay: Overlay {
                dims,
                tiles: overlay_tiles,
            },
            bodies: Bodies { dims, bodies },
            actions: Actions { dims, actions },
        }
    }
}

impl TurnView for ReplayTurn {
    fn dims(&self) -> BoardDims {
        self.map.dims()
    }

    fn turn_number(&self) -> u32 {
        self.number
    }

    fn static_map(&self) -> &dyn Drawable {
        self.map.as_ref()
    }

    fn map_overlay(&self) -> &dyn Drawable {
        &self.overlay
    }

    fn bodies(&self) -> &dyn BodyGroup {
        &self.bodies
    }

    fn actions(&self) -> &dyn Drawable {
        &self.actions
    }
}

/// An in-memory match: a static map plus a list of prebuilt turns.
pub struct ReplayMatch {
    key: u64,
    map: Arc<StaticMap>,
    turns: Vec<ReplayTurn>,
    current: usize,
}

impl ReplayMatch {
    /// Panics if `turns` is empty; a match always has at least one turn.
    pub fn new(key: u64, map: Arc<StaticMap>, turns: Vec<ReplayTurn>) -> Self {
        assert!(!turns.is_empty(), "a match needs at least one turn");
        Self {
            key,
            map,
            turns,
            current: 0,
        }
    }

    pub fn map(&self) -> &StaticMap {
        &self.map
    }

    /// A small deterministic match for the GUI demo and tests: two squads
    /// sweeping toward each other across a walled board.
    pub fn demo(key: u64) -> Self {
        let dims = BoardDims::new(32, 32);
        let mut walls = vec![false; dims.tile_count()];
        for col in 0..dims.width {
            walls[col as usize] = true;
            walls[(dims.height - 1) as usize * dims.width as usize + col as usize] = true;
        }
        for row in 0..dims.height {
            walls[row as usize * dims.width as usize] = true;
            walls[row as usize * dims.width as usize + (dims.width - 1) as usize] = true;
        }
        let map = Arc::new(StaticMap::new(dims, walls));

        let turn_count = 60u32;
        let mut turns = Vec::with_capacity(turn_count as usize);
        for number in 0..turn_count {
            let mut bodies = Vec::new();
            let mut actions = Vec::new();
            for unit in 0..4u32 {
                let row = 4 + unit * 7;
                let a_col = (2 + number / 2).min(dims.width - 3);
                let b_col = dims.width - 3 - (number / 2).min(dims.width - 5);
                bodies.push(ReplayBody {
                    id: unit + 1,
                    tile: TileCoord::new(a_col, row),
                    team: Team::A,
                    health: 100 - number.min(99),
                });
                bodies.push(ReplayBody {
                    id: unit + 101,
                    tile: TileCoord::new(b_col, row),
                    team: Team::B,
                    health: 100 - number.min(99),
                });
                if b_col.saturating_sub(a_col) < 8 {
                    actions.push(ReplayAction {
                        from: TileCoord::new(a_col, row),
                        to: TileCoord::new(b_col, row),
                    });
                }
            }
            let overlay_tiles = (0..dims.width)
                .step_by(9)
                .map(|col| TileCoord::new(col.max(1), (number % (dims.height - 2)) + 1))
                .collect();
            turns.push(ReplayTurn::new(
                Arc::clone(&map),
                number,
                overlay_tiles,
                bodies,
                actions,
            ));
        }
        Self::new(key, map, turns)
    }
}

impl MatchView for ReplayMatch {
    fn key(&self) -> u64 {
        self.key
    }

    fn turn_count(&self) -> u32 {
        self.turns.len() as u32
    }

    fn current_turn(&self) -> &dyn TurnView {
        &self.turns[self.current]
    }

    fn step_turn(&mut self, delta: i32) {
        let last = self.turns.len() as i64 - 1;
        let next = (self.current as i64 + delta as i64).clamp(0, last);
        self.current = next as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchScene;
    use render_canvas::SceneRenderer;

    #[test]
    fn step_turn_clamps_at_both_ends() {
        let mut replay = ReplayMatch::demo(1);
        replay.step_turn(-5);
        assert_eq!(replay.current_turn().turn_number(), 0);
        replay.step_turn(3);
        assert_eq!(replay.current_turn().turn_number(), 3);
        replay.step_turn(10_000);
        assert_eq!(replay.current_turn().turn_number(), replay.turn_count() - 1);
    }

    #[test]
    fn body_lookup_uses_game_coordinates() {
        let replay = ReplayMatch::demo(2);
        let turn = replay.current_turn();
        let found = turn.bodies().body_at(TileCoord::new(2, 4));
        let info = found.expect("demo places unit 1 at (2, 4) on turn 0");
        assert_eq!(info.id, 1);
        assert!(info.summary.contains("Team A"));
        assert!(turn.bodies().body_at(TileCoord::new(15, 15)).is_none());
    }

    #[test]
    fn replay_renders_through_the_scene_renderer() {
        let replay = ReplayMatch::demo(3);
        let mut scene = SceneRenderer::new();
        assert!(scene.render(&MatchScene(&replay)));
        assert_eq!(scene.dims(), BoardDims::new(32, 32));
        // Border wall occupies the canvas's top-left corner.
        assert_eq!(scene.background().pixel(5, 5), WALL);
    }
}
