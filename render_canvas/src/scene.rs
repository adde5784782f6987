use crate::canvas::TileCanvas;
use crate::geometry::BoardDims;

/// The three logical render targets.
///
/// Background holds static terrain and is repainted only when the active
/// match changes. Dynamic holds bodies and action effects and is repainted
/// on every render request. Overlay is the interaction surface: it is
/// hit-tested by the pointer mapping and never painted here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Background,
    Dynamic,
    Overlay,
}

/// What the scene renderer needs from the active match.
///
/// `match_key` is a stable identity used to detect that the viewer switched
/// to a different match (or board) and the background must be rebuilt.
pub trait SceneSource {
    fn match_key(&self) -> u64;
    fn dims(&self) -> BoardDims;
    fn draw_background(&self, canvas: &mut TileCanvas);
    fn draw_dynamic(&self, canvas: &mut TileCanvas);
}

/// Event-driven repaint of the layered canvases.
///
/// Callers invoke [`SceneRenderer::render`] in response to render-request
/// events; there is no internal timer.
pub struct SceneRenderer {
    background: TileCanvas,
    dynamic: TileCanvas,
    last_match: Option<u64>,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRenderer {
    pub fn new() -> Self {
        let dims = BoardDims::new(0, 0);
        Self {
            background: TileCanvas::new(dims),
            dynamic: TileCanvas::new(dims),
            last_match: None,
        }
    }

    pub fn background(&self) -> &TileCanvas {
        &self.background
    }

    pub fn dynamic(&self) -> &TileCanvas {
        &self.dynamic
    }

    pub fn dims(&self) -> BoardDims {
        self.dynamic.dims()
    }

    /// Pixel storage for a layer. The overlay is hit-tested by the pointer
    /// mapping and has no pixels here.
    pub fn layer(&self, layer: Layer) -> Option<&TileCanvas> {
        match layer {
            Layer::Background => Some(&self.background),
            Layer::Dynamic => Some(&self.dynamic),
            Layer::Overlay => None,
        }
    }

    /// True when the last render rebuilt the background (match or board
    /// size changed), which means GPU-side copies of both layers are stale.
    pub fn render(&mut self, source: &dyn SceneSource) -> bool {
        let dims = source.dims();
        let key = source.match_key();
        let match_changed =
            self.last_match != Some(key) || self.background.dims() != dims;
        if match_changed {
            self.background.resize(dims);
            self.dynamic.resize(dims);
            source.draw_background(&mut self.background);
            self.last_match = Some(key);
        }
        self.dynamic.clear();
        source.draw_dynamic(&mut self.dynamic);
        match_changed
    }

    /// Drops the remembered match identity so the next render rebuilds the
    /// background even for the same match.
    pub fn invalidate(&mut self) {
        self.last_match = None;
    }
}
