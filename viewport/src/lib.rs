#![forbid(unsafe_code)]

//! Pointer-to-tile translation for the interaction canvas.
//!
//! Screen Y grows downward, game Y grows upward; every mapping here flips
//! and clamps so callers only ever see in-bounds game coordinates.

mod hover;
mod mapping;

pub use hover::{HoverQuery, HoverState, TileAnchor};
pub use mapping::{ContextEdge, ContextToggle, DisplayRect, DragTracker, TileMapper};
