#![forbid(unsafe_code)]

//! Integration with the Battlecode build scaffold: finding it on disk,
//! enumerating players/maps/JVMs, and running matches as child processes
//! with their output streamed into a bounded console.

pub mod assets;
pub mod config;
pub mod console;
pub mod controller;
pub mod discovery;
pub mod dispatch;
pub mod java;
pub mod logging;

pub use assets::{scan_assets, AssetError, AssetScan};
pub use config::ViewerConfig;
pub use console::{ConsoleKind, ConsoleLine, ConsoleLog, CONSOLE_CAPACITY};
pub use controller::Scaffold;
pub use discovery::{candidate_roots, find_default_root, first_with_wrapper, wrapper_script};
pub use dispatch::{DispatchError, MatchDispatcher, MatchSettings, ProcessEvent, ProcessId};
pub use java::JavaInstall;

/// Competition year; maps and the scaffold directory name are year-stamped.
pub const GAME_YEAR: u32 = 2025;

/// Extension of on-disk map files for the current year, e.g. `.map25`.
pub fn map_extension() -> String {
    format!(".map{:02}", GAME_YEAR % 100)
}

/// Maps the tournament server always provides, unioned with whatever is on
/// disk in the scaffold's maps directory.
pub const SERVER_MAPS: &[&str] = &[
    "DefaultSmall",
    "DefaultMedium",
    "DefaultLarge",
    "DefaultHuge",
];
