use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crate::discovery::wrapper_script;
use crate::{map_extension, SERVER_MAPS};

/// Player entry-point filenames recognized in a scaffold source tree.
const PLAYER_STEMS: &[&str] = &["RobotPlayer.java", "RobotPlayer.kt", "RobotPlayer.scala"];

#[derive(Debug)]
pub enum AssetError {
    /// The root has no wrapper script, so it is not a scaffold at all.
    MissingWrapper(PathBuf),
    /// Neither `src` nor the `example-bots/src/main` fallback exists.
    MissingSourceDir(PathBuf),
    Io(std::io::Error),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::MissingWrapper(path) => {
                write!(f, "can't find gradle wrapper: {}", path.display())
            }
            AssetError::MissingSourceDir(path) => {
                write!(f, "can't find source path: {}", path.display())
            }
            AssetError::Io(err) => write!(f, "asset scan failed: {}", err),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Result of the two independent scans. A failure in one leaves the other
/// usable; callers apply whatever succeeded.
pub struct AssetScan {
    pub players: Result<BTreeSet<String>, AssetError>,
    pub maps: Result<BTreeSet<String>, AssetError>,
}

/// Runs the player and map scans concurrently against a scaffold root.
pub fn scan_assets(root: &Path) -> AssetScan {
    let wrapper = root.join(wrapper_script());
    if !wrapper.is_file() {
        return AssetScan {
            players: Err(AssetError::MissingWrapper(wrapper.clone())),
            maps: Err(AssetError::MissingWrapper(wrapper)),
        };
    }
    thread::scope(|scope| {
        let players = scope.spawn(|| scan_players(root));
        let maps = scope.spawn(|| scan_maps(root));
        AssetScan {
            players: players.join().unwrap_or_else(|_| {
                Err(AssetError::Io(std::io::Error::other("player scan panicked")))
            }),
            maps: maps.join().unwrap_or_else(|_| {
                Err(AssetError::Io(std::io::Error::other("map scan panicked")))
            }),
        }
    })
}

/// Walks the scaffold source tree for player entry files and derives their
/// dotted identifiers. `src` is preferred; `example-bots/src/main` is the
/// conventional fallback; both missing is a hard failure.
pub fn scan_players(root: &Path) -> Result<BTreeSet<String>, AssetError> {
    let mut source_dir = root.join("src");
    if !source_dir.is_dir() {
        source_dir = root.join("example-bots").join("src").join("main");
        if !source_dir.is_dir() {
            return Err(AssetError::MissingSourceDir(source_dir));
        }
    }
    let mut files = Vec::new();
    collect_files(&source_dir, &mut files).map_err(AssetError::Io)?;
    let mut players = BTreeSet::new();
    for file in files {
        let rel = file.strip_prefix(&source_dir).unwrap_or(&file);
        if let Some(player) = player_id_from_rel(rel) {
            players.insert(player);
        }
    }
    Ok(players)
}

/// Derives the dotted player identifier from a source-relative path:
/// directory separators become dots and the entry filename is dropped, so
/// `a/b/RobotPlayer.java` is `a.b` and a top-level entry file is the
/// empty-qualified name. Separator convention does not matter.
pub fn player_id_from_rel(rel: &Path) -> Option<String> {
    let file_name = rel.file_name()?.to_str()?;
    if !PLAYER_STEMS.contains(&file_name) {
        return None;
    }
    let mut parts = Vec::new();
    if let Some(parent) = rel.parent() {
        for component in parent.components() {
            let text = component.as_os_str().to_str()?;
            parts.push(text);
        }
    }
    Some(parts.join("."))
}

/// Lists year-stamped map files in the scaffold's maps directory (created
/// if absent) and unions them with the fixed server-provided set.
pub fn scan_maps(root: &Path) -> Result<BTreeSet<String>, AssetError> {
    let maps_dir = root.join("maps");
    if !maps_dir.is_dir() {
        fs::create_dir_all(&maps_dir).map_err(AssetError::Io)?;
    }
    let extension = map_extension();
    let mut maps: BTreeSet<String> = SERVER_MAPS.iter().map(|name| name.to_string()).collect();
    for entry in fs::read_dir(&maps_dir).map_err(AssetError::Io)? {
        let entry = entry.map_err(AssetError::Io)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(stem) = name.strip_suffix(extension.as_str()) {
            maps.insert(stem.to_string());
        }
    }
    Ok(maps)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_scaffold(name: &str) -> PathBuf {
        let unique = format!(
            "matchview-assets-{}-{}-{}",
            name,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock before epoch")
                .as_nanos()
        );
        let dir = std::env::temp_dir().join(unique);
        fs::create_dir_all(&dir).expect("create scaffold dir");
        fs::write(dir.join(wrapper_script()), "#!/bin/sh\n").expect("write wrapper");
        dir
    }

    #[test]
    fn player_id_derivation_matches_the_dotted_convention() {
        let id = player_id_from_rel(Path::new("a/b/RobotPlayer.java"));
        assert_eq!(id.as_deref(), Some("a.b"));
        let top_level = player_id_from_rel(Path::new("RobotPlayer.kt"));
        assert_eq!(top_level.as_deref(), Some(""));
        assert_eq!(player_id_from_rel(Path::new("a/b/Helper.java")), None);
        assert_eq!(player_id_from_rel(Path::new("a/RobotPlayer.py")), None);
    }

    #[test]
    fn player_scan_walks_src_recursively() {
        let root = temp_scaffold("players");
        let src = root.join("src");
        fs::create_dir_all(src.join("examplefuncsplayer")).expect("mkdir");
        fs::create_dir_all(src.join("team").join("alpha")).expect("mkdir");
        fs::write(
            src.join("examplefuncsplayer").join("RobotPlayer.java"),
            "",
        )
        .expect("write");
        fs::write(src.join("team").join("alpha").join("RobotPlayer.kt"), "").expect("write");
        fs::write(src.join("team").join("alpha").join("Util.kt"), "").expect("write");

        let players = scan_players(&root).expect("scan players");
        let expected: BTreeSet<String> = ["examplefuncsplayer", "team.alpha"]
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(players, expected);
        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn player_scan_falls_back_to_example_bots() {
        let root = temp_scaffold("fallback");
        let fallback = root.join("example-bots").join("src").join("main");
        fs::create_dir_all(fallback.join("maxplayer")).expect("mkdir");
        fs::write(fallback.join("maxplayer").join("RobotPlayer.scala"), "").expect("write");

        let players = scan_players(&root).expect("scan players");
        assert!(players.contains("maxplayer"));
        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn missing_source_dir_after_fallback_is_a_hard_error() {
        let root = temp_scaffold("nosrc");
        let err = scan_players(&root).expect_err("must fail");
        assert!(matches!(err, AssetError::MissingSourceDir(_)));
        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn map_scan_unions_disk_maps_with_server_maps() {
        let root = temp_scaffold("maps");
        let maps_dir = root.join("maps");
        fs::create_dir_all(&maps_dir).expect("mkdir");
        let ext = map_extension();
        fs::write(maps_dir.join(format!("Quadrants{}", ext)), "").expect("write");
        // Duplicate of a server map collapses; wrong extension is skipped.
        fs::write(maps_dir.join(format!("DefaultSmall{}", ext)), "").expect("write");
        fs::write(maps_dir.join("NotAMap.txt"), "").expect("write");

        let maps = scan_maps(&root).expect("scan maps");
        assert!(maps.contains("Quadrants"));
        assert!(maps.contains("DefaultSmall"));
        assert!(!maps.iter().any(|name| name.contains("NotAMap")));
        assert_eq!(
            maps.len(),
            SERVER_MAPS.len() + 1,
            "duplicates must collapse"
        );
        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn map_scan_creates_the_maps_directory() {
        let root = temp_scaffold("mkmaps");
        let maps = scan_maps(&root).expect("scan maps");
        assert!(root.join("maps").is_dir());
        assert_eq!(maps.len(), SERVER_MAPS.len());
        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn failing_player_scan_leaves_map_scan_usable() {
        let root = temp_scaffold("partial");
        // No source dir at all; maps dir gets created by the scan.
        let scan = scan_assets(&root);
        assert!(scan.players.is_err());
        let maps = scan.maps.expect("map scan succeeds");
        assert_eq!(maps.len(), SERVER_MAPS.len());
        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn non_scaffold_root_fails_both_scans() {
        let unique = format!("matchview-assets-nowrapper-{}", std::process::id());
        let root = std::env::temp_dir().join(unique);
        fs::create_dir_all(&root).expect("mkdir");
        let scan = scan_assets(&root);
        assert!(matches!(scan.players, Err(AssetError::MissingWrapper(_))));
        assert!(matches!(scan.maps, Err(AssetError::MissingWrapper(_))));
        fs::remove_dir_all(&root).expect("cleanup");
    }
}
