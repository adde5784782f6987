use std::path::{Path, PathBuf};

use crate::GAME_YEAR;

/// The build tool's platform-specific entry point inside a scaffold root.
pub fn wrapper_script() -> &'static str {
    if cfg!(windows) {
        "gradlew.bat"
    } else {
        "gradlew"
    }
}

/// Candidate scaffold roots derived from where the viewer executable is
/// installed, in fixed priority order:
///
/// 1. dev checkout: `battlecode{YY}-scaffold` next to the repository,
/// 2. packaged app with a `resources` level between the binary and root,
/// 3. scaffold/client/<binary> layout,
/// 4. macOS bundle (`scaffold/Matchview.app/Contents/MacOS/<binary>`).
pub fn candidate_roots(exe_path: &Path) -> Vec<PathBuf> {
    let up = |path: &Path, levels: u32| -> Option<PathBuf> {
        let mut current = path.to_path_buf();
        for _ in 0..levels {
            current = current.parent()?.to_path_buf();
        }
        Some(current)
    };
    let mut candidates = Vec::new();
    if let Some(repo_parent) = up(exe_path, 4) {
        candidates.push(repo_parent.join(format!("battlecode{:02}-scaffold", GAME_YEAR % 100)));
    }
    if let Some(path) = up(exe_path, 3) {
        candidates.push(path);
    }
    if let Some(path) = up(exe_path, 2) {
        candidates.push(path);
    }
    if let Some(path) = up(exe_path, 5) {
        candidates.push(path);
    }
    candidates
}

/// First candidate containing the wrapper script. `None` is the normal
/// "needs manual setup" outcome, not an error.
pub fn first_with_wrapper(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|candidate| candidate.join(wrapper_script()).is_file())
        .cloned()
}

/// Resolves the scaffold root for startup: a previously successful cached
/// path wins outright, otherwise the install-relative heuristics run.
pub fn find_default_root(cached: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cached {
        return Some(path.to_path_buf());
    }
    let exe = std::env::current_exe().ok()?;
    first_with_wrapper(&candidate_roots(&exe))
}
