use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::assets::{scan_assets, AssetScan};
use crate::config::ViewerConfig;
use crate::console::{ConsoleLine, ConsoleLog};
use crate::discovery::find_default_root;
use crate::dispatch::{DispatchError, MatchDispatcher, MatchSettings, ProcessEvent, ProcessId};
use crate::java::{detect_java_installs, JavaInstall};
use crate::logging;

/// What a background enumeration produced. Tagged with the root it ran
/// against so a stale result for an abandoned root is thrown away.
struct ReloadOutcome {
    root: PathBuf,
    scan: AssetScan,
    javas: Vec<JavaInstall>,
}

/// Viewer-side handle to the build scaffold: the discovered root, the
/// enumerated players/maps/JVMs, the match console, and the one live
/// match process.
pub struct Scaffold {
    root: Option<PathBuf>,
    players: Vec<String>,
    maps: Vec<String>,
    javas: Vec<JavaInstall>,
    loading: bool,
    console: ConsoleLog,
    dispatcher: MatchDispatcher,
    current_pid: Option<ProcessId>,
    reload_tx: Sender<ReloadOutcome>,
    reload_rx: Receiver<ReloadOutcome>,
}

impl Scaffold {
    /// Resolves the root from the remembered config path or the install
    /// heuristics and kicks off the first enumeration if one was found.
    pub fn new(config: &ViewerConfig) -> Self {
        let cached = config.scaffold_root_path();
        let (reload_tx, reload_rx) = std::sync::mpsc::channel();
        let mut scaffold = Self {
            root: None,
            players: Vec::new(),
            maps: Vec::new(),
            javas: Vec::new(),
            loading: false,
            console: ConsoleLog::default(),
            dispatcher: MatchDispatcher::new(),
            current_pid: None,
            reload_tx,
            reload_rx,
        };
        if let Some(root) = find_default_root(cached.as_deref()) {
            scaffold.set_root(root);
        }
        scaffold
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn maps(&self) -> &[String] {
        &self.maps
    }

    pub fn javas(&self) -> &[JavaInstall] {
        &self.javas
    }

    /// True while a background enumeration is outstanding.
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    pub fn match_running(&self) -> bool {
        self.current_pid.is_some()
    }

    /// Points the scaffold at a new root and re-enumerates it. The root is
    /// only persisted once a player scan against it succeeds.
    pub fn set_root(&mut self, root: PathBuf) {
        self.root = Some(root);
        self.reload();
    }

    /// Re-runs player/map/JVM enumeration in the background; the result is
    /// picked up by `poll`.
    pub fn reload(&mut self) {
        let Some(root) = self.root.clone() else {
            return;
        };
        self.loading = true;
        let sender = self.reload_tx.clone();
        thread::spawn(move || {
            let outcome = ReloadOutcome {
                scan: scan_assets(&root),
                javas: detect_java_installs(),
                root,
            };
            let _ = sender.send(outcome);
        });
    }

    /// Applies finished enumerations and match process events. Call once
    /// per frame.
    pub fn poll(&mut self, config: &mut ViewerConfig) {
        // Several overlapping reloads resolve last-write-wins.
        while let Ok(outcome) = self.reload_rx.try_recv() {
            if self.root.as_deref() != Some(outcome.root.as_path()) {
                continue;
            }
            self.loading = false;
            self.javas = outcome.javas;
            // The root is only remembered once players were actually found
            // under it; a map scan alone can succeed against any directory
            // because the maps dir is created on demand.
            let players_ok = outcome.scan.players.is_ok();
            match outcome.scan.players {
                Ok(players) => self.players = players.into_iter().collect(),
                Err(err) => logging::warn(format!("player scan failed: {}", err)),
            }
            match outcome.scan.maps {
                Ok(maps) => self.maps = maps.into_iter().collect(),
                Err(err) => logging::warn(format!("map scan failed: {}", err)),
            }
            if players_ok {
                config.set_scaffold_root(&outcome.root);
                if let Err(err) = config.save() {
                    logging::warn(format!("config save failed: {}", err));
                }
            }
        }
        for event in self.dispatcher.drain() {
            self.apply_event(event);
        }
    }

    /// Starts a match. The console is cleared only when a launch actually
    /// happens; a run while one is live is a silent no-op.
    pub fn run_match(&mut self, settings: &MatchSettings) -> Result<(), DispatchError> {
        let Some(root) = self.root.clone() else {
            return Ok(());
        };
        if self.dispatcher.running().is_some() {
            return Ok(());
        }
        self.console.clear();
        if let Some(pid) = self.dispatcher.launch(&root, settings)? {
            self.current_pid = Some(pid);
        }
        Ok(())
    }

    /// Stops the live match. Later events from its pid no longer match
    /// `current_pid` and are discarded.
    pub fn kill_match(&mut self) {
        self.dispatcher.kill();
        self.current_pid = None;
    }

    fn apply_event(&mut self, event: ProcessEvent) {
        if Some(event.pid()) != self.current_pid {
            return;
        }
        match event {
            ProcessEvent::Stdout { line, .. } => self.console.push(ConsoleLine::output(line)),
            ProcessEvent::Stderr { line, .. } => self.console.push(ConsoleLine::error(line)),
            ProcessEvent::Exited { code, signal, .. } => {
                let mut summary = match code {
                    Some(code) => format!("Exited with code {}", code),
                    None => "Exited".to_string(),
                };
                if let Some(signal) = signal {
                    summary.push_str(&format!(" | signal {}", signal));
                }
                self.console.push(ConsoleLine::bold(summary));
                self.current_pid = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ConsoleKind;

    fn bare_scaffold() -> Scaffold {
        let (reload_tx, reload_rx) = std::sync::mpsc::channel();
        Scaffold {
            root: None,
            players: Vec::new(),
            maps: Vec::new(),
            javas: Vec::new(),
            loading: false,
            console: ConsoleLog::default(),
            dispatcher: MatchDispatcher::new(),
            current_pid: None,
            reload_tx,
            reload_rx,
        }
    }

    #[test]
    fn events_from_an_untracked_pid_are_discarded() {
        let mut scaffold = bare_scaffold();
        scaffold.current_pid = Some(ProcessId(2));
        scaffold.apply_event(ProcessEvent::Stdout {
            pid: ProcessId(1),
            line: "stale".to_string(),
        });
        assert!(scaffold.console.is_empty());
        scaffold.apply_event(ProcessEvent::Stdout {
            pid: ProcessId(2),
            line: "live".to_string(),
        });
        assert_eq!(scaffold.console.len(), 1);
    }

    #[test]
    fn exit_event_appends_a_bold_summary_and_clears_tracking() {
        let mut scaffold = bare_scaffold();
        scaffold.current_pid = Some(ProcessId(5));
        scaffold.apply_event(ProcessEvent::Exited {
            pid: ProcessId(5),
            code: Some(1),
            signal: None,
        });
        assert!(!scaffold.match_running());
        let line = scaffold.console.iter().next().expect("summary line");
        assert_eq!(line.kind, ConsoleKind::Bold);
        assert_eq!(line.content, "Exited with code 1");
    }

    #[test]
    fn signal_exit_is_reported_in_the_summary() {
        let mut scaffold = bare_scaffold();
        scaffold.current_pid = Some(ProcessId(3));
        scaffold.apply_event(ProcessEvent::Exited {
            pid: ProcessId(3),
            code: None,
            signal: Some(9),
        });
        let line = scaffold.console.iter().next().expect("summary line");
        assert_eq!(line.content, "Exited | signal 9");
    }

    #[test]
    fn run_without_a_root_is_a_no_op() {
        let mut scaffold = bare_scaffold();
        let settings = MatchSettings {
            java_home: None,
            team_a: "a".to_string(),
            team_b: "b".to_string(),
            maps: Default::default(),
        };
        scaffold.run_match(&settings).expect("no-op run");
        assert!(!scaffold.match_running());
    }

    #[test]
    fn stale_reload_outcome_for_an_abandoned_root_is_ignored() {
        let mut scaffold = bare_scaffold();
        scaffold.root = Some(PathBuf::from("/current/root"));
        scaffold
            .reload_tx
            .send(ReloadOutcome {
                root: PathBuf::from("/old/root"),
                scan: AssetScan {
                    players: Ok(["ghost".to_string()].into_iter().collect()),
                    maps: Ok(Default::default()),
                },
                javas: Vec::new(),
            })
            .expect("send outcome");
        let mut config = ViewerConfig::default();
        scaffold.poll(&mut config);
        assert!(scaffold.players.is_empty());
        assert_eq!(config.scaffold_root, None);
    }

    #[test]
    fn root_is_not_persisted_when_the_player_scan_failed() {
        let mut scaffold = bare_scaffold();
        let root = PathBuf::from("/some/root");
        scaffold.root = Some(root.clone());
        scaffold
            .reload_tx
            .send(ReloadOutcome {
                root,
                scan: AssetScan {
                    players: Err(crate::assets::AssetError::MissingSourceDir(
                        PathBuf::from("/some/root/src"),
                    )),
                    maps: Ok(["DefaultSmall".to_string()].into_iter().collect()),
                },
                javas: Vec::new(),
            })
            .expect("send outcome");
        let mut config = ViewerConfig::default();
        scaffold.poll(&mut config);
        // The map scan alone is not evidence the directory is a scaffold.
        assert_eq!(scaffold.maps, vec!["DefaultSmall".to_string()]);
        assert_eq!(config.scaffold_root, None);
        assert!(!scaffold.loading());
    }
}
