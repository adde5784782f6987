use std::collections::BTreeSet;
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::discovery::wrapper_script;
use crate::logging;

/// Correlation key for a launched match. Events carry it so output from a
/// killed or finished run can never land in a newer run's console.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProcessId(pub u64);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessEvent {
    Stdout { pid: ProcessId, line: String },
    Stderr { pid: ProcessId, line: String },
    Exited {
        pid: ProcessId,
        code: Option<i32>,
        signal: Option<i32>,
    },
}

impl ProcessEvent {
    pub fn pid(&self) -> ProcessId {
        match self {
            ProcessEvent::Stdout { pid, .. }
            | ProcessEvent::Stderr { pid, .. }
            | ProcessEvent::Exited { pid, .. } => *pid,
        }
    }
}

#[derive(Debug)]
pub enum DispatchError {
    Spawn(std::io::Error),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Spawn(err) => write!(f, "failed to launch match: {}", err),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Spawn(err) => Some(err),
        }
    }
}

/// Everything a match run needs beyond the scaffold root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchSettings {
    pub java_home: Option<PathBuf>,
    pub team_a: String,
    pub team_b: String,
    pub maps: BTreeSet<String>,
}

impl MatchSettings {
    fn gradle_args(&self) -> Vec<String> {
        let maps: Vec<&str> = self.maps.iter().map(String::as_str).collect();
        vec![
            "run".to_string(),
            "-x".to_string(),
            "unpackClient".to_string(),
            "-PwaitForClient=true".to_string(),
            format!("-PteamA={}", self.team_a),
            format!("-PteamB={}", self.team_b),
            format!("-Pmaps={}", maps.join(",")),
            "-PvalidateMaps=false".to_string(),
            "-PenableProfiler=false".to_string(),
        ]
    }
}

struct TrackedMatch {
    pid: ProcessId,
    child: Child,
}

/// Owns the single live match process and the channel its output arrives
/// on. At most one match runs at a time; launch while one is tracked is a
/// silent no-op.
pub struct MatchDispatcher {
    tracked: Option<TrackedMatch>,
    next_pid: u64,
    sender: Sender<ProcessEvent>,
    receiver: Receiver<ProcessEvent>,
}

impl Default for MatchDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchDispatcher {
    pub fn new() -> Self {
        let (sender, receiver) = std::sync::mpsc::channel();
        Self {
            tracked: None,
            next_pid: 1,
            sender,
            receiver,
        }
    }

    pub fn running(&self) -> Option<ProcessId> {
        self.tracked.as_ref().map(|tracked| tracked.pid)
    }

    /// Spawns the scaffold's build wrapper for a match. Returns the new
    /// correlation key, or `Ok(None)` when a match is already tracked.
    pub fn launch(
        &mut self,
        root: &Path,
        settings: &MatchSettings,
    ) -> Result<Option<ProcessId>, DispatchError> {
        if self.tracked.is_some() {
            return Ok(None);
        }
        let pid = ProcessId(self.next_pid);
        self.next_pid += 1;

        let mut command = Command::new(root.join(wrapper_script()));
        command
            .args(settings.gradle_args())
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(java_home) = &settings.java_home {
            command.env("JAVA_HOME", java_home);
        }
        let mut child = command.spawn().map_err(DispatchError::Spawn)?;

        if let Some(stdout) = child.stdout.take() {
            spawn_line_reader(stdout, pid, self.sender.clone(), false);
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_line_reader(stderr, pid, self.sender.clone(), true);
        }
        logging::info(format!("launched {} in {}", pid, root.display()));
        self.tracked = Some(TrackedMatch { pid, child });
        Ok(Some(pid))
    }

    /// Kills the tracked match if there is one; otherwise does nothing.
    /// Tracking is dropped immediately, so later events from the old pid
    /// no longer match the current run.
    pub fn kill(&mut self) {
        if let Some(mut tracked) = self.tracked.take() {
            if let Err(err) = tracked.child.kill() {
                logging::warn(format!("kill {} failed: {}", tracked.pid, err));
            }
            let _ = tracked.child.wait();
            logging::info(format!("killed {}", tracked.pid));
        }
    }

    /// Collects every event that arrived since the last poll. Reader
    /// threads deliver stdout/stderr lines; the exit event is synthesized
    /// here once the tracked child is done.
    pub fn drain(&mut self) -> Vec<ProcessEvent> {
        let mut events: Vec<ProcessEvent> = self.receiver.try_iter().collect();
        if let Some(tracked) = &mut self.tracked {
            match tracked.child.try_wait() {
                Ok(Some(status)) => {
                    flush_tail(
                        &self.receiver,
                        EXIT_FLUSH_QUIET,
                        EXIT_FLUSH_DEADLINE,
                        &mut events,
                    );
                    events.push(ProcessEvent::Exited {
                        pid: tracked.pid,
                        code: status.code(),
                        signal: exit_signal(&status),
                    });
                    self.tracked = None;
                }
                Ok(None) => {}
                Err(err) => {
                    logging::error(format!("lost track of {}: {}", tracked.pid, err));
                    events.push(ProcessEvent::Exited {
                        pid: tracked.pid,
                        code: None,
                        signal: None,
                    });
                    self.tracked = None;
                }
            }
        }
        events
    }
}

const EXIT_FLUSH_QUIET: Duration = Duration::from_millis(50);
const EXIT_FLUSH_DEADLINE: Duration = Duration::from_millis(250);

/// Lets the reader threads flush their tails after the child exits, so the
/// exit summary lands after the output. The quiet window stops as soon as
/// the senders go silent; the deadline caps the wait even if something
/// inherited the pipes and keeps writing, so a frame can never stall on it.
/// Lines arriving later surface in subsequent drains.
fn flush_tail(
    receiver: &Receiver<ProcessEvent>,
    quiet: Duration,
    deadline: Duration,
    events: &mut Vec<ProcessEvent>,
) {
    let cutoff = Instant::now() + deadline;
    while Instant::now() < cutoff {
        match receiver.recv_timeout(quiet) {
            Ok(event) => events.push(event),
            Err(_) => break,
        }
    }
}

fn spawn_line_reader(
    stream: impl Read + Send + 'static,
    pid: ProcessId,
    sender: Sender<ProcessEvent>,
    is_stderr: bool,
) {
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let Ok(line) = line else {
                break;
            };
            let event = if is_stderr {
                ProcessEvent::Stderr { pid, line }
            } else {
                ProcessEvent::Stdout { pid, line }
            };
            if sender.send(event).is_err() {
                break;
            }
        }
    });
}

#[cfg(unix)]
fn exit_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
