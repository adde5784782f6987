use std::collections::VecDeque;

/// Hard cap on retained console lines; the oldest entries are dropped
/// first once a match produces more.
pub const CONSOLE_CAPACITY: usize = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleKind {
    /// A stdout line from the match process.
    Output,
    /// A stderr line from the match process.
    Error,
    /// Controller annotations, e.g. the exit summary.
    Bold,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleLine {
    pub content: String,
    pub kind: ConsoleKind,
}

impl ConsoleLine {
    pub fn output(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: ConsoleKind::Output,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: ConsoleKind::Error,
        }
    }

    pub fn bold(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: ConsoleKind::Bold,
        }
    }
}

/// Append-only bounded match console, cleared at the start of each run.
pub struct ConsoleLog {
    lines: VecDeque<ConsoleLine>,
    capacity: usize,
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new(CONSOLE_CAPACITY)
    }
}

impl ConsoleLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity,
        }
    }

    pub fn push(&mut self, line: ConsoleLine) {
        self.lines.push_back(line);
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsoleLine> {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_overflow_drops_the_oldest_line() {
        let mut log = ConsoleLog::new(3);
        for n in 0..3 {
            log.push(ConsoleLine::output(format!("line {}", n)));
        }
        log.push(ConsoleLine::output("line 3"));
        assert_eq!(log.len(), 3);
        let contents: Vec<_> = log.iter().map(|line| line.content.as_str()).collect();
        assert_eq!(contents, vec!["line 1", "line 2", "line 3"]);
    }

    #[test]
    fn full_capacity_log_keeps_insertion_order() {
        let mut log = ConsoleLog::new(CONSOLE_CAPACITY);
        for n in 0..CONSOLE_CAPACITY + 1 {
            log.push(ConsoleLine::output(format!("{}", n)));
        }
        assert_eq!(log.len(), CONSOLE_CAPACITY);
        let first = log.iter().next().expect("non-empty");
        assert_eq!(first.content, "1");
        let last = log.iter().last().expect("non-empty");
        assert_eq!(last.content, CONSOLE_CAPACITY.to_string());
    }

    #[test]
    fn clear_empties_the_log() {
        let mut log = ConsoleLog::default();
        log.push(ConsoleLine::bold("run starting"));
        log.clear();
        assert!(log.is_empty());
    }
}
