//! Execution tracing for post-mortem debugging.
//!
//! `TraceLog` is a plain bounded ring of formatted event lines and is
//! always compiled, so tests can drive it directly. The global
//! instance and the `trace!` / `trace_dump!` macros only exist with
//! the `tracing` feature; without it every trace site in the CPU and
//! bus compiles away to nothing.

use std::collections::VecDeque;

#[cfg(feature = "tracing")]
use once_cell::sync::Lazy;
#[cfg(feature = "tracing")]
use std::sync::Mutex;

/// The CPU retires on the order of ten thousand instructions per NTSC
/// frame, so this holds a couple of frames of instruction history with
/// the interleaved bus and mapper events.
#[cfg(feature = "tracing")]
const DEFAULT_CAPACITY: usize = 25_000;

#[cfg(feature = "tracing")]
pub static TRACE_LOG: Lazy<Mutex<TraceLog>> =
    Lazy::new(|| Mutex::new(TraceLog::new(DEFAULT_CAPACITY)));

/// Bounded ring of trace lines. The oldest lines fall off the front,
/// and the count of evicted lines is kept so a dump can say how much
/// history is missing.
pub struct TraceLog {
    lines: VecDeque<String>,
    capacity: usize,
    evicted: u64,
}

impl TraceLog {
    pub fn new(capacity: usize) -> TraceLog {
        TraceLog {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    pub fn record(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
            self.evicted += 1;
        }
        self.lines.push_back(line);
    }

    /// Records a component's current state as one line.
    pub fn record_state<S: TraceSource>(&mut self, source: &S) {
        self.record(source.trace_line());
    }

    pub fn dump(&self) {
        if self.evicted > 0 {
            println!("... {} earlier lines evicted", self.evicted);
        }
        for line in &self.lines {
            println!("{}", line);
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.evicted = 0;
    }
}

/// Implemented by components that can describe themselves in a single
/// trace line.
pub trait TraceSource {
    fn trace_line(&self) -> String;
}

#[cfg(feature = "tracing")]
pub fn record(args: std::fmt::Arguments) {
    TRACE_LOG.lock().unwrap().record(args.to_string());
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            $crate::tracer::record(format_args!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! trace_dump {
    () => {
        #[cfg(feature = "tracing")]
        {
            $crate::tracer::TRACE_LOG.lock().unwrap().dump();
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;

    struct Probe(u8);

    impl TraceSource for Probe {
        fn trace_line(&self) -> String {
            format!("probe value={:02X}", self.0)
        }
    }

    #[test]
    fn ring_evicts_oldest_lines_and_counts_them() {
        let mut log = TraceLog::new(3);
        for i in 0..5 {
            log.record(format!("line {}", i));
        }
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines, ["line 2", "line 3", "line 4"]);
        assert_eq!(log.evicted, 2);
    }

    #[test]
    fn record_state_formats_one_line_per_source() {
        let mut log = TraceLog::new(8);
        log.record_state(&Probe(0x42));
        assert_eq!(log.lines().next(), Some("probe value=42"));
    }

    #[test]
    fn clear_resets_lines_and_eviction_count() {
        let mut log = TraceLog::new(1);
        log.record("a".into());
        log.record("b".into());
        log.clear();
        assert_eq!(log.lines().count(), 0);
        assert_eq!(log.evicted, 0);
    }
}
