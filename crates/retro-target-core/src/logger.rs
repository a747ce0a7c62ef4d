//! Process logger.
//!
//! Prints `[elapsed LEVEL target frame N] message` to stderr. The tracker runs
//! unattended, so the elapsed prefix and the frame number are what line up a
//! log with a match recording. Use `init_with_level` once at startup and
//! `set_log_frame` from the frame loop.

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

static FRAME: AtomicU64 = AtomicU64::new(0);

/// Tag following log lines with the number of the frame being processed.
/// `0` means no frame yet (startup).
pub fn set_log_frame(frame: u64) {
    FRAME.store(frame, Ordering::Relaxed);
}

fn format_line(elapsed: f64, level: Level, target: &str, frame: u64, args: fmt::Arguments) -> String {
    // crate name only
    let target = target.split("::").next().unwrap_or("");
    if frame == 0 {
        format!("[{elapsed:9.3}s {level:>5} {target}] {args}")
    } else {
        format!("[{elapsed:9.3}s {level:>5} {target} frame {frame}] {args}")
    }
}

struct TrackerLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for TrackerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            FRAME.load(Ordering::Relaxed),
            *record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<TrackerLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| TrackerLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Read a level filter from an environment variable, falling back to `default`
/// when the variable is unset or unparsable.
pub fn level_from_env(var: &str, default: LevelFilter) -> LevelFilter {
    std::env::var(var)
        .ok()
        .and_then(|raw| LevelFilter::from_str(raw.trim()).ok())
        .unwrap_or(default)
}

/// Install a `tracing` fmt subscriber.
///
/// `filter` defaults to `RUST_LOG`, then to `info`.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, filter: Option<EnvFilter>) {
    let filter = filter.unwrap_or_else(|| {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    });
    if json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}
