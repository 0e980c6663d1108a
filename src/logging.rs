use std::env;
use std::sync::OnceLock;
use std::time::Instant;

use log::{self, LevelFilter, Metadata, Record};

/// Set once by `init_logging`; log lines carry seconds since then.
static STARTED: OnceLock<Instant> = OnceLock::new();

struct UptimeLogger;

impl log::Log for UptimeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let uptime = STARTED
                .get()
                .map(|start| start.elapsed().as_secs_f64())
                .unwrap_or(0.0);
            println!(
                "[{:9.3}] {:<5} {} - {}",
                uptime,
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: UptimeLogger = UptimeLogger;

/// Initialize logging with a level taken from the `NAVAL_DEFENSE_LOG`
/// environment variable. Defaults to `info` if the variable is not set
/// or invalid.
pub fn init_logging() {
    let _ = STARTED.set(Instant::now());
    let level = env::var("NAVAL_DEFENSE_LOG")
        .ok()
        .and_then(|lvl| lvl.parse().ok())
        .unwrap_or(LevelFilter::Info);
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(level));
}
