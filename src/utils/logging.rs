//! Logger setup for the synth binary

use log::LevelFilter;

/// Initialize the logger at INFO, overridable through `RUST_LOG`.
///
/// Lines start with `\r` so they stay aligned while the terminal is in raw mode.
pub fn init_logger() {
    init_logger_with_level(LevelFilter::Info);
}

/// Initialize the logger with an explicit default level.
/// A second call is ignored, which keeps repeated setup in tests harmless.
pub fn init_logger_with_level(level: LevelFilter) {
    let result = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "\r[{} {:5} {}] {}",
                buf.timestamp(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}
