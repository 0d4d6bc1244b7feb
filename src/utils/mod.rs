// src/utils/mod.rs
use log::{debug, info, LevelFilter};
use std::str::FromStr;
use std::time::Instant;

/// Installs the global logger. Output goes to stderr because stdout carries
/// the request/response stream.
pub fn setup_logging(level: &str) -> Result<(), fern::InitError> {
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("rustls", LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;
    info!("Logging initialized at {}.", level);
    Ok(())
}

/// Logs how long an HTTP request took.
pub async fn log_timed_request<T>(label: &str, f: impl std::future::Future<Output = T>) -> T {
    let start = Instant::now();
    let result = f.await;
    debug!("{} completed in {} ms", label, start.elapsed().as_millis());
    result
}
