use anyhow::Context;
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::path::Path;

/// Route `log` output to a file next to the save. The terminal belongs to
/// the renderer, so nothing may be written to stdout or stderr while it runs.
pub fn init(log_path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("could not open log file {}", log_path.display()))?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("logger already initialised")?;
    Ok(())
}
