use crate::Result;
use std::path::{Path, PathBuf};
use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// A per-procedure logging sink.
///
/// Events at INFO and above go to the console and to
/// `<log_dir>/<name>_<YYYYmmdd_HHMMSS>.log`. The sink is installed as the
/// default subscriber for the current thread and removed, with the file
/// flushed, when the session is dropped.
pub struct LogSession {
    path: PathBuf,
    // Drop order matters: uninstall the subscriber before flushing the file.
    _default: DefaultGuard,
    _worker: WorkerGuard,
}

impl LogSession {
    /// Opens a fresh timestamped log file and starts routing events to it.
    ///
    /// # Arguments
    ///
    /// * `log_dir` - The directory the log file is created in.
    /// * `name` - The procedure name used as the file prefix, e.g. `scraper`.
    pub fn start(log_dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let log_dir = log_dir.as_ref();
        std::fs::create_dir_all(log_dir)?;

        let file_name = format!("{}_{}.log", name, chrono::Local::now().format("%Y%m%d_%H%M%S"));
        let path = log_dir.join(&file_name);

        let file_appender = tracing_appender::rolling::never(log_dir, &file_name);
        let (file_writer, worker) = tracing_appender::non_blocking(file_appender);

        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_target(false);

        let console_layer = fmt::layer().with_target(false).compact();

        let default = tracing_subscriber::registry()
            .with(LevelFilter::INFO)
            .with(console_layer)
            .with(file_layer)
            .set_default();

        Ok(Self {
            path,
            _default: default,
            _worker: worker,
        })
    }

    /// The file this session writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_writes_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();

        let path = {
            let session = LogSession::start(dir.path(), "scraper").unwrap();
            tracing::info!("Config loaded successfully");
            tracing::debug!("not recorded");
            session.path().to_path_buf()
        };

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("scraper_"));
        assert!(name.ends_with(".log"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Config loaded successfully"));
        assert!(!text.contains("not recorded"));
    }
}
