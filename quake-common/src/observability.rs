//! Logging for the `quake` binary.
//!
//! [`init_logging`] takes the `log:` section of the configuration as-is and
//! installs one global subscriber: a daily rolling file plus an optional
//! stderr copy, both in the configured [`LogFormat`]. The first call wins;
//! later calls get back the file path the first call chose.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

const LOG_DIR_ENV: &str = "QUAKE_LOG_DIR";

/// Levels appended to the configured filter unless it names the target
/// itself. `http.raw` lines only exist when `QUAKE_HTTP_RAW` is set, so a
/// plain `info` filter must not hide them.
const TARGET_DEFAULTS: &[(&str, &str)] = &[
    ("hyper_util", "warn"),
    ("reqwest", "warn"),
    ("http.raw", "debug"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// The `log:` configuration section.
///
/// ```
/// use quake_common::observability::LogSettings;
/// use quake_common::LogFormat;
///
/// let log = LogSettings::default();
/// assert_eq!(log.format, LogFormat::Text);
/// assert_eq!(log.filter, "info");
/// assert!(!log.stderr && log.dir.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub format: LogFormat,
    /// Mirror events to stderr as well as the file.
    pub stderr: bool,
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
    /// Log directory; `QUAKE_LOG_DIR`, then `~/.local/share/<app>` otherwise.
    pub dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            stderr: false,
            filter: "info".into(),
            dir: None,
        }
    }
}

/// Install the global subscriber and return today's log file,
/// `<dir>/<app_name>.log.<YYYY-MM-DD>`.
pub fn init_logging(app_name: &str, settings: &LogSettings) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => {
            let directives = filter_directives(&settings.filter);
            EnvFilter::try_new(&directives)
                .with_context(|| format!("invalid log filter: {directives}"))?
        }
    };

    let dir = resolve_log_dir(app_name, settings.dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;
    let file_name = format!("{app_name}.log");
    let path = dir.join(format!("{file_name}.{}", Local::now().format("%Y-%m-%d")));

    let appender = tracing_appender::rolling::daily(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = fmt::layer().with_writer(writer).with_ansi(false);
    let file_layer = match settings.format {
        LogFormat::Text => file.boxed(),
        LogFormat::Json => file.json().boxed(),
    };
    let stderr_layer = settings.stderr.then(|| {
        let stderr = fmt::layer().with_writer(std::io::stderr);
        match settings.format {
            LogFormat::Text => stderr.boxed(),
            LogFormat::Json => stderr.json().boxed(),
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    let _ = LOG_GUARD.set(guard);
    let _ = LOG_PATH.set(path.clone());
    Ok(path)
}

/// The configured filter plus [`TARGET_DEFAULTS`] for targets it leaves out.
fn filter_directives(configured: &str) -> String {
    let configured = configured.trim();
    let mut directives = if configured.is_empty() {
        "info".to_string()
    } else {
        configured.to_string()
    };
    for (target, level) in TARGET_DEFAULTS {
        let named = directives
            .split(',')
            .any(|d| d.trim().split('=').next() == Some(*target));
        if !named {
            directives.push_str(&format!(",{target}={level}"));
        }
    }
    directives
}

fn resolve_log_dir(app_name: &str, configured: Option<&Path>) -> PathBuf {
    let chosen = configured
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from));
    let home = std::env::var_os("HOME").map(PathBuf::from);

    match (chosen, home) {
        (Some(dir), Some(home)) => match dir.strip_prefix("~") {
            Ok(rest) => home.join(rest),
            Err(_) => dir,
        },
        (Some(dir), None) => dir,
        (None, Some(home)) => home.join(".local").join("share").join(app_name),
        (None, None) => PathBuf::from(".").join(app_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_dir_wins() {
        let dir = resolve_log_dir("quake", Some(Path::new("/tmp/quake-logs")));
        assert_eq!(dir, PathBuf::from("/tmp/quake-logs"));
    }

    #[test]
    fn tilde_dir_lands_under_home() {
        temp_env::with_var("HOME", Some("/home/seismo"), || {
            let dir = resolve_log_dir("quake", Some(Path::new("~/logs")));
            assert_eq!(dir, PathBuf::from("/home/seismo/logs"));
        });
    }

    #[test]
    fn default_dir_is_per_app() {
        temp_env::with_vars(
            [("HOME", Some("/home/seismo")), (LOG_DIR_ENV, None)],
            || {
                let dir = resolve_log_dir("quake", None);
                assert_eq!(dir, PathBuf::from("/home/seismo/.local/share/quake"));
            },
        );
    }

    #[test]
    fn filter_gains_target_defaults() {
        assert_eq!(
            filter_directives("info"),
            "info,hyper_util=warn,reqwest=warn,http.raw=debug"
        );
        assert_eq!(
            filter_directives("  "),
            "info,hyper_util=warn,reqwest=warn,http.raw=debug"
        );
    }

    #[test]
    fn filter_keeps_explicit_target_levels() {
        let directives = filter_directives("warn,reqwest=trace,http.raw=off");
        assert!(directives.contains("reqwest=trace"));
        assert!(!directives.contains("reqwest=warn"));
        assert!(!directives.contains("http.raw=debug"));
        assert!(directives.ends_with("hyper_util=warn"));
    }

    #[test]
    fn init_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = LogSettings {
            dir: Some(tmp.path().to_path_buf()),
            ..LogSettings::default()
        };
        let first = init_logging("quake-tests", &settings).unwrap();
        let second = init_logging("other", &LogSettings::default()).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with(tmp.path()));
    }
}
