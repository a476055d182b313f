use std::sync::Once;

use log::LevelFilter;
use serde::Deserialize;

static INIT_LOG: Once = Once::new();

#[derive(uniffi::Enum, Deserialize, Debug, Clone, Default, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

/// Installs the platform logger. Only the first call has any effect.
pub fn init_log(level: LogLevel) {
    INIT_LOG.call_once(|| {
        platform::init_log(level);
    });
}

/// Set the log filter level.
#[uniffi::export]
pub fn set_log_level(level: LogLevel) {
    log::set_max_level(level.into())
}

#[cfg(any(
    test,
    not(any(
        target_os = "android",
        target_vendor = "apple",
        target_arch = "wasm32"
    ))
))]
fn write_record(
    out: &mut dyn std::io::Write,
    record: &log::Record<'_>,
) -> std::io::Result<()> {
    if record.level() == log::Level::Error {
        writeln!(
            out,
            "[{}] {} {}:{} - {}",
            record.level(),
            record.target(),
            record.file().unwrap_or("unknown"),
            record
                .line()
                .map(|line| line.to_string())
                .as_deref()
                .unwrap_or("unknown"),
            record.args()
        )
    } else {
        writeln!(
            out,
            "[{}] {} - {}",
            record.level(),
            record.target(),
            record.args()
        )
    }
}

#[cfg(all(target_os = "android", not(test)))]
mod platform {
    use super::*;

    pub fn init_log(level: LogLevel) {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(level.into())
                .with_tag("SessionStore"),
        );
    }
}

#[cfg(all(target_vendor = "apple", not(test)))]
mod platform {
    use super::*;

    pub fn init_log(level: LogLevel) {
        if let Err(e) = oslog::OsLogger::new("com.session.store.core")
            .level_filter(level.into())
            .init()
        {
            eprintln!("{e}");
        }
    }
}

// The browser host installs its own console logger before building a store.
#[cfg(all(target_arch = "wasm32", not(test)))]
mod platform {
    use super::*;

    pub fn init_log(level: LogLevel) {
        set_log_level(level);
    }
}

#[cfg(any(
    test,
    not(any(
        target_os = "android",
        target_vendor = "apple",
        target_arch = "wasm32"
    ))
))]
mod platform {
    use env_logger::{Builder, Env};

    use super::*;

    pub fn init_log(level: LogLevel) {
        let env = Env::default();
        let mut builder = Builder::from_env(env);
        let _ = builder
            .is_test(cfg!(test))
            .format(|formatter, record| write_record(formatter, record))
            .filter(None, level.into())
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_maps_to_filter() {
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::Trace);
        assert_eq!(LevelFilter::from(LogLevel::default()), LevelFilter::Info);
        assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::Error);
    }

    #[test]
    fn log_level_reads_lowercase_names() {
        let level: LogLevel = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(level, LogLevel::Warn);
        assert!(serde_json::from_str::<LogLevel>("\"loud\"").is_err());
    }

    #[test]
    fn error_records_carry_location() {
        let mut out = Vec::new();
        write_record(
            &mut out,
            &log::Record::builder()
                .level(log::Level::Error)
                .target("store")
                .file(Some("store.rs"))
                .line(Some(7))
                .args(format_args!("boom"))
                .build(),
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[ERROR] store store.rs:7 - boom\n");
    }
}
