use std::fs::OpenOptions;
use std::io::Write;

const DEBUG_LOG_ENV: &str = "ROUNDTABLE_DEBUG_LOG";

/// Whether debug logging is active (a log path is configured).
pub fn debug_enabled() -> bool {
    resolve_log_path().is_some()
}

/// Append a debug message to the configured log file, best-effort. The
/// terminal belongs to the editor, so nothing is ever written to stderr while
/// a session may be active; messages are dropped when no path is configured.
pub fn debug(message: &str) {
    if let Some(path) = resolve_log_path() {
        let _ = append_log_file(&path, message);
    }
}

/// Record a skipped agent-event line with its parse error.
pub fn debug_event_parse_error(line: &str, parse_error: &serde_json::Error) {
    debug(&format!(
        "ROUNDTABLE event_parse_skipped error={parse_error}\nline:\n{line}\n"
    ));
}

fn resolve_log_path() -> Option<String> {
    std::env::var(DEBUG_LOG_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn append_log_file(path: &str, message: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(message.as_bytes())?;
    file.write_all(b"\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_disabled_without_env() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        std::env::remove_var(DEBUG_LOG_ENV);
        assert!(!debug_enabled());
        assert_eq!(resolve_log_path(), None);
    }

    #[test]
    fn test_debug_appends_to_configured_file() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("debug.log");
        std::env::set_var(DEBUG_LOG_ENV, path.to_str().unwrap());

        debug("first");
        debug("second");
        let contents = std::fs::read_to_string(&path).expect("log file");
        assert_eq!(contents, "first\nsecond\n");

        std::env::remove_var(DEBUG_LOG_ENV);
    }
}
