use std::path::PathBuf;

pub const ENV_WORKSPACE: &str = "FLAGMASTER_WORKSPACE";
pub const ENV_LOG_JSON: &str = "FLAGMASTER_LOG_JSON";
pub const ENV_BACKUP_DIR: &str = "FLAGMASTER_BACKUP_DIR";

/// Startup settings, read once from the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Workspace opened before the first request, if set.
    pub workspace: Option<PathBuf>,
    pub log_json: bool,
    /// Fallback directory for `backup.exportJson` when the request has no `outDir`.
    pub backup_dir: Option<PathBuf>,
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty_path(raw: Option<String>) -> Option<PathBuf> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            workspace: non_empty_path(lookup(ENV_WORKSPACE)),
            log_json: lookup(ENV_LOG_JSON)
                .as_deref()
                .and_then(parse_bool)
                .unwrap_or(false),
            backup_dir: non_empty_path(lookup(ENV_BACKUP_DIR)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reads_known_keys() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_WORKSPACE, "/tmp/ws"),
            (ENV_LOG_JSON, "TRUE"),
            (ENV_BACKUP_DIR, "  "),
        ]);
        let cfg = Config::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.workspace, Some(PathBuf::from("/tmp/ws")));
        assert!(cfg.log_json);
        assert_eq!(cfg.backup_dir, None);
    }

    #[test]
    fn unknown_bool_falls_back_to_false() {
        let cfg = Config::from_lookup(|k| (k == ENV_LOG_JSON).then(|| "maybe".to_string()));
        assert!(!cfg.log_json);
        assert_eq!(cfg, Config::default());
    }
}
