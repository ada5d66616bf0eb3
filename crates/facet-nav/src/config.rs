use anyhow::Result;
use std::fs;
use std::time::Duration;

use crate::tree::ExpandOpts;

/// Engine configuration.
#[derive(Clone, Debug)]
pub struct NavConfig {
    /// Docbase identifier resolved through `QueryProvider::parse_scope`.
    pub docbase: String,
    /// Recursion guard for pathological facet configurations.
    pub max_depth: usize,
    /// Default per-request expansion budget; `None` = unbounded.
    pub default_deadline: Option<Duration>,
}

impl Default for NavConfig {
    fn default() -> Self {
        NavConfig {
            docbase: String::new(),
            max_depth: 12,
            default_deadline: None,
        }
    }
}

impl NavConfig {
    /// Per-request options derived from the configured default budget.
    pub fn expand_opts(&self) -> ExpandOpts {
        match self.default_deadline {
            Some(budget) => ExpandOpts::with_deadline(budget),
            None => ExpandOpts::default(),
        }
    }
}

/// CLI-level options that binaries pass to `load_nav_config`.
/// Keep this small and explicit; binaries can expand for extra fields.
#[derive(Clone, Debug, Default)]
pub struct MergeOpts {
    pub config_path: Option<std::path::PathBuf>,
    pub cli_docbase: Option<String>,
    pub cli_max_depth: Option<usize>,
    pub cli_deadline_ms: Option<u64>,
}

/// Load and merge NavConfig from: defaults <- config file <- env vars <- CLI
pub fn load_nav_config(mut base: NavConfig, opts: MergeOpts) -> Result<NavConfig> {
    if let Some(path) = opts.config_path.as_ref() {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            let v: toml::Value = toml::from_str(&s)?;
            if let Some(d) = v.get("docbase").and_then(|x| x.as_str()) {
                base.docbase = d.to_string();
            }
            if let Some(m) = v.get("max_depth").and_then(|x| x.as_integer()) {
                base.max_depth = m as usize;
            }
            if let Some(ms) = v.get("deadline_ms").and_then(|x| x.as_integer()) {
                base.default_deadline = Some(Duration::from_millis(ms as u64));
            }
        }
    }

    // env vars override file
    if let Ok(d) = std::env::var("FACETNAV_DOCBASE") {
        base.docbase = d;
    }
    if let Ok(m) = std::env::var("FACETNAV_MAX_DEPTH") {
        if let Ok(v) = m.parse::<usize>() {
            base.max_depth = v;
        }
    }
    if let Ok(ms) = std::env::var("FACETNAV_DEADLINE_MS") {
        if let Ok(v) = ms.parse::<u64>() {
            base.default_deadline = Some(Duration::from_millis(v));
        }
    }

    // CLI overrides everything
    if let Some(d) = opts.cli_docbase {
        base.docbase = d;
    }
    if let Some(m) = opts.cli_max_depth {
        base.max_depth = m;
    }
    if let Some(ms) = opts.cli_deadline_ms {
        base.default_deadline = Some(Duration::from_millis(ms));
    }

    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    fn init_test_logging() {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(|| {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            tracing_subscriber::fmt().with_env_filter(filter).init();
        });
    }

    fn clear_env() {
        std::env::remove_var("FACETNAV_DOCBASE");
        std::env::remove_var("FACETNAV_MAX_DEPTH");
        std::env::remove_var("FACETNAV_DEADLINE_MS");
    }

    #[test]
    #[serial_test::serial]
    fn test_merge_file_env_cli_precedence() {
        init_test_logging();
        clear_env();

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        let toml = r#"
docbase = "from_file"
max_depth = 4
deadline_ms = 100
"#;
        fs::write(tmp.path(), toml).unwrap();

        std::env::set_var("FACETNAV_DOCBASE", "from_env");
        std::env::set_var("FACETNAV_MAX_DEPTH", "5");

        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            cli_docbase: Some("from_cli".into()),
            cli_max_depth: Some(6),
            cli_deadline_ms: None,
        };

        let got = load_nav_config(NavConfig::default(), opts).expect("load");
        assert_eq!(got.docbase, "from_cli");
        assert_eq!(got.max_depth, 6);
        assert_eq!(got.default_deadline, Some(Duration::from_millis(100)));

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_file_then_env() {
        init_test_logging();
        clear_env();

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        let toml = r#"
docbase = "file_only"
max_depth = 3
"#;
        fs::write(tmp.path(), toml).unwrap();
        std::env::set_var("FACETNAV_DOCBASE", "env_only");

        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            ..MergeOpts::default()
        };
        let got = load_nav_config(NavConfig::default(), opts).expect("load");
        // env should override file for the docbase only
        assert_eq!(got.docbase, "env_only");
        assert_eq!(got.max_depth, 3);

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_invalid_env_is_ignored() {
        init_test_logging();
        clear_env();

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        fs::write(tmp.path(), "max_depth = 9\n").unwrap();

        std::env::set_var("FACETNAV_MAX_DEPTH", "not-a-number");

        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            ..MergeOpts::default()
        };
        let got = load_nav_config(NavConfig::default(), opts).expect("load");
        // invalid env should be ignored => value from file
        assert_eq!(got.max_depth, 9);

        clear_env();
    }

    #[test]
    fn defaults_are_sane() {
        let c = NavConfig::default();
        assert_eq!(c.max_depth, 12);
        assert!(c.default_deadline.is_none());
        assert!(c.expand_opts().deadline.is_none());
    }
}
