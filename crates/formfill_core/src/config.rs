//! Data/template path resolution.
//!
//! # Responsibility
//! - Build one explicit [`StoreConfig`] at process start.
//! - Apply precedence: CLI override, environment, user config directory.
//!
//! # Invariants
//! - Resolution reads the environment only through the supplied lookup.
//! - Template candidates are returned in search order.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable overriding the data file location.
pub const DATA_FILE_ENV: &str = "PDF_FORM_FILLER_DATA";
/// Environment variable overriding the template location.
pub const TEMPLATE_FILE_ENV: &str = "PDF_FORM_FILLER_TEMPLATE";
/// Directory name below the user config directory.
pub const CONFIG_DIR_NAME: &str = "pdf-form-filler";
/// Default data file name.
pub const DATA_FILE_NAME: &str = "personal_data.json";
/// Bundled template file name.
pub const TEMPLATE_FILE_NAME: &str = "personal_data_template.json";
/// Directory holding the bundled template.
pub const TEMPLATE_DIR_NAME: &str = "references";

/// Caller-provided overrides, typically from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub data_file: Option<PathBuf>,
    pub template_file: Option<PathBuf>,
}

/// Resolved storage locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Target data document.
    pub data_file: PathBuf,
    /// Template locations, tried in order; the first existing one wins.
    pub template_candidates: Vec<PathBuf>,
}

impl StoreConfig {
    /// Creates a config with explicit paths and no fallback logic.
    pub fn new(data_file: impl Into<PathBuf>, template_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            template_candidates: vec![template_file.into()],
        }
    }

    /// Resolves locations from overrides and the process environment.
    ///
    /// # Errors
    /// - Returns [`ConfigError::NoConfigDirectory`] when no data file was given
    ///   and neither `XDG_CONFIG_HOME` nor `HOME` is set.
    pub fn from_env(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self::resolve(overrides, exe_dir.as_deref(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Resolves locations using `lookup` for environment variables.
    ///
    /// `exe_dir` is the directory of the running binary, when known.
    pub fn resolve<F>(
        overrides: &ConfigOverrides,
        exe_dir: Option<&Path>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_path = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };

        let data_file = match overrides.data_file.clone().or_else(|| env_path(DATA_FILE_ENV)) {
            Some(path) => path,
            None => default_config_dir(&env_path)?.join(DATA_FILE_NAME),
        };

        let template_candidates = match overrides
            .template_file
            .clone()
            .or_else(|| env_path(TEMPLATE_FILE_ENV))
        {
            Some(path) => vec![path],
            None => bundled_template_candidates(exe_dir),
        };

        Ok(Self {
            data_file,
            template_candidates,
        })
    }
}

fn default_config_dir(env_path: &dyn Fn(&str) -> Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(xdg) = env_path("XDG_CONFIG_HOME") {
        return Ok(xdg.join(CONFIG_DIR_NAME));
    }
    match env_path("HOME") {
        Some(home) => Ok(home.join(".config").join(CONFIG_DIR_NAME)),
        None => Err(ConfigError::NoConfigDirectory),
    }
}

fn bundled_template_candidates(exe_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = exe_dir {
        candidates.push(dir.join(TEMPLATE_DIR_NAME).join(TEMPLATE_FILE_NAME));
        candidates.push(dir.join("..").join(TEMPLATE_DIR_NAME).join(TEMPLATE_FILE_NAME));
    }
    candidates.push(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(TEMPLATE_DIR_NAME)
            .join(TEMPLATE_FILE_NAME),
    );
    candidates
}

/// Configuration resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NoConfigDirectory,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoConfigDirectory => write!(
                f,
                "cannot determine default data file: set --data-file, {DATA_FILE_ENV}, XDG_CONFIG_HOME or HOME"
            ),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ConfigOverrides, StoreConfig, DATA_FILE_ENV, TEMPLATE_FILE_ENV};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn override_beats_environment() {
        let overrides = ConfigOverrides {
            data_file: Some(PathBuf::from("/tmp/cli.json")),
            template_file: None,
        };
        let config = StoreConfig::resolve(
            &overrides,
            None,
            lookup(&[(DATA_FILE_ENV, "/tmp/env.json"), ("HOME", "/home/jan")]),
        )
        .expect("override should resolve");
        assert_eq!(config.data_file, PathBuf::from("/tmp/cli.json"));
    }

    #[test]
    fn environment_beats_home_default() {
        let config = StoreConfig::resolve(
            &ConfigOverrides::default(),
            None,
            lookup(&[(DATA_FILE_ENV, "/tmp/env.json"), ("HOME", "/home/jan")]),
        )
        .expect("env should resolve");
        assert_eq!(config.data_file, PathBuf::from("/tmp/env.json"));
    }

    #[test]
    fn default_lives_under_user_config_dir() {
        let from_home =
            StoreConfig::resolve(&ConfigOverrides::default(), None, lookup(&[("HOME", "/home/jan")]))
                .expect("home should resolve");
        assert_eq!(
            from_home.data_file,
            PathBuf::from("/home/jan/.config/pdf-form-filler/personal_data.json")
        );

        let from_xdg = StoreConfig::resolve(
            &ConfigOverrides::default(),
            None,
            lookup(&[("HOME", "/home/jan"), ("XDG_CONFIG_HOME", "/cfg")]),
        )
        .expect("xdg should resolve");
        assert_eq!(
            from_xdg.data_file,
            PathBuf::from("/cfg/pdf-form-filler/personal_data.json")
        );
    }

    #[test]
    fn missing_home_is_reported() {
        let error = StoreConfig::resolve(&ConfigOverrides::default(), None, lookup(&[]))
            .expect_err("no home should fail");
        assert_eq!(error, ConfigError::NoConfigDirectory);
    }

    #[test]
    fn template_candidates_follow_search_order() {
        let config = StoreConfig::resolve(
            &ConfigOverrides::default(),
            Some(Path::new("/opt/formfill/bin")),
            lookup(&[("HOME", "/home/jan")]),
        )
        .expect("should resolve");
        assert_eq!(config.template_candidates.len(), 3);
        assert_eq!(
            config.template_candidates[0],
            PathBuf::from("/opt/formfill/bin/references/personal_data_template.json")
        );

        let pinned = StoreConfig::resolve(
            &ConfigOverrides::default(),
            Some(Path::new("/opt/formfill/bin")),
            lookup(&[("HOME", "/home/jan"), (TEMPLATE_FILE_ENV, "/srv/template.json")]),
        )
        .expect("should resolve");
        assert_eq!(
            pinned.template_candidates,
            vec![PathBuf::from("/srv/template.json")]
        );
    }
}
