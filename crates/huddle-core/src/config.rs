// Configuration loading and parsing (settings.toml, credentials.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::draw::SpinSettings;
use crate::grouping::{GroupSize, Theme};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },

    #[error("could not determine a data directory for the database")]
    NoDataDir,
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub draw: DrawConfig,
    pub grouping: GroupingConfig,
    pub llm: LlmConfig,
    pub database: DatabaseConfig,
    pub export: ExportConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// settings.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire settings.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    draw: DrawConfig,
    grouping: GroupingConfig,
    llm: LlmConfig,
    database: DatabaseConfig,
    export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrawConfig {
    pub min_spin_steps: usize,
    pub spin_step_range: usize,
    pub initial_delay_ms: u64,
    pub slowdown_after: f64,
    pub slowdown_increment_ms: u64,
    pub default_prize: String,
    #[serde(default)]
    pub allow_repeat: bool,
}

impl DrawConfig {
    pub fn spin_settings(&self) -> SpinSettings {
        SpinSettings {
            min_steps: self.min_spin_steps,
            step_range: self.spin_step_range,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            slowdown_after: self.slowdown_after,
            slowdown_increment: Duration::from_millis(self.slowdown_increment_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupingConfig {
    pub default_size: usize,
    #[serde(default)]
    pub default_theme: Theme,
}

impl GroupingConfig {
    pub fn group_size(&self) -> GroupSize {
        GroupSize::new(self.default_size)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub team_names_max_tokens: u32,
    pub announcement_max_tokens: u32,
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Empty means "use the platform data directory".
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub directory: String,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

impl CredentialsConfig {
    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.anthropic_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/settings.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not auto-copy defaults; `load_config()` does.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- settings.toml (required) ---
    let settings_path = config_dir.join("settings.toml");
    let settings_text = read_file(&settings_path)?;
    let settings: SettingsFile =
        toml::from_str(&settings_text).map_err(|e| ConfigError::ParseError {
            path: settings_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        draw: settings.draw,
        grouping: settings.grouping,
        llm: settings.llm,
        database: settings.database,
        export: settings.export,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    let copy_err = |message: String| ConfigError::DefaultsCopyError { message };

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_err(format!("failed to create config directory: {e}")))?;

    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_err(format!("failed to read defaults directory: {e}")))?;

    let mut copied = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| copy_err(format!("failed to read defaults entry: {e}")))?
            .path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path)
                    .map_err(|e| copy_err(format!("failed to read {}: {e}", path.display())))?;
                std::io::Write::write_all(&mut dest, &content)
                    .map_err(|e| copy_err(format!("failed to write {}: {e}", target.display())))?;
                copied.push(target);
            }
            // Never overwrite a user's edited file.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(copy_err(format!("failed to create {}: {e}", target.display())));
            }
        }
    }

    Ok(copied)
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

impl Config {
    /// Where the SQLite file lives. A blank `database.path` resolves to
    /// `huddle.db` in the platform data directory.
    pub fn db_path(&self) -> Result<PathBuf, ConfigError> {
        let configured = self.database.path.trim();
        if !configured.is_empty() {
            return Ok(PathBuf::from(configured));
        }
        let dirs = directories::ProjectDirs::from("", "", "huddle").ok_or(ConfigError::NoDataDir)?;
        Ok(dirs.data_dir().join("huddle.db"))
    }

    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(&self.export.directory)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let invalid = |field: &str, message: String| ConfigError::ValidationError {
        field: field.into(),
        message,
    };

    let draw = &config.draw;
    if draw.min_spin_steps == 0 {
        return Err(invalid("draw.min_spin_steps", "must be > 0".into()));
    }
    if draw.initial_delay_ms == 0 {
        return Err(invalid("draw.initial_delay_ms", "must be > 0".into()));
    }
    if !(0.0..=1.0).contains(&draw.slowdown_after) {
        return Err(invalid(
            "draw.slowdown_after",
            format!("must be between 0.0 and 1.0 inclusive, got {}", draw.slowdown_after),
        ));
    }

    if config.grouping.default_size == 0 {
        return Err(invalid("grouping.default_size", "must be > 0".into()));
    }

    let llm = &config.llm;
    if llm.model.trim().is_empty() {
        return Err(invalid("llm.model", "must not be empty".into()));
    }
    let llm_fields: &[(&str, u64)] = &[
        ("llm.team_names_max_tokens", llm.team_names_max_tokens.into()),
        ("llm.announcement_max_tokens", llm.announcement_max_tokens.into()),
        ("llm.timeout_secs", llm.timeout_secs),
    ];
    for (name, val) in llm_fields {
        if *val == 0 {
            return Err(invalid(name, "must be > 0".into()));
        }
    }

    if config.export.directory.trim().is_empty() {
        return Err(invalid("export.directory", "must not be empty".into()));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root, where `defaults/` lives.
    fn project_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    /// A scratch base dir holding `config/settings.toml` with `settings`.
    fn scratch(name: &str, settings: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/settings.toml"), settings).unwrap();
        tmp
    }

    fn default_settings() -> String {
        fs::read_to_string(project_root().join("defaults/settings.toml")).unwrap()
    }

    #[test]
    fn load_default_settings() {
        let tmp = scratch("huddle_config_defaults", &default_settings());
        let config = load_config_from(&tmp).expect("should load default settings");

        assert_eq!(config.draw.min_spin_steps, 40);
        assert_eq!(config.draw.spin_step_range, 20);
        assert_eq!(config.draw.initial_delay_ms, 50);
        assert!((config.draw.slowdown_after - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.draw.slowdown_increment_ms, 10);
        assert_eq!(config.draw.default_prize, "Lucky Prize");
        assert!(!config.draw.allow_repeat);
        assert_eq!(config.grouping.group_size().get(), 3);
        assert_eq!(config.grouping.default_theme, Theme::Professional);
        assert_eq!(config.llm.timeout(), Duration::from_secs(20));
        assert!(config.database.path.is_empty());
        assert_eq!(config.export.directory, "exports");
        assert!(config.credentials.api_key().is_none());

        assert_eq!(config.draw.spin_settings(), SpinSettings::default());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn credentials_toml_with_api_key() {
        let tmp = scratch("huddle_config_creds", &default_settings());
        fs::write(
            tmp.join("config/credentials.toml"),
            "anthropic_api_key = \"sk-ant-test-key\"\n",
        )
        .unwrap();

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.credentials.api_key(), Some("sk-ant-test-key"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let creds = CredentialsConfig {
            anthropic_api_key: Some("   ".into()),
        };
        assert!(creds.api_key().is_none());
    }

    #[test]
    fn rejects_zero_group_size() {
        let settings = default_settings().replace("default_size = 3", "default_size = 0");
        let tmp = scratch("huddle_config_zero_size", &settings);

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "grouping.default_size")
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_slowdown_out_of_range() {
        let settings = default_settings().replace("slowdown_after = 0.7", "slowdown_after = 1.5");
        let tmp = scratch("huddle_config_slowdown", &settings);

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "draw.slowdown_after")
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_timeout() {
        let settings = default_settings().replace("timeout_secs = 20", "timeout_secs = 0");
        let tmp = scratch("huddle_config_timeout", &settings);

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "llm.timeout_secs"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_settings() {
        let tmp = std::env::temp_dir().join("huddle_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("settings.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = scratch("huddle_config_invalid", "[draw\nmin_spin_steps = ");

        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("settings.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unknown_theme_is_a_parse_error() {
        let settings =
            default_settings().replace("default_theme = \"professional\"", "default_theme = \"pirates\"");
        let tmp = scratch("huddle_config_theme", &settings);
        assert!(matches!(
            load_config_from(&tmp),
            Err(ConfigError::ParseError { .. })
        ));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn explicit_db_path_is_used_verbatim() {
        let tmp = scratch(
            "huddle_config_db_path",
            &default_settings().replace("path = \"\"", "path = \"session.db\""),
        );
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.db_path().unwrap(), PathBuf::from("session.db"));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("huddle_config_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();

        fs::write(defaults_dir.join("settings.toml"), default_settings()).unwrap();
        fs::write(
            defaults_dir.join("credentials.toml.example"),
            "anthropic_api_key = \"sk-ant-...\"\n",
        )
        .unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(tmp.join("config/settings.toml").exists());
        assert!(!tmp.join("config/credentials.toml.example").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = std::env::temp_dir().join("huddle_config_ensure_skips");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::create_dir_all(tmp.join("config")).unwrap();

        fs::write(tmp.join("defaults/settings.toml"), default_settings()).unwrap();
        fs::write(tmp.join("config/settings.toml"), "# custom\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());
        let content = fs::read_to_string(tmp.join("config/settings.toml")).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("huddle_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_files(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
