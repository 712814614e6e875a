use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".tsimport";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub importer: ImporterConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which notifications reach the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Never notify
    Off,
    /// Only scan failures
    Errors,
    /// Scan summaries and failures
    All,
}

impl Default for NotificationLevel {
    fn default() -> Self {
        Self::All
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImporterConfig {
    /// Master switch; when false the engine never scans
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Notification verbosity
    #[serde(default)]
    pub notifications: NotificationLevel,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            notifications: NotificationLevel::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Glob patterns (workspace-relative) of files to index
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Glob patterns of files to skip even when included
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Honor .gitignore files while walking
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Number of parallel threads for parsing (None = auto-detect)
    #[serde(default)]
    pub parallel_threads: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
            respect_gitignore: true,
            parallel_threads: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_include() -> Vec<String> {
    vec!["**/*.ts".to_string(), "**/*.tsx".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec![
        "**/node_modules/**".to_string(),
        "**/dist/**".to_string(),
        "**/build/**".to_string(),
        "**/.git/**".to_string(),
    ]
}

/// Quote character used in generated import specifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Double,
    Single,
}

impl Default for QuoteStyle {
    fn default() -> Self {
        Self::Double
    }
}

impl QuoteStyle {
    pub fn as_char(&self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub quote: QuoteStyle,

    /// Terminate generated statements with `;`
    #[serde(default = "default_true")]
    pub semicolons: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            quote: QuoteStyle::default(),
            semicolons: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write logs to rolling files
    #[serde(default)]
    pub enabled: bool,

    /// Also log to stderr
    #[serde(default = "default_true")]
    pub stderr: bool,

    /// File log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory (relative paths resolve against the workspace root)
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_log_prefix")]
    pub file_prefix: String,

    /// Rotation: hourly, daily, minutely, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stderr: true,
            level: default_log_level(),
            directory: default_log_directory(),
            file_prefix: default_log_prefix(),
            rotation: default_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "debug".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join("logs")
}

fn default_log_prefix() -> String {
    "tsimport.log".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Config {
    /// Load configuration from the .tsimport directory
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the .tsimport directory
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_dir = root.join(CONFIG_DIR);
        let config_path = config_dir.join(CONFIG_FILE);

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the .tsimport directory
    pub fn config_dir(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR)
    }

    /// Check if a config file has been written for the given directory
    pub fn is_initialized(root: &Path) -> bool {
        Self::config_dir(root).join(CONFIG_FILE).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.importer.enabled);
        assert_eq!(config.importer.notifications, NotificationLevel::All);
        assert!(config.scan.include.contains(&"**/*.ts".to_string()));
        assert!(config.scan.exclude.contains(&"**/node_modules/**".to_string()));
        assert_eq!(config.style.quote, QuoteStyle::Double);
        assert!(config.style.semicolons);
        assert_eq!(config.watch.debounce_ms, 500);
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.style.quote = QuoteStyle::Single;
        config.style.semicolons = false;

        config.save(dir.path()).unwrap();
        assert!(Config::is_initialized(dir.path()));
        let loaded = Config::load(dir.path()).unwrap();

        assert_eq!(loaded.style.quote, QuoteStyle::Single);
        assert!(!loaded.style.semicolons);
        assert_eq!(config.scan.include, loaded.scan.include);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[style]
quote = "single"

[importer]
notifications = "errors"
"#,
        )
        .unwrap();

        assert_eq!(config.style.quote, QuoteStyle::Single);
        assert!(config.style.semicolons);
        assert!(config.importer.enabled);
        assert_eq!(config.importer.notifications, NotificationLevel::Errors);
        assert_eq!(config.scan.include, default_include());
    }

    #[test]
    fn test_load_missing_config_returns_default() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert!(config.importer.enabled);
        assert!(!Config::is_initialized(dir.path()));
    }
}
