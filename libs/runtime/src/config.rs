use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use window_paging::SortSpec;

/// Application configuration: paging defaults, the demo fixture and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base directory for relative log paths. Empty means the current directory.
    #[serde(default)]
    pub home_dir: String,
    #[serde(default)]
    pub paging: PagingConfig,
    #[serde(default)]
    pub demo: DemoConfig,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PagingConfig {
    /// Window size a scrolling caller asks for per request.
    pub chunk_size: u64,
    /// Provider default order as signed tokens, e.g. "+name,-id". Empty = unsorted.
    #[serde(default)]
    pub default_sort: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DemoConfig {
    /// Number of synthetic records served by the demo backend.
    pub records: u64,
}

/// Logging configuration - maps target prefixes to their logging settings.
/// Key "default" covers every target without its own section.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/paging.log"; only the "default" section's file is opened
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>, // rotated files to keep
    #[serde(default)]
    pub max_size_mb: Option<u64>, // rotate once the file exceeds this
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            default_sort: String::new(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { records: 95 }
    }
}

impl PagingConfig {
    /// Parse `default_sort` into the provider's sort spec.
    pub fn sort_spec(&self) -> Result<SortSpec> {
        SortSpec::from_signed_tokens(&self.default_sort)
            .with_context(|| format!("invalid paging.default_sort '{}'", self.default_sort))
    }
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: String::new(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            paging: PagingConfig::default(),
            demo: DemoConfig::default(),
            logging: Some(default_logging_config()),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let config_path = config_path.as_ref();
        if !config_path.is_file() {
            bail!("config file not found: {}", config_path.display());
        }

        // Optional sections stay None unless YAML/ENV provide them.
        let base = AppConfig {
            logging: None,
            ..AppConfig::default()
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path))
            // Example: APP__PAGING__CHUNK_SIZE=25 maps to paging.chunk_size
            .merge(Env::prefixed("APP__").split("__"));

        let config: AppConfig = figment
            .extract()
            .with_context(|| "Failed to extract config from figment".to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file or fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.paging.chunk_size == 0 {
            bail!("paging.chunk_size must be at least 1");
        }
        self.paging.sort_spec()?;
        Ok(())
    }

    /// Directory relative log paths resolve against.
    pub fn base_dir(&self) -> PathBuf {
        if self.home_dir.trim().is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.home_dir)
        }
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(chunk) = args.chunk_size {
            self.paging.chunk_size = chunk;
        }
        if let Some(records) = args.records {
            self.demo.records = records;
        }

        // Set logging level based on verbose flags for "default" section.
        let logging = self.logging.get_or_insert_with(default_logging_config);
        let default_section = logging.entry("default".to_string()).or_insert_with(|| Section {
            console_level: "info".to_string(),
            file: String::new(),
            file_level: String::new(),
            max_backups: None,
            max_size_mb: None,
        });
        default_section.console_level = match args.verbose {
            0 => default_section.console_level.clone(), // keep
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        };
    }
}

/// Command line arguments that override configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub chunk_size: Option<u64>,
    pub records: Option<u64>,
    pub verbose: u8,
}
