//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/kbtree/kbtree.toml`
//! 3. Local config: `<dir>/.kbtree.toml` (the working/project directory)
//! 4. Environment variables: `KBTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{Alphabet, OrderKeyEngine, BASE, MAX, MID};

/// Digits used to spell order keys.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyConfig {
    /// Lowest digit and first key
    pub base: char,
    /// Branch digit
    pub mid: char,
    /// Highest digit
    pub max: char,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            base: BASE,
            mid: MID,
            max: MAX,
        }
    }
}

/// Tree output options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Annotate tree output with order keys
    pub show_keys: bool,
}

/// Raw settings for intermediate parsing (None = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub outline: Option<PathBuf>,
    pub keys: RawKeyConfig,
    pub display: RawDisplayConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawKeyConfig {
    pub base: Option<char>,
    pub mid: Option<char>,
    pub max: Option<char>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub show_keys: Option<bool>,
}

/// Unified configuration for kbtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Outline file used when `--file` is not given
    pub outline: PathBuf,
    /// Order key alphabet
    pub keys: KeyConfig,
    /// Output options
    pub display: DisplayConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            outline: default_outline_path(),
            keys: KeyConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// Default outline location (`$XDG_DATA_HOME/kbtree/outline.toml`).
fn default_outline_path() -> PathBuf {
    ProjectDirs::from("", "", "kbtree")
        .map(|dirs| dirs.data_dir().join("outline.toml"))
        .unwrap_or_else(|| PathBuf::from("outline.toml"))
}

/// Get the XDG config directory for kbtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "kbtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("kbtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".kbtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Validated alphabet from the `[keys]` section.
    pub fn alphabet(&self) -> Result<Alphabet, ApplicationError> {
        Alphabet::new(self.keys.base, self.keys.mid, self.keys.max).map_err(|e| {
            ApplicationError::Config {
                message: e.to_string(),
            }
        })
    }

    /// Key engine for the configured alphabet.
    pub fn engine(&self) -> Result<OrderKeyEngine, ApplicationError> {
        Ok(OrderKeyEngine::new(self.alphabet()?))
    }

    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.outline.to_string_lossy().as_ref());
        self.outline = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            outline: overlay
                .outline
                .clone()
                .unwrap_or_else(|| self.outline.clone()),
            keys: KeyConfig {
                base: overlay.keys.base.unwrap_or(self.keys.base),
                mid: overlay.keys.mid.unwrap_or(self.keys.mid),
                max: overlay.keys.max.unwrap_or(self.keys.max),
            },
            display: DisplayConfig {
                show_keys: overlay
                    .display
                    .show_keys
                    .unwrap_or(self.display.show_keys),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.kbtree.toml`
    ///
    /// Relative `outline` paths in a local config resolve against `local_dir`.
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let mut raw = load_raw_settings(&local_path)?;
                raw.outline = raw.outline.map(|p| dir.join(p));
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.alphabet()?;

        Ok(current)
    }

    /// Apply KBTREE_* environment variables, e.g. `KBTREE_KEYS__MID=n`.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("KBTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("outline") {
            settings.outline = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("keys.base") {
            settings.keys.base = single_char("keys.base", &val)?;
        }
        if let Ok(val) = config.get_string("keys.mid") {
            settings.keys.mid = single_char("keys.mid", &val)?;
        }
        if let Ok(val) = config.get_string("keys.max") {
            settings.keys.max = single_char("keys.max", &val)?;
        }
        if let Ok(val) = config.get_bool("display.show_keys") {
            settings.display.show_keys = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# kbtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/kbtree/kbtree.toml
#   Local:  <dir>/.kbtree.toml
#   Env:    KBTREE_* environment variables (KBTREE_KEYS__MID=n)

# Outline file used when --file is not given
# outline = "~/notes/outline.toml"

[keys]
# Digits for order keys: base < mid < max, printable ASCII.
# Changing them for an existing outline invalidates its keys.
# base = "a"
# mid = "m"
# max = "z"

[display]
# Show order keys next to tree entries
# show_keys = false
"#
        .to_string()
    }
}

fn single_char(name: &str, value: &str) -> Result<char, ApplicationError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ApplicationError::Config {
            message: format!("{name} must be a single character, got {value:?}"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
