//! Configuration management
//!
//! Handles loading, parsing, and validating the TOML configuration file.
//! Covers daemon settings, the mixer application identity, and the ordered
//! candidate name lists used for device resolution.

use color_eyre::eyre::{Context, ContextCompat, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Public Configuration Types
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    pub mixer: MixerConfig,
    pub routing: RoutingConfig,
}

/// Global settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_level: String,
    /// Notifications for daemon start/stop
    pub notify_daemon: bool,
    /// Notifications when a pass actually changes the routing
    pub notify_switch: bool,
}

/// Identity of the software mixer application
#[derive(Debug, Clone)]
pub struct MixerConfig {
    /// Name of the mixer's boundary device as it appears in the device list
    pub device_name: String,
    /// Bundle identifier used to launch the app hidden/non-activating
    pub bundle_id: String,
    /// Process name used for the is-it-running check
    pub process_name: String,
}

/// Ordered candidate name lists, first match wins
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Vendor/model tokens resolving the physical DAC
    pub dac_candidates: Vec<String>,
    /// Tokens resolving the built-in speakers fallback
    pub builtin_candidates: Vec<String>,
}

// ============================================================================
// Config File Deserialization (TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    settings: SettingsFile,
    #[serde(default)]
    mixer: MixerFile,
    #[serde(default)]
    routing: RoutingFile,
}

#[derive(Debug, Deserialize)]
struct SettingsFile {
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_true")]
    notify_daemon: bool,
    #[serde(default = "default_true")]
    notify_switch: bool,
}

#[derive(Debug, Deserialize)]
struct MixerFile {
    #[serde(default = "default_mixer_device")]
    device_name: String,
    #[serde(default = "default_mixer_bundle")]
    bundle_id: String,
    #[serde(default = "default_mixer_process")]
    process_name: String,
}

#[derive(Debug, Deserialize)]
struct RoutingFile {
    #[serde(default = "default_dac_candidates")]
    dac_candidates: Vec<String>,
    #[serde(default = "default_builtin_candidates")]
    builtin_candidates: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_mixer_device() -> String {
    "Background Music".to_string()
}

fn default_mixer_bundle() -> String {
    "com.bearisdriving.BGM.App".to_string()
}

fn default_mixer_process() -> String {
    "Background Music".to_string()
}

fn default_dac_candidates() -> Vec<String> {
    ["SMSL", "SU-1", "USB DAC"]
        .map(String::from)
        .to_vec()
}

fn default_builtin_candidates() -> Vec<String> {
    ["MacBook", "Built-in"].map(String::from).to_vec()
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            notify_daemon: true,
            notify_switch: true,
        }
    }
}

impl Default for MixerFile {
    fn default() -> Self {
        Self {
            device_name: default_mixer_device(),
            bundle_id: default_mixer_bundle(),
            process_name: default_mixer_process(),
        }
    }
}

impl Default for RoutingFile {
    fn default() -> Self {
        Self {
            dac_candidates: default_dac_candidates(),
            builtin_candidates: default_builtin_candidates(),
        }
    }
}

// ============================================================================
// Config Implementation
// ============================================================================

impl Config {
    /// Load configuration from the default per-user config path, creating a
    /// commented default file on first run.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Creating default config at {:?}", config_path);
            Self::create_default_config(&config_path)?;
        }

        Self::load_from_path(&config_path)
    }

    /// Load configuration from an explicit path
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {path:?}"))?;

        let config_file: ConfigFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {path:?}"))?;

        Self::from_config_file(config_file)
    }

    fn from_config_file(config_file: ConfigFile) -> Result<Self> {
        let config = Self {
            settings: Settings {
                log_level: config_file.settings.log_level,
                notify_daemon: config_file.settings.notify_daemon,
                notify_switch: config_file.settings.notify_switch,
            },
            mixer: MixerConfig {
                device_name: config_file.mixer.device_name,
                bundle_id: config_file.mixer.bundle_id,
                process_name: config_file.mixer.process_name,
            },
            routing: RoutingConfig {
                dac_candidates: config_file.routing.dac_candidates,
                builtin_candidates: config_file.routing.builtin_candidates,
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        match self.settings.log_level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            level => bail!(
                "Invalid log_level '{level}'. Must be: error, warn, info, debug, or trace"
            ),
        }

        if self.mixer.device_name.trim().is_empty() {
            bail!("mixer.device_name must not be empty");
        }
        if self.routing.dac_candidates.is_empty() {
            bail!("routing.dac_candidates must list at least one token");
        }
        if self
            .routing
            .dac_candidates
            .iter()
            .chain(&self.routing.builtin_candidates)
            .any(|c| c.trim().is_empty())
        {
            bail!("candidate tokens must not be empty strings");
        }

        Ok(())
    }

    /// Per-user config path for dacbridge
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined/created.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("dacbridge");
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config dir: {config_dir:?}"))?;
        Ok(config_dir.join("config.toml"))
    }

    fn create_default_config(path: &PathBuf) -> Result<()> {
        let default_config = r#"# dacbridge configuration
#
# Arbitrates the default audio output between a software mixer
# (Background Music) and a physical DAC.

[settings]
log_level = "info"       # error, warn, info, debug, trace
notify_daemon = true     # Notifications for daemon start/stop
notify_switch = true     # Notifications when a pass changes the routing

[mixer]
device_name = "Background Music"         # Boundary device name in the device list
bundle_id = "com.bearisdriving.BGM.App"  # Launched hidden when not running
process_name = "Background Music"        # Used for the is-it-running check

[routing]
# Ordered name substrings, first match wins. Matching is case-insensitive.
dac_candidates = ["SMSL", "SU-1", "USB DAC"]
builtin_candidates = ["MacBook", "Built-in"]
"#;
        fs::write(path, default_config)
            .with_context(|| format!("Failed to write config: {path:?}"))?;

        eprintln!("Created default config at: {path:?}");

        Ok(())
    }
}
