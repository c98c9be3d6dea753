use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::instrument;

use crate::{brightness::Subsystem, error::BacklightError};

const CONFIG_PATH: &str = "mbbacklight/config.toml";
const DEFAULT_CONFIG_PATH: &str = "/etc/mbbacklight/config.toml";

const KBD_BRIGHTNESS: &str = "/sys/class/leds/spi::kbd_backlight/brightness";
const KBD_MAX_BRIGHTNESS: &str = "/sys/class/leds/spi::kbd_backlight/max_brightness";
const DEFAULT_KBD_STEP: u32 = 25;

const SCREEN_BRIGHTNESS: &str = "/sys/class/backlight/gmux_backlight/brightness";
const SCREEN_MAX_BRIGHTNESS: &str = "/sys/class/backlight/gmux_backlight/max_brightness";
const DEFAULT_SCREEN_STEP: u32 = 25;

/// # Documentation
/// The `Config` derived from the `config.toml` file, any missing field keeps its default
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// File to append logs to, logs go to stderr when unset
    pub log_file: Option<PathBuf>,
    pub kbd: DeviceConfig,
    pub screen: DeviceConfig,
}

/// The device files and default step of one subsystem
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Current-value file (read/write)
    pub brightness: PathBuf,
    /// Max-value file (read only)
    pub max_brightness: PathBuf,
    /// Step used by `up`/`down` when `--step` isn't given
    pub step: u32,
}

// Partial device tables fall back to the defaults of that subsystem
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PartialDeviceConfig {
    brightness: Option<PathBuf>,
    max_brightness: Option<PathBuf>,
    step: Option<u32>,
}

impl PartialDeviceConfig {
    fn or_default(self, default: DeviceConfig) -> DeviceConfig {
        DeviceConfig {
            brightness: self.brightness.unwrap_or(default.brightness),
            max_brightness: self.max_brightness.unwrap_or(default.max_brightness),
            step: self.step.unwrap_or(default.step),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    log_file: Option<PathBuf>,
    kbd: PartialDeviceConfig,
    screen: PartialDeviceConfig,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            log_file: raw.log_file,
            kbd: raw.kbd.or_default(DeviceConfig::default_for(Subsystem::Kbd)),
            screen: raw.screen.or_default(DeviceConfig::default_for(Subsystem::Screen)),
        }
    }
}

impl DeviceConfig {
    #[must_use]
    pub fn default_for(subsystem: Subsystem) -> Self {
        match subsystem {
            Subsystem::Kbd => Self {
                brightness: PathBuf::from(KBD_BRIGHTNESS),
                max_brightness: PathBuf::from(KBD_MAX_BRIGHTNESS),
                step: DEFAULT_KBD_STEP,
            },
            Subsystem::Screen => Self {
                brightness: PathBuf::from(SCREEN_BRIGHTNESS),
                max_brightness: PathBuf::from(SCREEN_MAX_BRIGHTNESS),
                step: DEFAULT_SCREEN_STEP,
            },
        }
    }

    /// An explicit non-zero step wins over the configured one
    #[must_use]
    pub fn step_or_default(&self, step: Option<u32>) -> u32 {
        step.filter(|step| *step > 0).unwrap_or(self.step)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: None,
            kbd: DeviceConfig::default_for(Subsystem::Kbd),
            screen: DeviceConfig::default_for(Subsystem::Screen),
        }
    }
}

impl Config {
    #[must_use]
    pub const fn device(&self, subsystem: Subsystem) -> &DeviceConfig {
        match subsystem {
            Subsystem::Kbd => &self.kbd,
            Subsystem::Screen => &self.screen,
        }
    }

    /// Resolves the configuration once at startup
    ///
    /// An explicit path must exist, otherwise the user config, then `/etc`, then the built-in defaults are used.
    ///
    /// # Errors
    /// Returns an error if the chosen config file can't be read or isn't valid TOML
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> Result<Self, BacklightError> {
        if let Some(path) = explicit {
            return get_config_from_file(path);
        }

        let candidates = user_config_path().into_iter().chain([PathBuf::from(DEFAULT_CONFIG_PATH)]);

        for path in candidates {
            if path.exists() {
                return get_config_from_file(&path);
            }
        }

        Ok(Self::default())
    }
}

fn user_config_path() -> Option<PathBuf> {
    // $XDG_CONFIG_HOME takes precedence over $HOME/.config
    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| get_home_dir().map(|home| home.join(".config")))?;

    Some(config_home.join(CONFIG_PATH))
}

fn get_home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").filter(|home| !home.is_empty()).map(PathBuf::from)
}

fn get_config_from_file(path: &Path) -> Result<Config, BacklightError> {
    // Read the config file as a String
    let config = fs::read_to_string(path).map_err(|source| BacklightError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config(path, &config)
}

fn parse_config(path: &Path, contents: &str) -> Result<Config, BacklightError> {
    // Convert the text in the config file to a Config struct using TOML
    let raw: RawConfig = toml::from_str(contents).map_err(|source| BacklightError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(raw.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &str) -> Result<Config, BacklightError> {
        parse_config(Path::new("config.toml"), contents)
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.kbd.step, 25);
        assert_eq!(config.screen.brightness, PathBuf::from(SCREEN_BRIGHTNESS));
    }

    #[test]
    fn partial_device_table_keeps_other_defaults() {
        let config = parse(
            r#"
            log_file = "/tmp/mbbacklight.log"

            [screen]
            brightness = "/sys/class/backlight/intel_backlight/brightness"
            step = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/mbbacklight.log")));
        assert_eq!(
            config.screen.brightness,
            PathBuf::from("/sys/class/backlight/intel_backlight/brightness")
        );
        assert_eq!(config.screen.max_brightness, PathBuf::from(SCREEN_MAX_BRIGHTNESS));
        assert_eq!(config.screen.step, 10);
        assert_eq!(config.kbd, DeviceConfig::default_for(Subsystem::Kbd));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            parse("[mouse]\nstep = 3\n"),
            Err(BacklightError::ConfigParse { .. })
        ));
        assert!(matches!(parse("[kbd]\nstep = -3\n"), Err(BacklightError::ConfigParse { .. })));
    }

    #[test]
    fn zero_step_falls_back_to_configured() {
        let device = DeviceConfig::default_for(Subsystem::Kbd);

        assert_eq!(device.step_or_default(None), 25);
        assert_eq!(device.step_or_default(Some(0)), 25);
        assert_eq!(device.step_or_default(Some(7)), 7);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let path = std::env::temp_dir().join(format!("mbbacklight-{}.toml", uuid::Uuid::new_v4()));

        assert!(matches!(
            Config::load(Some(&path)),
            Err(BacklightError::ConfigRead { .. })
        ));
    }

    #[test]
    fn subsystem_selects_its_device() {
        let config = Config::default();

        assert_eq!(config.device(Subsystem::Kbd).brightness, PathBuf::from(KBD_BRIGHTNESS));
        assert_eq!(
            config.device(Subsystem::Screen).max_brightness,
            PathBuf::from(SCREEN_MAX_BRIGHTNESS)
        );
    }
}
