//! Layered configuration for wlanctl.
//!
//! Two TOML documents describe the hardware: the *system* config (device
//! classes, device types and additional blocks, shipped with the image)
//! and the *model* config (which devices this build actually uses, with
//! per-model overrides). [`Configurer`] merges them and answers the
//! [`ConfigLookup`] queries `wlanctl_core` uses to find its control socket.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use wlanctl_core::ConfigLookup;

pub const SYSTEM_CONFIG_FILE: &str = "system-config.toml";
pub const MODEL_CONFIG_FILE: &str = "model-config.toml";

/// Environment variable naming the directory that holds both files.
pub const CONFIG_DIR_ENV: &str = "WLANCTL_CONFIG_DIR";

/// Prefix for environment overrides of the model layer, e.g.
/// `WLANCTL_MODEL_DEVICES__WIFI__INTERFACE=wlan1`.
pub const MODEL_ENV_PREFIX: &str = "WLANCTL_MODEL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed configuration: {reason}")]
    Malformed { reason: String },

    #[error("configuration file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Raw TOML shapes ─────────────────────────────────────────────────

type RawBlock = BTreeMap<String, toml::Value>;

#[derive(Debug, Default, Deserialize)]
struct SystemFile {
    #[serde(default)]
    device_classes: BTreeMap<String, RawBlock>,
    #[serde(default)]
    device_types: BTreeMap<String, RawBlock>,
    #[serde(default)]
    additional: BTreeMap<String, RawBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelFile {
    #[serde(default)]
    devices: BTreeMap<String, RawBlock>,
}

// ── Resolved configuration ──────────────────────────────────────────

/// Attribute name → value. Non-string TOML values are stringified.
pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceClass {
    pub optional: bool,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceType {
    pub class: String,
    pub attributes: Attributes,
}

/// Merged system and model configuration.
#[derive(Debug, Clone, Default)]
pub struct Configurer {
    classes: BTreeMap<String, DeviceClass>,
    types: BTreeMap<String, DeviceType>,
    additional: BTreeMap<String, Attributes>,
    /// Enabled model blocks only; `disabled = true` drops a block.
    devices: BTreeMap<String, Attributes>,
}

impl Configurer {
    /// Load both files from `dir`.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        Self::from_paths(&dir.join(SYSTEM_CONFIG_FILE), &dir.join(MODEL_CONFIG_FILE))
    }

    /// Load both files from [`config_dir()`].
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(&config_dir())
    }

    pub fn from_paths(system: &Path, model: &Path) -> Result<Self, ConfigError> {
        for path in [system, model] {
            if !path.exists() {
                return Err(ConfigError::Missing {
                    path: path.to_path_buf(),
                });
            }
        }
        debug!(system = %system.display(), model = %model.display(), "loading configuration");

        let system: SystemFile = Figment::new().merge(Toml::file(system)).extract()?;
        let model: ModelFile = Figment::new()
            .merge(Toml::file(model))
            .merge(Env::prefixed(MODEL_ENV_PREFIX).split("__"))
            .extract()?;

        Self::resolve(system, model)
    }

    /// Parse both documents from strings. No environment overrides apply.
    pub fn from_toml_str(system: &str, model: &str) -> Result<Self, ConfigError> {
        let system: SystemFile = Figment::new().merge(Toml::string(system)).extract()?;
        let model: ModelFile = Figment::new().merge(Toml::string(model)).extract()?;
        Self::resolve(system, model)
    }

    fn resolve(system: SystemFile, model: ModelFile) -> Result<Self, ConfigError> {
        let classes = system
            .device_classes
            .into_iter()
            .map(|(name, mut raw)| {
                let optional = take_flag(&mut raw, "optional", &name)?;
                let class = DeviceClass {
                    optional,
                    attributes: stringify(raw),
                };
                Ok((name, class))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        let types = system
            .device_types
            .into_iter()
            .map(|(name, mut raw)| {
                let class = match raw.remove("class") {
                    Some(toml::Value::String(class)) => class,
                    Some(other) => {
                        return Err(malformed(format!(
                            "device type '{name}' has a non-string class: {other}"
                        )));
                    }
                    None => return Err(malformed(format!("device type '{name}' has no class"))),
                };
                if !classes.contains_key(&class) {
                    return Err(malformed(format!(
                        "device type '{name}' refers to unknown class '{class}'"
                    )));
                }
                Ok((
                    name,
                    DeviceType {
                        class,
                        attributes: stringify(raw),
                    },
                ))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        let additional = system
            .additional
            .into_iter()
            .map(|(name, raw)| (name, stringify(raw)))
            .collect();

        let mut devices = BTreeMap::new();
        for (name, mut raw) in model.devices {
            if !classes.contains_key(&name) {
                return Err(malformed(format!(
                    "model configuration names unknown device '{name}'"
                )));
            }
            if take_flag(&mut raw, "disabled", &name)? {
                debug!(device = %name, "model block disabled");
                continue;
            }
            devices.insert(name, stringify(raw));
        }

        Ok(Self {
            classes,
            types,
            additional,
            devices,
        })
    }

    pub fn device_class(&self, name: &str) -> Option<&DeviceClass> {
        self.classes.get(name)
    }

    pub fn device_type(&self, name: &str) -> Option<&DeviceType> {
        self.types.get(name)
    }
}

impl ConfigLookup for Configurer {
    /// Model block, then the additional block, then the device type, then
    /// the type's class, then a class of that name.
    fn attribute(&self, device_type: &str, name: &str) -> Option<String> {
        let from_type = self.types.get(device_type);
        let from_types_class = from_type.and_then(|t| self.classes.get(&t.class));

        [
            self.devices.get(device_type),
            self.additional.get(device_type),
            from_type.map(|t| &t.attributes),
            from_types_class.map(|c| &c.attributes),
            self.classes.get(device_type).map(|c| &c.attributes),
        ]
        .into_iter()
        .flatten()
        .find_map(|attributes| attributes.get(name))
        .cloned()
    }

    fn is_enabled(&self, device_name: &str) -> bool {
        self.devices.contains_key(device_name)
            || self
                .classes
                .get(device_name)
                .is_some_and(|class| !class.optional)
    }
}

// ── Config directory ────────────────────────────────────────────────

/// Directory holding both files: `$WLANCTL_CONFIG_DIR`, else the
/// platform config dir.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    ProjectDirs::from("org", "wlanctl", "wlanctl").map_or_else(
        || PathBuf::from("/etc/wlanctl"),
        |dirs| dirs.config_dir().to_path_buf(),
    )
}

// ── Helpers ─────────────────────────────────────────────────────────

fn malformed(reason: String) -> ConfigError {
    ConfigError::Malformed { reason }
}

fn stringify(raw: RawBlock) -> Attributes {
    raw.into_iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect()
}

/// Remove a boolean flag, accepting `true` or `"true"`.
fn take_flag(raw: &mut RawBlock, key: &str, block: &str) -> Result<bool, ConfigError> {
    match raw.remove(key) {
        None => Ok(false),
        Some(toml::Value::Boolean(flag)) => Ok(flag),
        Some(toml::Value::String(s)) => s
            .parse()
            .map_err(|_| malformed(format!("'{block}.{key}' must be a boolean, got '{s}'"))),
        Some(other) => Err(malformed(format!(
            "'{block}.{key}' must be a boolean, got {other}"
        ))),
    }
}
