use crate::error::ConfigError;
use eink_raster::{packed_len, EpdEncoder, KernelId, Levels};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGET_WIDTH: u32 = 800;
pub const DEFAULT_TARGET_HEIGHT: u32 = 480;
pub const DEFAULT_COLOR_LEVELS: u32 = 2;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "GEINK_CONFIG";
pub const WIDTH_ENV: &str = "GEINK_TARGET_WIDTH";
pub const HEIGHT_ENV: &str = "GEINK_TARGET_HEIGHT";
pub const LEVELS_ENV: &str = "GEINK_COLOR_LEVELS";
pub const METHOD_ENV: &str = "GEINK_DITHER_METHOD";

/// One source of settings. Unset fields defer to earlier sources.
///
/// This is also the shape of the YAML config file:
///
/// ```yaml
/// width: 800
/// height: 480
/// color_levels: 4
/// method: stucki
/// ```
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Option<u32>,

    #[serde(default)]
    pub color_levels: Option<u32>,

    #[serde(default)]
    pub method: Option<String>,
}

impl ConfigLayer {
    /// Read a YAML layer from disk.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Collect the `GEINK_*` variables through `lookup`.
    ///
    /// Integers that fail to parse are logged and skipped, leaving the
    /// earlier value in place. The method name is kept verbatim and
    /// validated later with the other layers.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let int = |key: &str| -> Option<u32> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "Could not parse integer, ignoring");
                    None
                }
            }
        };

        Self {
            width: int(WIDTH_ENV),
            height: int(HEIGHT_ENV),
            color_levels: int(LEVELS_ENV),
            method: lookup(METHOD_ENV).filter(|m| !m.trim().is_empty()),
        }
    }

    /// Overlay `over` on top of `self`.
    pub fn merge(self, over: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            width: over.width.or(self.width),
            height: over.height.or(self.height),
            color_levels: over.color_levels.or(self.color_levels),
            method: over.method.or(self.method),
        }
    }
}

/// Resolved, validated settings shared by every pipeline stage.
///
/// Built once at startup and never mutated; batch workers borrow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    width: u32,
    height: u32,
    levels: Levels,
    kernel: KernelId,
}

impl AppConfig {
    /// Validate explicit values.
    pub fn new(width: u32, height: u32, levels: u32, kernel: KernelId) -> Result<Self, ConfigError> {
        if width == 0 {
            return Err(ConfigError::InvalidDimension {
                field: "width",
                value: width,
            });
        }
        if height == 0 {
            return Err(ConfigError::InvalidDimension {
                field: "height",
                value: height,
            });
        }
        Ok(Self {
            width,
            height,
            levels: Levels::new(levels)?,
            kernel,
        })
    }

    /// Resolve from the process environment.
    ///
    /// Order, later wins: defaults, YAML file (`config_path` or
    /// `GEINK_CONFIG`), `GEINK_*` variables, then `cli`.
    pub fn resolve(config_path: Option<&Path>, cli: ConfigLayer) -> Result<Self, ConfigError> {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let file = match path {
            Some(path) => {
                let layer = ConfigLayer::from_file(&path)?;
                tracing::debug!(path = %path.display(), "Loaded config file");
                layer
            }
            None => ConfigLayer::default(),
        };
        let env = ConfigLayer::from_env(|key| std::env::var(key).ok());
        Self::from_layers(file, env, cli)
    }

    /// Merge already collected layers over the defaults and validate.
    pub fn from_layers(
        file: ConfigLayer,
        env: ConfigLayer,
        cli: ConfigLayer,
    ) -> Result<Self, ConfigError> {
        let merged = file.merge(env).merge(cli);
        let kernel = match merged.method.as_deref() {
            Some(name) => name.parse::<KernelId>()?,
            None => KernelId::default(),
        };
        let config = Self::new(
            merged.width.unwrap_or(DEFAULT_TARGET_WIDTH),
            merged.height.unwrap_or(DEFAULT_TARGET_HEIGHT),
            merged.color_levels.unwrap_or(DEFAULT_COLOR_LEVELS),
            kernel,
        )?;
        tracing::debug!(
            width = config.width,
            height = config.height,
            levels = config.levels.count(),
            method = %config.kernel,
            "Resolved configuration"
        );
        Ok(config)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn levels(&self) -> Levels {
        self.levels
    }

    #[inline]
    pub fn kernel(&self) -> KernelId {
        self.kernel
    }

    /// Byte length of one packed image at the target size.
    pub fn artifact_len(&self) -> usize {
        packed_len(
            self.width as usize,
            self.height as usize,
            self.levels.bits_per_pixel(),
        )
    }

    pub fn encoder(&self) -> EpdEncoder {
        EpdEncoder::new(self.levels).kernel(self.kernel)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_TARGET_WIDTH,
            height: DEFAULT_TARGET_HEIGHT,
            levels: Levels::BW,
            kernel: KernelId::FloydSteinberg,
        }
    }
}
