//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` +
//! `config.<env>.toml` + `APP_*` env vars (nested keys split on `__`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::scan::ScanOptions;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    /// Wrap an already assembled figment, e.g. defaults merged with an inline TOML string.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extract and validate the typed settings.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scan: ScanOptions,
    pub thumbnail: ThumbnailSettings,
    pub classify: ClassifySettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.thumbnail.max_pixel_size == 0 {
            return Err(Error::InvalidConfig("thumbnail.max_pixel_size must be greater than zero".into()));
        }
        if self.classify.sidecar_suffix.trim().is_empty() {
            return Err(Error::InvalidConfig("classify.sidecar_suffix must not be empty".into()));
        }
        let c = &self.classify.categories;
        check_unit("classify.categories.precision", c.precision)?;
        check_unit("classify.categories.min_recall", c.min_recall)?;
        check_unit("classify.categories.fallback_min_confidence", c.fallback_min_confidence)?;
        let s = &self.classify.search_terms;
        check_unit("classify.search_terms.recall", s.recall)?;
        check_unit("classify.search_terms.min_precision", s.min_precision)?;
        check_unit("classify.search_terms.fallback_min_confidence", s.fallback_min_confidence)?;
        Ok(())
    }
}

fn check_unit(key: &str, value: f32) -> Result<(), Error> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("{} must be within [0, 1], got {}", key, value)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailSettings {
    pub enabled: bool,
    pub max_pixel_size: u32,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self { enabled: true, max_pixel_size: 256 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifySettings {
    /// Observations for `photo.jpg` are read from `photo.jpg.<sidecar_suffix>`.
    pub sidecar_suffix: String,
    pub categories: CategoryThresholds,
    pub search_terms: SearchTermThresholds,
}

impl Default for ClassifySettings {
    fn default() -> Self {
        Self {
            sidecar_suffix: "labels.json".to_string(),
            categories: CategoryThresholds::default(),
            search_terms: SearchTermThresholds::default(),
        }
    }
}

/// High-precision cut: a label must reach `min_recall` at `precision`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryThresholds {
    pub precision: f32,
    pub min_recall: f32,
    pub fallback_min_confidence: f32,
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        Self { precision: 0.9, min_recall: 0.01, fallback_min_confidence: 0.5 }
    }
}

/// High-recall cut: a label must reach `min_precision` at `recall`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchTermThresholds {
    pub recall: f32,
    pub min_precision: f32,
    pub fallback_min_confidence: f32,
}

impl Default for SearchTermThresholds {
    fn default() -> Self {
        Self { recall: 0.7, min_precision: 0.01, fallback_min_confidence: 0.1 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_toml(toml: &str) -> Config {
        Config::from_figment(Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(toml)))
    }

    #[test]
    fn defaults_match_vision_thresholds() {
        let settings = with_toml("").settings().expect("settings");
        assert_eq!(settings.classify.categories.precision, 0.9);
        assert_eq!(settings.classify.categories.min_recall, 0.01);
        assert_eq!(settings.classify.search_terms.recall, 0.7);
        assert_eq!(settings.classify.search_terms.min_precision, 0.01);
        assert_eq!(settings.thumbnail.max_pixel_size, 256);
    }

    #[test]
    fn toml_overrides_nested_keys() {
        let config = with_toml("[thumbnail]\nmax_pixel_size = 128\n[classify.search_terms]\nrecall = 0.5\n");
        let settings = config.settings().expect("settings");
        assert_eq!(settings.thumbnail.max_pixel_size, 128);
        assert_eq!(settings.classify.search_terms.recall, 0.5);
        assert_eq!(settings.classify.search_terms.min_precision, 0.01);
        let size: u32 = config.get("thumbnail.max_pixel_size").expect("get");
        assert_eq!(size, 128);
    }

    #[test]
    fn out_of_unit_threshold_is_rejected() {
        let err = with_toml("[classify.categories]\nprecision = 1.5\n").settings().unwrap_err();
        assert!(err.to_string().contains("classify.categories.precision"));
    }

    #[test]
    fn zero_thumbnail_size_is_rejected() {
        assert!(with_toml("[thumbnail]\nmax_pixel_size = 0\n").settings().is_err());
    }

    #[test]
    fn load_layers_files_then_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[thumbnail]\nmax_pixel_size = 64\nenabled = false\n")?;
            jail.create_file("config.test.toml", "[classify.categories]\nprecision = 0.8\n")?;
            jail.set_env("RUST_ENV", "test");
            jail.set_env("APP_THUMBNAIL__MAX_PIXEL_SIZE", "128");

            let settings = Config::load().and_then(|c| c.settings()).map_err(|e| e.to_string())?;
            assert_eq!(settings.thumbnail.max_pixel_size, 128);
            assert!(!settings.thumbnail.enabled);
            assert_eq!(settings.classify.categories.precision, 0.8);
            assert_eq!(settings.classify.search_terms.recall, 0.7);
            Ok(())
        });
    }

    #[test]
    fn load_rejects_invalid_env_override() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("APP_CLASSIFY__CATEGORIES__PRECISION", "2.0");
            assert!(Config::load().is_err());
            Ok(())
        });
    }

    #[test]
    fn resolve_with_base_keeps_absolute_paths() {
        let base = Path::new("/base");
        assert_eq!(resolve_with_base(base, "pics"), PathBuf::from("/base/pics"));
        assert_eq!(resolve_with_base(base, "/abs/pics"), PathBuf::from("/abs/pics"));
    }
}
