//! [`Configuration`]: the enumerated, serde-serializable options a
//! [`crate::filesystem::FileSystem`] is built from (spec §6
//! "Configuration"). Grounded on the teacher's plain-struct option
//! parsing (`src/message_types.rs`'s procedure argument structs), adapted
//! from wire-decoded fields to a builder over named options, the way
//! `examples/shadow_fs/config.rs` (`toml`-deserialized options struct)
//! lays its config out.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::path::PathNormalization;
use crate::tree::AttributeValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathTypeKind {
    Unix,
    Windows,
    OsX,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    Links,
    SymbolicLinks,
    FileChannel,
    SecureDirectoryStream,
}

/// `polling(interval)` is currently the only supported watch-service
/// configuration (spec is strictly poll-based — "Non-goals: real-time
/// notification").
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WatchServiceConfiguration {
    pub interval_millis: u64,
}

impl WatchServiceConfiguration {
    pub fn polling(interval: Duration) -> WatchServiceConfiguration {
        WatchServiceConfiguration { interval_millis: interval.as_millis() as u64 }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_millis)
    }
}

/// Every knob spec §6 lists under "Configuration". Constructed with
/// [`Configuration::builder`] and one of the flavor presets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub path_type: PathTypeKind,
    pub roots: Vec<String>,
    pub working_directory: String,
    pub name_canonical_normalization: PathNormalization,
    pub name_display_normalization: PathNormalization,
    pub path_equality_uses_canonical_form: bool,
    pub block_size: u64,
    pub max_size: u64,
    pub max_cache_size: i64,
    pub attribute_views: Vec<String>,
    pub default_attribute_values: HashMap<String, AttributeValue>,
    pub watch_service_configuration: WatchServiceConfiguration,
    pub supported_features: Vec<Feature>,
}

impl Configuration {
    pub fn builder(path_type: PathTypeKind) -> ConfigurationBuilder {
        ConfigurationBuilder::new(path_type)
    }

    /// A single root `/`, a `/work` working directory, case-sensitive
    /// names, all links enabled: `java.nio.file.Files`' default `unix()`
    /// preset.
    pub fn unix() -> Configuration {
        Configuration::builder(PathTypeKind::Unix)
            .roots(["/"])
            .working_directory("/work")
            .build()
    }

    /// Unix plus NFD canonical normalization and ASCII case folding,
    /// matching HFS+'s on-disk behavior.
    pub fn os_x() -> Configuration {
        Configuration::builder(PathTypeKind::OsX)
            .roots(["/"])
            .working_directory("/work")
            .name_canonical_normalization(PathNormalization::nfd() | PathNormalization::case_fold_ascii())
            .name_display_normalization(PathNormalization::nfc())
            .build()
    }

    /// A single `C:\` root, ASCII case folding for canonical form, no
    /// `SECURE_DIRECTORY_STREAM` (Windows directory streams aren't secure
    /// in the java.nio sense).
    pub fn windows() -> Configuration {
        Configuration::builder(PathTypeKind::Windows)
            .roots(["C:\\"])
            .working_directory("C:\\work")
            .name_canonical_normalization(PathNormalization::case_fold_ascii())
            .build()
    }
}

pub struct ConfigurationBuilder {
    path_type: PathTypeKind,
    roots: Vec<String>,
    working_directory: String,
    name_canonical_normalization: PathNormalization,
    name_display_normalization: PathNormalization,
    path_equality_uses_canonical_form: bool,
    block_size: u64,
    max_size: u64,
    max_cache_size: i64,
    attribute_views: Vec<String>,
    default_attribute_values: HashMap<String, AttributeValue>,
    watch_service_configuration: WatchServiceConfiguration,
    supported_features: Vec<Feature>,
}

impl ConfigurationBuilder {
    fn new(path_type: PathTypeKind) -> ConfigurationBuilder {
        ConfigurationBuilder {
            path_type,
            roots: Vec::new(),
            working_directory: String::new(),
            name_canonical_normalization: PathNormalization::none(),
            name_display_normalization: PathNormalization::none(),
            path_equality_uses_canonical_form: true,
            block_size: 8192,
            max_size: u64::MAX,
            max_cache_size: -1,
            attribute_views: vec!["basic".to_string()],
            default_attribute_values: HashMap::new(),
            watch_service_configuration: WatchServiceConfiguration::polling(Duration::from_millis(5000)),
            supported_features: vec![Feature::Links, Feature::SymbolicLinks, Feature::FileChannel, Feature::SecureDirectoryStream],
        }
    }

    pub fn roots<I: IntoIterator<Item = S>, S: Into<String>>(mut self, roots: I) -> Self {
        self.roots = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn working_directory(mut self, dir: impl Into<String>) -> Self {
        self.working_directory = dir.into();
        self
    }

    pub fn name_canonical_normalization(mut self, norm: PathNormalization) -> Self {
        self.name_canonical_normalization = norm;
        self
    }

    pub fn name_display_normalization(mut self, norm: PathNormalization) -> Self {
        self.name_display_normalization = norm;
        self
    }

    pub fn path_equality_uses_canonical_form(mut self, value: bool) -> Self {
        self.path_equality_uses_canonical_form = value;
        self
    }

    pub fn block_size(mut self, size: u64) -> Self {
        self.block_size = size;
        self
    }

    pub fn max_size(mut self, size: u64) -> Self {
        self.max_size = size;
        self
    }

    pub fn max_cache_size(mut self, size: i64) -> Self {
        self.max_cache_size = size;
        self
    }

    pub fn attribute_views<I: IntoIterator<Item = S>, S: Into<String>>(mut self, views: I) -> Self {
        self.attribute_views = views.into_iter().map(Into::into).collect();
        self
    }

    pub fn default_attribute_value(mut self, spec: impl Into<String>, value: AttributeValue) -> Self {
        self.default_attribute_values.insert(spec.into(), value);
        self
    }

    pub fn watch_service_configuration(mut self, config: WatchServiceConfiguration) -> Self {
        self.watch_service_configuration = config;
        self
    }

    pub fn supported_features<I: IntoIterator<Item = Feature>>(mut self, features: I) -> Self {
        self.supported_features = features.into_iter().collect();
        self
    }

    pub fn build(self) -> Configuration {
        Configuration {
            path_type: self.path_type,
            roots: self.roots,
            working_directory: self.working_directory,
            name_canonical_normalization: self.name_canonical_normalization,
            name_display_normalization: self.name_display_normalization,
            path_equality_uses_canonical_form: self.path_equality_uses_canonical_form,
            block_size: self.block_size,
            max_size: self.max_size,
            max_cache_size: self.max_cache_size,
            attribute_views: self.attribute_views,
            default_attribute_values: self.default_attribute_values,
            watch_service_configuration: self.watch_service_configuration,
            supported_features: self.supported_features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_preset_has_one_root_and_defaults() {
        let config = Configuration::unix();
        assert_eq!(config.roots, vec!["/".to_string()]);
        assert_eq!(config.block_size, 8192);
        assert_eq!(config.max_cache_size, -1);
    }

    #[test]
    fn builder_overrides_apply() {
        let config = Configuration::builder(PathTypeKind::Unix)
            .roots(["/"])
            .working_directory("/work")
            .block_size(4096)
            .max_cache_size(0)
            .build();
        assert_eq!(config.block_size, 4096);
        assert_eq!(config.max_cache_size, 0);
    }
}
