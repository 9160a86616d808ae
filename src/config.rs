//! Language settings a session resolves against.
//!
//! Settings are plain data. The host is constructed with an explicit
//! [`LanguageSettings`] value and every session captures the settings that
//! were current when it opened, so a policy change never leaks into a
//! session that is already running.
//!
//! Settings can be loaded from JSON:
//!
//! ```json
//! {
//!   "languageVersion": "2.0",
//!   "enabledFeatures": ["AllowSealedInheritorsInDifferentFilesOfSamePackage"],
//!   "defaultImports": ["kotlin", "kotlin.collections"],
//!   "targetPlatform": "Jvm"
//! }
//! ```

use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::base::FqName;

/// Errors produced while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported language version: {0}")]
    UnsupportedVersion(String),
}

/// Opt-in language features the facade reads at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageFeature {
    /// Subclasses of a sealed class may live in any file of its package
    AllowSealedInheritorsInDifferentFilesOfSamePackage,
    /// `getFoo()` of platform classes is visible as property `foo`
    JavaSyntheticProperties,
}

/// Platform the analyzed code targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetPlatform {
    Jvm,
    Js,
    Native,
    Common,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSettings {
    pub language_version: String,
    #[serde(default)]
    pub enabled_features: FxHashSet<LanguageFeature>,
    #[serde(default)]
    pub default_imports: Vec<FqName>,
    pub target_platform: TargetPlatform,
}

impl LanguageSettings {
    /// Settings with no optional feature enabled.
    pub fn new(language_version: impl Into<String>, target_platform: TargetPlatform) -> Self {
        Self {
            language_version: language_version.into(),
            enabled_features: FxHashSet::default(),
            default_imports: Vec::new(),
            target_platform,
        }
    }

    pub fn with_feature(mut self, feature: LanguageFeature) -> Self {
        self.enabled_features.insert(feature);
        self
    }

    pub fn with_default_import(mut self, package: FqName) -> Self {
        self.default_imports.push(package);
        self
    }

    pub fn supports(&self, feature: LanguageFeature) -> bool {
        self.enabled_features.contains(&feature)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: LanguageSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parsed `major.minor` language version.
    pub fn version(&self) -> Option<(u32, u32)> {
        let (major, minor) = self.language_version.split_once('.')?;
        Some((major.parse().ok()?, minor.parse().ok()?))
    }

    fn validate(&self) -> Result<(), SettingsError> {
        match self.version() {
            Some(_) => Ok(()),
            None => Err(SettingsError::UnsupportedVersion(
                self.language_version.clone(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let settings = LanguageSettings::from_json(
            r#"{
                "languageVersion": "1.9",
                "enabledFeatures": ["AllowSealedInheritorsInDifferentFilesOfSamePackage"],
                "defaultImports": ["kotlin"],
                "targetPlatform": "Jvm"
            }"#,
        )
        .unwrap();
        assert_eq!(settings.version(), Some((1, 9)));
        assert!(settings.supports(LanguageFeature::AllowSealedInheritorsInDifferentFilesOfSamePackage));
        assert!(!settings.supports(LanguageFeature::JavaSyntheticProperties));
        assert_eq!(settings.default_imports, vec![FqName::new("kotlin")]);
    }

    #[test]
    fn test_missing_features_default_to_none() {
        let settings =
            LanguageSettings::from_json(r#"{"languageVersion": "2.0", "targetPlatform": "Js"}"#)
                .unwrap();
        assert!(settings.enabled_features.is_empty());
        assert_eq!(settings.target_platform, TargetPlatform::Js);
    }

    #[test]
    fn test_bad_version_rejected() {
        let err = LanguageSettings::from_json(r#"{"languageVersion": "latest", "targetPlatform": "Jvm"}"#)
            .unwrap_err();
        assert!(matches!(err, SettingsError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let settings = LanguageSettings::new("2.0", TargetPlatform::Jvm)
            .with_feature(LanguageFeature::JavaSyntheticProperties)
            .with_default_import(FqName::new("kotlin.collections"));
        let json = settings.to_json().unwrap();
        assert_eq!(LanguageSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"languageVersion": "2.1", "targetPlatform": "Native"}"#).unwrap();
        let settings = LanguageSettings::read_from_file(&path).unwrap();
        assert_eq!(settings.target_platform, TargetPlatform::Native);
    }
}
