//! Language settings loading and their effect on sessions.

use rstest::rstest;
use semfacade::config::{LanguageFeature, LanguageSettings, SettingsError, TargetPlatform};

#[test]
fn test_settings_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{
            "languageVersion": "2.1",
            "enabledFeatures": ["JavaSyntheticProperties"],
            "defaultImports": ["kotlin"],
            "targetPlatform": "Js"
        }"#,
    )
    .unwrap();
    let settings = LanguageSettings::read_from_file(&path).unwrap();
    assert_eq!(settings.version(), Some((2, 1)));
    assert_eq!(settings.target_platform, TargetPlatform::Js);
    assert!(settings.supports(LanguageFeature::JavaSyntheticProperties));
    assert!(!settings.supports(LanguageFeature::AllowSealedInheritorsInDifferentFilesOfSamePackage));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = LanguageSettings::read_from_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(SettingsError::Io(_))));
}

#[rstest]
#[case("2")]
#[case("two.zero")]
#[case("")]
fn test_bad_version_rejected(#[case] version: &str) {
    let json = format!(r#"{{"languageVersion": "{version}", "targetPlatform": "Jvm"}}"#);
    assert!(matches!(
        LanguageSettings::from_json(&json),
        Err(SettingsError::UnsupportedVersion(_))
    ));
}

#[rstest]
#[case(LanguageFeature::AllowSealedInheritorsInDifferentFilesOfSamePackage)]
#[case(LanguageFeature::JavaSyntheticProperties)]
fn test_features_survive_json(#[case] feature: LanguageFeature) {
    let settings = LanguageSettings::new("2.0", TargetPlatform::Jvm).with_feature(feature);
    let json = settings.to_json().unwrap();
    assert!(LanguageSettings::from_json(&json).unwrap().supports(feature));
}
