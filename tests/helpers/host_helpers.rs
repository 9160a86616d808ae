//! Host and session setup for integration tests.

use semfacade::base::{ClassId, FileId};
use semfacade::config::{LanguageFeature, LanguageSettings, TargetPlatform};
use semfacade::hir::{AnalysisSession, Symbol};
use semfacade::ide::{AnalysisHost, symbol_provider};
use semfacade::model::builtins;

/// JVM settings with the standard default imports.
pub fn jvm_settings() -> LanguageSettings {
    builtins::default_imports()
        .into_iter()
        .fold(LanguageSettings::new("2.0", TargetPlatform::Jvm), |settings, import| {
            settings.with_default_import(import)
        })
}

pub fn settings_with(features: &[LanguageFeature]) -> LanguageSettings {
    features
        .iter()
        .fold(jvm_settings(), |settings, feature| settings.with_feature(*feature))
}

/// A host over the builtin library holding `files` (path, text).
pub fn host_from_sources(files: &[(&str, &str)], settings: LanguageSettings) -> AnalysisHost {
    let mut host = AnalysisHost::with_builtins(settings);
    for (path, text) in files {
        host.set_file_text(path, text);
    }
    host
}

/// A host and an open session over `files`.
pub fn session_from_sources(files: &[(&str, &str)]) -> (AnalysisHost, AnalysisSession) {
    let mut host = host_from_sources(files, jvm_settings());
    let session = host.analysis_session();
    for file in session.files() {
        assert!(file.errors().is_empty(), "parse errors in '{}': {:?}", file.path(), file.errors());
    }
    (host, session)
}

pub fn file_id(session: &AnalysisSession, path: &str) -> FileId {
    session
        .file_by_path(path)
        .unwrap_or_else(|| panic!("no file at '{path}'"))
        .id()
}

/// Class symbol for `class_id` in `pkg/Outer.Inner` form.
pub fn class(session: &AnalysisSession, class_id: &str) -> Symbol {
    symbol_provider::class_symbol_by_id(session, &ClassId::parse(class_id))
        .unwrap_or_else(|| panic!("class '{class_id}' not found"))
}

/// Offset of the last occurrence of `needle` in `text`.
pub fn offset_of(text: &str, needle: &str) -> semfacade::base::TextSize {
    let offset = text.rfind(needle).unwrap_or_else(|| panic!("'{needle}' not in source"));
    semfacade::base::TextSize::from(offset as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_sources_indexes_files() {
        let (_host, session) = session_from_sources(&[("a.kt", "class A")]);
        assert_eq!(file_id(&session, "a.kt"), FileId::new(0));
    }
}
