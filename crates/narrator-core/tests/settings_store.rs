//! Settings store round trips against a temporary directory.

use narrator_core::{
    ExtractMode, ExtractSettingsPatch, Fallback, PersonaKey, SettingsError, SettingsStore,
    StoreError,
};
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> SettingsStore {
    SettingsStore::new(dir.path().join("nested").join("settings.json"))
}

#[test]
fn test_missing_file_loads_defaults() {
    let dir = TempDir::new().unwrap();
    let config = store_in(&dir).load().unwrap();
    assert_eq!(config.settings.tts_voice, "alex");
    assert!(config.personas.is_empty());
}

#[test]
fn test_update_settings_persists() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store
        .update_settings(|s| s.set_field("ttsVoice", "bella"))
        .unwrap();

    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.settings.tts_voice, "bella");
    assert!(!store.path().with_extension("json.tmp").exists());
}

#[test]
fn test_invalid_update_is_not_written() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let err = store
        .update_settings(|s| s.set_field("ttsSpeed", "9"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Invalid(SettingsError::InvalidSpeed(_))
    ));
    assert!(!store.path().exists());
}

#[test]
fn test_persona_patch_merge_and_reset() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let key = PersonaKey::from_raw("persona:42");

    store
        .save_persona_patch(
            &key,
            &ExtractSettingsPatch {
                mode: Some(ExtractMode::Marked),
                start: Some("[".into()),
                ..ExtractSettingsPatch::default()
            },
        )
        .unwrap();
    let merged = store
        .save_persona_patch(
            &key,
            &ExtractSettingsPatch {
                fallback: Some(Fallback::Empty),
                ..ExtractSettingsPatch::default()
            },
        )
        .unwrap();

    assert_eq!(merged.mode, Some(ExtractMode::Marked));
    assert_eq!(merged.start.as_deref(), Some("["));
    assert_eq!(merged.fallback, Some(Fallback::Empty));

    let config = store.load().unwrap();
    let params = config.playback_params(&key);
    assert_eq!(params.extract.start, "[");
    // end falls back to the global mark
    assert_eq!(params.extract.end, "）");
    assert_eq!(params.persona_key, key);

    assert!(store.reset_persona(&key).unwrap());
    assert!(!store.reset_persona(&key).unwrap());
    assert!(store.load().unwrap().persona(&key).is_empty());
}

#[test]
fn test_malformed_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = SettingsStore::new(path).load().unwrap_err();
    assert!(matches!(err, StoreError::Json(_)));
}
