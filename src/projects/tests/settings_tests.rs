//! Tests for loading and validating j2cpp.toml.

use super::{CONFIG_FILE_NAME, Settings};
use crate::translator_messages::translator_errors::ErrorType;
use std::fs;
use std::path::PathBuf;

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let settings = Settings::load_from_dir(dir.path()).expect("defaults should load");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.preamble_header, "forward.h");
    assert_eq!(settings.indent_width, 4);
}

#[test]
fn every_key_is_optional() {
    let settings = Settings::from_toml_str("indent_width = 2\nannotate_throws = false\n")
        .expect("partial config should parse");

    assert_eq!(settings.indent_width, 2);
    assert!(!settings.annotate_throws);
    assert!(settings.annotate_generics);
    assert_eq!(settings.output_dir, PathBuf::from("cpp"));
    assert_eq!(settings.indent_unit(), "  ");
}

#[test]
fn config_file_next_to_the_program_is_loaded() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "output_dir = \"generated\"\npreamble_header = \"runtime/prelude.h\"\nsource_banner = false\n",
    )
    .expect("config should be written");

    let settings = Settings::load_from_dir(dir.path()).expect("config should load");
    assert_eq!(settings.output_dir, PathBuf::from("generated"));
    assert_eq!(settings.preamble_header, "runtime/prelude.h");
    assert!(!settings.source_banner);
}

#[test]
fn unknown_keys_are_config_errors() {
    let error = Settings::from_toml_str("indent = 4\n").expect_err("unknown key should fail");
    assert_eq!(error.error_type, ErrorType::Config);
}

#[test]
fn out_of_range_values_are_rejected() {
    let error = Settings::from_toml_str("indent_width = 0\n").expect_err("zero indent should fail");
    assert_eq!(error.error_type, ErrorType::Config);
    assert!(error.msg.contains("indent_width"));

    let error = Settings::from_toml_str("preamble_header = \"  \"\n")
        .expect_err("empty preamble should fail");
    assert!(error.msg.contains("preamble_header"));
}

#[test]
fn load_errors_carry_the_config_path() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "indent_width = \"wide\"\n").expect("config should be written");

    let error = Settings::load(&path).expect_err("wrong type should fail");
    assert_eq!(error.error_type, ErrorType::Config);
    assert_eq!(error.path, Some(path));
}

#[test]
fn downcasts_cannot_be_configured() {
    let error = Settings::from_toml_str("checked_cast = \"static_cast\"\n")
        .expect_err("cast spelling is not a setting");
    assert_eq!(error.error_type, ErrorType::Config);
    assert!(error.msg.contains("checked_cast"));
}
