use crate::translator_messages::translator_errors::TranslatorError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "j2cpp.toml";
pub const HEADER_EXTENSION: &str = "h";
pub const IMPL_EXTENSION: &str = "cpp";

/// Translator options read from `j2cpp.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub output_dir: PathBuf,

    /// Header included first by every generated header. Declares the runtime hooks
    /// (`::join`, `::lit`, `::class_`, `lock`/`unlock`).
    pub preamble_header: String,

    pub indent_width: usize,

    // Generic type parameters and arguments are erased, this keeps them as comments
    pub annotate_generics: bool,
    pub annotate_throws: bool,

    /// Put a "Generated from <source>" banner at the top of every file
    pub source_banner: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            output_dir: PathBuf::from("cpp"),
            preamble_header: String::from("forward.h"),
            indent_width: 4,
            annotate_generics: true,
            annotate_throws: true,
            source_banner: true,
        }
    }
}

impl Settings {
    pub fn from_toml_str(source: &str) -> Result<Settings, TranslatorError> {
        let settings: Settings = toml::from_str(source)
            .map_err(|e| TranslatorError::config_error(format!("Invalid {}: {}", CONFIG_FILE_NAME, e)))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Settings, TranslatorError> {
        let source = fs::read_to_string(path).map_err(|e| {
            TranslatorError::file_error(path, format!("Failed to read config file: {}", e))
        })?;

        Settings::from_toml_str(&source).map_err(|e| e.with_path(path))
    }

    /// Loads `j2cpp.toml` from the directory if there is one
    pub fn load_from_dir(dir: &Path) -> Result<Settings, TranslatorError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Settings::load(&path)
        } else {
            Ok(Settings::default())
        }
    }

    fn validate(&self) -> Result<(), TranslatorError> {
        if self.indent_width == 0 || self.indent_width > 16 {
            return Err(TranslatorError::config_error(format!(
                "indent_width must be between 1 and 16, got {}",
                self.indent_width
            )));
        }

        if self.preamble_header.trim().is_empty() {
            return Err(TranslatorError::config_error(
                "preamble_header can't be empty",
            ));
        }

        Ok(())
    }

    pub fn indent_unit(&self) -> String {
        " ".repeat(self.indent_width)
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
