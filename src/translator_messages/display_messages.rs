use crate::translator_messages::translator_errors::{ErrorType, TranslatorError};
use saying::say;
use std::env;
use std::path::{Path, PathBuf};

fn normalize_display_path(path: &Path) -> PathBuf {
    let path_string = path.to_string_lossy();
    if let Some(stripped) = path_string.strip_prefix(r"\\?\") {
        return PathBuf::from(stripped);
    }

    path.to_path_buf()
}

fn relative_display_path(scope: &Path) -> String {
    let normalized_scope = normalize_display_path(scope);

    match env::current_dir() {
        Ok(dir) => {
            let normalized_dir = normalize_display_path(&dir);
            normalized_scope
                .strip_prefix(&normalized_dir)
                .unwrap_or(&normalized_scope)
                .to_string_lossy()
                .to_string()
        }
        Err(_) => normalized_scope.to_string_lossy().to_string(),
    }
}

pub fn print_translator_errors(errors: &[TranslatorError]) {
    for err in errors {
        print_formatted_error(err);
    }

    let count = errors.len();
    say!(Red "\n", Bright count, Red " error(s) stopped the translation");
}

/// The banner line and the one-line explanation printed above an error message
fn error_heading(error_type: ErrorType) -> (&'static str, Option<&'static str>) {
    match error_type {
        ErrorType::UnsupportedConstruct => (
            "No C++ translation for this construct",
            Some("Rewrite it in the Java source or translate the type by hand"),
        ),
        ErrorType::BindingGap => (
            "Unresolved binding",
            Some("The front end left a reference unresolved or inconsistent"),
        ),
        ErrorType::Input => ("Malformed program document", None),
        ErrorType::File => ("Could not read or write", None),
        ErrorType::Config => (
            "Invalid j2cpp.toml",
            Some("A translator setting is unknown or out of range"),
        ),
        ErrorType::Compiler => (
            "Internal translator error",
            Some("The translator reached a state it should not; please report it"),
        ),
    }
}

pub fn print_formatted_error(e: &TranslatorError) {
    let relative_dir = e
        .path
        .as_deref()
        .map(relative_display_path)
        .unwrap_or_default();

    let type_name = e.type_name.clone().unwrap_or_default();
    let (banner, explanation) = error_heading(e.error_type);

    say!("\n");
    match (type_name.is_empty(), relative_dir.is_empty()) {
        (false, _) => {
            say!(Red banner, Dark Magenta " in ", type_name);
        }
        (true, false) => {
            say!(Red banner, Dark Magenta " at ", relative_dir);
        }
        (true, true) => {
            say!(Red banner);
        }
    }

    if let Some(explanation) = explanation {
        say!(Dark Yellow explanation);
    }

    let msg = &e.msg;
    say!(Red msg);
}
