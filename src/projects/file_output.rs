use crate::backends::cpp::EmittedUnit;
use crate::translator_messages::translator_errors::TranslatorError;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes every unit's header and implementation under `output_root`.
///
/// A unit is only visible once both files are in place. If the implementation can't be
/// persisted the freshly written header is removed again.
pub fn write_units(output_root: &Path, units: &[EmittedUnit]) -> Result<usize, TranslatorError> {
    let mut files_written = 0;

    for unit in units {
        write_unit(output_root, unit)?;
        files_written += 2;
    }

    Ok(files_written)
}

pub fn write_unit(output_root: &Path, unit: &EmittedUnit) -> Result<(), TranslatorError> {
    let header_path = output_root.join(&unit.header_path);
    let impl_path = output_root.join(&unit.impl_path);

    let staged_header = stage_file(&header_path, &unit.header)?;
    let staged_impl = stage_file(&impl_path, &unit.implementation)?;

    staged_header.persist(&header_path).map_err(|e| {
        TranslatorError::file_error(&header_path, format!("Failed to write header: {}", e.error))
    })?;

    if let Err(e) = staged_impl.persist(&impl_path) {
        let cleanup = fs::remove_file(&header_path);
        return Err(implementation_failure(&impl_path, &header_path, &e.error, cleanup));
    }

    Ok(())
}

// Mentions the header too when it could not be removed again
fn implementation_failure(
    impl_path: &Path,
    header_path: &Path,
    persist_error: &io::Error,
    cleanup: io::Result<()>,
) -> TranslatorError {
    let mut msg = format!("Failed to write implementation: {}", persist_error);

    if let Err(e) = cleanup {
        msg.push_str(&format!(
            ". The header at {} could not be removed either: {}",
            header_path.display(),
            e
        ));
    }

    TranslatorError::file_error(impl_path, msg)
}

// Writes the contents to a temporary file next to the destination
fn stage_file(destination: &Path, contents: &str) -> Result<NamedTempFile, TranslatorError> {
    let Some(parent) = destination.parent() else {
        return Err(TranslatorError::file_error(
            destination,
            "Output path has no parent directory",
        ));
    };

    fs::create_dir_all(parent).map_err(|e| {
        TranslatorError::file_error(parent, format!("Failed to create output directory: {}", e))
    })?;

    let mut staged = NamedTempFile::new_in(parent).map_err(|e| {
        TranslatorError::file_error(parent, format!("Failed to create temporary file: {}", e))
    })?;

    staged
        .write_all(contents.as_bytes())
        .and_then(|_| staged.flush())
        .map_err(|e| {
            TranslatorError::file_error(destination, format!("Failed to stage output: {}", e))
        })?;

    Ok(staged)
}

#[cfg(test)]
#[path = "tests/file_output_tests.rs"]
mod tests;
