use crate::frontend_model::syntax::TypeDeclaration;
use crate::frontend_model::types::TypeTable;
use crate::frontend_model::variables::VariableTable;
use crate::translator_messages::translator_errors::TranslatorError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    #[serde(default)]
    pub source_path: Option<String>,
    pub types: Vec<TypeDeclaration>,
}

/// Everything the translator reads: the bindings and the bound syntax trees
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub types: TypeTable,
    pub variables: VariableTable,
    #[serde(default)]
    pub units: Vec<CompilationUnit>,
}

impl Program {
    pub fn new(types: TypeTable, variables: VariableTable) -> Self {
        Program {
            types,
            variables,
            units: Vec::new(),
        }
    }

    pub fn from_json(source: &str) -> Result<Program, TranslatorError> {
        let mut program: Program = serde_json::from_str(source).map_err(|e| {
            TranslatorError::input_error(format!("Program document is not valid: {}", e))
        })?;

        program.types.rebuild_index();
        Ok(program)
    }

    pub fn load(path: &Path) -> Result<Program, TranslatorError> {
        let source = fs::read_to_string(path).map_err(|e| {
            TranslatorError::file_error(path, format!("Failed to read program document: {}", e))
        })?;

        Program::from_json(&source).map_err(|e| e.with_path(path))
    }

    pub fn to_json(&self) -> Result<String, TranslatorError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            TranslatorError::compiler_error(format!("Failed to serialize program: {}", e))
        })
    }
}
