use std::fmt;
use std::path::{Path, PathBuf};

// Adds more information to the TranslatorError
// So the driver knows which kind of failure stopped a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// A Java construct with no C++ lowering (yet)
    UnsupportedConstruct,

    /// The front end handed over an unresolved or inconsistent binding
    BindingGap,

    /// The front-end program document could not be read
    Input,
    File,
    Config,

    /// Internal bug, not the user's fault
    Compiler,
}

pub fn error_type_to_str(e_type: &ErrorType) -> &'static str {
    match e_type {
        ErrorType::UnsupportedConstruct => "Unsupported Construct",
        ErrorType::BindingGap => "Binding Gap",
        ErrorType::Input => "Malformed Input",
        ErrorType::File => "File Error",
        ErrorType::Config => "Malformed Config",
        ErrorType::Compiler => "Translator Bug",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorError {
    pub msg: String,
    pub error_type: ErrorType,

    // Java qualified name of the type being translated when the error happened.
    // Filled in by the driver, the emitters only know the message.
    pub type_name: Option<String>,
    pub path: Option<PathBuf>,
}

impl TranslatorError {
    pub fn new(msg: impl Into<String>, error_type: ErrorType) -> Self {
        TranslatorError {
            msg: msg.into(),
            error_type,
            type_name: None,
            path: None,
        }
    }

    /// A construct the emitters refuse to translate
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::new(msg, ErrorType::UnsupportedConstruct)
    }

    /// Missing or inconsistent binding information from the front end
    pub fn binding_gap(msg: impl Into<String>) -> Self {
        Self::new(msg, ErrorType::BindingGap)
    }

    pub fn input_error(msg: impl Into<String>) -> Self {
        Self::new(msg, ErrorType::Input)
    }

    pub fn file_error(path: &Path, msg: impl Into<String>) -> Self {
        TranslatorError {
            msg: msg.into(),
            error_type: ErrorType::File,
            type_name: None,
            path: Some(path.to_path_buf()),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(msg, ErrorType::Config)
    }

    /// Create a translator error (internal bug, not user's fault)
    pub fn compiler_error(msg: impl Into<String>) -> Self {
        Self::new(msg, ErrorType::Compiler)
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        if self.type_name.is_none() {
            self.type_name = Some(type_name.into());
        }
        self
    }

    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }
}

impl fmt::Display for TranslatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", error_type_to_str(&self.error_type), self.msg)?;

        if let Some(type_name) = &self.type_name {
            write!(f, " (while translating {})", type_name)?;
        }

        if let Some(path) = &self.path {
            write!(f, " [{}]", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for TranslatorError {}
