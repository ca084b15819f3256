//! Java to C++ source translation.
//!
//! The front end hands over a bound [`Program`](frontend_model::program::Program);
//! the C++ backend turns every Java type into a header and an implementation file.

pub mod backends {
    pub mod cpp;
}

pub mod build_system {
    pub mod core_build;
}

pub mod frontend_model;

pub mod projects {
    pub(crate) mod cli;
    pub mod file_output;
    pub mod settings;

    pub use cli::start_cli;
}

pub mod translator_messages;

pub use build_system::core_build::{TranslationOutput, Translator};
