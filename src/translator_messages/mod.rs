pub mod display_messages;
pub mod translator_dev_logging;
pub mod translator_errors;
