//! Service layer: format handling separated from pipeline business logic

pub mod format;

pub use format::{ImageFormatService, SUPPORTED_INPUT_FORMATS};
