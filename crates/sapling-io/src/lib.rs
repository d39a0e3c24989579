//! Loading labelled numeric samples from headerless CSV files.

mod domain;
mod error;
mod loader;

pub use domain::{LabelColumn, LabelledData};
pub use error::IoError;
pub use loader::CsvLoader;
