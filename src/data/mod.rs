//! Data module - delimited-file loading and cleaning

mod cleaner;
mod loader;

pub use cleaner::{clean, normalize_state, CleanError, CleanOutcome, DistrictRecord};
pub use loader::{load_raw, LoaderError};
