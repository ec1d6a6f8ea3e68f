pub mod file_formats;
pub mod measurement;
pub mod stock;
pub mod target;
