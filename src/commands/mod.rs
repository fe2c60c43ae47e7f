pub mod configs;
pub mod correlate;
pub mod segment;
pub mod show;
pub mod summary;
