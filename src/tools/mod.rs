pub mod goals;
pub mod log;
pub mod summary;
pub mod weekly;
