pub mod analyze;
pub mod batch;
pub mod info;
pub mod kinds;
pub mod optimize;
pub mod run;
pub mod summary;
pub mod validate;
