pub mod archive;
pub mod batch;
pub mod broadcast;
pub mod upload;
