pub mod batch;
pub mod export;
pub mod photo_delete;
pub mod photos;
pub mod stream;
pub mod upload;
