//! Upload validation and thumbnail generation.

#[cfg(feature = "thumbnail")]
pub mod thumbnail;
pub mod validator;

#[cfg(feature = "thumbnail")]
pub use thumbnail::{Thumbnail, ThumbnailError, ThumbnailGenerator};
pub use validator::{UploadValidator, ValidationError};
