//! Photowall API library
//!
//! HTTP surface of the photo wall: batch creation, uploads, listing, soft
//! delete, exports and the live server-sent event stream.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
