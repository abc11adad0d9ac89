//! Database schemas for vantage
//!
//! Defines the MongoDB document structures for users, interactions, and
//! video metadata.

mod interaction;
mod user;
mod video;

pub use interaction::{InteractionDoc, INTERACTION_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};
pub use video::{VideoAuthor, VideoDoc, VideoMedia, UNKNOWN_CATEGORY, VIDEO_COLLECTION};
