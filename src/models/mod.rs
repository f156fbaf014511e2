//! Data models for the Twitter API v2.
//!
//! Models are organized by domain:
//!
//! - [`primitives`] - Id newtypes: `TweetId`, `UserId`
//! - [`tweet`] - Tweets, stream items, stream rules and tweet creation
//! - [`user`] - Users
//! - [`query`] - Query-string parameters and field selections

pub mod primitives;
pub mod query;
pub mod tweet;
pub mod user;

// Re-export commonly used types
pub use primitives::*;
pub use query::*;
pub use tweet::*;
pub use user::*;
