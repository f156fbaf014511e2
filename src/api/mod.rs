//! API service modules for Twitter v2 endpoints.
//!
//! Each service provides methods for interacting with a specific
//! subset of the API.

mod tweets;
mod users;

pub use tweets::TweetsService;
pub use users::UsersService;

use std::borrow::Cow;

use crate::{Error, Result};

/// Percent-encode an id or handle for use as one URL path segment.
fn path_segment<'a>(value: &'a str, what: &str) -> Result<Cow<'a, str>> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} is empty", what)));
    }
    Ok(urlencoding::encode(value))
}
