//! Users service: lookup and follow graph.

use std::sync::Arc;

use reqwest::Method;

use super::path_segment;
use crate::client::{ClientInner, Paginator, RateLimitTracker, RequestOptions, ResponseEnvelope, NO_BODY};
use crate::models::{FieldsQuery, FollowersQuery, User, UserId};
use crate::Result;

/// Service for user operations.
///
/// # Example
///
/// ```no_run
/// use twitter_api_rs::RequestOptions;
///
/// # async fn example(client: twitter_api_rs::TwitterClient) -> twitter_api_rs::Result<()> {
/// let user = client
///     .users()
///     .find_user_by_username("TwitterDev", None, RequestOptions::new())
///     .await?;
/// if let Some(user) = user.data {
///     println!("{} is @{}", user.id, user.username);
/// }
/// # Ok(())
/// # }
/// ```
pub struct UsersService {
    inner: Arc<ClientInner>,
}

impl UsersService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// The user the credential acts for. Requires user context.
    pub async fn find_my_user(
        &self,
        fields: Option<FieldsQuery>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<User>> {
        self.lookup("/2/users/me", fields, options).await
    }

    /// Look up a user by id.
    pub async fn find_user_by_id(
        &self,
        id: &UserId,
        fields: Option<FieldsQuery>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<User>> {
        let id = path_segment(id.as_str(), "user id")?;
        self.lookup(&format!("/2/users/{}", id), fields, options).await
    }

    /// Look up a user by handle, without the leading `@`.
    pub async fn find_user_by_username(
        &self,
        username: &str,
        fields: Option<FieldsQuery>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<User>> {
        let username = path_segment(username.trim_start_matches('@'), "username")?;
        self.lookup(&format!("/2/users/by/username/{}", username), fields, options)
            .await
    }

    /// Users following `id`. The first page is fetched before this returns.
    pub async fn followers(
        &self,
        id: &UserId,
        query: Option<FollowersQuery>,
        options: RequestOptions,
    ) -> Result<Paginator<Vec<User>>> {
        let id = path_segment(id.as_str(), "user id")?;
        self.inner
            .paginate(
                format!("/2/users/{}/followers", id),
                query.unwrap_or_default(),
                options,
            )
            .await
    }

    /// Users `id` follows. The first page is fetched before this returns.
    pub async fn following(
        &self,
        id: &UserId,
        query: Option<FollowersQuery>,
        options: RequestOptions,
    ) -> Result<Paginator<Vec<User>>> {
        let id = path_segment(id.as_str(), "user id")?;
        self.inner
            .paginate(
                format!("/2/users/{}/following", id),
                query.unwrap_or_default(),
                options,
            )
            .await
    }

    async fn lookup(
        &self,
        path: &str,
        fields: Option<FieldsQuery>,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope<User>> {
        self.inner
            .request(
                Method::GET,
                path,
                fields.as_ref(),
                NO_BODY,
                &RateLimitTracker::from(&options),
            )
            .await
    }
}
