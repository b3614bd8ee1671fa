//! Post feeds, likes and post deletion.

use crate::client::Client;
use crate::fetcher::FetchOutcome;
use crate::mutator::{MutationError, MutationOutcome};
use crate::request::ApiError;
use feedcore::QueryIdentity;
use feedcore::api::posts::{
    DeletePostSpec, GetCommentCountSpec, GetPostLikeCountSpec, GetPostLikeSpec, ToggleLikeSpec,
};
use feedcore::mutation::MutationIntent;
use log::debug;

/// Feature handle for post operations.
pub struct Posts<'a> {
    client: &'a Client,
}

impl<'a> Posts<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Next page of the global feed.
    pub async fn fetch_next(&self) -> Result<FetchOutcome, ApiError> {
        self.client
            .fetch_next_page(&QueryIdentity::all_posts())
            .await
    }

    /// Next page of the posts written by `user_id`.
    pub async fn fetch_user_posts_next(&self, user_id: i64) -> Result<FetchOutcome, ApiError> {
        self.client
            .fetch_next_page(&QueryIdentity::user_posts(user_id))
            .await
    }

    /// Next page of the users who liked `post_id`.
    pub async fn fetch_likers_next(&self, post_id: i64) -> Result<FetchOutcome, ApiError> {
        self.client
            .fetch_next_page(&QueryIdentity::post_likers(post_id))
            .await
    }

    /// Likes or unlikes `post_id` as shown in `feed`.
    ///
    /// The flag and the counter flip together before the server answers and
    /// flip back if it refuses.
    pub async fn toggle_like(
        &self,
        feed: &QueryIdentity,
        post_id: i64,
    ) -> Result<MutationOutcome, MutationError> {
        debug!(target: "Posts", "Toggling like on post {post_id} in {feed}");
        let intent = MutationIntent::like_toggle(post_id, feed.clone())
            .with_dependent(QueryIdentity::post_likers(post_id));
        self.client
            .mutator
            .run(intent, || self.client.execute(ToggleLikeSpec { post_id }))
            .await
    }

    pub async fn is_liked(&self, post_id: i64) -> Result<bool, ApiError> {
        self.client.execute(GetPostLikeSpec { post_id }).await
    }

    pub async fn like_count(&self, post_id: i64) -> Result<u64, ApiError> {
        self.client.execute(GetPostLikeCountSpec { post_id }).await
    }

    pub async fn comment_count(&self, post_id: i64) -> Result<u64, ApiError> {
        self.client.execute(GetCommentCountSpec { post_id }).await
    }

    /// Deletes `post_id`, removing it from `feed` right away.
    ///
    /// Every other cached post feed is refetched once the server confirms.
    pub async fn delete(
        &self,
        feed: &QueryIdentity,
        post_id: i64,
    ) -> Result<MutationOutcome, MutationError> {
        debug!(target: "Posts", "Deleting post {post_id} from {feed}");
        let other_feeds = self
            .client
            .cache
            .identities()
            .into_iter()
            .filter(|identity| identity.resource().is_post_list());
        let intent = MutationIntent::delete(post_id, feed.clone())
            .with_dependents(other_feeds)
            .with_dependent(QueryIdentity::post_comments(post_id));
        let outcome = self
            .client
            .mutator
            .run(intent, || self.client.execute(DeletePostSpec { post_id }))
            .await?;
        debug!(target: "Posts", "Deleted post {post_id}");
        Ok(outcome)
    }
}

impl Client {
    /// Access post operations.
    pub fn posts(&self) -> Posts<'_> {
        Posts::new(self)
    }
}
