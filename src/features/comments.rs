use crate::client::Client;
use crate::fetcher::FetchOutcome;
use crate::request::ApiError;
use anyhow::anyhow;
use feedcore::QueryIdentity;
use feedcore::api::posts::WriteCommentSpec;
use log::debug;

pub struct Comments<'a> {
    client: &'a Client,
}

impl<'a> Comments<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn fetch_next(&self, post_id: i64) -> Result<FetchOutcome, ApiError> {
        self.client
            .fetch_next_page(&QueryIdentity::post_comments(post_id))
            .await
    }

    /// Posts a comment. The comment list of the post is refetched afterwards
    /// since the server decides where the new comment lands.
    pub async fn write(&self, post_id: i64, comment: &str) -> Result<(), ApiError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ApiError::InvalidRequest(anyhow!("comment must not be empty")));
        }
        debug!(target: "Comments", "Commenting on post {post_id}");
        self.client
            .execute(WriteCommentSpec {
                post_id,
                comment: comment.to_string(),
            })
            .await?;
        self.client
            .cache
            .invalidate(&QueryIdentity::post_comments(post_id));
        Ok(())
    }
}

impl Client {
    /// Access comment operations.
    pub fn comments(&self) -> Comments<'_> {
        Comments::new(self)
    }
}
