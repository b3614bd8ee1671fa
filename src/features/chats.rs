use crate::client::Client;
use crate::fetcher::FetchOutcome;
use crate::request::ApiError;
use anyhow::anyhow;
use feedcore::QueryIdentity;
use feedcore::api::chats::CreateGroupChatSpec;
use log::debug;

pub struct Chats<'a> {
    client: &'a Client,
}

impl<'a> Chats<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn fetch_next(&self, user_id: i64) -> Result<FetchOutcome, ApiError> {
        self.client
            .fetch_next_page(&QueryIdentity::user_chats(user_id))
            .await
    }

    /// Starts a group chat with `friend_ids` and an opening message. The
    /// chat list of `user_id` is refetched afterwards.
    pub async fn create_group(
        &self,
        user_id: i64,
        friend_ids: &[i64],
        text: &str,
    ) -> Result<(), ApiError> {
        if friend_ids.is_empty() {
            return Err(ApiError::InvalidRequest(anyhow!(
                "a group chat needs at least one friend"
            )));
        }
        debug!(
            target: "Chats",
            "Creating group chat for {user_id} with {} friend(s)",
            friend_ids.len()
        );
        self.client
            .execute(CreateGroupChatSpec {
                user_id,
                friend_ids: friend_ids.to_vec(),
                text: text.to_string(),
            })
            .await?;
        self.client
            .cache
            .invalidate(&QueryIdentity::user_chats(user_id));
        Ok(())
    }
}

impl Client {
    /// Access chat list operations.
    pub fn chats(&self) -> Chats<'_> {
        Chats::new(self)
    }
}
