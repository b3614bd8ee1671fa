use crate::client::Client;
use crate::fetcher::FetchOutcome;
use crate::mutator::{MutationError, MutationOutcome};
use crate::request::ApiError;
use feedcore::QueryIdentity;
use feedcore::api::notifications::{DeleteNotificationSpec, MarkAsReadSpec};
use feedcore::mutation::MutationIntent;
use log::debug;

pub struct Notifications<'a> {
    client: &'a Client,
}

impl<'a> Notifications<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn fetch_next(&self, user_id: i64) -> Result<FetchOutcome, ApiError> {
        self.client
            .fetch_next_page(&QueryIdentity::notifications(user_id))
            .await
    }

    /// Marks a notification of `user_id` as read. Already-read notifications
    /// are left alone and nothing is sent.
    pub async fn mark_as_read(
        &self,
        user_id: i64,
        notification_id: i64,
    ) -> Result<MutationOutcome, MutationError> {
        debug!(target: "Notifications", "Marking {notification_id} as read");
        let intent = MutationIntent::mark_read(notification_id, QueryIdentity::notifications(user_id));
        self.client
            .mutator
            .run(intent, || self.client.execute(MarkAsReadSpec { notification_id }))
            .await
    }

    pub async fn delete(
        &self,
        user_id: i64,
        notification_id: i64,
    ) -> Result<MutationOutcome, MutationError> {
        debug!(target: "Notifications", "Deleting notification {notification_id}");
        let intent = MutationIntent::delete(notification_id, QueryIdentity::notifications(user_id));
        self.client
            .mutator
            .run(intent, || {
                self.client
                    .execute(DeleteNotificationSpec { notification_id })
            })
            .await
    }
}

impl Client {
    /// Access notification operations.
    pub fn notifications(&self) -> Notifications<'_> {
        Notifications::new(self)
    }
}
