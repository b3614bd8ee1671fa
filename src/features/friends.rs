//! Friend lists and friend requests.
//!
//! A friend request can be answered from two places: the request list
//! itself, or the notification that announced it. Answering from a
//! notification also deletes that notification once the answer went
//! through.

use crate::client::Client;
use crate::fetcher::FetchOutcome;
use crate::mutator::{MutationError, MutationOutcome};
use crate::request::ApiError;
use feedcore::QueryIdentity;
use feedcore::api::friends::{
    AcceptFriendRequestSpec, AddFriendSpec, DeleteFriendRequestSpec, FriendshipStatusSpec,
    UnfriendSpec,
};
use feedcore::api::notifications::DeleteNotificationSpec;
use feedcore::mutation::MutationIntent;
use feedcore::types::models::FriendshipStatus;
use log::debug;

/// Where the user answered a friend request from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    RequestList,
    /// The friend-request notification with this id.
    Notification(i64),
}

pub struct Friends<'a> {
    client: &'a Client,
}

impl<'a> Friends<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn fetch_list_next(&self, user_id: i64) -> Result<FetchOutcome, ApiError> {
        self.client
            .fetch_next_page(&QueryIdentity::friend_list(user_id))
            .await
    }

    pub async fn fetch_requests_next(&self, user_id: i64) -> Result<FetchOutcome, ApiError> {
        self.client
            .fetch_next_page(&QueryIdentity::friend_requests(user_id))
            .await
    }

    /// Accepts the request `requester_id` sent to `me`.
    ///
    /// The friendship is created first; only then is the request (or its
    /// notification) removed. If the first call fails nothing else is sent.
    pub async fn accept(
        &self,
        me: i64,
        requester_id: i64,
        origin: RequestOrigin,
    ) -> Result<MutationOutcome, MutationError> {
        debug!(target: "Friends", "Accepting request from {requester_id} ({origin:?})");
        let requests = QueryIdentity::friend_requests(me);
        let accept = MutationIntent::accept_request(requester_id, requests.clone())
            .with_dependent(QueryIdentity::friend_list(me));
        let cleanup = self.cleanup_intent(me, requester_id, origin);

        self.client
            .mutator
            .run_chained(
                accept,
                || self.client.execute(AcceptFriendRequestSpec { requester_id }),
                cleanup,
                || async move {
                    match origin {
                        // The server drops the request itself on accept.
                        RequestOrigin::RequestList => Ok(()),
                        RequestOrigin::Notification(notification_id) => {
                            self.client
                                .execute(DeleteNotificationSpec { notification_id })
                                .await
                        }
                    }
                },
            )
            .await
    }

    /// Declines the request `requester_id` sent to `me`.
    pub async fn delete_request(
        &self,
        me: i64,
        requester_id: i64,
        origin: RequestOrigin,
    ) -> Result<MutationOutcome, MutationError> {
        debug!(target: "Friends", "Declining request from {requester_id} ({origin:?})");
        let decline = MutationIntent::delete(requester_id, QueryIdentity::friend_requests(me));
        let remote = || self.client.execute(DeleteFriendRequestSpec { requester_id });

        match origin {
            RequestOrigin::RequestList => self.client.mutator.run(decline, remote).await,
            RequestOrigin::Notification(notification_id) => {
                self.client
                    .mutator
                    .run_chained(
                        decline,
                        remote,
                        self.cleanup_intent(me, requester_id, origin),
                        || self.client.execute(DeleteNotificationSpec { notification_id }),
                    )
                    .await
            }
        }
    }

    fn cleanup_intent(&self, me: i64, requester_id: i64, origin: RequestOrigin) -> MutationIntent {
        match origin {
            RequestOrigin::RequestList => {
                MutationIntent::delete(requester_id, QueryIdentity::friend_requests(me))
            }
            RequestOrigin::Notification(notification_id) => {
                MutationIntent::delete(notification_id, QueryIdentity::notifications(me))
                    .with_dependent(QueryIdentity::friend_requests(me))
            }
        }
    }

    /// Removes `friend_id` from the friend list of `me`.
    pub async fn unfriend(&self, me: i64, friend_id: i64) -> Result<MutationOutcome, MutationError> {
        debug!(target: "Friends", "Unfriending {friend_id}");
        let intent = MutationIntent::delete(friend_id, QueryIdentity::friend_list(me))
            .with_dependent(QueryIdentity::friend_list(friend_id));
        self.client
            .mutator
            .run(intent, || self.client.execute(UnfriendSpec { friend_id }))
            .await
    }

    /// Sends a friend request to `user_id`.
    pub async fn add(&self, user_id: i64) -> Result<(), ApiError> {
        debug!(target: "Friends", "Sending friend request to {user_id}");
        self.client.execute(AddFriendSpec { user_id }).await?;
        self.client
            .cache
            .invalidate(&QueryIdentity::friend_requests(user_id));
        Ok(())
    }

    pub async fn status(&self, user_id: i64) -> Result<FriendshipStatus, ApiError> {
        self.client.execute(FriendshipStatusSpec { user_id }).await
    }
}

impl Client {
    /// Access friend operations.
    pub fn friends(&self) -> Friends<'_> {
        Friends::new(self)
    }
}
