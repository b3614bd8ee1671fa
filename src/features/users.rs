use crate::client::Client;
use crate::request::ApiError;
use feedcore::api::user::CurrentUserSpec;
use feedcore::types::models::CurrentUser;

pub struct Users<'a> {
    client: &'a Client,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Profile of the user the token belongs to.
    pub async fn current(&self) -> Result<CurrentUser, ApiError> {
        self.client.execute(CurrentUserSpec).await
    }
}

impl Client {
    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }
}
