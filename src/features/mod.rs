mod chats;
mod comments;
mod friends;
mod notifications;
mod posts;
mod users;

pub use chats::Chats;

pub use comments::Comments;

pub use friends::{Friends, RequestOrigin};

pub use notifications::Notifications;

pub use posts::Posts;

pub use users::Users;
