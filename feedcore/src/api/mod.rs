//! Endpoint specifications.
//!
//! Each spec pairs a request builder with a response parser, so the REST
//! contract lives here while sending, auth and timeouts stay in the client.

pub mod chats;
pub mod friends;
pub mod list;
pub mod notifications;
pub mod posts;
pub mod spec;
pub mod user;

pub use list::ListSpec;
pub use spec::EndpointSpec;
