pub mod events;
pub mod item;
pub mod models;

pub use item::*;
pub use models::*;
