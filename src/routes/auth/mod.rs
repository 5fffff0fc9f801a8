mod handler;
mod model;

pub use handler::{login, profile, register};
pub use model::{User, UserProfile};
