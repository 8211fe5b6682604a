// peoplebot library - people lookups over a telegram chat

mod bot;
pub mod cli;
mod core;
mod error;
pub mod router;
mod server;
pub mod telegram;

pub use crate::core::{DOCUMENT_ID_DIGITS, Limits, Person, Query, Store, format};
pub use bot::Bot;
pub use error::Error;
pub use server::Server;
pub use telegram::Telegram;
