// core logic - record store, query classification and reply formatting

mod classify;
mod db;
pub mod format;

pub use classify::{DOCUMENT_ID_DIGITS, Query};
pub use db::{Person, Store};
pub use format::Limits;
