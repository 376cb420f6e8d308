//! MindMate: a mental wellness chat assistant. Forwards each user message,
//! wrapped in a persona preamble, to a hosted text-generation model and keeps
//! the resulting transcript per browser session.

pub mod catalog;
pub mod chat;
pub mod constants;
pub mod error;
pub mod inference;
pub mod prompt;
pub mod session;
pub mod web_server;

pub use catalog::{Model, Mood};
pub use error::{AppError, InferenceError};
pub use inference::InferenceClient;
pub use session::{Message, Role, Session, SessionStore};
