//! Essay tutoring core
//!
//! - [`session`]: the message and session data model
//! - [`store`]: in-memory session storage
//! - [`service`]: turn handling on top of a completion provider

pub mod service;
pub mod session;
pub mod store;

pub use service::{TutorService, ERROR_REPLY_PREFIX};
pub use session::{Message, Role, Session, Stage};
pub use store::SessionStore;
