//! External delivery services.

pub mod telegram;
pub mod transport;

pub use telegram::TelegramApi;
pub use transport::{MessageRef, Transport, TransportError};
