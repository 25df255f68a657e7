pub mod client;
pub mod error;
pub mod signature;

pub use client::SlackClient;
pub use error::SlackError;
