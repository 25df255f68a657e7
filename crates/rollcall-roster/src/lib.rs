//! Commit/uncommit roster embedded in Event Message text.
//!
//! There is no RSVP store: the roster is parsed out of the posted message and
//! written back into it on every toggle. [`roster`] is the pure codec,
//! [`service::RosterService`] runs the read-modify-write against a
//! [`platform::ChatPlatform`].

pub mod commit;
pub mod deny_list;
pub mod error;
pub mod locks;
pub mod memory;
pub mod notices;
pub mod platform;
pub mod revision;
pub mod roster;
pub mod service;
pub mod uncommit;

pub use deny_list::DenyList;
pub use error::RosterError;
pub use platform::{ChatPlatform, PlatformError};
pub use roster::Roster;
pub use service::RosterService;
