//! Session synchronization feeds
//!
//! Each feed owns one polling subscription on the query cache and exposes
//! the continuously-updated view the presentation layer renders. Failure
//! policy differs per feed and is deliberate:
//!
//! - messages ([`MessageFeed`]) and the session directory
//!   ([`SessionListFeed`]) are strict: fetch errors are visible to the
//!   consumer alongside the last good data;
//! - reservations ([`ReservationFeed`]) are lenient: auxiliary context must
//!   never block or error out the chat view, so failures degrade to an
//!   empty list.

mod messages;
mod reservations;
mod sessions;

pub use messages::MessageFeed;
pub use reservations::ReservationFeed;
pub use sessions::SessionListFeed;
