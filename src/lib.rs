//! This crate exports the laundry-room reservations of a user of an Axema booking server as an iCal calendar.
//!
//! It provides a client for the booking server in the [`client`] module, that handles the login handshake.
//!
//! Because schedules rarely change and are slow to fetch, server responses are kept in a local cache, see the [`cache`] module.
//!
//! A [`Provider`](provider::Provider) logs in, fetches schedules and reservations, and resolves each reservation to a time interval.
//! The resulting events can then be turned into an iCal file with [`ical::build_calendar`].

pub mod traits;

pub mod booking;
pub use booking::Booking;
mod event;
pub use event::ResolvedEvent;
pub mod provider;
pub use provider::Provider;

pub mod client;
pub mod cache;
pub mod digest;
pub mod ical;

pub mod config;
pub mod error;
pub use error::{Error, Result};
