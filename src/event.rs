//! Calendar events

use std::fmt::{Display, Formatter};

use chrono::DateTime;
use chrono_tz::Tz;

use crate::booking::Booking;

/// A reservation, ready to be written to a calendar
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEvent {
    /// Stays the same for a given reservation across runs, so that calendar apps do not duplicate it
    uid: String,
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    name: String,
}

impl ResolvedEvent {
    pub fn new(uid: String, start: DateTime<Tz>, end: DateTime<Tz>, name: String) -> Self {
        Self { uid, start, end, name }
    }

    /// Builds the event of `booking`, made on the server at `endpoint`
    pub fn for_booking(endpoint: &str, booking: &Booking, start: DateTime<Tz>, end: DateTime<Tz>, name: String) -> Self {
        Self::new(identity_key(endpoint, booking), start, end, name)
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    pub fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for ResolvedEvent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}-{} {}", self.start.format("%Y-%m-%d %H:%M"), self.end.format("%H:%M"), self.name)
    }
}

/// `<endpoint>/<reservation id>/<week number>/<schedule period id>`
pub fn identity_key(endpoint: &str, booking: &Booking) -> String {
    format!("{}/{}/{}/{}", endpoint, booking.id, booking.week_number, booking.schedule_period_id)
}
