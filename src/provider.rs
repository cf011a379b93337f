//! This module turns the reservations of a user into calendar events
//!
//! Every step is done in sequence, and the first error aborts the whole run.

use std::collections::HashMap;

use crate::booking::{Booking, BookingView, OwnedReservations};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::event::ResolvedEvent;
use crate::traits::Transport;

/// The schedule of every bookable object, by object id.
///
/// This only lives for one run.
pub type Schedules = HashMap<i64, BookingView>;


pub struct Provider<T: Transport> {
    client: Client<T>,
    cache_reservations: bool,
}

impl<T: Transport> Provider<T> {
    /// Create a provider. `client` does not have to be logged in yet
    pub fn new(client: Client<T>) -> Self {
        Self { client, cache_reservations: false }
    }

    /// Serve the reservation list from the local cache as well (it is fetched on every run otherwise)
    pub fn with_cached_reservations(mut self, cache_reservations: bool) -> Self {
        self.cache_reservations = cache_reservations;
        self
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    /// Log in, download what is needed and resolve every reservation of the user
    pub async fn run(&mut self) -> Result<Vec<ResolvedEvent>> {
        self.client.login().await?;

        let schedules = self.fetch_schedules().await?;
        log::debug!("Got the schedules of {} objects", schedules.len());

        let reservations = self.fetch_reservations().await?;
        if reservations.bookings.is_empty() {
            log::warn!("No reservations found");
        }

        resolve_bookings(self.client.endpoint(), &schedules, &reservations.bookings)
    }

    /// The schedule of every bookable object (these are cached)
    pub async fn fetch_schedules(&self) -> Result<Schedules> {
        let objects = self.client.objects().await?;

        let mut schedules = Schedules::with_capacity(objects.len());
        for object in objects {
            log::debug!("Fetching the schedule of object {} ({})", object.id, object.name);
            let view = self.client.booking_view(object.id).await?;
            schedules.insert(object.id, view);
        }
        Ok(schedules)
    }

    async fn fetch_reservations(&self) -> Result<OwnedReservations> {
        if self.cache_reservations {
            self.client.cached_owned_reservations().await
        } else {
            self.client.owned_reservations().await
        }
    }
}

/// Place every booking on the calendar.
///
/// Fails on the first booking that cannot be resolved, naming it.
pub fn resolve_bookings(endpoint: &str, schedules: &Schedules, bookings: &[Booking]) -> Result<Vec<ResolvedEvent>> {
    bookings.iter()
        .map(|booking| -> Result<ResolvedEvent> {
            let view = schedules.get(&booking.object_id)
                .ok_or(Error::BadObject(booking.object_id))?;
            let interval = view.resolve(booking)?;
            let event = ResolvedEvent::for_booking(endpoint, booking, interval.start, interval.end, interval.unit_name.to_string());
            log::debug!("w{} {}", booking.week_number, event);
            Ok(event)
        })
        .collect()
}
