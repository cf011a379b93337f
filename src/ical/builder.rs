//! A module to build ICal files

use chrono::{DateTime, TimeZone, Utc};
use ics::properties::{DtEnd, DtStart, Summary};
use ics::{escape_text, ICalendar};

use crate::event::ResolvedEvent;

/// Create an iCal calendar that contains every event. `dtstamp` is the creation time of the file
pub fn build_calendar(events: &[ResolvedEvent], dtstamp: &DateTime<Utc>) -> String {
    let s_dtstamp = format_date_time(dtstamp);

    let mut calendar = ICalendar::new("2.0", super::default_prod_id());
    for event in events {
        let mut vevent = ics::Event::new(event.uid().to_string(), s_dtstamp.clone());
        vevent.push(DtStart::new(format_date_time(event.start())));
        vevent.push(DtEnd::new(format_date_time(event.end())));
        vevent.push(Summary::new(escape_text(event.name().to_string())));
        calendar.add_event(vevent);
    }

    calendar.to_string()
}

/// UTC time, in the iCal "basic" format
fn format_date_time<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string()
}
