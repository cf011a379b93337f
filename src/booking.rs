//! Data exchanged with the booking server, and how a booking maps to a time interval
//!
//! A [`Booking`] only holds coordinates (a week number and a schedule period id).
//! The actual date and time come from the [`LaundryUnit`] that owns the period:
//! * the period tells on which day of the week it happens (its position in `SchedulePeriodList`) and at what time,
//! * the week list tells which calendar date this day of this week is.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The time zone every facility time is expressed in, regardless of where this program runs
pub const FACILITY_TIME_ZONE: Tz = chrono_tz::Europe::Stockholm;


/// The challenge sent by the server before a login
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Nonce {
    pub nonce1: String,
    pub nonce2: String,
}

/// The login payload. Credentials are only sent as digests salted with the nonces
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoginRequest {
    pub nonce1: String,
    pub nonce2: String,
    pub pass: String,
    pub user: String,
}

/// A bookable object (e.g. a laundry room)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BookingViewRequest {
    pub reservation_object_id: i64,
}

/// The schedule of a bookable object
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BookingView {
    #[serde(default)]
    pub time_stamp: String,
    #[serde(default)]
    pub laundry_units: Vec<LaundryUnit>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaundryUnit {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub week_list: Vec<Week>,
    /// Periods grouped by day of the week: the outer index is the day (0 is the first day of a week)
    #[serde(default)]
    pub schedule_period_list: Vec<Vec<SchedulePeriod>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Week {
    pub week_number: i64,
    /// One entry per day, in the same order as the outer index of `schedule_period_list`
    #[serde(default)]
    pub week_days: Vec<WeekDay>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeekDay {
    /// `YYYY-MM-DD`
    pub date: String,
}

/// A time slot. Times are minutes since midnight
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SchedulePeriod {
    pub id: i64,
    pub start_time: u32,
    pub stop_time: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OwnedReservations {
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

/// A reservation owned by the logged-in user
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Booking {
    pub id: i64,
    pub object_id: i64,
    pub week_number: i64,
    pub schedule_period_id: i64,
}


/// A booking, once placed on the calendar
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedInterval<'a> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub unit_name: &'a str,
}

impl LaundryUnit {
    /// The date of the `day`-th day of week `week_number`, if this unit knows it
    pub fn date_for(&self, week_number: i64, day: usize) -> Option<&str> {
        self.week_list.iter()
            .filter(|week| week.week_number == week_number)
            .find_map(|week| week.week_days.get(day))
            .map(|week_day| week_day.date.as_str())
    }

    /// The first period with this id, along with the day it belongs to.
    ///
    /// Days are scanned in order, then periods in the order of the list. Ids are not sorted.
    pub fn period_for(&self, period_id: i64) -> Option<(usize, &SchedulePeriod)> {
        self.schedule_period_list.iter()
            .enumerate()
            .find_map(|(day, periods)| {
                periods.iter()
                    .find(|period| period.id == period_id)
                    .map(|period| (day, period))
            })
    }

    /// Compute when `booking` starts and ends
    pub fn resolve(&self, booking: &Booking) -> Result<ResolvedInterval<'_>> {
        let (day, period) = self.period_for(booking.schedule_period_id)
            .ok_or(Error::Unresolved(booking.id))?;
        let date = self.date_for(booking.week_number, day)
            .ok_or(Error::Unresolved(booking.id))?;

        let bad_date = || Error::BadDate { reservation: booking.id, date: date.to_string() };
        Ok(ResolvedInterval {
            start: to_local_time(date, period.start_time).ok_or_else(bad_date)?,
            end: to_local_time(date, period.stop_time).ok_or_else(bad_date)?,
            unit_name: &self.name,
        })
    }
}

impl BookingView {
    /// The first unit that has a period with this id, along with what [`LaundryUnit::period_for`] returned
    pub fn period_for(&self, period_id: i64) -> Option<(usize, &SchedulePeriod, &LaundryUnit)> {
        self.laundry_units.iter()
            .find_map(|unit| {
                unit.period_for(period_id).map(|(day, period)| (day, period, unit))
            })
    }

    /// Compute when `booking` starts and ends, using the unit that owns its schedule period
    pub fn resolve(&self, booking: &Booking) -> Result<ResolvedInterval<'_>> {
        match self.period_for(booking.schedule_period_id) {
            None => Err(Error::Unresolved(booking.id)),
            Some((_, _, unit)) => unit.resolve(booking),
        }
    }
}

/// Convert a `YYYY-MM-DD` date and a number of minutes since midnight into a time in [`FACILITY_TIME_ZONE`]
///
/// `minutes` may reach 1440, which is midnight of the next day.
/// Returns `None` if `date` is not a valid date.
pub fn to_local_time(date: &str, minutes: u32) -> Option<DateTime<Tz>> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let local = day.and_hms_opt(0, 0, 0)? + Duration::minutes(i64::from(minutes));

    // Autumn DST fold: keep the first occurrence.
    // Spring DST gap: the clocks skip one hour, so does the time.
    FACILITY_TIME_ZONE.from_local_datetime(&local)
        .earliest()
        .or_else(|| FACILITY_TIME_ZONE.from_local_datetime(&(local + Duration::hours(1))).earliest())
}


#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Timelike, Utc};

    fn period(id: i64, start_time: u32, stop_time: u32) -> SchedulePeriod {
        SchedulePeriod { id, start_time, stop_time }
    }

    fn week(week_number: i64, dates: &[&str]) -> Week {
        Week {
            week_number,
            week_days: dates.iter().map(|d| WeekDay { date: d.to_string() }).collect(),
        }
    }

    fn sample_unit() -> LaundryUnit {
        LaundryUnit {
            id: 1,
            name: "Tvättstuga 1".to_string(),
            week_list: vec![
                week(3, &["2024-01-15", "2024-01-16", "2024-01-17"]),
                week(52, &["2023-12-25"]),
            ],
            schedule_period_list: vec![
                vec![period(7, 480, 540), period(8, 540, 600)],
                vec![period(9, 600, 660)],
                vec![period(10, 1380, 1440)],
            ],
        }
    }

    #[test]
    fn date_for() {
        let unit = sample_unit();
        assert_eq!(unit.date_for(3, 0), Some("2024-01-15"));
        assert_eq!(unit.date_for(3, 2), Some("2024-01-17"));
        assert_eq!(unit.date_for(52, 0), Some("2023-12-25"));

        // Unknown week
        assert_eq!(unit.date_for(4, 0), None);
        // Day beyond the week's days
        assert_eq!(unit.date_for(3, 3), None);
        assert_eq!(unit.date_for(52, 1), None);
    }

    #[test]
    fn period_for_returns_first_match() {
        let mut unit = sample_unit();
        assert_eq!(unit.period_for(9), Some((1, &period(9, 600, 660))));
        assert_eq!(unit.period_for(42), None);

        // Should the same id appear twice, the earliest day wins
        unit.schedule_period_list[2].push(period(9, 0, 60));
        unit.schedule_period_list[0].push(period(9, 120, 180));
        assert_eq!(unit.period_for(9), Some((0, &period(9, 120, 180))));
    }

    #[test]
    fn resolve_booking() {
        let unit = LaundryUnit {
            id: 1,
            name: "Unit".to_string(),
            week_list: vec![week(3, &["2024-01-15"])],
            schedule_period_list: vec![vec![period(7, 480, 540)]],
        };
        let booking = Booking { id: 100, object_id: 1, week_number: 3, schedule_period_id: 7 };

        let resolved = unit.resolve(&booking).unwrap();
        assert_eq!(resolved.start.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 08:00");
        assert_eq!(resolved.end.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 09:00");
        assert_eq!(resolved.start.second(), 0);
        assert_eq!(resolved.start.timezone(), FACILITY_TIME_ZONE);
        // Stockholm is UTC+1 in winter
        assert_eq!(resolved.start.with_timezone(&Utc).hour(), 7);
        assert_eq!(resolved.unit_name, "Unit");
    }

    #[test]
    fn unresolvable_bookings_name_the_reservation() {
        let unit = sample_unit();

        let unknown_period = Booking { id: 5, object_id: 1, week_number: 3, schedule_period_id: 99 };
        assert!(matches!(unit.resolve(&unknown_period), Err(Error::Unresolved(5))));

        let unknown_week = Booking { id: 6, object_id: 1, week_number: 4, schedule_period_id: 7 };
        assert!(matches!(unit.resolve(&unknown_week), Err(Error::Unresolved(6))));

        // Week 52 only has one day, period 9 is on the second one
        let short_week = Booking { id: 7, object_id: 1, week_number: 52, schedule_period_id: 9 };
        let err = unit.resolve(&short_week).unwrap_err();
        assert_eq!(err.to_string(), "failed to get date for reservation 7");
    }

    #[test]
    fn stop_at_midnight() {
        let unit = sample_unit();
        let booking = Booking { id: 1, object_id: 1, week_number: 3, schedule_period_id: 10 };
        let resolved = unit.resolve(&booking).unwrap();
        assert_eq!(resolved.start.format("%Y-%m-%d %H:%M").to_string(), "2024-01-17 23:00");
        assert_eq!(resolved.end.format("%Y-%m-%d %H:%M").to_string(), "2024-01-18 00:00");
    }

    #[test]
    fn local_time_conversion() {
        // Summer time
        let t = to_local_time("2024-07-01", 13 * 60 + 45).unwrap();
        assert_eq!(t.to_rfc3339(), "2024-07-01T13:45:00+02:00");

        // 02:30 does not exist on the night Stockholm switches to summer time, it is 03:30 instead
        let t = to_local_time("2024-03-31", 150).unwrap();
        assert_eq!(t.to_rfc3339(), "2024-03-31T03:30:00+02:00");
        // 02:30 happens twice when it switches back: keep the first one
        let t = to_local_time("2024-10-27", 150).unwrap();
        assert_eq!(t.to_rfc3339(), "2024-10-27T02:30:00+02:00");

        assert_eq!(to_local_time("15/01/2024", 0), None);
        assert_eq!(to_local_time("2024-02-30", 0), None);
        assert_eq!(to_local_time("", 0), None);
    }

    #[test]
    fn booking_across_the_spring_gap() {
        let unit = LaundryUnit {
            id: 1,
            name: "Unit".to_string(),
            week_list: vec![week(13, &["2024-03-31"])],
            schedule_period_list: vec![vec![period(1, 120, 180)]],
        };
        let booking = Booking { id: 42, object_id: 1, week_number: 13, schedule_period_id: 1 };

        // 02:00-03:00 is exactly the hour that is skipped that night
        let resolved = unit.resolve(&booking).unwrap();
        assert_eq!(resolved.start.to_rfc3339(), "2024-03-31T03:00:00+02:00");
        assert_eq!(resolved.end.to_rfc3339(), "2024-03-31T03:00:00+02:00");
    }

    #[test]
    fn malformed_date_names_the_reservation() {
        let unit = LaundryUnit {
            id: 1,
            name: "Unit".to_string(),
            week_list: vec![week(3, &["15 januari"])],
            schedule_period_list: vec![vec![period(7, 480, 540)]],
        };
        let booking = Booking { id: 314, object_id: 1, week_number: 3, schedule_period_id: 7 };

        let err = unit.resolve(&booking).unwrap_err();
        assert!(matches!(err, Error::BadDate { reservation: 314, .. }));
        assert_eq!(err.to_string(), "bad date \"15 januari\" for reservation 314");
    }

    #[test]
    fn booking_view_picks_the_owning_unit() {
        let other = LaundryUnit {
            id: 2,
            name: "Torkrum".to_string(),
            week_list: vec![week(3, &["2024-01-22"])],
            schedule_period_list: vec![vec![period(70, 480, 540)]],
        };
        let view = BookingView {
            time_stamp: "2024-01-10 12:00".to_string(),
            laundry_units: vec![sample_unit(), other],
        };

        let booking = Booking { id: 1, object_id: 1, week_number: 3, schedule_period_id: 70 };
        let resolved = view.resolve(&booking).unwrap();
        assert_eq!(resolved.unit_name, "Torkrum");
        assert_eq!(resolved.start.format("%Y-%m-%d %H:%M").to_string(), "2024-01-22 08:00");

        let booking = Booking { id: 2, object_id: 1, week_number: 3, schedule_period_id: 71 };
        assert!(matches!(view.resolve(&booking), Err(Error::Unresolved(2))));
    }

    #[test]
    fn decode_server_json() {
        let json = r#"{
            "TimeStamp": "2024-01-10 12:00:00",
            "LaundryUnits": [{
                "Id": 12,
                "Name": "Tvättstuga",
                "WeekList": [{"WeekNumber": 3, "WeekDays": [{"Date": "2024-01-15"}]}],
                "SchedulePeriodList": [[{"Id": 7, "StartTime": 480, "StopTime": 540}]]
            }]
        }"#;
        let view: BookingView = serde_json::from_str(json).unwrap();
        assert_eq!(view.laundry_units[0].id, 12);
        assert_eq!(view.laundry_units[0].period_for(7), Some((0, &period(7, 480, 540))));

        let owned: OwnedReservations = serde_json::from_str(
            r#"{"Bookings": [{"Id": 1, "ObjectId": 12, "WeekNumber": 3, "SchedulePeriodId": 7}]}"#
        ).unwrap();
        assert_eq!(owned.bookings, vec![Booking { id: 1, object_id: 12, week_number: 3, schedule_period_id: 7 }]);

        let empty: OwnedReservations = serde_json::from_str("{}").unwrap();
        assert!(empty.bookings.is_empty());

        let objects: Vec<Object> = serde_json::from_str(r#"[{"id": 12, "name": "Tvättstuga"}]"#).unwrap();
        assert_eq!(objects, vec![Object { id: 12, name: "Tvättstuga".to_string() }]);
    }
}
