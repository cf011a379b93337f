//! This module handles conversion from resolved reservations to iCal files
//!
//! It is a thin wrapper around the `ics` crate.

mod builder;
pub use builder::build_calendar;

use crate::config::{ORG_NAME, PRODUCT_NAME};

pub fn default_prod_id() -> String {
    format!("-//{}//{}//EN", crate::config::setting(&ORG_NAME), crate::config::setting(&PRODUCT_NAME))
}
