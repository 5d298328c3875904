use chrono::{Local, NaiveDate};

use crate::error::GymError;

pub trait Clock {
    fn today(&self) -> NaiveDate;
}

impl<T: Clock + ?Sized> Clock for Box<T> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<NaiveDate, GymError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| GymError::InvalidDate(value.to_string()))
}
