//! Persistence module split across one file per entity. Every store call opens
//! its own connection, runs a single statement and drops the connection.

mod appointments;
mod connection;
mod doctors;
mod patients;

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{ffi, Error as SqlError};

use crate::error::StoreError;
use crate::models::{DATE_FORMAT, TIME_FORMAT};

pub use appointments::AppointmentStore;
pub use connection::{Database, DEFAULT_DB_FILE};
pub use doctors::DoctorStore;
pub use patients::PatientStore;

/// Turn a UNIQUE violation into [`StoreError::Duplicate`] naming the field the
/// user has to change. Other constraint failures stay generic.
fn map_unique_constraint(err: SqlError, field: &'static str) -> StoreError {
    match &err {
        SqlError::SqliteFailure(code, _) if code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE => {
            StoreError::Duplicate { field }
        }
        _ => err.into(),
    }
}

/// Parse a text column into a typed value, reporting bad data as a column
/// conversion failure.
fn parse_column<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .map_err(|err| SqlError::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| SqlError::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

/// Times are written as `HH:MM`; rows touched by other tools may carry seconds.
fn parse_time(idx: usize, raw: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|err| SqlError::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
