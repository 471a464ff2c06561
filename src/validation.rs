//! Seat validation for tickets.
//!
//! Bounds are checked here, before a write. Double-booking is left to the
//! `UNIQUE(movie_session_id, row, seat)` index so concurrent purchases race
//! on the storage engine rather than on a read-then-insert.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use crate::entities::cinema_hall;

pub const SEAT_OUT_OF_RANGE: &str = "seat_out_of_range";
pub const DUPLICATE_SEAT: &str = "duplicate_seat";

/// Key for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// A (row, seat) position inside a cinema hall, both 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Seat {
    pub row: i32,
    pub seat: i32,
}

impl Seat {
    pub fn new(row: i32, seat: i32) -> Self {
        Self { row, seat }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub code: &'static str,
}

/// Field name to the list of errors raised for it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<FieldError>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, code: &'static str, message: impl Into<String>) {
        self.0
            .entry(field)
            .or_default()
            .push(FieldError { message: message.into(), code });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[FieldError] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    /// Flattened `(field, message, code)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str, &'static str)> + '_ {
        self.0.iter().flat_map(|(field, errors)| {
            errors.iter().map(move |e| (*field, e.message.as_str(), e.code))
        })
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message, _)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Checks that `seat` lies inside `hall`. Both bounds are evaluated so a
/// bad row and a bad seat are reported together.
pub fn validate(seat: Seat, hall: &cinema_hall::Model) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if !(1..=hall.rows).contains(&seat.row) {
        errors.add(
            "row",
            SEAT_OUT_OF_RANGE,
            format!("row number must be in available range: (1, rows): (1, {})", hall.rows),
        );
    }

    if !(1..=hall.seats_in_row).contains(&seat.seat) {
        errors.add(
            "seat",
            SEAT_OUT_OF_RANGE,
            format!(
                "seat number must be in available range: (1, seats_in_row): (1, {})",
                hall.seats_in_row
            ),
        );
    }

    errors.into_result()
}
