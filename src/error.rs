use sea_orm::{DbErr, SqlErr};

use crate::validation::{DUPLICATE_SEAT, FieldErrors, NON_FIELD_ERRORS, Seat};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("seat out of range: {0}")]
    SeatOutOfRange(FieldErrors),

    #[error(
        "seat (row: {}, seat: {}) is already taken for session {movie_session_id}",
        .seat.row,
        .seat.seat
    )]
    DuplicateSeat { movie_session_id: i32, seat: Seat },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Db(DbErr),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    /// Caller-recoverable errors in field → messages form. `None` for
    /// errors the caller cannot fix by changing its input.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::SeatOutOfRange(errors) => Some(errors.clone()),
            Self::DuplicateSeat { seat, .. } => {
                let mut errors = FieldErrors::new();
                errors.add(
                    NON_FIELD_ERRORS,
                    DUPLICATE_SEAT,
                    format!("row {} seat {} is already taken", seat.row, seat.seat),
                );
                Some(errors)
            }
            _ => None,
        }
    }

    /// Maps a failed ticket write; the only unique index on `ticket` besides
    /// the primary key is the per-session seat.
    pub(crate) fn from_ticket_write(err: DbErr, movie_session_id: i32, seat: Seat) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::DuplicateSeat { movie_session_id, seat }
            }
            _ => err.into(),
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::ConstraintViolation(msg),
            _ if is_constraint_message(&err) => Self::ConstraintViolation(err.to_string()),
            _ => Self::Db(err),
        }
    }
}

// CHECK and NOT NULL failures are not classified by `sql_err`.
fn is_constraint_message(err: &DbErr) -> bool {
    err.to_string().contains("constraint failed")
}

pub type AppResult<T> = Result<T, AppError>;
