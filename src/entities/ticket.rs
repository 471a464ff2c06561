use sea_orm::{ActiveValue, entity::prelude::*};

use crate::validation::{self, Seat};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ticket")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub movie_session_id: i32,
    pub order_id: i32,
    pub row: i32,
    pub seat: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::movie_session::Entity",
        from = "Column::MovieSessionId",
        to = "super::movie_session::Column::Id",
        on_delete = "Cascade"
    )]
    MovieSession,
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
}

impl Related<super::movie_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovieSession.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

/// Seat bounds are checked against the session's hall before every
/// `ActiveModel::insert`/`update`/`save`. Missing sessions are left to the
/// foreign key.
///
/// Only bounds are checked here. A taken seat written through this path fails
/// on the unique index and converts to `AppError::ConstraintViolation`;
/// `Booking` is the path that reports it as `AppError::DuplicateSeat`.
#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut session_id = set_value(&self.movie_session_id);
        let mut row = set_value(&self.row);
        let mut seat = set_value(&self.seat);

        if !insert && (session_id.is_none() || row.is_none() || seat.is_none()) {
            if let Some(id) = set_value(&self.id) {
                if let Some(current) = Entity::find_by_id(id).one(db).await? {
                    session_id = session_id.or(Some(current.movie_session_id));
                    row = row.or(Some(current.row));
                    seat = seat.or(Some(current.seat));
                }
            }
        }

        let (Some(session_id), Some(row), Some(seat)) = (session_id, row, seat) else {
            return Ok(self);
        };

        let hall = super::movie_session::Entity::find_by_id(session_id)
            .find_also_related(super::cinema_hall::Entity)
            .one(db)
            .await?
            .and_then(|(_, hall)| hall);
        let Some(hall) = hall else {
            return Ok(self);
        };

        validation::validate(Seat::new(row, seat), &hall)
            .map_err(|errors| DbErr::Custom(errors.to_string()))?;

        Ok(self)
    }
}

fn set_value(value: &ActiveValue<i32>) -> Option<i32> {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(*v),
        ActiveValue::NotSet => None,
    }
}

impl Model {
    pub fn position(&self) -> Seat {
        Seat::new(self.row, self.seat)
    }

    /// `"<session label> (row: R, seat: S)"`.
    pub fn label(&self, session_label: &str) -> String {
        format!("{session_label} (row: {}, seat: {})", self.row, self.seat)
    }
}
