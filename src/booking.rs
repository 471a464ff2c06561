//! Orders and tickets.
//!
//! Every ticket write goes through [`Booking`]: the seat is validated against
//! the session's hall and written inside one transaction, and a collision on
//! the per-session seat index comes back as [`AppError::DuplicateSeat`].

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    catalog::ensure_deleted,
    entities::{cinema_hall, movie, movie_session, order, ticket},
    error::{AppError, AppResult},
    validation::{self, Seat},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewTicket {
    pub movie_session_id: i32,
    pub order_id: i32,
    pub seat: Seat,
}

#[derive(Clone)]
pub struct Booking {
    db: DatabaseConnection,
}

impl Booking {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    // Orders

    pub async fn create_order(&self, user_id: i32) -> AppResult<order::Model> {
        let order = insert_order(&self.db, user_id).await?;
        tracing::debug!(id = order.id, user_id, "order created");
        Ok(order)
    }

    pub async fn order(&self, id: i32) -> AppResult<order::Model> {
        order::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("order", id))
    }

    /// All orders, newest first.
    pub async fn list_orders(&self) -> AppResult<Vec<order::Model>> {
        Ok(newest_first(order::Entity::find()).all(&self.db).await?)
    }

    /// Orders placed by one user, newest first.
    pub async fn orders_for_user(&self, user_id: i32) -> AppResult<Vec<order::Model>> {
        Ok(newest_first(order::Entity::find())
            .filter(order::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?)
    }

    pub async fn delete_order(&self, id: i32) -> AppResult<()> {
        let res = order::Entity::delete_by_id(id).exec(&self.db).await?;
        ensure_deleted(res, "order", id)
    }

    /// Creates an order holding one ticket per seat. Nothing is written
    /// unless every seat is valid and free. An empty `seats` slice creates
    /// an order without tickets; more can be added with [`Self::create_ticket`].
    pub async fn create_order_with_tickets(
        &self,
        user_id: i32,
        movie_session_id: i32,
        seats: &[Seat],
    ) -> AppResult<(order::Model, Vec<ticket::Model>)> {
        let txn = self.db.begin().await?;

        let hall = hall_for_session(&txn, movie_session_id).await?;
        for &seat in seats {
            check_seat(seat, &hall, movie_session_id)?;
        }

        let order = insert_order(&txn, user_id).await?;
        let mut tickets = Vec::with_capacity(seats.len());
        for &seat in seats {
            let new = NewTicket { movie_session_id, order_id: order.id, seat };
            tickets.push(insert_ticket(&txn, new).await?);
        }

        txn.commit().await?;

        tracing::debug!(
            id = order.id,
            user_id,
            movie_session_id,
            tickets = tickets.len(),
            "order placed"
        );
        Ok((order, tickets))
    }

    // Tickets

    pub async fn create_ticket(&self, new: NewTicket) -> AppResult<ticket::Model> {
        let txn = self.db.begin().await?;

        let hall = hall_for_session(&txn, new.movie_session_id).await?;
        check_seat(new.seat, &hall, new.movie_session_id)?;
        let ticket = insert_ticket(&txn, new).await?;

        txn.commit().await?;

        tracing::debug!(
            id = ticket.id,
            movie_session_id = ticket.movie_session_id,
            row = ticket.row,
            seat = ticket.seat,
            "ticket created"
        );
        Ok(ticket)
    }

    /// Moves a ticket to another seat in the same session.
    pub async fn update_ticket(&self, id: i32, seat: Seat) -> AppResult<ticket::Model> {
        let txn = self.db.begin().await?;

        let current = ticket::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("ticket", id))?;
        let session_id = current.movie_session_id;

        let hall = hall_for_session(&txn, session_id).await?;
        check_seat(seat, &hall, session_id)?;

        let mut model = current.into_active_model();
        model.row = Set(seat.row);
        model.seat = Set(seat.seat);
        let ticket = ticket::Entity::update(model)
            .exec(&txn)
            .await
            .map_err(|err| AppError::from_ticket_write(err, session_id, seat))?;

        txn.commit().await?;

        tracing::debug!(id, row = seat.row, seat = seat.seat, "ticket moved");
        Ok(ticket)
    }

    pub async fn ticket(&self, id: i32) -> AppResult<ticket::Model> {
        ticket::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("ticket", id))
    }

    pub async fn tickets_for_session(
        &self,
        movie_session_id: i32,
    ) -> AppResult<Vec<ticket::Model>> {
        Ok(by_position(ticket::Entity::find())
            .filter(ticket::Column::MovieSessionId.eq(movie_session_id))
            .all(&self.db)
            .await?)
    }

    pub async fn tickets_for_order(&self, order_id: i32) -> AppResult<Vec<ticket::Model>> {
        Ok(by_position(ticket::Entity::find())
            .filter(ticket::Column::OrderId.eq(order_id))
            .all(&self.db)
            .await?)
    }

    pub async fn taken_seats(&self, movie_session_id: i32) -> AppResult<Vec<Seat>> {
        let tickets = self.tickets_for_session(movie_session_id).await?;
        Ok(tickets.iter().map(ticket::Model::position).collect())
    }

    pub async fn ticket_label(&self, id: i32) -> AppResult<String> {
        let ticket = self.ticket(id).await?;
        let (session, movie) = movie_session::Entity::find_by_id(ticket.movie_session_id)
            .find_also_related(movie::Entity)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("movie_session", ticket.movie_session_id))?;
        let movie = movie.ok_or_else(|| AppError::not_found("movie", session.movie_id))?;
        Ok(ticket.label(&session.label(&movie)))
    }

    pub async fn delete_ticket(&self, id: i32) -> AppResult<()> {
        let res = ticket::Entity::delete_by_id(id).exec(&self.db).await?;
        ensure_deleted(res, "ticket", id)
    }
}

async fn hall_for_session<C: ConnectionTrait>(
    db: &C,
    movie_session_id: i32,
) -> AppResult<cinema_hall::Model> {
    movie_session::Entity::find_by_id(movie_session_id)
        .find_also_related(cinema_hall::Entity)
        .one(db)
        .await?
        .and_then(|(_, hall)| hall)
        .ok_or_else(|| AppError::not_found("movie_session", movie_session_id))
}

fn check_seat(seat: Seat, hall: &cinema_hall::Model, movie_session_id: i32) -> AppResult<()> {
    validation::validate(seat, hall).map_err(|errors| {
        tracing::warn!(
            movie_session_id,
            row = seat.row,
            seat = seat.seat,
            %errors,
            "ticket rejected"
        );
        AppError::SeatOutOfRange(errors)
    })
}

// Callers validate first; `Entity::insert` skips the `before_save` hook.
async fn insert_ticket<C: ConnectionTrait>(db: &C, new: NewTicket) -> AppResult<ticket::Model> {
    let model = ticket::ActiveModel {
        movie_session_id: Set(new.movie_session_id),
        order_id: Set(new.order_id),
        row: Set(new.seat.row),
        seat: Set(new.seat.seat),
        ..Default::default()
    };
    ticket::Entity::insert(model).exec_with_returning(db).await.map_err(|err| {
        let err = AppError::from_ticket_write(err, new.movie_session_id, new.seat);
        if matches!(err, AppError::DuplicateSeat { .. }) {
            tracing::warn!(
                movie_session_id = new.movie_session_id,
                row = new.seat.row,
                seat = new.seat.seat,
                "seat already taken"
            );
        }
        err
    })
}

async fn insert_order<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<order::Model> {
    let model = order::ActiveModel {
        created_at: Set(jiff::Timestamp::now().as_microsecond()),
        user_id: Set(user_id),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

fn newest_first(select: sea_orm::Select<order::Entity>) -> sea_orm::Select<order::Entity> {
    select.order_by_desc(order::Column::CreatedAt).order_by_desc(order::Column::Id)
}

fn by_position(select: sea_orm::Select<ticket::Entity>) -> sea_orm::Select<ticket::Entity> {
    select.order_by_asc(ticket::Column::Row).order_by_asc(ticket::Column::Seat)
}
