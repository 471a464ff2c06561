use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DeleteResult, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    entities::{actor, cinema_hall, genre, movie, movie_actor, movie_genre, movie_session},
    error::{AppError, AppResult},
};

#[derive(Clone, Debug)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub actor_ids: Vec<i32>,
    pub genre_ids: Vec<i32>,
}

/// Movies, the people and genres attached to them, halls, and the sessions
/// that put a movie in a hall.
#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
}

impl Catalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    // Genres

    pub async fn create_genre(&self, name: &str) -> AppResult<genre::Model> {
        let model = genre::ActiveModel { name: Set(name.to_string()), ..Default::default() };
        let genre = model.insert(&self.db).await?;
        tracing::debug!(id = genre.id, name, "genre created");
        Ok(genre)
    }

    pub async fn genre(&self, id: i32) -> AppResult<genre::Model> {
        genre::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("genre", id))
    }

    pub async fn list_genres(&self) -> AppResult<Vec<genre::Model>> {
        Ok(genre::Entity::find().order_by_asc(genre::Column::Name).all(&self.db).await?)
    }

    pub async fn rename_genre(&self, id: i32, name: &str) -> AppResult<genre::Model> {
        let mut model = self.genre(id).await?.into_active_model();
        model.name = Set(name.to_string());
        Ok(model.update(&self.db).await?)
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        let res = genre::Entity::delete_by_id(id).exec(&self.db).await?;
        ensure_deleted(res, "genre", id)
    }

    // Actors

    pub async fn create_actor(&self, first_name: &str, last_name: &str) -> AppResult<actor::Model> {
        let model = actor::ActiveModel {
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            ..Default::default()
        };
        let actor = model.insert(&self.db).await?;
        tracing::debug!(id = actor.id, "actor created");
        Ok(actor)
    }

    pub async fn actor(&self, id: i32) -> AppResult<actor::Model> {
        actor::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("actor", id))
    }

    pub async fn list_actors(&self) -> AppResult<Vec<actor::Model>> {
        Ok(actor::Entity::find()
            .order_by_asc(actor::Column::LastName)
            .order_by_asc(actor::Column::FirstName)
            .all(&self.db)
            .await?)
    }

    pub async fn update_actor(
        &self,
        id: i32,
        first_name: &str,
        last_name: &str,
    ) -> AppResult<actor::Model> {
        let mut model = self.actor(id).await?.into_active_model();
        model.first_name = Set(first_name.to_string());
        model.last_name = Set(last_name.to_string());
        Ok(model.update(&self.db).await?)
    }

    pub async fn delete_actor(&self, id: i32) -> AppResult<()> {
        let res = actor::Entity::delete_by_id(id).exec(&self.db).await?;
        ensure_deleted(res, "actor", id)
    }

    // Movies

    pub async fn create_movie(&self, new: NewMovie) -> AppResult<movie::Model> {
        let txn = self.db.begin().await?;

        let movie = movie::ActiveModel {
            title: Set(new.title),
            description: Set(new.description),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        link_actors(&txn, movie.id, &new.actor_ids).await?;
        link_genres(&txn, movie.id, &new.genre_ids).await?;

        txn.commit().await?;

        tracing::debug!(
            id = movie.id,
            actors = new.actor_ids.len(),
            genres = new.genre_ids.len(),
            "movie created"
        );
        Ok(movie)
    }

    pub async fn movie(&self, id: i32) -> AppResult<movie::Model> {
        movie::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("movie", id))
    }

    pub async fn list_movies(&self) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find().order_by_asc(movie::Column::Title).all(&self.db).await?)
    }

    pub async fn find_movies_by_title(&self, title: &str) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find()
            .filter(movie::Column::Title.contains(title))
            .order_by_asc(movie::Column::Title)
            .all(&self.db)
            .await?)
    }

    pub async fn movie_actors(&self, movie_id: i32) -> AppResult<Vec<actor::Model>> {
        let movie = self.movie(movie_id).await?;
        Ok(movie.find_related(actor::Entity).all(&self.db).await?)
    }

    pub async fn movie_genres(&self, movie_id: i32) -> AppResult<Vec<genre::Model>> {
        let movie = self.movie(movie_id).await?;
        Ok(movie.find_related(genre::Entity).all(&self.db).await?)
    }

    pub async fn update_movie(
        &self,
        id: i32,
        title: &str,
        description: &str,
    ) -> AppResult<movie::Model> {
        let mut model = self.movie(id).await?.into_active_model();
        model.title = Set(title.to_string());
        model.description = Set(description.to_string());
        Ok(model.update(&self.db).await?)
    }

    /// Replaces the actor set of a movie.
    pub async fn set_movie_actors(&self, movie_id: i32, actor_ids: &[i32]) -> AppResult<()> {
        self.movie(movie_id).await?;
        let txn = self.db.begin().await?;
        movie_actor::Entity::delete_many()
            .filter(movie_actor::Column::MovieId.eq(movie_id))
            .exec(&txn)
            .await?;
        link_actors(&txn, movie_id, actor_ids).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Replaces the genre set of a movie.
    pub async fn set_movie_genres(&self, movie_id: i32, genre_ids: &[i32]) -> AppResult<()> {
        self.movie(movie_id).await?;
        let txn = self.db.begin().await?;
        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::MovieId.eq(movie_id))
            .exec(&txn)
            .await?;
        link_genres(&txn, movie_id, genre_ids).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn delete_movie(&self, id: i32) -> AppResult<()> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        ensure_deleted(res, "movie", id)
    }

    // Cinema halls

    pub async fn create_hall(
        &self,
        name: &str,
        rows: i32,
        seats_in_row: i32,
    ) -> AppResult<cinema_hall::Model> {
        let model = cinema_hall::ActiveModel {
            name: Set(name.to_string()),
            rows: Set(rows),
            seats_in_row: Set(seats_in_row),
            ..Default::default()
        };
        let hall = model.insert(&self.db).await?;
        tracing::debug!(id = hall.id, capacity = hall.capacity(), "cinema hall created");
        Ok(hall)
    }

    pub async fn hall(&self, id: i32) -> AppResult<cinema_hall::Model> {
        cinema_hall::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("cinema_hall", id))
    }

    pub async fn list_halls(&self) -> AppResult<Vec<cinema_hall::Model>> {
        Ok(cinema_hall::Entity::find().order_by_asc(cinema_hall::Column::Name).all(&self.db).await?)
    }

    /// Existing tickets are not re-checked against the new dimensions.
    pub async fn update_hall(
        &self,
        id: i32,
        name: &str,
        rows: i32,
        seats_in_row: i32,
    ) -> AppResult<cinema_hall::Model> {
        let mut model = self.hall(id).await?.into_active_model();
        model.name = Set(name.to_string());
        model.rows = Set(rows);
        model.seats_in_row = Set(seats_in_row);
        Ok(model.update(&self.db).await?)
    }

    pub async fn delete_hall(&self, id: i32) -> AppResult<()> {
        let res = cinema_hall::Entity::delete_by_id(id).exec(&self.db).await?;
        ensure_deleted(res, "cinema_hall", id)
    }

    // Movie sessions

    pub async fn create_session(
        &self,
        show_time: jiff::Timestamp,
        cinema_hall_id: i32,
        movie_id: i32,
    ) -> AppResult<movie_session::Model> {
        let model = movie_session::ActiveModel {
            show_time: Set(show_time.as_second()),
            cinema_hall_id: Set(cinema_hall_id),
            movie_id: Set(movie_id),
            ..Default::default()
        };
        let session = model.insert(&self.db).await?;
        tracing::debug!(id = session.id, cinema_hall_id, movie_id, %show_time, "session created");
        Ok(session)
    }

    pub async fn session(&self, id: i32) -> AppResult<movie_session::Model> {
        movie_session::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("movie_session", id))
    }

    pub async fn sessions_for_movie(&self, movie_id: i32) -> AppResult<Vec<movie_session::Model>> {
        Ok(movie_session::Entity::find()
            .filter(movie_session::Column::MovieId.eq(movie_id))
            .order_by_asc(movie_session::Column::ShowTime)
            .all(&self.db)
            .await?)
    }

    pub async fn sessions_in_hall(&self, hall_id: i32) -> AppResult<Vec<movie_session::Model>> {
        Ok(movie_session::Entity::find()
            .filter(movie_session::Column::CinemaHallId.eq(hall_id))
            .order_by_asc(movie_session::Column::ShowTime)
            .all(&self.db)
            .await?)
    }

    pub async fn reschedule_session(
        &self,
        id: i32,
        show_time: jiff::Timestamp,
    ) -> AppResult<movie_session::Model> {
        let mut model = self.session(id).await?.into_active_model();
        model.show_time = Set(show_time.as_second());
        Ok(model.update(&self.db).await?)
    }

    pub async fn session_label(&self, id: i32) -> AppResult<String> {
        let (session, movie) = movie_session::Entity::find_by_id(id)
            .find_also_related(movie::Entity)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("movie_session", id))?;
        let movie = movie.ok_or_else(|| AppError::not_found("movie", session.movie_id))?;
        Ok(session.label(&movie))
    }

    pub async fn delete_session(&self, id: i32) -> AppResult<()> {
        let res = movie_session::Entity::delete_by_id(id).exec(&self.db).await?;
        ensure_deleted(res, "movie_session", id)
    }
}

async fn link_actors<C: ConnectionTrait>(
    db: &C,
    movie_id: i32,
    actor_ids: &[i32],
) -> AppResult<()> {
    if actor_ids.is_empty() {
        return Ok(());
    }
    let rows = actor_ids.iter().map(|&actor_id| movie_actor::ActiveModel {
        movie_id: Set(movie_id),
        actor_id: Set(actor_id),
    });
    movie_actor::Entity::insert_many(rows).exec_without_returning(db).await?;
    Ok(())
}

async fn link_genres<C: ConnectionTrait>(
    db: &C,
    movie_id: i32,
    genre_ids: &[i32],
) -> AppResult<()> {
    if genre_ids.is_empty() {
        return Ok(());
    }
    let rows = genre_ids.iter().map(|&genre_id| movie_genre::ActiveModel {
        movie_id: Set(movie_id),
        genre_id: Set(genre_id),
    });
    movie_genre::Entity::insert_many(rows).exec_without_returning(db).await?;
    Ok(())
}

pub(crate) fn ensure_deleted(res: DeleteResult, entity: &'static str, id: i32) -> AppResult<()> {
    if res.rows_affected == 0 {
        return Err(AppError::not_found(entity, id));
    }
    tracing::debug!(entity, id, "deleted");
    Ok(())
}
