pub mod actor;
pub mod cinema_hall;
pub mod genre;
pub mod movie;
pub mod movie_actor;
pub mod movie_genre;
pub mod movie_session;
pub mod order;
pub mod ticket;
pub mod user;

pub mod prelude {
    pub use super::{
        actor::Entity as Actor, cinema_hall::Entity as CinemaHall, genre::Entity as Genre,
        movie::Entity as Movie, movie_actor::Entity as MovieActor,
        movie_genre::Entity as MovieGenre, movie_session::Entity as MovieSession,
        order::Entity as Order, ticket::Entity as Ticket, user::Entity as User,
    };
}
