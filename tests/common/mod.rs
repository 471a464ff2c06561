#![allow(dead_code)]

use cinema::{
    Config, NewMovie, NewUser, Stores,
    entities::{cinema_hall, movie, movie_session, order, user},
};

pub async fn stores() -> Stores {
    Stores::connect(&Config::in_memory()).await.expect("in-memory database")
}

pub struct Showing {
    pub hall: cinema_hall::Model,
    pub movie: movie::Model,
    pub session: movie_session::Model,
}

/// A 10x15 hall showing one movie.
pub async fn showing(stores: &Stores) -> Showing {
    let hall = stores.catalog.create_hall("Blue", 10, 15).await.unwrap();
    let movie = stores
        .catalog
        .create_movie(NewMovie {
            title: "Dune".to_string(),
            description: "Spice.".to_string(),
            actor_ids: vec![],
            genre_ids: vec![],
        })
        .await
        .unwrap();
    let show_time: jiff::Timestamp = "2024-03-01T19:30:00Z".parse().unwrap();
    let session = stores.catalog.create_session(show_time, hall.id, movie.id).await.unwrap();
    Showing { hall, movie, session }
}

pub async fn user(stores: &Stores, username: &str) -> user::Model {
    stores
        .accounts
        .create_user(NewUser {
            username: username.to_string(),
            password: "hunter22".to_string(),
            email: format!("{username}@example.com"),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub async fn order(stores: &Stores, user: &user::Model) -> order::Model {
    stores.booking.create_order(user.id).await.unwrap()
}
