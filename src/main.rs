use cinema::{
    Config, Stores,
    entities::prelude::{CinemaHall, Movie, MovieSession, Order, Ticket, User},
};
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,cinema=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;
    let stores = Stores::connect(&config).await?;
    let db = stores.catalog.db();

    let movies = Movie::find().count(db).await?;
    let halls = CinemaHall::find().count(db).await?;
    let sessions = MovieSession::find().count(db).await?;
    let users = User::find().count(db).await?;
    let orders = Order::find().count(db).await?;
    let tickets = Ticket::find().count(db).await?;
    tracing::info!(movies, halls, sessions, users, orders, tickets, "database ready");

    Ok(())
}
