use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movie_session")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Unix seconds.
    pub show_time: i64,
    pub cinema_hall_id: i32,
    pub movie_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cinema_hall::Entity",
        from = "Column::CinemaHallId",
        to = "super::cinema_hall::Column::Id",
        on_delete = "Cascade"
    )]
    CinemaHall,
    #[sea_orm(
        belongs_to = "super::movie::Entity",
        from = "Column::MovieId",
        to = "super::movie::Column::Id",
        on_delete = "Cascade"
    )]
    Movie,
    #[sea_orm(has_many = "super::ticket::Entity")]
    Ticket,
}

impl Related<super::cinema_hall::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CinemaHall.def()
    }
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movie.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn show_time(&self) -> Result<jiff::Timestamp, jiff::Error> {
        jiff::Timestamp::from_second(self.show_time)
    }

    /// `"<title> <show time>"`, e.g. `Dune 2024-03-01T19:30:00Z`.
    pub fn label(&self, movie: &super::movie::Model) -> String {
        match self.show_time() {
            Ok(ts) => format!("{} {ts}", movie.title),
            Err(_) => format!("{} {}", movie.title, self.show_time),
        }
    }
}
