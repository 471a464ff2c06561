use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CinemaHall::Table)
                    .if_not_exists()
                    .col(pk_auto(CinemaHall::Id))
                    .col(string(CinemaHall::Name))
                    .col(integer(CinemaHall::Rows).check(Expr::col(CinemaHall::Rows).gt(0)))
                    .col(
                        integer(CinemaHall::SeatsInRow)
                            .check(Expr::col(CinemaHall::SeatsInRow).gt(0)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(pk_auto(User::Id))
                    .col(string_uniq(User::Username))
                    .col(string(User::PasswordHash))
                    .col(string(User::Email))
                    .col(string(User::FirstName))
                    .col(string(User::LastName))
                    .col(ColumnDef::new(User::IsStaff).boolean().not_null().default(false))
                    .col(ColumnDef::new(User::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(User::IsSuperuser).boolean().not_null().default(false))
                    .col(big_integer(User::DateJoined))
                    .col(big_integer_null(User::LastLogin))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieSession::Table)
                    .if_not_exists()
                    .col(pk_auto(MovieSession::Id))
                    .col(big_integer(MovieSession::ShowTime))
                    .col(integer(MovieSession::CinemaHallId))
                    .col(integer(MovieSession::MovieId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_session_cinema_hall")
                            .from(MovieSession::Table, MovieSession::CinemaHallId)
                            .to(CinemaHall::Table, CinemaHall::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_session_movie")
                            .from(MovieSession::Table, MovieSession::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Order::Table)
                    .if_not_exists()
                    .col(pk_auto(Order::Id))
                    .col(big_integer(Order::CreatedAt))
                    .col(integer(Order::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_user")
                            .from(Order::Table, Order::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_created_at")
                    .table(Order::Table)
                    .col(Order::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(pk_auto(Ticket::Id))
                    .col(integer(Ticket::MovieSessionId))
                    .col(integer(Ticket::OrderId))
                    .col(integer(Ticket::Row))
                    .col(integer(Ticket::Seat))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_movie_session")
                            .from(Ticket::Table, Ticket::MovieSessionId)
                            .to(MovieSession::Table, MovieSession::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_order")
                            .from(Ticket::Table, Ticket::OrderId)
                            .to(Order::Table, Order::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_unique_seat")
                    .table(Ticket::Table)
                    .col(Ticket::MovieSessionId)
                    .col(Ticket::Row)
                    .col(Ticket::Seat)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_order")
                    .table(Ticket::Table)
                    .col(Ticket::OrderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Ticket::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Order::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieSession::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(CinemaHall::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum CinemaHall {
    Table,
    Id,
    Name,
    Rows,
    SeatsInRow,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    Username,
    PasswordHash,
    Email,
    FirstName,
    LastName,
    IsStaff,
    IsActive,
    IsSuperuser,
    DateJoined,
    LastLogin,
}

#[derive(DeriveIden)]
enum MovieSession {
    Table,
    Id,
    ShowTime,
    CinemaHallId,
    MovieId,
}

#[derive(DeriveIden)]
enum Order {
    Table,
    Id,
    CreatedAt,
    UserId,
}

#[derive(DeriveIden)]
enum Ticket {
    Table,
    Id,
    MovieSessionId,
    OrderId,
    Row,
    Seat,
}
