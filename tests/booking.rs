mod common;

use cinema::{
    AppError, NewTicket, Seat,
    entities::{order, ticket},
    validation,
};
use sea_orm::{ActiveModelTrait, DbErr, Set};

#[tokio::test]
async fn ticket_inside_the_hall_is_saved() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;
    let user = common::user(&stores, "alice").await;
    let order = common::order(&stores, &user).await;

    for seat in [Seat::new(1, 1), Seat::new(10, 15), Seat::new(5, 7)] {
        let ticket = stores
            .booking
            .create_ticket(NewTicket {
                movie_session_id: showing.session.id,
                order_id: order.id,
                seat,
            })
            .await
            .unwrap();
        assert_eq!(ticket.position(), seat);
    }

    let taken = stores.booking.taken_seats(showing.session.id).await.unwrap();
    assert_eq!(taken, vec![Seat::new(1, 1), Seat::new(5, 7), Seat::new(10, 15)]);
}

#[tokio::test]
async fn out_of_range_seats_are_rejected_before_the_write() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;
    let user = common::user(&stores, "alice").await;
    let order = common::order(&stores, &user).await;

    let cases = [
        (Seat::new(0, 5), vec!["row"]),
        (Seat::new(11, 5), vec!["row"]),
        (Seat::new(5, 0), vec!["seat"]),
        (Seat::new(5, 16), vec!["seat"]),
        (Seat::new(11, 16), vec!["row", "seat"]),
    ];
    for (seat, fields) in cases {
        let err = stores
            .booking
            .create_ticket(NewTicket {
                movie_session_id: showing.session.id,
                order_id: order.id,
                seat,
            })
            .await
            .unwrap_err();
        let AppError::SeatOutOfRange(errors) = err else {
            panic!("expected SeatOutOfRange for {seat:?}, got {err:?}");
        };
        assert_eq!(errors.fields().collect::<Vec<_>>(), fields);
    }

    assert!(stores.booking.tickets_for_session(showing.session.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn second_ticket_for_the_same_seat_is_a_duplicate() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;
    let alice = common::user(&stores, "alice").await;
    let bob = common::user(&stores, "bob").await;
    let first_order = common::order(&stores, &alice).await;
    let second_order = common::order(&stores, &bob).await;
    let seat = Seat::new(3, 4);

    let first = stores
        .booking
        .create_ticket(NewTicket {
            movie_session_id: showing.session.id,
            order_id: first_order.id,
            seat,
        })
        .await
        .unwrap();

    let err = stores
        .booking
        .create_ticket(NewTicket {
            movie_session_id: showing.session.id,
            order_id: second_order.id,
            seat,
        })
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            AppError::DuplicateSeat { movie_session_id, seat: s }
                if movie_session_id == showing.session.id && s == seat
        ),
        "got {err:?}"
    );

    let errors = err.field_errors().unwrap();
    assert_eq!(errors.get(validation::NON_FIELD_ERRORS)[0].code, validation::DUPLICATE_SEAT);

    let tickets = stores.booking.tickets_for_session(showing.session.id).await.unwrap();
    assert_eq!(tickets, vec![first]);
}

#[tokio::test]
async fn same_seat_in_another_session_is_free() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;
    let later: jiff::Timestamp = "2024-03-01T22:00:00Z".parse().unwrap();
    let other = stores
        .catalog
        .create_session(later, showing.hall.id, showing.movie.id)
        .await
        .unwrap();
    let user = common::user(&stores, "alice").await;
    let order = common::order(&stores, &user).await;
    let seat = Seat::new(2, 2);

    for session_id in [showing.session.id, other.id] {
        stores
            .booking
            .create_ticket(NewTicket { movie_session_id: session_id, order_id: order.id, seat })
            .await
            .unwrap();
    }

    assert_eq!(stores.booking.tickets_for_order(order.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn moving_a_ticket_is_validated() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;
    let user = common::user(&stores, "alice").await;
    let order = common::order(&stores, &user).await;
    let session_id = showing.session.id;

    let a = stores
        .booking
        .create_ticket(NewTicket {
            movie_session_id: session_id,
            order_id: order.id,
            seat: Seat::new(1, 1),
        })
        .await
        .unwrap();
    stores
        .booking
        .create_ticket(NewTicket {
            movie_session_id: session_id,
            order_id: order.id,
            seat: Seat::new(1, 2),
        })
        .await
        .unwrap();

    let err = stores.booking.update_ticket(a.id, Seat::new(1, 20)).await.unwrap_err();
    assert!(matches!(err, AppError::SeatOutOfRange(ref e) if e.contains("seat")), "got {err:?}");

    let err = stores.booking.update_ticket(a.id, Seat::new(1, 2)).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateSeat { .. }), "got {err:?}");

    let moved = stores.booking.update_ticket(a.id, Seat::new(9, 9)).await.unwrap();
    assert_eq!(moved.position(), Seat::new(9, 9));
    assert_eq!(stores.booking.ticket(a.id).await.unwrap(), moved);
}

#[tokio::test]
async fn direct_active_model_writes_are_validated_too() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;
    let user = common::user(&stores, "alice").await;
    let order = common::order(&stores, &user).await;

    let err = ticket::ActiveModel {
        movie_session_id: Set(showing.session.id),
        order_id: Set(order.id),
        row: Set(42),
        seat: Set(1),
        ..Default::default()
    }
    .insert(stores.booking.db())
    .await
    .unwrap_err();
    assert!(matches!(err, DbErr::Custom(ref msg) if msg.starts_with("row:")), "got {err:?}");

    let saved = ticket::ActiveModel {
        movie_session_id: Set(showing.session.id),
        order_id: Set(order.id),
        row: Set(2),
        seat: Set(3),
        ..Default::default()
    }
    .insert(stores.booking.db())
    .await
    .unwrap();

    let partial = ticket::ActiveModel { id: Set(saved.id), seat: Set(99), ..Default::default() };
    let err = partial.update(stores.booking.db()).await.unwrap_err();
    assert!(matches!(err, DbErr::Custom(ref msg) if msg.starts_with("seat:")), "got {err:?}");
}

#[tokio::test]
async fn ticket_for_missing_session_is_not_found() {
    let stores = common::stores().await;
    let user = common::user(&stores, "alice").await;
    let order = common::order(&stores, &user).await;

    let err = stores
        .booking
        .create_ticket(NewTicket {
            movie_session_id: 404,
            order_id: order.id,
            seat: Seat::new(1, 1),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { entity: "movie_session", id: 404 }), "got {err:?}");
}

#[tokio::test]
async fn ticket_for_missing_order_violates_a_constraint() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;

    let err = stores
        .booking
        .create_ticket(NewTicket {
            movie_session_id: showing.session.id,
            order_id: 404,
            seat: Seat::new(1, 1),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)), "got {err:?}");
}

#[tokio::test]
async fn deleting_a_session_removes_its_tickets() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;
    let later: jiff::Timestamp = "2024-03-02T19:30:00Z".parse().unwrap();
    let other = stores
        .catalog
        .create_session(later, showing.hall.id, showing.movie.id)
        .await
        .unwrap();
    let user = common::user(&stores, "alice").await;
    let order = common::order(&stores, &user).await;

    let doomed = stores
        .booking
        .create_ticket(NewTicket {
            movie_session_id: showing.session.id,
            order_id: order.id,
            seat: Seat::new(1, 1),
        })
        .await
        .unwrap();
    let kept = stores
        .booking
        .create_ticket(NewTicket {
            movie_session_id: other.id,
            order_id: order.id,
            seat: Seat::new(1, 1),
        })
        .await
        .unwrap();

    stores.catalog.delete_session(showing.session.id).await.unwrap();

    assert!(matches!(stores.booking.ticket(doomed.id).await, Err(AppError::NotFound { .. })));
    assert_eq!(stores.booking.tickets_for_order(order.id).await.unwrap(), vec![kept]);
}

#[tokio::test]
async fn deleting_an_order_removes_its_tickets() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;
    let user = common::user(&stores, "alice").await;
    let doomed = common::order(&stores, &user).await;
    let kept = common::order(&stores, &user).await;

    let seats = [
        (doomed.id, Seat::new(1, 1)),
        (doomed.id, Seat::new(1, 2)),
        (kept.id, Seat::new(2, 1)),
    ];
    for (order_id, seat) in seats {
        stores
            .booking
            .create_ticket(NewTicket { movie_session_id: showing.session.id, order_id, seat })
            .await
            .unwrap();
    }

    stores.booking.delete_order(doomed.id).await.unwrap();

    assert!(stores.booking.tickets_for_order(doomed.id).await.unwrap().is_empty());
    assert_eq!(
        stores.booking.taken_seats(showing.session.id).await.unwrap(),
        vec![Seat::new(2, 1)]
    );
}

#[tokio::test]
async fn orders_are_listed_newest_first() {
    let stores = common::stores().await;
    let alice = common::user(&stores, "alice").await;
    let bob = common::user(&stores, "bob").await;

    let first = common::order(&stores, &alice).await;
    let second = common::order(&stores, &bob).await;
    let third = common::order(&stores, &alice).await;
    assert!(first.created_at <= second.created_at && second.created_at <= third.created_at);

    let ids: Vec<_> = stores.booking.list_orders().await.unwrap().iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);

    let ids: Vec<_> =
        stores.booking.orders_for_user(alice.id).await.unwrap().iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![third.id, first.id]);
}

#[tokio::test]
async fn order_with_a_taken_seat_is_rolled_back() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;
    let alice = common::user(&stores, "alice").await;
    let bob = common::user(&stores, "bob").await;
    let session_id = showing.session.id;

    let (order, tickets) = stores
        .booking
        .create_order_with_tickets(alice.id, session_id, &[Seat::new(4, 4), Seat::new(4, 5)])
        .await
        .unwrap();
    assert_eq!(tickets.len(), 2);
    assert!(tickets.iter().all(|t| t.order_id == order.id));

    let err = stores
        .booking
        .create_order_with_tickets(bob.id, session_id, &[Seat::new(4, 6), Seat::new(4, 5)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateSeat { .. }), "got {err:?}");

    let err = stores
        .booking
        .create_order_with_tickets(bob.id, session_id, &[Seat::new(4, 6), Seat::new(40, 5)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SeatOutOfRange(_)), "got {err:?}");

    assert!(stores.booking.orders_for_user(bob.id).await.unwrap().is_empty());
    assert_eq!(stores.booking.taken_seats(session_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn ticket_label_names_the_showing_and_seat() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;
    let user = common::user(&stores, "alice").await;
    let order = common::order(&stores, &user).await;

    let ticket = stores
        .booking
        .create_ticket(NewTicket {
            movie_session_id: showing.session.id,
            order_id: order.id,
            seat: Seat::new(3, 8),
        })
        .await
        .unwrap();

    assert_eq!(
        stores.booking.ticket_label(ticket.id).await.unwrap(),
        "Dune 2024-03-01T19:30:00Z (row: 3, seat: 8)"
    );
}

#[tokio::test]
async fn orders_are_sorted_by_creation_time_not_by_id() {
    let stores = common::stores().await;
    let user = common::user(&stores, "alice").await;

    let mut ids = Vec::new();
    for created_at in [3, 1, 2] {
        let order = order::ActiveModel {
            created_at: Set(created_at),
            user_id: Set(user.id),
            ..Default::default()
        }
        .insert(stores.booking.db())
        .await
        .unwrap();
        ids.push(order.id);
    }

    let listed: Vec<_> = stores.booking.list_orders().await.unwrap().iter().map(|o| o.id).collect();
    assert_eq!(listed, vec![ids[0], ids[2], ids[1]]);

    let orders = stores.booking.orders_for_user(user.id).await.unwrap();
    let created: Vec<_> = orders.iter().map(|o| o.created_at).collect();
    assert_eq!(created, vec![3, 2, 1]);
}

#[tokio::test]
async fn direct_duplicate_seat_write_is_a_generic_constraint_violation() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;
    let user = common::user(&stores, "alice").await;
    let order = common::order(&stores, &user).await;

    let seat = || ticket::ActiveModel {
        movie_session_id: Set(showing.session.id),
        order_id: Set(order.id),
        row: Set(2),
        seat: Set(3),
        ..Default::default()
    };
    seat().insert(stores.booking.db()).await.unwrap();

    let err: AppError = seat().insert(stores.booking.db()).await.unwrap_err().into();
    assert!(matches!(err, AppError::ConstraintViolation(_)), "got {err:?}");
}

#[tokio::test]
async fn order_without_seats_has_no_tickets() {
    let stores = common::stores().await;
    let showing = common::showing(&stores).await;
    let user = common::user(&stores, "alice").await;

    let (order, tickets) = stores
        .booking
        .create_order_with_tickets(user.id, showing.session.id, &[])
        .await
        .unwrap();

    assert!(tickets.is_empty());
    assert_eq!(stores.booking.order(order.id).await.unwrap(), order);
    assert!(stores.booking.tickets_for_order(order.id).await.unwrap().is_empty());
}
