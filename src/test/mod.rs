//! Database-backed scenario tests. `#[sqlx::test]` provisions an
//! isolated database per test and applies `migrations/` before the body
//! runs.
use uuid::Uuid;

use crate::modules::message::model::InsertMessage;
use crate::modules::message::repository::MessageRepository;
use crate::modules::message::repository_pg::MessageRepositoryPg;
use crate::modules::room::model::NewRoom;
use crate::modules::room::repository::RoomRepository;
use crate::modules::room::repository_pg::RoomRepositoryPg;
use crate::modules::room::schema::{ParticipantRole, RoomType};

/// Walks an order room through the unread lifecycle: teknisi sends two
/// messages, the customer's unread count rises to 2, then marking the
/// room read drops it to 0 without touching the customer's own rows.
#[sqlx::test]
async fn scenario_order_room_unread_flow(pool: sqlx::PgPool) {
    let room_repo = RoomRepositoryPg::new(pool.clone());
    let message_repo = MessageRepositoryPg::new(pool.clone());

    let customer_id = Uuid::now_v7();
    let teknisi_id = Uuid::now_v7();
    let order_id = Uuid::now_v7();

    let room = room_repo
        .create(
            &NewRoom {
                _type: RoomType::Order,
                customer_id,
                teknisi_id: Some(teknisi_id),
                admin_id: None,
                order_id: Some(order_id),
                booking_id: None,
                name: Some("Order #1042".to_string()),
            },
            &pool,
        )
        .await
        .unwrap();

    for text in ["Device received", "Screen replacement started"] {
        message_repo
            .create(
                &InsertMessage {
                    room_id: room.id,
                    sender_type: ParticipantRole::Teknisi,
                    sender_id: teknisi_id,
                    sender_name: "Budi".to_string(),
                    message: text.to_string(),
                },
                &pool,
            )
            .await
            .unwrap();
    }

    let unread = message_repo.count_unread(&room.id, &customer_id, &pool).await.unwrap();
    assert_eq!(unread, 2);

    let affected =
        message_repo.mark_room_read(&room.id, &customer_id, &pool).await.unwrap();
    assert_eq!(affected, 2);

    let unread = message_repo.count_unread(&room.id, &customer_id, &pool).await.unwrap();
    assert_eq!(unread, 0);

    // marking again is a no-op
    let affected =
        message_repo.mark_room_read(&room.id, &customer_id, &pool).await.unwrap();
    assert_eq!(affected, 0);
}

/// Creating the same order room twice must yield one row; the second
/// call resolves to the existing room through the context lookup.
#[sqlx::test]
async fn scenario_idempotent_room_create(pool: sqlx::PgPool) {
    let room_repo = RoomRepositoryPg::new(pool.clone());

    let body = NewRoom {
        _type: RoomType::Order,
        customer_id: Uuid::now_v7(),
        teknisi_id: None,
        admin_id: None,
        order_id: Some(Uuid::now_v7()),
        booking_id: None,
        name: None,
    };

    let first = room_repo.create(&body, &pool).await.unwrap();

    let existing = room_repo.find_by_context(&body, &pool).await.unwrap();
    assert_eq!(existing.map(|r| r.id), Some(first.id));

    // the unique index rejects a second physical row for the same order
    assert!(room_repo.create(&body, &pool).await.is_err());

    // support rooms carry no context and may multiply
    let support = NewRoom {
        _type: RoomType::Support,
        customer_id: Uuid::now_v7(),
        teknisi_id: None,
        admin_id: None,
        order_id: None,
        booking_id: None,
        name: None,
    };
    let a = room_repo.create(&support, &pool).await.unwrap();
    let b = room_repo.create(&support, &pool).await.unwrap();
    assert_ne!(a.id, b.id);
}

/// Chat read-state and notification read-state are independent ledgers:
/// clearing one leaves the other untouched.
#[sqlx::test]
async fn scenario_read_state_independence(pool: sqlx::PgPool) {
    use crate::modules::notification::model::InsertNotification;
    use crate::modules::notification::repository::NotificationRepository;
    use crate::modules::notification::repository_pg::NotificationRepositoryPg;
    use crate::modules::notification::schema::NotificationType;

    let room_repo = RoomRepositoryPg::new(pool.clone());
    let message_repo = MessageRepositoryPg::new(pool.clone());
    let notification_repo = NotificationRepositoryPg::new(pool.clone());

    let customer_id = Uuid::now_v7();
    let admin_id = Uuid::now_v7();

    let room = room_repo
        .create(
            &NewRoom {
                _type: RoomType::Support,
                customer_id,
                teknisi_id: None,
                admin_id: Some(admin_id),
                order_id: None,
                booking_id: None,
                name: None,
            },
            &pool,
        )
        .await
        .unwrap();

    message_repo
        .create(
            &InsertMessage {
                room_id: room.id,
                sender_type: ParticipantRole::Admin,
                sender_id: admin_id,
                sender_name: "Support".to_string(),
                message: "How can we help?".to_string(),
            },
            &pool,
        )
        .await
        .unwrap();

    notification_repo
        .create(
            &InsertNotification {
                user_id: customer_id,
                _type: NotificationType::Chat,
                title: "New message".to_string(),
                message: "Support: How can we help?".to_string(),
                related_id: Some(room.id),
            },
            &pool,
        )
        .await
        .unwrap();

    // reading the room does not touch the notification ledger
    message_repo.mark_room_read(&room.id, &customer_id, &pool).await.unwrap();
    assert_eq!(notification_repo.count_unread(&customer_id, &pool).await.unwrap(), 1);

    // and clearing notifications does not resurrect message unreads
    notification_repo.mark_all_read(&customer_id, &pool).await.unwrap();
    assert_eq!(message_repo.count_unread(&room.id, &customer_id, &pool).await.unwrap(), 0);
}
