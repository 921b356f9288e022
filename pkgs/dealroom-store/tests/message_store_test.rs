// Copyright 2024 DealRoom Team.
//
// Tests for MessageStore and ConversationStore against a real SQLite file

use dealroom_store::{
    ConversationStore, MessageStore, NewMessage, PersistenceConfig, ThreadFilter,
};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tempfile::NamedTempFile;

async fn create_test_db(path: &NamedTempFile) -> DatabaseConnection {
    let config = PersistenceConfig {
        db_path: path.path().to_path_buf(),
        ..Default::default()
    };
    dealroom_store::connect(&config)
        .await
        .expect("Failed to open database")
}

fn new_message(sender: i64, recipient: i64, deal: Option<i64>, body: &str) -> NewMessage {
    NewMessage {
        sender_id: sender,
        recipient_id: recipient,
        deal_id: deal,
        body: body.to_string(),
    }
}

#[tokio::test]
async fn test_insert_and_get() {
    let temp_file = NamedTempFile::new().unwrap();
    let store = MessageStore::new(create_test_db(&temp_file).await);

    let sent = store
        .insert(new_message(1, 2, Some(42), "Interested in your deal"))
        .await
        .expect("Failed to insert message");

    assert!(!sent.is_read);
    assert_eq!(sent.deal_id, Some(42));

    let fetched = store.get(sent.id).await.unwrap().unwrap();
    assert_eq!(fetched, sent);
    assert!(store.get(sent.id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn test_ids_strictly_increase() {
    let temp_file = NamedTempFile::new().unwrap();
    let store = MessageStore::new(create_test_db(&temp_file).await);

    let mut last = 0;
    for i in 0..5 {
        let msg = store
            .insert(new_message(1, 2, None, &format!("message {}", i)))
            .await
            .unwrap();
        assert!(msg.id > last);
        last = msg.id;
    }
}

#[tokio::test]
async fn test_thread_contains_both_directions_in_order() {
    let temp_file = NamedTempFile::new().unwrap();
    let store = MessageStore::new(create_test_db(&temp_file).await);

    let m1 = store.insert(new_message(1, 2, None, "hello")).await.unwrap();
    store.insert(new_message(3, 2, None, "other thread")).await.unwrap();
    let m2 = store.insert(new_message(2, 1, None, "hi back")).await.unwrap();
    let m3 = store.insert(new_message(1, 2, None, "again")).await.unwrap();

    let thread = store
        .list_between(1, 2, ThreadFilter::default())
        .await
        .unwrap();
    let ids: Vec<_> = thread.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![m1.id, m2.id, m3.id]);

    // Same thread from the other side
    let mirrored = store
        .list_between(2, 1, ThreadFilter::default())
        .await
        .unwrap();
    assert_eq!(mirrored.len(), 3);
}

#[tokio::test]
async fn test_thread_filters() {
    let temp_file = NamedTempFile::new().unwrap();
    let store = MessageStore::new(create_test_db(&temp_file).await);

    let first = store.insert(new_message(1, 2, Some(7), "deal 7")).await.unwrap();
    store.insert(new_message(2, 1, Some(8), "deal 8")).await.unwrap();
    let third = store.insert(new_message(2, 1, Some(7), "deal 7 again")).await.unwrap();

    let deal_seven = store
        .list_between(
            1,
            2,
            ThreadFilter {
                deal_id: Some(7),
                since_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(deal_seven.len(), 2);

    let newer = store
        .list_between(
            1,
            2,
            ThreadFilter {
                deal_id: None,
                since_id: Some(first.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(newer.len(), 2);
    assert_eq!(newer.last().unwrap().id, third.id);
}

#[tokio::test]
async fn test_list_between_is_pure_read() {
    let temp_file = NamedTempFile::new().unwrap();
    let store = MessageStore::new(create_test_db(&temp_file).await);

    store.insert(new_message(1, 2, None, "unread")).await.unwrap();
    store.list_between(2, 1, ThreadFilter::default()).await.unwrap();

    assert_eq!(store.count_unread(2).await.unwrap(), 1);
}

#[tokio::test]
async fn test_fetch_and_acknowledge() {
    let temp_file = NamedTempFile::new().unwrap();
    let store = MessageStore::new(create_test_db(&temp_file).await);

    store.insert(new_message(1, 2, None, "one")).await.unwrap();
    store.insert(new_message(1, 2, None, "two")).await.unwrap();
    store.insert(new_message(2, 1, None, "reply")).await.unwrap();

    let fetched = store
        .fetch_and_acknowledge(2, 1, ThreadFilter::default())
        .await
        .unwrap();
    assert_eq!(fetched.len(), 3);
    // Returned with the state they had when read
    assert!(fetched.iter().filter(|m| m.recipient_id == 2).all(|m| !m.is_read));

    assert_eq!(store.count_unread(2).await.unwrap(), 0);
    // The reply to user 1 stays unread
    assert_eq!(store.count_unread(1).await.unwrap(), 1);

    let again = store
        .fetch_and_acknowledge(2, 1, ThreadFilter::default())
        .await
        .unwrap();
    assert!(again.iter().filter(|m| m.recipient_id == 2).all(|m| m.is_read));
}

#[tokio::test]
async fn test_mark_read_counts_only_recipients_unread_messages() {
    let temp_file = NamedTempFile::new().unwrap();
    let store = MessageStore::new(create_test_db(&temp_file).await);

    let m5 = store.insert(new_message(1, 2, None, "to 2")).await.unwrap();
    let m6 = store.insert(new_message(1, 2, None, "to 2 as well")).await.unwrap();
    let m7 = store.insert(new_message(2, 1, None, "to 1")).await.unwrap();

    let updated = store.mark_read(&[m5.id, m6.id, m7.id], 2).await.unwrap();
    assert_eq!(updated, 2);

    // Already read messages are not counted again
    assert_eq!(store.mark_read(&[m5.id, m6.id], 2).await.unwrap(), 0);
    assert_eq!(store.mark_read(&[], 2).await.unwrap(), 0);

    assert!(!store.get(m7.id).await.unwrap().unwrap().is_read);
}

/// More unread messages than SQLite accepts as bound parameters
const LARGE_THREAD: i64 = 33_001;

async fn seed_unread_thread(db: &DatabaseConnection, sender: i64, recipient: i64, count: i64) {
    db.execute_unprepared(&format!(
        "WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < {count}) \
         INSERT INTO messages (sender_id, recipient_id, body, is_read, created_at) \
         SELECT {sender}, {recipient}, 'bulk ' || n, 0, 1700000000000 + n FROM seq"
    ))
    .await
    .expect("Failed to seed messages");
}

#[tokio::test]
async fn test_fetch_and_acknowledge_large_thread() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = create_test_db(&temp_file).await;
    seed_unread_thread(&db, 1, 2, LARGE_THREAD).await;
    let store = MessageStore::new(db);

    assert_eq!(store.count_unread(2).await.unwrap(), LARGE_THREAD as u64);

    let fetched = store
        .fetch_and_acknowledge(2, 1, ThreadFilter::default())
        .await
        .unwrap();
    assert_eq!(fetched.len(), LARGE_THREAD as usize);
    assert_eq!(store.count_unread(2).await.unwrap(), 0);
}

#[tokio::test]
async fn test_mark_read_large_id_list() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = create_test_db(&temp_file).await;
    seed_unread_thread(&db, 1, 2, LARGE_THREAD).await;
    let store = MessageStore::new(db);

    let ids: Vec<i64> = store
        .list_between(2, 1, ThreadFilter::default())
        .await
        .unwrap()
        .iter()
        .map(|m| m.id)
        .collect();

    assert_eq!(store.mark_read(&ids, 2).await.unwrap(), LARGE_THREAD as u64);
    assert_eq!(store.count_unread(2).await.unwrap(), 0);
}

#[tokio::test]
async fn test_acknowledge_only_the_filtered_thread() {
    let temp_file = NamedTempFile::new().unwrap();
    let store = MessageStore::new(create_test_db(&temp_file).await);

    let old = store.insert(new_message(1, 2, Some(42), "old")).await.unwrap();
    store.insert(new_message(1, 2, Some(42), "new")).await.unwrap();
    let other_deal = store.insert(new_message(1, 2, Some(7), "other deal")).await.unwrap();
    let other_user = store.insert(new_message(3, 2, Some(42), "other user")).await.unwrap();

    let filter = ThreadFilter {
        deal_id: Some(42),
        since_id: Some(old.id),
    };
    let fetched = store.fetch_and_acknowledge(2, 1, filter).await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].body, "new");

    assert!(!store.get(old.id).await.unwrap().unwrap().is_read);
    assert!(!store.get(other_deal.id).await.unwrap().unwrap().is_read);
    assert!(!store.get(other_user.id).await.unwrap().unwrap().is_read);
    assert_eq!(store.count_unread(2).await.unwrap(), 3);
}

#[tokio::test]
async fn test_read_state_never_reverts() {
    let temp_file = NamedTempFile::new().unwrap();
    let store = MessageStore::new(create_test_db(&temp_file).await);

    let msg = store.insert(new_message(1, 2, None, "hello")).await.unwrap();
    store.mark_read(&[msg.id], 2).await.unwrap();
    store.list_between(1, 2, ThreadFilter::default()).await.unwrap();
    store.fetch_and_acknowledge(1, 2, ThreadFilter::default()).await.unwrap();

    assert!(store.get(msg.id).await.unwrap().unwrap().is_read);
}

#[tokio::test]
async fn test_conversations_from_store() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = create_test_db(&temp_file).await;
    let store = MessageStore::new(db.clone());
    let conversations = ConversationStore::new(db);

    store.insert(new_message(1, 2, None, "a")).await.unwrap();
    store.insert(new_message(2, 1, None, "b")).await.unwrap();
    store.insert(new_message(2, 1, None, "c")).await.unwrap();
    let last = store.insert(new_message(3, 1, Some(5), "d")).await.unwrap();

    let list = conversations.list_conversations(1).await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].counterparty_id, 3);
    assert_eq!(list[0].last_message.id, last.id);
    assert_eq!(list[0].unread_count, 1);
    assert_eq!(list[1].counterparty_id, 2);
    assert_eq!(list[1].unread_count, 2);
    assert_eq!(list[1].message_count, 3);

    // Sender side sees no unread messages
    let for_two = conversations.list_conversations(2).await.unwrap();
    assert_eq!(for_two.len(), 1);
    assert_eq!(for_two[0].unread_count, 1);

    assert!(conversations.list_conversations(9).await.unwrap().is_empty());
}
