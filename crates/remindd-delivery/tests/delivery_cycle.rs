//! End-to-end cycle tests: in-memory store, stub transports.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;

use remindd_delivery::DeliveryEngine;
use remindd_mailer::{MailReceipt, Mailer, MailerError, OutgoingMail};
use remindd_store::{db::init_db, ReminderStore};

/// Records every send; always succeeds.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<MailReceipt, MailerError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(mail.clone());
        Ok(MailReceipt {
            message_id: format!("<{}@stub>", sent.len()),
        })
    }
}

/// Never delivers anything.
struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: &OutgoingMail) -> Result<MailReceipt, MailerError> {
        Err(MailerError::Transport("relay unavailable".to_string()))
    }
}

/// Fails the first call, succeeds afterwards.
#[derive(Default)]
struct FlakyMailer {
    calls: AtomicUsize,
}

#[async_trait]
impl Mailer for FlakyMailer {
    async fn send(&self, _mail: &OutgoingMail) -> Result<MailReceipt, MailerError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(MailerError::Transport("connection reset".to_string()))
        } else {
            Ok(MailReceipt {
                message_id: "<flaky@stub>".to_string(),
            })
        }
    }
}

fn mem_store() -> Arc<ReminderStore> {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    init_db(&conn).expect("init schema");
    Arc::new(ReminderStore::new(conn))
}

fn engine(store: Arc<ReminderStore>, mailer: Arc<dyn Mailer>) -> DeliveryEngine {
    DeliveryEngine::new(store, mailer, Duration::from_secs(300), None)
}

#[tokio::test]
async fn due_reminder_is_sent_exactly_once() {
    let store = mem_store();
    let mailer = Arc::new(RecordingMailer::default());
    let engine = engine(Arc::clone(&store), mailer.clone());

    store
        .create(
            "ada@example.org",
            "stand-up in five",
            Utc::now() - chrono::Duration::minutes(5),
        )
        .unwrap();

    let stats = engine.cycle(Utc::now()).await.unwrap();
    assert_eq!(stats.due, 1);
    assert_eq!(stats.sent, 1);
    assert_eq!(stats.failed, 0);

    {
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@example.org");
        assert_eq!(sent[0].subject, "Reminder");
        assert_eq!(sent[0].text_body, "stand-up in five");
    }

    let all = store.list_ordered().unwrap();
    assert!(all[0].sent);

    // A later cycle finds nothing; delivery is idempotent.
    let stats = engine.cycle(Utc::now()).await.unwrap();
    assert_eq!(stats.due, 0);
    assert_eq!(mailer.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn future_reminder_is_left_alone() {
    let store = mem_store();
    let mailer = Arc::new(RecordingMailer::default());
    let engine = engine(Arc::clone(&store), mailer.clone());

    store
        .create(
            "ada@example.org",
            "tomorrow",
            Utc::now() + chrono::Duration::hours(24),
        )
        .unwrap();

    let stats = engine.cycle(Utc::now()).await.unwrap();
    assert_eq!(stats.due, 0);
    assert!(mailer.sent.lock().unwrap().is_empty());
    assert!(!store.list_ordered().unwrap()[0].sent);
}

#[tokio::test]
async fn reminder_due_days_ago_still_delivers() {
    let store = mem_store();
    let mailer = Arc::new(RecordingMailer::default());
    let engine = engine(Arc::clone(&store), mailer.clone());

    store
        .create(
            "ada@example.org",
            "long overdue",
            Utc::now() - chrono::Duration::days(3),
        )
        .unwrap();

    let stats = engine.cycle(Utc::now()).await.unwrap();
    assert_eq!(stats.sent, 1);
}

#[tokio::test]
async fn failed_send_stays_eligible_for_next_cycle() {
    let store = mem_store();
    let engine = engine(Arc::clone(&store), Arc::new(FailingMailer));

    store
        .create(
            "ada@example.org",
            "flaky",
            Utc::now() - chrono::Duration::minutes(1),
        )
        .unwrap();

    let stats = engine.cycle(Utc::now()).await.unwrap();
    assert_eq!(stats.due, 1);
    assert_eq!(stats.sent, 0);
    assert_eq!(stats.failed, 1);

    let record = &store.list_ordered().unwrap()[0];
    assert!(!record.sent);
    assert_eq!(record.attempts, 1);
    assert_eq!(record.last_error.as_deref(), Some("transport error: relay unavailable"));

    // Still due next time around.
    let stats = engine.cycle(Utc::now()).await.unwrap();
    assert_eq!(stats.due, 1);
    assert_eq!(store.list_ordered().unwrap()[0].attempts, 2);
}

#[tokio::test]
async fn one_failure_does_not_block_the_batch() {
    let store = mem_store();
    let engine = engine(Arc::clone(&store), Arc::new(FlakyMailer::default()));

    // Oldest first, so the earlier record takes the failing call.
    let first = store
        .create(
            "first@example.org",
            "fails",
            Utc::now() - chrono::Duration::minutes(10),
        )
        .unwrap();
    let second = store
        .create(
            "second@example.org",
            "succeeds",
            Utc::now() - chrono::Duration::minutes(5),
        )
        .unwrap();

    // The cycle must not raise even though a send inside it failed.
    let stats = engine.cycle(Utc::now()).await.unwrap();
    assert_eq!(stats.due, 2);
    assert_eq!(stats.sent, 1);
    assert_eq!(stats.failed, 1);

    let by_id = |id: &str| {
        store
            .list_ordered()
            .unwrap()
            .into_iter()
            .find(|r| r.id == id)
            .unwrap()
    };
    assert!(!by_id(&first.id).sent);
    assert!(by_id(&second.id).sent);
}

#[tokio::test]
async fn batch_limit_caps_cycle_work() {
    let store = mem_store();
    let mailer = Arc::new(RecordingMailer::default());
    let engine = DeliveryEngine::new(
        Arc::clone(&store),
        mailer.clone(),
        Duration::from_secs(300),
        Some(2),
    );

    for i in 0..3i64 {
        store
            .create(
                &format!("user{i}@example.org"),
                "queued",
                Utc::now() - chrono::Duration::minutes(30 - i),
            )
            .unwrap();
    }

    let stats = engine.cycle(Utc::now()).await.unwrap();
    assert_eq!(stats.due, 2);
    assert_eq!(stats.sent, 2);

    // The remainder is picked up by the following cycle.
    let stats = engine.cycle(Utc::now()).await.unwrap();
    assert_eq!(stats.due, 1);
    assert_eq!(mailer.sent.lock().unwrap().len(), 3);
}
