use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use remindd_mailer::{Mailer, OutgoingMail};
use remindd_store::{ReminderStore, StoreError};

use crate::error::Result;

/// Subject line for every delivered reminder.
const SUBJECT: &str = "Reminder";

/// Counters for one delivery cycle, logged and asserted on in tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    /// Records returned by the due query.
    pub due: usize,
    /// Records marked sent this cycle.
    pub sent: usize,
    /// Records whose send attempt failed and stay eligible.
    pub failed: usize,
}

/// Periodic delivery loop: finds due, unsent reminders and mails them.
///
/// All collaborators are injected at construction. The engine holds its
/// own store handle (a separate SQLite connection from the HTTP side)
/// and the process-wide mail transport.
pub struct DeliveryEngine {
    store: Arc<ReminderStore>,
    mailer: Arc<dyn Mailer>,
    interval: Duration,
    batch_limit: Option<u32>,
}

impl DeliveryEngine {
    pub fn new(
        store: Arc<ReminderStore>,
        mailer: Arc<dyn Mailer>,
        interval: Duration,
        batch_limit: Option<u32>,
    ) -> Self {
        Self {
            store,
            mailer,
            interval,
            batch_limit,
        }
    }

    /// Main loop. Runs one cycle per interval tick until `shutdown`
    /// broadcasts `true`. Cycle errors are logged, never fatal.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "delivery engine started"
        );
        let mut interval = tokio::time::interval(self.interval);
        // A cycle that overruns its tick must not trigger a catch-up
        // burst of back-to-back cycles.
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.cycle(Utc::now()).await {
                        Ok(stats) if stats.due > 0 => {
                            info!(
                                due = stats.due,
                                sent = stats.sent,
                                failed = stats.failed,
                                "delivery cycle complete"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => error!("delivery cycle failed: {e}"),
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("delivery engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Run one delivery cycle against a single eligibility instant.
    ///
    /// `now` is captured once per cycle so every record in the batch is
    /// judged against the same clock reading. Records are processed
    /// sequentially; mail relays are rate-sensitive and ordering keeps
    /// the logs readable.
    pub async fn cycle(&self, now: DateTime<Utc>) -> Result<CycleStats> {
        let due = self.store.find_due(now, self.batch_limit)?;
        let mut stats = CycleStats {
            due: due.len(),
            ..CycleStats::default()
        };

        for reminder in due {
            let mail = OutgoingMail {
                to: reminder.recipient.clone(),
                subject: SUBJECT.to_string(),
                text_body: reminder.body.clone(),
                html_body: None,
            };

            match self.mailer.send(&mail).await {
                Ok(receipt) => {
                    debug!(
                        reminder_id = %reminder.id,
                        message_id = %receipt.message_id,
                        "mail accepted by transport"
                    );
                    match self.store.mark_sent(&reminder.id) {
                        Ok(()) => {
                            info!(
                                reminder_id = %reminder.id,
                                recipient = %reminder.recipient,
                                "reminder sent"
                            );
                            stats.sent += 1;
                        }
                        // Another writer won the transition. The mail went
                        // out from here, so count it and move on.
                        Err(StoreError::NotFound { .. }) => {
                            debug!(reminder_id = %reminder.id, "already marked sent elsewhere");
                            stats.sent += 1;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Err(e) => {
                    warn!(
                        reminder_id = %reminder.id,
                        recipient = %reminder.recipient,
                        error = %e,
                        "send failed; will retry next cycle"
                    );
                    stats.failed += 1;
                    // Bookkeeping only; the record stays eligible either way.
                    if let Err(store_err) = self.store.record_failure(&reminder.id, &e.to_string())
                    {
                        warn!(
                            reminder_id = %reminder.id,
                            error = %store_err,
                            "could not record failed attempt"
                        );
                    }
                }
            }
        }

        Ok(stats)
    }
}
