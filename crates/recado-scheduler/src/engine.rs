use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, Timelike};
use recado_channels::{MessageSender, NotificationSink};
use recado_core::config::SchedulerConfig;
use recado_core::types::{HistoryRecord, MissedWindowPolicy, ScheduleEntry};
use recado_store::{HistoryLedger, ScheduleStore};
use tracing::{error, info, warn};

/// Where the engine is within the current polling cycle.
#[derive(Debug)]
enum Phase {
    /// No active schedule, or the active one targets a later day.
    Idle,
    /// Today's entry is waiting for its minute.
    Armed {
        entry: ScheduleEntry,
        fire_at: NaiveDateTime,
    },
}

/// The daemon's polling state machine: Idle → Armed → Fired → Deactivated.
///
/// Every `poll_interval_secs` the engine re-derives its phase from
/// `schedule.json`; every `tick_secs` it checks whether an armed entry's
/// minute has arrived. Firing invokes the [`MessageSender`] exactly once,
/// appends the outcome to the ledger and deactivates the slot, success and
/// failure alike, with no retry. An active entry whose minute already passed
/// is handled by the configured [`MissedWindowPolicy`] and never fired.
pub struct SchedulerEngine {
    store: ScheduleStore,
    ledger: HistoryLedger,
    sender: Arc<dyn MessageSender>,
    notifier: Box<dyn NotificationSink>,
    cfg: SchedulerConfig,
    phase: Phase,
    /// Fingerprint of the last fired entry, kept until the store shows the
    /// slot inactive. Guards re-firing when the deactivation write failed.
    fired: Option<ScheduleEntry>,
}

impl SchedulerEngine {
    pub fn new(
        store: ScheduleStore,
        ledger: HistoryLedger,
        sender: Arc<dyn MessageSender>,
        notifier: Box<dyn NotificationSink>,
        cfg: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            sender,
            notifier,
            cfg,
            phase: Phase::Idle,
            fired: None,
        }
    }

    /// Main loop. Never returns: the daemon has no shutdown path and is
    /// terminated externally.
    pub async fn run(mut self) {
        info!(
            poll_secs = self.cfg.poll_interval_secs,
            tick_secs = self.cfg.tick_secs,
            "scheduler engine started"
        );

        let poll_every = Duration::from_secs(self.cfg.poll_interval_secs.max(1));
        let mut tick = tokio::time::interval(Duration::from_secs(self.cfg.tick_secs.max(1)));
        // First poll happens immediately on the first tick.
        let mut next_poll = tokio::time::Instant::now();

        loop {
            tick.tick().await;
            let now = Local::now().naive_local();
            if tokio::time::Instant::now() >= next_poll {
                self.poll(now);
                next_poll = tokio::time::Instant::now() + poll_every;
            }
            self.fire_due(now).await;
        }
    }

    /// One store inspection: re-derive the phase from the slot's content.
    ///
    /// Rewrites of the slot (new schedule, cancellation) are observed here,
    /// so a cancellation takes effect within one poll interval.
    fn poll(&mut self, now: NaiveDateTime) {
        let Some(entry) = self.store.load() else {
            self.disarm("slot is empty");
            self.fired = None;
            return;
        };
        if !entry.active {
            self.disarm("slot is inactive");
            self.fired = None;
            return;
        }

        // An entry we already fired but could not deactivate: retry the
        // write, never the send.
        if self.fired.as_ref().is_some_and(|f| f.same_slot(&entry)) {
            warn!("fired entry still active in store, retrying deactivation");
            if let Err(e) = self.store.deactivate() {
                error!("deactivation retry failed: {e}");
            }
            self.phase = Phase::Idle;
            return;
        }

        if let Err(e) = entry.validate() {
            warn!("stored entry is invalid, deactivating without sending: {e}");
            if let Err(e) = self.store.deactivate() {
                error!("could not deactivate invalid entry: {e}");
            }
            self.phase = Phase::Idle;
            return;
        }
        let Some(target) = entry.target() else {
            // validate() guarantees the moment resolves.
            return;
        };

        // Minute granularity: a target equal to the current minute still
        // fires; one strictly before it is a missed window.
        if truncate_to_minute(now) > target {
            self.miss(&entry);
            return;
        }

        if target.date() == now.date() {
            let rearm = match &self.phase {
                Phase::Armed { entry: armed, .. } => !armed.same_slot(&entry),
                Phase::Idle => true,
            };
            if rearm {
                info!(
                    recipient = %entry.recipient,
                    at = %entry.target_display(),
                    "armed"
                );
                self.phase = Phase::Armed {
                    fire_at: target,
                    entry,
                };
            }
        } else {
            // The job is for a later day; wait in Idle until its date.
            self.disarm("target is a later day");
        }
    }

    /// Fire the armed entry once its minute arrives.
    async fn fire_due(&mut self, now: NaiveDateTime) {
        let due = matches!(&self.phase, Phase::Armed { fire_at, .. } if now >= *fire_at);
        if !due {
            return;
        }
        if let Phase::Armed { entry, .. } = std::mem::replace(&mut self.phase, Phase::Idle) {
            self.fire(entry).await;
        }
    }

    /// Invoke the sender exactly once, record the outcome, deactivate the
    /// slot. A failed send is terminal: the entry is spent either way.
    async fn fire(&mut self, entry: ScheduleEntry) {
        info!(
            recipient = %entry.recipient,
            at = %entry.target_display(),
            "firing scheduled send"
        );

        let outcome = self
            .sender
            .send(&entry.recipient, &entry.body, entry.hour, entry.minute)
            .await;

        let record = match &outcome {
            Ok(()) => {
                info!(recipient = %entry.recipient, "message sent");
                HistoryRecord::success(&entry.recipient, &entry.body)
            }
            Err(e) => {
                error!(recipient = %entry.recipient, "send failed: {e}");
                HistoryRecord::failure(&entry.recipient, &entry.body, e.to_string())
            }
        };
        if let Err(e) = self.ledger.append(record) {
            error!("history append failed: {e}");
        }

        self.fired = Some(entry.clone());
        if let Err(e) = self.store.deactivate() {
            error!("deactivation after firing failed, retrying on next poll: {e}");
        }

        match outcome {
            Ok(()) => self.notifier.notify(
                "Recado",
                &format!("Message sent to {}", entry.recipient),
            ),
            Err(e) => self.notifier.notify(
                "Recado",
                &format!("Failed to send to {}: {e}", entry.recipient),
            ),
        }
    }

    /// Missed window: the target minute passed before the entry ever fired.
    /// Deactivate without sending; a missed firing is not retried.
    fn miss(&mut self, entry: &ScheduleEntry) {
        match self.cfg.missed_window {
            MissedWindowPolicy::Warn => {
                warn!(
                    recipient = %entry.recipient,
                    target = %entry.target_display(),
                    "target moment already passed, deactivating without sending"
                );
                self.notifier.notify(
                    "Recado",
                    &format!(
                        "Missed window: message to {} scheduled for {} was not sent",
                        entry.recipient,
                        entry.target_display()
                    ),
                );
            }
            MissedWindowPolicy::Silent => {
                info!(target = %entry.target_display(), "missed window, deactivating");
            }
        }
        if let Err(e) = self.store.deactivate() {
            error!("could not deactivate missed entry: {e}");
        }
        self.phase = Phase::Idle;
    }

    fn disarm(&mut self, reason: &str) {
        if matches!(self.phase, Phase::Armed { .. }) {
            info!(reason, "disarmed");
            self.phase = Phase::Idle;
        }
    }
}

fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}
