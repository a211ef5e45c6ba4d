use crate::config::TrackerConfig;
use crate::errors::TrackError;
use crate::events::{BehaviorEvent, EventKind};
use crate::outbox::{DeliveryFailure, Outbox};
use crate::session::SessionContext;
use crate::transport::RestTransport;
use chrono::{DateTime, Utc};
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tracing::{debug, error};

pub const DEFAULT_EVENTS_TABLE: &str = "user_behavior";

/// Stamps events with the session context and hands them to the outbox.
#[derive(Clone)]
pub struct Tracker {
    session: SessionContext,
    outbox: Outbox,
    table: String,
}

impl Tracker {
    pub fn new(session: SessionContext, outbox: Outbox, table: impl Into<String>) -> Self {
        Self {
            session,
            outbox,
            table: table.into(),
        }
    }

    /// Wires a tracker to the hosted database described by `config`.
    pub fn connect(
        session: SessionContext,
        config: TrackerConfig,
    ) -> Result<(Self, UnboundedReceiver<DeliveryFailure>, JoinHandle<()>), TrackError> {
        let transport = RestTransport::new(config.rest)?;
        let (outbox, failures, worker) = Outbox::spawn(transport, config.outbox);
        Ok((Self::new(session, outbox, config.events_table), failures, worker))
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn event(&self, kind: EventKind) -> BehaviorEvent {
        self.event_at(kind, Utc::now())
    }

    pub fn event_at(&self, kind: EventKind, at: DateTime<Utc>) -> BehaviorEvent {
        BehaviorEvent::new(kind, &self.session, at)
    }

    /// Fire-and-forget; delivery problems go to the outbox failure channel.
    pub fn track(&self, kind: EventKind) {
        let event = self.event(kind);
        match serde_json::to_value(&event) {
            Ok(record) => {
                debug!(event_type = event.kind.name(), "tracking event");
                self.outbox.enqueue(self.table.as_str(), record);
            }
            Err(err) => error!(event_type = event.kind.name(), "failed to serialise event: {err}"),
        }
    }

    pub fn track_all(&self, kinds: impl IntoIterator<Item = EventKind>) {
        for kind in kinds {
            self.track(kind);
        }
    }

    pub fn page_view(&self) {
        self.track(EventKind::PageView {});
    }
}
