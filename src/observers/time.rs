use crate::events::EventKind;
use crate::tracker::Tracker;
use std::time::Duration;
use tokio::{task::JoinHandle, time::Instant};

pub const TIME_MILESTONES: [u64; 5] = [10, 30, 60, 120, 300];

/// Time-on-page milestones. Each event carries the milestone it belongs to
/// and the time that had actually elapsed when it was noticed.
#[derive(Debug, Default)]
pub struct TimeOnPage {
    fired: [bool; TIME_MILESTONES.len()],
    exited: bool,
}

impl TimeOnPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&mut self, elapsed: Duration) -> Vec<EventKind> {
        let elapsed_seconds = elapsed.as_secs();
        let mut events = Vec::new();
        for (fired, milestone) in self.fired.iter_mut().zip(TIME_MILESTONES) {
            if !*fired && elapsed_seconds >= milestone {
                *fired = true;
                events.push(EventKind::TimeOnPage {
                    milestone_seconds: milestone,
                    elapsed_seconds,
                });
            }
        }
        events
    }

    pub fn exit(&mut self, elapsed: Duration) -> Option<EventKind> {
        if self.exited {
            return None;
        }
        self.exited = true;
        Some(EventKind::PageExit {
            seconds_on_page: elapsed.as_secs(),
        })
    }
}

/// Sleeps until each milestone and tracks it. Abort the handle on unload.
pub fn spawn_milestones(tracker: Tracker, loaded_at: Instant) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = TimeOnPage::new();
        for milestone in TIME_MILESTONES {
            tokio::time::sleep_until(loaded_at + Duration::from_secs(milestone)).await;
            tracker.track_all(timer.poll(loaded_at.elapsed()));
        }
    })
}
