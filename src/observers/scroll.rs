use crate::events::EventKind;

pub const SCROLL_THRESHOLDS: [u8; 5] = [25, 50, 75, 90, 100];

#[derive(Debug, Clone, Copy)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Percentage scrolled, or `None` when the page cannot scroll.
    pub fn depth_percent(&self) -> Option<f64> {
        let range = self.scroll_height - self.client_height;
        if !range.is_finite() || range <= 0.0 || !self.scroll_top.is_finite() {
            return None;
        }
        Some((self.scroll_top / range * 100.0).clamp(0.0, 100.0))
    }
}

#[derive(Debug, Default)]
pub struct ScrollTracker {
    fired: [bool; SCROLL_THRESHOLDS.len()],
    max_depth: Option<u8>,
    finished: bool,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thresholds crossed for the first time, ascending.
    pub fn observe(&mut self, metrics: ScrollMetrics) -> Vec<EventKind> {
        let Some(depth) = metrics.depth_percent() else {
            return Vec::new();
        };
        // floored so the maximum never claims a threshold that did not fire
        let reached = depth.floor() as u8;
        self.max_depth = Some(self.max_depth.map_or(reached, |max| max.max(reached)));

        let mut events = Vec::new();
        for (fired, threshold) in self.fired.iter_mut().zip(SCROLL_THRESHOLDS) {
            if !*fired && depth >= f64::from(threshold) {
                *fired = true;
                events.push(EventKind::ScrollDepth { depth: threshold });
            }
        }
        events
    }

    pub fn max_depth(&self) -> Option<u8> {
        self.max_depth
    }

    /// The unload summary. Emitted at most once, and only after a scroll.
    pub fn finish(&mut self) -> Option<EventKind> {
        if self.finished {
            return None;
        }
        self.finished = true;
        self.max_depth.map(|max_depth| EventKind::MaxScrollDepth { max_depth })
    }
}
