use crate::events::EventKind;
use crate::links::{decorate_href, SETTLE_DELAY};
use crate::observers::{
    clicks, time::spawn_milestones, Element, FieldInfo, FormSnapshot, FormTracker, QuizIds,
    QuizTracker, ScrollMetrics, ScrollTracker, TimeOnPage,
};
use crate::tracker::Tracker;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// One page life: opened with a page view, closed on unload.
pub struct PageSession {
    tracker: Tracker,
    scroll: ScrollTracker,
    time: TimeOnPage,
    forms: FormTracker,
    quiz: QuizTracker,
    milestones: Option<JoinHandle<()>>,
}

impl PageSession {
    pub fn open(tracker: Tracker, quiz_ids: QuizIds) -> Self {
        tracker.page_view();
        Self {
            tracker,
            scroll: ScrollTracker::new(),
            time: TimeOnPage::new(),
            forms: FormTracker::new(),
            quiz: QuizTracker::new(quiz_ids),
            milestones: None,
        }
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Schedules the time-on-page milestones on the runtime's timers.
    pub fn start_timers(&mut self) {
        if self.milestones.is_none() {
            let handle = spawn_milestones(self.tracker.clone(), tokio::time::Instant::now());
            self.milestones = Some(handle);
        }
    }

    /// Feeds an elapsed time directly, for hosts that drive their own clock.
    /// Use this or `start_timers`, not both.
    pub fn tick(&mut self, elapsed: Duration) {
        self.tracker.track_all(self.time.poll(elapsed));
    }

    pub fn scrolled(&mut self, metrics: ScrollMetrics) {
        self.tracker.track_all(self.scroll.observe(metrics));
    }

    pub fn field_focused(&self, form_id: &str, field: &FieldInfo) {
        self.tracker.track(self.forms.focus(form_id, field));
    }

    pub fn field_blurred(&self, form_id: &str, field: &FieldInfo, value: &str) {
        if let Some(event) = self.forms.blur(form_id, field, value) {
            self.tracker.track(event);
        }
    }

    /// Tracks the submission and returns hidden inputs the host should add.
    pub fn form_submitted(&mut self, form: &FormSnapshot) -> Vec<(&'static str, String)> {
        let submission = self.forms.submit(form, self.tracker.session());
        self.tracker.track(submission.event);
        if let Some(event) = self.quiz.form_submitted(&form.form_id) {
            self.tracker.track(event);
        }
        submission.hidden_fields
    }

    pub fn question_rendered(&mut self, at: Instant) {
        self.quiz.question_rendered(at);
    }

    pub fn answer_selected(&mut self, question: &str, answer: &str, at: Instant) {
        let event = self.quiz.answer_selected(question, answer, at);
        self.tracker.track(event);
    }

    /// `chain` runs from the clicked element up to the root.
    pub fn clicked(&mut self, chain: &[Element], at: Instant) {
        if let Some(target) = chain.first() {
            if let Some(event) = self.quiz.click_button(&target.id, at) {
                self.tracker.track(event);
            }
        }
        self.tracker.track_all(clicks::classify(chain));
    }

    /// Rewrites same-origin hrefs; `None` entries are left as they were.
    pub fn decorate_links<'a>(
        &self,
        hrefs: impl IntoIterator<Item = &'a str>,
    ) -> Vec<Option<String>> {
        let session = self.tracker.session();
        hrefs
            .into_iter()
            .map(|href| decorate_href(href, &session.page_url, session))
            .collect()
    }

    /// Waits for the DOM to settle after the page view, then decorates.
    pub async fn decorate_links_when_settled(&self, hrefs: &[String]) -> Vec<Option<String>> {
        tokio::time::sleep(SETTLE_DELAY).await;
        self.decorate_links(hrefs.iter().map(String::as_str))
    }

    pub fn link_clicked(&self, href: &str, text: &str) {
        self.tracker.track(EventKind::LinkClick {
            href: href.to_string(),
            text: text.trim().to_string(),
        });
    }

    /// Unload: max scroll depth (if the visitor scrolled) and the exit event.
    pub fn close(mut self, elapsed: Duration) {
        if let Some(handle) = self.milestones.take() {
            handle.abort();
        }
        if let Some(event) = self.scroll.finish() {
            self.tracker.track(event);
        }
        if let Some(event) = self.time.exit(elapsed) {
            self.tracker.track(event);
        }
    }
}
