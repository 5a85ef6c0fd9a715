//! Work-detail view-model: loading keyed by a changing work id, plus the
//! save (bookmark) state machine.

use tracing::{debug, warn};

use crate::{
    Error, Result,
    api::ApiClient,
    models::{SaveSummary, WorkDetail},
    session::SessionHandle,
    works,
};

/// Async load state for a view.
#[derive(Debug, Default)]
pub enum Load<T> {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// Loaded.
    Ready(T),
    /// Failed, with the inline message to display.
    Failed(String),
}

impl<T> Load<T> {
    /// The loaded value, if any.
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Save state for the viewed work. `saved` and `count` only ever change on a
/// confirmed server response; there is no optimistic flip.
#[derive(Debug, Default)]
pub struct SaveState {
    /// Whether the viewer has saved this work.
    pub saved: bool,
    /// Aggregate save count as last confirmed by the server.
    pub count: u64,
    /// A toggle round trip is in flight.
    pub busy: bool,
    /// Inline error from the last failed toggle.
    pub error: Option<String>,
    /// The session expired; the shell should redirect to login.
    pub needs_login: bool,
}

/// View-model for one work-detail view.
///
/// Loads are keyed by a changing work id, so every request carries a
/// generation token; a response that arrives after a newer request began is
/// discarded rather than applied. Last-requested-identifier wins, not
/// last-to-resolve.
pub struct WorkView {
    api: ApiClient,
    session: SessionHandle,
    generation: u64,
    work: Load<WorkDetail>,
    save: SaveState,
}

impl WorkView {
    /// Create a view-model over the given API client and session.
    pub fn new(api: ApiClient, session: SessionHandle) -> Self {
        Self {
            api,
            session,
            generation: 0,
            work: Load::Idle,
            save: SaveState::default(),
        }
    }

    /// The work load state.
    pub fn work(&self) -> &Load<WorkDetail> {
        &self.work
    }

    /// The save state machine.
    pub fn save(&self) -> &SaveState {
        &self.save
    }

    /// Load a work and the viewer's saved status. Without a session the
    /// saved status is `not-saved` and no status request is issued.
    pub async fn load(&mut self, work_id: &str) {
        let generation = self.begin();
        self.work = Load::Loading;

        let work = works::get_work(&self.api, work_id).await;
        let summary = match (&work, self.session.signed_in()) {
            (Ok(_), true) => Some(works::save_summary(&self.api, work_id).await),
            _ => None,
        };
        self.apply_load(generation, work, summary);
    }

    fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn apply_load(
        &mut self,
        generation: u64,
        work: Result<WorkDetail>,
        summary: Option<Result<SaveSummary>>,
    ) {
        if generation != self.generation {
            debug!(generation, current = self.generation, "discarding stale work load");
            return;
        }

        match work {
            Ok(detail) => {
                self.save = SaveState {
                    saved: false,
                    count: detail.save_count,
                    ..SaveState::default()
                };
                match summary {
                    Some(Ok(s)) => {
                        self.save.saved = s.saved;
                        self.save.count = s.count;
                    }
                    Some(Err(err)) => {
                        // Saved status is decoration on first load; the work
                        // itself still renders.
                        warn!("failed to load saved status: {err}");
                    }
                    None => {}
                }
                self.work = Load::Ready(detail);
            }
            Err(err) => {
                self.work = Load::Failed(err.to_string());
            }
        }
    }

    /// Toggle the save on the loaded work.
    ///
    /// The button shows `busy` during the round trip; on success both the
    /// flag and the count come from the server response. A 401 flags
    /// `needs_login` instead of surfacing an inline error. Any other failure
    /// leaves the prior state unchanged and sets `error`.
    pub async fn toggle_save(&mut self) {
        let Some(work_id) = self.work.ready().map(|d| d.work.work_id.clone()) else {
            return;
        };
        if !self.session.signed_in() {
            self.save.needs_login = true;
            return;
        }

        self.save.busy = true;
        self.save.error = None;
        let result = works::toggle_save(&self.api, &work_id).await;
        self.save.busy = false;

        match result {
            Ok(summary) => {
                self.save.saved = summary.saved;
                self.save.count = summary.count;
            }
            Err(Error::Unauthorized) => {
                self.save.needs_login = true;
            }
            Err(err) => {
                self.save.error = Some(err.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Work, WorkStatus};
    use crate::session::SessionProvider;

    fn detail(id: &str, title: &str, save_count: u64) -> WorkDetail {
        WorkDetail {
            work: Work {
                work_id: id.to_owned(),
                title: title.to_owned(),
                description: None,
                status: WorkStatus::Published,
                thumbnail: None,
                tags: Vec::new(),
                created_at: None,
                updated_at: None,
                published_at: None,
                saved_at: None,
            },
            save_count,
            author_id: None,
            media: Vec::new(),
            author_profile: None,
        }
    }

    fn view() -> WorkView {
        let api = ApiClient::new("http://localhost:1/".parse().unwrap()).unwrap();
        let provider = SessionProvider::new();
        WorkView::new(api, provider.handle())
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut view = view();
        let first = view.begin();
        let second = view.begin();

        // The older request resolves after the newer one began.
        view.apply_load(first, Ok(detail("w1", "Old", 0)), None);
        assert!(view.work().ready().is_none());

        view.apply_load(second, Ok(detail("w2", "New", 3)), None);
        assert_eq!(
            view.work().ready().map(|d| d.work.work_id.as_str()),
            Some("w2")
        );
        assert_eq!(view.save().count, 3);
    }

    #[test]
    fn load_without_session_defaults_to_not_saved() {
        let mut view = view();
        let generation = view.begin();
        view.apply_load(generation, Ok(detail("w1", "Work", 7)), None);

        assert!(!view.save().saved);
        assert_eq!(view.save().count, 7);
        assert!(!view.save().needs_login);
    }

    #[test]
    fn load_failure_keeps_the_message_inline() {
        let mut view = view();
        let generation = view.begin();
        view.apply_load(
            generation,
            Err(Error::Status {
                status: 404,
                message: "work not found".to_owned(),
            }),
            None,
        );

        assert!(matches!(view.work(), Load::Failed(msg) if msg == "work not found"));
    }
}
