//! Report submission: a small state machine over the backing store's
//! `reports` table.

use std::time::Duration;

use tracing::debug;

use crate::{
    Error,
    models::{NewReport, Report, ReportStatus},
    session::SessionHandle,
    store::StoreClient,
};

/// Store table holding report rows.
pub const REPORT_TABLE: &str = "reports";

/// How long the confirmation stays on screen before the modal auto-closes.
pub const CONFIRMATION_DELAY: Duration = Duration::from_millis(1600);

const REASON_REQUIRED: &str = "กรุณาเลือกเหตุผลอย่างน้อยหนึ่งข้อ";

/// The fixed set of report reasons offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportReason {
    Inappropriate,
    Spam,
    Copyright,
    Other,
}

impl ReportReason {
    /// Every reason, in display order.
    pub const ALL: [Self; 4] = [Self::Inappropriate, Self::Spam, Self::Copyright, Self::Other];

    /// The human-readable label stored on the report row.
    pub fn label(self) -> &'static str {
        match self {
            Self::Inappropriate => "เนื้อหาไม่เหมาะสม",
            Self::Spam => "สแปม / โฆษณาเกินจริง",
            Self::Copyright => "ละเมิดลิขสิทธิ์",
            Self::Other => "อื่น ๆ",
        }
    }
}

/// Where the submission stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    /// Submitted; the modal closes after [`CONFIRMATION_DELAY`].
    Success,
    /// Failed, with the message to display. Submission stays re-entrant.
    Error(String),
}

/// View-model for the report modal on one work.
pub struct ReportForm {
    store: StoreClient,
    session: SessionHandle,
    work_id: String,
    selected: Vec<ReportReason>,
    /// Optional free-text detail.
    pub detail: String,
    phase: Phase,
    /// The session expired; the shell should redirect to login.
    pub needs_login: bool,
}

impl ReportForm {
    /// Create a form for reporting the given work.
    pub fn new(store: StoreClient, session: SessionHandle, work_id: &str) -> Self {
        Self {
            store,
            session,
            work_id: work_id.to_owned(),
            selected: Vec::new(),
            detail: String::new(),
            phase: Phase::Idle,
            needs_login: false,
        }
    }

    /// The submission phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Whether a reason is currently selected.
    pub fn is_selected(&self, reason: ReportReason) -> bool {
        self.selected.contains(&reason)
    }

    /// Select or deselect a reason.
    pub fn toggle_reason(&mut self, reason: ReportReason) {
        if let Some(pos) = self.selected.iter().position(|r| *r == reason) {
            self.selected.remove(pos);
        } else {
            self.selected.push(reason);
        }
    }

    /// Submit the report.
    ///
    /// At least one reason must be selected; otherwise a validation message
    /// surfaces and no request is issued. On success the row lands in the
    /// store with status `pending` and the store-assigned timestamp.
    pub async fn submit(&mut self) {
        if self.selected.is_empty() {
            self.phase = Phase::Error(REASON_REQUIRED.to_owned());
            return;
        }
        let Some(user) = self.session.current() else {
            self.needs_login = true;
            return;
        };

        self.phase = Phase::Submitting;
        let reason = self
            .selected
            .iter()
            .map(|r| r.label())
            .collect::<Vec<_>>()
            .join(", ");
        let detail = Some(self.detail.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_owned);
        let report = NewReport {
            reporter_id: user.id,
            work_id: self.work_id.clone(),
            reason,
            detail,
            status: ReportStatus::Pending,
        };

        match self.store.insert::<Report>(REPORT_TABLE, &report).await {
            Ok(rows) => {
                debug!(work_id = %self.work_id, inserted = rows.len(), "report submitted");
                self.phase = Phase::Success;
            }
            Err(Error::Unauthorized) => {
                self.needs_login = true;
                self.phase = Phase::Idle;
            }
            Err(err) => {
                self.phase = Phase::Error(err.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::ApiClient, config::StoreConfig, session::SessionProvider};

    fn form(session: &SessionProvider) -> ReportForm {
        // Nothing listens on this address; any issued request would fail
        // with a transport error rather than a validation message.
        let api = ApiClient::new("http://localhost:1/".parse().unwrap()).unwrap();
        let store = StoreClient::new(
            api,
            Some(StoreConfig {
                url: "http://localhost:1/".parse().unwrap(),
                key: "test".to_owned(),
            }),
        )
        .unwrap();
        ReportForm::new(store, session.handle(), "w1")
    }

    #[test]
    fn reasons_toggle_on_and_off() {
        let session = SessionProvider::new();
        let mut form = form(&session);

        form.toggle_reason(ReportReason::Spam);
        assert!(form.is_selected(ReportReason::Spam));
        form.toggle_reason(ReportReason::Spam);
        assert!(!form.is_selected(ReportReason::Spam));
    }

    #[tokio::test]
    async fn zero_reasons_surfaces_validation_without_a_request() {
        let session = SessionProvider::new();
        let mut form = form(&session);

        form.submit().await;
        assert_eq!(form.phase(), &Phase::Error(REASON_REQUIRED.to_owned()));
    }

    #[tokio::test]
    async fn missing_session_redirects_to_login() {
        let session = SessionProvider::new();
        let mut form = form(&session);

        form.toggle_reason(ReportReason::Copyright);
        form.submit().await;
        assert!(form.needs_login);
        assert_eq!(form.phase(), &Phase::Idle);
    }
}
