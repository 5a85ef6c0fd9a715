//! Moderation queue: a denormalized report feed for admins, plus the
//! accept/reject transitions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Error, Result,
    models::{Account, NewReviewAction, Report, ReportStatus, ReviewAction, WorkStatus},
    report::REPORT_TABLE,
    session::SessionHandle,
    store::{Identified, Select, StoreClient, in_filter},
};

/// Store table holding works.
pub const WORK_TABLE: &str = "works";
/// Store table holding public profiles.
pub const PROFILE_TABLE: &str = "profiles";
/// Store table holding account rows.
pub const ACCOUNT_TABLE: &str = "users";
/// Store table holding review actions.
pub const ACTION_TABLE: &str = "review_actions";

/// Placeholder for a report whose work no longer resolves.
pub const UNKNOWN_WORK: &str = "Unknown work";
/// Placeholder for a report whose reporter no longer resolves.
pub const UNKNOWN_USER: &str = "Unknown user";

/// The columns of a work the queue needs.
#[derive(Debug, Clone, Deserialize)]
struct WorkRow {
    id: String,
    title: String,
    status: WorkStatus,
}

impl Identified for WorkRow {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The columns of a profile the queue needs.
#[derive(Debug, Clone, Deserialize)]
struct ProfileRow {
    user_id: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl Identified for ProfileRow {
    fn id(&self) -> &str {
        &self.user_id
    }
}

/// One reviewable row of the queue: a report joined with its work, its
/// reporter, and the most recent review action.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub report: Report,
    pub work_title: String,
    pub work_status: Option<WorkStatus>,
    pub reporter_name: String,
    pub reporter_email: Option<String>,
    /// The latest recorded decision; `None` means unreviewed.
    pub latest_action: Option<ReviewAction>,
}

/// Status facet of the queue filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Finished,
    Rejected,
}

impl StatusFilter {
    fn matches(self, status: ReportStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == ReportStatus::Pending,
            Self::Finished => status == ReportStatus::Finished,
            Self::Rejected => status == ReportStatus::Rejected,
        }
    }
}

/// A moderator's decision on a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Take the work down: report finished, work removed.
    Delete,
    /// Dismiss the report: report rejected, work untouched.
    Reject,
}

impl Decision {
    /// The label recorded on the review action row.
    pub fn label(self) -> &'static str {
        match self {
            Self::Delete => "ลบโพสต์",
            Self::Reject => "ยกเลิกรายงาน",
        }
    }

    fn report_status(self) -> ReportStatus {
        match self {
            Self::Delete => ReportStatus::Finished,
            Self::Reject => ReportStatus::Rejected,
        }
    }
}

#[derive(Serialize)]
struct ReportPatch {
    status: ReportStatus,
}

#[derive(Serialize)]
struct WorkPatch {
    status: WorkStatus,
}

/// View-model for the admin report queue.
pub struct ModerationQueue {
    store: StoreClient,
    session: SessionHandle,
    entries: Vec<QueueEntry>,
    /// Status facet of the filter.
    pub filter: StatusFilter,
    /// Free-text facet of the filter.
    pub search: String,
}

impl ModerationQueue {
    /// Create a queue view-model.
    pub fn new(store: StoreClient, session: SessionHandle) -> Self {
        Self {
            store,
            session,
            entries: Vec::new(),
            filter: StatusFilter::default(),
            search: String::new(),
        }
    }

    /// All loaded entries, newest report first.
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// The entries passing the status filter intersected with the free-text
    /// search (work title, reason, reporter name, reporter email).
    pub fn visible(&self) -> Vec<&QueueEntry> {
        self.entries
            .iter()
            .filter(|e| entry_matches(e, self.filter, &self.search))
            .collect()
    }

    /// Reload the queue: report rows joined with works, profiles, and
    /// account rows, plus the most recent review action per report. Rows
    /// whose work or reporter no longer resolves still appear, with unknown
    /// placeholders.
    pub async fn refresh(&mut self) -> Result<()> {
        let reports: Vec<Report> = self
            .store
            .query(REPORT_TABLE, Select::new().order("created_at.desc"))
            .await?;

        let work_ids: Vec<String> = reports.iter().map(|r| r.work_id.clone()).collect();
        let reporter_ids: Vec<String> = reports.iter().map(|r| r.reporter_id.clone()).collect();
        let report_ids: Vec<String> = reports.iter().map(|r| r.id.clone()).collect();

        let works: Vec<WorkRow> = self
            .store
            .fetch_by_ids(WORK_TABLE, "id", "id,title,status", &work_ids)
            .await?;
        let profiles: Vec<ProfileRow> = self
            .store
            .fetch_by_ids(PROFILE_TABLE, "user_id", "user_id,display_name", &reporter_ids)
            .await?;
        let accounts: Vec<Account> = self
            .store
            .fetch_by_ids(ACCOUNT_TABLE, "id", "id,email,created_at", &reporter_ids)
            .await?;
        let actions: Vec<ReviewAction> = match in_filter(&report_ids) {
            Some(predicate) => {
                self.store
                    .query(
                        ACTION_TABLE,
                        Select::new()
                            .filter("report_id", &predicate)
                            .order("created_at.desc"),
                    )
                    .await?
            }
            None => Vec::new(),
        };

        debug!(
            reports = reports.len(),
            works = works.len(),
            actions = actions.len(),
            "moderation queue refreshed"
        );
        self.entries = join_entries(reports, &works, &profiles, &accounts, &actions);
        Ok(())
    }

    /// Apply a moderator's decision to a report.
    ///
    /// `Delete` marks the report `finished` and the work `removed`; `Reject`
    /// marks the report `rejected` and leaves the work untouched. Both append
    /// one review-action row. The two updates are independent requests, not a
    /// transaction: the report is updated first, so a failure between the two
    /// leaves a finished report that can simply be re-resolved, never a
    /// removed work with a pending report stuck in the queue. Either failure
    /// surfaces as this method's single error, and the queue is not mutated;
    /// callers refresh afterwards.
    pub async fn resolve(
        &self,
        report: &Report,
        decision: Decision,
        note: Option<String>,
    ) -> Result<()> {
        let Some(actor) = self.session.current() else {
            return Err(Error::Unauthorized);
        };

        let _: Vec<Report> = self
            .store
            .update(
                REPORT_TABLE,
                Select::new().eq("id", &report.id),
                &ReportPatch {
                    status: decision.report_status(),
                },
            )
            .await?;

        if decision == Decision::Delete {
            let _: Vec<serde_json::Value> = self
                .store
                .update(
                    WORK_TABLE,
                    Select::new().eq("id", &report.work_id),
                    &WorkPatch {
                        status: WorkStatus::Removed,
                    },
                )
                .await?;
        }

        let _: Vec<ReviewAction> = self
            .store
            .insert(
                ACTION_TABLE,
                &NewReviewAction {
                    report_id: report.id.clone(),
                    decision: decision.label().to_owned(),
                    note,
                    actor_id: actor.id,
                },
            )
            .await?;

        debug!(report = %report.id, ?decision, "report resolved");
        Ok(())
    }
}

fn entry_matches(entry: &QueueEntry, filter: StatusFilter, search: &str) -> bool {
    if !filter.matches(entry.report.status) {
        return false;
    }
    let search = search.trim().to_lowercase();
    if search.is_empty() {
        return true;
    }
    let email = entry.reporter_email.as_deref().unwrap_or_default();
    [
        entry.work_title.as_str(),
        entry.report.reason.as_str(),
        entry.reporter_name.as_str(),
        email,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&search))
}

fn join_entries(
    reports: Vec<Report>,
    works: &[WorkRow],
    profiles: &[ProfileRow],
    accounts: &[Account],
    actions: &[ReviewAction],
) -> Vec<QueueEntry> {
    reports
        .into_iter()
        .map(|report| {
            let work = works.iter().find(|w| w.id == report.work_id);
            let profile = profiles.iter().find(|p| p.user_id == report.reporter_id);
            let account = accounts.iter().find(|a| a.id == report.reporter_id);
            let latest_action = latest_action_for(&report.id, actions);

            QueueEntry {
                work_title: work
                    .map(|w| w.title.clone())
                    .unwrap_or_else(|| UNKNOWN_WORK.to_owned()),
                work_status: work.map(|w| w.status),
                reporter_name: profile
                    .and_then(|p| p.display_name.clone())
                    .unwrap_or_else(|| UNKNOWN_USER.to_owned()),
                reporter_email: account.and_then(|a| a.email.clone()),
                latest_action,
                report,
            }
        })
        .collect()
}

/// The most recent action for a report. Rows without a timestamp sort last;
/// among equal timestamps the earliest-listed row wins, which for a
/// `created_at.desc` query is the most recently stored one.
fn latest_action_for(report_id: &str, actions: &[ReviewAction]) -> Option<ReviewAction> {
    let mut latest: Option<&ReviewAction> = None;
    for action in actions.iter().filter(|a| a.report_id == report_id) {
        let newer = match (latest.and_then(|l| l.created_at), action.created_at) {
            (None, Some(_)) => true,
            (Some(current), Some(candidate)) => candidate > current,
            _ => latest.is_none(),
        };
        if newer {
            latest = Some(action);
        }
    }
    latest.cloned()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn report(id: &str, work: &str, reporter: &str, status: ReportStatus) -> Report {
        Report {
            id: id.to_owned(),
            reporter_id: reporter.to_owned(),
            work_id: work.to_owned(),
            reason: "สแปม / โฆษณาเกินจริง".to_owned(),
            detail: None,
            status,
            created_at: None,
        }
    }

    fn action(id: &str, report_id: &str, ts: Option<&str>) -> ReviewAction {
        ReviewAction {
            id: id.to_owned(),
            report_id: report_id.to_owned(),
            decision: "ลบโพสต์".to_owned(),
            note: None,
            actor_id: "admin".to_owned(),
            created_at: ts.map(|t| t.parse::<DateTime<Utc>>().unwrap()),
        }
    }

    #[test]
    fn dangling_references_render_as_unknown() {
        let entries = join_entries(
            vec![report("r1", "missing-work", "missing-user", ReportStatus::Pending)],
            &[],
            &[],
            &[],
            &[],
        );
        assert_eq!(entries[0].work_title, UNKNOWN_WORK);
        assert_eq!(entries[0].reporter_name, UNKNOWN_USER);
        assert_eq!(entries[0].reporter_email, None);
        assert!(entries[0].latest_action.is_none());
    }

    #[test]
    fn the_most_recent_action_wins() {
        let actions = vec![
            action("a1", "r1", Some("2025-01-02T00:00:00Z")),
            action("a2", "r1", Some("2025-01-05T00:00:00Z")),
            action("a3", "r1", None),
            action("a4", "r2", Some("2025-06-01T00:00:00Z")),
        ];
        let latest = latest_action_for("r1", &actions).unwrap();
        assert_eq!(latest.id, "a2");
    }

    #[test]
    fn status_filter_and_search_intersect() {
        let mut entry = QueueEntry {
            report: report("r1", "w1", "u1", ReportStatus::Pending),
            work_title: "Red Logo".to_owned(),
            work_status: Some(WorkStatus::Published),
            reporter_name: "Nick Jansen".to_owned(),
            reporter_email: Some("nick.jansen@example.com".to_owned()),
            latest_action: None,
        };

        assert!(entry_matches(&entry, StatusFilter::Pending, ""));
        assert!(!entry_matches(&entry, StatusFilter::Finished, ""));

        // Free text matches title, reason, name, and email.
        assert!(entry_matches(&entry, StatusFilter::All, "red logo"));
        assert!(entry_matches(&entry, StatusFilter::All, "สแปม"));
        assert!(entry_matches(&entry, StatusFilter::All, "NICK"));
        assert!(entry_matches(&entry, StatusFilter::All, "@example.com"));
        assert!(!entry_matches(&entry, StatusFilter::All, "nonsense"));

        // Both facets must hold at once.
        entry.report.status = ReportStatus::Rejected;
        assert!(!entry_matches(&entry, StatusFilter::Pending, "red"));
        assert!(entry_matches(&entry, StatusFilter::Rejected, "red"));
    }
}
