//! Lifecycle operations on time entries.
//!
//! Every mutating operation runs in a transaction that first takes a row
//! lock on the entry, so concurrent clock-out, break and approval calls
//! against the same entry serialize instead of losing updates. The
//! derived fields are recomputed before each save.

use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    ApprovalStatus, BreakEntry, BreakType, ClockInInput, ModificationStatus,
    ModificationRequestInput, StartBreakInput, TimeEntry, TimeModificationRequest,
    UpdateTimeEntryInput, User, COMPUTATION_FIELDS, MODIFIABLE_FIELDS,
};
use crate::database::repositories::{
    ModificationRepository, OrganizationRepository, ProjectRepository, TimeEntryRepository,
    UserRepository,
};
use crate::error::AppError;
use crate::services::calculator::{self, EntryTotals, Thresholds};
use crate::services::permissions::{self, ReportsGraph};

#[derive(Clone)]
pub struct TimeClockService {
    pool: PgPool,
    entries: TimeEntryRepository,
    users: UserRepository,
    organizations: OrganizationRepository,
    projects: ProjectRepository,
    modifications: ModificationRepository,
}

impl TimeClockService {
    pub fn new(
        pool: PgPool,
        entries: TimeEntryRepository,
        users: UserRepository,
        organizations: OrganizationRepository,
        projects: ProjectRepository,
        modifications: ModificationRepository,
    ) -> Self {
        Self {
            pool,
            entries,
            users,
            organizations,
            projects,
            modifications,
        }
    }

    /// User compliance settings win over organization settings; the
    /// defaults apply when neither row exists.
    pub async fn thresholds_for_user(&self, user: &User) -> Result<Thresholds> {
        if let Some(settings) = self.users.compliance_settings(user.id).await? {
            return Ok(Thresholds {
                daily_limit: BigDecimal::from(settings.max_hours_per_day),
                overtime_multiplier: settings.overtime_rate_multiplier,
            });
        }
        if let Some(settings) = self.organizations.settings(user.organization_id).await? {
            return Ok(Thresholds {
                daily_limit: BigDecimal::from(settings.overtime_threshold_daily),
                overtime_multiplier: settings.overtime_rate_multiplier,
            });
        }
        Ok(Thresholds::default())
    }

    fn apply_totals(entry: &mut TimeEntry, totals: EntryTotals) {
        entry.regular_hours = totals.regular_hours;
        entry.overtime_hours = totals.overtime_hours;
        entry.total_hours = totals.total_hours;
        entry.break_hours = totals.break_hours;
        entry.billable_amount = totals.billable_amount;
    }

    pub async fn clock_in(&self, actor: &User, input: ClockInInput) -> Result<TimeEntry, AppError> {
        if self
            .entries
            .find_active_for_user(actor.organization_id, actor.id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyActive);
        }

        let hourly_rate = match input.project_id {
            Some(project_id) => {
                let project = self
                    .projects
                    .find_by_id(actor.organization_id, project_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Project not found"))?;
                actor.hourly_rate.clone().or(project.hourly_rate)
            }
            None => actor.hourly_rate.clone(),
        };

        let now = Utc::now();
        let mut entry = TimeEntry {
            id: Uuid::new_v4(),
            organization_id: actor.organization_id,
            user_id: actor.id,
            project_id: input.project_id,
            task_id: input.task_id,
            department_id: actor.department_id,
            date: now.date_naive(),
            clock_in: now,
            clock_out: None,
            regular_hours: BigDecimal::from(0),
            overtime_hours: BigDecimal::from(0),
            total_hours: BigDecimal::from(0),
            break_hours: BigDecimal::from(0),
            is_billable: input.is_billable.unwrap_or(true),
            hourly_rate,
            billable_amount: BigDecimal::from(0),
            description: input.description,
            status: ApprovalStatus::Draft,
            submitted_at: None,
            approved_by: None,
            approved_at: None,
            approval_notes: None,
            is_locked: false,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };

        let thresholds = self.thresholds_for_user(actor).await?;
        let totals = calculator::compute_totals(&entry, &[], &thresholds, now)?;
        Self::apply_totals(&mut entry, totals);

        let mut tx = self.pool.begin().await?;
        let entry = self.entries.insert(&mut tx, &entry).await?;
        tx.commit().await?;

        Ok(entry)
    }

    pub async fn clock_out(&self, actor: &User) -> Result<TimeEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut entry = self
            .entries
            .find_active_for_update(&mut tx, actor.organization_id, actor.id)
            .await?
            .ok_or(AppError::NoActiveEntry)?;

        let now = Utc::now();
        entry.clock_out = Some(now);

        let breaks = self.entries.breaks_for_entry_tx(&mut tx, entry.id).await?;
        let thresholds = self.thresholds_for_user(actor).await?;
        let totals = calculator::compute_totals(&entry, &breaks, &thresholds, now)?;
        Self::apply_totals(&mut entry, totals);

        let entry = self.entries.save(&mut tx, &entry).await?;
        tx.commit().await?;

        Ok(entry)
    }

    pub async fn current_entry(
        &self,
        actor: &User,
    ) -> Result<Option<(TimeEntry, Vec<BreakEntry>)>, AppError> {
        let Some(entry) = self
            .entries
            .find_active_for_user(actor.organization_id, actor.id)
            .await?
        else {
            return Ok(None);
        };
        let breaks = self.entries.breaks_for_entry(entry.id).await?;
        Ok(Some((entry, breaks)))
    }

    pub async fn start_break(
        &self,
        actor: &User,
        entry_id: Uuid,
        input: StartBreakInput,
    ) -> Result<BreakEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let entry = self
            .entries
            .find_for_update(&mut tx, actor.organization_id, entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Time entry not found"))?;

        if entry.user_id != actor.id {
            return Err(AppError::PermissionDenied(
                "Only the entry owner can manage breaks".to_string(),
            ));
        }
        if !entry.is_active() {
            return Err(AppError::NoActiveEntry);
        }
        if self.entries.find_open_break(&mut tx, entry.id).await?.is_some() {
            return Err(AppError::BreakAlreadyActive);
        }

        let now = Utc::now();
        let created = self
            .entries
            .insert_break(
                &mut tx,
                entry.organization_id,
                entry.id,
                input.break_type.unwrap_or(BreakType::ShortBreak),
                input.is_paid.unwrap_or(false),
                input.notes,
                now,
            )
            .await?;

        // An open break contributes nothing yet, but the totals are
        // refreshed on every break mutation all the same.
        let mut entry = entry;
        let breaks = self.entries.breaks_for_entry_tx(&mut tx, entry.id).await?;
        let thresholds = self.thresholds_for_user(actor).await?;
        let totals = calculator::compute_totals(&entry, &breaks, &thresholds, now)?;
        Self::apply_totals(&mut entry, totals);
        self.entries.save(&mut tx, &entry).await?;

        tx.commit().await?;

        Ok(created)
    }

    pub async fn end_break(&self, actor: &User, entry_id: Uuid) -> Result<BreakEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut entry = self
            .entries
            .find_for_update(&mut tx, actor.organization_id, entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Time entry not found"))?;

        if entry.user_id != actor.id {
            return Err(AppError::PermissionDenied(
                "Only the entry owner can manage breaks".to_string(),
            ));
        }

        let open = self
            .entries
            .find_open_break(&mut tx, entry.id)
            .await?
            .ok_or(AppError::NoActiveBreak)?;

        let now = Utc::now();
        let duration = calculator::derived_break_minutes(open.start_time, now);
        let closed = self.entries.close_break(&mut tx, open.id, now, duration).await?;

        // Break durations feed the totals, so recompute right away.
        let breaks = self.entries.breaks_for_entry_tx(&mut tx, entry.id).await?;
        let thresholds = self.thresholds_for_user(actor).await?;
        let totals = calculator::compute_totals(&entry, &breaks, &thresholds, now)?;
        Self::apply_totals(&mut entry, totals);
        self.entries.save(&mut tx, &entry).await?;

        tx.commit().await?;

        Ok(closed)
    }

    async fn edit_context(
        &self,
        entry: &TimeEntry,
    ) -> Result<(ReportsGraph, Option<Uuid>), AppError> {
        let edges = self.users.report_edges(entry.organization_id).await?;
        let graph = ReportsGraph::from_edges(edges);
        let project_manager = match entry.project_id {
            Some(project_id) => self
                .projects
                .find_by_id(entry.organization_id, project_id)
                .await?
                .and_then(|p| p.manager_id),
            None => None,
        };
        Ok((graph, project_manager))
    }

    pub async fn update_entry(
        &self,
        actor: &User,
        entry_id: Uuid,
        input: UpdateTimeEntryInput,
    ) -> Result<TimeEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut entry = self
            .entries
            .find_for_update(&mut tx, actor.organization_id, entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Time entry not found"))?;

        let (graph, project_manager) = self.edit_context(&entry).await?;
        if !permissions::can_edit_entry(&entry, actor, &graph, project_manager) {
            return Err(AppError::PermissionDenied(
                "Not allowed to edit this time entry".to_string(),
            ));
        }

        if let Some(clock_in) = input.clock_in {
            entry.clock_in = clock_in;
            entry.date = clock_in.date_naive();
        }
        if let Some(clock_out) = input.clock_out {
            entry.clock_out = Some(clock_out);
        }
        if input.project_id.is_some() {
            entry.project_id = input.project_id;
        }
        if input.task_id.is_some() {
            entry.task_id = input.task_id;
        }
        if input.description.is_some() {
            entry.description = input.description;
        }
        if let Some(is_billable) = input.is_billable {
            entry.is_billable = is_billable;
        }
        if input.hourly_rate.is_some() {
            entry.hourly_rate = input.hourly_rate;
        }

        let now = Utc::now();
        let breaks = self.entries.breaks_for_entry_tx(&mut tx, entry.id).await?;
        let thresholds = self.thresholds_for_user(actor).await?;
        let totals = calculator::compute_totals(&entry, &breaks, &thresholds, now)?;
        Self::apply_totals(&mut entry, totals);

        let entry = self.entries.save(&mut tx, &entry).await?;
        tx.commit().await?;

        Ok(entry)
    }

    pub async fn delete_entry(&self, actor: &User, entry_id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let entry = self
            .entries
            .find_for_update(&mut tx, actor.organization_id, entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Time entry not found"))?;

        let (graph, project_manager) = self.edit_context(&entry).await?;
        if !permissions::can_edit_entry(&entry, actor, &graph, project_manager) {
            return Err(AppError::PermissionDenied(
                "Not allowed to delete this time entry".to_string(),
            ));
        }

        self.entries
            .soft_delete(&mut tx, actor.organization_id, entry_id)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    // Approval state machine

    pub async fn submit(&self, actor: &User, entry_id: Uuid) -> Result<TimeEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut entry = self
            .entries
            .find_for_update(&mut tx, actor.organization_id, entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Time entry not found"))?;

        if entry.user_id != actor.id {
            let (graph, project_manager) = self.edit_context(&entry).await?;
            if !permissions::can_edit_entry(&entry, actor, &graph, project_manager) {
                return Err(AppError::PermissionDenied(
                    "Not allowed to submit this time entry".to_string(),
                ));
            }
        }

        if !entry.status.can_submit() {
            return Err(AppError::invalid_transition(entry.status, "submit"));
        }

        entry.status = ApprovalStatus::Submitted;
        entry.submitted_at = Some(Utc::now());

        let entry = self.entries.save(&mut tx, &entry).await?;
        tx.commit().await?;

        Ok(entry)
    }

    pub async fn approve(
        &self,
        actor: &User,
        entry_id: Uuid,
        notes: Option<String>,
    ) -> Result<TimeEntry, AppError> {
        self.review(actor, entry_id, notes, true).await
    }

    pub async fn reject(
        &self,
        actor: &User,
        entry_id: Uuid,
        notes: Option<String>,
    ) -> Result<TimeEntry, AppError> {
        self.review(actor, entry_id, notes, false).await
    }

    async fn review(
        &self,
        actor: &User,
        entry_id: Uuid,
        notes: Option<String>,
        approve: bool,
    ) -> Result<TimeEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut entry = self
            .entries
            .find_for_update(&mut tx, actor.organization_id, entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Time entry not found"))?;

        let edges = self.users.report_edges(entry.organization_id).await?;
        let graph = ReportsGraph::from_edges(edges);
        if !permissions::can_review_entry(&entry, actor, &graph) {
            return Err(AppError::PermissionDenied(
                "Not allowed to review this time entry".to_string(),
            ));
        }

        let action = if approve { "approve" } else { "reject" };
        if !entry.status.can_review() {
            return Err(AppError::invalid_transition(entry.status, action));
        }

        entry.status = if approve {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Rejected
        };
        entry.approved_by = Some(actor.id);
        entry.approved_at = Some(Utc::now());
        entry.approval_notes = notes;
        // Approval freezes the entry; rejection leaves it editable so the
        // owner can reset and resubmit.
        entry.is_locked = approve;

        let entry = self.entries.save(&mut tx, &entry).await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Explicit path back from rejected to draft.
    pub async fn reset_to_draft(&self, actor: &User, entry_id: Uuid) -> Result<TimeEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut entry = self
            .entries
            .find_for_update(&mut tx, actor.organization_id, entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Time entry not found"))?;

        if entry.user_id != actor.id {
            let edges = self.users.report_edges(entry.organization_id).await?;
            let graph = ReportsGraph::from_edges(edges);
            if !permissions::can_review_entry(&entry, actor, &graph) {
                return Err(AppError::PermissionDenied(
                    "Not allowed to reset this time entry".to_string(),
                ));
            }
        }

        if entry.status != ApprovalStatus::Rejected {
            return Err(AppError::invalid_transition(entry.status, "reset"));
        }

        entry.status = ApprovalStatus::Draft;
        entry.submitted_at = None;
        entry.approved_by = None;
        entry.approved_at = None;
        entry.approval_notes = None;

        let entry = self.entries.save(&mut tx, &entry).await?;
        tx.commit().await?;

        Ok(entry)
    }

    // Modification requests

    fn validate_changes(changes: &Value) -> Result<&Map<String, Value>, AppError> {
        let map = changes.as_object().ok_or_else(|| {
            AppError::BadRequest("requestedChanges must be an object".to_string())
        })?;
        if map.is_empty() {
            return Err(AppError::BadRequest(
                "requestedChanges must not be empty".to_string(),
            ));
        }
        for field in map.keys() {
            if !MODIFIABLE_FIELDS.contains(&field.as_str()) {
                return Err(AppError::BadRequest(format!(
                    "field '{}' cannot be modified",
                    field
                )));
            }
        }
        Ok(map)
    }

    pub async fn request_modification(
        &self,
        actor: &User,
        entry_id: Uuid,
        input: ModificationRequestInput,
    ) -> Result<TimeModificationRequest, AppError> {
        Self::validate_changes(&input.requested_changes)?;

        let entry = self
            .entries
            .find_by_id(actor.organization_id, entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Time entry not found"))?;

        if entry.user_id != actor.id {
            let (graph, project_manager) = self.edit_context(&entry).await?;
            if !permissions::can_edit_entry(&entry, actor, &graph, project_manager) {
                return Err(AppError::PermissionDenied(
                    "Not allowed to request changes to this time entry".to_string(),
                ));
            }
        }

        let request = self
            .modifications
            .create(
                actor.organization_id,
                entry.id,
                actor.id,
                input.requested_changes,
                input.reason,
            )
            .await?;

        Ok(request)
    }

    pub async fn approve_modification(
        &self,
        actor: &User,
        request_id: Uuid,
        notes: Option<String>,
    ) -> Result<TimeModificationRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self
            .modifications
            .find_for_update(&mut tx, actor.organization_id, request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Modification request not found"))?;

        if request.status.is_terminal() {
            return Err(AppError::invalid_transition(request.status, "approve"));
        }

        let mut entry = self
            .entries
            .find_for_update(&mut tx, actor.organization_id, request.time_entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Time entry not found"))?;

        let edges = self.users.report_edges(entry.organization_id).await?;
        let graph = ReportsGraph::from_edges(edges);
        if !permissions::can_review_entry(&entry, actor, &graph) {
            return Err(AppError::PermissionDenied(
                "Not allowed to review modification requests".to_string(),
            ));
        }

        let changes = Self::validate_changes(&request.requested_changes)?.clone();
        let recompute = Self::apply_changes(&mut entry, &changes)?;

        if recompute {
            let owner = self
                .users
                .find_by_id(entry.user_id)
                .await?
                .ok_or_else(|| AppError::not_found("Entry owner not found"))?;
            let now = Utc::now();
            let breaks = self.entries.breaks_for_entry_tx(&mut tx, entry.id).await?;
            let thresholds = self.thresholds_for_user(&owner).await?;
            let totals = calculator::compute_totals(&entry, &breaks, &thresholds, now)?;
            Self::apply_totals(&mut entry, totals);
        }

        self.entries.save(&mut tx, &entry).await?;
        let request = self
            .modifications
            .record_review(&mut tx, request.id, ModificationStatus::Approved, actor.id, notes)
            .await?;

        tx.commit().await?;

        Ok(request)
    }

    pub async fn reject_modification(
        &self,
        actor: &User,
        request_id: Uuid,
        notes: Option<String>,
    ) -> Result<TimeModificationRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self
            .modifications
            .find_for_update(&mut tx, actor.organization_id, request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Modification request not found"))?;

        if request.status.is_terminal() {
            return Err(AppError::invalid_transition(request.status, "reject"));
        }

        let entry = self
            .entries
            .find_by_id(actor.organization_id, request.time_entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Time entry not found"))?;

        let edges = self.users.report_edges(entry.organization_id).await?;
        let graph = ReportsGraph::from_edges(edges);
        if !permissions::can_review_entry(&entry, actor, &graph) {
            return Err(AppError::PermissionDenied(
                "Not allowed to review modification requests".to_string(),
            ));
        }

        let request = self
            .modifications
            .record_review(&mut tx, request.id, ModificationStatus::Rejected, actor.id, notes)
            .await?;

        tx.commit().await?;

        Ok(request)
    }

    /// Apply validated field changes to an entry. Returns true when a
    /// computation-affecting field was touched.
    fn apply_changes(entry: &mut TimeEntry, changes: &Map<String, Value>) -> Result<bool, AppError> {
        let mut recompute = false;
        for (field, value) in changes {
            match field.as_str() {
                "clock_in" => {
                    let clock_in: DateTime<Utc> = parse_value(field, value.clone())?;
                    entry.clock_in = clock_in;
                    entry.date = clock_in.date_naive();
                }
                "clock_out" => {
                    entry.clock_out = parse_nullable(field, value.clone())?;
                }
                "description" => {
                    entry.description = parse_nullable(field, value.clone())?;
                }
                "is_billable" => {
                    entry.is_billable = parse_value(field, value.clone())?;
                }
                "hourly_rate" => {
                    entry.hourly_rate = parse_nullable(field, value.clone())?;
                }
                "project_id" => {
                    entry.project_id = parse_nullable(field, value.clone())?;
                }
                "task_id" => {
                    entry.task_id = parse_nullable(field, value.clone())?;
                }
                other => {
                    return Err(AppError::BadRequest(format!(
                        "field '{}' cannot be modified",
                        other
                    )));
                }
            }
            if COMPUTATION_FIELDS.contains(&field.as_str()) {
                recompute = true;
            }
        }
        Ok(recompute)
    }
}

fn parse_value<T: serde::de::DeserializeOwned>(field: &str, value: Value) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::BadRequest(format!("invalid value for '{}': {}", field, e)))
}

fn parse_nullable<T: serde::de::DeserializeOwned>(
    field: &str,
    value: Value,
) -> Result<Option<T>, AppError> {
    if value.is_null() {
        return Ok(None);
    }
    parse_value(field, value).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::Zero;
    use serde_json::json;

    fn draft_entry() -> TimeEntry {
        let now = Utc::now();
        TimeEntry {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            project_id: None,
            task_id: None,
            department_id: None,
            date: now.date_naive(),
            clock_in: now,
            clock_out: None,
            regular_hours: BigDecimal::zero(),
            overtime_hours: BigDecimal::zero(),
            total_hours: BigDecimal::zero(),
            break_hours: BigDecimal::zero(),
            is_billable: true,
            hourly_rate: None,
            billable_amount: BigDecimal::zero(),
            description: None,
            status: ApprovalStatus::Draft,
            submitted_at: None,
            approved_by: None,
            approved_at: None,
            approval_notes: None,
            is_locked: false,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn submit_is_only_legal_from_draft() {
        assert!(ApprovalStatus::Draft.can_submit());
        for status in [
            ApprovalStatus::Submitted,
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
        ] {
            assert!(!status.can_submit());
        }
    }

    #[test]
    fn review_is_legal_from_submitted_and_pending_only() {
        assert!(ApprovalStatus::Submitted.can_review());
        assert!(ApprovalStatus::Pending.can_review());
        for status in [
            ApprovalStatus::Draft,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
        ] {
            assert!(!status.can_review());
        }
    }

    #[test]
    fn validate_changes_rejects_unknown_fields() {
        let err = TimeClockService::validate_changes(&json!({"status": "approved"})).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = TimeClockService::validate_changes(&json!({})).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        assert!(TimeClockService::validate_changes(&json!({"description": "x"})).is_ok());
    }

    #[test]
    fn apply_changes_flags_computation_fields() {
        let mut entry = draft_entry();
        let changes = json!({"description": "standup notes"});
        let recompute =
            TimeClockService::apply_changes(&mut entry, changes.as_object().unwrap()).unwrap();
        assert!(!recompute);
        assert_eq!(entry.description.as_deref(), Some("standup notes"));

        let changes = json!({"hourly_rate": "42.50", "is_billable": true});
        let recompute =
            TimeClockService::apply_changes(&mut entry, changes.as_object().unwrap()).unwrap();
        assert!(recompute);
        assert_eq!(entry.hourly_rate, Some("42.50".parse().unwrap()));
    }

    #[test]
    fn apply_changes_parses_timestamps_and_nulls() {
        let mut entry = draft_entry();
        let changes = json!({
            "clock_in": "2025-06-02T09:00:00Z",
            "clock_out": "2025-06-02T17:30:00Z"
        });
        let recompute =
            TimeClockService::apply_changes(&mut entry, changes.as_object().unwrap()).unwrap();
        assert!(recompute);
        assert_eq!(entry.date, entry.clock_in.date_naive());
        assert!(entry.clock_out.is_some());

        let changes = json!({"clock_out": null});
        TimeClockService::apply_changes(&mut entry, changes.as_object().unwrap()).unwrap();
        assert!(entry.clock_out.is_none());

        let changes = json!({"clock_in": "not-a-date"});
        let err = TimeClockService::apply_changes(&mut entry, changes.as_object().unwrap())
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
