//! Permission checks for time entries and user management.
//!
//! The manager check walks the reports adjacency list breadth-first with
//! a visited set. The domain assumes a tree, but a bad manager edit can
//! introduce a cycle and the walk must still terminate.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{ApprovalStatus, TimeEntry, User, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ClockTime,
    EditOwnTime,
    ViewOwnReports,
    ViewTeamReports,
    ApproveTime,
    ManageProjects,
    ManageUsers,
    ManageOrganization,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ClockTime => "clock_time",
            Permission::EditOwnTime => "edit_own_time",
            Permission::ViewOwnReports => "view_own_reports",
            Permission::ViewTeamReports => "view_team_reports",
            Permission::ApproveTime => "approve_time",
            Permission::ManageProjects => "manage_projects",
            Permission::ManageUsers => "manage_users",
            Permission::ManageOrganization => "manage_organization",
        }
    }
}

/// Role to permission-set mapping, applied once when a membership is
/// created. No implicit defaults anywhere else.
pub fn default_permissions(role: UserRole) -> Vec<Permission> {
    use Permission::*;

    let mut perms = vec![ClockTime, EditOwnTime, ViewOwnReports];
    match role {
        UserRole::Employee | UserRole::Contractor => {}
        UserRole::TeamLead => {
            perms.extend([ViewTeamReports, ApproveTime]);
        }
        UserRole::Manager => {
            perms.extend([ViewTeamReports, ApproveTime, ManageProjects]);
        }
        UserRole::Admin | UserRole::GlobalAdmin => {
            perms.extend([
                ViewTeamReports,
                ApproveTime,
                ManageProjects,
                ManageUsers,
                ManageOrganization,
            ]);
        }
    }
    perms
}

pub fn permission_strings(role: UserRole) -> Vec<String> {
    default_permissions(role)
        .into_iter()
        .map(|p| p.as_str().to_string())
        .collect()
}

/// Manager -> direct reports adjacency for one organization.
#[derive(Debug, Default, Clone)]
pub struct ReportsGraph {
    reports: HashMap<Uuid, Vec<Uuid>>,
}

impl ReportsGraph {
    /// Build from (user, manager) edges as returned by the user repository.
    pub fn from_edges(edges: impl IntoIterator<Item = (Uuid, Option<Uuid>)>) -> Self {
        let mut reports: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (user, manager) in edges {
            if let Some(manager) = manager {
                reports.entry(manager).or_default().push(user);
            }
        }
        Self { reports }
    }

    /// True when `user` is a direct or indirect report of `manager`.
    pub fn manages(&self, manager: Uuid, user: Uuid) -> bool {
        if manager == user {
            return false;
        }
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([manager]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            for &report in self.reports.get(&current).into_iter().flatten() {
                if report == user {
                    return true;
                }
                queue.push_back(report);
            }
        }
        false
    }
}

/// Edit gate for a time entry.
///
/// Owners may edit while the entry is unlocked and not approved;
/// managers of the owner, the entry's project manager, and org admins
/// may edit regardless.
pub fn can_edit_entry(
    entry: &TimeEntry,
    actor: &User,
    graph: &ReportsGraph,
    project_manager: Option<Uuid>,
) -> bool {
    if actor.role == UserRole::GlobalAdmin {
        return true;
    }
    if actor.organization_id != entry.organization_id {
        return false;
    }
    if actor.role == UserRole::Admin {
        return true;
    }
    if entry.user_id == actor.id && !entry.is_locked && entry.status != ApprovalStatus::Approved {
        return true;
    }
    if matches!(actor.role, UserRole::Manager | UserRole::TeamLead)
        && graph.manages(actor.id, entry.user_id)
    {
        return true;
    }
    if project_manager == Some(actor.id) {
        return true;
    }
    false
}

/// Review gate: approving or rejecting someone's time.
pub fn can_review_entry(entry: &TimeEntry, actor: &User, graph: &ReportsGraph) -> bool {
    if actor.role == UserRole::GlobalAdmin {
        return true;
    }
    if actor.organization_id != entry.organization_id {
        return false;
    }
    match actor.role {
        UserRole::Admin => true,
        UserRole::Manager | UserRole::TeamLead => graph.manages(actor.id, entry.user_id),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::{BigDecimal, Zero};
    use chrono::Utc;

    fn user(org: Uuid, role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            organization_id: org,
            email: format!("{}@example.com", Uuid::new_v4()),
            password_hash: String::new(),
            first_name: "Test".into(),
            last_name: "User".into(),
            role,
            permissions: permission_strings(role),
            department_id: None,
            manager_id: None,
            hourly_rate: None,
            is_active: true,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn entry_for(owner: &User) -> TimeEntry {
        let now = Utc::now();
        TimeEntry {
            id: Uuid::new_v4(),
            organization_id: owner.organization_id,
            user_id: owner.id,
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
            is_billable: false,
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
    fn owner_can_edit_unlocked_draft() {
        let org = Uuid::new_v4();
        let owner = user(org, UserRole::Employee);
        let entry = entry_for(&owner);
        assert!(can_edit_entry(&entry, &owner, &ReportsGraph::default(), None));
    }

    #[test]
    fn owner_cannot_edit_locked_or_approved() {
        let org = Uuid::new_v4();
        let owner = user(org, UserRole::Employee);

        let mut locked = entry_for(&owner);
        locked.is_locked = true;
        assert!(!can_edit_entry(&locked, &owner, &ReportsGraph::default(), None));

        let mut approved = entry_for(&owner);
        approved.status = ApprovalStatus::Approved;
        assert!(!can_edit_entry(&approved, &owner, &ReportsGraph::default(), None));
    }

    #[test]
    fn indirect_manager_can_edit_via_reports_chain() {
        let org = Uuid::new_v4();
        let manager = user(org, UserRole::Manager);
        let lead = user(org, UserRole::TeamLead);
        let worker = user(org, UserRole::Employee);

        let graph = ReportsGraph::from_edges([
            (lead.id, Some(manager.id)),
            (worker.id, Some(lead.id)),
        ]);

        let mut entry = entry_for(&worker);
        entry.is_locked = true; // managers bypass the lock
        assert!(can_edit_entry(&entry, &manager, &graph, None));
    }

    #[test]
    fn unrelated_manager_cannot_edit() {
        let org = Uuid::new_v4();
        let manager = user(org, UserRole::Manager);
        let worker = user(org, UserRole::Employee);
        let entry = entry_for(&worker);
        assert!(!can_edit_entry(&entry, &manager, &ReportsGraph::default(), None));
    }

    #[test]
    fn project_manager_can_edit() {
        let org = Uuid::new_v4();
        let pm = user(org, UserRole::Employee);
        let worker = user(org, UserRole::Employee);
        let entry = entry_for(&worker);
        assert!(can_edit_entry(&entry, &pm, &ReportsGraph::default(), Some(pm.id)));
    }

    #[test]
    fn cross_organization_access_is_denied() {
        let owner = user(Uuid::new_v4(), UserRole::Employee);
        let outsider = user(Uuid::new_v4(), UserRole::Admin);
        let entry = entry_for(&owner);
        assert!(!can_edit_entry(&entry, &outsider, &ReportsGraph::default(), None));
    }

    #[test]
    fn reports_walk_terminates_on_cycle() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        // a -> b -> a cycle, c unreachable
        let graph = ReportsGraph::from_edges([(b, Some(a)), (a, Some(b))]);
        assert!(graph.manages(a, b));
        assert!(!graph.manages(a, c));
    }

    #[test]
    fn nobody_manages_themselves() {
        let a = Uuid::new_v4();
        let graph = ReportsGraph::from_edges([(a, Some(a))]);
        assert!(!graph.manages(a, a));
    }

    #[test]
    fn role_permission_sets_grow_with_seniority() {
        assert!(!permission_strings(UserRole::Employee).contains(&"approve_time".to_string()));
        assert!(permission_strings(UserRole::TeamLead).contains(&"approve_time".to_string()));
        assert!(permission_strings(UserRole::Manager).contains(&"manage_projects".to_string()));
        assert!(permission_strings(UserRole::Admin).contains(&"manage_organization".to_string()));
    }
}
