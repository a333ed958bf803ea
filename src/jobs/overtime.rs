//! Weekly overtime sweep.
//!
//! Sums the completed hours of every active user over the current week
//! and raises a compliance alert when the organization's weekly
//! threshold is exceeded. Where the original system sent email, this
//! writes alert rows and logs.

use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::{Datelike, Duration, Utc};

use crate::database::models::{AlertSeverity, AlertType, NewComplianceAlert};

use super::JobContext;

pub async fn run(ctx: JobContext) -> Result<String> {
    let today = Utc::now().date_naive();
    let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let week_end = week_start + Duration::days(6);

    let mut checked = 0usize;
    let mut raised = 0usize;

    for organization in ctx.organizations.list_active().await? {
        let threshold = match ctx.organizations.settings(organization.id).await {
            Ok(Some(settings)) => BigDecimal::from(settings.overtime_threshold_weekly),
            Ok(None) => BigDecimal::from(40),
            Err(err) => {
                log::error!(
                    "Skipping organization {} in overtime sweep: {}",
                    organization.id,
                    err
                );
                continue;
            }
        };

        let per_user = match ctx
            .entries
            .hours_by_user_between(organization.id, week_start, week_end)
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                log::error!(
                    "Skipping organization {} in overtime sweep: {}",
                    organization.id,
                    err
                );
                continue;
            }
        };

        for (user_id, total_hours) in per_user {
            checked += 1;
            if total_hours <= threshold {
                continue;
            }

            match ctx
                .compliance
                .has_open_alert(user_id, AlertType::Overtime, None)
                .await
            {
                Ok(true) => continue,
                Ok(false) => {}
                Err(err) => {
                    log::error!("Skipping user {} in overtime sweep: {}", user_id, err);
                    continue;
                }
            }

            let alert = NewComplianceAlert {
                organization_id: organization.id,
                user_id,
                time_entry_id: None,
                alert_type: AlertType::Overtime,
                severity: AlertSeverity::Warning,
                message: format!(
                    "Weekly hours {} exceed the limit of {} (week of {})",
                    total_hours, threshold, week_start
                ),
                threshold_value: Some(threshold.clone()),
                actual_value: Some(total_hours.clone()),
            };

            match ctx.compliance.create(alert).await {
                Ok(_) => {
                    log::warn!(
                        "Overtime alert for user {}: {} hours against limit {}",
                        user_id,
                        total_hours,
                        threshold
                    );
                    raised += 1;
                }
                Err(err) => {
                    log::error!("Failed to raise overtime alert for user {}: {}", user_id, err);
                }
            }
        }
    }

    Ok(format!(
        "checked {} users, raised {} overtime alerts",
        checked, raised
    ))
}
