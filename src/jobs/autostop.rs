//! Auto-stop sweep for entries left running.
//!
//! An entry active longer than the organization's auto-stop window is
//! clocked out at clock-in plus the window, so a forgotten entry does
//! not accrue unbounded hours, and a missing-clockout alert is raised.

use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};

use crate::database::models::{AlertSeverity, AlertType, NewComplianceAlert, TimeEntry};
use crate::services::calculator::{self, Thresholds};

use super::JobContext;

pub async fn run(ctx: JobContext) -> Result<String> {
    let now = Utc::now();
    let mut stopped = 0usize;

    for organization in ctx.organizations.list_active().await? {
        let limit_hours = match ctx.organizations.settings(organization.id).await {
            Ok(Some(settings)) => settings.auto_stop_after_hours.max(1) as i64,
            Ok(None) => 24,
            Err(err) => {
                log::error!(
                    "Skipping organization {} in auto-stop sweep: {}",
                    organization.id,
                    err
                );
                continue;
            }
        };

        let cutoff = now - Duration::hours(limit_hours);
        let long_running = match ctx.entries.find_long_running(organization.id, cutoff).await {
            Ok(entries) => entries,
            Err(err) => {
                log::error!(
                    "Skipping organization {} in auto-stop sweep: {}",
                    organization.id,
                    err
                );
                continue;
            }
        };

        for entry in long_running {
            match stop_entry(&ctx, entry, limit_hours).await {
                Ok(entry) => {
                    log::warn!(
                        "Auto-stopped entry {} for user {} after {} hours",
                        entry.id,
                        entry.user_id,
                        limit_hours
                    );
                    stopped += 1;
                }
                Err(err) => {
                    log::error!("Failed to auto-stop an entry: {}", err);
                }
            }
        }
    }

    Ok(format!("auto-stopped {} entries", stopped))
}

async fn stop_entry(ctx: &JobContext, entry: TimeEntry, limit_hours: i64) -> Result<TimeEntry> {
    let mut tx = ctx.pool.begin().await?;

    // Re-read under lock; a concurrent clock-out may have beaten us here.
    let Some(mut entry) = ctx
        .entries
        .find_for_update(&mut tx, entry.organization_id, entry.id)
        .await?
    else {
        tx.rollback().await?;
        return Err(anyhow::anyhow!("entry disappeared during sweep"));
    };
    if !entry.is_active() {
        tx.rollback().await?;
        return Err(anyhow::anyhow!("entry already clocked out"));
    }

    // Stop at the window boundary, not at sweep time.
    let stop_at = entry.clock_in + Duration::hours(limit_hours);
    entry.clock_out = Some(stop_at);

    let thresholds = thresholds_for(ctx, &entry).await;
    let breaks = ctx.entries.breaks_for_entry_tx(&mut tx, entry.id).await?;
    let totals = calculator::compute_totals(&entry, &breaks, &thresholds, stop_at)
        .map_err(|e| anyhow::anyhow!("recompute failed: {}", e))?;
    entry.regular_hours = totals.regular_hours;
    entry.overtime_hours = totals.overtime_hours;
    entry.total_hours = totals.total_hours;
    entry.break_hours = totals.break_hours;
    entry.billable_amount = totals.billable_amount;

    let entry = ctx.entries.save(&mut tx, &entry).await?;
    tx.commit().await?;

    if !ctx
        .compliance
        .has_open_alert(entry.user_id, AlertType::MissingClockout, Some(entry.id))
        .await?
    {
        ctx.compliance
            .create(NewComplianceAlert {
                organization_id: entry.organization_id,
                user_id: entry.user_id,
                time_entry_id: Some(entry.id),
                alert_type: AlertType::MissingClockout,
                severity: AlertSeverity::Warning,
                message: format!(
                    "Entry was auto-stopped after running for {} hours",
                    limit_hours
                ),
                threshold_value: Some(BigDecimal::from(limit_hours)),
                actual_value: None,
            })
            .await?;
    }

    Ok(entry)
}

async fn thresholds_for(ctx: &JobContext, entry: &TimeEntry) -> Thresholds {
    if let Ok(Some(settings)) = ctx.users.compliance_settings(entry.user_id).await {
        return Thresholds {
            daily_limit: BigDecimal::from(settings.max_hours_per_day),
            overtime_multiplier: settings.overtime_rate_multiplier,
        };
    }
    if let Ok(Some(settings)) = ctx.organizations.settings(entry.organization_id).await {
        return Thresholds {
            daily_limit: BigDecimal::from(settings.overtime_threshold_daily),
            overtime_multiplier: settings.overtime_rate_multiplier,
        };
    }
    Thresholds::default()
}
