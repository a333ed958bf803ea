//! Timesheet period sweep.
//!
//! Closes open periods whose end date has passed, filling in their
//! computed totals, and opens the next weekly period for organizations
//! whose latest period has ended.

use anyhow::Result;
use chrono::{Duration, Utc};

use crate::database::models::TimesheetPeriodInput;

use super::JobContext;

pub async fn run(ctx: JobContext) -> Result<String> {
    let today = Utc::now().date_naive();
    let mut closed = 0usize;
    let mut opened = 0usize;

    for organization in ctx.organizations.list_active().await? {
        let expired = match ctx.timesheets.find_expired_open(organization.id, today).await {
            Ok(periods) => periods,
            Err(err) => {
                log::error!(
                    "Skipping organization {} in timesheet sweep: {}",
                    organization.id,
                    err
                );
                continue;
            }
        };

        for period in expired {
            let totals = ctx
                .entries
                .totals_between(organization.id, period.start_date, period.end_date)
                .await;

            let result = match totals {
                Ok((total_hours, billable_hours)) => {
                    ctx.timesheets
                        .close(
                            organization.id,
                            period.id,
                            total_hours,
                            billable_hours,
                            None,
                            Utc::now(),
                        )
                        .await
                }
                Err(err) => Err(err),
            };

            match result {
                Ok(period) => {
                    log::info!(
                        "Closed period {} for {}: {:?}h total, {:?}h billable",
                        period.name,
                        organization.name,
                        period.total_hours,
                        period.billable_hours
                    );
                    closed += 1;
                }
                Err(err) => {
                    log::error!("Failed to close period {}: {}", period.id, err);
                }
            }
        }

        // Open the next weekly period when the latest one has ended.
        let needs_new = match ctx.timesheets.latest_for_organization(organization.id).await {
            Ok(latest) => latest
                .as_ref()
                .map(|p| p.end_date < today)
                .unwrap_or(true)
                .then(|| {
                    latest
                        .map(|p| p.end_date + Duration::days(1))
                        .unwrap_or(today)
                }),
            Err(err) => {
                log::error!(
                    "Could not read latest period for {}: {}",
                    organization.id,
                    err
                );
                None
            }
        };

        if let Some(start_date) = needs_new {
            let end_date = start_date + Duration::days(6);
            let input = TimesheetPeriodInput {
                name: format!("Week of {}", start_date),
                start_date,
                end_date,
            };
            match ctx.timesheets.create(organization.id, input).await {
                Ok(period) => {
                    log::info!(
                        "Opened period {} for {} ({} - {})",
                        period.name,
                        organization.name,
                        period.start_date,
                        period.end_date
                    );
                    opened += 1;
                }
                Err(err) => {
                    log::error!(
                        "Failed to open a new period for {}: {}",
                        organization.id,
                        err
                    );
                }
            }
        }
    }

    Ok(format!("closed {} periods, opened {}", closed, opened))
}
