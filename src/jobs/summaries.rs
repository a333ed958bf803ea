//! Daily summary sweep.
//!
//! Logs yesterday's per-user totals for every active organization.
//! Feeds dashboards and audit trails through the log pipeline; there is
//! no summary table to keep consistent.

use anyhow::Result;
use bigdecimal::{BigDecimal, Zero};
use chrono::{Duration, Utc};

use super::JobContext;

pub async fn run(ctx: JobContext) -> Result<String> {
    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let mut generated = 0usize;

    for organization in ctx.organizations.list_active().await? {
        let users = match ctx.users.list_active(organization.id).await {
            Ok(users) => users,
            Err(err) => {
                log::error!(
                    "Skipping organization {} in summary sweep: {}",
                    organization.id,
                    err
                );
                continue;
            }
        };

        for user in users {
            let summary = match ctx
                .entries
                .daily_summary(organization.id, user.id, yesterday)
                .await
            {
                Ok(summary) => summary,
                Err(err) => {
                    log::error!("Skipping user {} in summary sweep: {}", user.id, err);
                    continue;
                }
            };

            if summary.entry_count == 0 {
                continue;
            }

            let has_overtime = summary.overtime_hours > BigDecimal::zero();
            log::info!(
                "Daily summary for {} on {}: {}h total ({} entries){}",
                user.email,
                yesterday,
                summary.total_hours,
                summary.entry_count,
                if has_overtime {
                    format!(", {}h overtime", summary.overtime_hours)
                } else {
                    String::new()
                }
            );
            generated += 1;
        }
    }

    Ok(format!(
        "generated {} daily summaries for {}",
        generated, yesterday
    ))
}
