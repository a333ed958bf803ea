//! Periodic background sweeps.
//!
//! Each sweep is a stateless pass over all active organizations. Errors
//! on a single record are logged and skipped; an error at sweep level
//! ends the run and the next scheduled tick is the retry.

pub mod autostop;
pub mod overtime;
pub mod summaries;
pub mod timesheets;

use std::time::Duration;

use sqlx::PgPool;

use crate::config::Config;
use crate::database::repositories::{
    ComplianceRepository, OrganizationRepository, TimeEntryRepository, TimesheetRepository,
    UserRepository,
};

/// Shared handles the sweeps run against.
#[derive(Clone)]
pub struct JobContext {
    pub pool: PgPool,
    pub organizations: OrganizationRepository,
    pub users: UserRepository,
    pub entries: TimeEntryRepository,
    pub compliance: ComplianceRepository,
    pub timesheets: TimesheetRepository,
}

impl JobContext {
    pub fn new(pool: PgPool) -> Self {
        Self {
            organizations: OrganizationRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            entries: TimeEntryRepository::new(pool.clone()),
            compliance: ComplianceRepository::new(pool.clone()),
            timesheets: TimesheetRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Spawn all periodic sweeps. Intervals come from the config; the first
/// tick fires after one full interval, not at startup.
pub fn spawn_background_jobs(config: &Config, ctx: JobContext) {
    spawn_loop(
        "overtime-check",
        config.overtime_check_interval_secs,
        ctx.clone(),
        |ctx| Box::pin(overtime::run(ctx)),
    );
    spawn_loop(
        "auto-stop",
        config.auto_stop_interval_secs,
        ctx.clone(),
        |ctx| Box::pin(autostop::run(ctx)),
    );
    spawn_loop(
        "timesheet-close",
        config.timesheet_interval_secs,
        ctx.clone(),
        |ctx| Box::pin(timesheets::run(ctx)),
    );
    spawn_loop(
        "daily-summary",
        config.daily_summary_interval_secs,
        ctx,
        |ctx| Box::pin(summaries::run(ctx)),
    );
}

type JobFuture =
    std::pin::Pin<Box<dyn std::future::Future<Output = anyhow::Result<String>> + Send>>;

fn spawn_loop(
    name: &'static str,
    interval_secs: u64,
    ctx: JobContext,
    job: fn(JobContext) -> JobFuture,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The immediate first tick would race startup; skip it.
        interval.tick().await;

        loop {
            interval.tick().await;
            log::info!("Running {} sweep", name);
            match job(ctx.clone()).await {
                Ok(summary) => log::info!("{} sweep finished: {}", name, summary),
                Err(err) => log::error!("{} sweep failed: {}", name, err),
            }
        }
    });
}
