//! Follow-up scheduling and the time-windowed task views. "Today" is the
//! local calendar date at invocation time; the query layer itself never
//! consults the clock.

use anyhow::Result;
use chrono::Local;
use log::info;

use crate::cli::{CompleteArgs, DailyArgs, ScheduleArgs, UpcomingArgs};
use crate::leads::{open_store, print_listing};
use crate::persist::PersistenceGateway;
use crate::query;

pub fn execute_schedule(args: &ScheduleArgs, gateway: &dyn PersistenceGateway) -> Result<()> {
    let mut store = open_store(gateway)?;
    store.schedule_followup(args.id, args.date)?;
    info!(
        "Follow-up for lead {} scheduled on {}",
        args.id,
        args.date.format("%Y-%m-%d")
    );
    Ok(())
}

pub fn execute_complete(args: &CompleteArgs, gateway: &dyn PersistenceGateway) -> Result<()> {
    let mut store = open_store(gateway)?;
    store.complete_followup(args.id)?;
    info!("Follow-up for lead {} marked completed", args.id);
    Ok(())
}

pub fn execute_overdue(gateway: &dyn PersistenceGateway) -> Result<()> {
    let store = open_store(gateway)?;
    let today = Local::now().date_naive();
    let rows = query::overdue(store.table(), today);
    print_listing(store.table(), store.mapping(), &rows);
    info!("{} overdue follow-up(s)", rows.len());
    Ok(())
}

pub fn execute_upcoming(args: &UpcomingArgs, gateway: &dyn PersistenceGateway) -> Result<()> {
    let store = open_store(gateway)?;
    let today = Local::now().date_naive();
    let rows = query::upcoming(store.table(), today, args.days);
    print_listing(store.table(), store.mapping(), &rows);
    info!(
        "{} follow-up(s) due within {} day(s)",
        rows.len(),
        args.days
    );
    Ok(())
}

pub fn execute_daily(args: &DailyArgs, gateway: &dyn PersistenceGateway) -> Result<()> {
    let store = open_store(gateway)?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let rows = query::daily(store.table(), date);
    print_listing(store.table(), store.mapping(), &rows);
    info!(
        "{} task(s) due on {}",
        rows.len(),
        date.format("%Y-%m-%d")
    );
    Ok(())
}
