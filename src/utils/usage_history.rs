use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveTime};
use futures_util::StreamExt;
use sqlx::MySqlPool;

use crate::model::leave_request::{UsageRecord, UsageRow};
use crate::policy::EntitlementLedger;

/// Stream one employee's requests starting in `year` and convert them to
/// typed usage records.
pub async fn fetch_year_usage(
    pool: &MySqlPool,
    employee_id: u64,
    year: i32,
) -> Result<Vec<UsageRecord>> {
    let from = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| anyhow!("year {} out of range", year))?
        .and_time(NaiveTime::MIN);
    let until = NaiveDate::from_ymd_opt(year + 1, 1, 1)
        .ok_or_else(|| anyhow!("year {} out of range", year + 1))?
        .and_time(NaiveTime::MIN);

    let mut stream = sqlx::query_as::<_, UsageRow>(
        r#"
        SELECT category, sub_type, start_at, workday_count, status
        FROM leave_requests
        WHERE employee_id = ?
        AND start_at >= ?
        AND start_at < ?
        "#,
    )
    .bind(employee_id)
    .bind(from)
    .bind(until)
    .fetch(pool);

    let mut records = Vec::new();
    let mut skipped = 0usize;

    while let Some(row) = stream.next().await {
        let row = row.context("leave history row fetch failed")?;
        match UsageRecord::try_from(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                // Stored kinds are written by this service; a bad one is a bug.
                debug_assert!(false, "invalid stored leave kind: {e}");
                tracing::error!(error = %e, employee_id, "Skipping leave row with invalid kind");
                skipped += 1;
            }
        }
    }

    tracing::debug!(employee_id, year, loaded = records.len(), skipped, "Leave usage loaded");
    Ok(records)
}

/// Build the ledger for `year`, falling back to an "usage unknown" ledger
/// when history cannot be read.
pub async fn load_ledger(pool: &MySqlPool, employee_id: u64, year: i32) -> EntitlementLedger {
    match fetch_year_usage(pool, employee_id, year).await {
        Ok(records) => EntitlementLedger::build(year, &records),
        Err(e) => {
            tracing::warn!(error = %e, employee_id, year, "Leave history unavailable, ceilings unchecked");
            EntitlementLedger::unknown(year)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::mysql::MySqlPoolOptions;
    use std::time::Duration;

    #[actix_web::test]
    async fn unreachable_history_yields_unknown_ledger() {
        let pool = MySqlPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("mysql://u:p@127.0.0.1:1/x")
            .unwrap();

        let ledger = load_ledger(&pool, 1000, 2024).await;
        assert_eq!(ledger.year(), 2024);
        assert!(!ledger.usage_known());
        assert!(ledger.snapshot().iter().all(|balance| balance.used == 0));
    }
}
