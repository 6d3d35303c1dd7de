//! Agent run bookkeeping
//!
//! Every pipeline stage run leaves an agent_logs row; the status API is
//! derived from them.

use fomento_common::{AGENT_NAMES, AGENT_STATUS_ERROR, AGENT_STATUS_RUNNING, AGENT_STATUS_SUCCESS};
use fomento_persistence::entity::agent_logs;
use fomento_persistence::sea_orm::*;

use crate::model::{AgentLogEntry, AgentStatus};

/// How many recent rows feed the status derivation per agent
const STATUS_WINDOW: u64 = 100;

/// Agents with a finished run inside this window count as active
const ACTIVE_WINDOW_HOURS: i64 = 24;

/// Insert a `running` row for a stage that just started. Returns the row id.
pub async fn record_start(
    db: &DatabaseConnection,
    agent_name: &str,
    action: &str,
) -> anyhow::Result<i64> {
    let entity = agent_logs::ActiveModel {
        agent_name: Set(agent_name.to_string()),
        action: Set(action.to_string()),
        status: Set(AGENT_STATUS_RUNNING.to_string()),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    let result = agent_logs::Entity::insert(entity).exec(db).await?;

    Ok(result.last_insert_id)
}

/// Close a `running` row with its final status and details
pub async fn record_finish(
    db: &DatabaseConnection,
    log_id: i64,
    status: &str,
    details: serde_json::Value,
    execution_time: f64,
) -> anyhow::Result<()> {
    match agent_logs::Entity::find_by_id(log_id).one(db).await? {
        Some(entity) => {
            let mut active: agent_logs::ActiveModel = entity.into();
            active.status = Set(status.to_string());
            active.details = Set(Some(details.to_string()));
            active.execution_time = Set(Some(execution_time));
            active.update(db).await?;
            Ok(())
        }
        None => Ok(()),
    }
}

/// Recent log entries across all agents, newest first
pub async fn recent(db: &DatabaseConnection, limit: u64) -> anyhow::Result<Vec<AgentLogEntry>> {
    let entries = agent_logs::Entity::find()
        .order_by_desc(agent_logs::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?
        .into_iter()
        .map(AgentLogEntry::from)
        .collect();

    Ok(entries)
}

/// Per-agent status derived from the recent log rows
pub async fn status_summary(db: &DatabaseConnection) -> anyhow::Result<Vec<AgentStatus>> {
    let mut statuses = Vec::with_capacity(AGENT_NAMES.len());
    let now = chrono::Utc::now().naive_utc();

    for agent_name in AGENT_NAMES {
        let rows = agent_logs::Entity::find()
            .filter(agent_logs::Column::AgentName.eq(*agent_name))
            .order_by_desc(agent_logs::Column::CreatedAt)
            .limit(STATUS_WINDOW)
            .all(db)
            .await?;

        statuses.push(derive_status(agent_name, &rows, now));
    }

    Ok(statuses)
}

fn derive_status(
    agent_name: &str,
    rows: &[agent_logs::Model],
    now: chrono::NaiveDateTime,
) -> AgentStatus {
    let last_run = rows.first().map(|r| r.created_at);

    let successes = rows
        .iter()
        .filter(|r| r.status == AGENT_STATUS_SUCCESS)
        .count();
    let failures = rows
        .iter()
        .filter(|r| r.status == AGENT_STATUS_ERROR)
        .count();

    let success_rate = if successes + failures > 0 {
        successes as f64 / (successes + failures) as f64 * 100.0
    } else {
        0.0
    };

    let total_processed = rows
        .iter()
        .filter(|r| r.status == AGENT_STATUS_SUCCESS)
        .filter_map(|r| {
            r.details
                .as_deref()
                .and_then(|d| serde_json::from_str::<serde_json::Value>(d).ok())
                .and_then(|d| d.get("processed").and_then(|v| v.as_i64()))
        })
        .sum();

    let status = match rows.first() {
        Some(row) if row.status == AGENT_STATUS_RUNNING => "running",
        Some(row) if now - row.created_at <= chrono::Duration::hours(ACTIVE_WINDOW_HOURS) => {
            "active"
        }
        Some(_) => "idle",
        None => "idle",
    };

    AgentStatus {
        name: agent_name.to_string(),
        status: status.to_string(),
        last_run,
        success_rate,
        total_processed,
    }
}

/// Delete log rows older than the retention window. Returns affected rows.
pub async fn prune_older_than(db: &DatabaseConnection, days: i64) -> anyhow::Result<u64> {
    let cutoff = chrono::Utc::now().naive_utc() - chrono::Duration::days(days);

    let result = agent_logs::Entity::delete_many()
        .filter(agent_logs::Column::CreatedAt.lt(cutoff))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, age_hours: i64, details: Option<&str>) -> agent_logs::Model {
        agent_logs::Model {
            id: 1,
            agent_name: "collector".to_string(),
            action: "collect".to_string(),
            status: status.to_string(),
            details: details.map(|d| d.to_string()),
            execution_time: Some(1.0),
            created_at: chrono::Utc::now().naive_utc() - chrono::Duration::hours(age_hours),
        }
    }

    #[test]
    fn test_derive_status_running() {
        let now = chrono::Utc::now().naive_utc();
        let rows = vec![row("running", 0, None), row("success", 1, None)];

        let status = derive_status("collector", &rows, now);
        assert_eq!(status.status, "running");
        assert!(status.last_run.is_some());
    }

    #[test]
    fn test_derive_status_success_rate_and_totals() {
        let now = chrono::Utc::now().naive_utc();
        let rows = vec![
            row("success", 1, Some(r#"{"processed": 12}"#)),
            row("success", 2, Some(r#"{"processed": 8}"#)),
            row("error", 3, None),
            row("running", 4, None),
        ];

        let status = derive_status("collector", &rows, now);
        assert_eq!(status.status, "active");
        assert!((status.success_rate - 66.666).abs() < 0.1);
        assert_eq!(status.total_processed, 20);
    }

    #[test]
    fn test_derive_status_idle() {
        let now = chrono::Utc::now().naive_utc();

        let status = derive_status("ranker", &[], now);
        assert_eq!(status.status, "idle");
        assert_eq!(status.success_rate, 0.0);
        assert!(status.last_run.is_none());

        let stale = vec![row("success", 48, None)];
        assert_eq!(derive_status("ranker", &stale, now).status, "idle");
    }
}
