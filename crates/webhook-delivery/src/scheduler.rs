/*!
 * Retry Scheduler
 *
 * Moves jobs off the `delivery_retry` sorted-set onto `delivery_queue`
 * once their due-time has elapsed. Both the Processor (rate-limit
 * deferrals) and this service's own workers (failed-attempt backoff)
 * push jobs onto `delivery_retry`; this is the only consumer of it.
 */

use anyhow::{Context, Result};
use redis::AsyncCommands;
use tracing::{debug, error, warn};

use crate::consumer::RETRY_ZSET;

/// How often to sweep `delivery_retry` for due jobs.
const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_millis(200);

/// Maximum jobs moved per sweep, to keep one tick bounded.
const SWEEP_BATCH_SIZE: isize = 500;

/// Run forever, moving due jobs from `delivery_retry` onto `delivery_queue`.
pub async fn run(redis_url: &str, queue_name: &str) -> Result<()> {
    let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;
    let mut conn = redis::aio::ConnectionManager::new(client)
        .await
        .context("Failed to connect scheduler to Redis")?;

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        interval.tick().await;

        if let Err(e) = sweep(&mut conn, queue_name).await {
            error!("Retry scheduler sweep failed: {}", e);
        }
    }
}

async fn sweep(conn: &mut redis::aio::ConnectionManager, queue_name: &str) -> Result<()> {
    let now_ms = chrono::Utc::now().timestamp_millis();

    // ZRANGEBYSCORE delivery_retry -inf now LIMIT 0 SWEEP_BATCH_SIZE
    let due: Vec<String> = redis::cmd("ZRANGEBYSCORE")
        .arg(RETRY_ZSET)
        .arg("-inf")
        .arg(now_ms)
        .arg("LIMIT")
        .arg(0)
        .arg(SWEEP_BATCH_SIZE)
        .query_async(conn)
        .await
        .context("Failed to read due jobs from retry sorted-set")?;

    if due.is_empty() {
        return Ok(());
    }

    debug!("Moving {} due job(s) off {}", due.len(), RETRY_ZSET);

    for job_json in due {
        if let Err(e) = conn.lpush::<_, _, ()>(queue_name, &job_json).await {
            warn!("Failed to requeue due job, leaving it on retry set: {}", e);
            continue;
        }

        if let Err(e) = conn.zrem::<_, _, ()>(RETRY_ZSET, &job_json).await {
            error!(
                "Requeued job but failed to remove it from {}: {}",
                RETRY_ZSET, e
            );
        }
    }

    Ok(())
}
