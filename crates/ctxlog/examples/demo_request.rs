//! Demo of contextual logging across a simulated request -> auth -> query flow.
//!
//! Run with `CTXLOG_LEVEL=info` to hide the debug records.

use std::time::Duration;

use anyhow::Result;
use ctxlog::{Context, LoggerConfig, context_with_logger, current_logger, logger_with_value};
use serde::Serialize;

#[derive(Serialize)]
struct Principal {
    user: String,
    roles: Vec<String>,
}

async fn authenticate() -> Principal {
    let principal = Principal {
        user: "ada".to_string(),
        roles: vec!["admin".to_string()],
    };
    // Tag once at the point the value becomes known; later records inherit it
    current_logger().set_tag("principal", &principal);
    current_logger().debug("authenticated");
    principal
}

async fn query_with_retries(table: &str) -> usize {
    for attempt in 1..=3 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        // Derived per attempt, so `attempt` is never bound twice
        let logger = current_logger().with_tag("attempt", attempt);
        if attempt < 3 {
            logger.warn(format_args!("query on {table} timed out"));
            continue;
        }
        logger.info(format_args!("query on {table} succeeded"));
    }
    12
}

async fn handle_request(request_id: &str) {
    let ctx = context_with_logger(&Context::new());
    ctxlog::logger(&ctx).set_tag("request_id", request_id);

    ctxlog::with_context(ctx.clone(), async {
        current_logger().info("request received");
        let principal = authenticate().await;
        let rows = query_with_retries("orders").await;
        current_logger().info(format_args!("returning {rows} rows to {}", principal.user));
    })
    .await;

    logger_with_value(&ctx, "status", 200).info("request complete");
}

#[tokio::main]
async fn main() -> Result<()> {
    ctxlog::init_with(LoggerConfig::with_level("debug").apply_env())?;

    // Ambient tracing calls land in the same output
    tracing::info!("demo starting");

    handle_request("r-0001").await;
    handle_request("r-0002").await;

    Ok(())
}
