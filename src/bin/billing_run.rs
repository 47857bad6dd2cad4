//! One-shot recurring billing run, intended for an external scheduler.
//! Exits 0 when the cycle completes (partial charge failures are expected
//! and reported in the summary), 1 on an unhandled error.

use std::sync::Arc;

use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::LevelFilter;

use rentnest::{
    config::Config,
    db::db::DBClient,
    service::{gateway::PaymentGateway, recurring::RecurringBillingService},
};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Cron has no console; log to a daily-rotating file instead.
    let file_appender = tracing_appender::rolling::daily("logs", "billing_run.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client = Arc::new(DBClient::new(pool));
    let gateway = Arc::new(PaymentGateway::new(&config));
    let billing = RecurringBillingService::new(
        db_client,
        gateway,
        config.commission_rate_bp,
        config.operator_email.clone(),
    );

    match billing.run_cycle().await {
        Ok(summary) => {
            tracing::info!("{}", summary.report());
            std::process::exit(0);
        }
        Err(e) => {
            tracing::error!("Billing run aborted: {}", e);
            std::process::exit(1);
        }
    }
}
