pub mod config;
pub mod db;
pub mod dtos;
pub mod error;
pub mod handler;
pub mod mail;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod utils;

use std::sync::Arc;

use config::Config;
use db::db::DBClient;
use service::{
    gateway::PaymentGateway, reconciliation::ReconciliationService,
    recurring::RecurringBillingService,
};

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub gateway: Arc<PaymentGateway>,
    pub reconciliation: Arc<ReconciliationService>,
    pub billing: Arc<RecurringBillingService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);
        let gateway = Arc::new(PaymentGateway::new(&config));

        let reconciliation = Arc::new(ReconciliationService::new(
            db_client_arc.clone(),
            gateway.clone(),
            config.commission_rate_bp,
        ));

        let billing = Arc::new(RecurringBillingService::new(
            db_client_arc.clone(),
            gateway.clone(),
            config.commission_rate_bp,
            config.operator_email.clone(),
        ));

        Self {
            env: config,
            db_client: db_client_arc,
            gateway,
            reconciliation,
            billing,
        }
    }
}
