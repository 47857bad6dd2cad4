use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    db::{
        db::DBClient,
        paymentdb::{DueAgreement, PaymentExt},
    },
    mail::mails::{
        send_billing_summary_email, send_owner_payout_email, send_recurring_failure_email,
        send_recurring_success_email,
    },
    models::{
        bookingmodel::generate_booking_reference,
        paymentmodel::{PaymentStatus, PaymentType},
    },
    service::{
        gateway::{ChargeRequest, PaymentGateway, TokenCharger},
        pricing,
    },
};

/// "YYYY-MM" billing period key for a point in time.
pub fn current_period(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

#[derive(Debug, Default, Serialize)]
pub struct BillingRunSummary {
    pub period: String,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl BillingRunSummary {
    pub fn new(period: &str) -> Self {
        Self {
            period: period.to_string(),
            ..Default::default()
        }
    }

    pub fn record_success(&mut self) {
        self.processed += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, error: String) {
        self.processed += 1;
        self.failed += 1;
        self.errors.push(error);
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn report(&self) -> String {
        let mut lines = vec![format!(
            "Recurring billing {}: {} processed, {} succeeded, {} failed, {} skipped",
            self.period, self.processed, self.succeeded, self.failed, self.skipped
        )];
        for error in &self.errors {
            lines.push(format!("  - {}", error));
        }
        lines.join("\n")
    }
}

/// One agreement's charge-and-record step, behind a trait so the run loop
/// can be exercised without a database or gateway.
#[async_trait]
pub trait AgreementBiller {
    async fn bill(&self, item: &DueAgreement, period: &str) -> Result<(), String>;
}

/// Drive every due agreement independently: a failure is recorded and the
/// loop moves on. Nothing here aborts the run.
pub async fn bill_all<B: AgreementBiller + ?Sized>(
    biller: &B,
    items: &[DueAgreement],
    period: &str,
) -> BillingRunSummary {
    let mut summary = BillingRunSummary::new(period);

    for item in items {
        match biller.bill(item, period).await {
            Ok(()) => summary.record_success(),
            Err(e) => {
                tracing::error!(
                    "Billing agreement {} failed: {}",
                    item.agreement_id,
                    e
                );
                summary.record_failure(format!("agreement {}: {}", item.agreement_id, e));
            }
        }
    }

    summary
}

#[derive(Clone)]
pub struct RecurringBillingService {
    db_client: Arc<DBClient>,
    gateway: Arc<PaymentGateway>,
    commission_rate_bp: i64,
    operator_email: String,
}

impl RecurringBillingService {
    pub fn new(
        db_client: Arc<DBClient>,
        gateway: Arc<PaymentGateway>,
        commission_rate_bp: i64,
        operator_email: String,
    ) -> Self {
        Self {
            db_client,
            gateway,
            commission_rate_bp,
            operator_email,
        }
    }

    /// One full billing cycle for the current period.
    pub async fn run_cycle(&self) -> anyhow::Result<BillingRunSummary> {
        let period = current_period(Utc::now());
        let due = self.db_client.get_due_agreements(&period).await?;

        tracing::info!(
            "Recurring billing: {} agreement(s) due for period {}",
            due.len(),
            period
        );

        // Claim periods up front; a concurrent run (or a re-run after a
        // crash) finds nothing left to claim and cannot double-charge.
        let mut claimed = Vec::new();
        let mut summary = BillingRunSummary::new(&period);
        for item in due {
            match self
                .db_client
                .claim_billing_period(item.agreement_id, &period)
                .await
            {
                Ok(true) => claimed.push(item),
                Ok(false) => {
                    tracing::info!(
                        "Agreement {} already billed for {}, skipping",
                        item.agreement_id,
                        period
                    );
                    summary.record_skip();
                }
                Err(e) => summary.record_failure(format!(
                    "agreement {}: failed to claim period: {}",
                    item.agreement_id, e
                )),
            }
        }

        let charged = bill_all(self, &claimed, &period).await;
        summary.processed += charged.processed;
        summary.succeeded += charged.succeeded;
        summary.failed += charged.failed;
        summary.errors.extend(charged.errors);

        tracing::info!("{}", summary.report());
        if let Err(e) = send_billing_summary_email(&self.operator_email, &summary.report()).await {
            tracing::error!("Failed to send billing summary email: {}", e);
        }

        Ok(summary)
    }
}

#[async_trait]
impl AgreementBiller for RecurringBillingService {
    async fn bill(&self, item: &DueAgreement, period: &str) -> Result<(), String> {
        let order_id = generate_booking_reference();
        let description = format!("Monthly rent {} - {}", period, item.property_title);
        let split = pricing::split_amount(item.monthly_rent, self.commission_rate_bp);

        let request = ChargeRequest {
            order_id: order_id.clone(),
            token: item.token.clone(),
            amount: item.monthly_rent,
            description,
        };

        match self.gateway.charge(&request).await {
            Ok(outcome) => {
                self.db_client
                    .insert_payment(
                        Some(item.booking_id),
                        item.property_id,
                        item.customer_id,
                        item.owner_id,
                        item.monthly_rent,
                        split.commission,
                        split.owner_payout,
                        PaymentType::Rent,
                        PaymentStatus::Successful,
                        order_id.clone(),
                        Some(outcome.gateway_payment_id.clone()),
                        Some(outcome.raw.clone()),
                    )
                    .await
                    .map_err(|e| format!("charge succeeded but recording failed: {}", e))?;

                if let Err(e) = send_recurring_success_email(
                    &item.customer_email,
                    &item.customer_name,
                    &item.property_title,
                    item.monthly_rent,
                    &order_id,
                )
                .await
                {
                    tracing::error!("Failed to send rent receipt email: {}", e);
                }
                if let Err(e) = send_owner_payout_email(
                    &item.owner_email,
                    &item.owner_name,
                    split.owner_payout,
                    &order_id,
                )
                .await
                {
                    tracing::error!("Failed to send owner payout email: {}", e);
                }

                Ok(())
            }
            Err(gateway_error) => {
                // Record the failed attempt before surfacing the error.
                if let Err(e) = self
                    .db_client
                    .insert_payment(
                        Some(item.booking_id),
                        item.property_id,
                        item.customer_id,
                        item.owner_id,
                        item.monthly_rent,
                        split.commission,
                        split.owner_payout,
                        PaymentType::Rent,
                        PaymentStatus::Failed,
                        order_id.clone(),
                        None,
                        None,
                    )
                    .await
                {
                    tracing::error!("Failed to record failed charge: {}", e);
                }

                if let Err(e) = send_recurring_failure_email(
                    &item.customer_email,
                    &item.customer_name,
                    &item.property_title,
                    item.monthly_rent,
                )
                .await
                {
                    tracing::error!("Failed to send charge-failure email: {}", e);
                }

                Err(gateway_error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn due_agreement(n: usize) -> DueAgreement {
        DueAgreement {
            agreement_id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            monthly_rent: 80000,
            property_title: format!("Property #{}", n),
            customer_name: format!("Customer #{}", n),
            customer_email: format!("customer{}@example.com", n),
            owner_name: format!("Owner #{}", n),
            owner_email: format!("owner{}@example.com", n),
            token: format!("tok_{}", n),
        }
    }

    struct FailsOnFourth;

    #[async_trait]
    impl AgreementBiller for FailsOnFourth {
        async fn bill(&self, item: &DueAgreement, _period: &str) -> Result<(), String> {
            if item.property_title == "Property #4" {
                Err("card declined".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_the_rest() {
        let items: Vec<DueAgreement> = (1..=10).map(due_agreement).collect();

        let summary = bill_all(&FailsOnFourth, &items, "2026-08").await;

        assert_eq!(summary.processed, 10);
        assert_eq!(summary.succeeded, 9);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains(&items[3].agreement_id.to_string()));
        assert!(summary.errors[0].contains("card declined"));
    }

    #[test]
    fn test_current_period() {
        let now = DateTime::parse_from_rfc3339("2026-08-07T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(current_period(now), "2026-08");

        let january = DateTime::parse_from_rfc3339("2027-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(current_period(january), "2027-01");
    }

    #[test]
    fn test_period_ordering_matches_string_ordering() {
        // claim_billing_period compares periods lexically; the YYYY-MM
        // format must order correctly across year boundaries.
        assert!("2026-09" > "2026-08");
        assert!("2027-01" > "2026-12");
    }

    #[test]
    fn test_summary_report_lists_errors() {
        let mut summary = BillingRunSummary::new("2026-08");
        summary.record_success();
        summary.record_failure("agreement x: card declined".to_string());
        summary.record_skip();

        let report = summary.report();
        assert!(report.contains("1 succeeded"));
        assert!(report.contains("1 failed"));
        assert!(report.contains("1 skipped"));
        assert!(report.contains("card declined"));
    }
}
