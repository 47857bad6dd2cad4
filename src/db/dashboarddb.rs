use async_trait::async_trait;
use serde::Serialize;
use sqlx::{Error, FromRow, Row};
use uuid::Uuid;

use super::db::DBClient;

#[derive(Debug, Serialize, FromRow)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_properties: i64,
    pub pending_properties: i64,
    pub active_bookings: i64,
    pub successful_payments: i64,
    pub total_commission: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct OwnerStats {
    pub total_properties: i64,
    pub rented_properties: i64,
    pub active_bookings: i64,
    pub pending_visits: i64,
    pub total_earnings: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct CustomerStats {
    pub active_bookings: i64,
    pub upcoming_visits: i64,
    pub wishlist_count: i64,
    pub total_paid: i64,
}

#[async_trait]
pub trait DashboardExt {
    async fn admin_stats(&self) -> Result<AdminStats, Error>;
    async fn owner_stats(&self, owner_id: Uuid) -> Result<OwnerStats, Error>;
    async fn customer_stats(&self, customer_id: Uuid) -> Result<CustomerStats, Error>;
}

#[async_trait]
impl DashboardExt for DBClient {
    async fn admin_stats(&self) -> Result<AdminStats, Error> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM properties) AS total_properties,
                (SELECT COUNT(*) FROM properties WHERE status = 'pending') AS pending_properties,
                (SELECT COUNT(*) FROM bookings WHERE status = 'active') AS active_bookings,
                (SELECT COUNT(*) FROM payments WHERE status = 'successful') AS successful_payments,
                (SELECT COALESCE(SUM(commission_amount), 0)::BIGINT FROM payments
                  WHERE status = 'successful') AS total_commission
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminStats {
            total_users: row.get("total_users"),
            total_properties: row.get("total_properties"),
            pending_properties: row.get("pending_properties"),
            active_bookings: row.get("active_bookings"),
            successful_payments: row.get("successful_payments"),
            total_commission: row.get("total_commission"),
        })
    }

    async fn owner_stats(&self, owner_id: Uuid) -> Result<OwnerStats, Error> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM properties WHERE owner_id = $1) AS total_properties,
                (SELECT COUNT(*) FROM properties WHERE owner_id = $1
                  AND status = 'rented') AS rented_properties,
                (SELECT COUNT(*) FROM bookings WHERE owner_id = $1
                  AND status = 'active') AS active_bookings,
                (SELECT COUNT(*) FROM property_visits WHERE owner_id = $1
                  AND status = 'pending') AS pending_visits,
                (SELECT COALESCE(SUM(owner_payout), 0)::BIGINT FROM payments
                  WHERE owner_id = $1 AND status = 'successful') AS total_earnings
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(OwnerStats {
            total_properties: row.get("total_properties"),
            rented_properties: row.get("rented_properties"),
            active_bookings: row.get("active_bookings"),
            pending_visits: row.get("pending_visits"),
            total_earnings: row.get("total_earnings"),
        })
    }

    async fn customer_stats(&self, customer_id: Uuid) -> Result<CustomerStats, Error> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM bookings WHERE customer_id = $1
                  AND status = 'active') AS active_bookings,
                (SELECT COUNT(*) FROM property_visits WHERE customer_id = $1
                  AND status IN ('pending', 'approved')
                  AND requested_at > NOW()) AS upcoming_visits,
                (SELECT COUNT(*) FROM wishlists WHERE customer_id = $1) AS wishlist_count,
                (SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payments
                  WHERE customer_id = $1 AND status = 'successful') AS total_paid
            "#,
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(CustomerStats {
            active_bookings: row.get("active_bookings"),
            upcoming_visits: row.get("upcoming_visits"),
            wishlist_count: row.get("wishlist_count"),
            total_paid: row.get("total_paid"),
        })
    }
}
