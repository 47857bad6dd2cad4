use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::propertymodel::Property;

#[async_trait]
pub trait WishlistExt {
    /// Flip the (customer, property) pair. Returns whether the pair is
    /// present after the call, plus the customer's total wishlist count.
    async fn toggle_wishlist(
        &self,
        customer_id: Uuid,
        property_id: Uuid,
    ) -> Result<(bool, i64), Error>;

    async fn get_wishlist_properties(&self, customer_id: Uuid) -> Result<Vec<Property>, Error>;

    async fn wishlist_count(&self, customer_id: Uuid) -> Result<i64, Error>;
}

#[async_trait]
impl WishlistExt for DBClient {
    async fn toggle_wishlist(
        &self,
        customer_id: Uuid,
        property_id: Uuid,
    ) -> Result<(bool, i64), Error> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM wishlists WHERE customer_id = $1 AND property_id = $2 RETURNING id",
        )
        .bind(customer_id)
        .bind(property_id)
        .fetch_optional(&mut *tx)
        .await?;

        let in_wishlist = if removed.is_some() {
            false
        } else {
            // The unique (customer_id, property_id) pair makes a concurrent
            // double-insert collapse into one row.
            sqlx::query(
                r#"
                INSERT INTO wishlists (customer_id, property_id)
                VALUES ($1, $2)
                ON CONFLICT (customer_id, property_id) DO NOTHING
                "#,
            )
            .bind(customer_id)
            .bind(property_id)
            .execute(&mut *tx)
            .await?;
            true
        };

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM wishlists WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((in_wishlist, count))
    }

    async fn get_wishlist_properties(&self, customer_id: Uuid) -> Result<Vec<Property>, Error> {
        let properties = sqlx::query_as::<_, Property>(
            r#"
            SELECT p.id, p.owner_id, p.title, p.description, p.address, p.city,
                   p.property_type, p.bedrooms, p.bathrooms, p.rent_amount,
                   p.security_deposit, p.status, p.is_available, p.created_at, p.updated_at
            FROM wishlists w
            JOIN properties p ON p.id = w.property_id
            WHERE w.customer_id = $1
            ORDER BY w.created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    async fn wishlist_count(&self, customer_id: Uuid) -> Result<i64, Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM wishlists WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
