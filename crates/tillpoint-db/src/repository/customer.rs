//! # Customer Repository
//!
//! Loyalty customers. The checkout workflow calls [`award_on`] after a sale:
//! one more transaction on the count, `total / 200` points, truncating.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DbError, DbResult};
use tillpoint_core::checkout::loyalty_points;
use tillpoint_core::{Customer, Money, STATUS_DISABLED};

/// Fields accepted when creating or updating a customer.
#[derive(Debug, Clone)]
pub struct CustomerInput {
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub contact_no: String,
    pub email: String,
    pub card_number: Option<String>,
    pub status: i64,
}

const CUSTOMER_COLUMNS: &str = "id, account_id, first_name, last_name, contact_no, email, \
     card_number, transaction_count, points, status, created_at";

/// Repository for customer operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists all customers, newest first.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let query = format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id DESC");
        let customers = sqlx::query_as::<_, Customer>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Gets a customer by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Customer>> {
        let query = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Inserts a customer and returns the stored row.
    pub async fn create(&self, input: &CustomerInput) -> DbResult<Customer> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO customers (
                account_id, first_name, last_name, contact_no, email,
                card_number, transaction_count, points, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7, ?8)
            "#,
        )
        .bind(input.account_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.contact_no)
        .bind(&input.email)
        .bind(&input.card_number)
        .bind(input.status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Updates a customer's identity fields. Transaction count and points
    /// only move through the checkout workflow.
    pub async fn update(&self, id: i64, input: &CustomerInput) -> DbResult<Customer> {
        let result = sqlx::query(
            r#"
            UPDATE customers SET
                account_id = ?2,
                first_name = ?3,
                last_name = ?4,
                contact_no = ?5,
                email = ?6,
                card_number = ?7,
                status = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.account_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.contact_no)
        .bind(&input.email)
        .bind(&input.card_number)
        .bind(input.status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Soft-disables a customer (status = 0).
    pub async fn disable(&self, id: i64) -> DbResult<Customer> {
        let result = sqlx::query("UPDATE customers SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(STATUS_DISABLED)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }
}

/// Awards loyalty for one sale on an arbitrary executor.
///
/// Returns the points granted, or None when the customer id doesn't
/// resolve - an order naming an unknown customer still succeeds.
pub(crate) async fn award_on(
    conn: &mut SqliteConnection,
    customer_id: i64,
    order_total: Money,
) -> DbResult<Option<i64>> {
    let earned = loyalty_points(order_total);

    let result = sqlx::query(
        r#"
        UPDATE customers SET
            transaction_count = transaction_count + 1,
            points = points + ?2
        WHERE id = ?1
        "#,
    )
    .bind(customer_id)
    .bind(earned)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    Ok(Some(earned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tillpoint_core::STATUS_ACTIVE;

    fn sample_input() -> CustomerInput {
        CustomerInput {
            account_id: 7,
            first_name: "Maria".to_string(),
            last_name: "Santos".to_string(),
            contact_no: "09170000001".to_string(),
            email: "maria@example.com".to_string(),
            card_number: None,
            status: STATUS_ACTIVE,
        }
    }

    #[tokio::test]
    async fn test_award_accrues_count_and_points() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db.customers().create(&sample_input()).await.unwrap();
        assert_eq!(customer.transaction_count, 0);
        assert_eq!(customer.points, 0);

        let mut conn = db.pool().acquire().await.unwrap();
        // 500.00 -> 2 points
        let earned = award_on(&mut conn, customer.id, Money::from_cents(50000))
            .await
            .unwrap();
        assert_eq!(earned, Some(2));

        let after = db.customers().get(customer.id).await.unwrap().unwrap();
        assert_eq!(after.transaction_count, 1);
        assert_eq!(after.points, 2);
    }

    #[tokio::test]
    async fn test_award_unknown_customer_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let earned = award_on(&mut conn, 999, Money::from_cents(50000))
            .await
            .unwrap();
        assert_eq!(earned, None);
    }
}
