//! # Supplier Repository

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use tillpoint_core::{Supplier, STATUS_DISABLED};

/// Fields accepted when creating or updating a supplier.
#[derive(Debug, Clone)]
pub struct SupplierInput {
    pub name: String,
    pub address: String,
    pub contact_person: String,
    pub contact_no: String,
    pub status: i64,
}

/// Repository for supplier operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Lists all suppliers, newest first.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, address, contact_person, contact_no, status, created_at
            FROM suppliers
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Gets a supplier by ID.
    pub async fn get(&self, id: i64) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, name, address, contact_person, contact_no, status, created_at
            FROM suppliers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Checks whether a supplier exists.
    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM suppliers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Inserts a supplier and returns the stored row.
    pub async fn create(&self, input: &SupplierInput) -> DbResult<Supplier> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO suppliers (name, address, contact_person, contact_no, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.contact_person)
        .bind(&input.contact_no)
        .bind(input.status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Updates a supplier's fields.
    pub async fn update(&self, id: i64, input: &SupplierInput) -> DbResult<Supplier> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = ?2,
                address = ?3,
                contact_person = ?4,
                contact_no = ?5,
                status = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.contact_person)
        .bind(&input.contact_no)
        .bind(input.status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Soft-disables a supplier (status = 0).
    pub async fn disable(&self, id: i64) -> DbResult<Supplier> {
        let result = sqlx::query("UPDATE suppliers SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(STATUS_DISABLED)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }
}
