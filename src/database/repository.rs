use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::PaymentDebt;

/// Persistence seam for payment debt records
#[async_trait]
pub trait PaymentDebtRepository: Send + Sync {
    /// Connectivity check used by /health
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Insert a new record; an existing `debt_id` is a `Conflict`
    async fn insert(&self, debt: &PaymentDebt) -> Result<PaymentDebt, DatabaseError>;

    async fn count(&self) -> Result<i64, DatabaseError>;

    /// Records ordered by `debt_id`
    async fn select_page(&self, limit: i64, offset: i64) -> Result<Vec<PaymentDebt>, DatabaseError>;

    async fn select_404(&self, debt_id: i32) -> Result<PaymentDebt, DatabaseError>;

    /// Overwrite every non-key column of an existing record
    async fn update(&self, debt: &PaymentDebt) -> Result<PaymentDebt, DatabaseError>;

    async fn delete(&self, debt_id: i32) -> Result<(), DatabaseError>;
}

pub struct PgPaymentDebtRepository {
    pool: PgPool,
}

impl PgPaymentDebtRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(debt_id: i32) -> DatabaseError {
    DatabaseError::NotFound(format!("payment debt {} not found", debt_id))
}

#[async_trait]
impl PaymentDebtRepository for PgPaymentDebtRepository {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn insert(&self, debt: &PaymentDebt) -> Result<PaymentDebt, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            PaymentDebt::TABLE,
            PaymentDebt::COLUMNS,
            PaymentDebt::COLUMNS
        );

        sqlx::query_as::<_, PaymentDebt>(&sql)
            .bind(debt.debt_id)
            .bind(&debt.name)
            .bind(debt.government_id)
            .bind(&debt.email)
            .bind(debt.debt_amount)
            .bind(debt.debt_due_date)
            .bind(debt.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => DatabaseError::Conflict(
                    format!("payment debt {} already exists", debt.debt_id),
                ),
                other => other.into(),
            })
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {}", PaymentDebt::TABLE);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn select_page(&self, limit: i64, offset: i64) -> Result<Vec<PaymentDebt>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY debt_id LIMIT $1 OFFSET $2",
            PaymentDebt::COLUMNS,
            PaymentDebt::TABLE
        );

        let rows = sqlx::query_as::<_, PaymentDebt>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn select_404(&self, debt_id: i32) -> Result<PaymentDebt, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE debt_id = $1",
            PaymentDebt::COLUMNS,
            PaymentDebt::TABLE
        );

        sqlx::query_as::<_, PaymentDebt>(&sql)
            .bind(debt_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(debt_id))
    }

    async fn update(&self, debt: &PaymentDebt) -> Result<PaymentDebt, DatabaseError> {
        let sql = format!(
            "UPDATE {} SET name = $2, government_id = $3, email = $4, debt_amount = $5, \
             debt_due_date = $6, status = $7 WHERE debt_id = $1 RETURNING {}",
            PaymentDebt::TABLE,
            PaymentDebt::COLUMNS
        );

        sqlx::query_as::<_, PaymentDebt>(&sql)
            .bind(debt.debt_id)
            .bind(&debt.name)
            .bind(debt.government_id)
            .bind(&debt.email)
            .bind(debt.debt_amount)
            .bind(debt.debt_due_date)
            .bind(debt.status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(debt.debt_id))
    }

    async fn delete(&self, debt_id: i32) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE debt_id = $1", PaymentDebt::TABLE);
        let result = sqlx::query(&sql).bind(debt_id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(not_found(debt_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::database::models::PaymentDebtStatus;
    use crate::testing::{postgres_pool, unique_debt_id};

    fn debt(debt_id: i32) -> PaymentDebt {
        PaymentDebt {
            debt_id,
            name: "John Doe".to_string(),
            government_id: 11111111111,
            email: "johndoe@kanastra.com.br".to_string(),
            debt_amount: Decimal::from_str("1500.50").unwrap(),
            debt_due_date: NaiveDate::from_ymd_opt(2022, 10, 12).unwrap(),
            status: PaymentDebtStatus::Open,
        }
    }

    #[tokio::test]
    async fn insert_select_update_delete() {
        let Some(pool) = postgres_pool().await else { return };
        let repo = PgPaymentDebtRepository::new(pool);
        let debt_id = unique_debt_id();

        let created = repo.insert(&debt(debt_id)).await.unwrap();
        assert_eq!(created, debt(debt_id));
        assert_eq!(created.debt_amount.to_string(), "1500.50");

        let duplicate = repo.insert(&debt(debt_id)).await;
        assert!(matches!(duplicate, Err(DatabaseError::Conflict(_))));

        assert_eq!(repo.select_404(debt_id).await.unwrap(), created);

        let mut changed = created.clone();
        changed.name = "Jane Roe".to_string();
        changed.debt_amount = Decimal::from_str("99999999.99").unwrap();
        changed.status = PaymentDebtStatus::Payed;
        let updated = repo.update(&changed).await.unwrap();
        assert_eq!(updated, changed);
        assert_eq!(repo.select_404(debt_id).await.unwrap().status, PaymentDebtStatus::Payed);

        repo.delete(debt_id).await.unwrap();
        assert!(matches!(repo.select_404(debt_id).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(repo.delete(debt_id).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(repo.update(&changed).await, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn pages_are_ordered_by_debt_id() {
        let Some(pool) = postgres_pool().await else { return };
        let repo = PgPaymentDebtRepository::new(pool);
        repo.ping().await.unwrap();

        let low = unique_debt_id();
        let high = low + 1;
        repo.insert(&debt(high)).await.unwrap();
        repo.insert(&debt(low)).await.unwrap();

        let count = repo.count().await.unwrap();
        assert!(count >= 2);

        // other tests may insert concurrently
        let page = repo.select_page(count + 100, 0).await.unwrap();
        let ids: Vec<i32> = page.iter().map(|d| d.debt_id).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        let low_at = ids.iter().position(|id| *id == low).unwrap();
        assert_eq!(ids[low_at + 1], high);

        assert!(repo.select_page(1, i64::from(i32::MAX)).await.unwrap().is_empty());

        repo.delete(low).await.unwrap();
        repo.delete(high).await.unwrap();
    }
}
