// orderflow/src/store/postgres.rs

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use super::{column_quantity, OrderRecord, OrderStore, StoreError};
use crate::message::OrderMessage;

const CREATE_ORDERS_TABLE: &str = r#"
  CREATE TABLE IF NOT EXISTS orders (
    order_id   TEXT PRIMARY KEY,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    quantity   INTEGER NOT NULL DEFAULT 1
  )
"#;

// Tables created by older deployments have no quantity column.
const ADD_QUANTITY_COLUMN: &str = "ALTER TABLE orders ADD COLUMN IF NOT EXISTS quantity INTEGER NOT NULL DEFAULT 1";

/// `OrderStore` over a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Opens a pool and verifies it with one round trip.
  pub async fn connect(database_url: &str, max_connections: u32, acquire_timeout: Duration) -> Result<Self, StoreError> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .acquire_timeout(acquire_timeout)
      .connect(database_url)
      .await?;
    info!(dsn = "redacted", "postgres_connected");
    Ok(Self::new(pool))
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  /// Creates the `orders` table if needed. Safe to run from every process.
  pub async fn ensure_schema(&self) -> Result<(), StoreError> {
    sqlx::query(CREATE_ORDERS_TABLE).execute(&self.pool).await?;
    sqlx::query(ADD_QUANTITY_COLUMN).execute(&self.pool).await?;
    Ok(())
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  async fn insert_order(&self, message: &OrderMessage) -> Result<(), StoreError> {
    let quantity = column_quantity(message)?;
    sqlx::query("INSERT INTO orders (order_id, quantity) VALUES ($1, $2)")
      .bind(&message.order_id)
      .bind(quantity)
      .execute(&self.pool)
      .await
      .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => StoreError::Duplicate {
          order_id: message.order_id.clone(),
        },
        other => StoreError::Database(other),
      })?;
    Ok(())
  }

  async fn list_recent_orders(&self, limit: i64) -> Result<Vec<OrderRecord>, StoreError> {
    let records = sqlx::query_as::<_, OrderRecord>(
      "SELECT order_id, created_at, quantity FROM orders ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(&self.pool)
    .await?;
    Ok(records)
  }

  async fn ping(&self) -> Result<(), StoreError> {
    sqlx::query("SELECT 1").execute(&self.pool).await?;
    Ok(())
  }
}
