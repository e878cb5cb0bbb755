use async_trait::async_trait;
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeOption, EmployeeWithManager, NewEmployee};
use crate::models::order::OrderListing;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Every query the request handlers issue against the Northwind database.
#[async_trait]
pub trait NorthwindStore: Send + Sync {
    async fn list_employees(&self) -> Result<Vec<EmployeeWithManager>, AppError>;

    async fn find_employee(&self, employee_id: i32) -> Result<Option<Employee>, AppError>;

    /// Ordered by last name.
    async fn employee_options(&self) -> Result<Vec<EmployeeOption>, AppError>;

    async fn insert_employee(&self, new_employee: NewEmployee) -> Result<Employee, AppError>;

    /// Removes the row and hands it back, or `None` if nothing matched.
    async fn delete_employee(&self, employee_id: i32) -> Result<Option<Employee>, AppError>;

    /// Orders whose freight is at least `min_freight`, joined to employee and shipper.
    async fn orders_with_min_freight(&self, min_freight: f64) -> Result<Vec<OrderListing>, AppError>;
}

pub async fn create_pool(config: &Config) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    if config.run_migrations {
        info!("Applying database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    Ok(pool)
}
