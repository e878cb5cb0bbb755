use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

use crate::db::NorthwindStore;
use crate::errors::AppError;
use crate::models::employee::{
    Employee, EmployeeOption, EmployeeSummary, EmployeeWithManager, NewEmployee,
};
use crate::models::order::{Order, OrderListing, Shipper};

const EMPLOYEE_COLUMNS: &str = "employee_id, last_name, first_name, title, title_of_courtesy, \
     birth_date, hire_date, address, city, region, postal_code, country, home_phone, extension, \
     notes, reports_to, photo_path";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    #[sqlx(flatten)]
    employee: Employee,
    manager_first_name: Option<String>,
    manager_last_name: Option<String>,
}

impl From<EmployeeRow> for EmployeeWithManager {
    fn from(row: EmployeeRow) -> Self {
        let reports_to_navigation = match (row.employee.reports_to, row.manager_first_name, row.manager_last_name) {
            (Some(employee_id), Some(first_name), Some(last_name)) => Some(EmployeeSummary {
                employee_id,
                first_name,
                last_name,
            }),
            _ => None,
        };
        EmployeeWithManager {
            employee: row.employee,
            reports_to_navigation,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: i32,
    customer_id: Option<String>,
    employee_id: Option<i32>,
    order_date: Option<NaiveDateTime>,
    required_date: Option<NaiveDateTime>,
    shipped_date: Option<NaiveDateTime>,
    ship_via: Option<i32>,
    freight: Option<f64>,
    ship_name: Option<String>,
    ship_city: Option<String>,
    ship_country: Option<String>,
    employee_first_name: Option<String>,
    employee_last_name: Option<String>,
    shipper_company_name: Option<String>,
    shipper_phone: Option<String>,
}

impl From<OrderRow> for OrderListing {
    fn from(row: OrderRow) -> Self {
        let employee = match (row.employee_id, row.employee_first_name, row.employee_last_name) {
            (Some(employee_id), Some(first_name), Some(last_name)) => Some(EmployeeSummary {
                employee_id,
                first_name,
                last_name,
            }),
            _ => None,
        };
        let ship_via_navigation = match (row.ship_via, row.shipper_company_name) {
            (Some(shipper_id), Some(company_name)) => Some(Shipper {
                shipper_id,
                company_name,
                phone: row.shipper_phone,
            }),
            _ => None,
        };
        OrderListing {
            order: Order {
                order_id: row.order_id,
                customer_id: row.customer_id,
                employee_id: row.employee_id,
                order_date: row.order_date,
                required_date: row.required_date,
                shipped_date: row.shipped_date,
                ship_via: row.ship_via,
                freight: row.freight,
                ship_name: row.ship_name,
                ship_city: row.ship_city,
                ship_country: row.ship_country,
            },
            employee,
            ship_via_navigation,
        }
    }
}

#[async_trait]
impl NorthwindStore for PgStore {
    async fn list_employees(&self) -> Result<Vec<EmployeeWithManager>, AppError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT
                e.employee_id, e.last_name, e.first_name, e.title, e.title_of_courtesy,
                e.birth_date, e.hire_date, e.address, e.city, e.region, e.postal_code,
                e.country, e.home_phone, e.extension, e.notes, e.reports_to, e.photo_path,
                m.first_name AS manager_first_name,
                m.last_name AS manager_last_name
            FROM employees e
            LEFT JOIN employees m ON m.employee_id = e.reports_to
            ORDER BY e.employee_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(EmployeeWithManager::from).collect())
    }

    async fn find_employee(&self, employee_id: i32) -> Result<Option<Employee>, AppError> {
        let sql = format!("SELECT {} FROM employees WHERE employee_id = $1", EMPLOYEE_COLUMNS);
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn employee_options(&self) -> Result<Vec<EmployeeOption>, AppError> {
        let summaries = sqlx::query_as::<_, EmployeeSummary>(
            "SELECT employee_id, first_name, last_name FROM employees ORDER BY last_name, first_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(summaries.iter().map(EmployeeOption::from).collect())
    }

    async fn insert_employee(&self, new_employee: NewEmployee) -> Result<Employee, AppError> {
        let sql = format!(
            "INSERT INTO employees (last_name, first_name, title, title_of_courtesy, birth_date, \
             hire_date, address, city, region, postal_code, country, home_phone, extension, notes, \
             reports_to, photo_path) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {}",
            EMPLOYEE_COLUMNS
        );
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(new_employee.last_name)
            .bind(new_employee.first_name)
            .bind(new_employee.title)
            .bind(new_employee.title_of_courtesy)
            .bind(new_employee.birth_date)
            .bind(new_employee.hire_date)
            .bind(new_employee.address)
            .bind(new_employee.city)
            .bind(new_employee.region)
            .bind(new_employee.postal_code)
            .bind(new_employee.country)
            .bind(new_employee.home_phone)
            .bind(new_employee.extension)
            .bind(new_employee.notes)
            .bind(new_employee.reports_to)
            .bind(new_employee.photo_path)
            .fetch_one(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn delete_employee(&self, employee_id: i32) -> Result<Option<Employee>, AppError> {
        let sql = format!(
            "DELETE FROM employees WHERE employee_id = $1 RETURNING {}",
            EMPLOYEE_COLUMNS
        );
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn orders_with_min_freight(&self, min_freight: f64) -> Result<Vec<OrderListing>, AppError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT
                o.order_id, o.customer_id, o.employee_id, o.order_date, o.required_date,
                o.shipped_date, o.ship_via, o.freight::float8 AS freight, o.ship_name,
                o.ship_city, o.ship_country,
                e.first_name AS employee_first_name,
                e.last_name AS employee_last_name,
                s.company_name AS shipper_company_name,
                s.phone AS shipper_phone
            FROM orders o
            LEFT JOIN employees e ON e.employee_id = o.employee_id
            LEFT JOIN shippers s ON s.shipper_id = o.ship_via
            WHERE o.freight::float8 >= $1
            ORDER BY o.order_id
            "#,
        )
        .bind(min_freight)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderListing::from).collect())
    }
}
