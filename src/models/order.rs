use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::employee::{EmployeeOption, EmployeeSummary};

/// Orders below this freight charge are never listed.
pub const FREIGHT_THRESHOLD: f64 = 250.0;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: i32,
    pub customer_id: Option<String>,
    pub employee_id: Option<i32>,
    pub order_date: Option<NaiveDateTime>,
    pub required_date: Option<NaiveDateTime>,
    pub shipped_date: Option<NaiveDateTime>,
    pub ship_via: Option<i32>,
    pub freight: Option<f64>,
    pub ship_name: Option<String>,
    pub ship_city: Option<String>,
    pub ship_country: Option<String>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Shipper {
    pub shipper_id: i32,
    pub company_name: String,
    pub phone: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OrderListing {
    #[serde(flatten)]
    pub order: Order,
    pub employee: Option<EmployeeSummary>,
    pub ship_via_navigation: Option<Shipper>,
}

#[derive(Deserialize, Debug, Default)]
pub struct OrderQueryParams {
    #[serde(alias = "employeeSelection")]
    pub employee_selection: Option<i32>,
}

#[derive(Serialize, Debug)]
pub struct OrderIndex {
    pub orders: Vec<OrderListing>,
    pub employees: Vec<EmployeeOption>,
    pub employee_selection: Option<i32>,
}

/// Keeps only orders taken by `employee_selection`; `None` keeps everything.
pub fn filter_by_employee(orders: Vec<OrderListing>, employee_selection: Option<i32>) -> Vec<OrderListing> {
    match employee_selection {
        Some(selected) => orders
            .into_iter()
            .filter(|listing| listing.order.employee_id == Some(selected))
            .collect(),
        None => orders,
    }
}
