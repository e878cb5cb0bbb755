use actix_web::{web, HttpResponse};

use crate::db::NorthwindStore;
use crate::errors::AppError;
use crate::models::order::{filter_by_employee, OrderIndex, OrderQueryParams, FREIGHT_THRESHOLD};

pub async fn get_orders(
    store: web::Data<dyn NorthwindStore>,
    query: web::Query<OrderQueryParams>,
) -> Result<HttpResponse, AppError> {
    let employee_selection = query.employee_selection;

    let orders = store.orders_with_min_freight(FREIGHT_THRESHOLD).await?;
    let orders = filter_by_employee(orders, employee_selection);
    let employees = store.employee_options().await?;

    Ok(HttpResponse::Ok().json(OrderIndex {
        orders,
        employees,
        employee_selection,
    }))
}
