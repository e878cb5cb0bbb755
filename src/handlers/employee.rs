use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use log::{info, warn};
use serde_json::json;

use crate::db::NorthwindStore;
use crate::errors::AppError;
use crate::models::employee::EmployeeDetails;
use crate::utils::photo::PhotoStore;
use crate::utils::upload::read_employee_form;
use crate::utils::validation::validate_payload;

pub async fn get_employees(
    store: web::Data<dyn NorthwindStore>,
) -> Result<HttpResponse, AppError> {
    let employees = store.list_employees().await?;
    Ok(HttpResponse::Ok().json(employees))
}

pub async fn get_employee_options(
    store: web::Data<dyn NorthwindStore>,
) -> Result<HttpResponse, AppError> {
    let options = store.employee_options().await?;
    Ok(HttpResponse::Ok().json(options))
}

pub async fn get_employee(
    store: web::Data<dyn NorthwindStore>,
    employee_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let employee_id = employee_id.into_inner();

    let employee = store
        .find_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let manager = match employee.reports_to {
        Some(manager_id) => store.find_employee(manager_id).await?,
        None => None,
    };

    Ok(HttpResponse::Ok().json(EmployeeDetails::new(employee, manager.as_ref())))
}

pub async fn create_employee(
    store: web::Data<dyn NorthwindStore>,
    photos: web::Data<PhotoStore>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let form = read_employee_form(payload, photos.max_bytes()).await?;
    let mut new_employee = form.to_new_employee()?;
    validate_payload(&new_employee)?;

    // Photo is written before the row; a failed insert removes it again.
    if let Some(upload) = &form.upload {
        new_employee.photo_path = Some(photos.save(upload).await?);
    }

    let photo_path = new_employee.photo_path.clone();
    let employee = match store.insert_employee(new_employee).await {
        Ok(employee) => employee,
        Err(err) => {
            if let Some(file_name) = photo_path {
                warn!("Employee insert failed, discarding photo {}", file_name);
                photos.remove_best_effort(&file_name).await;
            }
            return Err(err);
        }
    };

    info!(
        "Created employee {} ({} {})",
        employee.employee_id, employee.first_name, employee.last_name
    );
    Ok(HttpResponse::Created().json(employee))
}

pub async fn delete_employee(
    store: web::Data<dyn NorthwindStore>,
    photos: web::Data<PhotoStore>,
    employee_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let employee_id = employee_id.into_inner();

    let employee = store
        .delete_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    if let Some(file_name) = &employee.photo_path {
        photos.remove_best_effort(file_name).await;
    }

    info!("Deleted employee {}", employee_id);
    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully",
    })))
}
