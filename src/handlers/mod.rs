use actix_web::web;

pub mod employee;
pub mod order;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/v1/employees")
            .route(web::get().to(employee::get_employees))
            .route(web::post().to(employee::create_employee)),
    )
    // Must precede the `{employee_id}` resource.
    .service(
        web::resource("/v1/employees/options")
            .route(web::get().to(employee::get_employee_options)),
    )
    .service(
        web::resource("/v1/employees/{employee_id}")
            .route(web::get().to(employee::get_employee))
            .route(web::delete().to(employee::delete_employee)),
    )
    .service(
        web::resource("/v1/orders")
            .route(web::get().to(order::get_orders)),
    );
}
