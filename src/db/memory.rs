//! In-process `NorthwindStore` used by the test-suite.
//!
//! Mirrors the relational constraints the handlers depend on: generated ids,
//! the `reports_to` and order foreign keys, and the freight filter semantics
//! (a null freight never satisfies the threshold).

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::db::NorthwindStore;
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeOption, EmployeeWithManager, NewEmployee};
use crate::models::order::{Order, OrderListing, Shipper};

#[derive(Default)]
struct State {
    next_employee_id: i32,
    employees: BTreeMap<i32, Employee>,
    shippers: BTreeMap<i32, Shipper>,
    orders: BTreeMap<i32, Order>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, AppError> {
        self.state
            .read()
            .map_err(|_| AppError::InternalServerError("Store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, AppError> {
        self.state
            .write()
            .map_err(|_| AppError::InternalServerError("Store lock poisoned".to_string()))
    }

    pub fn insert_shipper(&self, shipper: Shipper) -> Result<(), AppError> {
        let mut state = self.write()?;
        state.shippers.insert(shipper.shipper_id, shipper);
        Ok(())
    }

    pub fn insert_order(&self, order: Order) -> Result<(), AppError> {
        let mut state = self.write()?;
        if let Some(employee_id) = order.employee_id {
            if !state.employees.contains_key(&employee_id) {
                return Err(fk_violation("orders_employee_id_fkey"));
            }
        }
        if let Some(shipper_id) = order.ship_via {
            if !state.shippers.contains_key(&shipper_id) {
                return Err(fk_violation("orders_ship_via_fkey"));
            }
        }
        if state.orders.contains_key(&order.order_id) {
            return Err(AppError::DatabaseError(format!(
                "duplicate key value violates unique constraint \"orders_pkey\" ({})",
                order.order_id
            )));
        }
        state.orders.insert(order.order_id, order);
        Ok(())
    }

    pub fn employee_count(&self) -> Result<usize, AppError> {
        Ok(self.read()?.employees.len())
    }
}

fn fk_violation(constraint: &str) -> AppError {
    AppError::DatabaseError(format!(
        "violates foreign key constraint \"{}\"",
        constraint
    ))
}

#[async_trait]
impl NorthwindStore for MemoryStore {
    async fn list_employees(&self) -> Result<Vec<EmployeeWithManager>, AppError> {
        let state = self.read()?;
        Ok(state
            .employees
            .values()
            .map(|employee| EmployeeWithManager {
                employee: employee.clone(),
                reports_to_navigation: employee
                    .reports_to
                    .and_then(|id| state.employees.get(&id))
                    .map(Employee::summary),
            })
            .collect())
    }

    async fn find_employee(&self, employee_id: i32) -> Result<Option<Employee>, AppError> {
        Ok(self.read()?.employees.get(&employee_id).cloned())
    }

    async fn employee_options(&self) -> Result<Vec<EmployeeOption>, AppError> {
        let state = self.read()?;
        let mut summaries: Vec<_> = state.employees.values().map(Employee::summary).collect();
        summaries.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(summaries.iter().map(EmployeeOption::from).collect())
    }

    async fn insert_employee(&self, new_employee: NewEmployee) -> Result<Employee, AppError> {
        let mut state = self.write()?;
        if let Some(manager_id) = new_employee.reports_to {
            if !state.employees.contains_key(&manager_id) {
                return Err(fk_violation("employees_reports_to_fkey"));
            }
        }
        state.next_employee_id += 1;
        let employee = new_employee.into_employee(state.next_employee_id);
        state.employees.insert(employee.employee_id, employee.clone());
        Ok(employee)
    }

    async fn delete_employee(&self, employee_id: i32) -> Result<Option<Employee>, AppError> {
        let mut state = self.write()?;
        if !state.employees.contains_key(&employee_id) {
            return Ok(None);
        }
        if state.employees.values().any(|e| e.reports_to == Some(employee_id)) {
            return Err(fk_violation("employees_reports_to_fkey"));
        }
        if state.orders.values().any(|o| o.employee_id == Some(employee_id)) {
            return Err(fk_violation("orders_employee_id_fkey"));
        }
        Ok(state.employees.remove(&employee_id))
    }

    async fn orders_with_min_freight(&self, min_freight: f64) -> Result<Vec<OrderListing>, AppError> {
        let state = self.read()?;
        Ok(state
            .orders
            .values()
            .filter(|order| order.freight.map_or(false, |freight| freight >= min_freight))
            .map(|order| OrderListing {
                order: order.clone(),
                employee: order
                    .employee_id
                    .and_then(|id| state.employees.get(&id))
                    .map(Employee::summary),
                ship_via_navigation: order.ship_via.and_then(|id| state.shippers.get(&id)).cloned(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_employee(first: &str, last: &str, reports_to: Option<i32>) -> NewEmployee {
        NewEmployee {
            first_name: first.to_string(),
            last_name: last.to_string(),
            reports_to,
            ..Default::default()
        }
    }

    fn order(order_id: i32, employee_id: Option<i32>, freight: Option<f64>) -> Order {
        Order {
            order_id,
            customer_id: Some("VINET".to_string()),
            employee_id,
            order_date: None,
            required_date: None,
            shipped_date: None,
            ship_via: None,
            freight,
            ship_name: None,
            ship_city: None,
            ship_country: None,
        }
    }

    #[tokio::test]
    async fn rejects_dangling_manager() {
        let store = MemoryStore::new();
        let err = store
            .insert_employee(new_employee("Nancy", "Davolio", Some(99)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(store.employee_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn refuses_to_delete_a_manager_with_reports() {
        let store = MemoryStore::new();
        let manager = store.insert_employee(new_employee("Andrew", "Fuller", None)).await.unwrap();
        store
            .insert_employee(new_employee("Nancy", "Davolio", Some(manager.employee_id)))
            .await
            .unwrap();

        let err = store.delete_employee(manager.employee_id).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(store.employee_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn options_are_ordered_by_last_name() {
        let store = MemoryStore::new();
        store.insert_employee(new_employee("Nancy", "Davolio", None)).await.unwrap();
        store.insert_employee(new_employee("Janet", "Leverling", None)).await.unwrap();
        store.insert_employee(new_employee("Steven", "Buchanan", None)).await.unwrap();

        let names: Vec<String> = store
            .employee_options()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["Steven Buchanan", "Nancy Davolio", "Janet Leverling"]);
    }

    #[tokio::test]
    async fn null_freight_never_meets_threshold() {
        let store = MemoryStore::new();
        store.insert_order(order(1, None, None)).unwrap();
        store.insert_order(order(2, None, Some(250.0))).unwrap();
        store.insert_order(order(3, None, Some(249.99))).unwrap();

        let ids: Vec<i32> = store
            .orders_with_min_freight(250.0)
            .await
            .unwrap()
            .iter()
            .map(|l| l.order.order_id)
            .collect();
        assert_eq!(ids, vec![2]);
    }
}
