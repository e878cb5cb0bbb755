use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Display name used when an employee reports to nobody, or to a manager
/// that no longer exists.
pub const NO_MANAGER: &str = "No one";

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Employee {
    pub employee_id: i32,
    pub last_name: String,
    pub first_name: String,
    pub title: Option<String>,
    pub title_of_courtesy: Option<String>,
    pub birth_date: Option<NaiveDateTime>,
    pub hire_date: Option<NaiveDateTime>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub home_phone: Option<String>,
    pub extension: Option<String>,
    pub notes: Option<String>,
    pub reports_to: Option<i32>,
    pub photo_path: Option<String>,
}

impl Employee {
    pub fn summary(&self) -> EmployeeSummary {
        EmployeeSummary {
            employee_id: self.employee_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EmployeeSummary {
    pub employee_id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl EmployeeSummary {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An employee joined to the person they report to.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmployeeWithManager {
    #[serde(flatten)]
    pub employee: Employee,
    pub reports_to_navigation: Option<EmployeeSummary>,
}

/// Select-list entry for pickers (manager on create, employee on the order filter).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EmployeeOption {
    pub id: i32,
    pub name: String,
}

impl From<&EmployeeSummary> for EmployeeOption {
    fn from(summary: &EmployeeSummary) -> Self {
        EmployeeOption {
            id: summary.employee_id,
            name: summary.display_name(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct EmployeeDetails {
    pub employee: Employee,
    pub reports_to_name: String,
}

impl EmployeeDetails {
    pub fn new(employee: Employee, manager: Option<&Employee>) -> Self {
        let reports_to_name = manager
            .map(|m| m.summary().display_name())
            .unwrap_or_else(|| NO_MANAGER.to_string());
        EmployeeDetails { employee, reports_to_name }
    }
}

#[derive(Deserialize, Validate, Debug, Clone, Default, PartialEq)]
pub struct NewEmployee {
    #[validate(length(min = 1, max = 20))]
    pub last_name: String,
    #[validate(length(min = 1, max = 10))]
    pub first_name: String,
    #[validate(length(max = 30))]
    pub title: Option<String>,
    #[validate(length(max = 25))]
    pub title_of_courtesy: Option<String>,
    pub birth_date: Option<NaiveDateTime>,
    pub hire_date: Option<NaiveDateTime>,
    #[validate(length(max = 60))]
    pub address: Option<String>,
    #[validate(length(max = 15))]
    pub city: Option<String>,
    #[validate(length(max = 15))]
    pub region: Option<String>,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
    #[validate(length(max = 15))]
    pub country: Option<String>,
    #[validate(length(max = 24))]
    pub home_phone: Option<String>,
    #[validate(length(max = 4))]
    pub extension: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    pub reports_to: Option<i32>,
    #[validate(length(max = 255))]
    pub photo_path: Option<String>,
}

impl NewEmployee {
    pub fn into_employee(self, employee_id: i32) -> Employee {
        Employee {
            employee_id,
            last_name: self.last_name,
            first_name: self.first_name,
            title: self.title,
            title_of_courtesy: self.title_of_courtesy,
            birth_date: self.birth_date,
            hire_date: self.hire_date,
            address: self.address,
            city: self.city,
            region: self.region,
            postal_code: self.postal_code,
            country: self.country,
            home_phone: self.home_phone,
            extension: self.extension,
            notes: self.notes,
            reports_to: self.reports_to,
            photo_path: self.photo_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(id: i32, first: &str, last: &str) -> Employee {
        NewEmployee {
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..Default::default()
        }
        .into_employee(id)
    }

    #[test]
    fn details_fall_back_to_no_one() {
        let details = EmployeeDetails::new(employee(1, "Nancy", "Davolio"), None);
        assert_eq!(details.reports_to_name, NO_MANAGER);
    }

    #[test]
    fn details_use_manager_full_name() {
        let manager = employee(2, "Andrew", "Fuller");
        let details = EmployeeDetails::new(employee(1, "Nancy", "Davolio"), Some(&manager));
        assert_eq!(details.reports_to_name, "Andrew Fuller");
    }

    #[test]
    fn validation_enforces_column_lengths() {
        let payload = NewEmployee {
            first_name: "Bartholomew".to_string(),
            last_name: "Smith".to_string(),
            extension: Some("12345".to_string()),
            ..Default::default()
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("extension"));
        assert!(!fields.contains_key("last_name"));
    }

    #[test]
    fn validation_requires_names() {
        let errors = NewEmployee::default().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("last_name"));
    }
}
