use std::collections::HashMap;

use actix_multipart::Multipart;
use chrono::{NaiveDate, NaiveDateTime};
use futures_util::StreamExt;

use crate::errors::AppError;
use crate::models::employee::NewEmployee;
use crate::utils::photo::PhotoUpload;

/// Name of the multipart part carrying the employee photo.
pub const UPLOAD_FIELD: &str = "upload";

/// Upper bound on a single text part. The longest column (`notes`) is 500 chars.
pub const MAX_TEXT_FIELD_BYTES: usize = 8 * 1024;

#[derive(Debug, Default)]
pub struct EmployeeForm {
    pub fields: HashMap<String, String>,
    pub upload: Option<PhotoUpload>,
}

/// Drains a multipart body into text fields plus the optional photo part.
/// An empty file part counts as no upload.
pub async fn read_employee_form(mut payload: Multipart, max_photo_bytes: usize) -> Result<EmployeeForm, AppError> {
    let mut form = EmployeeForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let file_name = disposition.get_filename().map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if name == UPLOAD_FIELD {
                if bytes.len() + chunk.len() > max_photo_bytes {
                    return Err(AppError::BadRequest(format!(
                        "Photo exceeds the {} byte limit",
                        max_photo_bytes
                    )));
                }
            } else if bytes.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
                return Err(AppError::BadRequest(format!(
                    "Field {} exceeds the {} byte limit",
                    name, MAX_TEXT_FIELD_BYTES
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if name == UPLOAD_FIELD {
            if !bytes.is_empty() {
                form.upload = Some(PhotoUpload {
                    original_name: file_name.filter(|n| !n.is_empty()),
                    bytes,
                });
            }
        } else if !name.is_empty() {
            let value = String::from_utf8(bytes)
                .map_err(|_| AppError::BadRequest(format!("Field {} is not valid UTF-8", name)))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

impl EmployeeForm {
    /// Binds the text fields onto a `NewEmployee`. Blank fields bind as `None`;
    /// anything else is kept verbatim.
    pub fn to_new_employee(&self) -> Result<NewEmployee, AppError> {
        Ok(NewEmployee {
            last_name: self.required("last_name"),
            first_name: self.required("first_name"),
            title: self.optional("title"),
            title_of_courtesy: self.optional("title_of_courtesy"),
            birth_date: self.date("birth_date")?,
            hire_date: self.date("hire_date")?,
            address: self.optional("address"),
            city: self.optional("city"),
            region: self.optional("region"),
            postal_code: self.optional("postal_code"),
            country: self.optional("country"),
            home_phone: self.optional("home_phone"),
            extension: self.optional("extension"),
            notes: self.optional("notes"),
            reports_to: self.integer("reports_to")?,
            photo_path: None,
        })
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }

    // Left empty when missing; validation reports it.
    fn required(&self, key: &str) -> String {
        self.optional(key).unwrap_or_default()
    }

    fn integer(&self, key: &str) -> Result<Option<i32>, AppError> {
        self.optional(key)
            .map(|v| {
                v.trim()
                    .parse::<i32>()
                    .map_err(|_| AppError::BadRequest(format!("Field {} must be an integer", key)))
            })
            .transpose()
    }

    fn date(&self, key: &str) -> Result<Option<NaiveDateTime>, AppError> {
        self.optional(key)
            .map(|v| {
                parse_date(v.trim()).ok_or_else(|| {
                    AppError::BadRequest(format!("Field {} must be a date (YYYY-MM-DD)", key))
                })
            })
            .transpose()
    }
}

fn parse_date(value: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}
