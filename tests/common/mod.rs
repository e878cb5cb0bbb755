use std::path::Path;
use std::sync::Arc;

use actix_web::{web, App};
use northwind_admin::db::{MemoryStore, NorthwindStore};
use northwind_admin::models::employee::{Employee, NewEmployee};
use northwind_admin::utils::photo::PhotoStore;
use tempfile::TempDir;

#[allow(dead_code)]
pub mod multipart;

pub const MAX_PHOTO_BYTES: usize = 64 * 1024;

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub photos: PhotoStore,
    _web_root: TempDir,
}

impl TestContext {
    pub fn new() -> TestContext {
        let web_root = tempfile::tempdir().expect("Failed to create web root");
        let photos = PhotoStore::new(web_root.path(), MAX_PHOTO_BYTES);

        TestContext {
            store: Arc::new(MemoryStore::new()),
            photos,
            _web_root: web_root,
        }
    }

    pub fn create_app(&self) -> actix_web::App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let store: Arc<dyn NorthwindStore> = self.store.clone();
        App::new()
            .app_data(web::Data::from(store))
            .app_data(web::Data::new(self.photos.clone()))
            .configure(northwind_admin::handlers::configure_routes)
    }

    /// File names currently in the photo directory, sorted.
    #[allow(dead_code)]
    pub fn stored_photos(&self) -> Vec<String> {
        list_files(self.photos.dir())
    }

    #[allow(dead_code)]
    pub async fn seed_employee(&self, first: &str, last: &str, reports_to: Option<i32>) -> Employee {
        self.store
            .insert_employee(NewEmployee {
                first_name: first.to_string(),
                last_name: last.to_string(),
                reports_to,
                ..Default::default()
            })
            .await
            .expect("Failed to seed employee")
    }
}

fn list_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
