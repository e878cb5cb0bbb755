use std::path::{Path, PathBuf};

use log::{info, warn};
use tokio::fs;
use uuid::Uuid;

use crate::errors::AppError;

/// Location of employee photos relative to the web root.
pub const PHOTO_SUBDIR: &str = "images/northwind_employees";

/// An uploaded photo as received from the form.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub original_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Writes and removes employee photos on the local file system.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl PhotoStore {
    pub fn new(web_root: impl AsRef<Path>, max_bytes: usize) -> Self {
        PhotoStore {
            dir: web_root.as_ref().join(PHOTO_SUBDIR),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Resolves a stored photo name to its path. Names that would escape the
    /// photo directory are rejected.
    pub fn path_for(&self, file_name: &str) -> Option<PathBuf> {
        let candidate = Path::new(file_name);
        match candidate.file_name() {
            Some(name) if name == candidate.as_os_str() => Some(self.dir.join(name)),
            _ => None,
        }
    }

    /// Stores the upload under a freshly generated name and returns that name.
    pub async fn save(&self, upload: &PhotoUpload) -> Result<String, AppError> {
        if upload.bytes.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "Photo exceeds the {} byte limit",
                self.max_bytes
            )));
        }

        let file_name = generate_file_name(upload.original_name.as_deref(), &upload.bytes);
        self.ensure_dir().await?;
        fs::write(self.dir.join(&file_name), &upload.bytes).await?;
        info!("Stored employee photo {}", file_name);
        Ok(file_name)
    }

    /// Removes the named photo if it exists. Returns whether a file was removed.
    pub async fn remove(&self, file_name: &str) -> Result<bool, AppError> {
        let Some(path) = self.path_for(file_name) else {
            warn!("Refusing to remove photo with unsafe name {:?}", file_name);
            return Ok(false);
        };
        if !fs::try_exists(&path).await? {
            return Ok(false);
        }
        fs::remove_file(&path).await?;
        info!("Removed employee photo {}", file_name);
        Ok(true)
    }

    /// Like `remove`, but a failure is only logged.
    pub async fn remove_best_effort(&self, file_name: &str) {
        if let Err(err) = self.remove(file_name).await {
            warn!("Could not remove employee photo {}: {}", file_name, err);
        }
    }
}

/// Longest uploaded extension carried over into a stored name.
pub const MAX_EXTENSION_LEN: usize = 16;

/// Random UUID name keeping the uploaded extension as-is, or one sniffed from
/// the content when the upload had none or it cannot be used in a path.
pub fn generate_file_name(original_name: Option<&str>, bytes: &[u8]) -> String {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| is_safe_extension(ext))
        .map(str::to_string)
        .or_else(|| infer::get(bytes).map(|kind| kind.extension().to_string()));

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty()
        && ext.chars().count() <= MAX_EXTENSION_LEN
        && !ext.chars().any(|c| c == '/' || c == '\\' || c == '.' || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn keeps_original_extension() {
        let name = generate_file_name(Some("portrait.JPG"), b"not really a jpeg");
        assert!(name.ends_with(".JPG"));
        assert!(Uuid::parse_str(name.trim_end_matches(".JPG")).is_ok());

        let name = generate_file_name(Some("scan.tar-gz_1"), b"plain text");
        assert!(name.ends_with(".tar-gz_1"));
    }

    #[test]
    fn overlong_extension_falls_back_to_sniffing() {
        let original = format!("a.{}", "x".repeat(300));
        let name = generate_file_name(Some(&original), &PNG_MAGIC);
        assert!(name.ends_with(".png"));
        assert!(name.len() <= 255);

        let name = generate_file_name(Some(&original), b"plain text");
        assert!(Uuid::parse_str(&name).is_ok());
    }

    #[test]
    fn unsafe_extension_is_dropped() {
        let name = generate_file_name(Some("evil.p\\ng"), b"plain text");
        assert!(Uuid::parse_str(&name).is_ok());
    }

    #[test]
    fn sniffs_extension_when_missing() {
        let name = generate_file_name(Some("portrait"), &PNG_MAGIC);
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn bare_uuid_when_nothing_is_known() {
        let name = generate_file_name(None, b"plain text");
        assert!(Uuid::parse_str(&name).is_ok());
    }

    #[test]
    fn names_are_unique() {
        let a = generate_file_name(Some("a.png"), &PNG_MAGIC);
        let b = generate_file_name(Some("a.png"), &PNG_MAGIC);
        assert_ne!(a, b);
    }

    #[test]
    fn path_for_rejects_traversal() {
        let store = PhotoStore::new("/srv/www", 1024);
        assert!(store.path_for("../secrets.txt").is_none());
        assert!(store.path_for("nested/file.png").is_none());
        assert_eq!(
            store.path_for("abc.png"),
            Some(PathBuf::from("/srv/www/images/northwind_employees/abc.png"))
        );
    }

    #[tokio::test]
    async fn save_then_remove() {
        let root = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(root.path(), 1024);
        let upload = PhotoUpload {
            original_name: Some("me.png".to_string()),
            bytes: PNG_MAGIC.to_vec(),
        };

        let name = store.save(&upload).await.unwrap();
        let path = store.path_for(&name).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC.to_vec());

        assert!(store.remove(&name).await.unwrap());
        assert!(!path.exists());
        assert!(!store.remove(&name).await.unwrap());
    }

    #[tokio::test]
    async fn rejects_oversized_upload() {
        let root = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(root.path(), 4);
        let upload = PhotoUpload {
            original_name: Some("big.png".to_string()),
            bytes: PNG_MAGIC.to_vec(),
        };

        let err = store.save(&upload).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(!store.dir().exists());
    }
}
