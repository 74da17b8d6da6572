//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::naming::sanitize_path_component;

/// Get the folder for a creator's fanclub.
pub fn get_creator_folder(root: &Path, creator_name: &str) -> PathBuf {
    root.join(sanitize_path_component(creator_name))
}

/// Get the folder for a single post inside its creator's folder.
///
/// The post ID prefix keeps same-titled posts apart.
pub fn get_post_folder(creator_folder: &Path, post_id: &str, title: Option<&str>) -> PathBuf {
    let name = match title.map(str::trim) {
        Some(title) if !title.is_empty() => format!("{} - {}", post_id, title),
        _ => post_id.to_string(),
    };

    creator_folder.join(sanitize_path_component(&name))
}

/// Ensure a directory exists, creating it if necessary.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_creator_folder() {
        let path = get_creator_folder(Path::new("/downloads"), "Some: Creator");
        assert_eq!(path, PathBuf::from("/downloads/Some_ Creator"));
    }

    #[test]
    fn test_get_post_folder() {
        let creator = Path::new("/downloads/creator");
        assert_eq!(
            get_post_folder(creator, "123", Some("Hello/World")),
            PathBuf::from("/downloads/creator/123 - Hello_World")
        );
        assert_eq!(
            get_post_folder(creator, "123", Some("  ")),
            PathBuf::from("/downloads/creator/123")
        );
        assert_eq!(
            get_post_folder(creator, "123", None),
            PathBuf::from("/downloads/creator/123")
        );
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        // Existing directories are fine.
        ensure_dir(&nested).await.unwrap();
    }
}
