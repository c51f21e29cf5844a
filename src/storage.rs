use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::ErrorKind;

/// Handle on the served directory tree. Every request path is resolved through
/// [`Storage::resolve`] before any filesystem call touches it.
#[derive(Clone, Debug)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Maps a decoded request path onto the tree, confining it to the root.
    ///
    /// Leading separators are stripped and the remainder is normalized
    /// lexically: `.` is dropped and `..` pops the path built so far. Popping
    /// past the top would land outside the root, so that fails with
    /// `Forbidden`, as do absolute and prefixed components. The empty path
    /// resolves to the root itself. Existence is not checked here.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let trimmed = relative.trim_start_matches(['/', '\\']);
        let mut normalized = PathBuf::new();
        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(segment) => normalized.push(segment),
                Component::CurDir => continue,
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(StorageError::Forbidden);
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(StorageError::Forbidden);
                }
            }
        }

        Ok(self.root.join(normalized))
    }

    /// Names of the immediate entries of `target`, sorted for stable output.
    pub async fn list_dir(&self, target: &Path) -> io::Result<Vec<String>> {
        let mut dir = fs::read_dir(target).await?;
        let mut names = Vec::new();

        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().to_string());
        }

        names.sort();
        Ok(names)
    }

    /// Removes the entry at `relative`, treating an already-missing entry as
    /// success. Directories are removed non-recursively; a non-empty directory
    /// surfaces the io error.
    pub async fn delete_path(&self, relative: &str) -> Result<(), StorageError> {
        let target = self.resolve(relative)?;
        let metadata = match fs::metadata(&target).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(StorageError::Io(err)),
        };
        if metadata.is_dir() {
            fs::remove_dir(&target).await?;
        } else {
            fs::remove_file(&target).await?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum StorageError {
    Forbidden,
    Io(io::Error),
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::{Storage, StorageError};
    use tempfile::tempdir;

    fn make_storage() -> (tempfile::TempDir, Storage) {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("root");
        std::fs::create_dir_all(&root).expect("create root");
        (temp, Storage::new(root))
    }

    #[test]
    fn resolve_empty_path_is_root() {
        let (_temp, storage) = make_storage();
        let resolved = storage.resolve("").expect("resolve");
        assert_eq!(resolved, storage.root_path());
    }

    #[test]
    fn resolve_strips_leading_separator() {
        let (_temp, storage) = make_storage();
        let resolved = storage.resolve("/notes/todo.txt").expect("resolve");
        assert_eq!(resolved, storage.root_path().join("notes/todo.txt"));
    }

    #[test]
    fn resolve_collapses_inner_parent_segments() {
        let (_temp, storage) = make_storage();
        let resolved = storage.resolve("a/../b.txt").expect("resolve");
        assert_eq!(resolved, storage.root_path().join("b.txt"));
    }

    #[test]
    fn resolve_rejects_escape_above_root() {
        let (_temp, storage) = make_storage();
        for attempt in ["../secret.txt", "a/../../secret.txt", "../../etc/passwd"] {
            let result = storage.resolve(attempt);
            assert!(
                matches!(result, Err(StorageError::Forbidden)),
                "{attempt} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn list_dir_returns_sorted_names() {
        let (_temp, storage) = make_storage();
        std::fs::write(storage.root_path().join("b"), b"").expect("write b");
        std::fs::write(storage.root_path().join("a.txt"), b"").expect("write a.txt");
        std::fs::create_dir(storage.root_path().join("c_dir")).expect("mkdir");

        let names = storage
            .list_dir(storage.root_path())
            .await
            .expect("list dir");
        assert_eq!(names, vec!["a.txt", "b", "c_dir"]);
    }

    #[tokio::test]
    async fn delete_path_missing_entry_is_ok() {
        let (_temp, storage) = make_storage();
        storage.delete_path("ghost.txt").await.expect("delete");
    }

    #[tokio::test]
    async fn delete_path_rejects_non_empty_directory() {
        let (_temp, storage) = make_storage();
        let dir = storage.root_path().join("full");
        std::fs::create_dir(&dir).expect("mkdir");
        std::fs::write(dir.join("keep.txt"), b"data").expect("write");

        let result = storage.delete_path("full").await;
        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(dir.exists());
    }
}
