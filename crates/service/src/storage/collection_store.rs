use std::{
    fmt,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Generic JSON file-backed collection of records.
///
/// The whole collection lives in one file holding a JSON array, read and
/// rewritten wholesale. Every mutating call runs its read/modify/write cycle
/// under this collection's lock, and files are replaced via a temp file and
/// rename, so readers never observe a half-written array.
///
/// Clones share the lock; open each collection once and hand out clones.
pub struct CollectionStore<T> {
    name: Arc<str>,
    file_path: PathBuf,
    lock: Arc<Mutex<()>>,
    _records: PhantomData<fn() -> T>,
}

impl<T> Clone for CollectionStore<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            file_path: self.file_path.clone(),
            lock: Arc::clone(&self.lock),
            _records: PhantomData,
        }
    }
}

impl<T> fmt::Debug for CollectionStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionStore")
            .field("name", &self.name)
            .field("file_path", &self.file_path)
            .finish()
    }
}

impl<T> CollectionStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Bind a collection name to its file. Touches nothing on disk.
    pub fn new<P: Into<PathBuf>>(name: &str, path: P) -> Self {
        Self {
            name: Arc::from(name),
            file_path: path.into(),
            lock: Arc::new(Mutex::new(())),
            _records: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Create the file as an empty array (and any missing parent directory) if absent.
    pub async fn ensure(&self) -> Result<(), ServiceError> {
        let _guard = self.lock.lock().await;
        if fs::try_exists(&self.file_path).await.unwrap_or(false) {
            return Ok(());
        }
        self.save_locked::<T>(&[]).await?;
        debug!(collection = %self.name, path = %self.file_path.display(), "collection created");
        Ok(())
    }

    /// All records in stored order. A missing, unreadable or malformed file
    /// reads as empty; the failure is logged, not returned.
    pub async fn read_all(&self) -> Vec<T> {
        match self.try_read_all().await {
            Ok(records) => records,
            Err(e) => {
                warn!(collection = %self.name, error = %e, "reading collection failed; treating as empty");
                Vec::new()
            }
        }
    }

    /// Like [`read_all`](Self::read_all) but surfaces malformed content as
    /// [`ServiceError::Corrupt`] and unreadable files as [`ServiceError::Io`].
    /// A missing file is still an empty collection.
    pub async fn try_read_all(&self) -> Result<Vec<T>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ServiceError::Io(format!("{}: {}", self.file_path.display(), e))),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Corrupt {
            collection: self.name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Add `record` at the end and persist.
    pub async fn append(&self, record: T) -> Result<(), ServiceError> {
        self.update(|records| {
            records.push(record);
            Ok(())
        })
        .await
    }

    /// Overwrite the collection with exactly `records`, in order.
    pub async fn write_all(&self, records: &[T]) -> Result<(), ServiceError> {
        let _guard = self.lock.lock().await;
        self.save_locked(records).await
    }

    /// Apply a mutation to the in-memory collection and persist it, all under
    /// the collection lock. Nothing is written when `f` fails.
    ///
    /// A corrupt file is reported instead of being silently replaced.
    pub async fn update<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        self.try_update(f).await
    }

    /// [`update`](Self::update) for callers with their own error type.
    pub async fn try_update<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, E>,
        E: From<ServiceError>,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.try_read_all().await?;
        let out = f(&mut records)?;
        self.save_locked(&records).await?;
        Ok(out)
    }

    async fn save_locked<R: Serialize>(&self, records: &[R]) -> Result<(), ServiceError> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ServiceError::Io(format!("{}: {}", parent.display(), e)))?;
            }
        }
        let data = serde_json::to_vec_pretty(records).map_err(|e| ServiceError::Serialize(e.to_string()))?;
        let tmp = temp_path(&self.file_path);
        fs::write(&tmp, data)
            .await
            .map_err(|e| ServiceError::Io(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.file_path)
            .await
            .map_err(|e| ServiceError::Io(format!("{}: {}", self.file_path.display(), e)))?;
        debug!(collection = %self.name, records = records.len(), "collection written");
        Ok(())
    }
}

/// Sibling temp file used for atomic replace, e.g. `posts.json.tmp`.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn tmp_file(label: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("sos_store_{}", uuid::Uuid::new_v4()))
            .join(format!("{label}.json"))
    }

    async fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = tokio::fs::remove_dir_all(dir).await;
        }
    }

    #[tokio::test]
    async fn ensure_creates_empty_collection_and_parent_dirs() -> Result<(), anyhow::Error> {
        let path = tmp_file("posts");
        let store = CollectionStore::<Value>::new("posts", &path);
        assert!(!path.exists());

        store.ensure().await?;
        assert!(path.exists());
        assert_eq!(store.read_all().await, Vec::<Value>::new());

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn ensure_never_truncates() -> Result<(), anyhow::Error> {
        let path = tmp_file("posts");
        let store = CollectionStore::<Value>::new("posts", &path);
        store.ensure().await?;
        store.append(json!({"id": "p1"})).await?;
        store.ensure().await?;
        store.ensure().await?;
        assert_eq!(store.read_all().await, vec![json!({"id": "p1"})]);

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn write_all_then_read_all_round_trips() -> Result<(), anyhow::Error> {
        let path = tmp_file("comments");
        let store = CollectionStore::<Value>::new("comments", &path);

        let records = vec![
            json!({"id": "c2", "text": "ótimo", "nested": {"a": [1, 2, null]}}),
            json!({"id": "c1", "flag": true, "n": 1.5}),
        ];
        store.write_all(&records).await?;
        assert_eq!(store.read_all().await, records);

        store.write_all(&[]).await?;
        assert!(store.read_all().await.is_empty());

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn append_grows_by_one_and_keeps_order() -> Result<(), anyhow::Error> {
        let path = tmp_file("tags");
        let store = CollectionStore::<Value>::new("tags", &path);
        store.write_all(&[json!({"n": 1}), json!({"n": 2})]).await?;

        store.append(json!({"n": 3})).await?;
        let all = store.read_all().await;
        assert_eq!(all, vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})]);

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_reads_as_empty_but_is_reported_by_try_read() -> Result<(), anyhow::Error> {
        let path = tmp_file("users");
        tokio::fs::create_dir_all(path.parent().unwrap()).await?;
        tokio::fs::write(&path, b"[{\"id\": \"u1\",").await?;
        let store = CollectionStore::<Value>::new("users", &path);

        assert!(store.read_all().await.is_empty());
        assert!(matches!(store.try_read_all().await, Err(ServiceError::Corrupt { .. })));

        // mutations refuse to overwrite what they could not read
        assert!(matches!(store.append(json!({"id": "u2"})).await, Err(ServiceError::Corrupt { .. })));
        let raw = tokio::fs::read_to_string(&path).await?;
        assert_eq!(raw, "[{\"id\": \"u1\",");

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn null_optional_fields_do_not_hide_the_collection() -> Result<(), anyhow::Error> {
        let path = tmp_file("users");
        tokio::fs::create_dir_all(path.parent().unwrap()).await?;
        tokio::fs::write(
            &path,
            br#"[{"id": "u1", "email": "a@b.com", "nickname": "ana", "profile_image": null, "is_admin": null},
                {"id": "u2", "email": "b@b.com", "nickname": null, "created_at": null}]"#,
        )
        .await?;
        let store = CollectionStore::<models::User>::new("users", &path);

        let users = store.try_read_all().await?;
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].profile_image, "");
        assert!(!users[0].is_admin);
        assert_eq!(store.read_all().await.len(), 2);

        store.append(models::User { id: "u3".into(), email: "c@b.com".into(), ..Default::default() }).await?;
        assert_eq!(store.try_read_all().await?.len(), 3);

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let store = CollectionStore::<Value>::new("ghost", tmp_file("ghost"));
        assert!(store.read_all().await.is_empty());
        assert!(store.try_read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_update_writes_nothing() -> Result<(), anyhow::Error> {
        let path = tmp_file("posts");
        let store = CollectionStore::<Value>::new("posts", &path);
        store.append(json!({"id": "p1"})).await?;

        let res: Result<(), ServiceError> = store
            .update(|records| {
                records.clear();
                Err(ServiceError::not_found("post"))
            })
            .await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        assert_eq!(store.read_all().await.len(), 1);

        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() -> Result<(), anyhow::Error> {
        let path = tmp_file("posts");
        let store = CollectionStore::<Value>::new("posts", &path);
        store.ensure().await?;

        let mut handles = Vec::new();
        for i in 0..20 {
            let s = store.clone();
            handles.push(tokio::spawn(async move { s.append(json!({"n": i})).await }));
        }
        for h in handles {
            h.await??;
        }
        assert_eq!(store.read_all().await.len(), 20);
        assert!(!temp_path(&path).exists());

        cleanup(&path).await;
        Ok(())
    }

    #[test]
    fn temp_path_is_a_sibling() {
        assert_eq!(temp_path(Path::new("/d/posts.json")), PathBuf::from("/d/posts.json.tmp"));
    }
}
