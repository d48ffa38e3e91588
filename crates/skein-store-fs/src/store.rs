//! [`FsStore`] — the file-backed implementation of [`RecordStore`].

use std::{
  collections::HashMap,
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex as StdMutex, RwLock},
};

use skein_core::{
  Error, Message, Result, Role, Subject, ThreadUid, store::RecordStore,
};
use tokio::{fs, sync::Mutex as AsyncMutex};

use crate::{
  index::ArchiveIndex,
  naming::{INSTRUCTION_FILE, RecordName},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Skein record store backed by one directory per thread, one file per
/// record.
///
/// Cloning is cheap — all shared state is reference-counted.
#[derive(Clone)]
pub struct FsStore {
  root:  PathBuf,
  inner: Arc<Shared>,
}

struct Shared {
  /// Derived archive indexes, one per thread, swapped wholesale after every
  /// successful archive append. Guards are held only for map access, never
  /// across I/O.
  indexes:      RwLock<HashMap<ThreadUid, Arc<ArchiveIndex>>>,
  /// Per-thread append locks: appends are a read-validate-write-reindex
  /// sequence and must be serialized within a thread.
  append_locks: StdMutex<HashMap<ThreadUid, Arc<AsyncMutex<()>>>>,
}

impl FsStore {
  /// Open (or create) a store rooted at `root`.
  pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
    let root = root.as_ref().to_path_buf();
    fs::create_dir_all(&root).await.map_err(Error::storage)?;
    Ok(Self {
      root,
      inner: Arc::new(Shared {
        indexes:      RwLock::new(HashMap::new()),
        append_locks: StdMutex::new(HashMap::new()),
      }),
    })
  }

  fn thread_dir(&self, thread: &ThreadUid) -> PathBuf {
    self.root.join(thread.as_str())
  }

  fn append_lock(&self, thread: &ThreadUid) -> Arc<AsyncMutex<()>> {
    let mut locks = self
      .inner
      .append_locks
      .lock()
      .expect("append lock table poisoned");
    locks.entry(thread.clone()).or_default().clone()
  }

  /// Full unordered scan of the thread directory. `NotFound{thread}` when
  /// the directory does not exist.
  async fn scan(&self, thread: &ThreadUid) -> Result<Vec<Message>> {
    let dir = self.thread_dir(thread);
    let mut entries = match fs::read_dir(&dir).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(Error::not_found(Subject::Thread, thread, 0));
      }
      Err(e) => return Err(Error::storage(e)),
    };

    let mut records = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(Error::storage)?
    {
      let file_name = entry.file_name();
      let Some(name) = file_name.to_str().and_then(RecordName::parse) else {
        continue;
      };
      let text = fs::read_to_string(entry.path())
        .await
        .map_err(Error::storage)?;
      records.push(name.into_message(thread, text)?);
    }
    Ok(records)
  }

  /// The current archive index for `thread`, built lazily from a directory
  /// scan on first use.
  async fn thread_index(
    &self,
    thread: &ThreadUid,
  ) -> Result<Arc<ArchiveIndex>> {
    if let Some(index) = self
      .inner
      .indexes
      .read()
      .expect("index table poisoned")
      .get(thread)
      .cloned()
    {
      return Ok(index);
    }

    let records = match self.scan(thread).await {
      Ok(records) => records,
      Err(Error::NotFound { .. }) => Vec::new(),
      Err(e) => return Err(e),
    };
    let built = Arc::new(ArchiveIndex::build(&records)?);

    let mut indexes = self.inner.indexes.write().expect("index table poisoned");
    // Another reader may have built concurrently; both results are derived
    // from the same immutable record set.
    Ok(indexes.entry(thread.clone()).or_insert(built).clone())
  }

  /// Replace the thread's index. The swap is a single `Arc` store under a
  /// short write lock; in-flight readers keep their snapshot.
  fn swap_index(&self, thread: &ThreadUid, index: ArchiveIndex) {
    self
      .inner
      .indexes
      .write()
      .expect("index table poisoned")
      .insert(thread.clone(), Arc::new(index));
  }

  async fn write_record(&self, message: &Message) -> Result<()> {
    let dir = self.thread_dir(&message.thread_uid);
    fs::create_dir_all(&dir).await.map_err(Error::storage)?;
    let path = dir.join(RecordName::of(message)?.file_name());
    fs::write(&path, &message.text).await.map_err(Error::storage)
  }
}

// ─── RecordStore ─────────────────────────────────────────────────────────────

impl RecordStore for FsStore {
  async fn append(&self, message: Message) -> Result<Message> {
    message.validate()?;
    if message.is_archive() {
      return Err(Error::MalformedArchive(
        "archive records go through append_archive".into(),
      ));
    }

    let lock = self.append_lock(&message.thread_uid);
    let _guard = lock.lock().await;

    let occupied = match self.scan(&message.thread_uid).await {
      Ok(records) => records
        .iter()
        .any(|r| r.order == message.order && !r.is_archive()),
      Err(Error::NotFound { .. }) => false,
      Err(e) => return Err(e),
    };
    if occupied {
      return Err(Error::DuplicateRecord {
        thread: message.thread_uid.clone(),
        order:  message.order,
        role:   message.role,
      });
    }

    self.write_record(&message).await?;
    Ok(message)
  }

  async fn message_at(
    &self,
    thread: &ThreadUid,
    order: u64,
  ) -> Result<Message> {
    self
      .scan(thread)
      .await?
      .into_iter()
      .find(|r| r.order == order && !r.is_archive())
      .ok_or_else(|| Error::not_found(Subject::Message, thread, order))
  }

  async fn archive_at(
    &self,
    thread: &ThreadUid,
    order: u64,
  ) -> Result<Message> {
    let index = self.thread_index(thread).await?;
    index
      .anchored_at(order)
      .cloned()
      .ok_or_else(|| Error::not_found(Subject::Archive, thread, order))
  }

  async fn list_all(&self, thread: &ThreadUid) -> Result<Vec<Message>> {
    self.scan(thread).await
  }

  async fn append_archive(&self, record: Message) -> Result<Message> {
    record.validate()?;
    if !record.is_archive() {
      return Err(Error::MalformedArchive(format!(
        "append_archive called with a {} record",
        record.role
      )));
    }
    let range = record.archive_range()?;
    let thread = record.thread_uid.clone();

    let lock = self.append_lock(&thread);
    let _guard = lock.lock().await;

    let records = match self.scan(&thread).await {
      Ok(records) => records,
      Err(Error::NotFound { .. }) => Vec::new(),
      Err(e) => return Err(e),
    };
    let index = ArchiveIndex::build(&records)?;

    // Overlapping or nested archive chains are rejected outright; an index
    // hit is a conflict, not a resolution.
    if let Some(owned) = index.first_owned(range.clone()) {
      return Err(Error::ArchiveOverlap { thread, order: owned });
    }
    for position in range {
      let resolved = records
        .iter()
        .any(|r| r.order == position && !r.is_archive());
      if !resolved {
        return Err(Error::ArchiveTargetMissing { thread, order: position });
      }
    }

    // All validation passed; the single file write is the commit point.
    self.write_record(&record).await?;

    // Full rebuild from disk, then the atomic swap.
    let rebuilt = ArchiveIndex::build(&self.scan(&thread).await?)?;
    self.swap_index(&thread, rebuilt);
    tracing::debug!(
      thread = %thread,
      anchor = record.order,
      "archive appended, index rebuilt"
    );

    Ok(record)
  }

  async fn archiving_instruction(
    &self,
    thread: &ThreadUid,
  ) -> Result<Message> {
    let dir = self.thread_dir(thread);
    match fs::read_to_string(dir.join(INSTRUCTION_FILE)).await {
      Ok(text) => Ok(Message::raw(thread.clone(), 0, Role::System, text)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        let subject = if fs::try_exists(&dir).await.map_err(Error::storage)? {
          Subject::Message
        } else {
          Subject::Thread
        };
        Err(Error::not_found(subject, thread, 0))
      }
      Err(e) => Err(Error::storage(e)),
    }
  }
}
