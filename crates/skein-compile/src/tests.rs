//! Materializer and façade tests against an in-memory store.

use std::sync::{Arc, Mutex};

use skein_core::{
  Error, Message, Result, Role, Subject, ThreadUid, store::RecordStore,
};

use crate::{DialogError, DialogManager, Materializer};

// ─── In-memory store ─────────────────────────────────────────────────────────

/// Minimal `RecordStore` over a vector, with the same validation semantics
/// as the file backend.
#[derive(Clone, Default)]
struct MemStore {
  records: Arc<Mutex<Vec<Message>>>,
}

impl MemStore {
  /// Insert a record with no validation, for corruption tests.
  fn inject(&self, record: Message) {
    self.records.lock().unwrap().push(record);
  }
}

impl RecordStore for MemStore {
  async fn append(&self, message: Message) -> Result<Message> {
    message.validate()?;
    let mut records = self.records.lock().unwrap();
    if records.iter().any(|r| r.order == message.order && !r.is_archive()) {
      return Err(Error::DuplicateRecord {
        thread: message.thread_uid.clone(),
        order:  message.order,
        role:   message.role,
      });
    }
    records.push(message.clone());
    Ok(message)
  }

  async fn message_at(
    &self,
    thread: &ThreadUid,
    order: u64,
  ) -> Result<Message> {
    self
      .records
      .lock()
      .unwrap()
      .iter()
      .find(|r| r.order == order && !r.is_archive())
      .cloned()
      .ok_or_else(|| Error::not_found(Subject::Message, thread, order))
  }

  async fn archive_at(
    &self,
    thread: &ThreadUid,
    order: u64,
  ) -> Result<Message> {
    self
      .records
      .lock()
      .unwrap()
      .iter()
      .find(|r| r.is_archive() && r.order == order)
      .cloned()
      .ok_or_else(|| Error::not_found(Subject::Archive, thread, order))
  }

  async fn list_all(&self, _thread: &ThreadUid) -> Result<Vec<Message>> {
    Ok(self.records.lock().unwrap().clone())
  }

  async fn append_archive(&self, record: Message) -> Result<Message> {
    record.validate()?;
    let range = record.archive_range()?;
    let thread = record.thread_uid.clone();
    let mut records = self.records.lock().unwrap();

    for other in records.iter().filter(|r| r.is_archive()) {
      let owned = other.archive_range()?;
      if let Some(overlap) =
        range.clone().find(|p| owned.contains(p))
      {
        return Err(Error::ArchiveOverlap { thread, order: overlap });
      }
    }
    for position in range {
      if !records.iter().any(|r| r.order == position && !r.is_archive()) {
        return Err(Error::ArchiveTargetMissing { thread, order: position });
      }
    }

    records.push(record.clone());
    Ok(record)
  }

  async fn archiving_instruction(
    &self,
    thread: &ThreadUid,
  ) -> Result<Message> {
    Err(Error::not_found(Subject::Message, thread, 0))
  }
}

fn uid() -> ThreadUid { "t".into() }

async fn seeded(orders: &[u64]) -> Arc<MemStore> {
  let store = Arc::new(MemStore::default());
  for &order in orders {
    store
      .append(Message::raw(uid(), order, Role::User, format!("m{order}")))
      .await
      .unwrap();
  }
  store
}

fn orders_of(messages: &[Message]) -> Vec<u64> {
  messages.iter().map(|m| m.order).collect()
}

// ─── Materializer ────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_thread_compiles_to_empty_sequence() {
  let store = Arc::new(MemStore::default());
  let compiled =
    Materializer::default().compile(&store, &uid()).await.unwrap();
  assert!(compiled.is_empty());
  assert_eq!(compiled.frontier(), 1);
}

#[tokio::test]
async fn messages_compile_in_order() {
  let store = seeded(&[1, 2, 3, 4, 5]).await;
  let compiled =
    Materializer::default().compile(&store, &uid()).await.unwrap();
  assert_eq!(orders_of(&compiled.messages), vec![1, 2, 3, 4, 5]);
  assert_eq!(compiled.frontier(), 6);
}

#[tokio::test]
async fn archive_collapses_its_covered_range() {
  let store = seeded(&[1, 2, 3, 4, 5]).await;
  store
    .append_archive(Message::archive(uid(), "arc", vec![2, 3, 4]).unwrap())
    .await
    .unwrap();

  let compiled =
    Materializer::default().compile(&store, &uid()).await.unwrap();
  assert_eq!(orders_of(&compiled.messages), vec![1, 2, 5]);
  assert_eq!(compiled.messages[1].role, Role::Archive);
  // Positions strictly inside the range never appear individually.
  assert!(compiled.messages.iter().all(|m| m.order != 3 && m.order != 4));
  assert_eq!(compiled.frontier(), 6);
}

#[tokio::test]
async fn gap_terminates_at_frontier() {
  let store = seeded(&[1, 2, 4, 5]).await;
  let compiled =
    Materializer::default().compile(&store, &uid()).await.unwrap();
  // 4 and 5 exist but lie beyond the frontier at 3.
  assert_eq!(orders_of(&compiled.messages), vec![1, 2]);
  assert_eq!(compiled.frontier(), 3);
}

#[tokio::test]
async fn archive_jumps_over_missing_interior_positions() {
  // Raw record 3 was never written, but the archive covering [2,4] was
  // appended before it went missing; the jump must still clear the range.
  let store = seeded(&[1, 2, 4, 5]).await;
  store.inject(Message::archive(uid(), "arc", vec![2, 3, 4]).unwrap());

  // Zero lookahead stops probing at the absent interior position, forcing
  // the merge onto its synchronous re-fetch path past the jump.
  let materializer = Materializer::new(4).with_lookahead(0);
  let compiled = materializer.compile(&store, &uid()).await.unwrap();
  assert_eq!(orders_of(&compiled.messages), vec![1, 2, 5]);
}

#[tokio::test]
async fn archive_anchored_at_position_one() {
  let store = seeded(&[1, 2, 3]).await;
  store
    .append_archive(Message::archive(uid(), "arc", vec![1, 2, 3]).unwrap())
    .await
    .unwrap();

  let compiled =
    Materializer::default().compile(&store, &uid()).await.unwrap();
  assert_eq!(compiled.len(), 1);
  assert_eq!(compiled.messages[0].role, Role::Archive);
  assert_eq!(compiled.frontier(), 4);
}

#[tokio::test]
async fn identical_output_at_any_fan_out() {
  let store = seeded(&(1..=40).collect::<Vec<_>>()).await;
  store
    .append_archive(Message::archive(uid(), "a", vec![3, 4, 5]).unwrap())
    .await
    .unwrap();
  store
    .append_archive(
      Message::archive(uid(), "b", (10..=25).collect()).unwrap(),
    )
    .await
    .unwrap();

  let baseline = Materializer::new(1)
    .compile(&store, &uid())
    .await
    .unwrap();
  for materializer in [
    Materializer::new(30),
    Materializer::new(7).with_lookahead(0),
    Materializer::new(2).with_lookahead(3),
  ] {
    let compiled = materializer.compile(&store, &uid()).await.unwrap();
    assert_eq!(compiled, baseline);
  }
}

#[tokio::test]
async fn compilation_is_idempotent_without_writes() {
  let store = seeded(&[1, 2, 3]).await;
  store
    .append_archive(Message::archive(uid(), "arc", vec![2, 3]).unwrap())
    .await
    .unwrap();

  let materializer = Materializer::default();
  let first = materializer.compile(&store, &uid()).await.unwrap();
  let second = materializer.compile(&store, &uid()).await.unwrap();
  assert_eq!(first, second);
}

#[tokio::test]
async fn archive_without_valid_range_is_fatal() {
  let store = seeded(&[1]).await;
  // Corrupt record: archive role, no range. Append-time validation makes
  // this unreachable through the store API.
  store.inject(Message {
    thread_uid:  uid(),
    order:       2,
    role:        Role::Archive,
    text:        "broken".into(),
    archive_for: None,
  });
  store
    .append(Message::raw(uid(), 2, Role::User, "m2"))
    .await
    .unwrap();

  let err = Materializer::default()
    .compile(&store, &uid())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvariantViolation(_)));
}

// ─── Dialog façade ───────────────────────────────────────────────────────────

#[tokio::test]
async fn background_is_compiled_prefix_strictly_before_target() {
  let store = seeded(&[1, 2, 3, 4, 5]).await;
  store
    .append_archive(Message::archive(uid(), "arc", vec![2, 3, 4]).unwrap())
    .await
    .unwrap();
  let dialog = DialogManager::new(store);

  let background = dialog.compile_background(&uid(), 5).await.unwrap();
  assert_eq!(orders_of(&background), vec![1, 2]);
  assert_eq!(background[1].role, Role::Archive);

  let background = dialog.compile_background(&uid(), 2).await.unwrap();
  assert_eq!(orders_of(&background), vec![1]);
}

#[tokio::test]
async fn scene_extraction_bypasses_the_archive_index() {
  let store = seeded(&[1, 2, 3]).await;
  store
    .append_archive(Message::archive(uid(), "arc", vec![2, 3]).unwrap())
    .await
    .unwrap();
  let dialog = DialogManager::new(store);

  let scene = dialog.scene_messages(&uid(), &[2, 3]).await.unwrap();
  assert_eq!(orders_of(&scene), vec![2, 3]);
  assert!(scene.iter().all(|m| !m.is_archive()));
}

#[tokio::test]
async fn facade_translates_store_errors() {
  let store = seeded(&[1, 2]).await;
  let dialog = DialogManager::new(store);

  let err = dialog.message_at(&uid(), 9).await.unwrap_err();
  assert!(matches!(err, DialogError::MessageNotFound { order: 9, .. }));

  let err = dialog
    .append_archive(Message::archive(uid(), "arc", vec![2, 3]).unwrap())
    .await
    .unwrap_err();
  assert!(matches!(err, DialogError::ArchiveTargetMissing { order: 3, .. }));
}

#[tokio::test]
async fn listing_sorts_archives_after_their_anchor() {
  let store = seeded(&[1, 2, 3]).await;
  store
    .append_archive(Message::archive(uid(), "arc", vec![2, 3]).unwrap())
    .await
    .unwrap();
  let dialog = DialogManager::new(store);

  let all = dialog.messages(&uid()).await.unwrap();
  assert_eq!(orders_of(&all), vec![1, 2, 2, 3]);
  assert!(all[2].is_archive());
}
