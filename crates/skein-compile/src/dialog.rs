//! [`DialogManager`] — thin orchestration over the record store and the
//! materializer: listings, background extraction, scene extraction, and
//! error translation. No hard invariants of its own.

use std::sync::Arc;

use skein_core::{
  Message, ThreadUid, compiled::CompiledThread, store::RecordStore,
};

use crate::{error::Result, materialize::Materializer};

pub struct DialogManager<S> {
  store:        Arc<S>,
  materializer: Materializer,
}

impl<S> DialogManager<S>
where
  S: RecordStore + 'static,
{
  pub fn new(store: Arc<S>) -> Self {
    Self { store, materializer: Materializer::default() }
  }

  pub fn with_materializer(mut self, materializer: Materializer) -> Self {
    self.materializer = materializer;
    self
  }

  /// Every record in the thread, ordered by position with archives sorted
  /// after the raw message they anchor on.
  pub async fn messages(&self, thread: &ThreadUid) -> Result<Vec<Message>> {
    let mut records = self.store.list_all(thread).await?;
    records.sort_by_key(|r| (r.order, r.is_archive()));
    Ok(records)
  }

  pub async fn message_at(
    &self,
    thread: &ThreadUid,
    order: u64,
  ) -> Result<Message> {
    Ok(self.store.message_at(thread, order).await?)
  }

  /// The archive-aware compiled view of the whole thread.
  pub async fn compile_thread(
    &self,
    thread: &ThreadUid,
  ) -> Result<CompiledThread> {
    Ok(self.materializer.compile(&self.store, thread).await?)
  }

  /// The compiled-view prefix strictly before `before` — the background a
  /// summarizer sees when archiving a scene that starts at `before`.
  pub async fn compile_background(
    &self,
    thread: &ThreadUid,
    before: u64,
  ) -> Result<Vec<Message>> {
    let compiled = self.compile_thread(thread).await?;
    Ok(
      compiled
        .messages
        .into_iter()
        .take_while(|m| m.order < before)
        .collect(),
    )
  }

  /// Raw messages at an explicit position list, read directly from the
  /// record store. The archive index is bypassed on purpose: an
  /// in-progress scene is by definition unarchived.
  pub async fn scene_messages(
    &self,
    thread: &ThreadUid,
    orders: &[u64],
  ) -> Result<Vec<Message>> {
    let mut scene = Vec::with_capacity(orders.len());
    for &order in orders {
      scene.push(self.store.message_at(thread, order).await?);
    }
    Ok(scene)
  }

  pub async fn archiving_instruction(
    &self,
    thread: &ThreadUid,
  ) -> Result<Message> {
    Ok(self.store.archiving_instruction(thread).await?)
  }

  pub async fn append_archive(&self, record: Message) -> Result<Message> {
    Ok(self.store.append_archive(record).await?)
  }
}
