//! [`Materializer`] — range-aware forward-skipping resolution of a thread's
//! compiled view, with concurrent speculative lookahead.
//!
//! Phase 1 probes positions concurrently into a shared position→outcome
//! map; phase 2 is a deterministic single-threaded merge over that map.
//! Phase 2's output depends only on per-position content, never on phase-1
//! completion order, so any fan-out (including 1) produces identical
//! results — concurrency is purely a latency optimization.

use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
  },
};

use skein_core::{
  Error, Message, Result, ThreadUid, compiled::CompiledThread,
  store::RecordStore,
};
use tokio::task::JoinSet;

pub const DEFAULT_FAN_OUT: usize = 30;
pub const DEFAULT_LOOKAHEAD: u64 = 30;

// ─── Probe outcome ───────────────────────────────────────────────────────────

/// What one position resolved to.
#[derive(Debug, Clone)]
enum Probe {
  /// An archive record anchored here.
  Archive(Message),
  /// A raw message, no anchoring archive.
  Raw(Message),
  /// Neither — a candidate frontier.
  Absent,
}

async fn probe_position<S: RecordStore>(
  store: &S,
  thread: &ThreadUid,
  position: u64,
) -> Result<Probe> {
  match store.archive_at(thread, position).await {
    Ok(archive) => Ok(Probe::Archive(archive)),
    Err(e) if e.is_not_found() => {
      match store.message_at(thread, position).await {
        Ok(message) => Ok(Probe::Raw(message)),
        Err(e) if e.is_not_found() => Ok(Probe::Absent),
        Err(e) => Err(e),
      }
    }
    Err(e) => Err(e),
  }
}

// ─── Shared probe state ──────────────────────────────────────────────────────

/// State shared by phase-1 workers. Each worker owns exactly the keys it
/// claims (single-writer-per-key); the map lock is held only for the insert
/// itself, never across a store call.
struct ProbeSet {
  /// Next position to claim. Positions start at 1.
  next:    AtomicU64,
  /// Lowest position observed with neither a raw message nor an anchoring
  /// archive. `u64::MAX` until one is seen. Only a stop heuristic: the
  /// true frontier may lie beyond it when the absent position sits inside
  /// an archive's covered range.
  floor:   AtomicU64,
  results: Mutex<HashMap<u64, Probe>>,
}

impl ProbeSet {
  fn new() -> Self {
    Self {
      next:    AtomicU64::new(1),
      floor:   AtomicU64::new(u64::MAX),
      results: Mutex::new(HashMap::new()),
    }
  }

  fn record(&self, position: u64, probe: Probe) {
    if matches!(probe, Probe::Absent) {
      self.floor.fetch_min(position, Ordering::AcqRel);
    }
    self
      .results
      .lock()
      .expect("probe map poisoned")
      .insert(position, probe);
  }

  fn take(&self, position: u64) -> Option<Probe> {
    self
      .results
      .lock()
      .expect("probe map poisoned")
      .remove(&position)
  }
}

// ─── Materializer ────────────────────────────────────────────────────────────

/// Resolves the ordered, archive-aware view of a thread.
#[derive(Debug, Clone, Copy)]
pub struct Materializer {
  fan_out:   usize,
  lookahead: u64,
}

impl Default for Materializer {
  fn default() -> Self {
    Self { fan_out: DEFAULT_FAN_OUT, lookahead: DEFAULT_LOOKAHEAD }
  }
}

impl Materializer {
  pub fn new(fan_out: usize) -> Self {
    Self { fan_out: fan_out.max(1), ..Self::default() }
  }

  /// How far past the lowest observed absent position workers keep
  /// claiming. Positions skipped by the horizon are re-probed
  /// synchronously during the merge, so this only trades probe volume for
  /// merge latency.
  pub fn with_lookahead(mut self, lookahead: u64) -> Self {
    self.lookahead = lookahead;
    self
  }

  /// Produce the compiled view of `thread`.
  ///
  /// `NotFound` outcomes terminate the view at the frontier and are never
  /// surfaced as errors; [`Error::InvariantViolation`] (an archive selected
  /// at merge time without a valid range) is a hard failure.
  pub async fn compile<S>(
    &self,
    store: &Arc<S>,
    thread: &ThreadUid,
  ) -> Result<CompiledThread>
  where
    S: RecordStore + 'static,
  {
    let state = Arc::new(ProbeSet::new());
    self.probe_phase(store, thread, &state).await?;
    self.merge_phase(store, thread, &state).await
  }

  /// Phase 1 — bounded pool of workers sharing an atomic claim counter.
  /// Dropping the future aborts the `JoinSet`, abandoning in-flight probes
  /// with nothing held beyond them.
  async fn probe_phase<S>(
    &self,
    store: &Arc<S>,
    thread: &ThreadUid,
    state: &Arc<ProbeSet>,
  ) -> Result<()>
  where
    S: RecordStore + 'static,
  {
    let mut workers = JoinSet::new();
    for _ in 0..self.fan_out {
      let store = Arc::clone(store);
      let thread = thread.clone();
      let state = Arc::clone(state);
      let lookahead = self.lookahead;

      workers.spawn(async move {
        loop {
          let position = state.next.fetch_add(1, Ordering::Relaxed);
          let floor = state.floor.load(Ordering::Acquire);
          if position > floor.saturating_add(lookahead) {
            return Ok::<_, Error>(());
          }
          let probe = probe_position(store.as_ref(), &thread, position).await?;
          state.record(position, probe);
        }
      });
    }

    while let Some(joined) = workers.join_next().await {
      joined.map_err(|e| {
        Error::InvariantViolation(format!("probe worker failed: {e}"))
      })??;
    }

    tracing::debug!(
      thread = %thread,
      probed = state.results.lock().expect("probe map poisoned").len(),
      "probe phase complete"
    );
    Ok(())
  }

  /// Phase 2 — deterministic sequential merge. Positions the probe phase
  /// never claimed (beyond the lookahead horizon) are re-fetched
  /// synchronously, which cannot change the outcome.
  async fn merge_phase<S>(
    &self,
    store: &Arc<S>,
    thread: &ThreadUid,
    state: &ProbeSet,
  ) -> Result<CompiledThread>
  where
    S: RecordStore,
  {
    let mut messages = Vec::new();
    let mut position = 1u64;

    loop {
      let probe = match state.take(position) {
        Some(probe) => probe,
        None => probe_position(store.as_ref(), thread, position).await?,
      };

      match probe {
        Probe::Archive(archive) => {
          let range = archive.archive_range()?;
          if *range.start() != position {
            return Err(Error::InvariantViolation(format!(
              "archive anchored at {} resolved for position {position}",
              archive.order
            )));
          }
          position = *range.end() + 1;
          messages.push(archive);
        }
        Probe::Raw(message) => {
          messages.push(message);
          position += 1;
        }
        Probe::Absent => break,
      }
    }

    Ok(CompiledThread { thread_uid: thread.clone(), messages })
  }
}
