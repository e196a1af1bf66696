//! Segment cache: one synthesis per key, shared by every caller.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use narrator_core::{AudioArtifact, CacheKey, SynthesisError};
use tracing::{debug, trace};

type ArtifactResult = Result<Arc<AudioArtifact>, SynthesisError>;
type SharedArtifact = Shared<BoxFuture<'static, ArtifactResult>>;

enum Entry {
    /// Synthesis running. `id` tells this attempt apart from later retries
    /// for the same key.
    InFlight { id: u64, fut: SharedArtifact },
    Ready(Arc<AudioArtifact>),
}

/// Memoizes synthesized segments by [`CacheKey`].
///
/// The first request for a key starts the producer and parks its future in
/// the cache; concurrent requests for the same key await that same future.
/// Successful results are kept for the lifetime of the cache. Failed ones
/// are removed so the next request retries from scratch.
#[derive(Default)]
pub struct SegmentCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
    next_id: AtomicU64,
}

impl SegmentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the artifact for `key`, invoking `producer` only if no request
    /// for this key is cached or in flight.
    ///
    /// # Errors
    ///
    /// Returns the producer's error. Every caller waiting on the same attempt
    /// receives the same error.
    pub async fn get_or_create<F, Fut>(&self, key: &CacheKey, producer: F) -> ArtifactResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AudioArtifact, SynthesisError>> + Send + 'static,
    {
        let (id, fut) = {
            let mut entries = self.lock();
            match entries.get(key) {
                Some(Entry::Ready(artifact)) => {
                    trace!(key = %key.fingerprint(), "Segment cache hit");
                    return Ok(Arc::clone(artifact));
                }
                Some(Entry::InFlight { id, fut }) => {
                    trace!(key = %key.fingerprint(), "Joining in-flight synthesis");
                    (*id, fut.clone())
                }
                None => {
                    debug!(key = %key.fingerprint(), "Segment cache miss");
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let fut = producer().map(|res| res.map(Arc::new)).boxed().shared();
                    entries.insert(
                        key.clone(),
                        Entry::InFlight {
                            id,
                            fut: fut.clone(),
                        },
                    );
                    (id, fut)
                }
            }
        };

        let outcome = fut.await;
        self.settle(key, id, &outcome);
        outcome
    }

    /// Whether a finished artifact is stored for `key`.
    #[must_use]
    pub fn is_ready(&self, key: &CacheKey) -> bool {
        matches!(self.lock().get(key), Some(Entry::Ready(_)))
    }

    /// Whether anything, finished or in flight, is stored for `key`.
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Replace the in-flight placeholder of attempt `id` with its outcome.
    /// Whichever waiter gets here first does the work; the rest find the
    /// entry already settled.
    fn settle(&self, key: &CacheKey, id: u64, outcome: &ArtifactResult) {
        let mut entries = self.lock();
        let current = matches!(
            entries.get(key),
            Some(Entry::InFlight { id: current, .. }) if *current == id
        );
        if !current {
            return;
        }

        match outcome {
            Ok(artifact) => {
                entries.insert(key.clone(), Entry::Ready(Arc::clone(artifact)));
            }
            Err(e) => {
                entries.remove(key);
                debug!(key = %key.fingerprint(), error = %e, "Purged failed segment");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SegmentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentCache")
            .field("entries", &self.len())
            .finish()
    }
}
