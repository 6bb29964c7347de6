//! The fetch capability and the per-build worker.
//!
//! Retrieval of readings lives outside this crate; it is consumed as a
//! one-shot request/response capability. Each chart build gets one dedicated
//! worker thread that submits exactly one fetch, blocks on the reply channel
//! (no polling), and then runs the pipeline synchronously over the response.
//! A cancellation flag is checked before the blocking wait; there is no
//! retry.

use crate::chart::{AggregationPipeline, ChartDataset};
use crate::error::ChartError;
use crate::model::{Reading, ReadingType};
use chrono::NaiveDateTime;
use crossbeam_channel::{bounded, Sender};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// A request for one person's readings over an inclusive time range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Correlation id for logging
    pub request_id: Uuid,
    pub person_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Restrict the response to one reading type when set
    pub type_filter: Option<ReadingType>,
}

impl FetchRequest {
    pub fn new(
        person_id: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        type_filter: Option<ReadingType>,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            person_id: person_id.into(),
            start,
            end,
            type_filter,
        }
    }
}

/// The single reply to a [`FetchRequest`], readings in store order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse {
    pub request_id: Uuid,
    pub readings: Vec<Reading>,
}

/// The consumed retrieval capability.
///
/// Implementations must deliver exactly one [`FetchResponse`] on `reply_to`
/// per submitted request. The channel provides safe cross-thread delivery;
/// the store does not need its own queueing.
pub trait ReadingStore: Send + Sync {
    fn submit(&self, request: FetchRequest, reply_to: Sender<FetchResponse>);
}

/// In-memory [`ReadingStore`] for tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    readings_by_person: HashMap<String, Vec<Reading>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, person_id: impl Into<String>, reading: Reading) {
        self.readings_by_person
            .entry(person_id.into())
            .or_default()
            .push(reading);
    }

    pub fn insert_batch(&mut self, person_id: impl Into<String>, readings: Vec<Reading>) {
        self.readings_by_person
            .entry(person_id.into())
            .or_default()
            .extend(readings);
    }
}

impl ReadingStore for MemoryStore {
    fn submit(&self, request: FetchRequest, reply_to: Sender<FetchResponse>) {
        let readings = self
            .readings_by_person
            .get(&request.person_id)
            .map(|all| {
                all.iter()
                    .filter(|r| r.taken_at >= request.start && r.taken_at <= request.end)
                    .filter(|r| {
                        request
                            .type_filter
                            .map_or(true, |t| r.reading_type == t)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // The reply channel holds one slot; a dropped receiver just means
        // the build went away.
        let _ = reply_to.send(FetchResponse {
            request_id: request.request_id,
            readings,
        });
    }
}

/// One chart build running on its own dedicated thread.
pub struct ChartWorker {
    handle: JoinHandle<Result<ChartDataset, ChartError>>,
    cancel: Arc<AtomicBool>,
}

impl ChartWorker {
    /// Spawn the worker: one fetch, one blocking wait, one pipeline run.
    pub fn spawn(
        store: Arc<dyn ReadingStore>,
        request: FetchRequest,
        interval_minutes: i64,
        timeout: Duration,
    ) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle = thread::spawn(move || {
            run_build(store.as_ref(), request, interval_minutes, timeout, &flag)
        });
        Self { handle, cancel }
    }

    /// Request cancellation. Takes effect before the blocking wait; a build
    /// already past that point completes normally.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Wait for the build and return its dataset.
    pub fn join(self) -> Result<ChartDataset, ChartError> {
        self.handle.join().expect("chart build worker panicked")
    }
}

fn run_build(
    store: &dyn ReadingStore,
    request: FetchRequest,
    interval_minutes: i64,
    timeout: Duration,
    cancel: &AtomicBool,
) -> Result<ChartDataset, ChartError> {
    if cancel.load(Ordering::SeqCst) {
        return Err(ChartError::Cancelled);
    }

    let request_id = request.request_id;
    let (reply_to, response) = bounded(1);
    store.submit(request, reply_to);

    if cancel.load(Ordering::SeqCst) {
        debug!(%request_id, "build cancelled before awaiting fetch response");
        return Err(ChartError::Cancelled);
    }

    let response = response
        .recv_timeout(timeout)
        .map_err(|_| ChartError::FetchTimeout {
            timeout_secs: timeout.as_secs(),
        })?;
    if response.request_id != request_id {
        warn!(
            expected = %request_id,
            received = %response.request_id,
            "fetch response correlation id mismatch"
        );
    }
    debug!(%request_id, readings = response.readings.len(), "fetch response received");

    AggregationPipeline::new(interval_minutes).run(&response.readings)
}

/// Entry point for one chart build: fetch, bin, and aggregate.
pub fn build_chart(
    store: Arc<dyn ReadingStore>,
    person_id: impl Into<String>,
    start: NaiveDateTime,
    end: NaiveDateTime,
    type_filter: Option<ReadingType>,
    interval_minutes: i64,
    timeout: Duration,
) -> Result<ChartDataset, ChartError> {
    let request = FetchRequest::new(person_id, start, end, type_filter);
    ChartWorker::spawn(store, request, interval_minutes, timeout).join()
}
