//! Bounded resolution worker pool
//!
//! First-time lyric resolution runs off the submission path: jobs go
//! into a bounded queue serviced by a fixed number of workers, so a
//! burst of submissions cannot spawn unbounded tasks. Jobs are
//! fire-and-forget; a full queue drops the job with a warning and the
//! song is picked up again on the next submission or refresh.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, warn};

use super::pipeline::Pipeline;

/// One queued resolution job
#[derive(Debug, Clone, Copy)]
struct ResolveJob {
    song_id: i64,
}

/// Handle to the running worker pool
pub struct ResolvePool {
    tx: mpsc::Sender<ResolveJob>,
    in_flight: Arc<DashMap<i64, ()>>,
}

impl ResolvePool {
    /// Spawn `workers` tasks draining a queue of `queue_size` jobs
    pub fn start(pipeline: Arc<Pipeline>, workers: usize, queue_size: usize) -> Self {
        let (tx, rx) = mpsc::channel::<ResolveJob>(queue_size.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let in_flight: Arc<DashMap<i64, ()>> = Arc::new(DashMap::new());

        for worker in 0..workers.max(1) {
            let rx = rx.clone();
            let in_flight = in_flight.clone();
            let pipeline = pipeline.clone();

            tokio::spawn(async move {
                loop {
                    let job = rx.lock().await.recv().await;
                    let Some(job) = job else {
                        break;
                    };

                    debug!(worker, song_id = job.song_id, "resolving lyrics");
                    if let Err(e) = pipeline.run_resolution(job.song_id, false).await {
                        error!(song_id = job.song_id, error = %e, "lyric resolution failed");
                    }
                    in_flight.remove(&job.song_id);
                }
            });
        }

        Self { tx, in_flight }
    }

    /// Enqueue a resolution for a song. Duplicate jobs for a song
    /// already queued or running are collapsed.
    pub fn dispatch(&self, song_id: i64) {
        if self.in_flight.insert(song_id, ()).is_some() {
            debug!(song_id, "resolution already in flight");
            return;
        }

        if self.tx.try_send(ResolveJob { song_id }).is_err() {
            self.in_flight.remove(&song_id);
            warn!(song_id, "resolution queue full, dropping job");
        }
    }
}
