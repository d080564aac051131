// worker.rs - Long-lived slice workers fed from a shared job queue

use std::ops::Range;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::grid::{Grid, TCell};
use crate::rules::{alive_neighbours, next_state};

/// One worker's share of a generation: rows `[start_row, end_row)` of `world`.
#[derive(Debug, Clone)]
pub struct SliceJob {
    pub start_row : usize,
    pub end_row   : usize,
    pub world     : Arc<Grid>,
}

impl SliceJob {
    pub fn rows(&self) -> Range<usize> {
        self.start_row..self.end_row
    }
}

/// Next-state rows for `[start_row, start_row + cells.len() / width)`,
/// flattened row-major.
#[derive(Debug)]
pub struct SliceResult {
    pub start_row : usize,
    pub cells     : Vec<TCell>,
}

/// Shared end of the job queue; whichever idle worker locks it first takes
/// the next job.
pub type JobQueue = Arc<Mutex<mpsc::Receiver<SliceJob>>>;

/// Compute the next state of every cell in the job's rows.
pub async fn process_slice(job: &SliceJob) -> SliceResult {
    let world = &job.world;
    let width = world.width();
    let mut cells = Vec::with_capacity(job.rows().len() * width);
    for y in job.rows() {
        for x in 0..width {
            cells.push(next_state(world.get(x, y), alive_neighbours(world, x, y)));
        }
        tokio::task::yield_now().await;  // Cooperative yielding between rows
    }
    SliceResult { start_row: job.start_row, cells }
}

async fn run_worker(id: usize, jobs: JobQueue, results: mpsc::Sender<SliceResult>) {
    loop {
        // Lock only long enough to take one job
        let job = { jobs.lock().await.recv().await };
        let Some(job) = job else { break };

        trace!(worker = id, rows = ?job.rows(), "processing slice");
        let result = process_slice(&job).await;
        if results.send(result).await.is_err() {
            break;
        }
    }
    debug!(worker = id, "job queue closed, worker exiting");
}

/// Start `count` workers that live until the job sender is dropped.
pub fn spawn_workers(
    count   : usize,
    jobs    : mpsc::Receiver<SliceJob>,
    results : mpsc::Sender<SliceResult>,
) -> Vec<JoinHandle<()>> {
    let queue: JobQueue = Arc::new(Mutex::new(jobs));
    (0..count)
        .map(|id| tokio::spawn(run_worker(id, Arc::clone(&queue), results.clone())))
        .collect()
}
