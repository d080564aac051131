// coordinator.rs - Splits each generation across the worker pool and
// assembles the results into the next grid

use std::ops::Range;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{Error, Result};
use crate::events::Event;
use crate::grid::Grid;
use crate::worker::{spawn_workers, SliceJob, SliceResult};

/// Row ranges for one generation: `workers` contiguous chunks of
/// `height / workers` rows, the last one absorbing the remainder.
pub fn partition(height: usize, workers: usize) -> Vec<Range<usize>> {
    let chunk = height / workers;
    (0..workers)
        .map(|i| {
            let start = i * chunk;
            let end = if i == workers - 1 { height } else { start + chunk };
            start..end
        })
        .collect()
}

/// Latest completed generation, published for concurrent readers.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub turn  : usize,
    pub world : Arc<Grid>,
}

/// Owns the current grid and the worker pool for the whole run.
pub struct Coordinator {
    world     : Arc<Grid>,
    turn      : usize,
    threads   : usize,
    jobs      : mpsc::Sender<SliceJob>,
    results   : mpsc::Receiver<SliceResult>,
    workers   : Vec<JoinHandle<()>>,
    snapshots : watch::Sender<Snapshot>,
    events    : mpsc::Sender<Event>,
}

impl Coordinator {
    /// Start a pool of `threads` workers around the initial grid.
    pub fn new(world: Grid, threads: usize, events: mpsc::Sender<Event>) -> Self {
        let world = Arc::new(world);
        let (jobs, job_rx) = mpsc::channel(threads);
        let (result_tx, results) = mpsc::channel(threads);
        let workers = spawn_workers(threads, job_rx, result_tx);
        let (snapshots, _) = watch::channel(Snapshot { turn: 0, world: Arc::clone(&world) });

        Self { world, turn: 0, threads, jobs, results, workers, snapshots, events }
    }

    pub fn turn(&self) -> usize { self.turn }

    pub fn world(&self) -> &Arc<Grid> { &self.world }

    /// A receiver that always sees the latest completed generation.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Compute one generation. Returns once every slice has come back.
    pub async fn step(&mut self) -> Result<()> {
        let (width, height) = (self.world.width(), self.world.height());

        for rows in partition(height, self.threads) {
            let job = SliceJob { start_row: rows.start, end_row: rows.end, world: Arc::clone(&self.world) };
            self.jobs.send(job).await.map_err(|_| Error::ChannelClosed("job queue"))?;
        }

        // Barrier: placement is keyed by start_row, arrival order is irrelevant
        let mut next = Grid::new(width, height);
        for _ in 0..self.threads {
            let result = self.results.recv().await.ok_or(Error::ChannelClosed("worker results"))?;
            next.write_rows(result.start_row, &result.cells);
        }

        self.world = Arc::new(next);
        self.turn += 1;
        self.snapshots.send_replace(Snapshot { turn: self.turn, world: Arc::clone(&self.world) });
        debug!(turn = self.turn, "generation complete");

        // Ignore send errors - the observer may have gone away
        let _ = self.events.send(Event::TurnComplete { completed_turns: self.turn }).await;
        Ok(())
    }

    /// Run `turns` generations back to back.
    pub async fn run(&mut self, turns: usize) -> Result<()> {
        while self.turn < turns {
            self.step().await?;
        }
        Ok(())
    }

    /// Close the job queue, wait for every worker to exit and hand back the
    /// final grid.
    pub async fn shutdown(self) -> Result<Arc<Grid>> {
        let Self { world, jobs, workers, .. } = self;
        drop(jobs);
        for worker in workers {
            worker.await?;
        }
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn assert_covers(height: usize, workers: usize) {
        let ranges = partition(height, workers);
        assert_eq!(ranges.len(), workers, "height {height}, workers {workers}");
        let mut next = 0;
        for range in &ranges {
            assert_eq!(range.start, next, "gap or overlap at {next}");
            assert!(range.end >= range.start);
            next = range.end;
        }
        assert_eq!(next, height);
    }

    #[test]
    fn partition_covers_every_row_once() {
        for height in 1..=40 {
            for workers in 1..=height {
                assert_covers(height, workers);
            }
        }
    }

    #[test]
    fn remainder_goes_to_last_chunk() {
        assert_eq!(partition(10, 3), vec![0..3, 3..6, 6..10]);
        assert_eq!(partition(16, 4), vec![0..4, 4..8, 8..12, 12..16]);
    }

    #[test]
    fn more_workers_than_rows_leaves_empty_chunks() {
        assert_eq!(partition(2, 4), vec![0..0, 0..0, 0..0, 0..2]);
    }

    #[tokio::test]
    async fn step_advances_turn_and_snapshot() {
        let (events, mut rx) = mpsc::channel(8);
        let blinker = Grid::from_alive(5, 5, &[Cell::new(2, 1), Cell::new(2, 2), Cell::new(2, 3)]);
        let mut coordinator = Coordinator::new(blinker, 2, events);
        let snapshots = coordinator.subscribe();

        coordinator.step().await.unwrap();
        assert_eq!(coordinator.turn(), 1);
        assert_eq!(
            coordinator.world().alive_cells(),
            vec![Cell::new(1, 2), Cell::new(2, 2), Cell::new(3, 2)]
        );
        assert_eq!(snapshots.borrow().turn, 1);
        assert_eq!(rx.recv().await, Some(Event::TurnComplete { completed_turns: 1 }));

        let world = coordinator.shutdown().await.unwrap();
        assert_eq!(world.count_alive(), 3);
    }

    #[tokio::test]
    async fn assembly_ignores_result_arrival_order() {
        let mut world = Grid::new(16, 13);
        crate::patterns::apply_random_pattern(&mut world, 11);
        let world = Arc::new(world);

        let mut results = Vec::new();
        for rows in partition(13, 4) {
            let job = SliceJob { start_row: rows.start, end_row: rows.end, world: Arc::clone(&world) };
            results.push(crate::worker::process_slice(&job).await);
        }

        let assemble = |order: &[usize]| {
            let mut next = Grid::new(16, 13);
            for &i in order {
                next.write_rows(results[i].start_row, &results[i].cells);
            }
            next
        };
        let in_order = assemble(&[0, 1, 2, 3]);
        assert_eq!(assemble(&[3, 2, 1, 0]), in_order);
        assert_eq!(assemble(&[2, 0, 3, 1]), in_order);

        // And it matches a single slice covering the whole grid
        let whole = SliceJob { start_row: 0, end_row: 13, world: Arc::clone(&world) };
        assert_eq!(in_order.as_bytes(), crate::worker::process_slice(&whole).await.cells.as_slice());
    }

    #[tokio::test]
    async fn degenerate_chunks_still_complete() {
        let (events, _rx) = mpsc::channel(8);
        let block = Grid::from_alive(4, 2, &[Cell::new(0, 0), Cell::new(1, 0)]);
        let mut coordinator = Coordinator::new(block, 5, events);
        coordinator.run(3).await.unwrap();
        assert_eq!(coordinator.turn(), 3);
    }
}
