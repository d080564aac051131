// reporter.rs - Timer-driven alive-cell reporting alongside the turn loop

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::coordinator::Snapshot;
use crate::error::Result;
use crate::events::Event;

/// Handle to a running reporter. Dropping it without calling `stop` also
/// ends the task, but only `stop` waits for it to finish.
pub struct Reporter {
    stop   : oneshot::Sender<()>,
    handle : JoinHandle<()>,
}

impl Reporter {
    /// Start reporting every `period`; the first report fires one period in.
    pub fn spawn(
        period    : Duration,
        snapshots : watch::Receiver<Snapshot>,
        events    : mpsc::Sender<Event>,
    ) -> Self {
        let (stop, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(report_loop(period, snapshots, events, stop_rx));
        Self { stop, handle }
    }

    /// Cancel the timer and wait until the task has exited. No event is sent
    /// after this returns.
    pub async fn stop(self) -> Result<()> {
        let _ = self.stop.send(());
        self.handle.await?;
        Ok(())
    }
}

async fn report_loop(
    period        : Duration,
    snapshots     : watch::Receiver<Snapshot>,
    events        : mpsc::Sender<Event>,
    mut stop      : oneshot::Receiver<()>,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {
                // Clone the Arc out so the count never holds up the coordinator
                let snapshot = snapshots.borrow().clone();
                let cells_count = snapshot.world.count_alive();
                trace!(turn = snapshot.turn, cells_count, "alive cells");
                let event = Event::AliveCellsCount { completed_turns: snapshot.turn, cells_count };
                if events.send(event).await.is_err() {
                    break;
                }
            }
        }
    }
    debug!("reporter stopped");
}
