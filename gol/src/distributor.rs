// distributor.rs - Drives a whole run: input, turn loop, reporting, output

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::events::{Event, State};
use crate::grid::Grid;
use crate::io::IoHandle;
use crate::params::{EngineConfig, Params};
use crate::reporter::Reporter;

/// Runs one simulation from the initial image to the final one.
///
/// The distributor owns the event sender. Pass it the only sender so the
/// stream closes when the run ends.
pub struct Distributor {
    params : Params,
    config : EngineConfig,
    io     : IoHandle,
    events : mpsc::Sender<Event>,
}

impl Distributor {
    pub fn new(params: Params, io: IoHandle, events: mpsc::Sender<Event>) -> Self {
        Self { params, config: EngineConfig::default(), io, events }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    async fn publish(&self, event: Event) {
        // Ignore send errors - the observer may have gone away
        let _ = self.events.send(event).await;
    }

    /// Run every turn and return the final grid. The event stream is closed
    /// when this returns, whether or not the run succeeded.
    pub async fn run(self) -> Result<Grid> {
        let p = self.params;
        p.validate()?;

        self.publish(Event::StateChange { completed_turns: 0, new_state: State::Executing }).await;

        let cells = self.io.read_grid(&p.input_name(), p.image_width, p.image_height).await?;
        let world = Grid::from_cells(p.image_width, p.image_height, cells)?;
        info!(
            width = p.image_width,
            height = p.image_height,
            turns = p.turns,
            threads = p.threads,
            alive = world.count_alive(),
            "starting run"
        );

        let mut coordinator = Coordinator::new(world, p.threads, self.events.clone());
        let reporter = Reporter::spawn(self.config.report_interval, coordinator.subscribe(), self.events.clone());

        let outcome = coordinator.run(p.turns).await;
        reporter.stop().await?;
        outcome?;

        let world = coordinator.shutdown().await?;
        let output_name = p.output_name();
        self.io.write_grid(&output_name, p.image_width, p.image_height, world.as_bytes().to_vec()).await?;

        self.publish(Event::FinalTurnComplete { completed_turns: p.turns, alive: world.alive_cells() }).await;

        // Make sure the io task has finished any output before quitting
        let output = self.io.wait_idle().await;
        match &output {
            Ok(()) => {
                self.publish(Event::ImageOutputComplete { completed_turns: p.turns, filename: output_name }).await;
            }
            Err(e) => warn!("final image not written: {e}"),
        }

        self.publish(Event::StateChange { completed_turns: p.turns, new_state: State::Quitting }).await;
        info!(turns = p.turns, alive = world.count_alive(), "run complete");

        output?;
        // Dropping self closes the event stream
        Ok(Arc::unwrap_or_clone(world))
    }
}
