// lib.rs - Parallel Game of Life generation engine
//
// A distributor reads the initial grid from the io task, runs every turn on
// a pool of slice workers while a reporter publishes alive-cell counts, then
// writes the final grid back and closes the event stream.

pub mod coordinator;
pub mod distributor;
pub mod error;
pub mod events;
pub mod grid;
pub mod io;
pub mod params;
pub mod patterns;
pub mod reporter;
pub mod rules;
pub mod worker;

pub use coordinator::{partition, Coordinator, Snapshot};
pub use distributor::Distributor;
pub use error::{Error, Result};
pub use events::{Event, State};
pub use grid::{Cell, Grid, TCell, ALIVE, DEAD};
pub use io::{spawn_io, GridStore, IoHandle, MemoryStore, PgmStore};
pub use params::{EngineConfig, Params};

use tokio::sync::mpsc;

/// Run a full simulation against `store`, returning the final grid and the
/// store with the final image in it.
pub async fn run<S: GridStore>(
    params : Params,
    config : EngineConfig,
    store  : S,
    events : mpsc::Sender<Event>,
) -> Result<(Grid, S)> {
    let (io, io_task) = spawn_io(store);
    let result = Distributor::new(params, io, events).with_config(config).run().await;
    // The distributor dropped its handle, so the io task is winding down
    let store = io_task.await?;
    Ok((result?, store))
}
