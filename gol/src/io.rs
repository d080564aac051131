// io.rs - Image input/output collaborator running as its own task
//
// The distributor never touches storage directly. It sends commands to the
// io task, which handles them strictly in order, so a `CheckIdle` is only
// answered once every earlier output has been written.

use std::collections::HashMap;
use std::path::PathBuf;

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder, ImageFormat};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{Error, Result};

/// Where grid images come from and go to.
pub trait GridStore: Send + 'static {
    /// Row-major cells of the named image. The caller checks the length.
    fn load(&mut self, name: &str, width: usize, height: usize) -> Result<Vec<u8>>;

    fn save(&mut self, name: &str, width: usize, height: usize, cells: &[u8]) -> Result<()>;
}

/// Binary PGM (P5) files on disk: inputs from `images_dir`, outputs into
/// `out_dir`.
#[derive(Debug, Clone)]
pub struct PgmStore {
    pub images_dir : PathBuf,
    pub out_dir    : PathBuf,
}

impl PgmStore {
    pub fn new(images_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self { images_dir: images_dir.into(), out_dir: out_dir.into() }
    }

    pub fn input_path(&self, name: &str) -> PathBuf {
        self.images_dir.join(format!("{name}.pgm"))
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.out_dir.join(format!("{name}.pgm"))
    }
}

fn dimension(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::pgm(format!("dimension {value} does not fit an image")))
}

impl GridStore for PgmStore {
    fn load(&mut self, name: &str, width: usize, height: usize) -> Result<Vec<u8>> {
        let path = self.input_path(name);
        let bytes = std::fs::read(&path)?;
        let graymap = image::load_from_memory_with_format(&bytes, ImageFormat::Pnm)?.to_luma8();
        let (w, h) = graymap.dimensions();
        if (w as usize, h as usize) != (width, height) {
            return Err(Error::pgm(format!(
                "{} is {w}x{h}, expected {width}x{height}",
                path.display()
            )));
        }
        Ok(graymap.into_raw())
    }

    fn save(&mut self, name: &str, width: usize, height: usize, cells: &[u8]) -> Result<()> {
        let (w, h) = (dimension(width)?, dimension(height)?);
        if Some(cells.len()) != width.checked_mul(height) {
            return Err(Error::pgm(format!("{} cells do not make a {width}x{height} image", cells.len())));
        }
        let mut bytes = Vec::with_capacity(cells.len() + 32);
        PnmEncoder::new(&mut bytes)
            .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
            .write_image(cells, w, h, ExtendedColorType::L8)?;

        std::fs::create_dir_all(&self.out_dir)?;
        std::fs::write(self.output_path(name), bytes)?;
        Ok(())
    }
}

/// Images held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, cells: Vec<u8>) {
        self.images.insert(name.into(), cells);
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.images.get(name).map(Vec::as_slice)
    }
}

impl GridStore for MemoryStore {
    fn load(&mut self, name: &str, _width: usize, _height: usize) -> Result<Vec<u8>> {
        self.images
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, format!("no image named {name}"))))
    }

    fn save(&mut self, name: &str, _width: usize, _height: usize, cells: &[u8]) -> Result<()> {
        self.images.insert(name.to_string(), cells.to_vec());
        Ok(())
    }
}

/// Commands understood by the io task.
#[derive(Debug)]
pub enum IoCommand {
    Input  { name: String, width: usize, height: usize, reply: oneshot::Sender<Result<Vec<u8>>> },
    Output { name: String, width: usize, height: usize, cells: Vec<u8> },
    /// Answered after all earlier commands, carrying the first output
    /// failure since the last check
    CheckIdle { reply: oneshot::Sender<Result<()>> },
}

/// Cheap, cloneable sender side of the io task.
#[derive(Debug, Clone)]
pub struct IoHandle {
    commands: mpsc::Sender<IoCommand>,
}

impl IoHandle {
    pub async fn read_grid(&self, name: &str, width: usize, height: usize) -> Result<Vec<u8>> {
        let (reply, rx) = oneshot::channel();
        self.send(IoCommand::Input { name: name.to_string(), width, height, reply }).await?;
        rx.await.map_err(|_| Error::ChannelClosed("io input reply"))?
    }

    /// Queue an image for writing. Completion is observed via `wait_idle`.
    pub async fn write_grid(&self, name: &str, width: usize, height: usize, cells: Vec<u8>) -> Result<()> {
        self.send(IoCommand::Output { name: name.to_string(), width, height, cells }).await
    }

    /// Block until every queued output has been handled.
    pub async fn wait_idle(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(IoCommand::CheckIdle { reply }).await?;
        rx.await.map_err(|_| Error::ChannelClosed("io idle reply"))?
    }

    async fn send(&self, command: IoCommand) -> Result<()> {
        self.commands.send(command).await.map_err(|_| Error::ChannelClosed("io commands"))
    }
}

/// Start the io task on its own blocking thread. It runs until every
/// `IoHandle` is dropped and then hands the store back through its join
/// handle.
pub fn spawn_io<S: GridStore>(store: S) -> (IoHandle, JoinHandle<S>) {
    let (commands, rx) = mpsc::channel(16);
    (IoHandle { commands }, tokio::task::spawn_blocking(move || run_io(store, rx)))
}

fn run_io<S: GridStore>(mut store: S, mut commands: mpsc::Receiver<IoCommand>) -> S {
    let mut failure: Option<Error> = None;

    while let Some(command) = commands.blocking_recv() {
        match command {
            IoCommand::Input { name, width, height, reply } => {
                debug!(%name, width, height, "reading image");
                let _ = reply.send(store.load(&name, width, height));
            }
            IoCommand::Output { name, width, height, cells } => {
                match store.save(&name, width, height, &cells) {
                    Ok(()) => info!(%name, "image written"),
                    Err(e) => {
                        error!(%name, "failed to write image: {e}");
                        failure.get_or_insert(e);
                    }
                }
            }
            IoCommand::CheckIdle { reply } => {
                let _ = reply.send(failure.take().map_or(Ok(()), Err));
            }
        }
    }
    debug!("io task exiting");
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip_through_task() {
        let mut store = MemoryStore::new();
        store.insert("2x2", vec![255, 0, 0, 255]);
        let (io, task) = spawn_io(store);

        assert_eq!(io.read_grid("2x2", 2, 2).await.unwrap(), vec![255, 0, 0, 255]);
        io.write_grid("2x2x1", 2, 2, vec![0, 0, 255, 255]).await.unwrap();
        io.wait_idle().await.unwrap();

        drop(io);
        let store = task.await.unwrap();
        assert_eq!(store.get("2x2x1"), Some(&[0, 0, 255, 255][..]));
    }

    #[tokio::test]
    async fn missing_input_is_an_error() {
        let (io, _task) = spawn_io(MemoryStore::new());
        assert!(matches!(io.read_grid("8x8", 8, 8).await, Err(Error::Io(_))));
    }

    #[test]
    fn pgm_store_writes_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PgmStore::new(dir.path(), dir.path());
        store.save("3x1", 3, 1, &[255, 0, 255]).unwrap();
        assert_eq!(store.load("3x1", 3, 1).unwrap(), vec![255, 0, 255]);
        assert!(matches!(store.load("3x1", 1, 3), Err(Error::Pgm(_))));

        // Written as a binary graymap so other PGM tools can read it
        let written = std::fs::read(store.output_path("3x1")).unwrap();
        assert!(written.starts_with(b"P5"));
        assert!(written.ends_with(&[255, 0, 255]));

        assert!(matches!(store.save("2x2", 2, 2, &[0; 3]), Err(Error::Pgm(_))));
    }

    #[test]
    fn malformed_images_are_errors_not_panics() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PgmStore::new(dir.path(), dir.path());

        std::fs::write(store.input_path("huge"), b"P5\n18446744073709551615 2\n255\n\0\0").unwrap();
        assert!(store.load("huge", 2, 2).is_err());

        let mut truncated = b"P5\n4 4\n255\n".to_vec();
        truncated.extend_from_slice(&[0; 13]);
        std::fs::write(store.input_path("4x4"), truncated).unwrap();
        assert!(store.load("4x4", 4, 4).is_err());

        std::fs::write(store.input_path("junk"), b"not an image").unwrap();
        assert!(matches!(store.load("junk", 1, 1), Err(Error::Image(_))));
    }

    #[tokio::test]
    async fn write_failure_surfaces_on_idle_check() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the output directory should be
        let blocker = dir.path().join("out");
        std::fs::write(&blocker, b"").unwrap();
        let (io, _task) = spawn_io(PgmStore::new(dir.path(), &blocker));

        io.write_grid("1x1x0", 1, 1, vec![0]).await.unwrap();
        assert!(matches!(io.wait_idle().await, Err(Error::Io(_))));
        // The failure is reported once
        assert!(io.wait_idle().await.is_ok());
    }
}
