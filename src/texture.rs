//! Panorama textures and the asset-loading collaborator.
//!
//! The core never decodes anything itself. When a panorama needs its image
//! it asks the world's [`PanoramaLoader`] to start a request, and the world
//! polls the loader on every [`update`](crate::PanoramaWorld::update) for
//! [`LoadSignal`]s: zero or more progress reports, then exactly one terminal
//! `Loaded` or `Failed`.
//!
//! [`ImageLoader`] is the stock loader. It reads and decodes image files on a
//! worker thread and reports back over a channel.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use hecs::Entity;
use image::RgbaImage;

use crate::error::PanoramaError;

/// Size of each read while streaming an image file from disk.
const READ_CHUNK: usize = 64 * 1024;

/// A decoded panorama image, cheap to clone.
#[derive(Clone, Debug)]
pub struct Texture {
    image: Arc<RgbaImage>,
}

impl Texture {
    /// Wrap decoded RGBA pixels.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    /// Decode a texture from encoded image bytes (PNG, JPEG, ...).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PanoramaError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self::from_rgba(image))
    }

    /// Load and decode a texture from an image file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PanoramaError> {
        let image = image::open(path)?.to_rgba8();
        Ok(Self::from_rgba(image))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The RGBA pixels, row-major.
    pub fn pixels(&self) -> &RgbaImage {
        &self.image
    }
}

/// Where a panorama's image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanoramaSource {
    /// An image file on disk.
    Image(PathBuf),
}

/// Outcome reported by a loader for one panorama.
#[derive(Clone, Debug)]
pub enum LoadSignalKind {
    /// Fraction of the asset received so far, in `[0, 1]`.
    Progress(f32),
    /// Terminal success.
    Loaded(Texture),
    /// Terminal failure with a human-readable reason.
    Failed(String),
}

/// A loader report addressed to a panorama.
#[derive(Clone, Debug)]
pub struct LoadSignal {
    pub panorama: Entity,
    pub kind: LoadSignalKind,
}

/// The asset-loading collaborator.
///
/// `request` must not block. Results are collected through `poll`, which the
/// world calls once per update.
pub trait PanoramaLoader {
    /// Begin loading `source` for `panorama`.
    fn request(&mut self, panorama: Entity, source: &PanoramaSource);

    /// Drain every signal produced since the last poll.
    fn poll(&mut self) -> Vec<LoadSignal>;
}

/// Loads image files on background threads.
pub struct ImageLoader {
    tx: Sender<LoadSignal>,
    rx: Receiver<LoadSignal>,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }
}

impl PanoramaLoader for ImageLoader {
    fn request(&mut self, panorama: Entity, source: &PanoramaSource) {
        let PanoramaSource::Image(path) = source;
        let path = path.clone();
        let tx = self.tx.clone();

        thread::spawn(move || {
            log::debug!("[loader] Loading {:?} in background", path);
            let kind = match read_with_progress(&path, |fraction| {
                let _ = tx.send(LoadSignal {
                    panorama,
                    kind: LoadSignalKind::Progress(fraction),
                });
            })
            .and_then(|bytes| Texture::from_bytes(&bytes))
            {
                Ok(texture) => LoadSignalKind::Loaded(texture),
                Err(e) => {
                    log::warn!("[loader] Failed to load {:?}: {}", path, e);
                    LoadSignalKind::Failed(e.to_string())
                }
            };
            // The world may have been dropped; nobody is left to tell.
            let _ = tx.send(LoadSignal { panorama, kind });
        });
    }

    fn poll(&mut self) -> Vec<LoadSignal> {
        self.rx.try_iter().collect()
    }
}

/// Read a whole file, reporting the fraction read after every chunk.
fn read_with_progress(
    path: &Path,
    mut on_progress: impl FnMut(f32),
) -> Result<Vec<u8>, PanoramaError> {
    let mut file = File::open(path)?;
    let total = file.metadata()?.len();
    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        if total > 0 {
            on_progress((bytes.len() as f64 / total as f64).min(1.0) as f32);
        }
    }

    Ok(bytes)
}
