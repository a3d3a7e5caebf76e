//! Headless tour: loads a row of panoramas, links neighbours and walks
//! through them by clicking each panorama's first link once it has loaded.
//!
//! ```text
//! panosphere [config.toml] <image>...
//! RUST_LOG=debug panosphere hall.jpg garden.jpg
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use panosphere::{
    Entity, ImageLoader, PanoramaConfig, PanoramaError, PanoramaEventKind, PanoramaSource,
    PanoramaWorld, Vec3, ViewerRequest,
};

const TICK: f32 = 1.0 / 60.0;
/// Spacing between neighbouring panoramas along X.
const SPACING: f32 = 50.0;
/// Seconds to linger in a loaded panorama before following its link.
const DWELL: f32 = 1.0;
/// Give up after this many seconds.
const TIMEOUT: f32 = 60.0;

fn main() -> ExitCode {
    env_logger::init();

    let mut args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let config = match args.first() {
        Some(path) if path.extension().is_some_and(|ext| ext == "toml") => {
            let path = args.remove(0);
            match PanoramaConfig::load(&path) {
                Ok(config) => config,
                Err(e) => {
                    log::error!("[tour] Could not read {:?}: {}", path, e);
                    return ExitCode::FAILURE;
                }
            }
        }
        _ => PanoramaConfig::default(),
    };

    if args.is_empty() {
        eprintln!("usage: panosphere [config.toml] <image>...");
        return ExitCode::FAILURE;
    }

    match run(&config, args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("[tour] {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &PanoramaConfig, images: Vec<PathBuf>) -> Result<(), PanoramaError> {
    let mut world = PanoramaWorld::new().with_loader(ImageLoader::new());

    let mut panoramas: Vec<Entity> = Vec::with_capacity(images.len());
    for (i, path) in images.into_iter().enumerate() {
        let pano = world.spawn_panorama(config, Some(PanoramaSource::Image(path)));
        world.set_position(pano, Vec3::new(i as f32 * SPACING, 0.0, 0.0))?;
        panoramas.push(pano);
    }
    for pair in panoramas.windows(2) {
        // A failed link is already logged; the tour just has one door fewer
        let _ = world.link(pair[0], pair[1]);
    }

    let mut current = panoramas[0];
    let mut visited = vec![current];
    let mut dwell: Option<f32> = None;
    let mut elapsed = 0.0;
    world.on_enter(current)?;

    while elapsed < TIMEOUT {
        world.update(TICK);
        elapsed += TICK;

        for event in world.drain_events() {
            log::info!("[tour] {}", event);
            match event.kind {
                PanoramaEventKind::Load if event.panorama == current => dwell = Some(0.0),
                PanoramaEventKind::EnterStart
                    if event.panorama == current && world.panorama(current)?.loaded() =>
                {
                    dwell = Some(0.0)
                }
                PanoramaEventKind::Error(_) if event.panorama == current => dwell = Some(0.0),
                PanoramaEventKind::ViewerRequest(ViewerRequest::SetPanorama(target)) => {
                    world.on_leave(current)?;
                    world.on_enter(target)?;
                    current = target;
                    visited.push(target);
                    dwell = None;
                }
                _ => {}
            }
        }

        if let Some(waited) = dwell.as_mut() {
            *waited += TICK;
            if *waited >= DWELL {
                dwell = None;
                let next = world
                    .panorama(current)?
                    .linked_spots()
                    .iter()
                    .copied()
                    .find(|&spot| {
                        world
                            .marker(spot)
                            .is_ok_and(|m| m.to_panorama.is_some_and(|to| !visited.contains(&to)))
                    });
                match next {
                    Some(spot) => {
                        world.click_marker(spot)?;
                    }
                    None => {
                        log::info!("[tour] Visited {} panoramas", visited.len());
                        return Ok(());
                    }
                }
            }
        }

        thread::sleep(Duration::from_secs_f32(TICK));
    }

    log::warn!("[tour] Timed out after {:.0}s", elapsed);
    Ok(())
}
