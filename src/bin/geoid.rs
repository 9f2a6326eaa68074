use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use geoid::capture::ImageFolderCamera;
use geoid::features::{BruteForceMatcher, FastBriefExtractor};
use geoid::io::{object_from_json, object_to_json};
use geoid::lifecycle::{AppEvent, ChannelEventSource};
use geoid::visualization::RerunPresenter;
use geoid::{CameraResolution, Engine, FeaturePipeline, TrackerConfig};

#[derive(Parser)]
#[command(version, about, author)]
struct GeoidCli {
    /// path to image folder, frames are read from <path>/**/cam<index>/**
    path: String,

    /// tracker config json
    #[arg(short, long)]
    config: Option<String>,

    /// camera index, overrides the config
    #[arg(long)]
    camera: Option<u32>,

    /// view size the host window reports
    #[arg(long, default_value = "1280x720")]
    view: CameraResolution,

    /// resolution list the camera advertises, e.g. "320x240,640x480,1280x720"
    #[arg(long)]
    supported: Option<String>,

    /// milliseconds after start at which a reference grab is requested
    #[arg(long, value_delimiter = ',', default_value = "1000")]
    grab_at: Vec<u64>,

    /// milliseconds until the host requests destruction
    #[arg(long, default_value_t = 10000)]
    duration: u64,

    /// save the recording to this .rrd file instead of spawning a viewer
    #[arg(long)]
    save: Option<String>,

    /// write the effective config to this json file
    #[arg(long)]
    dump_config: Option<String>,
}

/// Plays the part of the platform host: one window, focused for `duration_ms`.
fn script_host(tx: mpsc::Sender<AppEvent>, view: CameraResolution, grab_at: Vec<u64>, duration_ms: u64) {
    let mut schedule: Vec<(u64, AppEvent)> = vec![
        (0, AppEvent::WindowCreated { view }),
        (0, AppEvent::FocusGained),
    ];
    schedule.extend(
        grab_at
            .into_iter()
            .filter(|t| *t < duration_ms)
            .map(|t| (t, AppEvent::FeatureGrabRequest)),
    );
    schedule.extend([
        (duration_ms, AppEvent::FocusLost),
        (duration_ms, AppEvent::WindowDestroyed),
        (duration_ms, AppEvent::DestroyRequested),
    ]);
    schedule.sort_by_key(|(t, _)| *t);

    let mut now = 0;
    for (t, event) in schedule {
        thread::sleep(Duration::from_millis(t - now));
        now = t;
        if tx.send(event).is_err() {
            return;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = GeoidCli::parse();

    let mut config: TrackerConfig = match &cli.config {
        Some(path) => object_from_json(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(camera) = cli.camera {
        config.camera_index = camera;
    }
    if let Some(path) = &cli.dump_config {
        object_to_json(path, &config)?;
    }

    let mut camera = ImageFolderCamera::new(&cli.path).looping(true);
    if let Some(supported) = &cli.supported {
        camera = camera.with_supported_resolutions(supported.as_str());
    }

    let builder = rerun::RecordingStreamBuilder::new("geoid");
    let recording = match &cli.save {
        Some(path) => builder.save(path)?,
        None => builder.spawn()?,
    };
    let presenter = RerunPresenter::new(recording, format!("/cam{}", config.camera_index));

    let pipeline = FeaturePipeline::from_config(
        FastBriefExtractor::new(&config.features),
        BruteForceMatcher,
        &config,
    );
    let mut engine = Engine::new(camera, presenter, pipeline, config);

    let (tx, rx) = mpsc::channel();
    let view = cli.view;
    let grab_at = cli.grab_at.clone();
    let duration = cli.duration;
    let host = thread::spawn(move || script_host(tx, view, grab_at, duration));

    let summary = engine.run(&mut ChannelEventSource::new(rx));
    host.join().map_err(|_| "host thread panicked")?;
    println!(
        "presented {} frames in {} iterations, {} trainings, {} failed grabs",
        summary.frames_presented, summary.iterations, summary.trainings, summary.grab_failures
    );
    Ok(())
}
