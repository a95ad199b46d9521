//! `scrollstage run`
//!
//! Drives a [`ScrollRouter`] the way a browser would: one scroll event and
//! one rendered frame per step, models arriving after their load delay,
//! and a simulated user who dismisses video modals after a while.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use scrollstage_core::{
    KeyframeTimeline, MemoryScene, MemoryTextures, PageConfig, RecordingOverlay, SceneManifest,
    ScrollRouter, Stage, Timeline, Viewport, scene::AssetManifest,
};

use crate::report::RunReport;

/// Sequence length used when neither a timeline nor a length is given
const DEFAULT_SEQUENCE_SECONDS: f64 = 30.0;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to page.toml (defaults to the built-in page)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scene manifest (JSON)
    #[arg(short, long)]
    pub scene: Option<PathBuf>,

    /// Timeline document (JSON)
    #[arg(short, long)]
    pub timeline: Option<PathBuf>,

    /// Sequence length in seconds (defaults to the timeline's length)
    #[arg(long)]
    pub sequence_length: Option<f64>,

    /// Scroll progress waypoints in [0, 1], visited in order from 0
    #[arg(long = "to", value_name = "PROGRESS", default_values_t = [1.0])]
    pub waypoints: Vec<f64>,

    /// Frames spent moving between two waypoints
    #[arg(long, default_value_t = 120)]
    pub frames: u32,

    /// Simulated frame rate
    #[arg(long, default_value_t = 60.0)]
    pub fps: f32,

    /// Viewport size as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720", value_parser = parse_viewport)]
    pub viewport: Viewport,

    /// Dismiss an open video after this many frames
    #[arg(long, default_value_t = 30)]
    pub close_videos_after: u32,

    /// Frames a texture takes to load
    #[arg(long, default_value_t = 2)]
    pub texture_latency: u32,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub report: Option<PathBuf>,
}

fn parse_viewport(s: &str) -> Result<Viewport, String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| format!("invalid viewport dimension '{v}'"))
    };
    Ok(Viewport::new(parse(w)?, parse(h)?))
}

/// Scroll progress for every frame of the path
///
/// Starts at 0 and moves linearly to each waypoint in `frames` steps.
pub fn scroll_path(waypoints: &[f64], frames: u32) -> Vec<f64> {
    let steps = frames.max(1);
    let mut path = Vec::with_capacity(waypoints.len() * steps as usize);
    let mut from = 0.0;
    for &to in waypoints {
        let to = to.clamp(0.0, 1.0);
        for i in 1..=steps {
            path.push(from + (to - from) * f64::from(i) / f64::from(steps));
        }
        from = to;
    }
    path
}

/// Models that have not finished loading yet
struct AssetLoader {
    pending: Vec<AssetManifest>,
    loaded: Vec<String>,
}

impl AssetLoader {
    fn new(assets: Vec<AssetManifest>) -> Self {
        Self {
            pending: assets,
            loaded: Vec::new(),
        }
    }

    /// Attach every asset whose delay has elapsed by `frame`
    fn poll(
        &mut self,
        frame: u64,
        scene: &mut MemoryScene,
        router: &mut ScrollRouter,
        overlay: &mut RecordingOverlay,
    ) {
        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|asset| u64::from(asset.delay_frames) <= frame);
        self.pending = rest;

        for asset in due {
            if asset.failed {
                router.report_asset_failure(&asset.name, overlay);
                continue;
            }
            scene.add_asset(&asset);
            tracing::info!(asset = %asset.name, frame, "model loaded");
            self.loaded.push(asset.name);
        }
    }
}

pub fn run(args: &RunArgs) -> Result<RunReport> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("fps must be positive (got {})", args.fps);
    }

    let page = match &args.config {
        Some(path) => PageConfig::load(path)
            .with_context(|| format!("Failed to load page config {}", path.display()))?,
        None => PageConfig::builtin().context("Built-in page config is invalid")?,
    };
    let manifest = match &args.scene {
        Some(path) => SceneManifest::load(path)
            .with_context(|| format!("Failed to load scene manifest {}", path.display()))?,
        None => SceneManifest::default(),
    };
    let mut timeline = match &args.timeline {
        Some(path) => KeyframeTimeline::load(path)
            .with_context(|| format!("Failed to load timeline {}", path.display()))?,
        None => KeyframeTimeline::empty(args.sequence_length.unwrap_or(DEFAULT_SEQUENCE_SECONDS)),
    };
    let sequence_length = args.sequence_length.unwrap_or_else(|| timeline.length());

    let mut router = ScrollRouter::new(&page, sequence_length, args.viewport)?;
    let mut scene = MemoryScene::new();
    let mut overlay = RecordingOverlay::new();
    let mut textures = MemoryTextures::new(args.texture_latency);
    let mut loader = AssetLoader::new(manifest.assets);
    router.on_resize(args.viewport.width, args.viewport.height, &mut scene);

    let path = scroll_path(&args.waypoints, args.frames);
    tracing::info!(
        frames = path.len(),
        sequence_length,
        page_height = router.page_height(),
        "replaying scroll path"
    );

    let dt = 1.0 / args.fps;
    let mut video_held = 0u32;
    for (frame, progress) in path.iter().enumerate() {
        loader.poll(frame as u64, &mut scene, &mut router, &mut overlay);
        router.on_scroll(progress * router.max_scroll(), &mut overlay);

        let mut stage = Stage {
            scene: &mut scene,
            overlay: &mut overlay,
            textures: &mut textures,
            timeline: &mut timeline,
        };
        router.frame(dt, &mut stage);

        let open: Vec<String> = router.open_videos().into_iter().map(String::from).collect();
        if open.is_empty() {
            video_held = 0;
            continue;
        }
        video_held += 1;
        if video_held >= args.close_videos_after {
            for id in &open {
                router.close_video(id, &mut overlay);
            }
            video_held = 0;
        }
    }

    for asset in &loader.pending {
        tracing::warn!(asset = %asset.name, "model still loading when the path ended");
    }

    Ok(RunReport::collect(
        &router,
        &scene,
        &timeline,
        &textures,
        loader.loaded,
        overlay.take_events(),
    ))
}
