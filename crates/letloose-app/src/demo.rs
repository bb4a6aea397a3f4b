//! Scripted in-memory scenario used by `letloose run`.

use anyhow::{Context, Result};
use letloose_core::{
    Controller, ControllerConfig, ControllerStatus, MemoryHost, PanelView, SimId, SimParams,
};
use letloose_storage::DocumentStore;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Inputs for one scripted run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub frames: usize,
    pub frame_ms: u64,
    pub seed: u64,
    pub config: ControllerConfig,
    pub state: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_ms: 16,
            seed: 0x1E7_1005E,
            config: ControllerConfig::default(),
            state: None,
        }
    }
}

/// What happened during a scripted run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub frames: usize,
    pub ticks: usize,
    pub status: ControllerStatus,
    pub tracked: Vec<SimId>,
    pub removed: Vec<SimId>,
    pub restored_records: usize,
    pub saved_records: Option<usize>,
    pub panel: Option<PanelView>,
}

/// Two managed hair simulations with seeded baselines, plus one object of another kind.
pub fn scripted_host(managed_kind: &str, rng: &mut SmallRng) -> (MemoryHost, [SimId; 2]) {
    let host = MemoryHost::new();
    let hair = |id: &str, label: &str, rng: &mut SmallRng| {
        let params = SimParams {
            use_painted_rigidity: rng.random_bool(0.5),
            drag: rng.random_range(0.02..0.4),
            gravity_multiplier: rng.random_range(0.85..1.15),
            main_rigidity: rng.random_range(0.005..0.15),
            tip_rigidity: rng.random_range(0.0..0.012),
            style_cling: rng.random_range(0.0..1.0),
            ..SimParams::default()
        };
        host.insert(id, label, managed_kind, params)
    };
    let first = hair("hair-front", "Front hair", rng);
    let second = hair("hair-back", "Back hair", rng);
    host.insert("cloth", "Skirt", "ClothItem", SimParams::default());
    (host, [first, second])
}

/// Tilt swept back and forth across the full range with a little seeded noise.
pub fn tilt_at(frame: usize, frames: usize, rng: &mut SmallRng) -> f32 {
    let period = (frames / 2).max(1) as f32;
    let phase = (frame as f32 % period) / period;
    let triangle = 1.0 - (2.0 * phase - 1.0).abs();
    let noise: f32 = rng.random_range(-2.0..2.0);
    (-90.0 + 180.0 * triangle + noise).clamp(-90.0, 90.0)
}

/// Drive a controller against the scripted host, deactivating the second
/// simulation halfway through, and persist the final document when a state path is given.
pub fn run_scripted(options: &RunOptions) -> Result<RunSummary> {
    let mut rng = SmallRng::seed_from_u64(options.seed);
    let (host, [_, second]) = scripted_host(&options.config.managed_kind, &mut rng);
    let store = options.state.as_ref().map(DocumentStore::open);

    let mut controller = Controller::new(host.clone(), options.config.clone())
        .context("controller config rejected")?;
    let mut restored_records = 0;
    if let Some(store) = &store {
        if let Some(document) = store
            .load()
            .with_context(|| format!("failed to load {}", store.path().display()))?
        {
            restored_records = document.records.len();
            controller.load_document(document);
        }
    }

    let dt = options.frame_ms as f32 / 1000.0;
    let mut ticks = 0;
    let mut removed = Vec::new();
    for frame in 0..options.frames {
        host.set_tilt(tilt_at(frame, options.frames, &mut rng));
        if frame == options.frames / 2 {
            info!(id = %second, frame, "deactivating simulation");
            host.set_active(&second, false);
        }
        let report = controller.update(dt);
        if let Some(ticked) = &report.ticked {
            ticks += 1;
            for id in &ticked.dropped {
                warn!(id = %id, frame, "simulation vanished mid-tick");
            }
        }
        if let Some(reconciled) = report.reconciled {
            removed.extend(reconciled.removed);
        }
        if let Some(applied) = report.document {
            debug!(
                applied = applied.applied.len(),
                skipped = applied.skipped.len(),
                "stored records applied"
            );
        }
    }

    let saved_records = match &store {
        Some(store) => {
            let document = controller.document();
            store
                .save(&document)
                .with_context(|| format!("failed to save {}", store.path().display()))?;
            Some(document.records.len())
        }
        None => None,
    };

    let summary = RunSummary {
        frames: options.frames,
        ticks,
        status: controller.status(),
        tracked: controller.registry().ids().cloned().collect(),
        removed,
        restored_records,
        saved_records,
        panel: controller.registry().panel(),
    };
    controller.disable();
    Ok(summary)
}
