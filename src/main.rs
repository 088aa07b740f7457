use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};

use soundstage::audio_system::{
    EffectParams, HeadlessEngine, PlaybackManager, RodioEngine, SoundEngine,
};
use soundstage::config::AudioConfig;
use soundstage::logging;
use soundstage::AppResult;

const LOG_TARGET_STARTUP: &str = "soundstage::startup";

const USAGE: &str = "\
Usage:
  soundstage music [--headless] [--every SECS] <track>...
  soundstage sfx [--headless] <file> [count]";

enum Command {
    Music { tracks: Vec<String>, every: f32 },
    Sfx { file: String, count: u32 },
}

struct Args {
    command: Command,
    headless: bool,
}

fn parse_args(args: &[String]) -> AppResult<Args> {
    let mut headless = false;
    let mut every = 10.0;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--headless" => headless = true,
            "--every" => {
                let value = iter.next().context("--every needs a value")?;
                every = value
                    .parse::<f32>()
                    .with_context(|| format!("invalid --every value: {}", value))?;
                if !every.is_finite() || every <= 0.0 {
                    bail!("--every must be positive");
                }
            }
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("music") => {
            let tracks: Vec<String> = positional.collect();
            if tracks.is_empty() {
                bail!("no music tracks given\n{}", USAGE);
            }
            Command::Music { tracks, every }
        }
        Some("sfx") => {
            let file = positional
                .next()
                .with_context(|| format!("no effect file given\n{}", USAGE))?;
            let count = match positional.next() {
                Some(n) => n
                    .parse::<u32>()
                    .with_context(|| format!("invalid count: {}", n))?,
                None => 1,
            };
            Command::Sfx { file, count }
        }
        _ => bail!("{}", USAGE),
    };

    Ok(Args { command, headless })
}

/// Fixed-rate tick driver for a playback manager
struct TickLoop {
    period: Duration,
    last: Instant,
}

impl TickLoop {
    fn new(tick_hz: u32) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / f64::from(tick_hz.max(1))),
            last: Instant::now(),
        }
    }

    /// Tick `manager` for `seconds` of wall time
    fn run_for<E: SoundEngine>(&mut self, manager: &mut PlaybackManager<E>, seconds: f32) {
        let end = Instant::now() + Duration::from_secs_f32(seconds.max(0.0));
        while Instant::now() < end {
            self.tick(manager);
        }
    }

    /// Tick `manager` until `done` returns true
    fn run_until<E: SoundEngine>(
        &mut self,
        manager: &mut PlaybackManager<E>,
        mut done: impl FnMut(&PlaybackManager<E>) -> bool,
    ) {
        while !done(manager) {
            self.tick(manager);
        }
    }

    fn tick<E: SoundEngine>(&mut self, manager: &mut PlaybackManager<E>) {
        thread::sleep(self.period);
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        manager.update(elapsed);
    }
}

fn preload<E: SoundEngine>(manager: &mut PlaybackManager<E>, config: &AudioConfig) {
    for path in &config.effects {
        if let Err(e) = manager.load_effect(path) {
            tracing::warn!("Skipping effect {}: {}", path, e);
        }
    }
    for path in &config.music {
        if let Err(e) = manager.load_music(path) {
            tracing::warn!("Skipping music {}: {}", path, e);
        }
    }
}

fn run<E: SoundEngine>(engine: E, config: &AudioConfig, command: &Command) -> AppResult<()> {
    let mut manager = PlaybackManager::new(engine).context("Failed to set up channel groups")?;
    manager.apply_config(config);
    preload(&mut manager, config);

    let mut ticks = TickLoop::new(config.tick_hz);

    match command {
        Command::Music { tracks, every } => {
            for track in tracks {
                manager
                    .load_music(track)
                    .with_context(|| format!("Failed to load music {}", track))?;
            }
            for track in tracks {
                manager.play_music(track);
                ticks.run_for(&mut manager, *every);
            }
            manager.stop_music();
            ticks.run_until(&mut manager, |m| m.current_music().is_none());
        }
        Command::Sfx { file, count } => {
            manager
                .load_effect(file)
                .with_context(|| format!("Failed to load effect {}", file))?;
            let params = EffectParams::none().with_volume(0.8, 1.0).with_pitch(-2.0, 2.0);
            for _ in 0..*count {
                manager.play_effect(file, params);
                ticks.run_for(&mut manager, 0.5);
            }
            ticks.run_for(&mut manager, 2.0);
        }
    }

    tracing::info!("Playback finished");
    Ok(())
}

fn main() -> AppResult<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;

    let _guard = logging::initialize_tracing();
    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Starting soundstage v{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH
    );

    let config = AudioConfig::load().context("Failed to load configuration")?;

    if args.headless {
        let engine = HeadlessEngine::new().with_file_check();
        run(engine, &config, &args.command)
    } else {
        let engine = RodioEngine::new(config.max_channels).context("Failed to open audio output")?;
        run(engine, &config, &args.command)
    }
}
