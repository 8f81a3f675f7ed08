use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use clapathon::config::Config;
use clapathon::engine::{Engine, FrameOutcome};
use clapathon::modes::Session;
use clapathon::events::Command;
use clapathon::os::{
    EnigoKeys, EnigoMedia, EnigoPointer, KeyCombo, LogStatus, LoggedVolume, ScreenGeometry,
    ScreenshotReporter,
};
use clapathon::profile::{ProfileBook, ProfileStore, YamlProfileStore, DEFAULT_PROFILE};
use clapathon::shortcuts::{AppAction, InputManager};
use clapathon::sinks::{DisplayGeometry, Dispatcher, Sinks};
use clapathon::source::ReplaySource;

#[derive(Parser, Debug)]
#[command(name = "clapathon", about = "Hand-gesture control from landmark streams")]
struct Cli {
    /// Config file.
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    /// Landmark recording to replay, overrides `source.replay`.
    #[arg(long)]
    replay: Option<PathBuf>,
}

struct GestureApp {
    config: Config,
    engine: Engine,
    store: YamlProfileStore,
    input_manager: InputManager,
}

impl GestureApp {
    fn new(cli: Cli) -> Result<Self> {
        info!(">> [Init] starting up");
        let mut config = Config::load(&cli.config)?;
        if cli.replay.is_some() {
            config.source.replay = cli.replay;
        }

        let store = YamlProfileStore::new(&config.profiles.path);
        let book = store.load()?;
        warn_unknown_keys(&book);
        let settings = config.gestures.session_settings();
        let session = match Session::new(book.clone(), &config.profiles.active, settings.clone()) {
            Ok(session) => session,
            Err(e) => {
                warn!(">> [Profile] {e}, falling back to '{DEFAULT_PROFILE}'");
                let mut book = book;
                book.entry(DEFAULT_PROFILE.to_string()).or_default();
                Session::new(book, DEFAULT_PROFILE, settings)?
            }
        };

        let replay = config
            .source
            .replay
            .clone()
            .context("no landmark source configured (set source.replay or --replay)")?;
        let source = ReplaySource::open(&replay, config.source.loop_replay)?;

        let geometry = ScreenGeometry::new(&config.display);
        let sinks = Sinks {
            pointer: Box::new(EnigoPointer::new(geometry.bounds(), &config.mouse)?),
            keys: Box::new(EnigoKeys::new()?),
            volume: Box::new(LoggedVolume::default()),
            screenshot: Box::new(ScreenshotReporter::new(&config.screenshots.dir)),
            media: Box::new(EnigoMedia::new()?),
            status: Box::new(LogStatus::default()),
        };
        let engine = Engine::new(
            session,
            Box::new(source),
            Box::new(geometry),
            Dispatcher::new(sinks),
            Instant::now(),
        );
        let input_manager = InputManager::new(&config.hotkeys);

        Ok(Self {
            config,
            engine,
            store,
            input_manager,
        })
    }

    fn run(&mut self) -> Result<()> {
        info!(
            ">> [Run] profile '{}', hotkeys: keyboard {:?}, mouse {:?}, exercise {:?}, quit {:?}",
            self.engine.session().profile_name(),
            self.config.hotkeys.toggle_keyboard,
            self.config.hotkeys.toggle_mouse,
            self.config.hotkeys.toggle_exercise,
            self.config.hotkeys.quit
        );
        let fps = self.config.performance.fps.max(1) as f64;
        let frame_duration = Duration::from_secs_f64(1.0 / fps);
        let mut stats_timer = Instant::now();

        loop {
            let start_time = Instant::now();

            // Hotkeys are only honored between frames.
            match self.input_manager.check_action() {
                AppAction::Quit => {
                    info!(">> [Run] quit requested");
                    break;
                }
                AppAction::Toggle(mode) => {
                    self.engine.toggle(mode);
                }
                AppAction::NextProfile => {
                    if let Err(e) = self.engine.cycle_profile() {
                        warn!(">> [Profile] {e}");
                    }
                }
                AppAction::None => {}
            }

            if self.engine.process_frame(start_time) == FrameOutcome::Finished {
                info!(">> [Run] landmark stream finished");
                break;
            }

            if stats_timer.elapsed() >= Duration::from_secs(1) {
                self.engine.log_stats(Instant::now());
                stats_timer = Instant::now();
            }

            let elapsed = start_time.elapsed();
            if frame_duration > elapsed {
                std::thread::sleep(frame_duration - elapsed);
            }
        }

        self.engine.log_stats(Instant::now());
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        self.store.save(self.engine.profiles())?;
        info!(">> [Exit] profiles saved to {}", self.store.path().display());
        Ok(())
    }
}

/// Shortcuts whose key name cannot be typed would fail on every firing.
fn warn_unknown_keys(book: &ProfileBook) {
    for (profile, settings) in book {
        for (count, command) in &settings.shortcuts {
            if let Command::Key(name) = command {
                if let Err(e) = KeyCombo::parse(name) {
                    warn!(">> [Profile] '{profile}' shortcut {count}: {e}");
                }
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clapathon=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut app = GestureApp::new(cli)?;
    let result = app.run();
    if let Err(e) = app.shutdown() {
        error!(">> [Exit] could not save profiles: {e:#}");
    }
    result
}
