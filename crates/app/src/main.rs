use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use jackbox_core::parts::{Cam, Sparty, ToyBox};
use jackbox_core::{
    AppConfig, AudioBackend, AudioEngine, MachineKind, MachineSystem, Recorder,
    RecordingSettings, Resources,
};
use tracing_subscriber::EnvFilter;

fn main() -> jackbox_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Machines => {
            list_machines();
            Ok(())
        }
        Commands::Run { frames, options } => run(frames, &options),
        Commands::Record {
            frames,
            output,
            options,
        } => record(frames, output, &options),
    }
}

fn list_machines() {
    for kind in MachineKind::ALL {
        println!("{}: {}", kind.number(), kind.description());
    }
}

fn run(frames: i64, options: &MachineOptions) -> jackbox_core::Result<()> {
    let mut system = options.build_system()?;
    tracing::info!(machine = system.machine_number(), frames, "running machine");

    system.set_frame(frames)?;
    report(&system);
    Ok(())
}

fn record(frames: i64, output: PathBuf, options: &MachineOptions) -> jackbox_core::Result<()> {
    let mut system = options.build_system()?;
    let mut recorder = Recorder::new(RecordingSettings {
        output_path: output,
        fps: system.frame_rate().round() as u32,
    });

    recorder.start()?;
    for frame in 0..=frames {
        system.set_frame(frame)?;
        recorder.capture(&system)?;
    }
    recorder.finish()?;
    report(&system);
    Ok(())
}

fn report(system: &MachineSystem) {
    let machine = system.machine();
    tracing::info!(
        frame = system.frame(),
        time = system.machine_time(),
        "machine settled"
    );
    for (id, cam) in machine.parts::<Cam>() {
        tracing::info!(%id, state = ?cam.state(), fired = cam.notifier().fired(), "cam");
    }
    for (id, toy_box) in machine.parts::<ToyBox>() {
        tracing::info!(%id, open = toy_box.is_open(), progress = toy_box.progress(), "box");
    }
    for (id, sparty) in machine.parts::<Sparty>() {
        tracing::info!(%id, sprung = sparty.is_sprung(), extension = sparty.extension(), "sparty");
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// Stands in for a sound device by logging every playback request.
struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&self, file: &Path) -> jackbox_core::Result<()> {
        tracing::info!(file = %file.display(), "play");
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless jack-in-the-box machine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the machines that can be built.
    Machines,
    /// Step a machine to a frame and report the state of its triggers.
    Run {
        /// Frame to step to.
        #[arg(short, long)]
        frames: i64,
        #[command(flatten)]
        options: MachineOptions,
    },
    /// Capture the draw commands of every frame up to `frames` as JSON.
    Record {
        #[arg(short, long)]
        frames: i64,
        /// Where to write the recording.
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        options: MachineOptions,
    },
}

#[derive(Args, Debug)]
struct MachineOptions {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Machine number, overriding the configuration.
    #[arg(short, long)]
    machine: Option<u32>,
    /// Frames per second, overriding the configuration.
    #[arg(short, long)]
    rate: Option<f64>,
    /// Resource directory, overriding the configuration.
    #[arg(long)]
    resources: Option<PathBuf>,
    /// Do not request any audio playback.
    #[arg(long)]
    mute: bool,
}

impl MachineOptions {
    fn config(&self) -> jackbox_core::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(number) = self.machine {
            config.machine.number = number;
        }
        if let Some(rate) = self.rate {
            config.machine.frame_rate = rate;
        }
        if let Some(root) = &self.resources {
            config.resources.root = root.clone();
        }
        config.machine.muted |= self.mute;
        Ok(config)
    }

    fn build_system(&self) -> jackbox_core::Result<MachineSystem> {
        let config = self.config()?;
        tracing::debug!(?config, "effective configuration");

        let mut system = MachineSystem::new(
            Resources::new(&config.resources.root),
            AudioEngine::new(LogBackend),
        )?;
        system.set_frame_rate(config.machine.frame_rate)?;
        system.choose_machine(config.machine.number)?;
        system.set_location(config.machine.location);
        system.set_muted(config.machine.muted);
        Ok(system)
    }
}
