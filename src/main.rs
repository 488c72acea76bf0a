//! Drumpad CLI - play the drum kit from a terminal

use clap::{Parser, Subcommand};
use drumpad::app::{AppContext, PadApp};
use drumpad::audio::{AudioEngine, AudioSink, NullSink, RecordingSink};
use drumpad::beep_set::{self, DRUM_KIT};
use drumpad::bus::{events, BeepEvent};
use drumpad::controller::BeepSetController;
use drumpad::generate::generate_kit;
use drumpad::sample_loader::SampleBank;
use drumpad::settings::Settings;
use drumpad::DrumpadError;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "drumpad")]
#[command(about = "Terminal drum pad", long_about = None)]
struct Cli {
    /// Settings file (default: ./drumpad.toml, then the user config dir)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the pad (default)
    Play {
        /// Run without opening an audio device
        #[arg(long)]
        mute: bool,
    },

    /// Play sounds by name without the UI
    Trigger {
        /// Sound names, e.g. Kick Snare
        #[arg(required = true)]
        names: Vec<String>,

        /// Delay between sounds in milliseconds (default: 250)
        #[arg(short, long, default_value = "250")]
        interval: u64,

        /// Seconds to keep the device open after the last sound (default: 1.0)
        #[arg(long, default_value = "1.0")]
        hold: f32,

        /// Print what would play instead of playing it
        #[arg(long)]
        dry_run: bool,
    },

    /// List the kit and whether each sample loads
    List,

    /// Synthesize the kit's samples into the sounds directory
    Generate {
        /// Output directory (default: settings' sounds_dir)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective settings as TOML
    Config,
}

fn init_logging(verbose: u8, log_file: Option<&Path>) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let builder = tracing_subscriber::fmt().with_max_level(level);

    match log_file {
        // The pad owns the terminal, so logs go to a file
        Some(path) => match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
            Err(_) => builder.with_writer(std::io::sink).init(),
        },
        None => builder.with_writer(std::io::stderr).init(),
    }
}

fn open_sink(mute: bool, gain: f32) -> Rc<dyn AudioSink> {
    if mute {
        return Rc::new(NullSink);
    }
    match AudioEngine::new(gain) {
        Ok(engine) => {
            info!("Mixing to {} Hz", engine.sample_rate());
            Rc::new(engine)
        }
        Err(e) => {
            warn!("{}; continuing without sound", e);
            Rc::new(NullSink)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Play { mute: false });
    let settings = Settings::discover(cli.settings.as_deref())?;

    let log_file = match command {
        Commands::Play { .. } => Some(settings.log_file.clone()),
        _ => None,
    };
    init_logging(cli.verbose, log_file.as_deref());

    match command {
        Commands::Play { mute } => {
            let ctx = AppContext::new(settings);
            let sink = open_sink(mute, ctx.settings.gain);
            let mut app = PadApp::new(&ctx, sink)?;
            app.run()?;
        }

        Commands::Trigger {
            names,
            interval,
            hold,
            dry_run,
        } => {
            let ctx = AppContext::new(settings);
            let mut bank = ctx.sample_bank();
            let recorder = Rc::new(RecordingSink::new());
            let sink: Rc<dyn AudioSink> = if dry_run {
                recorder.clone()
            } else {
                open_sink(false, ctx.settings.gain)
            };
            let controller = BeepSetController::drums(Rc::clone(&ctx.bus), &mut bank, sink)?;

            for (i, name) in names.iter().enumerate() {
                if !controller.model().borrow().contains(name) {
                    eprintln!("{}", DrumpadError::UnknownSound(name.clone()));
                }
                ctx.bus.publish(events::BEEP, &BeepEvent::new(name.as_str()));

                if dry_run {
                    let model = controller.model();
                    let model = model.borrow();
                    for voice in recorder.started() {
                        if let Some((played, _)) = model.iter().find(|(_, b)| b.voice() == voice) {
                            println!("play {}", played);
                        }
                    }
                    recorder.clear();
                } else if i + 1 < names.len() {
                    std::thread::sleep(Duration::from_millis(interval));
                }
            }

            if !dry_run {
                std::thread::sleep(Duration::from_secs_f32(hold.max(0.0).min(3600.0)));
            }
        }

        Commands::List => {
            let mut bank = SampleBank::new(settings.sounds_dir.clone());
            let kit = beep_set::drums(&mut bank, Rc::new(NullSink));
            println!("Kit sounds under {}:", bank.root().display());
            for ((name, beep), (_, path)) in kit.iter().zip(DRUM_KIT) {
                match beep.duration_secs() {
                    Some(secs) => println!("  {:<12} {:<24} {:.2}s", name, path, secs),
                    None => println!("  {:<12} {:<24} missing", name, path),
                }
            }
        }

        Commands::Generate { out, force } => {
            let root = out.unwrap_or_else(|| settings.sounds_dir.clone());
            let written = generate_kit(DRUM_KIT, &root, force)?;
            for path in &written {
                println!("  Created: {}", path.display());
            }
            println!(
                "Generated {} of {} sounds in {}",
                written.len(),
                DRUM_KIT.len(),
                root.display()
            );
        }

        Commands::Config => {
            print!("{}", settings.to_toml()?);
        }
    }

    Ok(())
}
