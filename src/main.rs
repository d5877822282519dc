// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{crate_version, Parser, Subcommand};
use duration_string::DurationString;
use tokio::{fs, signal, time};
use tracing::{info, warn};

use sunrise::audio::{self, wav};
use sunrise::config::Settings;
use sunrise::controller::Controller;
use sunrise::events::{Event, EventBus};
use sunrise::samples::{ByteSource, FsByteSource};

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A step sequencer."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Renders one loop of the configured pattern to a WAV file.
    Render {
        /// The path to the sequencer config.
        config_path: String,
        /// Where to write the WAV file.
        output_path: String,
    },
    /// Plays the configured pattern in a loop.
    Play {
        /// The path to the sequencer config.
        config_path: String,
        /// Write whatever is being played to this WAV file. Without it nothing
        /// is played.
        #[arg[short, long]]
        output: Option<String>,
        /// How long to play for, e.g. 10s. Plays until interrupted if unset.
        #[arg[short, long]]
        duration: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            config_path,
            output_path,
        } => {
            let config_path = PathBuf::from(config_path);
            let settings = Settings::load(&config_path)?;
            let controller = Controller::new(
                &settings,
                audio::get_sink(None),
                EventBus::new(),
            )?;
            load_samples(&controller, &settings, &config_path).await?;

            let mixed = controller.render_loop();
            fs::write(&output_path, wav::wrap(&mixed)).await?;
            println!(
                "Rendered {} bytes of audio to {}.",
                mixed.len(),
                output_path
            );
        }
        Commands::Play {
            config_path,
            output,
            duration,
        } => {
            let duration = duration
                .map(|d| DurationString::from_string(d).map(Duration::from))
                .transpose()?;
            let config_path = PathBuf::from(config_path);
            let settings = Settings::load(&config_path)?;
            let sink = audio::get_sink(output.map(PathBuf::from));
            let bus = EventBus::new();

            let controller = Controller::new(&settings, sink, bus.clone())?;
            load_samples(&controller, &settings, &config_path).await?;
            let handle = controller.spawn();

            bus.send(Event::IsPlayingUpdated {
                is_playing: true,
                looping: false,
            });
            match duration {
                Some(duration) => {
                    tokio::select! {
                        _ = time::sleep(duration) => {}
                        result = signal::ctrl_c() => result?,
                    }
                }
                None => signal::ctrl_c().await?,
            }
            bus.send(Event::IsPlayingUpdated {
                is_playing: false,
                looping: false,
            });

            handle.shutdown().await?;
        }
    }

    Ok(())
}

/// Loads every track's sample from the configured sample directory, resolved
/// relative to the config file.
async fn load_samples(
    controller: &Controller,
    settings: &Settings,
    config_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let root = settings.samples_path(config_path.parent());
    info!(root = %root.display(), "Loading samples.");

    let source: Arc<dyn ByteSource> = Arc::new(FsByteSource::new(&root));
    let handles = controller.load_samples(source);
    for (track, handle) in controller.tracks().iter().zip(handles) {
        if handle.await?.is_empty() {
            warn!(track = track.name(), "Track has no audio and will be silent.");
        }
    }
    Ok(())
}
