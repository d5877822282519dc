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
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, span, warn, Instrument, Level};

use crate::audio::{wav, Sink};
use crate::config::Settings;
use crate::events::{Event, EventBus, EventHandler, StepRef};
use crate::pcm::PcmBuffer;
use crate::samples::ByteSource;
use crate::scheduler::{mix_tracks, Scheduler, Timing};
use crate::track::{DrumTrack, InstrumentTrack, Track};

/// Owns the tracks and drives playback from bus events.
pub struct Controller {
    tracks: Vec<Box<dyn Track>>,
    scheduler: Scheduler,
    sink: Arc<dyn Sink>,
    bus: EventBus,
}

impl Controller {
    /// Creates the configured tracks and switches on the configured pattern.
    pub fn new(
        settings: &Settings,
        sink: Arc<dyn Sink>,
        bus: EventBus,
    ) -> Result<Controller, Box<dyn Error>> {
        let mut tracks: Vec<Box<dyn Track>> = Vec::new();
        for drum in settings.drums() {
            tracks.push(Box::new(DrumTrack::new(drum, settings.steps())));
        }
        for instrument in settings.instruments() {
            tracks.push(Box::new(InstrumentTrack::new(
                instrument.name(),
                instrument.base(),
                settings.notes(),
                settings.steps(),
            )?));
        }

        let mut controller = Controller {
            tracks,
            scheduler: Scheduler::new(Timing::from_settings(settings)),
            sink,
            bus,
        };

        for entry in settings.pattern() {
            let Some(track) = controller.track_mut(entry.track()) else {
                warn!(track = entry.track(), "Pattern refers to an unknown track");
                continue;
            };
            for index in entry.steps() {
                if let Err(e) = track.toggle(entry.note(), *index) {
                    warn!(
                        track = entry.track(),
                        note = entry.note(),
                        index,
                        err = %e,
                        "Skipping pattern step"
                    );
                }
            }
        }

        info!(
            tracks = controller.tracks.len(),
            sink = %controller.sink,
            "Controller created."
        );
        Ok(controller)
    }

    pub fn tracks(&self) -> &[Box<dyn Track>] {
        &self.tracks
    }

    pub fn track(&self, name: &str) -> Option<&dyn Track> {
        self.tracks
            .iter()
            .find(|track| track.name() == name)
            .map(|track| track.as_ref())
    }

    fn track_mut(&mut self, name: &str) -> Option<&mut Box<dyn Track>> {
        self.tracks.iter_mut().find(|track| track.name() == name)
    }

    /// Drops a track. Returns false if there was no such track.
    pub fn remove_track(&mut self, name: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|track| track.name() != name);
        let removed = self.tracks.len() != before;
        if removed {
            info!(track = name, "Removed track.");
        }
        removed
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Starts loading every track's sample in the background. Tracks render
    /// silence until their sample has loaded.
    pub fn load_samples(&self, source: Arc<dyn ByteSource>) -> Vec<JoinHandle<PcmBuffer>> {
        self.tracks
            .iter()
            .map(|track| {
                let store = track.store().clone();
                let source = source.clone();
                tokio::spawn(async move { store.load(source.as_ref()).await })
            })
            .collect()
    }

    /// Renders and mixes one loop of every track.
    pub fn render_loop(&self) -> PcmBuffer {
        mix_tracks(&self.tracks, self.scheduler.timing().step_len())
    }

    /// Moves the controller onto its own task, where it reacts to bus events
    /// until shut down.
    pub fn spawn(self) -> ControllerHandle {
        let events = self.bus.subscribe();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        ControllerHandle {
            shutdown: shutdown_tx,
            handle: tokio::spawn(
                self.run(events, shutdown_rx)
                    .instrument(span!(Level::INFO, "controller")),
            ),
        }
    }

    async fn run(
        mut self,
        mut events: tokio::sync::broadcast::Receiver<Event>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> Controller {
        info!("Controller started.");
        loop {
            let deadline = self.scheduler.deadline();
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Controller closing.");
                    break;
                }
                event = events.recv() => match event {
                    Ok(event) => {
                        debug!(event = ?event, "Received event.");
                        event.dispatch(&mut self);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Controller fell behind on events.");
                    }
                    Err(RecvError::Closed) => {
                        info!("Event bus closed.");
                        break;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.scheduler.repeat(&self.tracks, self.sink.as_ref());
                }
            }
        }

        self.scheduler.stop();
        self
    }
}

impl EventHandler for Controller {
    fn track_view_updated(&mut self, step: &StepRef) {
        let sink = self.sink.clone();
        let Some(track) = self.track_mut(&step.track) else {
            debug!(track = step.track, "Ignoring event for unknown track.");
            return;
        };

        let preview = match track.preview(step.note.as_deref()) {
            Ok(preview) => preview,
            Err(e) => {
                warn!(track = step.track, err = %e, "Unable to preview step");
                return;
            }
        };
        if let Err(e) = sink.play(&wav::wrap(&preview)) {
            error!(err = e.as_ref(), track = step.track, "Error playing preview");
        }

        let toggled = track.toggle(step.note.as_deref(), step.index);
        self.scheduler.mark_interrupted();

        match toggled {
            Ok(active) => {
                info!(
                    track = step.track,
                    note = step.note,
                    index = step.index,
                    active,
                    "Toggled step."
                );
                self.bus.send(Event::TrackModelUpdated {
                    step: step.clone(),
                    active,
                });
            }
            Err(e) => warn!(track = step.track, err = %e, "Unable to toggle step"),
        }
    }

    fn is_playing_updated(&mut self, is_playing: bool, looping: bool) {
        let sink = self.sink.clone();
        match (is_playing, looping) {
            (false, _) => self.scheduler.stop(),
            (true, true) => self.scheduler.repeat(&self.tracks, sink.as_ref()),
            (true, false) => self.scheduler.start(&self.tracks, sink.as_ref()),
        }
    }
}

/// A running controller.
pub struct ControllerHandle {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<Controller>,
}

impl ControllerHandle {
    /// Stops the controller and hands it back.
    pub async fn shutdown(self) -> Result<Controller, JoinError> {
        // The task may already have exited if the bus closed.
        let _ = self.shutdown.send(());
        self.handle.await
    }
}

#[cfg(test)]
mod test {
    use std::{error::Error, time::Duration};

    use tokio::time::sleep;

    use super::*;
    use crate::audio::mock::{self, Call};
    use crate::config::{Instrument, PatternEntry};
    use crate::samples::{MemoryByteSource, SampleId};
    use crate::scheduler::PlaybackState;
    use crate::testutil::{ramp_sample, wav_bytes};

    fn settings() -> Settings {
        Settings::default()
            .with_tracks(&["kick", "snare"], vec![Instrument::new("organ", "c4")])
            .with_pattern(vec![
                PatternEntry::new("kick", None, &[0]),
                PatternEntry::new("organ", Some("e4"), &[2, 6]),
                PatternEntry::new("cowbell", None, &[1]),
                PatternEntry::new("organ", Some("h4"), &[1]),
                PatternEntry::new("kick", None, &[99]),
            ])
    }

    fn source(kick: &PcmBuffer, snare: &PcmBuffer) -> Arc<dyn ByteSource> {
        let mut source = MemoryByteSource::new();
        source.insert(SampleId::drum("kick"), wav_bytes(kick));
        source.insert(SampleId::drum("snare"), wav_bytes(snare));
        Arc::new(source)
    }

    #[test]
    fn pattern_is_applied() -> Result<(), Box<dyn Error>> {
        let sink = Arc::new(mock::Sink::get("pattern"));
        let controller = Controller::new(&settings(), sink.clone(), EventBus::new())?;

        assert_eq!(controller.tracks().len(), 3);
        let kick = controller.track("kick").ok_or("no kick")?;
        assert!(kick.is_on(None, 0)?);
        assert!(!kick.is_on(None, 1)?);

        let organ = controller.track("organ").ok_or("no organ")?;
        assert!(organ.is_on(Some("e4"), 2)?);
        assert!(organ.is_on(Some("e4"), 6)?);
        assert!(!organ.is_on(Some("c4"), 2)?);
        assert!(sink.calls().is_empty());
        Ok(())
    }

    #[test]
    fn remove_track() -> Result<(), Box<dyn Error>> {
        let sink = Arc::new(mock::Sink::get("remove"));
        let mut controller = Controller::new(&settings(), sink, EventBus::new())?;

        assert!(controller.remove_track("snare"));
        assert!(!controller.remove_track("snare"));
        assert!(controller.track("snare").is_none());
        assert_eq!(controller.tracks().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn render_after_load() -> Result<(), Box<dyn Error>> {
        let kick = ramp_sample(1000);
        let sink = Arc::new(mock::Sink::get("render"));
        let controller = Controller::new(&settings(), sink, EventBus::new())?;

        // Unloaded samples render silence.
        assert!(controller.render_loop().is_empty());

        for handle in controller.load_samples(source(&kick, &ramp_sample(200))) {
            handle.await?;
        }
        // The organ has no sample in the source and stays silent.
        assert_eq!(controller.render_loop(), kick);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn loop_and_preview() -> Result<(), Box<dyn Error>> {
        let kick = ramp_sample(1000);
        let snare = ramp_sample(200);
        let sink = Arc::new(mock::Sink::get("loop"));
        let bus = EventBus::new();
        let mut observer = bus.subscribe();

        let controller = Controller::new(&settings(), sink.clone(), bus.clone())?;
        for handle in controller.load_samples(source(&kick, &snare)) {
            handle.await?;
        }
        let handle = controller.spawn();
        let mix = wav::wrap(&kick);

        bus.send(Event::IsPlayingUpdated {
            is_playing: true,
            looping: false,
        });
        sleep(Duration::from_millis(50)).await;
        assert_eq!(sink.calls(), vec![Call::Play(mix.clone())]);

        // The loop repeats every 2.4 seconds at tempo 100.
        sleep(Duration::from_millis(2400)).await;
        assert_eq!(sink.calls(), vec![Call::Play(mix.clone()), Call::Replay]);

        let step = StepRef::new("snare", None, 1);
        bus.send(Event::TrackViewUpdated(step.clone()));
        sleep(Duration::from_millis(50)).await;
        assert_eq!(sink.played().last(), Some(&wav::wrap(&snare)));

        // The preview replaced the loop, so the next repeat sends the mix again.
        sleep(Duration::from_millis(2400)).await;
        assert_eq!(
            sink.calls(),
            vec![
                Call::Play(mix.clone()),
                Call::Replay,
                Call::Play(wav::wrap(&snare)),
                Call::Play(mix),
            ]
        );

        bus.send(Event::IsPlayingUpdated {
            is_playing: false,
            looping: false,
        });
        sleep(Duration::from_secs(10)).await;
        assert_eq!(sink.calls().len(), 4);

        let mut models = Vec::new();
        while let Ok(event) = observer.try_recv() {
            if let Event::TrackModelUpdated { step, active } = event {
                models.push((step, active));
            }
        }
        assert_eq!(models, vec![(step, true)]);

        let controller = handle.shutdown().await?;
        assert_eq!(controller.scheduler().state(), PlaybackState::Stopped);
        assert!(controller.track("snare").ok_or("no snare")?.is_on(None, 1)?);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn resume_after_preview_plays_the_mix() -> Result<(), Box<dyn Error>> {
        let kick = ramp_sample(1000);
        let snare = ramp_sample(200);
        let sink = Arc::new(mock::Sink::get("resume"));
        let mut controller = Controller::new(&settings(), sink.clone(), EventBus::new())?;
        for handle in controller.load_samples(source(&kick, &snare)) {
            handle.await?;
        }
        let mix = wav::wrap(&kick);

        controller.is_playing_updated(true, false);
        controller.is_playing_updated(false, false);
        controller.track_view_updated(&StepRef::new("snare", None, 3));
        controller.is_playing_updated(true, true);

        assert_eq!(
            sink.calls(),
            vec![
                Call::Play(mix.clone()),
                Call::Play(wav::wrap(&snare)),
                Call::Play(mix),
            ]
        );
        assert_eq!(controller.scheduler().state(), PlaybackState::Looping);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn bad_steps_are_not_broadcast() -> Result<(), Box<dyn Error>> {
        let sink = Arc::new(mock::Sink::get("bad"));
        let bus = EventBus::new();
        let mut observer = bus.subscribe();
        let handle = Controller::new(&settings(), sink.clone(), bus.clone())?.spawn();

        bus.send(Event::TrackViewUpdated(StepRef::new("kick", None, 16)));
        bus.send(Event::TrackViewUpdated(StepRef::new("organ", Some("h4"), 0)));
        bus.send(Event::TrackViewUpdated(StepRef::new("cowbell", None, 0)));
        sleep(Duration::from_millis(50)).await;

        // Only the out of range drum step got as far as a preview.
        assert_eq!(sink.played(), vec![wav::wrap(&PcmBuffer::empty())]);
        while let Ok(event) = observer.try_recv() {
            assert!(!matches!(event, Event::TrackModelUpdated { .. }));
        }

        handle.shutdown().await?;
        Ok(())
    }
}
