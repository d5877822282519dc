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
use tokio::sync::broadcast;
use tracing::debug;

/// How many events a slow subscriber can fall behind before it starts missing them.
const CAPACITY: usize = 64;

/// A single step of a track. The note is only set for instrument tracks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepRef {
    pub track: String,
    pub note: Option<String>,
    pub index: usize,
}

impl StepRef {
    pub fn new(track: &str, note: Option<&str>, index: usize) -> StepRef {
        StepRef {
            track: track.to_string(),
            note: note.map(str::to_string),
            index,
        }
    }
}

/// Events carried by the bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A step was clicked. The controller previews it, toggles it and then
    /// reports the result with TrackModelUpdated.
    TrackViewUpdated(StepRef),

    /// A step changed.
    TrackModelUpdated { step: StepRef, active: bool },

    /// Starts or stops playback.
    IsPlayingUpdated { is_playing: bool, looping: bool },
}

impl Event {
    /// Calls the handler method matching this event.
    pub fn dispatch(&self, handler: &mut dyn EventHandler) {
        match self {
            Event::TrackViewUpdated(step) => handler.track_view_updated(step),
            Event::TrackModelUpdated { step, active } => {
                handler.track_model_updated(step, *active)
            }
            Event::IsPlayingUpdated {
                is_playing,
                looping,
            } => handler.is_playing_updated(*is_playing, *looping),
        }
    }
}

/// Receives bus events. Every method does nothing by default.
pub trait EventHandler {
    fn track_view_updated(&mut self, _step: &StepRef) {}

    fn track_model_updated(&mut self, _step: &StepRef, _active: bool) {}

    fn is_playing_updated(&mut self, _is_playing: bool, _looping: bool) {}
}

/// A typed publish/subscribe channel. Clones publish to the same subscribers.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> EventBus {
        let (tx, _) = broadcast::channel(CAPACITY);
        EventBus { tx }
    }

    /// Publishes an event. Returns the number of subscribers that will see it.
    pub fn send(&self, event: Event) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(e) => {
                debug!(event = ?e.0, "No subscribers for event.");
                0
            }
        }
    }

    /// Subscribes to every event sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new()
    }
}
