//! Layer: sequences a foreground/background producer pair through
//! transitions and exposes one draw-frame stream to the stage.
//!
//! A layer cycles through `empty`/`stopped`/`playing`/`paused` states via
//! `play`/`pause`/`stop`/`load`, and auto-plays a loaded background once the
//! foreground's remaining frame count reaches a configured lookahead.

use std::sync::Arc;

use crate::destroyer::Destroyer;
use crate::frame::DrawFrame;
use crate::producer::{DestroyProducerProxy, EmptyProducer, NbFrames, Producer, ReceiveFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
    Empty,
    Stopped,
    Playing,
    Paused,
}

pub struct Layer {
    foreground: Box<dyn Producer>,
    background: Option<Box<dyn Producer>>,
    state: LayerState,
    auto_play_delta: Option<u64>,
    destroyer: Arc<Destroyer>,
}

impl Layer {
    pub fn new(destroyer: Arc<Destroyer>) -> Self {
        let foreground = wrap(Box::new(EmptyProducer), &destroyer);
        Self {
            foreground,
            background: None,
            state: LayerState::Empty,
            auto_play_delta: None,
            destroyer,
        }
    }

    pub fn state(&self) -> LayerState {
        self.state
    }

    pub fn foreground_name(&self) -> &str {
        self.foreground.name()
    }

    /// Name of the pending background producer, if any has been loaded.
    pub fn background_name(&self) -> Option<&str> {
        self.background.as_deref().map(Producer::name)
    }

    /// Installs `producer` as background. If `preview` is set and no
    /// foreground has ever been loaded (`state == Empty`), also promotes it
    /// immediately and parks in `Paused` showing the first frame.
    pub fn load(&mut self, producer: Box<dyn Producer>, preview: bool, auto_play_delta: Option<u64>) {
        self.background = Some(wrap(producer, &self.destroyer));
        self.auto_play_delta = auto_play_delta;

        if preview && self.state == LayerState::Empty {
            self.promote_background();
            self.state = LayerState::Paused;
        }
    }

    /// Promotes a pending background (old foreground destroyed
    /// asynchronously by the replaced `Box`'s own drop), or unpauses.
    pub fn play(&mut self) {
        if self.background.is_some() {
            self.promote_background();
        }
        self.state = LayerState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state == LayerState::Playing {
            self.state = LayerState::Paused;
        }
    }

    /// Releases the foreground (destroyed asynchronously); the next
    /// `receive()` returns `Empty`.
    pub fn stop(&mut self) {
        self.foreground = wrap(Box::new(EmptyProducer), &self.destroyer);
        self.state = LayerState::Stopped;
    }

    fn promote_background(&mut self) {
        if let Some(background) = self.background.take() {
            self.foreground = background;
        }
    }

    pub fn receive(&mut self, flags: ReceiveFlags) -> DrawFrame {
        match self.state {
            LayerState::Empty | LayerState::Stopped => DrawFrame::Empty,
            LayerState::Paused => self.foreground.last_frame(),
            LayerState::Playing => self.receive_playing(flags),
        }
    }

    fn receive_playing(&mut self, flags: ReceiveFlags) -> DrawFrame {
        if let Some(delta) = self.auto_play_delta {
            if self.background.is_some() {
                if let NbFrames::Known(total) = self.foreground.nb_frames() {
                    if total.saturating_sub(self.foreground.frame_number()) == delta {
                        self.promote_background();
                    }
                }
            }
        }

        let frame = self.foreground.receive(flags);
        if frame.is_eof() {
            if self.background.is_some() {
                self.promote_background();
                self.foreground.receive(flags)
            } else {
                self.state = LayerState::Stopped;
                DrawFrame::Empty
            }
        } else if frame.is_late() {
            self.foreground.last_frame()
        } else {
            frame
        }
    }
}

fn wrap(producer: Box<dyn Producer>, destroyer: &Arc<Destroyer>) -> Box<dyn Producer> {
    Box::new(DestroyProducerProxy::new(producer, Arc::clone(destroyer)))
}

/// Atomically exchanges two layers' full state, producers included.
/// Callers owning both layers under the right executor lock(s) just call
/// this; there is nothing partial to observe.
pub fn swap(a: &mut Layer, b: &mut Layer) {
    std::mem::swap(a, b);
}
