//! The empty producer: a safe no-op standing in for "no producer loaded",
//! used so the layer and `ModuleRegistry` never have to special-case a
//! missing producer with `Option`.

use crate::frame::DrawFrame;
use crate::producer::{NbFrames, Producer, ReceiveFlags};

pub struct EmptyProducer;

impl Producer for EmptyProducer {
    fn receive(&mut self, _flags: ReceiveFlags) -> DrawFrame {
        DrawFrame::Empty
    }

    fn last_frame(&self) -> DrawFrame {
        DrawFrame::Empty
    }

    fn nb_frames(&self) -> NbFrames {
        NbFrames::Known(0)
    }

    fn name(&self) -> &str {
        "empty-producer"
    }
}
