//! Bounded mailbox used for actor-to-actor hand-off (stage → mixer → output).
//!
//! A thin naming wrapper over `crossbeam_channel`'s bounded MPSC channel:
//! `send` blocks the producer side when full rather than dropping, which is
//! exactly the backpressure behavior the stage relies on — frames are never
//! dropped at this boundary.

pub type MailboxSender<T> = crossbeam_channel::Sender<T>;
pub type MailboxReceiver<T> = crossbeam_channel::Receiver<T>;

pub fn mailbox<T>(capacity: usize) -> (MailboxSender<T>, MailboxReceiver<T>) {
    crossbeam_channel::bounded(capacity.max(1))
}
