//! Cooperative concurrency substrate shared by every actor in a channel.

pub mod executor;
pub mod mailbox;
pub mod retry_task;
pub mod ticket;

pub use executor::{Awaitable, Executor};
pub use mailbox::{mailbox, MailboxReceiver, MailboxSender};
pub use retry_task::RetryTask;
pub use ticket::{Governor, Ticket};
