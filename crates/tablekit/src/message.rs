//! Messages and deferred commands.
//!
//! Time-based coalescing (the search debounce) is expressed as data rather
//! than as a timer owned by the engine: an operation that wants to run later
//! returns a [`Cmd`], the host waits however it likes, and feeds the produced
//! [`Message`] back through `update`. Components tag their messages so stale
//! ones can be recognised and dropped.

use std::any::Any;
use std::fmt;
use std::time::{Duration, Instant};

/// A message a command hands back to the component that issued it.
///
/// Messages never leave the thread that created them, so any `'static`
/// value qualifies, `Rc`s included.
///
/// # Example
///
/// ```rust
/// use tablekit::message::Message;
///
/// struct Refresh(u32);
///
/// let msg = Message::new(Refresh(3));
/// assert!(msg.is::<Refresh>());
/// assert_eq!(msg.type_name(), std::any::type_name::<Refresh>());
/// assert_eq!(msg.into_inner::<Refresh>().map(|r| r.0), Some(3));
/// ```
pub struct Message {
    payload: Box<dyn Any>,
    type_name: &'static str,
}

impl Message {
    pub fn new<M: 'static>(payload: M) -> Self {
        Self {
            payload: Box::new(payload),
            type_name: std::any::type_name::<M>(),
        }
    }

    /// Name of the payload type, for logs.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Unwraps the payload if it is an `M`.
    pub fn into_inner<M: 'static>(self) -> Option<M> {
        self.payload.downcast::<M>().ok().map(|b| *b)
    }

    pub fn downcast_ref<M: 'static>(&self) -> Option<&M> {
        self.payload.downcast_ref::<M>()
    }

    pub fn is<M: 'static>(&self) -> bool {
        self.payload.is::<M>()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Message").field(&self.type_name).finish()
    }
}

type Producer = Box<dyn FnOnce(Instant) -> Message + 'static>;

/// A deferred command producing one message after an optional delay.
pub struct Cmd {
    delay: Duration,
    produce: Producer,
}

impl Cmd {
    /// A command that produces its message immediately.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Message + 'static,
    {
        Self {
            delay: Duration::ZERO,
            produce: Box::new(move |_| f()),
        }
    }

    /// How long the host should wait before running the command.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Blocks for the delay, then produces the message.
    pub fn execute(self) -> Message {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        (self.produce)(Instant::now())
    }

    /// Produces the message without waiting.
    ///
    /// For hosts that already scheduled the delay on their own timer.
    pub fn fire(self) -> Message {
        (self.produce)(Instant::now())
    }
}

impl fmt::Debug for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cmd")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// A command that produces a message once `duration` has elapsed.
///
/// # Example
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use tablekit::message::{tick, Message};
///
/// struct Flush(Instant);
///
/// let cmd = tick(Duration::from_millis(16), |t| Message::new(Flush(t)));
/// assert_eq!(cmd.delay(), Duration::from_millis(16));
/// assert!(cmd.fire().is::<Flush>());
/// ```
pub fn tick<F>(duration: Duration, f: F) -> Cmd
where
    F: FnOnce(Instant) -> Message + 'static,
{
    Cmd {
        delay: duration,
        produce: Box::new(f),
    }
}
