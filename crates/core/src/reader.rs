//! Reader (radio) capability
//!
//! A [`TagReader`] stands in for whatever platform radio is available. It can
//! answer whether contactless scanning is supported at all and begin a
//! polling session, delivering events over a caller-supplied channel.

use crate::error::TransportError;
use crate::event::SessionEventSender;
use crate::session::PollingSession;
use crate::tag::TagHandle;

/// Platform radio capability
pub trait TagReader: Send + Sync {
    /// Tag type produced by this reader
    type Tag: TagHandle;
    /// Per-session surface type produced by [`begin`](Self::begin)
    type Session: PollingSession<Tag = Self::Tag> + 'static;

    /// Whether contactless scanning is supported on this platform
    ///
    /// Pure query, no side effects, safe to call at any time.
    fn is_available(&self) -> bool;

    /// Begin a polling session showing the given prompt
    ///
    /// Returns the session surface; events for it are delivered through
    /// `events` until an `Invalidated` event ends the stream.
    fn begin(
        &self,
        prompt: &str,
        events: SessionEventSender<Self::Tag>,
    ) -> Result<Self::Session, TransportError>;
}
