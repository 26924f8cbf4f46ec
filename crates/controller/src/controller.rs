//! Session controller implementation
//!
//! One controller owns at most one tag session at a time. Session-level
//! events from the radio are consumed by a dedicated control thread, which
//! serializes every state transition; the caller's ready continuation runs on
//! a separate worker thread so that long protocol exchanges never starve the
//! control loop of events such as an incoming invalidation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use parking_lot::Mutex;
use tracing::{debug, warn};

use tagsession_core::{
    Disposition, InvalidateReason, PollingSession, SessionEvent, SessionEventReceiver, TagHandle,
    TagReader, session_event_channel,
};

use crate::config::ControllerConfig;
use crate::error::SessionError;

/// Prompt shown while more than one tag is in the field
pub const MULTIPLE_TAGS_PROMPT: &str =
    "More than one tag was found. Please present only one tag.";

/// Error message shown when the lone detected tag is not a smart card
pub const UNSUPPORTED_TAG_MESSAGE: &str = "Unsupported Smart Card";

/// Error message shown when connecting to a tag fails
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error, please try again";

/// Continuation invoked with the connected tag, on the work context
pub type ReadyFn<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Continuation invoked when the session fails before a tag was handed over
pub type FailureFn = Box<dyn FnOnce(SessionError) + Send + 'static>;

/// Bookkeeping for the one session a controller may have outstanding
struct ActiveSession<S> {
    /// Session surface, shared with the control loop
    session: Arc<S>,
    /// Set once a terminal notification has been delivered (or the caller
    /// ended the session); suppresses any further notification
    terminated: Arc<AtomicBool>,
    /// Set once the ready continuation has been dispatched
    ready: Arc<AtomicBool>,
}

/// Controller for contactless tag sessions
///
/// Owns at most one session at a time. [`start`](Self::start) arms a scan and
/// returns immediately; a request made while a session is outstanding is
/// silently dropped.
pub struct SessionController<R: TagReader> {
    /// The platform radio
    reader: R,
    /// Configuration
    config: ControllerConfig,
    /// The single outstanding session, if any
    active: Arc<Mutex<Option<ActiveSession<R::Session>>>>,
}

impl<R: TagReader> fmt::Debug for SessionController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .field("session_active", &self.active.lock().is_some())
            .finish()
    }
}

impl<R: TagReader> SessionController<R> {
    /// Create a new controller with the default configuration
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, ControllerConfig::default())
    }

    /// Create a new controller with a custom configuration
    pub fn with_config(reader: R, config: ControllerConfig) -> Self {
        Self {
            reader,
            config,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the controller configuration
    pub const fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Whether contactless scanning is supported on this platform
    ///
    /// Pure query, no side effects. Callers are expected to check this before
    /// offering any scan action to the user.
    pub fn is_available(&self) -> bool {
        self.reader.is_available()
    }

    /// Begin a new session showing `prompt`, returning immediately
    ///
    /// `on_ready` runs on a dedicated worker thread once a lone compatible
    /// tag has been connected; it must finish by calling
    /// [`end_session`](Self::end_session). `on_failure` runs if the session
    /// dies before a tag was handed over. Exactly one of the two is invoked
    /// per session.
    ///
    /// The request is silently dropped if a session is already outstanding or
    /// if scanning is unavailable.
    pub fn start<F, G>(&self, prompt: &str, on_ready: F, on_failure: G)
    where
        F: FnOnce(R::Tag) + Send + 'static,
        G: FnOnce(SessionError) + Send + 'static,
    {
        if !self.reader.is_available() {
            debug!("scanning unavailable; dropping start request");
            return;
        }

        // The slot lock is held across arming the scan so that two
        // concurrent start calls cannot both observe an empty slot.
        let mut slot = self.active.lock();
        if slot.is_some() {
            debug!("a session is already active; dropping start request");
            return;
        }

        let (events_tx, events_rx) = session_event_channel();
        let session = match self.reader.begin(prompt, events_tx) {
            Ok(session) => Arc::new(session),
            Err(e) => {
                drop(slot);
                warn!(error = ?e, "failed to begin scanning");
                on_failure(SessionError::Begin(e));
                return;
            }
        };

        let terminated = Arc::new(AtomicBool::new(false));
        let ready = Arc::new(AtomicBool::new(false));
        *slot = Some(ActiveSession {
            session: Arc::clone(&session),
            terminated: Arc::clone(&terminated),
            ready: Arc::clone(&ready),
        });
        drop(slot);

        let control = ControlLoop {
            session,
            events: events_rx,
            active: Arc::clone(&self.active),
            terminated,
            ready,
            poll_interval: self.config.poll_interval,
            multi_tag_prompt: self.config.multi_tag_prompt.clone(),
            on_ready: Some(Box::new(on_ready)),
            on_failure: Some(Box::new(on_failure)),
        };

        thread::spawn(move || control.run());
    }

    /// Update the prompt shown to the user
    ///
    /// Best-effort; only meaningful while a session is active. Calling with
    /// no active session is not an error.
    pub fn update_prompt(&self, message: &str) {
        match self.active.lock().as_ref() {
            Some(active) => active.session.set_prompt(message),
            None => debug!("update_prompt with no active session; ignoring"),
        }
    }

    /// End the outstanding session with a terminal disposition
    ///
    /// Callable only from within or after the ready continuation: the
    /// underlying session is invalidated with either a success alert or an
    /// error message, and the controller returns to idle. Calling this with
    /// no outstanding session, before the session is ready, or a second time
    /// is guarded as a no-op.
    pub fn end_session(&self, disposition: Disposition) {
        let taken = {
            let mut slot = self.active.lock();
            match slot.as_ref() {
                None => {
                    warn!("end_session called with no active session; ignoring");
                    return;
                }
                Some(active) if !active.ready.load(Ordering::Acquire) => {
                    warn!("end_session called before the session was ready; ignoring");
                    return;
                }
                Some(_) => slot.take(),
            }
        };

        if let Some(active) = taken {
            debug!(success = disposition.is_success(), "ending session");
            active.terminated.store(true, Ordering::Release);
            active.session.invalidate(disposition);
        }
    }
}

/// Per-session state machine, run to completion on the control thread
struct ControlLoop<S: PollingSession> {
    session: Arc<S>,
    events: SessionEventReceiver<S::Tag>,
    active: Arc<Mutex<Option<ActiveSession<S>>>>,
    terminated: Arc<AtomicBool>,
    ready: Arc<AtomicBool>,
    poll_interval: Duration,
    multi_tag_prompt: String,
    on_ready: Option<ReadyFn<S::Tag>>,
    on_failure: Option<FailureFn>,
}

impl<S: PollingSession> ControlLoop<S> {
    fn run(mut self) {
        // While waiting for an excess tag to be removed, this holds the tag
        // whose availability is being rechecked every poll interval.
        let mut waiting: Option<S::Tag> = None;

        loop {
            let event = if waiting.is_some() {
                match self.events.recv_timeout(self.poll_interval) {
                    Ok(event) => Some(event),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => {
                        self.finish_disconnected();
                        return;
                    }
                }
            } else {
                match self.events.recv() {
                    Ok(event) => Some(event),
                    Err(_) => {
                        self.finish_disconnected();
                        return;
                    }
                }
            };

            match event {
                // Poll tick: recheck whether the excess tag left the field.
                None => {
                    let Some(tag) = waiting.as_ref() else {
                        continue;
                    };
                    let still_present = self.session.connect(tag).is_ok() && tag.is_available();
                    if still_present {
                        debug!("excess tag still present; re-arming removal wait");
                    } else {
                        debug!("excess tag gone; restarting polling");
                        self.session.restart_polling();
                        waiting = None;
                    }
                }
                Some(SessionEvent::Active) => {
                    debug!("session active; polling for tags");
                }
                Some(SessionEvent::Discovered(tags)) => {
                    if self.ready.load(Ordering::Acquire) {
                        debug!("tag already connected; ignoring late discovery");
                        continue;
                    }
                    if !self.on_discovered(tags, &mut waiting) {
                        return;
                    }
                }
                Some(SessionEvent::Invalidated(reason)) => {
                    self.finish_invalidated(reason);
                    return;
                }
            }
        }
    }

    /// Handle a discovery notification. Returns false once the session has
    /// reached a terminal failure and the loop should stop.
    fn on_discovered(&mut self, mut tags: Vec<S::Tag>, waiting: &mut Option<S::Tag>) -> bool {
        if tags.len() > 1 {
            debug!(count = tags.len(), "multiple tags in field; waiting for removal");
            self.session.set_prompt(&self.multi_tag_prompt);
            *waiting = Some(tags.swap_remove(0));
            return true;
        }

        let Some(tag) = tags.pop() else {
            debug!("discovery notification with no tags; ignoring");
            return true;
        };
        *waiting = None;

        if !tag.protocol().is_iso7816() {
            debug!(protocol = ?tag.protocol(), "tag does not expose ISO 7816");
            self.fail(SessionError::UnsupportedTag, UNSUPPORTED_TAG_MESSAGE);
            return false;
        }

        if let Err(e) = self.session.connect(&tag) {
            debug!(error = ?e, "failed to connect to tag");
            self.fail(SessionError::Connection(e), CONNECTION_ERROR_MESSAGE);
            return false;
        }

        let Some(on_ready) = self.on_ready.take() else {
            // Unreachable: the continuation is only consumed here.
            return false;
        };
        self.ready.store(true, Ordering::Release);

        // The ready continuation runs on its own thread: protocol exchanges
        // may take arbitrarily long and this loop must stay free to process
        // an incoming invalidation.
        thread::spawn(move || on_ready(tag));
        debug!("tag connected; ready continuation dispatched");
        true
    }

    /// Terminate the session with a failure of our own making: invalidate
    /// the radio surface, release the controller slot, notify the caller.
    fn fail(&mut self, error: SessionError, message: &str) {
        self.terminated.store(true, Ordering::Release);
        self.session
            .invalidate(Disposition::Failure(message.to_string()));
        self.clear_slot();
        if let Some(on_failure) = self.on_failure.take() {
            on_failure(error);
        }
    }

    /// The transport tore the session down. This is the terminal failure
    /// path unless a terminal notification already happened (deliberate
    /// `end_session`, an earlier failure, or a dispatched ready
    /// continuation that owns termination from that point on).
    fn finish_invalidated(&mut self, reason: InvalidateReason) {
        let already_terminated = self.terminated.swap(true, Ordering::AcqRel);
        let ready_dispatched = self.ready.load(Ordering::Acquire);
        self.clear_slot();

        if already_terminated || ready_dispatched {
            debug!(%reason, "session closed");
            return;
        }
        if let Some(on_failure) = self.on_failure.take() {
            on_failure(SessionError::Invalidated(reason));
        }
    }

    /// The transport dropped its event channel without a final
    /// invalidation notification.
    fn finish_disconnected(&mut self) {
        self.finish_invalidated(InvalidateReason::Other(
            "transport closed the event stream".to_string(),
        ));
    }

    fn clear_slot(&self) {
        let _ = self.active.lock().take();
    }
}
