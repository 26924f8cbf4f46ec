//! Scripted transport doubles for exercising the session controller

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tagsession_core::{
    Bytes, Disposition, InvalidateReason, PollingSession, SessionEvent, SessionEventSender,
    TagHandle, TagProtocol, TagReader, TransportError,
};

/// A scripted tag. Availability answers are consumed front to back; once the
/// script runs dry the last answer repeats.
#[derive(Debug, Clone)]
pub struct MockTag {
    /// Identifier recorded by the session on connect
    pub id: u8,
    protocol: TagProtocol,
    availability: Arc<Mutex<VecDeque<bool>>>,
    /// Number of availability queries made against this tag
    pub availability_queries: Arc<AtomicUsize>,
}

impl MockTag {
    /// An ISO 7816 tag that stays in the field
    pub fn iso7816(id: u8) -> Self {
        Self::with_protocol(id, TagProtocol::Iso7816)
    }

    /// A tag speaking some other protocol
    pub fn with_protocol(id: u8, protocol: TagProtocol) -> Self {
        Self {
            id,
            protocol,
            availability: Arc::new(Mutex::new(VecDeque::new())),
            availability_queries: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Script the answers returned by `is_available`
    pub fn with_availability(self, answers: &[bool]) -> Self {
        *self.availability.lock() = answers.iter().copied().collect();
        self
    }
}

impl TagHandle for MockTag {
    fn do_transmit(&mut self, _command: &[u8]) -> Result<Bytes, TransportError> {
        Ok(Bytes::from_static(&[0x90, 0x00]))
    }

    fn is_available(&self) -> bool {
        self.availability_queries.fetch_add(1, Ordering::SeqCst);
        let mut script = self.availability.lock();
        if script.len() > 1 {
            script.pop_front().unwrap_or(true)
        } else {
            script.front().copied().unwrap_or(true)
        }
    }

    fn protocol(&self) -> TagProtocol {
        self.protocol
    }
}

/// Observation point for everything the controller did to a session
#[derive(Clone)]
pub struct SessionProbe {
    /// Push events into the control loop with this sender
    pub events: SessionEventSender<MockTag>,
    /// Prompts set on the session, in order (index 0 is the start prompt)
    pub prompts: Arc<Mutex<Vec<String>>>,
    /// Tags connected to, with the thread the connect ran on
    pub connects: Arc<Mutex<Vec<(u8, ThreadId)>>>,
    /// Number of restart_polling calls
    pub restarts: Arc<AtomicUsize>,
    /// Terminal dispositions, in order
    pub invalidations: Arc<Mutex<Vec<Disposition>>>,
}

impl SessionProbe {
    /// Deliver a discovery notification
    pub fn discover(&self, tags: Vec<MockTag>) {
        let _ = self.events.send(SessionEvent::Discovered(tags));
    }

    /// Deliver a transport-side invalidation
    pub fn invalidate(&self, reason: InvalidateReason) {
        let _ = self.events.send(SessionEvent::Invalidated(reason));
    }
}

/// Scripted session surface handed out by [`MockReader::begin`]
pub struct MockSession {
    events: SessionEventSender<MockTag>,
    prompts: Arc<Mutex<Vec<String>>>,
    connects: Arc<Mutex<Vec<(u8, ThreadId)>>>,
    connect_results: Arc<Mutex<VecDeque<bool>>>,
    restarts: Arc<AtomicUsize>,
    invalidations: Arc<Mutex<Vec<Disposition>>>,
}

impl PollingSession for MockSession {
    type Tag = MockTag;

    fn set_prompt(&self, message: &str) {
        self.prompts.lock().push(message.to_string());
    }

    fn connect(&self, tag: &MockTag) -> Result<(), TransportError> {
        self.connects.lock().push((tag.id, thread::current().id()));
        let ok = self.connect_results.lock().pop_front().unwrap_or(true);
        if ok { Ok(()) } else { Err(TransportError::Connection) }
    }

    fn restart_polling(&self) {
        self.restarts.fetch_add(1, Ordering::SeqCst);
    }

    fn invalidate(&self, disposition: Disposition) {
        self.invalidations.lock().push(disposition);
        // The platform delivers a final invalidation notification after a
        // programmatic teardown.
        let _ = self
            .events
            .send(SessionEvent::Invalidated(InvalidateReason::UserCancelled));
    }
}

/// Scripted radio. Clone it before handing it to the controller to keep an
/// observation handle.
#[derive(Clone)]
pub struct MockReader {
    available: Arc<AtomicBool>,
    begin_errors: Arc<AtomicUsize>,
    /// Number of sessions begun
    pub begin_count: Arc<AtomicUsize>,
    /// Results applied, in order, to connect attempts of the next session
    pub connect_results: Arc<Mutex<VecDeque<bool>>>,
    probes: Arc<Mutex<Vec<SessionProbe>>>,
}

impl MockReader {
    /// A reader whose platform supports scanning
    pub fn new() -> Self {
        Self {
            available: Arc::new(AtomicBool::new(true)),
            begin_errors: Arc::new(AtomicUsize::new(0)),
            begin_count: Arc::new(AtomicUsize::new(0)),
            connect_results: Arc::new(Mutex::new(VecDeque::new())),
            probes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A reader whose platform lacks scanning support
    pub fn unavailable() -> Self {
        let reader = Self::new();
        reader.available.store(false, Ordering::SeqCst);
        reader
    }

    /// Make the next `begin` call fail
    pub fn fail_next_begin(&self) {
        self.begin_errors.store(1, Ordering::SeqCst);
    }

    /// Script the results of upcoming connect attempts
    pub fn script_connects(&self, results: &[bool]) {
        *self.connect_results.lock() = results.iter().copied().collect();
    }

    /// Wait for the controller to begin a session and return its probe
    pub fn session(&self) -> SessionProbe {
        wait_until(|| !self.probes.lock().is_empty(), "session never began");
        self.probes.lock().last().cloned().unwrap()
    }
}

impl TagReader for MockReader {
    type Tag = MockTag;
    type Session = MockSession;

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn begin(
        &self,
        prompt: &str,
        events: SessionEventSender<MockTag>,
    ) -> Result<MockSession, TransportError> {
        if self.begin_errors.swap(0, Ordering::SeqCst) > 0 {
            return Err(TransportError::other("radio refused to begin"));
        }
        self.begin_count.fetch_add(1, Ordering::SeqCst);

        let probe = SessionProbe {
            events: events.clone(),
            prompts: Arc::new(Mutex::new(vec![prompt.to_string()])),
            connects: Arc::new(Mutex::new(Vec::new())),
            restarts: Arc::new(AtomicUsize::new(0)),
            invalidations: Arc::new(Mutex::new(Vec::new())),
        };
        let session = MockSession {
            events,
            prompts: Arc::clone(&probe.prompts),
            connects: Arc::clone(&probe.connects),
            connect_results: Arc::clone(&self.connect_results),
            restarts: Arc::clone(&probe.restarts),
            invalidations: Arc::clone(&probe.invalidations),
        };
        self.probes.lock().push(probe);
        let _ = session.events.send(SessionEvent::Active);
        Ok(session)
    }
}

/// Spin until `condition` holds, panicking with `message` after two seconds
pub fn wait_until<F: Fn() -> bool>(condition: F, message: &str) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out: {message}");
        thread::sleep(Duration::from_millis(5));
    }
}

/// Sleep long enough for any stray asynchronous effect to land
pub fn settle() {
    thread::sleep(Duration::from_millis(60));
}
