//! Collaborator mocks shared by the unit tests

use embedded_hal_async::delay::DelayNs;
use heapless::{Deque, String, Vec};
use rand_core::{impls, RngCore};

use crate::traits::{
    CharDisplay, ClimateReading, ClimateSensor, Connection, ConnectionAttempt, DisplayError,
    Listener, NetworkError, NetworkLink, SensorError,
};

/// One recorded display call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Clear,
    Move(u8, u8),
    Write(String<64>),
}

/// Display that records every call
#[derive(Default)]
pub struct MockDisplay {
    pub ops: Vec<Op, 256>,
    /// Fail every call
    pub broken: bool,
    /// Fail writes of text starting with this prefix
    pub fail_on: Option<&'static str>,
}

impl MockDisplay {
    pub fn writes(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            Op::Write(s) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn wrote(&self, text: &str) -> bool {
        self.writes().any(|w| w == text)
    }

    pub fn clears(&self) -> usize {
        self.ops.iter().filter(|op| **op == Op::Clear).count()
    }

    fn check(&self) -> Result<(), DisplayError> {
        if self.broken {
            Err(DisplayError::Bus)
        } else {
            Ok(())
        }
    }
}

impl CharDisplay for MockDisplay {
    async fn clear(&mut self) -> Result<(), DisplayError> {
        self.check()?;
        let _ = self.ops.push(Op::Clear);
        Ok(())
    }

    async fn move_cursor(&mut self, column: u8, row: u8) -> Result<(), DisplayError> {
        self.check()?;
        let _ = self.ops.push(Op::Move(column, row));
        Ok(())
    }

    async fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        self.check()?;
        if self.fail_on.is_some_and(|prefix| text.starts_with(prefix)) {
            return Err(DisplayError::Bus);
        }
        let _ = self.ops.push(Op::Write(String::try_from(text).unwrap_or_default()));
        Ok(())
    }
}

/// Delay that returns immediately and records each pause
#[derive(Default)]
pub struct MockDelay {
    pub pauses_ms: Vec<u32, 64>,
}

impl MockDelay {
    pub fn total_ms(&self) -> u32 {
        self.pauses_ms.iter().sum()
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        let _ = self.pauses_ms.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        let _ = self.pauses_ms.push(ms);
    }
}

/// Sensor returning a fixed result
pub struct MockSensor {
    pub result: Result<ClimateReading, SensorError>,
    pub reads: usize,
}

impl MockSensor {
    pub fn reading(temperature_c: f32, humidity_percent: f32) -> Self {
        Self {
            result: Ok(ClimateReading {
                temperature_c,
                humidity_percent,
            }),
            reads: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(SensorError::Timeout),
            reads: 0,
        }
    }
}

impl ClimateSensor for MockSensor {
    async fn measure(&mut self) -> Result<ClimateReading, SensorError> {
        self.reads += 1;
        self.result
    }
}

/// RNG that always yields the same word
pub struct FixedRng(pub u32);

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        self.0
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Scripted outcome of one accept call
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// Nobody connected before the timeout
    Idle,
    Request(&'static [u8]),
    /// Accepted, but the receive fails
    ReceiveFails,
    Transient,
    Fatal,
}

/// Listener that plays back a script, then times out forever
#[derive(Default)]
pub struct MockListener {
    pub script: Deque<Script, 8>,
    pub accepts: usize,
    pub sent: Vec<u8, 256>,
    pub closed: usize,
}

impl MockListener {
    pub fn with(script: &[Script]) -> Self {
        let mut listener = Self::default();
        for s in script {
            let _ = listener.script.push_back(*s);
        }
        listener
    }

    pub fn response(&self) -> &str {
        core::str::from_utf8(&self.sent).unwrap_or("")
    }
}

pub struct MockConnection<'a> {
    request: Option<&'static [u8]>,
    sent: &'a mut Vec<u8, 256>,
    closed: &'a mut usize,
}

impl Connection for MockConnection<'_> {
    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, NetworkError> {
        let request = self.request.ok_or(NetworkError::ConnectionReset)?;
        let n = request.len().min(buf.len());
        buf[..n].copy_from_slice(&request[..n]);
        Ok(n)
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), NetworkError> {
        self.sent
            .extend_from_slice(bytes)
            .map_err(|_| NetworkError::Io)
    }

    async fn close(self) {
        *self.closed += 1;
    }
}

impl Listener for MockListener {
    type Connection<'a> = MockConnection<'a>;

    async fn accept(&mut self, _timeout_ms: u32) -> ConnectionAttempt<MockConnection<'_>> {
        self.accepts += 1;
        let request = match self.script.pop_front() {
            None | Some(Script::Idle) => return ConnectionAttempt::TimedOut,
            Some(Script::Transient) => {
                return ConnectionAttempt::TransientError(NetworkError::ConnectionReset)
            }
            Some(Script::Fatal) => return ConnectionAttempt::FatalError(NetworkError::InvalidState),
            Some(Script::Request(bytes)) => Some(bytes),
            Some(Script::ReceiveFails) => None,
        };
        ConnectionAttempt::Accepted(MockConnection {
            request,
            sent: &mut self.sent,
            closed: &mut self.closed,
        })
    }
}

/// Link whose association behaviour is scripted
pub struct MockLink {
    /// Polls answered "not yet" before the link comes up; `None` never does
    pub up_after_polls: Option<usize>,
    /// Last poll that still reports the link up
    pub down_after_polls: Option<usize>,
    pub starts: usize,
    pub polls: usize,
    pub listens: usize,
    /// Script handed to the next listener
    pub next_script: Vec<Script, 8>,
    pub listen_fails: bool,
}

impl MockLink {
    pub fn up_after(polls: usize) -> Self {
        Self {
            up_after_polls: Some(polls),
            down_after_polls: None,
            starts: 0,
            polls: 0,
            listens: 0,
            next_script: Vec::new(),
            listen_fails: false,
        }
    }

    pub fn never_up() -> Self {
        Self {
            up_after_polls: None,
            ..Self::up_after(0)
        }
    }
}

impl NetworkLink for MockLink {
    type Listener = MockListener;

    async fn start_association(&mut self) -> Result<(), NetworkError> {
        self.starts += 1;
        Ok(())
    }

    async fn is_associated(&mut self) -> bool {
        self.polls += 1;
        let up = self.up_after_polls.is_some_and(|n| self.polls > n);
        let dropped = self.down_after_polls.is_some_and(|n| self.polls > n);
        up && !dropped
    }

    async fn listen(&mut self, _port: u16) -> Result<MockListener, NetworkError> {
        self.listens += 1;
        if self.listen_fails {
            return Err(NetworkError::InvalidState);
        }
        let listener = MockListener::with(&self.next_script);
        self.next_script.clear();
        Ok(listener)
    }
}

/// Run a future to completion on the test thread
pub fn block_on<F: core::future::Future>(f: F) -> F::Output {
    embassy_futures::block_on(f)
}
