use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use crate::error::{Direction, Result, TransportError};
use crate::hid::REPORT_ID;
use crate::traits::HidDevice;

type Responder = Box<dyn Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync>;

/// In-memory HID device.
///
/// Every written report's payload is handed to a responder; whatever it
/// returns is queued as the next input report. Reads wait (up to their
/// timeout) for a queued report. The device can be stalled, after which no
/// transfer completes, or failed, after which every transfer errors.
pub struct LoopbackDevice {
    inbox: Mutex<VecDeque<Vec<u8>>>,
    arrived: Condvar,
    responder: Responder,
    stalled: AtomicBool,
    failing: AtomicBool,
    written: AtomicUsize,
    last_written: Mutex<Option<Vec<u8>>>,
}

impl LoopbackDevice {
    /// Create a device whose input reports are produced by `responder`.
    pub fn new(responder: impl Fn(&[u8]) -> Option<Vec<u8>> + Send + Sync + 'static) -> Self {
        Self {
            inbox: Mutex::new(VecDeque::new()),
            arrived: Condvar::new(),
            responder: Box::new(responder),
            stalled: AtomicBool::new(false),
            failing: AtomicBool::new(false),
            written: AtomicUsize::new(0),
            last_written: Mutex::new(None),
        }
    }

    /// A device that reflects every payload back unchanged.
    pub fn echo() -> Self {
        Self::new(|payload| Some(payload.to_vec()))
    }

    /// Make every subsequent transfer run into its timeout.
    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent transfer fail with an I/O error.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
        self.arrived.notify_all();
    }

    /// Number of reports that reached the device.
    pub fn reports_written(&self) -> usize {
        self.written.load(Ordering::SeqCst)
    }

    /// The last report written, report id included.
    pub fn last_written(&self) -> Option<Vec<u8>> {
        self.last_written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_failing(&self, direction: Direction) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Io {
                direction,
                source: std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "loopback device failed",
                ),
            });
        }
        Ok(())
    }
}

impl HidDevice for LoopbackDevice {
    fn write_report(&self, report: &[u8], timeout: Duration) -> Result<usize> {
        self.check_failing(Direction::Send)?;
        if self.stalled.load(Ordering::SeqCst) {
            std::thread::sleep(timeout);
            return Err(TransportError::Timeout {
                direction: Direction::Send,
                after: timeout,
            });
        }

        self.written.fetch_add(1, Ordering::SeqCst);
        *self
            .last_written
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(report.to_vec());

        let payload = report.get(1..).unwrap_or(&[]);
        if let Some(response) = (self.responder)(payload) {
            let mut input = Vec::with_capacity(response.len() + 1);
            input.push(REPORT_ID);
            input.extend_from_slice(&response);
            self.inbox
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(input);
            self.arrived.notify_all();
        }

        Ok(report.len())
    }

    fn read_report(&self, report: &mut [u8], timeout: Duration) -> Result<usize> {
        self.check_failing(Direction::Receive)?;

        let inbox = self.inbox.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut inbox, _) = self
            .arrived
            .wait_timeout_while(inbox, timeout, |queue| {
                (queue.is_empty() || self.stalled.load(Ordering::SeqCst))
                    && !self.failing.load(Ordering::SeqCst)
            })
            .unwrap_or_else(PoisonError::into_inner);
        self.check_failing(Direction::Receive)?;

        if self.stalled.load(Ordering::SeqCst) {
            return Err(TransportError::Timeout {
                direction: Direction::Receive,
                after: timeout,
            });
        }
        let Some(input) = inbox.pop_front() else {
            return Err(TransportError::Timeout {
                direction: Direction::Receive,
                after: timeout,
            });
        };

        let n = input.len().min(report.len());
        report[..n].copy_from_slice(&input[..n]);
        Ok(n)
    }
}

impl std::fmt::Debug for LoopbackDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackDevice")
            .field("stalled", &self.stalled.load(Ordering::SeqCst))
            .field("failing", &self.failing.load(Ordering::SeqCst))
            .field("written", &self.reports_written())
            .finish()
    }
}
