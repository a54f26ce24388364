//! Raw terminal session: single keypresses without line buffering or echo.
//!
//! A dedicated input thread uses crossterm's event polling to capture key
//! presses and hands each one over as a single byte through a one-slot
//! channel. The main flow of control blocks on that channel, a shutdown
//! channel and a timer, whichever fires first.
//!
//! Raw mode is undone when the session ends or is dropped, so an early
//! return or a panic never leaves the shell without echo.

use crate::error::{Error, Result};
use crate::repeater::KeySource;
use crossbeam_channel::{
    after, bounded, select, Receiver, RecvTimeoutError, Sender, TrySendError,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use crossterm::tty::IsTty;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// How long the input thread waits for events before checking shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Set while a session owns raw mode. Only one may exist per process.
static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Why [`KeySource::read_byte`] returned without a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The timeout elapsed first. A normal outcome, not a failure.
    #[error("read timed out")]
    TimedOut,
    /// The input side is shutting down; no more keys will arrive.
    #[error("terminal input closing")]
    Closing,
}

/// Owns raw mode and the input thread for the controlling terminal.
pub struct RawSession {
    /// Keys from the input thread. `None` when stdin is not a terminal.
    key_rx: Option<Receiver<u8>>,
    /// Dropped by [`end`](Self::end) to wake any pending read.
    closing_tx: Option<Sender<()>>,
    closing_rx: Receiver<()>,
    /// Flag to signal the input thread to stop.
    shutdown: Arc<AtomicBool>,
    /// Handle to the input thread.
    handle: Option<JoinHandle<()>>,
    /// Whether this session enabled raw mode and holds the process slot.
    raw: bool,
}

impl RawSession {
    /// Enter raw mode and start the input thread.
    ///
    /// When stdin is not a terminal this succeeds without touching the
    /// terminal: reads then simply wait out their timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionActive`] if another session is active,
    /// [`Error::RawMode`] if the terminal mode cannot be changed, and
    /// [`Error::Io`] if the input thread cannot be spawned.
    pub fn begin() -> Result<Self> {
        let (closing_tx, closing_rx) = bounded(0);
        let mut session = Self {
            key_rx: None,
            closing_tx: Some(closing_tx),
            closing_rx,
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: None,
            raw: false,
        };

        if !io::stdin().is_tty() {
            debug!("stdin is not a terminal, interactive keys disabled");
            return Ok(session);
        }

        if SESSION_ACTIVE.swap(true, Ordering::SeqCst) {
            return Err(Error::SessionActive);
        }
        if let Err(e) = terminal::enable_raw_mode() {
            SESSION_ACTIVE.store(false, Ordering::SeqCst);
            return Err(Error::RawMode(e));
        }
        session.raw = true;

        // One slot: a key typed while another is pending is dropped.
        let (key_tx, key_rx) = bounded(1);
        let shutdown = Arc::clone(&session.shutdown);
        // On failure `session` drops here and leaves raw mode again.
        let handle = thread::Builder::new()
            .name("gaze-input".to_string())
            .spawn(move || Self::run_loop(&key_tx, &shutdown))?;

        session.key_rx = Some(key_rx);
        session.handle = Some(handle);
        debug!("raw terminal session started");
        Ok(session)
    }

    /// Whether keys are being read from an interactive terminal.
    pub const fn is_interactive(&self) -> bool {
        self.key_rx.is_some()
    }

    /// Stop the input thread and restore the original terminal mode.
    ///
    /// Idempotent. Pending and future reads fail with
    /// [`ReadError::Closing`].
    pub fn end(&mut self) {
        self.closing_tx.take();
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("input thread panicked");
            }
        }
        if self.raw {
            self.raw = false;
            if let Err(e) = terminal::disable_raw_mode() {
                warn!("unable to restore terminal mode: {e}");
            }
            SESSION_ACTIVE.store(false, Ordering::SeqCst);
            debug!("raw terminal session ended");
        }
    }

    /// Main input polling loop.
    fn run_loop(sender: &Sender<u8>, shutdown: &AtomicBool) {
        pump(sender, shutdown, event::poll, event::read);
    }
}

/// Forward key bytes from `read` to `sender` until `shutdown` is set or
/// the receiver is gone. Poll and read failures are logged and polling
/// goes on.
fn pump<P, R>(sender: &Sender<u8>, shutdown: &AtomicBool, mut poll: P, mut read: R)
where
    P: FnMut(Duration) -> io::Result<bool>,
    R: FnMut() -> io::Result<Event>,
{
    while !shutdown.load(Ordering::Relaxed) {
        match poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!("terminal poll failed: {e}");
                thread::sleep(POLL_INTERVAL);
                continue;
            }
        }

        let event = match read() {
            Ok(event) => event,
            Err(e) => {
                warn!("terminal read failed: {e}");
                thread::sleep(POLL_INTERVAL);
                continue;
            }
        };
        let Some(byte) = key_byte(&event) else {
            continue;
        };
        match sender.try_send(byte) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(byte, "key dropped, previous key still pending");
            }
            // Receiver dropped, exit
            Err(TrySendError::Disconnected(_)) => break,
        }
    }
}

impl KeySource for RawSession {
    fn read_byte(&mut self, timeout: Duration) -> std::result::Result<u8, ReadError> {
        let Some(key_rx) = &self.key_rx else {
            // No terminal: nothing but the timeout or shutdown can happen.
            return match self.closing_rx.recv_timeout(timeout) {
                Err(RecvTimeoutError::Timeout) => Err(ReadError::TimedOut),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => Err(ReadError::Closing),
            };
        };

        select! {
            recv(key_rx) -> key => key.map_err(|_| ReadError::Closing),
            recv(self.closing_rx) -> _ => Err(ReadError::Closing),
            recv(after(timeout)) -> _ => Err(ReadError::TimedOut),
        }
    }
}

impl Drop for RawSession {
    fn drop(&mut self) {
        self.end();
    }
}

/// The byte a terminal in non-canonical mode would deliver first for a key
/// press. Releases and non-key events yield `None`.
fn key_byte(event: &Event) -> Option<u8> {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind,
        ..
    }) = event
    else {
        return None;
    };
    if *kind != KeyEventKind::Press {
        return None;
    }

    Some(match *code {
        KeyCode::Char(c)
            if modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() =>
        {
            (c.to_ascii_lowercase() as u8) & 0x1f
        }
        KeyCode::Char(c) => {
            let mut utf8 = [0u8; 4];
            c.encode_utf8(&mut utf8);
            utf8[0]
        }
        KeyCode::Enter => b'\n',
        KeyCode::Tab => b'\t',
        KeyCode::Backspace => 0x7f,
        KeyCode::Null => 0,
        // Everything else arrives as an escape sequence.
        _ => 0x1b,
    })
}
