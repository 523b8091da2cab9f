//! # Transport Channel
//!
//! Every private command leaves the bridge through [`TransportChannel::submit`].
//! The channel owns the control primitive, the loaded flag and the health
//! counter, so failure accounting happens in exactly one place.
//!
//! A session whose primitive fails more than [`MAX_SEQUENTIAL_ERRORS`] times in a
//! row is presumed hung: the counter resets and a `HANGED` event goes out.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use wlbridge_common::control::ControlPrimitive;
use wlbridge_common::device::{EventKind, SessionId};
use wlbridge_common::events::EventSink;
use wlbridge_protocols::command::{CommandDescriptor, Opcode};
use wlbridge_protocols::payload;

use crate::error::TransportError;

pub const MAX_SEQUENTIAL_ERRORS: u32 = 4;

pub struct TransportChannel {
    session: SessionId,
    primitive: Box<dyn ControlPrimitive>,
    events: Arc<dyn EventSink>,
    errors: u32,
    loaded: bool,
    settle_delay: Duration,
}

impl TransportChannel {
    /// A freshly opened channel reports the device as loaded.
    pub fn new(
        session: SessionId,
        primitive: Box<dyn ControlPrimitive>,
        events: Arc<dyn EventSink>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            session,
            primitive,
            events,
            errors: 0,
            loaded: true,
            settle_delay,
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.errors
    }

    pub fn ensure_loaded(&self) -> Result<(), TransportError> {
        if self.loaded {
            Ok(())
        } else {
            Err(TransportError::NotLoaded {
                session: self.session.clone(),
            })
        }
    }

    pub fn notify(&self, event: EventKind) {
        self.events.notify(&self.session, event);
    }

    /// Sends one command. Fails fast without touching the device when stopped.
    pub fn submit(&mut self, descriptor: CommandDescriptor<'_>) -> Result<(), TransportError> {
        self.ensure_loaded()?;
        self.dispatch(descriptor)
    }

    /// Issues the start command. Allowed while stopped.
    ///
    /// On success the call blocks for the settle delay before the session is
    /// marked loaded and `STARTED` is emitted.
    pub fn start(&mut self) -> Result<(), TransportError> {
        let descriptor = CommandDescriptor::set(Opcode::DriverStart, payload::encode_word(0))?;

        match self.dispatch(descriptor) {
            Ok(()) => {
                std::thread::sleep(self.settle_delay);
                self.loaded = true;
                info!(session = %self.session, "Driver started");
                self.notify(EventKind::Started);
                Ok(())
            }
            Err(err) => {
                error!(session = %self.session, "Failed to start driver: {err}");
                self.notify_failed_lifecycle(&err);
                Err(err)
            }
        }
    }

    pub fn stop(&mut self) -> Result<(), TransportError> {
        self.ensure_loaded()?;
        let descriptor = CommandDescriptor::set(Opcode::DriverStop, payload::encode_word(0))?;

        match self.dispatch(descriptor) {
            Ok(()) => {
                self.loaded = false;
                info!(session = %self.session, "Driver stopped");
                self.notify(EventKind::Stopped);
                Ok(())
            }
            Err(err) => {
                error!(session = %self.session, "Failed to stop driver: {err}");
                self.notify_failed_lifecycle(&err);
                Err(err)
            }
        }
    }

    /// A failed start or stop means the device is hung. The threshold
    /// crossing inside `dispatch` has already said so.
    fn notify_failed_lifecycle(&self, err: &TransportError) {
        if !matches!(err, TransportError::Hung { .. }) {
            self.notify(EventKind::Hung);
        }
    }

    fn dispatch(&mut self, mut descriptor: CommandDescriptor<'_>) -> Result<(), TransportError> {
        let opcode = descriptor.opcode();
        let flags = descriptor.flags();
        let (input, output) = descriptor.buffers();

        match self.primitive.transact(opcode.code(), flags, input, output) {
            Ok(()) => {
                self.errors = 0;
                debug!(session = %self.session, "{opcode} accepted");
                Ok(())
            }
            Err(err) => {
                error!(session = %self.session, "{opcode} failed with code {}", err.code);
                self.errors += 1;
                if self.errors > MAX_SEQUENTIAL_ERRORS {
                    self.errors = 0;
                    warn!(session = %self.session, "Too many consecutive failures, device presumed hung");
                    self.notify(EventKind::Hung);
                    return Err(TransportError::Hung {
                        session: self.session.clone(),
                        opcode,
                    });
                }
                Err(TransportError::IoFailure {
                    session: self.session.clone(),
                    opcode,
                    code: err.code,
                })
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
