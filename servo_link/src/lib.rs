//! # servo_link
//!
//! Serialises a [`FingerStatus`] into the actuator wire format and sends it
//! as one best-effort UDP datagram per frame.
//!
//! ## Wire format
//!
//! ASCII text, five decimal codes joined by single commas, no trailing
//! delimiter, no whitespace:
//!
//! ```text
//! 0,110,180,150,120
//! ```
//!
//! ## Failure semantics
//!
//! Fire-and-forget.  A failed send is returned to the caller to log and
//! drop; there is no retry, queue, or backpressure.  The receiver simply
//! keeps its last state until the next datagram lands.

use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

use finger_state::FingerStatus;
use log::info;
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Payload encoding
// ════════════════════════════════════════════════════════════════════════════

/// Encode a status array as the comma-delimited wire payload.
pub fn payload(status: &FingerStatus) -> String {
    let codes = status.codes();
    let mut out = String::with_capacity(4 * codes.len());
    for (i, code) in codes.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&code.to_string());
    }
    out
}

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum LinkError {
    /// Could not bind the local outbound socket at startup.
    #[error("failed to bind local UDP socket: {0}")]
    Bind(#[source] std::io::Error),

    /// A datagram could not be handed to the network stack.
    #[error("failed to send to {dest}: {source}")]
    Send {
        dest: SocketAddrV4,
        #[source]
        source: std::io::Error,
    },
}

// ════════════════════════════════════════════════════════════════════════════
// StatusSink — where status arrays go
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can accept one status array per frame.
///
/// The frame loop holds a `Box<dyn StatusSink>` so transmission can be
/// swapped out (disabled, or captured in tests) without touching the loop.
pub trait StatusSink: Send {
    fn send(&mut self, status: &FingerStatus) -> Result<(), LinkError>;
}

// ── UDP backend ─────────────────────────────────────────────────────────────

/// The real uplink: one UDP socket, opened once at startup, one datagram
/// per [`send`](StatusSink::send).
pub struct UdpSink {
    socket: UdpSocket,
    dest: SocketAddrV4,
}

impl UdpSink {
    /// Bind an ephemeral local socket and aim it at `dest`.
    ///
    /// Connectionless: nothing is exchanged with the receiver here, so this
    /// succeeds even when the receiver is offline.
    pub fn connect(dest: SocketAddrV4) -> Result<Self, LinkError> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
            .map_err(LinkError::Bind)?;
        info!("servo uplink ready, destination {dest}");
        Ok(UdpSink { socket, dest })
    }

    pub fn dest(&self) -> SocketAddrV4 {
        self.dest
    }
}

impl StatusSink for UdpSink {
    fn send(&mut self, status: &FingerStatus) -> Result<(), LinkError> {
        let text = payload(status);
        self.socket
            .send_to(text.as_bytes(), self.dest)
            .map_err(|source| LinkError::Send { dest: self.dest, source })?;
        Ok(())
    }
}

// ── null backend ────────────────────────────────────────────────────────────

/// Discards every status array.  Used when transmission is switched off.
pub struct NullSink;

impl StatusSink for NullSink {
    fn send(&mut self, _status: &FingerStatus) -> Result<(), LinkError> {
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
