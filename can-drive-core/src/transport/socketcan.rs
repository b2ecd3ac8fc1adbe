//! Linux SocketCAN transport
//!
//! Requires the interface to be configured first:
//!   sudo ip link set can0 up type can bitrate 500000

use super::BusTransport;
use crate::types::{RawFrame, TransportError};
use ::socketcan::{CanFrame, CanSocket, EmbeddedFrame, ExtendedId, Id, Socket, StandardId};
use std::io;

/// Raw CAN socket bound to one interface, opened non-blocking
pub struct SocketCanTransport {
    channel: String,
    socket: CanSocket,
}

impl SocketCanTransport {
    /// Open `channel`; the socket is owned until the transport is dropped
    pub fn connect(channel: &str) -> Result<Self, TransportError> {
        let connect_err = |source| TransportError::Connect {
            channel: channel.to_string(),
            source,
        };
        let socket = CanSocket::open(channel).map_err(connect_err)?;
        socket.set_nonblocking(true).map_err(connect_err)?;

        log::info!("Connected to SocketCAN interface '{}'", channel);
        Ok(Self {
            channel: channel.to_string(),
            socket,
        })
    }

    fn to_socket_frame(frame: &RawFrame) -> Option<CanFrame> {
        let id = if frame.is_extended() {
            Id::Extended(ExtendedId::new(frame.can_id())?)
        } else {
            Id::Standard(StandardId::new(u16::try_from(frame.can_id()).ok()?)?)
        };
        CanFrame::new(id, frame.data())
    }

    fn from_socket_frame(frame: &CanFrame) -> Option<RawFrame> {
        let CanFrame::Data(data_frame) = frame else {
            return None;
        };
        let (can_id, extended) = match data_frame.id() {
            Id::Standard(id) => (id.as_raw() as u32, false),
            Id::Extended(id) => (id.as_raw(), true),
        };
        RawFrame::with_format(can_id, extended, data_frame.data()).ok()
    }
}

impl BusTransport for SocketCanTransport {
    fn channel(&self) -> &str {
        &self.channel
    }

    fn send(&mut self, frame: &RawFrame) -> Result<(), TransportError> {
        let socket_frame = Self::to_socket_frame(frame).ok_or_else(|| TransportError::Send {
            can_id: frame.can_id(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "frame not representable"),
        })?;
        self.socket
            .write_frame(&socket_frame)
            .map_err(|source| TransportError::Send {
                can_id: frame.can_id(),
                source,
            })
    }

    fn receive(&mut self) -> Result<Option<RawFrame>, TransportError> {
        loop {
            match self.socket.read_frame() {
                Ok(frame) => match Self::from_socket_frame(&frame) {
                    Some(raw) => return Ok(Some(raw)),
                    None => log::trace!("Skipping non-data frame on '{}'", self.channel),
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) => return Err(TransportError::Receive(e)),
            }
        }
    }
}

impl Drop for SocketCanTransport {
    fn drop(&mut self) {
        log::info!("Closing SocketCAN interface '{}'", self.channel);
    }
}
