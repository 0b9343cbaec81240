//! SocketCAN adapter using ISO-TP for OBD-II communication

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use socketcan::{ExtendedId, StandardId};
use socketcan_isotp::IsoTpSocket;

use crate::config::SocketCanConfig;
use crate::transport::{TransportAdapter, TransportError};

/// Offset between request and response ids for 11-bit OBD addressing
const RESPONSE_ID_OFFSET: u32 = 0x08;

/// SocketCAN adapter using ISO-TP
///
/// ISO-TP sockets are bound to one tx/rx id pair, so one socket is opened
/// per target module on first use and kept for the adapter's lifetime.
pub struct SocketCanAdapter {
    config: SocketCanConfig,
    sockets: Mutex<HashMap<u32, Arc<Mutex<IsoTpSocket>>>>,
    connected: AtomicBool,
}

impl SocketCanAdapter {
    pub async fn new(config: &SocketCanConfig) -> Result<Self, TransportError> {
        let adapter = Self {
            config: config.clone(),
            sockets: Mutex::new(HashMap::new()),
            connected: AtomicBool::new(true),
        };

        // Fail early when the interface does not exist
        adapter.socket_for(obd_core::PRIMARY_MODULE)?;

        tracing::info!(interface = %config.interface, "SocketCAN transport opened");

        Ok(adapter)
    }

    /// Response id a module answers on
    fn response_id(&self, target: u32) -> u32 {
        if self.config.extended_ids {
            // 0x18DA<ecu><tester> -> 0x18DA<tester><ecu>
            (target & 0xFFFF_0000) | ((target & 0xFF) << 8) | ((target >> 8) & 0xFF)
        } else {
            target + RESPONSE_ID_OFFSET
        }
    }

    fn socket_for(&self, target: u32) -> Result<Arc<Mutex<IsoTpSocket>>, TransportError> {
        let mut sockets = self.sockets.lock();
        if let Some(socket) = sockets.get(&target) {
            return Ok(socket.clone());
        }

        let rx_id = self.response_id(target);
        let mut socket = self.create_socket(target, rx_id)?;
        drain_socket(&mut socket);

        let socket = Arc::new(Mutex::new(socket));
        sockets.insert(target, socket.clone());

        tracing::debug!(
            tx_id = %format!("{:03X}", target),
            rx_id = %format!("{:03X}", rx_id),
            "Opened ISO-TP socket"
        );

        Ok(socket)
    }

    fn create_socket(&self, tx_id: u32, rx_id: u32) -> Result<IsoTpSocket, TransportError> {
        let interface = &self.config.interface;

        let socket = if self.config.extended_ids {
            let ext_rx_id = ExtendedId::new(rx_id).ok_or_else(|| {
                TransportError::InvalidConfig(format!("Invalid extended CAN ID: 0x{:X}", rx_id))
            })?;
            let ext_tx_id = ExtendedId::new(tx_id).ok_or_else(|| {
                TransportError::InvalidConfig(format!("Invalid extended CAN ID: 0x{:X}", tx_id))
            })?;
            IsoTpSocket::open(interface, ext_rx_id, ext_tx_id)
        } else {
            let std_rx_id = standard_id(rx_id)?;
            let std_tx_id = standard_id(tx_id)?;
            IsoTpSocket::open(interface, std_rx_id, std_tx_id)
        }
        .map_err(|e| {
            TransportError::ConnectionFailed(format!("Failed to open ISO-TP socket: {}", e))
        })?;

        // Set socket to non-blocking for async operation
        socket.set_nonblocking(true).map_err(|e| {
            TransportError::InvalidConfig(format!("Failed to set non-blocking: {}", e))
        })?;

        Ok(socket)
    }
}

fn standard_id(id: u32) -> Result<StandardId, TransportError> {
    u16::try_from(id)
        .ok()
        .and_then(StandardId::new)
        .ok_or_else(|| TransportError::InvalidConfig(format!("Invalid standard CAN ID: 0x{:X}", id)))
}

/// Drain any pending data from the socket to clear stale messages
fn drain_socket(socket: &mut IsoTpSocket) {
    loop {
        match socket.read() {
            Ok(data) if !data.is_empty() => {
                tracing::debug!(data = ?data, "Drained stale message from socket");
            }
            Ok(_) | Err(_) => {
                // No more data or error (likely WouldBlock on non-blocking socket)
                break;
            }
        }
    }
}

#[async_trait]
impl TransportAdapter for SocketCanAdapter {
    async fn send_receive(
        &self,
        target: u32,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectionClosed);
        }

        let socket = self.socket_for(target)?;
        let request = request.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut socket_guard = socket.lock();
            drain_socket(&mut socket_guard);

            socket_guard
                .write(&request)
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;

            let deadline = Instant::now() + timeout;
            loop {
                match socket_guard.read() {
                    Ok(data) if !data.is_empty() => return Ok(data.to_vec()),
                    Ok(_) => {}
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                    Err(e) => return Err(TransportError::ReceiveFailed(e.to_string())),
                }

                if Instant::now() >= deadline {
                    return Err(TransportError::Timeout(format!(
                        "No response from 0x{:03X}",
                        target
                    )));
                }
                std::thread::sleep(Duration::from_millis(1));
            }
        })
        .await
        .map_err(|e| TransportError::ReceiveFailed(format!("Task join error: {}", e)))?
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn reconnect(&self) -> Result<(), TransportError> {
        // Sockets are reopened on next use
        self.sockets.lock().clear();
        self.socket_for(obd_core::PRIMARY_MODULE)?;
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> String {
        self.config.interface.clone()
    }
}

impl Drop for SocketCanAdapter {
    fn drop(&mut self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}
