//! Scripted in-memory transport for tests
//!
//! A responder closure sees every written report and produces the report the
//! next `read_report` returns.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::TransportError;
use crate::protocol::MSG_LEN;
use crate::types::TransportDeviceInfo;
use crate::Transport;

type Responder = Box<dyn FnMut(&[u8]) -> Result<Vec<u8>, TransportError> + Send>;

pub struct MockTransport {
    info: TransportDeviceInfo,
    responder: Mutex<Responder>,
    pending: Mutex<VecDeque<Result<Vec<u8>, TransportError>>>,
    sent: Mutex<Vec<Vec<u8>>>,
    connected: AtomicBool,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: FnMut(&[u8]) -> Result<Vec<u8>, TransportError> + Send + 'static,
    {
        Self {
            info: TransportDeviceInfo {
                vid: 0xD772,
                pid: 0x0002,
                usage_page: 0xFF60,
                usage: 0x61,
                device_path: "mock".into(),
                serial: None,
                product_name: Some("Mock Keyboard".into()),
            },
            responder: Mutex::new(Box::new(responder)),
            pending: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
        }
    }

    /// Transport that echoes every report back unchanged
    pub fn echo() -> Self {
        Self::new(|report| Ok(report.to_vec()))
    }

    /// All reports written so far
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// Simulate the device being unplugged
    pub fn unplug(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// Zero-padded `MSG_LEN` report starting with `prefix`
pub fn report(prefix: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; MSG_LEN];
    let len = prefix.len().min(MSG_LEN);
    buf[..len].copy_from_slice(&prefix[..len]);
    buf
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_report(&self, report: &[u8]) -> Result<(), TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::Disconnected);
        }
        self.sent.lock().push(report.to_vec());
        let response = {
            let mut responder = self.responder.lock();
            (*responder)(report)
        };
        self.pending.lock().push_back(response);
        Ok(())
    }

    async fn read_report(&self) -> Result<Vec<u8>, TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::Disconnected);
        }
        self.pending
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Communication("no response queued".into())))
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}
