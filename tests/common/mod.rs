#![allow(dead_code)]

use async_trait::async_trait;
use gwconsole::{GwError, GwResult, TimingConfig, Transport, TransportKind};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const PROMPT: &str = "/cfg/system/root #";

#[derive(Default)]
struct Device {
    /// Replies queued per exact line written, consumed in order
    replies: HashMap<Vec<u8>, VecDeque<Vec<Vec<u8>>>>,
    /// Chunks waiting to be read, one per receive call
    pending: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
    open: bool,
    closes: usize,
    refuse_connect: bool,
}

/// In-memory gateway console. Each write is matched against scripted
/// replies; the reply chunks are then handed out one per poll.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    device: Arc<Mutex<Device>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to the next write of exactly `line` with a single chunk
    pub fn on(&self, line: &str, reply: &str) -> &Self {
        self.on_chunks(line, &[reply])
    }

    /// Reply to the next write of exactly `line` with several chunks
    pub fn on_chunks(&self, line: &str, chunks: &[&str]) -> &Self {
        let mut device = self.device.lock().unwrap();
        device
            .replies
            .entry(line.as_bytes().to_vec())
            .or_default()
            .push_back(chunks.iter().map(|c| c.as_bytes().to_vec()).collect());
        self
    }

    pub fn refuse_connect(&self) -> &Self {
        self.device.lock().unwrap().refuse_connect = true;
        self
    }

    /// Everything written, one entry per send
    pub fn sent(&self) -> Vec<String> {
        self.device
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.device.lock().unwrap().closes
    }

    pub fn is_open_now(&self) -> bool {
        self.device.lock().unwrap().open
    }

    pub fn boxed(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Serial
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }

    fn is_open(&self) -> bool {
        self.device.lock().unwrap().open
    }

    async fn connect(&mut self) -> GwResult<()> {
        let mut device = self.device.lock().unwrap();
        if device.refuse_connect {
            return Err(GwError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "port busy",
            )));
        }
        device.open = true;
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> GwResult<()> {
        let mut device = self.device.lock().unwrap();
        if !device.open {
            return Err(GwError::NotConnected);
        }
        device.sent.push(data.to_vec());
        let reply = device
            .replies
            .get_mut(data)
            .and_then(|queue| queue.pop_front());
        if let Some(chunks) = reply {
            device.pending.extend(chunks);
        }
        Ok(())
    }

    async fn receive_nonblocking(&mut self) -> GwResult<Vec<u8>> {
        let mut device = self.device.lock().unwrap();
        if !device.open {
            return Err(GwError::NotConnected);
        }
        Ok(device.pending.pop_front().unwrap_or_default())
    }

    async fn close(&mut self) -> GwResult<()> {
        let mut device = self.device.lock().unwrap();
        device.open = false;
        device.closes += 1;
        Ok(())
    }
}

/// Short timeouts and no settle delays
pub fn fast_timing() -> TimingConfig {
    TimingConfig::immediate()
}
