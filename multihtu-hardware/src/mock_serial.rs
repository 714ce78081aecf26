//! Scripted serial transport for unit tests

use crate::serial_driver::{Connector, SerialTransport};
use async_trait::async_trait;
use multihtu_core::{MultiHtuError, Result, FRAME_SLOTS};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Everything the board side observed, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open,
    Clear,
    Write(Vec<u8>),
    Read(usize),
    Close,
}

/// Scripted answer to one read
pub enum Reply {
    Bytes(Vec<u8>),
    Error(String),
}

#[derive(Default)]
pub struct MockState {
    pub events: Vec<Event>,
    pub replies: VecDeque<Reply>,
    pub failing_opens: usize,
    pub fail_writes: bool,
    pub fail_close: bool,
}

/// Shared handle to the mock board; clone it before handing the connector away
#[derive(Clone, Default)]
pub struct MockBoard {
    state: Arc<Mutex<MockState>>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connector(&self) -> Box<dyn Connector> {
        Box::new(MockConnector {
            state: self.state.clone(),
        })
    }

    pub fn reply(&self, bytes: Vec<u8>) {
        self.state.lock().unwrap().replies.push_back(Reply::Bytes(bytes));
    }

    pub fn reply_frame(&self, values: [f32; FRAME_SLOTS]) {
        self.reply(frame_bytes(values));
    }

    pub fn reply_error(&self, msg: &str) {
        self.state
            .lock()
            .unwrap()
            .replies
            .push_back(Reply::Error(msg.to_string()));
    }

    pub fn fail_next_opens(&self, count: usize) {
        self.state.lock().unwrap().failing_opens = count;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    pub fn fail_close(&self, fail: bool) {
        self.state.lock().unwrap().fail_close = fail;
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.lock().unwrap().events.clear();
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }

    pub fn opens(&self) -> usize {
        self.count(&Event::Open)
    }

    /// All bytes written, concatenated
    pub fn written(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Write(bytes) => Some(bytes),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn reads(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Read(_)))
            .count()
    }
}

pub fn frame_bytes(values: [f32; FRAME_SLOTS]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl Connector for MockConnector {
    async fn open(&self, port_path: &str) -> Result<Box<dyn SerialTransport>> {
        let mut state = self.state.lock().unwrap();
        if state.failing_opens > 0 {
            state.failing_opens -= 1;
            return Err(MultiHtuError::Serial(format!(
                "Failed to open serial port: {}: No such file or directory",
                port_path
            )));
        }
        state.events.push(Event::Open);
        Ok(Box::new(MockTransport {
            state: self.state.clone(),
        }))
    }
}

struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl SerialTransport for MockTransport {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(MultiHtuError::Serial("Write failed: Broken pipe".to_string()));
        }
        state.events.push(Event::Write(bytes.to_vec()));
        Ok(())
    }

    async fn read_up_to(&mut self, len: usize, _deadline: Duration) -> Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.events.push(Event::Read(len));
        match state.replies.pop_front() {
            Some(Reply::Bytes(mut bytes)) => {
                bytes.truncate(len);
                Ok(bytes)
            }
            Some(Reply::Error(msg)) => Err(MultiHtuError::Serial(msg)),
            // Silent board: the read times out with nothing received
            None => Ok(Vec::new()),
        }
    }

    fn clear_input_buffer(&mut self) -> Result<()> {
        self.state.lock().unwrap().events.push(Event::Clear);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.events.push(Event::Close);
        if state.fail_close {
            return Err(MultiHtuError::Serial("Input/output error".to_string()));
        }
        Ok(())
    }
}
