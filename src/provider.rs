use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use itertools::Itertools;

use crate::{
    error::{Error, Result},
    frame::{self, Frame},
    header::{parse_header, EventCode},
    priority::Severity,
    timestamp::Timestamp,
};

/// Encoder-side knowledge about one log event type.
///
/// Each event code is owned by exactly one provider. The framing layer only
/// ever asks a provider to check or describe payload bytes; how the payload
/// is laid out is entirely up to the provider.
pub trait PayloadProvider: Send + Sync {
    fn event_code(&self) -> EventCode;

    fn name(&self) -> &str;

    fn default_severity(&self) -> Severity {
        Severity::Default
    }

    /// Structural check of a payload. Must not panic on arbitrary input.
    fn verify(&self, payload: &[u8]) -> bool;

    /// Human readable rendering of the payload fields.
    fn msg_string(&self, payload: &[u8]) -> Result<String>;
}

/// Typed encoder and decoder for the payload of one event code.
///
/// `decode(encode(msg))` gives back `msg`, and `verify` accepts every
/// payload produced by `encode`.
pub trait PayloadCodec: PayloadProvider {
    type Message;

    fn encode(&self, msg: &Self::Message) -> Bytes;

    fn decode(&self, payload: &[u8]) -> Result<Self::Message>;

    /// Frames `msg` under this codec's event code and default severity.
    fn frame(&self, msg: &Self::Message, timestamp: Timestamp) -> Frame {
        self.frame_with(self.default_severity(), msg, timestamp)
    }

    fn frame_with(&self, severity: Severity, msg: &Self::Message, timestamp: Timestamp) -> Frame {
        Frame::assemble(severity, self.event_code(), timestamp, &self.encode(msg))
    }

    /// Decodes the payload of `frame`, which must carry this codec's event code.
    fn decode_frame(&self, frame: &Frame) -> Result<Self::Message> {
        let code = frame.header().event_code();
        if code != self.event_code() {
            return Err(Error::UnknownEventCode(code));
        }
        self.decode(&frame.payload())
    }
}

/// Catalog from event code to payload provider.
///
/// Built up front and then shared read-only, typically behind an `Arc`.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<EventCode, Arc<dyn PayloadProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn PayloadProvider>) -> Result<()> {
        let code = provider.event_code();
        if self.providers.contains_key(&code) {
            return Err(Error::DuplicateEventCode(code));
        }
        tracing::debug!("register payload provider {} for {:#06x}", provider.name(), code);
        self.providers.insert(code, provider);
        Ok(())
    }

    /// Builder style `register`.
    pub fn with(mut self, provider: Arc<dyn PayloadProvider>) -> Result<Self> {
        self.register(provider)?;
        Ok(self)
    }

    pub fn get(&self, code: EventCode) -> Option<&Arc<dyn PayloadProvider>> {
        self.providers.get(&code)
    }

    pub fn lookup(&self, code: EventCode) -> Result<&Arc<dyn PayloadProvider>> {
        self.get(code).ok_or(Error::UnknownEventCode(code))
    }

    pub fn contains(&self, code: EventCode) -> bool {
        self.providers.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Verifies `buffer` as a frame whose payload belongs to the provider
    /// registered for its event code.
    pub fn verify_frame(&self, buffer: &[u8], declared_len: Option<u64>) -> Result<bool> {
        let header = parse_header(buffer)?;
        let provider = self.lookup(header.event_code())?;
        frame::verify(buffer, declared_len, |payload| provider.verify(payload))
    }

    pub fn msg_string(&self, frame: &Frame) -> Result<String> {
        let provider = self.lookup(frame.header().event_code())?;
        provider.msg_string(&frame.payload())
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self
            .providers
            .iter()
            .map(|(code, p)| (*code, p.name()))
            .sorted()
            .collect_vec();
        f.debug_struct("ProviderRegistry")
            .field("providers", &names)
            .finish()
    }
}
