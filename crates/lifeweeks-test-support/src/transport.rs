//! Test transports — `BotTransport` doubles for gateway tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use lifeweeks_core::gateway::{BotTransport, TransportError};

/// A text message captured by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentText {
    /// Destination chat.
    pub chat_id: i64,
    /// Message text as sent.
    pub text: String,
}

/// A photo captured by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPhoto {
    /// Destination chat.
    pub chat_id: i64,
    /// Image size in bytes.
    pub size: usize,
    /// Caption, if any.
    pub caption: Option<String>,
}

/// A transport that records every request. Chats listed as unreachable fail
/// with `TransportError::Unreachable`; everything else succeeds.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    unreachable: HashSet<i64>,
    texts: Mutex<Vec<SentText>>,
    photos: Mutex<Vec<SentPhoto>>,
}

impl RecordingTransport {
    /// A transport that delivers to every chat.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that fails for the listed chats.
    #[must_use]
    pub fn failing_for(chat_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            unreachable: chat_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Returns a snapshot of every delivered text message.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn texts(&self) -> Vec<SentText> {
        self.texts.lock().unwrap().clone()
    }

    /// Returns a snapshot of every delivered photo.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn photos(&self) -> Vec<SentPhoto> {
        self.photos.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotTransport for RecordingTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        if self.unreachable.contains(&chat_id) {
            return Err(TransportError::Unreachable(chat_id));
        }
        self.texts.lock().unwrap().push(SentText {
            chat_id,
            text: text.to_owned(),
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo: &[u8],
        caption: Option<&str>,
    ) -> Result<(), TransportError> {
        if self.unreachable.contains(&chat_id) {
            return Err(TransportError::Unreachable(chat_id));
        }
        self.photos.lock().unwrap().push(SentPhoto {
            chat_id,
            size: photo.len(),
            caption: caption.map(str::to_owned),
        });
        Ok(())
    }
}

/// A transport whose every request fails with a network error.
#[derive(Debug)]
pub struct FailingTransport;

#[async_trait]
impl BotTransport for FailingTransport {
    async fn send_text(&self, _chat_id: i64, _text: &str) -> Result<(), TransportError> {
        Err(TransportError::Request("connection reset by peer".into()))
    }

    async fn send_photo(
        &self,
        _chat_id: i64,
        _photo: &[u8],
        _caption: Option<&str>,
    ) -> Result<(), TransportError> {
        Err(TransportError::Request("connection reset by peer".into()))
    }
}
