//! Turning fetch records into messages.

use crate::error::DecodeError;
use crate::source::RawMessage;
use crate::store::Message;

/// Decodes one fetch record.
pub trait Decoder {
    /// Decodes `raw` into a [`Message`] carrying the same sequence number.
    ///
    /// # Errors
    ///
    /// Fails when the record has no body or the body is not a valid
    /// message.
    fn decode(&self, raw: &RawMessage) -> Result<Message, DecodeError>;
}

/// [`Decoder`] backed by `mailpager-mime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MimeDecoder;

impl Decoder for MimeDecoder {
    fn decode(&self, raw: &RawMessage) -> Result<Message, DecodeError> {
        let body = raw.body.as_deref().ok_or(DecodeError::MissingBody)?;
        Ok(Message {
            id: raw.seq,
            mail: mailpager_mime::Message::parse(body)?,
        })
    }
}
