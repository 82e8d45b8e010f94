//! Buffer ownership transfer across the engine/caller boundary

use std::fmt;
use std::ops::Deref;

/// An owned, inert byte buffer handed across the engine/caller boundary.
///
/// A `Payload` is moved out of internal storage exactly once, on retrieval;
/// after that the engine holds no reference to the bytes. Release is a
/// single consuming operation (dropping the value or calling
/// [`Payload::into_bytes`]), so releasing twice is unrepresentable. The
/// value has no behavior of its own: it carries bytes and nothing else.
#[derive(PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Wrap an owned buffer for hand-off.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// An empty payload, used where the delegated library produced no body.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Borrow the bytes without taking ownership.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// View the bytes as UTF-8 text, if they are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the payload, releasing the buffer to the caller.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Deref for Payload {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({} bytes)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trip() {
        let payload = Payload::from(b"hello".as_slice());
        assert_eq!(payload.len(), 5);
        assert_eq!(payload.as_str(), Some("hello"));
        assert_eq!(payload.into_bytes(), b"hello".to_vec());
    }

    #[test]
    fn test_empty_payload() {
        let payload = Payload::empty();
        assert!(payload.is_empty());
        assert_eq!(payload.as_bytes(), &[] as &[u8]);
    }

    #[test]
    fn test_non_utf8_payload_has_no_text_view() {
        let payload = Payload::new(vec![0xff, 0xfe]);
        assert_eq!(payload.as_str(), None);
    }
}
