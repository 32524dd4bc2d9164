use http::{HeaderName, HeaderValue};

use super::MessageError;
use crate::hash::TableEntry;

/// A single header field owned by an [`HttpMessage`](super::HttpMessage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    name: HeaderName,
    value: HeaderValue,
}

impl HttpHeader {
    pub fn new(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }

    /// Builds a header from the raw name and value bytes a parser recognized.
    pub fn from_bytes(name: &[u8], value: &[u8]) -> Result<Self, MessageError> {
        let name = HeaderName::from_bytes(name).map_err(MessageError::invalid_header)?;
        let value = HeaderValue::from_bytes(value).map_err(MessageError::invalid_header)?;
        Ok(Self { name, value })
    }

    #[inline]
    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> &HeaderValue {
        &self.value
    }

    pub fn into_parts(self) -> (HeaderName, HeaderValue) {
        (self.name, self.value)
    }
}

/// Index record pointing at a header by its position in the message's header list.
#[derive(Debug, Clone)]
pub(crate) struct HeaderSlot {
    pub(crate) name: HeaderName,
    pub(crate) position: usize,
}

impl TableEntry for HeaderSlot {
    type Key = str;

    #[inline]
    fn key(&self) -> &str {
        self.name.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes() {
        let header = HttpHeader::from_bytes(b"Content-Type", b"text/plain").unwrap();
        assert_eq!(header.name().as_str(), "content-type");
        assert_eq!(header.value().as_bytes(), b"text/plain");
    }

    #[test]
    fn test_from_invalid_bytes() {
        assert!(matches!(HttpHeader::from_bytes(b"bad header", b"x"), Err(MessageError::InvalidHeader { .. })));
        assert!(matches!(HttpHeader::from_bytes(b"x-ok", b"line\nbreak"), Err(MessageError::InvalidHeader { .. })));
    }
}
