use bytes::Bytes;
use http::{Method, Request, Uri, Version};

use super::header::HeaderSlot;
use super::{HttpHeader, HttpVersion, MessageError};
use crate::buffer::Buffer;
use crate::hash::{AsciiCaseInsensitive, HashTable};

/// Initial capacity of the path buffer.
pub const DEFAULT_PATH_CAPACITY: usize = 256;

/// Initial capacity of the query buffer.
pub const DEFAULT_QUERY_CAPACITY: usize = 256;

/// Initial capacity of the body buffer.
pub const DEFAULT_BODY_CAPACITY: usize = 1024;

/// The header index starts with 2^6 buckets.
const HEADER_BUCKET_EXPONENT: u8 = 6;

/// A request or response as it is being assembled by a parser.
///
/// The message owns everything the parser produces: the method, the raw path and query bytes,
/// the protocol version, the header fields and the body. Headers are kept in arrival order and
/// indexed by a case-insensitive [`HashTable`] whose seed is drawn at random for each message,
/// so lookups stay cheap whatever names a peer sends.
///
/// # Example
///
/// ```
/// use http::Method;
/// use micro_http_core::protocol::{HttpHeader, HttpMessage};
///
/// let mut message = HttpMessage::new();
/// message.set_method(Method::GET);
/// message.set_version(1, 1);
/// message.path_mut().write(b"/index.html");
/// message.add_header(HttpHeader::from_bytes(b"Host", b"example.com").unwrap());
///
/// assert_eq!(message.header("host").unwrap(), "example.com");
///
/// let request = message.to_request().unwrap();
/// assert_eq!(request.uri(), "/index.html");
/// ```
#[derive(Debug)]
pub struct HttpMessage {
    method: Option<Method>,
    path: Buffer,
    query: Buffer,
    version: HttpVersion,
    headers: Vec<HttpHeader>,
    header_index: HashTable<HeaderSlot, AsciiCaseInsensitive>,
    body: Buffer,
}

impl HttpMessage {
    /// Creates an empty message with the default buffer capacities.
    pub fn new() -> Self {
        Self::with_capacities(DEFAULT_PATH_CAPACITY, DEFAULT_QUERY_CAPACITY, DEFAULT_BODY_CAPACITY)
    }

    pub fn with_capacities(path: usize, query: usize, body: usize) -> Self {
        Self {
            method: None,
            path: Buffer::new(path),
            query: Buffer::new(query),
            version: HttpVersion::UNKNOWN,
            headers: Vec::new(),
            header_index: HashTable::with_random_seed(HEADER_BUCKET_EXPONENT),
            body: Buffer::new(body),
        }
    }

    /// The method, or `None` while the parser has not recognized one.
    #[inline]
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = Some(method);
    }

    /// Sets the method from the token a parser read off the request line.
    pub fn set_method_bytes(&mut self, method: &[u8]) -> Result<(), MessageError> {
        let method = Method::from_bytes(method).map_err(|_| MessageError::InvalidMethod)?;
        self.method = Some(method);
        Ok(())
    }

    #[inline]
    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn set_version(&mut self, major: u8, minor: u8) {
        self.version = HttpVersion::new(major, minor);
    }

    /// The version as an `http` crate value, `None` while unknown or unsupported.
    pub fn http_version(&self) -> Option<Version> {
        Version::try_from(self.version).ok()
    }

    #[inline]
    pub fn path(&self) -> &Buffer {
        &self.path
    }

    #[inline]
    pub fn path_mut(&mut self) -> &mut Buffer {
        &mut self.path
    }

    #[inline]
    pub fn query(&self) -> &Buffer {
        &self.query
    }

    #[inline]
    pub fn query_mut(&mut self) -> &mut Buffer {
        &mut self.query
    }

    #[inline]
    pub fn body(&self) -> &Buffer {
        &self.body
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut Buffer {
        &mut self.body
    }

    /// Takes every unread body byte out of the message.
    pub fn take_body(&mut self) -> Bytes {
        let len = self.body.size();
        self.body.split_to(len)
    }

    /// Adds a header field. Repeated names are kept, in arrival order.
    pub fn add_header(&mut self, header: HttpHeader) {
        let slot = HeaderSlot { name: header.name().clone(), position: self.headers.len() };
        self.headers.push(header);
        self.header_index.put(slot);
    }

    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&http::HeaderValue> {
        self.header_index.get(name).map(|slot| self.headers[slot.position].value())
    }

    /// Values of every header named `name`, in arrival order.
    pub fn headers_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a http::HeaderValue> + 'a {
        self.header_index.get_all(name).map(|slot| self.headers[slot.position].value())
    }

    pub fn contains_header(&self, name: &str) -> bool {
        self.header_index.contains_key(name)
    }

    /// All headers in arrival order.
    #[inline]
    pub fn headers(&self) -> &[HttpHeader] {
        &self.headers
    }

    #[inline]
    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    /// Drops every header named `name` and returns how many were removed.
    pub fn remove_headers(&mut self, name: &str) -> usize {
        if !self.header_index.contains_key(name) {
            return 0;
        }

        let before = self.headers.len();
        self.headers.retain(|header| !header.name().as_str().eq_ignore_ascii_case(name));
        self.reindex();
        before - self.headers.len()
    }

    /// Puts the message back into its freshly created state, keeping allocations.
    pub fn reset(&mut self) {
        self.method = None;
        self.path.clear();
        self.query.clear();
        self.version = HttpVersion::UNKNOWN;
        self.headers.clear();
        self.header_index.clear();
        self.body.clear();
    }

    /// Builds the `http` request head for this message.
    ///
    /// The URI is the path, followed by `?` and the query when a query was recorded.
    pub fn to_request(&self) -> Result<Request<()>, MessageError> {
        let method = self.method.clone().ok_or(MessageError::MethodUnset)?;
        let version = Version::try_from(self.version)?;

        let mut target = Vec::with_capacity(self.path.size() + self.query.size() + 1);
        target.extend_from_slice(self.path.as_slice());
        if !self.query.is_empty() {
            target.push(b'?');
            target.extend_from_slice(self.query.as_slice());
        }
        let uri = Uri::from_maybe_shared(Bytes::from(target)).map_err(MessageError::invalid_uri)?;

        let mut request = Request::new(());
        *request.method_mut() = method;
        *request.uri_mut() = uri;
        *request.version_mut() = version;

        let headers = request.headers_mut();
        headers.reserve(self.headers.len());
        for header in &self.headers {
            headers.append(header.name().clone(), header.value().clone());
        }

        Ok(request)
    }

    fn reindex(&mut self) {
        self.header_index.clear();
        for (position, header) in self.headers.iter().enumerate() {
            self.header_index.put(HeaderSlot { name: header.name().clone(), position });
        }
    }
}

impl Default for HttpMessage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(name: &str, value: &str) -> HttpHeader {
        HttpHeader::from_bytes(name.as_bytes(), value.as_bytes()).unwrap()
    }

    #[test]
    fn test_new_defaults() {
        let message = HttpMessage::new();

        assert!(message.method().is_none());
        assert_eq!(message.version(), HttpVersion::UNKNOWN);
        assert!(message.http_version().is_none());
        assert!(message.path().capacity() >= DEFAULT_PATH_CAPACITY);
        assert!(message.query().capacity() >= DEFAULT_QUERY_CAPACITY);
        assert!(message.body().capacity() >= DEFAULT_BODY_CAPACITY);
        assert!(message.path().is_empty());
        assert_eq!(message.header_count(), 0);
    }

    #[test]
    fn test_messages_draw_distinct_seeds() {
        let a = HttpMessage::new();
        let b = HttpMessage::new();
        assert_ne!(a.header_index.seed(), b.header_index.seed());
        assert_eq!(a.header_index.bucket_count(), 64);
    }

    #[test]
    fn test_method_and_version() {
        let mut message = HttpMessage::new();
        message.set_method_bytes(b"POST").unwrap();
        message.set_version(1, 0);

        assert_eq!(message.method(), Some(&Method::POST));
        assert_eq!(message.version(), HttpVersion::HTTP_10);
        assert_eq!(message.http_version(), Some(Version::HTTP_10));

        assert_eq!(message.set_method_bytes(b"GE T"), Err(MessageError::InvalidMethod));
        assert_eq!(message.method(), Some(&Method::POST));
    }

    #[test]
    fn test_headers() {
        let mut message = HttpMessage::new();
        message.add_header(header("Host", "localhost"));
        message.add_header(header("Accept", "*/*"));
        message.add_header(header("Set-Cookie", "a=1"));
        message.add_header(header("set-cookie", "b=2"));

        assert_eq!(message.header_count(), 4);
        assert_eq!(message.header("HOST").unwrap(), "localhost");
        assert!(message.contains_header("accept"));
        assert!(!message.contains_header("cookie"));
        assert!(message.header("cookie").is_none());

        let cookies: Vec<_> = message.headers_all("Set-Cookie").collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);

        let names: Vec<_> = message.headers().iter().map(|h| h.name().as_str()).collect();
        assert_eq!(names, vec!["host", "accept", "set-cookie", "set-cookie"]);
    }

    #[test]
    fn test_remove_headers_reindexes() {
        let mut message = HttpMessage::new();
        message.add_header(header("Via", "a"));
        message.add_header(header("Host", "localhost"));
        message.add_header(header("Via", "b"));
        message.add_header(header("Accept", "*/*"));

        assert_eq!(message.remove_headers("via"), 2);
        assert_eq!(message.remove_headers("via"), 0);
        assert_eq!(message.header_count(), 2);
        assert_eq!(message.header("host").unwrap(), "localhost");
        assert_eq!(message.header("accept").unwrap(), "*/*");
    }

    #[test]
    fn test_many_headers() {
        let mut message = HttpMessage::new();
        for i in 0..200 {
            message.add_header(header(&format!("x-header-{i}"), &i.to_string()));
        }

        for i in 0..200 {
            assert_eq!(message.header(&format!("X-Header-{i}")).unwrap(), i.to_string().as_str());
        }
    }

    #[test]
    fn test_body() {
        let mut message = HttpMessage::new();
        message.body_mut().write(b"hello ");
        message.body_mut().write(b"world");

        assert_eq!(message.body().size(), 11);
        assert_eq!(&message.take_body()[..], b"hello world");
        assert!(message.body().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut message = HttpMessage::new();
        message.set_method(Method::PUT);
        message.set_version(1, 1);
        message.path_mut().write(b"/upload");
        message.query_mut().write(b"a=b");
        message.body_mut().write(b"data");
        message.add_header(header("Host", "localhost"));

        message.reset();

        assert!(message.method().is_none());
        assert_eq!(message.version(), HttpVersion::UNKNOWN);
        assert!(message.path().is_empty());
        assert!(message.query().is_empty());
        assert!(message.body().is_empty());
        assert_eq!(message.header_count(), 0);
        assert!(message.header("host").is_none());
    }

    #[test]
    fn test_to_request() {
        let mut message = HttpMessage::new();
        message.set_method(Method::GET);
        message.set_version(1, 1);
        message.path_mut().write(b"/search");
        message.query_mut().write(b"q=rust&page=2");
        message.add_header(header("Host", "localhost"));
        message.add_header(header("Accept", "text/html"));
        message.add_header(header("Accept", "text/plain"));

        let request = message.to_request().unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.uri().path(), "/search");
        assert_eq!(request.uri().query(), Some("q=rust&page=2"));
        assert_eq!(request.headers().get_all("accept").iter().count(), 2);
        assert_eq!(request.headers().get("host").unwrap(), "localhost");
    }

    #[test]
    fn test_to_request_errors() {
        let mut message = HttpMessage::new();
        assert_eq!(message.to_request().unwrap_err(), MessageError::MethodUnset);

        message.set_method(Method::GET);
        assert_eq!(message.to_request().unwrap_err(), MessageError::invalid_version(0, 0));

        message.set_version(1, 1);
        message.path_mut().write(b"/has space");
        assert!(matches!(message.to_request(), Err(MessageError::InvalidUri { .. })));
    }
}
