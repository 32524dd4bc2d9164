use std::fmt;

use http::Version;

use super::MessageError;

/// Protocol version as the parser read it from the request line.
///
/// `0.0` means the version is not known yet. Major and minor are always set together.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpVersion {
    major: u8,
    minor: u8,
}

impl HttpVersion {
    pub const UNKNOWN: HttpVersion = HttpVersion::new(0, 0);
    pub const HTTP_10: HttpVersion = HttpVersion::new(1, 0);
    pub const HTTP_11: HttpVersion = HttpVersion::new(1, 1);

    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    #[inline]
    pub fn major(&self) -> u8 {
        self.major
    }

    #[inline]
    pub fn minor(&self) -> u8 {
        self.minor
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        *self != Self::UNKNOWN
    }
}

impl TryFrom<HttpVersion> for Version {
    type Error = MessageError;

    fn try_from(version: HttpVersion) -> Result<Self, Self::Error> {
        match (version.major, version.minor) {
            (0, 9) => Ok(Version::HTTP_09),
            (1, 0) => Ok(Version::HTTP_10),
            (1, 1) => Ok(Version::HTTP_11),
            (2, 0) => Ok(Version::HTTP_2),
            (3, 0) => Ok(Version::HTTP_3),
            (major, minor) => Err(MessageError::invalid_version(major, minor)),
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}
