//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ObjectId`] - Content-derived identifier of a blob or commit
//! - [`BranchName`] - Validated branch name
//! - [`Timestamp`] - Commit time with whole-second precision
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use vms::core::types::{BranchName, ObjectId};
//!
//! let branch = BranchName::new("feature/my-branch").unwrap();
//! let id = ObjectId::new("ab".repeat(32)).unwrap();
//! assert_eq!(id.prefix(2), "ab");
//!
//! assert!(BranchName::new("has space").is_err());
//! assert!(ObjectId::new("not-a-sha").is_err());
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

/// A content-derived object identifier (SHA-256, lowercase hex).
///
/// Blob ids are the digest of the file bytes; commit ids are the digest of
/// the canonical commit serialization (see [`crate::core::hash`]).
///
/// # Example
///
/// ```
/// use vms::core::types::ObjectId;
///
/// let id = ObjectId::new("AB".repeat(32)).unwrap();
/// assert_eq!(id.as_str(), "ab".repeat(32));
/// assert_eq!(id.short(7), "abababa");
/// assert_eq!(id.prefix(2), "ab");
/// assert_eq!(id.suffix(2).len(), 62);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Length of a full identifier in hex characters.
    pub const HEX_LEN: usize = 64;

    /// Create a new validated object id.
    ///
    /// The id is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidObjectId` if the string is not 64 hex characters.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into().to_ascii_lowercase();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Build an id from a raw digest.
    pub(crate) fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    /// Get an abbreviated form of the id.
    ///
    /// Returns the first `len` characters, or the full id if `len` exceeds it.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// The shard directory name for this id.
    pub fn prefix(&self, prefix_len: usize) -> &str {
        self.short(prefix_len)
    }

    /// The file name of this id inside its shard directory.
    pub fn suffix(&self, prefix_len: usize) -> &str {
        let start = prefix_len.min(self.0.len());
        &self.0[start..]
    }

    fn validate(id: &str) -> Result<(), TypeError> {
        if id.len() != Self::HEX_LEN {
            return Err(TypeError::InvalidObjectId(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidObjectId(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated branch name.
///
/// A name is stored as the file `branches/<name>`, so it may nest with `/`
/// but every component must be a plain file name: non-empty, not starting
/// with `.`, and free of whitespace, control characters, and characters
/// that are special on common filesystems or shells. A leading `-` is
/// rejected so names never parse as flags.
///
/// # Example
///
/// ```
/// use vms::core::types::BranchName;
///
/// let name = BranchName::new("feature/login").unwrap();
/// assert_eq!(name.as_str(), "feature/login");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("release/.hidden").is_err());
/// assert!(BranchName::new("two words").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

/// Characters a branch name may never contain.
const FORBIDDEN_BRANCH_CHARS: &[char] = &['\\', ':', '*', '?', '"', '<', '>', '|', '~', '^'];

/// Longest accepted name, in bytes.
const MAX_BRANCH_NAME_LEN: usize = 200;

impl BranchName {
    /// Validate and wrap `name`.
    ///
    /// # Errors
    ///
    /// [`TypeError::InvalidBranchName`] with the first rule the name breaks.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name).map_err(|reason| {
            TypeError::InvalidBranchName(format!("'{}': {}", name.escape_debug(), reason))
        })?;
        Ok(Self(name))
    }

    /// Wrap a compile-time constant known to pass validation.
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(Self::validate(name).is_ok());
        Self(name.to_string())
    }

    fn validate(name: &str) -> Result<(), String> {
        if name.is_empty() {
            return Err("name is empty".into());
        }
        if name.len() > MAX_BRANCH_NAME_LEN {
            return Err(format!("longer than {} bytes", MAX_BRANCH_NAME_LEN));
        }
        if name.starts_with('-') {
            return Err("starts with '-'".into());
        }
        if let Some(c) = name
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_BRANCH_CHARS.contains(c))
        {
            return Err(format!("contains {:?}", c));
        }
        for component in name.split('/') {
            if component.is_empty() {
                return Err("has an empty path component".into());
            }
            if component.starts_with('.') {
                return Err(format!("component '{}' starts with '.'", component));
            }
        }
        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A commit timestamp, truncated to whole seconds.
///
/// Commit ids hash the timestamp as seconds since the Unix epoch, so the
/// sub-second part is dropped at construction to keep a loaded commit equal
/// to the one that was written.
///
/// # Example
///
/// ```
/// use vms::core::types::Timestamp;
///
/// assert_eq!(Timestamp::epoch().seconds(), 0);
/// let now = Timestamp::now();
/// assert_eq!(Timestamp::from_seconds(now.seconds()).unwrap(), now);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current moment.
    pub fn now() -> Self {
        let seconds = Utc::now().timestamp();
        // Whole seconds from `Utc::now` are always representable.
        Self::from_seconds(seconds).unwrap_or_else(|_| Self::epoch())
    }

    /// The Unix epoch, used by the sentinel commit.
    pub fn epoch() -> Self {
        Self(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Build a timestamp from seconds since the Unix epoch.
    pub fn from_seconds(seconds: i64) -> Result<Self, TypeError> {
        Utc.timestamp_opt(seconds, 0)
            .single()
            .map(Self)
            .ok_or(TypeError::InvalidTimestamp(seconds))
    }

    /// Seconds since the Unix epoch.
    pub fn seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl TryFrom<i64> for Timestamp {
    type Error = TypeError;

    fn try_from(seconds: i64) -> Result<Self, Self::Error> {
        Self::from_seconds(seconds)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.seconds()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%a %b %e %H:%M:%S %Y %z"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod object_id {
        use super::*;

        #[test]
        fn accepts_full_sha256() {
            let id = ObjectId::new("0123456789abcdef".repeat(4)).unwrap();
            assert_eq!(id.as_str().len(), 64);
        }

        #[test]
        fn normalizes_to_lowercase() {
            let id = ObjectId::new("ABCDEF".repeat(10) + "ABCD").unwrap();
            assert!(id.as_str().chars().all(|c| !c.is_ascii_uppercase()));
        }

        #[test]
        fn rejects_sha1_length() {
            assert!(ObjectId::new("a".repeat(40)).is_err());
        }

        #[test]
        fn rejects_non_hex() {
            assert!(ObjectId::new("g".repeat(64)).is_err());
        }

        #[test]
        fn prefix_and_suffix_partition_the_id() {
            let id = ObjectId::new("0123456789abcdef".repeat(4)).unwrap();
            let joined = format!("{}{}", id.prefix(2), id.suffix(2));
            assert_eq!(joined, id.as_str());
            assert_eq!(id.prefix(2), "01");
        }

        #[test]
        fn serde_rejects_invalid() {
            let result: Result<ObjectId, _> = serde_json::from_str("\"nope\"");
            assert!(result.is_err());
        }
    }

    mod branch_name {
        use super::*;

        #[test]
        fn accepts_nested_and_dotted_names() {
            for name in ["master", "feature/login", "v1.2", "fix-123", "me@work", "a..b"] {
                assert!(BranchName::new(name).is_ok(), "{name} should be valid");
            }
        }

        #[test]
        fn rejects_names_unsafe_as_paths() {
            for name in ["", "-f", "/abs", "a//b", "trail/", "..", "x/.git", "tab\there", "star*", "c:d"] {
                assert!(BranchName::new(name).is_err(), "{name:?} should be invalid");
            }
        }

        #[test]
        fn error_names_the_rule() {
            let err = BranchName::new("two words").unwrap_err();
            assert_eq!(
                err,
                TypeError::InvalidBranchName("'two words': contains ' '".into())
            );
            assert!(BranchName::new("x".repeat(MAX_BRANCH_NAME_LEN + 1)).is_err());
        }
    }

    mod timestamp {
        use super::*;

        #[test]
        fn serde_as_seconds() {
            let ts = Timestamp::from_seconds(1_700_000_000).unwrap();
            let json = serde_json::to_string(&ts).unwrap();
            assert_eq!(json, "1700000000");
            let back: Timestamp = serde_json::from_str(&json).unwrap();
            assert_eq!(back, ts);
        }

        #[test]
        fn now_has_no_subsecond_part() {
            let now = Timestamp::now();
            assert_eq!(now.as_datetime().timestamp_subsec_nanos(), 0);
        }
    }
}
