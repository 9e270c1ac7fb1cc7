//! Field-path resolution for filters, sorts and projections.
//!
//! The Data API addresses nested document fields with dot-joined paths
//! ("address.zip_code"). Paths are validated when they are built, so a bad
//! path fails before any request payload exists.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A validated, dot-joined field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a raw dotted path, validating every segment.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::InvalidFieldPath {
                path: raw.to_string(),
                reason: "path is empty".to_string(),
            });
        }

        let mut segments = Vec::new();
        for segment in raw.split('.') {
            validate_segment(raw, segment)?;
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// Build a path from pre-validated segments. Used by the `field_path!`
    /// macro, where segments are identifiers or explicit wire-name literals.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out = Vec::new();
        for segment in segments {
            let segment = segment.into();
            validate_segment(&segment, &segment)?;
            out.push(segment);
        }

        if out.is_empty() {
            return Err(Error::InvalidFieldPath {
                path: String::new(),
                reason: "path is empty".to_string(),
            });
        }

        Ok(Self { segments: out })
    }

    /// Append a nested member to the path.
    pub fn child(mut self, segment: impl Into<String>) -> Result<Self> {
        let segment = segment.into();
        validate_segment(&segment, &segment)?;
        self.segments.push(segment);
        Ok(self)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The dot-joined wire form.
    pub fn to_wire(&self) -> String {
        self.segments.join(".")
    }
}

fn validate_segment(path: &str, segment: &str) -> Result<()> {
    let fail = |reason: &str| {
        Err(Error::InvalidFieldPath {
            path: path.to_string(),
            reason: reason.to_string(),
        })
    };

    if segment.is_empty() {
        return fail("empty path segment");
    }
    if segment.starts_with('$') {
        return fail("segments must not start with '$' (reserved for operators)");
    }
    if segment.chars().any(char::is_whitespace) {
        return fail("segments must not contain whitespace");
    }
    if segment.chars().any(|c| matches!(c, '(' | ')' | '[' | ']')) {
        return fail("path must be a plain member chain, not a call or index expression");
    }

    Ok(())
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for FieldPath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Create a field path from a raw dotted string.
///
/// # Example
/// ```
/// use hazeldb::field;
///
/// let filter = field("address.zip_code")?.eq("10001");
/// # Ok::<(), hazeldb::Error>(())
/// ```
pub fn field(raw: &str) -> Result<FieldPath> {
    FieldPath::parse(raw)
}

/// Build a [`FieldPath`] from member names checked at compile time.
///
/// Segments are plain identifiers; a string literal segment overrides the
/// wire name for fields whose API name is not a Rust identifier:
///
/// ```
/// use hazeldb::field_path;
///
/// let a = field_path!(address.zip_code);
/// let b = field_path!(address."zip-code");
/// ```
#[macro_export]
macro_rules! field_path {
    ($($segment:tt).+) => {
        $crate::FieldPath::from_segments([$($crate::field_path!(@seg $segment)),+])
            .expect("field_path! segments must be valid wire names")
    };
    (@seg $segment:ident) => {
        stringify!($segment)
    };
    (@seg $segment:literal) => {
        $segment
    };
}
