//! Projection specifications: field inclusion/exclusion, array slices, and
//! the reserved pseudo-fields that need explicit opt-in.

use crate::error::{Error, Result};
use crate::path::FieldPath;
use crate::protocol;
use serde_json::{json, Map, Value};

/// Array slice bounds for an included field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    /// First `n` elements (or last `n` when negative).
    First(i64),
    /// `count` elements starting at `start` (negative counts from the end).
    Range { start: i64, count: u64 },
}

#[derive(Debug, Clone, PartialEq)]
struct ProjectionEntry {
    field: String,
    include: bool,
    slice: Option<Slice>,
}

/// An ordered inclusion/exclusion spec limiting which fields results carry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    entries: Vec<ProjectionEntry>,
}

fn is_special(field: &str) -> bool {
    protocol::SPECIAL_PROJECTION_FIELDS.contains(&field)
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(mut self, field: String, include: bool, slice: Option<Slice>) -> Self {
        self.entries.push(ProjectionEntry {
            field,
            include,
            slice,
        });
        self
    }

    fn plain(field: &str) -> Result<()> {
        if is_special(field) {
            return Err(Error::InvalidProjection {
                field: field.to_string(),
                message: "reserved pseudo-field; use include_special/exclude_special".to_string(),
            });
        }
        Ok(())
    }

    /// Include a plain document field. Reserved pseudo-fields must go
    /// through [`include_special`](Projection::include_special) instead.
    pub fn include(self, path: FieldPath) -> Result<Self> {
        let field = path.to_wire();
        Self::plain(&field)?;
        Ok(self.push(field, true, None))
    }

    /// Exclude a plain document field.
    pub fn exclude(self, path: FieldPath) -> Result<Self> {
        let field = path.to_wire();
        Self::plain(&field)?;
        Ok(self.push(field, false, None))
    }

    /// Include the first (or last, when negative) `n` elements of an array
    /// field. A sliced field is always an inclusion.
    pub fn slice_first(self, path: FieldPath, n: i64) -> Result<Self> {
        let field = path.to_wire();
        Self::plain(&field)?;
        Ok(self.push(field, true, Some(Slice::First(n))))
    }

    /// Include `count` elements of an array field starting at `start`.
    pub fn slice(self, path: FieldPath, start: i64, count: u64) -> Result<Self> {
        let field = path.to_wire();
        Self::plain(&field)?;
        Ok(self.push(field, true, Some(Slice::Range { start, count })))
    }

    /// Opt in to one of the reserved pseudo-fields (`_id`, `$similarity`,
    /// `$sortVector`, `$lexical`, `$vectorize`). Fails for any other field.
    pub fn include_special(self, field: &str) -> Result<Self> {
        self.special(field, true)
    }

    /// Opt out of one of the reserved pseudo-fields.
    pub fn exclude_special(self, field: &str) -> Result<Self> {
        self.special(field, false)
    }

    fn special(self, field: &str, include: bool) -> Result<Self> {
        if !is_special(field) {
            return Err(Error::InvalidProjection {
                field: field.to_string(),
                message: format!(
                    "not a reserved pseudo-field; expected one of {}",
                    protocol::SPECIAL_PROJECTION_FIELDS.join(", ")
                ),
            });
        }
        Ok(self.push(field.to_string(), include, None))
    }

    /// Serialize to the wire map: `true`/`false` per field, or a `$slice`
    /// object for sliced inclusions. Pure function of the entry list.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for entry in &self.entries {
            let wire = match entry.slice {
                None => json!(entry.include),
                Some(Slice::First(n)) => json!({ "$slice": n }),
                Some(Slice::Range { start, count }) => json!({ "$slice": [start, count] }),
            };
            map.insert(entry.field.clone(), wire);
        }
        Value::Object(map)
    }
}
