//! Filter tree and fluent predicate builders.
//!
//! Filters compile to the Data API's Mongo-style operator grammar:
//! `field("age")?.gt(21)` becomes `{"age": {"$gt": 21}}`, and filters
//! compose into a boolean tree with `and`/`or`/`not` or the `&`, `|`, `!`
//! operators.

use crate::path::FieldPath;
use crate::protocol;
use serde_json::{json, Map, Value};
use std::ops;

/// Comparison operators in the wire grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Exists,
    All,
    Size,
    Contains,
    ContainsKey,
    ContainsEntry,
}

impl Operator {
    /// Wire tag for this operator.
    pub fn tag(&self) -> &'static str {
        match self {
            Operator::Eq => protocol::OP_EQ,
            Operator::Ne => protocol::OP_NE,
            Operator::Gt => protocol::OP_GT,
            Operator::Gte => protocol::OP_GTE,
            Operator::Lt => protocol::OP_LT,
            Operator::Lte => protocol::OP_LTE,
            Operator::In => protocol::OP_IN,
            Operator::Nin => protocol::OP_NIN,
            Operator::Exists => protocol::OP_EXISTS,
            Operator::All => protocol::OP_ALL,
            Operator::Size => protocol::OP_SIZE,
            Operator::Contains => protocol::OP_CONTAINS,
            Operator::ContainsKey => protocol::OP_CONTAINS_KEY,
            Operator::ContainsEntry => protocol::OP_CONTAINS_ENTRY,
        }
    }
}

/// Filter predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// A single comparison leaf.
    Compare {
        path: FieldPath,
        op: Operator,
        value: Value,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    /// Serialize the tree to the nested wire shape. Pure function of the tree.
    pub fn to_value(&self) -> Value {
        match self {
            Filter::Compare { path, op, value } => {
                let mut leaf = Map::new();
                leaf.insert(op.tag().to_string(), value.clone());
                let mut outer = Map::new();
                outer.insert(path.to_wire(), Value::Object(leaf));
                Value::Object(outer)
            }
            Filter::And(children) => {
                json!({ protocol::OP_AND: children.iter().map(Filter::to_value).collect::<Vec<_>>() })
            }
            Filter::Or(children) => {
                json!({ protocol::OP_OR: children.iter().map(Filter::to_value).collect::<Vec<_>>() })
            }
            // $not wraps a single object, not an array.
            Filter::Not(child) => json!({ protocol::OP_NOT: child.to_value() }),
        }
    }
}

impl FieldPath {
    fn compare(self, op: Operator, value: impl Into<Value>) -> Filter {
        Filter::Compare {
            path: self,
            op,
            value: value.into(),
        }
    }

    pub fn eq(self, value: impl Into<Value>) -> Filter {
        self.compare(Operator::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Filter {
        self.compare(Operator::Ne, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Filter {
        self.compare(Operator::Gt, value)
    }

    pub fn gte(self, value: impl Into<Value>) -> Filter {
        self.compare(Operator::Gte, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Filter {
        self.compare(Operator::Lt, value)
    }

    pub fn lte(self, value: impl Into<Value>) -> Filter {
        self.compare(Operator::Lte, value)
    }

    pub fn is_in(self, values: Vec<Value>) -> Filter {
        self.compare(Operator::In, values)
    }

    pub fn nin(self, values: Vec<Value>) -> Filter {
        self.compare(Operator::Nin, values)
    }

    pub fn exists(self, value: bool) -> Filter {
        self.compare(Operator::Exists, value)
    }

    pub fn all(self, values: Vec<Value>) -> Filter {
        self.compare(Operator::All, values)
    }

    /// Match an array field of exactly `len` elements. The length is the
    /// literal argument, never derived from a supplied array.
    pub fn size(self, len: u64) -> Filter {
        self.compare(Operator::Size, len)
    }

    pub fn contains(self, value: impl Into<Value>) -> Filter {
        self.compare(Operator::Contains, value)
    }

    pub fn contains_key(self, key: impl Into<String>) -> Filter {
        self.compare(Operator::ContainsKey, key.into())
    }

    pub fn contains_entry(self, key: impl Into<String>, value: impl Into<Value>) -> Filter {
        self.compare(Operator::ContainsEntry, json!([key.into(), value.into()]))
    }
}

/// Combine filters with AND. Nested AND groups flatten into one argument
/// list, so `and([a, and([b, c])])` and `and([a, b, c])` are the same tree.
pub fn and(filters: Vec<Filter>) -> Filter {
    let mut flat = Vec::with_capacity(filters.len());
    for filter in filters {
        match filter {
            Filter::And(children) => flat.extend(children),
            other => flat.push(other),
        }
    }
    Filter::And(flat)
}

/// Combine filters with OR, flattening nested OR groups.
pub fn or(filters: Vec<Filter>) -> Filter {
    let mut flat = Vec::with_capacity(filters.len());
    for filter in filters {
        match filter {
            Filter::Or(children) => flat.extend(children),
            other => flat.push(other),
        }
    }
    Filter::Or(flat)
}

/// Negate a filter.
pub fn not(filter: Filter) -> Filter {
    Filter::Not(Box::new(filter))
}

impl ops::BitAnd for Filter {
    type Output = Filter;

    fn bitand(self, rhs: Filter) -> Filter {
        and(vec![self, rhs])
    }
}

impl ops::BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Filter) -> Filter {
        or(vec![self, rhs])
    }
}

impl ops::Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        not(self)
    }
}
