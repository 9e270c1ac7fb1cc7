//! Ordered sort specifications, including vector and hybrid sort modes.

use crate::path::FieldPath;
use crate::protocol;
use serde_json::{json, Map, Value};

/// One sort value: a direction, a similarity vector, or an embedding request.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Ascending,
    Descending,
    /// Sort by similarity against a raw vector.
    Vector(Vec<f32>),
    /// Sort by similarity against a string embedded server-side.
    Vectorize(String),
    /// Combined lexical + vector sort driving a rerank query.
    Hybrid {
        vectorize: Option<String>,
        lexical: Option<String>,
    },
}

/// An ordered multi-key sort. Entry order is sort priority, first to last,
/// and is preserved through cloning and serialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sort {
    entries: Vec<(String, SortValue)>,
}

impl Sort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, SortValue)] {
        &self.entries
    }

    pub fn ascending(mut self, path: FieldPath) -> Self {
        self.entries.push((path.to_wire(), SortValue::Ascending));
        self
    }

    pub fn descending(mut self, path: FieldPath) -> Self {
        self.entries.push((path.to_wire(), SortValue::Descending));
        self
    }

    /// Similarity sort against `values`, under the reserved `$vector` key.
    pub fn vector(mut self, values: Vec<f32>) -> Self {
        self.entries
            .push((protocol::FIELD_VECTOR.to_string(), SortValue::Vector(values)));
        self
    }

    /// Similarity sort against a server-side embedding of `text`.
    pub fn vectorize(mut self, text: impl Into<String>) -> Self {
        self.entries.push((
            protocol::FIELD_VECTORIZE.to_string(),
            SortValue::Vectorize(text.into()),
        ));
        self
    }

    /// Table-only: similarity sort against an explicit vector column.
    pub fn vector_column(mut self, column: FieldPath, values: Vec<f32>) -> Self {
        self.entries.push((column.to_wire(), SortValue::Vector(values)));
        self
    }

    /// Hybrid lexical + vector sort for `findAndRerank`. A single query
    /// string feeds both branches.
    pub fn hybrid(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.entries.push((
            protocol::FIELD_HYBRID.to_string(),
            SortValue::Hybrid {
                vectorize: Some(query.clone()),
                lexical: Some(query),
            },
        ));
        self
    }

    /// Hybrid sort with distinct per-branch queries.
    pub fn hybrid_split(
        mut self,
        vectorize: impl Into<String>,
        lexical: impl Into<String>,
    ) -> Self {
        self.entries.push((
            protocol::FIELD_HYBRID.to_string(),
            SortValue::Hybrid {
                vectorize: Some(vectorize.into()),
                lexical: Some(lexical.into()),
            },
        ));
        self
    }

    /// Serialize to the ordered wire map. Pure function of the entry list.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.entries {
            let wire = match value {
                SortValue::Ascending => json!(1),
                SortValue::Descending => json!(-1),
                SortValue::Vector(values) => json!(values),
                SortValue::Vectorize(text) => json!(text),
                SortValue::Hybrid { vectorize, lexical } => {
                    let mut hybrid = Map::new();
                    if let Some(text) = vectorize {
                        hybrid.insert(protocol::FIELD_VECTORIZE.to_string(), json!(text));
                    }
                    if let Some(text) = lexical {
                        hybrid.insert(protocol::FIELD_LEXICAL.to_string(), json!(text));
                    }
                    Value::Object(hybrid)
                }
            };
            map.insert(key.clone(), wire);
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::field;

    #[test]
    fn test_direction_markers() {
        let sort = Sort::new()
            .ascending(field("name").unwrap())
            .descending(field("age").unwrap());
        assert_eq!(sort.to_value(), json!({"name": 1, "age": -1}));
    }

    #[test]
    fn test_order_preserved() {
        let sort = Sort::new()
            .descending(field("z").unwrap())
            .ascending(field("a").unwrap());
        let value = sort.to_value();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a"]);
    }

    #[test]
    fn test_vector_sort() {
        let sort = Sort::new().vector(vec![0.1, 0.2]);
        let value = sort.to_value();
        assert!(value.as_object().unwrap().contains_key("$vector"));
    }

    #[test]
    fn test_hybrid_sort() {
        let sort = Sort::new().hybrid("coffee machines");
        assert_eq!(
            sort.to_value(),
            json!({"$hybrid": {"$vectorize": "coffee machines", "$lexical": "coffee machines"}})
        );
    }
}
