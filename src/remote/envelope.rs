//! Pagination envelope decoding.
//!
//! List endpoints answer with
//! `{ "pagination": { "totalPages": N }, "<items>": [...] }`, where the
//! name of the item array differs per endpoint. Some endpoints nest the
//! whole envelope under a top-level `data` object.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{NearbyError, Result};

use super::Page;

/// Location and response shape of a list endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Path relative to the API base URL
    pub path: String,
    /// Name of the item array in the response envelope
    pub items_field: String,
    /// Name of the search text query parameter
    pub search_param: String,
}

impl Endpoint {
    pub fn new(path: impl Into<String>, items_field: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            items_field: items_field.into(),
            search_param: "search".to_string(),
        }
    }

    pub fn with_search_param(mut self, param: impl Into<String>) -> Self {
        self.search_param = param.into();
        self
    }
}

/// Decode one page from a response body
pub fn decode_page<T: DeserializeOwned>(body: Value, items_field: &str) -> Result<Page<T>> {
    let Value::Object(mut root) = body else {
        return Err(NearbyError::InvalidEnvelope(
            "response body is not an object".to_string(),
        ));
    };

    if !root.contains_key(items_field)
        && let Some(Value::Object(data)) = root.remove("data")
    {
        root = data;
    }

    let items = match root.remove(items_field) {
        Some(Value::Array(items)) => items,
        Some(Value::Null) => Vec::new(),
        Some(_) => {
            return Err(NearbyError::InvalidEnvelope(format!(
                "'{items_field}' is not an array"
            )));
        }
        None => {
            return Err(NearbyError::InvalidEnvelope(format!(
                "missing '{items_field}' array"
            )));
        }
    };

    let total_pages = match root.get("pagination") {
        None | Some(Value::Null) => 1,
        Some(pagination) => read_total_pages(pagination)?,
    };

    let items = items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<Vec<T>, _>>()?;

    Ok(Page { items, total_pages })
}

fn read_total_pages(pagination: &Value) -> Result<u32> {
    let total = pagination
        .get("totalPages")
        .ok_or_else(|| NearbyError::InvalidEnvelope("missing pagination.totalPages".to_string()))?;

    total
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            NearbyError::InvalidEnvelope(format!(
                "pagination.totalPages must be a non-negative integer, got {total}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Brand {
        id: u32,
        name: String,
    }

    #[test]
    fn test_decode_named_items_field() {
        let body = json!({
            "pagination": { "totalPages": 3, "currentPage": 1 },
            "brands": [ { "id": 1, "name": "Acme" }, { "id": 2, "name": "Globex" } ]
        });
        let page: Page<Brand> = decode_page(body, "brands").unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].name, "Globex");
    }

    #[test]
    fn test_decode_nested_data() {
        let body = json!({
            "data": {
                "pagination": { "totalPages": 1 },
                "communicationMessages": [ { "subject": "hi" } ]
            }
        });
        let page: Page<Value> = decode_page(body, "communicationMessages").unwrap();
        assert_eq!(page.items, vec![json!({ "subject": "hi" })]);
    }

    #[test]
    fn test_missing_pagination_means_single_page() {
        let page: Page<Value> = decode_page(json!({ "cities": [] }), "cities").unwrap();
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_null_items_is_empty() {
        let body = json!({ "pagination": { "totalPages": 0 }, "invoices": null });
        let page: Page<Value> = decode_page(body, "invoices").unwrap();
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_malformed_envelopes() {
        assert!(matches!(
            decode_page::<Value>(json!([1, 2]), "stores"),
            Err(NearbyError::InvalidEnvelope(_))
        ));
        assert!(matches!(
            decode_page::<Value>(json!({ "malls": [] }), "stores"),
            Err(NearbyError::InvalidEnvelope(_))
        ));
        assert!(matches!(
            decode_page::<Value>(json!({ "stores": {} }), "stores"),
            Err(NearbyError::InvalidEnvelope(_))
        ));
        assert!(matches!(
            decode_page::<Value>(
                json!({ "pagination": { "totalPages": -1 }, "stores": [] }),
                "stores"
            ),
            Err(NearbyError::InvalidEnvelope(_))
        ));
        assert!(matches!(
            decode_page::<Value>(json!({ "pagination": {}, "stores": [] }), "stores"),
            Err(NearbyError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn test_item_shape_mismatch_is_json_error() {
        let body = json!({ "brands": [ { "id": "not-a-number", "name": "x" } ] });
        assert!(matches!(
            decode_page::<Brand>(body, "brands"),
            Err(NearbyError::Json(_))
        ));
    }
}
