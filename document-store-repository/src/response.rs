//! Response decoding.
//!
//! Backend responses are decoded into a `serde_json::Value` tree and read
//! through checked projections. A field of the wrong shape is a `ParseError`,
//! never a panic. Caller documents are only decoded once, as a whole batch,
//! into the caller's type.

use document_store_shared::{HitMetadata, SearchResult, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::{StoreError, StoreResult};

/// Acknowledgement returned by document write APIs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WriteAck {
    /// `created`, `updated`, `deleted`, `noop`, ...
    pub result: Option<String>,
    /// Document version after the write.
    #[serde(rename = "_version")]
    pub version: Option<i64>,
    /// Id of the written document.
    #[serde(rename = "_id")]
    pub id: Option<String>,
}

/// Decode the acknowledgement of a successful write.
///
/// Failure here means the write went through but its answer is unreadable,
/// which is reported as `UnexpectedError`.
pub fn decode_write_ack(body: &[u8]) -> StoreResult<WriteAck> {
    serde_json::from_slice(body)
        .map_err(|e| StoreError::unexpected(format!("error parsing the response body: {}", e)))
}

/// Decode a search response into hit metadata and caller documents.
pub fn decode_search<T: DeserializeOwned>(body: &[u8]) -> StoreResult<SearchResult<T>> {
    let tree = parse_tree(body)?;
    let root = object(&tree, "response")?;

    let hits = match root.get("hits") {
        None | Some(Value::Null) => return Ok(SearchResult::no_content()),
        Some(hits) => object(hits, "hits")?,
    };

    let total = match hits.get("total") {
        None | Some(Value::Null) => 0,
        Some(Value::Object(total)) => {
            let value = match total.get("value") {
                Some(value) => count_value(value, "hits.total.value")?,
                None => return Err(StoreError::parse("hits.total has no value")),
            };
            if is_lower_bound(total) {
                warn!(total = value, "Backend reported hits.total as a lower bound");
            }
            value
        }
        // Pre-7.x engines report the total as a bare number
        Some(value) => count_value(value, "hits.total")?,
    };

    let entries: &[Value] = match hits.get("hits") {
        None | Some(Value::Null) => &[],
        Some(Value::Array(entries)) => entries.as_slice(),
        Some(other) => {
            return Err(StoreError::parse(format!(
                "hits.hits: expected an array, found {}",
                kind(other)
            )))
        }
    };

    let mut metadata = Vec::with_capacity(entries.len());
    let mut sources = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        let hit = object(entry, &format!("hits.hits[{}]", position))?;
        metadata.push(hit_metadata(hit, position)?);
        sources.push(hit.get("_source").cloned().unwrap_or(Value::Null));
    }

    let documents: Vec<T> = serde_json::from_value(Value::Array(sources))
        .map_err(|e| StoreError::parse(format!("error decoding hit sources: {}", e)))?;

    Ok(SearchResult {
        status: StatusCode::Success,
        hits: metadata,
        total,
        documents,
    })
}

/// Decode the `count` field of a count response.
pub fn decode_count(body: &[u8]) -> StoreResult<u64> {
    let tree = parse_tree(body)?;
    let root = object(&tree, "response")?;

    match root.get("count") {
        Some(value) => count_value(value, "count"),
        None => Err(StoreError::parse("response has no count field")),
    }
}

/// Decode a document source into the caller's type.
pub fn decode_source<T: DeserializeOwned>(body: &[u8]) -> StoreResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| StoreError::parse(format!("error decoding document source: {}", e)))
}

fn parse_tree(body: &[u8]) -> StoreResult<Value> {
    serde_json::from_slice(body)
        .map_err(|e| StoreError::parse(format!("error parsing the response body: {}", e)))
}

/// Whether `hits.total` only bounds the match count from below
/// (`"relation": "gte"`) instead of stating it exactly.
fn is_lower_bound(total: &Map<String, Value>) -> bool {
    matches!(total.get("relation").and_then(Value::as_str), Some(relation) if relation != "eq")
}

fn hit_metadata(hit: &Map<String, Value>, position: usize) -> StoreResult<HitMetadata> {
    let at = |field: &str| format!("hits.hits[{}].{}", position, field);

    let index = required_str(hit, "_index", &at("_index"))?;
    let id = required_str(hit, "_id", &at("_id"))?;
    let doc_type = optional_str(hit, "_type", &at("_type"))?.unwrap_or_default();

    let score = match hit.get("_score") {
        None | Some(Value::Null) => 0.0,
        Some(value) => value.as_f64().ok_or_else(|| mismatch(&at("_score"), "a number", value))?,
    };

    let sort = match hit.get("sort") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(keys)) => keys.clone(),
        Some(value) => return Err(mismatch(&at("sort"), "an array", value)),
    };

    Ok(HitMetadata {
        index,
        doc_type,
        id,
        score,
        sort,
    })
}

fn object<'a>(value: &'a Value, what: &str) -> StoreResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| mismatch(what, "an object", value))
}

fn required_str(map: &Map<String, Value>, key: &str, what: &str) -> StoreResult<String> {
    optional_str(map, key, what)?.ok_or_else(|| StoreError::parse(format!("{} is missing", what)))
}

fn optional_str(map: &Map<String, Value>, key: &str, what: &str) -> StoreResult<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(value) => Err(mismatch(what, "a string", value)),
    }
}

/// Read a non-negative integer that may be encoded as an integer, an
/// integral float or a numeric string.
fn count_value(value: &Value, what: &str) -> StoreResult<u64> {
    match value {
        Value::Number(n) => {
            if let Some(count) = n.as_u64() {
                return Ok(count);
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
                _ => Err(mismatch(what, "a non-negative integer", value)),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| mismatch(what, "a non-negative integer", value)),
        _ => Err(mismatch(what, "a non-negative integer", value)),
    }
}

fn mismatch(what: &str, expected: &str, found: &Value) -> StoreError {
    StoreError::parse(format!("{}: expected {}, found {}", what, expected, kind(found)))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct DocBody {
        id: String,
        i: i64,
    }

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_decode_search_preserves_order() {
        let body = bytes(json!({
            "took": 3,
            "hits": {
                "total": { "value": 42, "relation": "eq" },
                "max_score": null,
                "hits": [
                    { "_index": "docs", "_type": "_doc", "_id": "c", "_score": null,
                      "_source": { "id": "c", "i": 2 }, "sort": [2] },
                    { "_index": "docs", "_type": "_doc", "_id": "b", "_score": null,
                      "_source": { "id": "b", "i": 1 }, "sort": [1] },
                    { "_index": "docs", "_type": "_doc", "_id": "a", "_score": null,
                      "_source": { "id": "a", "i": 0 }, "sort": [0] }
                ]
            }
        }));

        let result: SearchResult<DocBody> = decode_search(&body).unwrap();

        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(result.total, 42);
        let ids: Vec<&str> = result.hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        let doc_ids: Vec<&str> = result.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(doc_ids, ids);
        let sort_keys: Vec<i64> = result
            .hits
            .iter()
            .map(|h| h.sort[0].as_i64().unwrap())
            .collect();
        assert_eq!(sort_keys, vec![2, 1, 0]);
        assert_eq!(result.hits[0].score, 0.0);
        assert_eq!(result.hits[0].doc_type, "_doc");
    }

    #[test]
    fn test_total_relation() {
        let exact = json!({ "value": 10, "relation": "eq" });
        let bounded = json!({ "value": 10000, "relation": "gte" });
        let bare = json!({ "value": 3 });

        assert!(!is_lower_bound(exact.as_object().unwrap()));
        assert!(is_lower_bound(bounded.as_object().unwrap()));
        assert!(!is_lower_bound(bare.as_object().unwrap()));

        let body = bytes(json!({ "hits": { "total": bounded, "hits": [] } }));
        let result: SearchResult<DocBody> = decode_search(&body).unwrap();
        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(result.total, 10000);
    }

    #[test]
    fn test_decode_search_zero_matches_is_success() {
        let body = bytes(json!({
            "hits": { "total": { "value": 0, "relation": "eq" }, "hits": [] }
        }));

        let result: SearchResult<DocBody> = decode_search(&body).unwrap();

        assert_eq!(result.status, StatusCode::Success);
        assert_eq!(result.total, 0);
        assert!(result.hits.is_empty());
        assert!(result.documents.is_empty());
    }

    #[test]
    fn test_decode_search_without_hits_is_no_content() {
        let body = bytes(json!({ "took": 1, "timed_out": false }));
        let result: SearchResult<DocBody> = decode_search(&body).unwrap();

        assert_eq!(result.status, StatusCode::NoContent);
        assert_eq!(result.total, 0);
        assert!(result.hits.is_empty());
    }

    #[test]
    fn test_decode_search_total_shapes() {
        let legacy = bytes(json!({ "hits": { "total": 7, "hits": [] } }));
        assert_eq!(decode_search::<Value>(&legacy).unwrap().total, 7);

        let float = bytes(json!({ "hits": { "total": { "value": 12.0 }, "hits": [] } }));
        assert_eq!(decode_search::<Value>(&float).unwrap().total, 12);

        let missing = bytes(json!({ "hits": { "hits": [] } }));
        assert_eq!(decode_search::<Value>(&missing).unwrap().total, 0);

        let negative = bytes(json!({ "hits": { "total": -1, "hits": [] } }));
        assert_eq!(
            decode_search::<Value>(&negative).unwrap_err().status(),
            StatusCode::ParseError
        );
    }

    #[test]
    fn test_decode_search_hit_defaults() {
        let body = bytes(json!({
            "hits": {
                "total": { "value": 1 },
                "hits": [ { "_index": "docs", "_id": "1", "_score": 1.25, "_source": { "id": "1", "i": 5 } } ]
            }
        }));

        let result: SearchResult<DocBody> = decode_search(&body).unwrap();
        let hit = &result.hits[0];

        assert_eq!(hit.doc_type, "");
        assert_eq!(hit.score, 1.25);
        assert!(hit.sort.is_empty());
        assert_eq!(result.documents[0], DocBody { id: "1".to_string(), i: 5 });
    }

    #[test]
    fn test_decode_search_bad_hit_metadata_is_parse_error() {
        let body = bytes(json!({
            "hits": { "hits": [ { "_index": "docs", "_id": 7, "_source": {} } ] }
        }));
        let err = decode_search::<Value>(&body).unwrap_err();

        assert_eq!(err.status(), StatusCode::ParseError);
        assert!(err.to_string().contains("hits.hits[0]._id"));

        let body = bytes(json!({ "hits": { "hits": [ { "_id": "1", "_source": {} } ] } }));
        assert_eq!(
            decode_search::<Value>(&body).unwrap_err().status(),
            StatusCode::ParseError
        );
    }

    #[test]
    fn test_decode_search_heterogeneous_sources_fail_once() {
        let body = bytes(json!({
            "hits": {
                "total": { "value": 2 },
                "hits": [
                    { "_index": "docs", "_id": "1", "_source": { "id": "1", "i": 1 } },
                    { "_index": "docs", "_id": "2", "_source": { "id": "2", "i": "two" } }
                ]
            }
        }));

        let err = decode_search::<DocBody>(&body).unwrap_err();
        assert_eq!(err.status(), StatusCode::ParseError);
    }

    #[test]
    fn test_decode_search_malformed_body() {
        let err = decode_search::<Value>(b"{not json").unwrap_err();
        assert_eq!(err.status(), StatusCode::ParseError);

        let err = decode_search::<Value>(b"[1, 2]").unwrap_err();
        assert_eq!(err.status(), StatusCode::ParseError);

        let err = decode_search::<Value>(&bytes(json!({ "hits": "none" }))).unwrap_err();
        assert_eq!(err.status(), StatusCode::ParseError);
    }

    #[test]
    fn test_decode_count() {
        assert_eq!(decode_count(&bytes(json!({ "count": 17 }))).unwrap(), 17);
        assert_eq!(decode_count(&bytes(json!({ "count": 3.0 }))).unwrap(), 3);
        assert_eq!(decode_count(&bytes(json!({ "count": "9" }))).unwrap(), 9);
        assert_eq!(
            decode_count(&bytes(json!({ "_shards": {} }))).unwrap_err().status(),
            StatusCode::ParseError
        );
        assert_eq!(
            decode_count(&bytes(json!({ "count": true }))).unwrap_err().status(),
            StatusCode::ParseError
        );
    }

    #[test]
    fn test_decode_source() {
        let doc: DocBody = decode_source(&bytes(json!({ "id": "x", "i": 3 }))).unwrap();
        assert_eq!(doc, DocBody { id: "x".to_string(), i: 3 });

        let err = decode_source::<DocBody>(&bytes(json!({ "id": "x" }))).unwrap_err();
        assert_eq!(err.status(), StatusCode::ParseError);
    }

    #[test]
    fn test_decode_write_ack() {
        let ack = decode_write_ack(&bytes(json!({
            "_index": "docs", "_id": "1", "_version": 3, "result": "updated"
        })))
        .unwrap();
        assert_eq!(ack.result.as_deref(), Some("updated"));
        assert_eq!(ack.version, Some(3));
        assert_eq!(ack.id.as_deref(), Some("1"));

        let err = decode_write_ack(b"garbage").unwrap_err();
        assert_eq!(err.status(), StatusCode::UnexpectedError);
    }
}
