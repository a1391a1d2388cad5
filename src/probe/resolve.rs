//! Backend identity extraction from a response.

use serde_json::Value;

use crate::types::MISSING_ORIGIN;

/// Body fields checked, in order, when the identity header is absent.
const BODY_FIELDS: [&str; 3] = ["originId", "origin", "id"];

/// Resolve the serving backend id.
///
/// Precedence: non-empty header, then the first usable body field, then the
/// `missing origin header` sentinel. A body that is not JSON counts as no identity.
pub fn resolve_origin_id(header: Option<&str>, body: &str) -> String {
    if let Some(id) = header.map(str::trim).filter(|h| !h.is_empty()) {
        return id.to_string();
    }

    from_body(body).unwrap_or_else(|| MISSING_ORIGIN.to_string())
}

fn from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    BODY_FIELDS
        .iter()
        .filter_map(|field| value.get(*field))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
