//! Cache-discipline headers every gateway response carries — stale moves
//! and stale coaching data are both unacceptable.

use axum::http::{HeaderMap, HeaderValue};

pub fn no_store_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "cache-control",
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    headers.insert("pragma", HeaderValue::from_static("no-cache"));
    headers.insert("expires", HeaderValue::from_static("0"));
    headers
}
