//! Verify request building and response handling against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector file lists inputs and the expected outcome. Responses are
//! simulated with an in-memory transport, so no socket is opened.

use std::sync::Mutex;

use bytes::Bytes;
use http::HeaderMap;
use jms_core::{
    ApiError, Client, HttpMethod, HttpRequest, HttpResponse, Pagination, Transport, TransportError,
};

/// Replies with a fixed status and an empty JSON object.
struct FixedStatus(u16);

impl Transport for FixedStatus {
    fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: self.0,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"{}"),
        })
    }
}

/// Records requests and replies 200 with `[]`.
#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<HttpRequest>>,
}

impl Transport for Recorder {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        Ok(HttpResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"[]"),
        })
    }
}

// ---------------------------------------------------------------------------
// URL resolution
// ---------------------------------------------------------------------------

#[test]
fn resolve_test_vectors() {
    let raw = include_str!("../../test-vectors/resolve.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let recorder = Recorder::default();
        let client = Client::new(&recorder, case["base_url"].as_str().unwrap()).unwrap();

        assert_eq!(
            client.base_url().as_str(),
            case["normalized_base"].as_str().unwrap(),
            "{name}: normalized base"
        );

        // normalizing an already normalized base is a no-op
        let again = Client::new(&recorder, client.base_url().as_str()).unwrap();
        assert_eq!(again.base_url(), client.base_url(), "{name}: idempotent");

        let path = case["path"].as_str().unwrap();
        let req = client.new_request::<()>(HttpMethod::Get, path, None).unwrap();
        assert_eq!(req.url.as_str(), case["expected_url"].as_str().unwrap(), "{name}: url");
        assert_eq!(req.header("content-type"), Some("application/json"), "{name}: content-type");

        // dispatching sends exactly the built URL
        client.get::<Vec<serde_json::Value>>(path).unwrap();
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].url, req.url, "{name}: dispatched url");
    }
}

// ---------------------------------------------------------------------------
// Link headers
// ---------------------------------------------------------------------------

#[test]
fn link_test_vectors() {
    let raw = include_str!("../../test-vectors/link.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let p = Pagination::from_link(case["header"].as_str().unwrap());
        let expected = &case["expected"];

        assert_eq!(u64::from(p.next_page), expected["next"].as_u64().unwrap(), "{name}: next");
        assert_eq!(u64::from(p.prev_page), expected["prev"].as_u64().unwrap(), "{name}: prev");
        assert_eq!(u64::from(p.first_page), expected["first"].as_u64().unwrap(), "{name}: first");
        assert_eq!(u64::from(p.last_page), expected["last"].as_u64().unwrap(), "{name}: last");
    }
}

// ---------------------------------------------------------------------------
// Status classification
// ---------------------------------------------------------------------------

#[test]
fn status_test_vectors() {
    let raw = include_str!("../../test-vectors/status.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let status = case["status"].as_u64().unwrap() as u16;
        let success = case["success"].as_bool().unwrap();

        let client = Client::new(FixedStatus(status), "http://localhost/").unwrap();
        let result = client.get::<serde_json::Value>("anything/");

        if success {
            let resp = result.unwrap();
            assert_eq!(resp.status, status);
        } else {
            match result.unwrap_err() {
                ApiError::RequestFailed {
                    status: code,
                    response,
                } => {
                    assert_eq!(code, status, "{status}: error code");
                    assert_eq!(response.status, status, "{status}: envelope status");
                }
                other => panic!("{status}: unexpected {other:?}"),
            }
        }
    }
}
