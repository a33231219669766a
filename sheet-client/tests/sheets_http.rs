//! SheetsRowStore against an in-process mock of the Sheets and token endpoints

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use serde_json::{Value, json};
use sheet_client::{ClientConfig, ClientError, RowStore};

const SPREADSHEET: &str = "sheet-123";

#[derive(Default)]
struct MockState {
    sheets: HashMap<String, Vec<Vec<String>>>,
    token_requests: usize,
    /// Tokens the values endpoint refuses with 401
    rejected_tokens: Vec<String>,
    seen_tokens: Vec<String>,
}

#[derive(Clone, Default)]
struct Mock {
    state: Arc<Mutex<MockState>>,
}

async fn handle(
    State(mock): State<Mock>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = mock.state.lock().unwrap();

    if uri.path() == "/token" {
        let form = String::from_utf8_lossy(&body);
        if !form.contains("grant_type=refresh_token") || !form.contains("refresh_token=r-1") {
            return (StatusCode::BAD_REQUEST, "bad grant").into_response();
        }
        state.token_requests += 1;
        let token = format!("tok-{}", state.token_requests);
        return axum::Json(json!({
            "access_token": token,
            "expires_in": 3600,
            "token_type": "Bearer"
        }))
        .into_response();
    }

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let Some(token) = token else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    state.seen_tokens.push(token.clone());
    if state.rejected_tokens.contains(&token) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let prefix = format!("/v4/spreadsheets/{SPREADSHEET}/values/");
    let Some(rest) = uri.path().strip_prefix(&prefix) else {
        return (StatusCode::NOT_FOUND, "Requested entity was not found.").into_response();
    };
    let rest = percent_decode_str(rest).decode_utf8_lossy().into_owned();

    if let Some(range) = rest.strip_suffix(":clear") {
        if method != Method::POST {
            return StatusCode::METHOD_NOT_ALLOWED.into_response();
        }
        state.sheets.remove(range);
        return axum::Json(json!({ "clearedRange": range })).into_response();
    }

    match method {
        Method::GET => {
            let rows = state.sheets.get(&rest).cloned().unwrap_or_default();
            if rows.is_empty() {
                axum::Json(json!({ "range": rest, "majorDimension": "ROWS" })).into_response()
            } else {
                axum::Json(json!({ "range": rest, "majorDimension": "ROWS", "values": rows }))
                    .into_response()
            }
        }
        Method::PUT => {
            if uri.query() != Some("valueInputOption=RAW") {
                return (StatusCode::BAD_REQUEST, "valueInputOption required").into_response();
            }
            let payload: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(payload["majorDimension"], "ROWS");
            let rows: Vec<Vec<String>> = serde_json::from_value(payload["values"].clone()).unwrap();
            let count = rows.len();
            state.sheets.insert(rest.clone(), rows);
            axum::Json(json!({ "updatedRange": rest, "updatedRows": count })).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

async fn spawn_mock(mock: Mock) -> String {
    let app = Router::new().fallback(handle).with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn oauth_config(base: &str) -> ClientConfig {
    ClientConfig::new(SPREADSHEET)
        .with_base_url(base)
        .with_token_url(format!("{base}/token"))
        .with_oauth("client-1", "secret-1", "r-1")
        .with_timeout(5)
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

#[tokio::test]
async fn test_write_then_fetch_roundtrip() {
    let mock = Mock::default();
    let base = spawn_mock(mock.clone()).await;
    let store = oauth_config(&base).build_row_store().unwrap();

    let rows = vec![row(&["memberId", "email"]), row(&["M1", "a@x.com"])];
    store.write_rows("Annotations", &rows).await.unwrap();

    assert_eq!(store.fetch_rows("Annotations").await.unwrap(), rows);
}

#[tokio::test]
async fn test_overwrite_drops_stale_rows() {
    let mock = Mock::default();
    mock.state.lock().unwrap().sheets.insert(
        "Annotations".into(),
        vec![row(&["h"]), row(&["1"]), row(&["2"]), row(&["3"])],
    );
    let base = spawn_mock(mock.clone()).await;
    let store = oauth_config(&base).build_row_store().unwrap();

    store.write_rows("Annotations", &[row(&["h"])]).await.unwrap();

    assert_eq!(store.fetch_rows("Annotations").await.unwrap(), vec![row(&["h"])]);
}

#[tokio::test]
async fn test_empty_sheet_has_no_rows() {
    let base = spawn_mock(Mock::default()).await;
    let store = oauth_config(&base).build_row_store().unwrap();
    assert!(store.fetch_rows("Members").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sheet_names_with_spaces_are_quoted() {
    let mock = Mock::default();
    let base = spawn_mock(mock.clone()).await;
    let store = oauth_config(&base).build_row_store().unwrap();

    store.write_rows("Front Desk", &[row(&["x"])]).await.unwrap();

    let state = mock.state.lock().unwrap();
    assert!(state.sheets.contains_key("'Front Desk'"));
}

#[tokio::test]
async fn test_access_token_is_cached() {
    let mock = Mock::default();
    let base = spawn_mock(mock.clone()).await;
    let store = oauth_config(&base).build_row_store().unwrap();

    store.fetch_rows("Members").await.unwrap();
    store.fetch_rows("Annotations").await.unwrap();
    store.write_rows("Annotations", &[row(&["x"])]).await.unwrap();

    let state = mock.state.lock().unwrap();
    assert_eq!(state.token_requests, 1);
    assert!(state.seen_tokens.iter().all(|t| t == "tok-1"));
}

#[tokio::test]
async fn test_rejected_token_is_refreshed_once() {
    let mock = Mock::default();
    mock.state.lock().unwrap().rejected_tokens.push("tok-1".into());
    let base = spawn_mock(mock.clone()).await;
    let store = oauth_config(&base).build_row_store().unwrap();

    store.fetch_rows("Members").await.unwrap();

    let state = mock.state.lock().unwrap();
    assert_eq!(state.token_requests, 2);
    assert_eq!(state.seen_tokens, vec!["tok-1".to_string(), "tok-2".to_string()]);
}

#[tokio::test]
async fn test_static_token_is_sent() {
    let mock = Mock::default();
    let base = spawn_mock(mock.clone()).await;
    let store = ClientConfig::new(SPREADSHEET)
        .with_base_url(&base)
        .with_token("fixed")
        .build_row_store()
        .unwrap();

    store.fetch_rows("Members").await.unwrap();

    let state = mock.state.lock().unwrap();
    assert_eq!(state.token_requests, 0);
    assert_eq!(state.seen_tokens, vec!["fixed".to_string()]);
}

#[tokio::test]
async fn test_unknown_spreadsheet_maps_to_not_found() {
    let base = spawn_mock(Mock::default()).await;
    let store = ClientConfig::new("missing")
        .with_base_url(&base)
        .with_token("fixed")
        .build_row_store()
        .unwrap();

    let err = store.fetch_rows("Members").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn test_bad_refresh_token_is_auth_error() {
    let base = spawn_mock(Mock::default()).await;
    let store = ClientConfig::new(SPREADSHEET)
        .with_base_url(&base)
        .with_token_url(format!("{base}/token"))
        .with_oauth("client-1", "secret-1", "wrong")
        .build_row_store()
        .unwrap();

    let err = store.fetch_rows("Members").await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)));
}
