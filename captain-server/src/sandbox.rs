//! Rendering of untrusted game payloads.
//!
//! Generated games are arbitrary HTML/JS. They are only ever shown inside a
//! sandbox that drops the host origin: no `allow-same-origin`, so scripts run
//! in an opaque origin without the host's storage, cookies or DOM.

use warp::http::header::{CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS};
use warp::Reply;

/// Policy sent with every standalone game document. The `sandbox` directive
/// applies even when the document is opened directly rather than framed.
pub const SANDBOX_POLICY: &str = "sandbox allow-scripts; \
     default-src 'none'; \
     script-src 'unsafe-inline'; \
     style-src 'unsafe-inline'; \
     img-src data: blob:; \
     font-src data:; \
     media-src data: blob:; \
     connect-src 'none'; \
     form-action 'none'; \
     frame-ancestors 'self'";

/// Token list for `<iframe sandbox>`.
pub const IFRAME_SANDBOX: &str = "allow-scripts";

pub fn sandboxed_document(code: String) -> warp::reply::Response {
    let mut response = warp::reply::html(code).into_response();
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_SECURITY_POLICY,
        warp::http::HeaderValue::from_static(SANDBOX_POLICY),
    );
    headers.insert(
        X_CONTENT_TYPE_OPTIONS,
        warp::http::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        REFERRER_POLICY,
        warp::http::HeaderValue::from_static("no-referrer"),
    );
    headers.insert(CACHE_CONTROL, warp::http::HeaderValue::from_static("no-store"));
    response
}

/// Host page for the gallery: the game framed through [`iframe_markup`].
pub fn embed_page(title: &str, code: &str) -> warp::reply::Response {
    let page = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head>\
         <body style=\"margin:0\">{}</body></html>",
        escape_attribute(title),
        iframe_markup(title, code)
    );

    let mut response = warp::reply::html(page).into_response();
    let headers = response.headers_mut();
    headers.insert(
        X_CONTENT_TYPE_OPTIONS,
        warp::http::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        REFERRER_POLICY,
        warp::http::HeaderValue::from_static("no-referrer"),
    );
    headers.insert(CACHE_CONTROL, warp::http::HeaderValue::from_static("no-store"));
    response
}

/// Inline embed of a game, with the payload escaped into `srcdoc`.
pub fn iframe_markup(title: &str, code: &str) -> String {
    format!(
        r#"<iframe title="{}" sandbox="{}" referrerpolicy="no-referrer" srcdoc="{}"></iframe>"#,
        escape_attribute(title),
        IFRAME_SANDBOX,
        escape_attribute(code)
    )
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
