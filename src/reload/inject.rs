//! Middleware that adds the reload client to HTML responses.

use axum::{
    body::Body,
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};

const RELOAD_JS: &str = include_str!("livereload.js");

pub async fn inject_livereload(req: Request, next: Next) -> Response {
    let resp = next.run(req).await;

    let is_html = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"));

    if !is_html {
        return resp;
    }

    let (mut parts, body) = resp.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(inject_script(&String::from_utf8_lossy(&bytes))))
}

/// Insert the client script before `</body>`, else `</html>`, else at the end.
pub(crate) fn inject_script(html: &str) -> String {
    let script = format!("<script>\n{RELOAD_JS}\n</script>");

    match html.rfind("</body>").or_else(|| html.rfind("</html>")) {
        Some(pos) => format!("{}{}\n{}", &html[..pos], script, &html[pos..]),
        None => format!("{html}\n{script}"),
    }
}
