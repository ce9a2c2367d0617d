use std::time::Instant;

use axum::{
    body::{Body, HttpBody, to_bytes},
    http::{Request, header},
    middleware::Next,
    response::Response,
};

// 5xx 响应体最多记录这么多字节
const ERROR_BODY_LIMIT: usize = 1024;

/// 记录每个请求的方法、路径、状态码和耗时，服务端错误连同响应体一起记录
pub async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if !status.is_server_error() {
        if status.is_client_error() {
            tracing::warn!(%method, %path, status = status.as_u16(), elapsed_ms, "Request rejected");
        } else {
            tracing::info!(%method, %path, status = status.as_u16(), elapsed_ms, "Request processed");
        }
        return response;
    }

    // 长度未知或超过上限的响应体原样返回，不做缓冲
    let buffered = response
        .body()
        .size_hint()
        .exact()
        .is_some_and(|len| len <= ERROR_BODY_LIMIT as u64);
    if !buffered {
        tracing::error!(
            %method,
            %path,
            status = status.as_u16(),
            elapsed_ms,
            "Server error occurred (body not logged)"
        );
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, ERROR_BODY_LIMIT).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(%method, %path, "Failed to read error response body: {}", e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    tracing::error!(
        %method,
        %path,
        status = status.as_u16(),
        elapsed_ms,
        body = %String::from_utf8_lossy(&bytes),
        "Server error occurred"
    );

    // 响应体已被读出，重新构建
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
