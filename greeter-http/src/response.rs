//! Rendering handler output for the event source that asked for it
//!
//! Handlers produce an `http::Response<Body>` (usually through [`IntoResponse`]);
//! [`LambdaResponse`] re-shapes it for API Gateway REST, HTTP API or ALB.
//! The canned error bodies every router needs live here too.

use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::alb::AlbTargetGroupResponse;
use aws_lambda_events::event::apigw::{ApiGatewayProxyResponse, ApiGatewayV2httpResponse};
use http::{
    header::{Entry, HeaderMap, HeaderValue, CONTENT_TYPE, SET_COOKIE},
    Response, StatusCode,
};
use serde::Serialize;
use serde_json::json;

use crate::request::RequestOrigin;

/// A handler response encoded for one event source
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum LambdaResponse {
    /// Answer to an API Gateway HTTP API event; `set-cookie` values travel in `cookies`
    ApiGatewayV2(ApiGatewayV2httpResponse),
    /// Answer to an API Gateway REST API event
    ApiGatewayV1(ApiGatewayProxyResponse),
    /// Answer to an ALB target group event, with a `statusDescription` line
    Alb(AlbTargetGroupResponse),
}

impl LambdaResponse {
    pub(crate) fn from_response(origin: RequestOrigin, response: Response<Body>) -> Self {
        let (parts, body) = response.into_parts();
        let status_code = i64::from(parts.status.as_u16());
        let mut headers = parts.headers;

        // binary payloads go out base64 encoded, text as is, nothing for empty
        let (body, binary) = match body {
            Body::Empty => (None, false),
            text @ Body::Text(_) => (Some(text), false),
            bytes @ Body::Binary(_) => (Some(bytes), true),
        };

        match origin {
            RequestOrigin::ApiGatewayV1 => LambdaResponse::ApiGatewayV1(ApiGatewayProxyResponse {
                status_code,
                multi_value_headers: headers.clone(),
                headers,
                body,
                is_base64_encoded: Some(binary),
            }),
            RequestOrigin::ApiGatewayV2 => {
                let cookies = take_cookies(&mut headers);
                LambdaResponse::ApiGatewayV2(ApiGatewayV2httpResponse {
                    status_code,
                    multi_value_headers: headers.clone(),
                    headers,
                    body,
                    is_base64_encoded: Some(binary),
                    cookies,
                })
            }
            RequestOrigin::Alb => LambdaResponse::Alb(AlbTargetGroupResponse {
                status_code,
                status_description: Some(status_line(parts.status)),
                multi_value_headers: headers.clone(),
                headers,
                body,
                is_base64_encoded: binary,
            }),
        }
    }

    /// The status code carried by this response, whatever its origin
    pub fn status_code(&self) -> i64 {
        match self {
            LambdaResponse::ApiGatewayV2(res) => res.status_code,
            LambdaResponse::ApiGatewayV1(res) => res.status_code,
            LambdaResponse::Alb(res) => res.status_code,
        }
    }

    /// The body carried by this response, whatever its origin
    pub fn body(&self) -> Option<&Body> {
        match self {
            LambdaResponse::ApiGatewayV2(res) => res.body.as_ref(),
            LambdaResponse::ApiGatewayV1(res) => res.body.as_ref(),
            LambdaResponse::Alb(res) => res.body.as_ref(),
        }
    }
}

fn take_cookies(headers: &mut HeaderMap) -> Vec<String> {
    match headers.entry(SET_COOKIE) {
        Entry::Occupied(entry) => entry
            .remove_entry_mult()
            .1
            .filter_map(|value| value.to_str().ok().map(str::to_owned))
            .collect(),
        Entry::Vacant(_) => Vec::new(),
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Anything a handler can return
pub trait IntoResponse {
    /// Render `self` as an `http::Response`
    fn into_response(self) -> Response<Body>;
}

impl<B> IntoResponse for Response<B>
where
    B: Into<Body>,
{
    fn into_response(self) -> Response<Body> {
        self.map(Into::into)
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response<Body> {
        Response::new(self.into())
    }
}

impl IntoResponse for &str {
    fn into_response(self) -> Response<Body> {
        Response::new(self.into())
    }
}

impl IntoResponse for serde_json::Value {
    fn into_response(self) -> Response<Body> {
        Json(self).into_response()
    }
}

/// A serializable payload rendered as an `application/json` response
///
/// Serialization failures become a `500 Internal Server Error`.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response<Body> {
        match serde_json::to_string(&self.0) {
            Ok(json) => {
                let mut response = Response::new(Body::from(json));
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                response
            }
            Err(_) => server_error(),
        }
    }
}

/// `{"detail": "<reason>"}` with `status`, the body routers send for 404 and 405
pub fn detail(status: StatusCode) -> Response<Body> {
    let mut response = Json(json!({ "detail": status.canonical_reason().unwrap_or_default() })).into_response();
    *response.status_mut() = status;
    response
}

/// Plain text `500 Internal Server Error`
pub fn server_error() -> Response<Body> {
    let mut response = Response::new(Body::from("Internal Server Error"));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}
