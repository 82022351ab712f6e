//! ALB and API Gateway request adaptations
//!
//! Every supported event source is folded into a plain `http::Request<Body>`
//! whose URI is absolute (`scheme://host/path?query`) so handlers can log or
//! route on it without knowing which source invoked the function.
use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::alb::AlbTargetGroupRequest;
use aws_lambda_events::event::apigw::{ApiGatewayProxyRequest, ApiGatewayV2httpRequest};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Deserialize;
use std::{borrow::Cow, collections::HashMap, convert::TryFrom};

/// Bytes that may not appear raw in a URI path
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// A decoded path may hold a literal `%`, which must not read as an escape
const DECODED_PATH: &AsciiSet = &PATH.add(b'%');

/// Errors raised while turning a Lambda event into an `http::Request`
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The event payload did not match any supported event source
    #[error("unrecognized event payload: {0}")]
    Json(#[from] serde_json::Error),
    /// The event produced an invalid URI or method
    #[error("invalid request: {0}")]
    Http(#[from] http::Error),
    /// Query string parameters could not be url-encoded
    #[error("unable to encode query string: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),
}

/// One invocation event from any supported http event source
///
/// The order of the variants is notable. Serde will try to deserialize in this order.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum LambdaRequest {
    /// API Gateway REST API proxy event; `path` arrives url-decoded
    ApiGatewayV1(ApiGatewayProxyRequest),
    /// API Gateway HTTP API event; `rawPath` arrives as sent
    ApiGatewayV2(ApiGatewayV2httpRequest),
    /// ALB target group event
    Alb(AlbTargetGroupRequest),
}

impl LambdaRequest {
    /// Return the `RequestOrigin` of the request to determine where the `LambdaRequest`
    /// originated from, so that the appropriate response can be selected based on what
    /// type of response the request origin expects.
    pub fn request_origin(&self) -> RequestOrigin {
        match self {
            LambdaRequest::ApiGatewayV1 { .. } => RequestOrigin::ApiGatewayV1,
            LambdaRequest::ApiGatewayV2 { .. } => RequestOrigin::ApiGatewayV2,
            LambdaRequest::Alb { .. } => RequestOrigin::Alb,
        }
    }
}

/// Represents the origin from which the lambda was requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    /// API Gateway REST API proxy request origin
    ApiGatewayV1,
    /// API Gateway HTTP API request origin
    ApiGatewayV2,
    /// ALB request origin
    Alb,
}

impl TryFrom<LambdaRequest> for http::Request<Body> {
    type Error = RequestError;

    fn try_from(value: LambdaRequest) -> Result<Self, Self::Error> {
        match value {
            LambdaRequest::ApiGatewayV2(ag) => into_api_gateway_v2_request(ag),
            LambdaRequest::ApiGatewayV1(ag) => into_proxy_request(ag),
            LambdaRequest::Alb(alb) => into_alb_request(alb),
        }
    }
}

fn into_api_gateway_v2_request(ag: ApiGatewayV2httpRequest) -> Result<http::Request<Body>, RequestError> {
    let method = ag.request_context.http.method.clone();
    let uri = absolute_uri(
        &ag.headers,
        ag.request_context.domain_name.as_deref(),
        ag.raw_path.as_deref(),
        ag.raw_query_string.as_deref(),
    );

    let mut headers = ag.headers;
    if let Some(cookies) = ag.cookies {
        if let Ok(header_value) = HeaderValue::from_str(&cookies.join(";")) {
            headers.append(http::header::COOKIE, header_value);
        }
    }

    build(uri, method, headers, ag.body.as_deref(), ag.is_base64_encoded)
}

fn into_proxy_request(ag: ApiGatewayProxyRequest) -> Result<http::Request<Body>, RequestError> {
    // multi-valued query string parameters are always a super
    // set of singly valued query string parameters,
    // when present, multi-valued query string parameters are preferred
    let query = if ag.multi_value_query_string_parameters.is_empty() {
        encode_query(single_valued(ag.query_string_parameters))?
    } else {
        encode_query(multi_valued(ag.multi_value_query_string_parameters))?
    };
    let path = ag.path.as_deref().map(|p| encode_path(p, DECODED_PATH));
    let uri = absolute_uri(&ag.headers, None, path.as_deref(), query.as_deref());

    // multi_value_headers is the canonical source of request headers
    let mut headers = ag.multi_value_headers;
    headers.extend(ag.headers);

    build(
        uri,
        ag.http_method,
        headers,
        ag.body.as_deref(),
        ag.is_base64_encoded.unwrap_or_default(),
    )
}

fn into_alb_request(alb: AlbTargetGroupRequest) -> Result<http::Request<Body>, RequestError> {
    let query = if alb.multi_value_query_string_parameters.is_empty() {
        encode_query(single_valued(alb.query_string_parameters))?
    } else {
        encode_query(multi_valued(alb.multi_value_query_string_parameters))?
    };
    let path = alb.path.as_deref().map(|p| encode_path(p, PATH));
    let uri = absolute_uri(&alb.headers, None, path.as_deref(), query.as_deref());

    let mut headers = alb.multi_value_headers;
    headers.extend(alb.headers);

    build(uri, alb.http_method, headers, alb.body.as_deref(), alb.is_base64_encoded)
}

fn build(
    uri: String,
    method: Method,
    headers: HeaderMap,
    body: Option<&str>,
    is_base64_encoded: bool,
) -> Result<http::Request<Body>, RequestError> {
    let mut req = http::Request::builder()
        .uri(uri)
        .method(method)
        .body(body.map_or_else(Body::default, |b| Body::from_maybe_encoded(is_base64_encoded, b)))?;

    // no builder method that sets headers in batch
    *req.headers_mut() = headers;

    Ok(req)
}

fn absolute_uri(headers: &HeaderMap, domain_name: Option<&str>, path: Option<&str>, query: Option<&str>) -> String {
    let scheme = headers
        .get(x_forwarded_proto())
        .and_then(|s| s.to_str().ok())
        .unwrap_or("https");
    let host = headers
        .get(http::header::HOST)
        .and_then(|s| s.to_str().ok())
        .or(domain_name)
        .unwrap_or("localhost");
    let path = match path {
        Some(p) if !p.is_empty() => p,
        _ => "/",
    };

    let mut url = format!("{}://{}{}", scheme, host, path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Escapes what `set` names plus every non-ASCII byte, leaving existing `/` separators alone.
fn encode_path<'a>(path: &'a str, set: &'static AsciiSet) -> Cow<'a, str> {
    utf8_percent_encode(path, set).into()
}

fn single_valued(params: HashMap<String, String>) -> Vec<(String, String)> {
    params.into_iter().collect()
}

fn multi_valued(params: HashMap<String, Vec<String>>) -> Vec<(String, String)> {
    params
        .into_iter()
        .flat_map(|(key, values)| values.into_iter().map(move |value| (key.clone(), value)))
        .collect()
}

/// Url-encodes query pairs, ordered by key. Values of a repeated key keep their order.
fn encode_query(mut pairs: Vec<(String, String)>) -> Result<Option<String>, RequestError> {
    if pairs.is_empty() {
        return Ok(None);
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(Some(serde_urlencoded::to_string(&pairs)?))
}

/// Parses one JSON invocation event and builds its `Request`
pub fn from_str(s: &str) -> Result<crate::Request, RequestError> {
    let event: LambdaRequest = serde_json::from_str(s)?;
    http::Request::try_from(event)
}

fn x_forwarded_proto() -> HeaderName {
    HeaderName::from_static("x-forwarded-proto")
}

#[cfg(test)]
mod tests {
    use super::{absolute_uri, encode_path, encode_query, multi_valued, DECODED_PATH, PATH};
    use http::{header::HOST, HeaderMap, HeaderValue};
    use maplit::hashmap;

    #[test]
    fn uri_defaults_when_headers_are_missing() {
        assert_eq!(absolute_uri(&HeaderMap::new(), None, None, None), "https://localhost/");
        assert_eq!(
            absolute_uri(&HeaderMap::new(), Some("api.example.com"), Some(""), Some("")),
            "https://api.example.com/"
        );
    }

    #[test]
    fn uri_prefers_host_header_over_domain_name() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("greeter.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("http"));
        assert_eq!(
            absolute_uri(&headers, Some("ignored.example.com"), Some("/"), Some("a=1")),
            "http://greeter.example.com/?a=1"
        );
    }

    #[test]
    fn query_is_sorted_and_keeps_repeated_values() {
        let params = hashmap! {
            "tag".to_string() => vec!["b".to_string(), "a".to_string()],
            "name".to_string() => vec!["hello world".to_string()],
        };
        assert_eq!(
            encode_query(multi_valued(params)).expect("failed to encode query"),
            Some("name=hello+world&tag=b&tag=a".to_string())
        );
    }

    #[test]
    fn empty_query_is_omitted() {
        assert_eq!(encode_query(Vec::new()).expect("failed to encode query"), None);
    }

    #[test]
    fn decoded_paths_are_escaped() {
        assert_eq!(encode_path("/hello world", DECODED_PATH), "/hello%20world");
        assert_eq!(encode_path("/café", DECODED_PATH), "/caf%C3%A9");
        assert_eq!(encode_path("/100%", DECODED_PATH), "/100%25");
        assert_eq!(encode_path("/", DECODED_PATH), "/");
    }

    #[test]
    fn raw_paths_keep_their_escapes() {
        assert_eq!(encode_path("/hello%20world", PATH), "/hello%20world");
        assert_eq!(encode_path("/a b", PATH), "/a%20b");
    }
}
