//! Application registry and request dispatch
//!
//! An [`App`] is built once at cold start, then shared read-only by every
//! invocation. Routes match on the exact path and method; anything else gets
//! the default `404`/`405` JSON bodies, and a failing handler becomes a plain
//! `500`.

use crate::config::Metadata;
use futures_util::future::BoxFuture;
use greeter_http::{
    http::{header::ALLOW, HeaderValue, Method, StatusCode},
    lambda::Error,
    response::{detail, server_error},
    Body, Handler, IntoResponse, Request, Response,
};
use std::future::Future;
use tracing::debug;

type BoxHandler = Box<dyn Fn(Request) -> BoxFuture<'static, Result<Response<Body>, Error>> + Send + Sync>;

struct Route {
    method: Method,
    path: String,
    handler: BoxHandler,
}

/// Route bindings plus the metadata describing the application
pub struct App {
    metadata: Metadata,
    routes: Vec<Route>,
}

impl App {
    /// Creates an application without any routes
    pub fn new(metadata: Metadata) -> Self {
        App {
            metadata,
            routes: Vec::new(),
        }
    }

    /// Binds `handler` to requests for `method` on exactly `path`
    pub fn route<F, Fut, R>(mut self, method: Method, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, Error>> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        let handler: BoxHandler = Box::new(
            move |request: Request| -> BoxFuture<'static, Result<Response<Body>, Error>> {
                let fut = handler(request);
                Box::pin(async move { fut.await.map(|res| res.into_response()) })
            },
        );
        self.routes.push(Route {
            method,
            path: path.into(),
            handler,
        });
        self
    }

    /// The application's metadata
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Routes `request` to its handler and renders the outcome.
    ///
    /// Handler failures are rendered as `500 Internal Server Error`; they are
    /// logged by the handler's own guard, not here.
    pub async fn dispatch(&self, request: Request) -> Response<Body> {
        let path = request.uri().path();
        let candidates: Vec<&Route> = self.routes.iter().filter(|route| route.path == path).collect();
        if candidates.is_empty() {
            debug!("no route for {} {}", request.method(), path);
            return detail(StatusCode::NOT_FOUND);
        }

        let route = match candidates.iter().find(|route| route.method == request.method()) {
            Some(route) => *route,
            None => {
                debug!("{} not allowed on {}", request.method(), path);
                let allowed = candidates
                    .iter()
                    .map(|route| route.method.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut response = detail(StatusCode::METHOD_NOT_ALLOWED);
                if let Ok(value) = HeaderValue::from_str(&allowed) {
                    response.headers_mut().insert(ALLOW, value);
                }
                return response;
            }
        };

        match (route.handler)(request).await {
            Ok(response) => response,
            Err(_) => server_error(),
        }
    }
}

impl Handler for App {
    type Response = Response<Body>;

    fn call(&self, request: Request) -> BoxFuture<'_, Result<Response<Body>, Error>> {
        Box::pin(async move { Ok(self.dispatch(request).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::App;
    use crate::config::Metadata;
    use greeter_http::{
        http::{self, header::ALLOW, Method, StatusCode},
        lambda::Error,
        Body, Request,
    };

    fn request(method: Method, uri: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::Empty)
            .expect("failed to build request")
    }

    async fn pong(_: Request) -> Result<&'static str, Error> {
        Ok("pong")
    }

    fn app() -> App {
        App::new(Metadata::default())
            .route(Method::GET, "/ping", pong)
            .route(Method::PUT, "/ping", pong)
    }

    fn text(body: &Body) -> &str {
        match body {
            Body::Text(text) => text,
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn dispatches_on_exact_path_and_method() {
        let response = app().dispatch(request(Method::PUT, "https://localhost/ping")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response.body()), "pong");
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        for uri in &["https://localhost/", "https://localhost/ping/", "https://localhost/pin"] {
            let response = app().dispatch(request(Method::GET, uri)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(text(response.body()), r#"{"detail":"Not Found"}"#);
        }
    }

    #[tokio::test]
    async fn unbound_methods_list_the_allowed_ones() {
        let response = app().dispatch(request(Method::DELETE, "https://localhost/ping")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(ALLOW).and_then(|h| h.to_str().ok()),
            Some("GET, PUT")
        );
        assert_eq!(text(response.body()), r#"{"detail":"Method Not Allowed"}"#);
    }

    #[tokio::test]
    async fn handler_failures_are_server_errors() {
        let app = App::new(Metadata::default()).route(Method::GET, "/", |_: Request| async {
            Err::<String, Error>("boom".into())
        });
        let response = app.dispatch(request(Method::GET, "https://localhost/")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(text(response.body()), "Internal Server Error");
    }
}
