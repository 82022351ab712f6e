#![warn(missing_docs)]
//! Enriches the `lamedh_runtime` crate with [http](https://github.com/hyperium/http)
//! types targeting AWS [ALB](https://docs.aws.amazon.com/elasticloadbalancing/latest/application/introduction.html),
//! [API Gateway](https://docs.aws.amazon.com/apigateway/latest/developerguide/welcome.html) REST and HTTP API
//! lambda integrations.
//!
//! Handlers receive a plain [`Request`] and return anything implementing
//! [`IntoResponse`]. The [`Adapter`] owns the translation between the event
//! source's JSON shapes and those types; the Lambda execution context is not
//! forwarded.
//!
//! # Example
//!
//! ```rust,no_run
//! use greeter_http::{lambda::Error, run, IntoResponse, Request};
//!
//! async fn hello(_: Request) -> Result<impl IntoResponse, Error> {
//!     Ok("👋 world")
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Error> {
//!     run(hello).await
//! }
//! ```

pub use aws_lambda_events::encodings::Body;
pub use http::{self, Response};
pub use lamedh_runtime as lambda;

use futures_util::future::BoxFuture;
use lamedh_runtime::{handler_fn, Context, Error};
use std::{convert::TryFrom, future::Future, sync::Arc};

pub mod request;
pub mod response;

pub use crate::request::{LambdaRequest, RequestError, RequestOrigin};
pub use crate::response::{IntoResponse, Json, LambdaResponse};

/// Type alias for `http::Request`s with a fixed [`Body`] type
pub type Request = http::Request<Body>;

/// Functions serving as ALB and API Gateway REST and HTTP API handlers must conform to this type.
///
/// This can be viewed as a `lamedh_runtime::Handler` constrained to `http` crate `Request` and `Response` types
pub trait Handler: Send + Sync {
    /// The type of Response this Handler will return
    type Response: IntoResponse;
    /// The future response value of this handler
    fn call(&self, request: Request) -> BoxFuture<'_, Result<Self::Response, Error>>;
}

impl<F, R, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync,
    R: IntoResponse,
    Fut: Future<Output = Result<R, Error>> + Send + 'static,
{
    type Response = R;
    fn call(&self, request: Request) -> BoxFuture<'_, Result<R, Error>> {
        Box::pin((self)(request))
    }
}

/// Drives a [`Handler`] from raw Lambda invocation events
///
/// Cloning is cheap: clones share the wrapped handler.
pub struct Adapter<H: Handler> {
    handler: Arc<H>,
}

impl<H: Handler> Clone for Adapter<H> {
    fn clone(&self) -> Self {
        Adapter {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H: Handler> Adapter<H> {
    /// Wraps a handler so it can be driven by Lambda invocation events
    pub fn new(handler: H) -> Self {
        Adapter {
            handler: Arc::new(handler),
        }
    }

    /// Translates one invocation event into a handler call and the handler's
    /// response back into the shape the event's origin expects.
    pub async fn invoke(&self, event: LambdaRequest) -> Result<LambdaResponse, Error> {
        let request_origin = event.request_origin();
        let request = Request::try_from(event)?;
        let response = self.handler.call(request).await?.into_response();
        Ok(LambdaResponse::from_response(request_origin, response))
    }
}

/// Starts the Lambda Rust runtime and begins polling for events on the
/// [Lambda Runtime APIs](https://docs.aws.amazon.com/lambda/latest/dg/runtimes-api.html),
/// dispatching every event to `handler`.
///
/// Request lifecycle hooks are not supported: the handler is built once, before
/// the first invocation, and the execution context is dropped.
pub async fn run<H>(handler: H) -> Result<(), Error>
where
    H: Handler + 'static,
{
    let adapter = Adapter::new(handler);
    lamedh_runtime::run(handler_fn(move |event: LambdaRequest, _: Context| {
        let adapter = adapter.clone();
        async move { adapter.invoke(event).await }
    }))
    .await
}
