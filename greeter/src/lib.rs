//! A single `GET /` endpoint answering `{"message": "Hello World"}`, served
//! from AWS Lambda through [`greeter_http`].
//!
//! The [`App`] is assembled explicitly by [`app`] and handed to
//! [`greeter_http::run`] by the `bootstrap` binary.

pub mod app;
pub mod config;
pub mod guard;
pub mod logging;
pub mod routes;

pub use crate::app::App;
pub use crate::config::Metadata;

use greeter_http::http::Method;

/// Builds the application with its route bindings
pub fn app(metadata: Metadata) -> App {
    App::new(metadata).route(Method::GET, "/", routes::root)
}
