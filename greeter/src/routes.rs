//! Route handlers

use crate::guard;
use greeter_http::{lambda::Error, Json, Request};
use serde::Serialize;
use tracing::info;

/// Body returned by the root endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Greeting {
    /// The greeting text
    pub message: &'static str,
}

impl Greeting {
    /// The one greeting this service hands out
    pub const HELLO: Greeting = Greeting { message: "Hello World" };
}

/// `GET /`
pub async fn root(request: Request) -> Result<Json<Greeting>, Error> {
    info!("Processing root endpoint request from {}", request.uri());
    guard::logged(async { Ok(Json(Greeting::HELLO)) }).await
}

#[cfg(test)]
mod tests {
    use super::{root, Greeting};
    use greeter_http::{http, Body};

    #[tokio::test]
    async fn root_ignores_request_contents() {
        let request = http::Request::builder()
            .uri("https://localhost/?name=rust")
            .header("x-anything", "1")
            .body(Body::from("ignored"))
            .expect("failed to build request");

        let greeting = root(request).await.expect("root failed");
        assert_eq!(greeting.0, Greeting::HELLO);
    }

    #[test]
    fn greeting_serializes_to_a_single_field() {
        assert_eq!(
            serde_json::to_string(&Greeting::HELLO).expect("failed to serialize"),
            r#"{"message":"Hello World"}"#
        );
    }
}
