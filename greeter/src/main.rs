use greeter::Metadata;
use greeter_http::lambda::Error;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    greeter::logging::init()?;

    let app = greeter::app(Metadata::default());
    let metadata = app.metadata();
    info!("{} {}: {}", metadata.title, metadata.version, metadata.description);

    greeter_http::run(app).await
}
