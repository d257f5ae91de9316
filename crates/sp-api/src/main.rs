#[tokio::main]
async fn main() {
    if let Err(err) = sp_api::run().await {
        tracing::error!(error = %err, "sp-api failed");
        std::process::exit(1);
    }
}
