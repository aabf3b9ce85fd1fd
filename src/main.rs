//! Echo verifier entry point.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    echo_verifier::server::run().await
}
