#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pairchat_server::run().await
}
