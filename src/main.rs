use anyhow::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = docchat::logging::init();
    docchat::run().await
}
