use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = yosh::logging::init();
    yosh::run_engines_listing().await
}
