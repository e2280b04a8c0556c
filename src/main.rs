use anyhow::Result;

use yosh::Launch;

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = yosh::logging::init();
    yosh::run_chat(Launch::PickModel).await
}
