/*
 * Responsibility
 * - Start the tokio runtime
 * - Hand over to app::run() (no logic here)
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    staff_gate::app::run().await
}
