/*
 * Responsibility
 * - tokio runtime entry; everything else lives in app::run()
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    notes_api::app::run().await
}
