//! opr - command-line access to Oprand data

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    opr_cli::run().await
}
