//! CRM Demo Binary
//!
//! Runs the accessor walkthrough against a Bitrix24 portal.
//!
//! # Usage
//!
//! ```bash
//! WEBHOOK=https://portal.bitrix24.ru/rest/1/<token>/ cargo run --bin crm-demo
//! ```
//!
//! A `.env` file in the working directory is read first. Without `WEBHOOK`
//! the binary prints a hint and exits without contacting anything.

use interface_cli::{connect_webhook, launch, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut out = std::io::stdout();
    if launch(AppConfig::from_env(), connect_webhook, &mut out).await?.is_none() {
        eprintln!("Set the WEBHOOK environment variable to your Bitrix24 inbound webhook URL");
    }
    Ok(())
}
