//! Demo that pushes one short message through the configured SMTP relay.

use llm_weekly_digest::EmailSender;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let sender = EmailSender::from_env()?;
    sender
        .send(
            "digest smtp check",
            "If you can read this, SMTP delivery works.",
        )
        .await?;

    println!("test mail sent");
    Ok(())
}
