//! Interactive sign-in that mints the session the daily digest runs on.
//! Writes the session file and prints the base64 blob for deployments.

use std::io::{BufRead, Write};

use anyhow::Context;
use grammers_client::{Client, Config, SignInError};
use grammers_session::Session;
use tg_digest::core::ApiCredentials;
use tg_digest::telegram::session;
use tracing::info;

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{message}");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;

    Ok(input.trim().to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tg_digest::setup_logging();

    let credentials = ApiCredentials::from_env()?;

    let client = Client::connect(Config {
        session: Session::load_file_or_create(&credentials.session_file)?,
        api_id: credentials.api_id,
        api_hash: credentials.api_hash.clone(),
        params: Default::default(),
    })
    .await
    .context("failed to connect to Telegram")?;

    if client.is_authorized().await? {
        info!("Already authorized");
    } else {
        let phone = prompt("Enter your phone number (e.g., +1234567890): ")?;
        let token = client.request_login_code(&phone).await?;

        let code = prompt("Enter the code you received: ")?;
        match client.sign_in(&token, &code).await {
            Ok(_user) => {}
            Err(SignInError::PasswordRequired(password_token)) => {
                let password = prompt("2FA is enabled. Enter your password: ")?;
                client
                    .check_password(password_token, password.trim())
                    .await?;
            }
            Err(e) => return Err(e.into()),
        }
        info!("Signed in successfully");
    }

    let me = client.get_me().await?;
    info!("Session belongs to {}", me.full_name());

    client
        .session()
        .save_to_file(&credentials.session_file)
        .with_context(|| format!("failed to write {}", credentials.session_file.display()))?;
    info!(file = %credentials.session_file.display(), "Session saved");

    println!();
    println!("{}", "=".repeat(60));
    println!("Store this as the TELEGRAM_SESSION secret:");
    println!("{}", "=".repeat(60));
    println!("{}", session::encode(client.session()));
    println!("{}", "=".repeat(60));

    Ok(())
}
