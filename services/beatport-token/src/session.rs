//! Interactive token session
//!
//! Mirrors what an operator does by hand: reuse the stored token if it is
//! still good (optionally checking it against the introspection endpoint),
//! otherwise log in with the environment credentials and store a new one.
//! Input and output are injected so the flow runs against in-memory buffers
//! in tests.

use anyhow::Result;
use beatport_auth::{Credentials, Error as AuthError, TokenManager};
use common::Secret;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Characters of a token shown on screen.
const TOKEN_PREVIEW_CHARS: usize = 10;

/// Run one interactive session.
///
/// `credentials` is only called when a new token has to be acquired.
pub async fn run<R, W, F>(
    manager: &TokenManager,
    credentials: F,
    mut input: R,
    mut output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    F: FnOnce() -> common::Result<Credentials>,
{
    say(&mut output, "Beatport API Token Manager\n--------------------------\n").await?;

    let need_new_token = match manager.get_valid_token().await {
        Ok(token) => {
            say(
                &mut output,
                &format!("Using existing token: {} (truncated)\n", preview(token)),
            )
            .await?;
            say(
                &mut output,
                "Would you like to:\n1. Test the token\n2. Get a new token\nEnter choice (1 or 2): ",
            )
            .await?;

            match read_answer(&mut input).await?.as_str() {
                "1" => {
                    test_token(manager, &mut output).await?;
                    false
                }
                "2" => true,
                other => {
                    debug!(choice = other, "no action chosen");
                    false
                }
            }
        }
        Err(AuthError::NotAuthenticated(reason)) => {
            say(&mut output, &format!("No stored token ({reason}).\n")).await?;
            true
        }
        Err(e) => {
            say(&mut output, &format!("Stored token unusable: {e}\n")).await?;
            print_body(&mut output, &e).await?;
            true
        }
    };

    if !need_new_token {
        return Ok(());
    }

    say(
        &mut output,
        "Using BEATPORT_USERNAME and BEATPORT_PASSWORD from the environment\n",
    )
    .await?;
    let credentials = credentials()?;

    let record = match manager.acquire_token(&credentials).await {
        Ok(record) => record,
        Err(e) => {
            say(&mut output, &format!("Failed to obtain token: {e}\n")).await?;
            print_body(&mut output, &e).await?;
            return Err(e.into());
        }
    };

    say(
        &mut output,
        &format!(
            "Successfully obtained token: {} (truncated)\n",
            preview(record.access_token)
        ),
    )
    .await?;
    say(&mut output, "Would you like to test the token? (y/n): ").await?;

    if read_answer(&mut input).await?.eq_ignore_ascii_case("y") {
        test_token(manager, &mut output).await?;
    }

    Ok(())
}

async fn test_token<W: AsyncWrite + Unpin>(manager: &TokenManager, output: &mut W) -> Result<()> {
    match manager.introspect().await {
        Ok(result) => {
            let pretty = serde_json::to_string_pretty(&result)?;
            say(output, &format!("\nAPI Test Result:\n{pretty}\n")).await?;
        }
        Err(e) => {
            say(output, &format!("API test failed: {e}\n")).await?;
            print_body(output, &e).await?;
        }
    }
    Ok(())
}

fn preview(token: String) -> String {
    Secret::new(token).preview(TOKEN_PREVIEW_CHARS)
}

async fn print_body<W: AsyncWrite + Unpin>(output: &mut W, error: &AuthError) -> Result<()> {
    if let Some(body) = error.body() {
        say(output, &format!("Response: {body}\n")).await?;
    }
    Ok(())
}

async fn say<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}

/// Next input line, trimmed. End of input reads as an empty answer.
async fn read_answer<R: AsyncBufRead + Unpin>(input: &mut R) -> std::io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line).await?;
    Ok(line.trim().to_string())
}
