use anyhow::{bail, Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Password;
use std::env;
use std::io::IsTerminal;

const API_KEY_ENV_VAR: &str = "MODEL_API_KEY";

/// Loads the Model API key from the environment or interactively prompts the user.
/// The key must belong to the configured Model API domain.
pub(crate) fn load_api_key() -> Result<String> {
    if let Ok(api_key) = env::var(API_KEY_ENV_VAR) {
        if !api_key.trim().is_empty() {
            return Ok(api_key);
        }
    }

    if !std::io::stdin().is_terminal() {
        bail!(
            "{} is not set and no TTY available to prompt. Set it in the environment or the env file.",
            API_KEY_ENV_VAR
        );
    }

    println!("🔑 The `{API_KEY_ENV_VAR}` environment variable is not set.");
    println!("Predictions need an API key for the configured Model API domain.");
    println!();

    let api_key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Please enter your Model API key")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model API key cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact()
        .context("Failed to read Model API key input")?;

    Ok(api_key)
}
