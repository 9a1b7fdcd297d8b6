//! Authentication commands.
//!
//! `login` exchanges email and password for a session token and keeps it in
//! the token file; `logout` removes it.

use clap::{Args, Subcommand};
use std::io::{self, Write};

use setlog_core::TokenStore;

use super::{http_gateway, token_store};
use crate::config::Config;

/// Authentication commands
#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Log in with email and password
    Login {
        /// Account email (prompted if omitted)
        #[arg(long)]
        email: Option<String>,

        /// Account password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out (remove the stored session token)
    Logout,
    /// Show authentication status
    Status,
}

impl AuthCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AuthSubcommand::Login { email, password } => {
                login(config, email.as_deref(), password.as_deref()).await
            }
            AuthSubcommand::Logout => logout(config),
            AuthSubcommand::Status => {
                status(config);
                Ok(())
            }
        }
    }
}

async fn login(
    config: &Config,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = http_gateway(config)?;

    let email = match email {
        Some(email) => email.to_string(),
        None => prompt("Enter your email: ")?,
    };
    let password = match password {
        Some(password) => password.to_string(),
        None => prompt("Enter your password: ")?,
    };

    let session = gateway.authenticate(&email, &password).await?;
    tracing::info!(email = %email, "logged in");

    if session.message.is_empty() {
        println!("Logged in as {}", email);
    } else {
        println!("{}", session.message);
    }
    Ok(())
}

fn logout(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let tokens = token_store(config);
    if tokens.load().is_none() {
        println!("Not logged in.");
        return Ok(());
    }
    tokens.clear()?;
    println!("Logged out.");
    Ok(())
}

fn status(config: &Config) {
    match token_store(config).load() {
        Some(token) => println!("Logged in (token: {})", mask_token(&token)),
        None if config.api_url.value.is_some() => {
            println!("Not logged in. Run 'setlog auth login' to authenticate.")
        }
        None => println!("Not configured. Set api_url in config first."),
    }
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_string();
    if input.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Input cannot be empty",
        ));
    }
    Ok(input)
}

/// Shows only the ends of a token.
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "****".to_string()
    }
}
