use crate::Config;
use eyre::{
    Context as _,
    Result,
};
use std::{
    fmt,
    io::IsTerminal as _,
};

/// The access token sent with every API request.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl ToString) -> Option<Self> {
        let value = value.to_string().trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(***, len={})", self.0.len())
    }
}

/// Whether [`resolve_token`] may ask on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    IfInteractive,
    Never,
}

/// Resolves the token from args / `GITHUB_TOKEN` / the config file, falling
/// back to a masked prompt when stdin is a terminal.
pub fn resolve_token(config: &Config, prompt: Prompt) -> Result<Token> {
    if let Some(token) = config.token.as_ref().and_then(Token::new) {
        return Ok(token);
    }

    if prompt == Prompt::IfInteractive && std::io::stdin().is_terminal() {
        let value = dialoguer::Password::new()
            .with_prompt("GitHub personal access token")
            .interact()
            .context("Failed to read token from terminal")?;
        if let Some(token) = Token::new(value) {
            return Ok(token);
        }
    }

    eyre::bail!("GitHub token is required. Set GITHUB_TOKEN environment variable or pass --token.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_shows_secret() {
        let token = Token::new("ghp_supersecret").unwrap();
        let debug = format!("{token:?}");
        assert!(!debug.contains("supersecret"));
        assert_eq!(token.expose(), "ghp_supersecret");
    }

    #[test]
    fn blank_token_is_none() {
        assert!(Token::new("   ").is_none());
    }

    #[test]
    fn configured_token_wins() {
        let config = Config {
            token: Some("abc".to_string()),
            ..Config::default()
        };
        assert_eq!(resolve_token(&config, Prompt::Never).unwrap().expose(), "abc");
    }

    #[test]
    fn missing_token_without_prompt_fails() {
        let config = Config {
            token: None,
            ..Config::default()
        };
        assert!(resolve_token(&config, Prompt::Never).is_err());
    }
}
