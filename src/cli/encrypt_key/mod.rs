//! Encrypt-key command - prints the stored form of a provider API key

use std::io::BufRead;

use anyhow::Context;
use clap::Args;

use crate::config::AppConfig;
use crate::infrastructure::crypto::SecretCipher;

#[derive(Args, Clone)]
pub struct EncryptKeyArgs {
    /// Key to encrypt; read from stdin when omitted
    #[arg(long)]
    pub key: Option<String>,
}

/// Encrypt with `secrets.encryption_key` and print the result for `encrypted_api_key`
pub fn run(args: EncryptKeyArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let secret = config
        .secrets
        .encryption_key
        .context("secrets.encryption_key is not configured (set APP__SECRETS__ENCRYPTION_KEY)")?;

    let key = match args.key {
        Some(key) => key,
        None => read_key_from_stdin()?,
    };

    println!("{}", encrypt(&secret, &key)?);

    Ok(())
}

fn encrypt(secret: &str, key: &str) -> anyhow::Result<String> {
    let key = key.trim();
    anyhow::ensure!(!key.is_empty(), "API key must not be empty");

    Ok(SecretCipher::from_secret(secret)?.encrypt(key)?)
}

fn read_key_from_stdin() -> anyhow::Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read API key from stdin")?;

    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_round_trips_through_cipher() {
        let encrypted = encrypt("server-secret", "  sk-test-1\n").unwrap();

        let cipher = SecretCipher::from_secret("server-secret").unwrap();
        assert_eq!(cipher.decrypt(&encrypted).unwrap().expose(), "sk-test-1");
    }

    #[test]
    fn test_encrypt_rejects_blank_key() {
        assert!(encrypt("server-secret", "  ").is_err());
    }
}
