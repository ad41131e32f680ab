use crate::auth::token::MIN_SECRET_BYTES;
use crate::cli::actions::Action;
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let token_secret = matches
        .get_one::<String>("token-secret")
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --token-secret"))?;

    // Refuse to start with a weak signing key.
    if token_secret.len() < MIN_SECRET_BYTES {
        anyhow::bail!(
            "token secret must be at least {MIN_SECRET_BYTES} bytes, got {}",
            token_secret.len()
        );
    }

    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
        token_secret: SecretString::from(token_secret),
        insecure_cookies: matches.get_flag("insecure-cookies"),
    })
}
