use std::env;

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub api_key: String,
    pub domain: String,
    pub from: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub access_token_secret: String,
    pub token_ttl_minutes: i64,
    pub stripe_secret_key: Option<String>,
    pub mail: Option<MailConfig>,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = non_empty("DATABASE_URL");
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let access_token_secret = env::var("ACCESS_TOKEN")?;
        let token_ttl_minutes = env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(60);

        let mail = match (non_empty("EMAIL_SEND_API"), non_empty("EMAIL_SEND_DOMAIN")) {
            (Some(api_key), Some(domain)) => Some(MailConfig {
                from: non_empty("EMAIL_FROM").unwrap_or_else(|| format!("no-reply@{domain}")),
                api_key,
                domain,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            bind_addr,
            access_token_secret,
            token_ttl_minutes,
            stripe_secret_key: non_empty("STRIPE_SECRET_KEY"),
            mail,
        })
    }
}
