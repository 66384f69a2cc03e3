use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Outbound email settings. Absent when the mail env vars are not set;
/// the mailer then degrades to a no-op.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u32,
    /// Key clients by `x-forwarded-for` instead of the peer address.
    /// Only safe behind a proxy that overwrites the header; a direct
    /// client could otherwise rotate it and dodge the limiter.
    pub trust_proxy: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub frontend_url: String,
    pub jwt: JwtConfig,
    pub mail: Option<MailConfig>,
    pub rate_limit: RateLimitConfig,
    /// Gate login on a verified email address. The previous deployment ran
    /// with this off while existing accounts migrated; stays off by default
    /// until the final policy is confirmed.
    pub require_verified_email: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".into());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "voicedo".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "voicedo-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let mail = match (
            std::env::var("MAIL_API_URL"),
            std::env::var("MAIL_API_KEY"),
            std::env::var("MAIL_FROM"),
        ) {
            (Ok(api_url), Ok(api_key), Ok(from_address)) => Some(MailConfig {
                api_url,
                api_key,
                from_address,
            }),
            _ => {
                tracing::warn!("mail env vars missing; email sending disabled");
                None
            }
        };
        let rate_limit = RateLimitConfig {
            window_secs: std::env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(600),
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(15),
            trust_proxy: std::env::var("RATE_LIMIT_TRUST_PROXY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };
        let require_verified_email = std::env::var("REQUIRE_VERIFIED_EMAIL")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        Ok(Self {
            database_url,
            frontend_url,
            jwt,
            mail,
            rate_limit,
            require_verified_email,
        })
    }
}
