use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Script parsing (OpenAI-compatible chat completions)
    pub openai_api_key: String,
    pub openai_api_base: Option<String>,
    pub parser_model: String,
    pub max_script_chars: usize,
    // Uploads (documents, recording chunks)
    pub max_upload_bytes: usize,
    // Rehearsal playback
    pub auto_advance_delay_ms: u64,
    pub playback_report_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://scene_partner.db".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            openai_api_key: env::var("OPENAI_API_KEY")?,
            openai_api_base: env::var("OPENAI_API_BASE")
                .ok()
                .filter(|base| !base.trim().is_empty()),
            parser_model: env::var("PARSER_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            max_script_chars: env::var("MAX_SCRIPT_CHARS")
                .unwrap_or_else(|_| "100000".to_string())
                .parse()?,
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| "20971520".to_string())
                .parse()?,
            auto_advance_delay_ms: env::var("AUTO_ADVANCE_DELAY_MS")
                .unwrap_or_else(|_| "800".to_string())
                .parse()?,
            playback_report_timeout_secs: env::var("PLAYBACK_REPORT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
