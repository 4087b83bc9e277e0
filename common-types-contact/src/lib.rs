use common_types;

pub type E = Box<dyn ::std::error::Error + Send + Sync + 'static>;

mod routes;
mod middleware;
mod mailer;
mod sheets;

#[allow(non_snake_case)]
pub mod Routes {
    pub use crate::routes::*;
}

#[allow(non_snake_case)]
pub mod Middleware {
    pub use crate::middleware::*;
}

#[allow(non_snake_case)]
pub mod Mailer {
    pub use crate::mailer::*;
}

#[allow(non_snake_case)]
pub mod Sheets {
    pub use crate::sheets::*;
}

#[allow(non_snake_case)]
pub mod Response {
    use axum::{http::StatusCode, Json};
    use super::common_types::SubmitContact::Failure;

    pub type ServerResponse = (StatusCode, Json<Failure>);

    pub fn status_response<E: ToString>(status: StatusCode, error: E) -> ServerResponse {
        (status, Json(Failure::new(error)))
    }

    pub fn internal_server_error<E: ToString>(err: E) -> ServerResponse {
        status_response(StatusCode::INTERNAL_SERVER_ERROR, err)
    }
}

#[allow(non_snake_case)]
pub mod Config {
    use ::std::fmt;
    use thiserror::Error;
    use super::Constants;

    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("No environment variable for {0}")]
        Missing(&'static str),
    }

    fn non_blank<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<String> {
        lookup(key).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
    }

    fn env_lookup(key: &str) -> Option<String> {
        dotenvy::var(key).ok()
    }

    /// Sender account of the mail relay. The relay itself authenticates
    /// through the AWS credential chain.
    #[derive(Debug, Clone)]
    pub struct MailConfig {
        pub from_address: String,
    }

    impl MailConfig {
        pub fn from_env() -> Result<Self, ConfigError> {
            Self::from_lookup(env_lookup)
        }

        pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
            let from_address = non_blank(&lookup, "MAIL_FROM_ADDRESS").ok_or(ConfigError::Missing("MAIL_FROM_ADDRESS"))?;
            Ok(MailConfig { from_address })
        }
    }

    #[derive(Clone)]
    pub struct ServiceAccount {
        pub client_email: String,
        pub private_key: String,
        pub project_id: String,
    }

    impl fmt::Debug for ServiceAccount {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("ServiceAccount")
                .field("client_email", &self.client_email)
                .field("private_key", &"<redacted>")
                .field("project_id", &self.project_id)
                .finish()
        }
    }

    #[derive(Debug, Clone)]
    pub struct SheetsConfig {
        pub spreadsheet_id: String,
        pub range: String,
        pub service_account: ServiceAccount,
        pub token_uri: String,
        pub api_base: String,
    }

    pub fn spreadsheet_id_from_env() -> Option<String> {
        spreadsheet_id_from_lookup(env_lookup)
    }

    pub fn spreadsheet_id_from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Option<String> {
        non_blank(&lookup, "SPREADSHEET_ID")
    }

    impl SheetsConfig {
        pub fn from_env() -> Option<Self> {
            Self::from_lookup(env_lookup)
        }

        /// Spreadsheet logging is optional, so anything missing disables it
        /// instead of failing startup.
        pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Option<Self> {
            let (Some(private_key), Some(client_email), Some(project_id)) = (
                non_blank(&lookup, "GOOGLE_PRIVATE_KEY"),
                non_blank(&lookup, "GOOGLE_CLIENT_EMAIL"),
                non_blank(&lookup, "GOOGLE_PROJECT_ID"),
            ) else {
                tracing::warn!("Google Sheets credentials not configured, spreadsheet logging is disabled");
                tracing::info!("To enable, set GOOGLE_PRIVATE_KEY, GOOGLE_CLIENT_EMAIL, GOOGLE_PROJECT_ID and SPREADSHEET_ID");
                return None;
            };
            let Some(spreadsheet_id) = spreadsheet_id_from_lookup(&lookup) else {
                tracing::warn!("Google Sheets credentials are set but SPREADSHEET_ID is not, spreadsheet logging is disabled");
                return None;
            };
            let range = non_blank(&lookup, "SHEET_RANGE").unwrap_or(Constants::DEFAULT_SHEET_RANGE.to_owned());
            Some(SheetsConfig {
                spreadsheet_id,
                range,
                service_account: ServiceAccount {
                    client_email,
                    // Keys pasted into env files usually carry escaped newlines
                    private_key: private_key.replace("\\n", "\n"),
                    project_id,
                },
                token_uri: Constants::GOOGLE_TOKEN_URI.to_owned(),
                api_base: Constants::SHEETS_API_BASE.to_owned(),
            })
        }
    }

}

#[allow(non_snake_case)]
pub mod State {
    use ::std::sync::Arc;
    use aws_config::BehaviorVersion;
    use crate::{
        Config::{self, MailConfig, SheetsConfig},
        Mailer::{MailRelay, SesMailRelay},
        Sheets::{SheetAppender, GoogleSheetsClient},
    };

    pub struct InternalAppState {
        pub mailer: Arc<dyn MailRelay>,
        pub sheets: Option<Arc<dyn SheetAppender>>,
        pub spreadsheet_id: Option<String>,
    }
    pub type AppState = Arc<InternalAppState>;

    impl InternalAppState {
        pub fn new(mailer: Arc<dyn MailRelay>, sheets: Option<Arc<dyn SheetAppender>>, spreadsheet_id: Option<String>) -> AppState {
            Arc::new(InternalAppState {
                mailer,
                sheets,
                spreadsheet_id,
            })
        }
    }

    pub async fn make_state() -> Result<AppState, crate::E> {
        tracing::info!("Loading mail relay configuration");
        let mail_config = MailConfig::from_env()?;

        /* Create AWS clients */
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let ses_client = aws_sdk_sesv2::Client::new(&config);
        let mailer: Arc<dyn MailRelay> = Arc::new(SesMailRelay::new(ses_client, mail_config));

        let spreadsheet_id = Config::spreadsheet_id_from_env();
        let sheets = match SheetsConfig::from_env() {
            Some(sheets_config) => {
                tracing::info!("Setting up Google Sheets client for spreadsheet {}", sheets_config.spreadsheet_id);
                match GoogleSheetsClient::new(reqwest::Client::new(), sheets_config) {
                    Ok(client) => Some(Arc::new(client) as Arc<dyn SheetAppender>),
                    Err(err) => {
                        tracing::error!("Spreadsheet logging is disabled, {err}");
                        None
                    },
                }
            },
            None => None,
        };

        // Create AppState
        tracing::info!("Creating AppState");
        Ok(InternalAppState::new(mailer, sheets, spreadsheet_id))
    }
}

#[allow(non_snake_case)]
pub mod Constants {
    use ::std::net::SocketAddr;
    use lazy_static::lazy_static;

    pub const NOTIFICATION_RECIPIENT: &str = "itsdevendra.m7@gmail.com";
    pub const PORTFOLIO_URL: &str = "https://dev-stack-ai.vercel.app/";
    pub const DEFAULT_SHEET_RANGE: &str = "Collaborations-2026!A:E";
    pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
    pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
    pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

    // WARNING: These are global variables that get
    // initialised on first use, and should not
    // be written to after
    lazy_static!{
        pub static ref ORIGIN_URL: String = {
            dotenvy::var("ORIGIN_URL").unwrap_or(PORTFOLIO_URL.trim_end_matches('/').to_owned())
        };
        pub static ref LOCAL_BIND_ADDR: SocketAddr = {
            let maybe = dotenvy::var("LOCAL_BIND_ADDR");
            let mut addr = SocketAddr::from(([127, 0, 0, 1], 3000));
            match maybe {
                Ok(raw) => {
                    if let Ok(new_addr) = raw.parse() {
                        addr = new_addr;
                        tracing::info!("Using custom LOCAL_BIND_ADDR: {addr}");
                    } else {
                        tracing::info!("Failed to parse LOCAL_BIND_ADDR, using default, {addr}");
                    }
                }
                _ => ()
            }
            addr
        };
    }
}
