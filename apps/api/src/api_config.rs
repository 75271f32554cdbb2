use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use portico_application::DEFAULT_SUPER_ADMIN_ROLE;
use portico_core::AppError;
use tracing_subscriber::EnvFilter;

/// Process mode selected by the first CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    AuditConsistency { repair: bool },
}

impl ApiCommand {
    pub fn parse<I>(mut args: I) -> Result<Self, AppError>
    where
        I: Iterator<Item = String>,
    {
        let Some(command) = args.next() else {
            return Ok(Self::Serve);
        };

        match command.as_str() {
            "serve" => Ok(Self::Serve),
            "migrate" => Ok(Self::Migrate),
            "audit-consistency" => {
                let repair = match args.next().as_deref() {
                    None => false,
                    Some("--repair") => true,
                    Some(other) => {
                        return Err(AppError::Validation(format!(
                            "unknown audit-consistency flag '{other}'"
                        )));
                    }
                };
                Ok(Self::AuditConsistency { repair })
            }
            other => Err(AppError::Validation(format!(
                "command must be 'serve', 'migrate' or 'audit-consistency', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub session_inactivity_minutes: i64,
    pub super_admin_roles: Vec<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = ApiCommand::parse(env::args().skip(1))?;

        let database_url = required_env("DATABASE_URL")?;
        let database_max_connections = parsed_env("DATABASE_MAX_CONNECTIONS", 10_u32)?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = parsed_env("API_PORT", 3001_u16)?;

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");
        let session_inactivity_minutes = parsed_env("SESSION_INACTIVITY_MINUTES", 30_i64)?;
        if session_inactivity_minutes <= 0 {
            return Err(AppError::Validation(
                "SESSION_INACTIVITY_MINUTES must be positive".to_owned(),
            ));
        }

        let super_admin_roles = parse_role_list(
            env::var("SUPER_ADMIN_ROLES")
                .unwrap_or_else(|_| DEFAULT_SUPER_ADMIN_ROLE.to_owned())
                .as_str(),
        );

        Ok(Self {
            command,
            database_url,
            database_max_connections,
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            session_inactivity_minutes,
            super_admin_roles,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_role_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parsed_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}
