//! Resolved server configuration

use std::path::PathBuf;

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::catalog::resolve_results_dir;
use crate::cli::ServeArgs;
use crate::error::{DashboardError, Result};

/// Default listening port
pub const DEFAULT_PORT: u16 = 8050;
/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default Basic Auth username
pub const DEFAULT_USERNAME: &str = "admin";
/// Length of a generated password
const GENERATED_PASSWORD_LEN: usize = 22;

/// Basic Auth credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    /// The password was generated at startup rather than configured
    pub generated: bool,
}

/// Everything the server needs to start
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Verbose logging and a single worker
    pub debug: bool,
    pub results_dir: PathBuf,
    pub auth: Option<AuthConfig>,
}

impl ServerConfig {
    /// Resolve CLI arguments against the process environment
    pub fn from_args(args: &ServeArgs) -> Result<Self> {
        let deployed = std::env::var_os("PORT").is_some();
        let app_dir = std::env::current_dir()?;
        Self::resolve(args, deployed, app_dir)
    }

    /// Resolve arguments.
    ///
    /// `deployed` is true when the port came from the `PORT` environment
    /// variable; debug mode is then forced off. Without `--results-dir` the
    /// results root is looked up relative to `app_dir`.
    pub fn resolve(args: &ServeArgs, deployed: bool, app_dir: PathBuf) -> Result<Self> {
        if args.port == 0 {
            return Err(DashboardError::InvalidInput {
                reason: "Port must be non-zero".to_string(),
            });
        }

        let debug = args.debug && !deployed;
        if args.debug && deployed {
            log::info!("PORT is set; debug mode disabled");
        }

        let results_dir = match &args.results_dir {
            Some(dir) => PathBuf::from(dir),
            None => resolve_results_dir(&app_dir),
        };

        let auth = match (&args.password, args.auth) {
            (Some(password), _) if !password.is_empty() => Some(AuthConfig {
                username: args.username.clone(),
                password: password.clone(),
                generated: false,
            }),
            (_, true) => Some(AuthConfig {
                username: args.username.clone(),
                password: generate_password(),
                generated: true,
            }),
            _ => None,
        };

        Ok(Self {
            host: args.host.clone(),
            port: args.port,
            debug,
            results_dir,
            auth,
        })
    }

    /// `host:port` for binding
    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// Random alphanumeric password
pub fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serve arguments as clap fills them with no flags and an empty environment
    fn serve_args() -> ServeArgs {
        ServeArgs {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            results_dir: None,
            auth: false,
            username: DEFAULT_USERNAME.to_string(),
            password: None,
        }
    }

    #[test]
    fn test_defaults() {
        let args = ServeArgs {
            results_dir: Some("/tmp/results".to_string()),
            ..serve_args()
        };
        let cfg = ServerConfig::resolve(&args, false, PathBuf::from("/app")).unwrap();
        assert_eq!(cfg.host, DEFAULT_HOST);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert!(!cfg.debug);
        assert_eq!(cfg.results_dir, PathBuf::from("/tmp/results"));
        assert_eq!(cfg.auth, None);
        assert_eq!(cfg.bind_addr(), (DEFAULT_HOST.to_string(), DEFAULT_PORT));
    }

    #[test]
    fn test_debug_forced_off_when_deployed() {
        let args = ServeArgs {
            debug: true,
            port: 9000,
            ..serve_args()
        };
        let local = ServerConfig::resolve(&args, false, PathBuf::from("/app")).unwrap();
        assert!(local.debug);
        let deployed = ServerConfig::resolve(&args, true, PathBuf::from("/app")).unwrap();
        assert!(!deployed.debug);
        assert_eq!(deployed.port, 9000);
    }

    #[test]
    fn test_results_dir_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        std::fs::create_dir_all(&app).unwrap();
        let cfg = ServerConfig::resolve(&serve_args(), false, app).unwrap();
        assert_eq!(
            cfg.results_dir,
            dir.path().join("analysis_results").join("deseq2_results")
        );
    }

    #[test]
    fn test_auth_resolution() {
        let none = ServerConfig::resolve(&serve_args(), false, PathBuf::from("/app")).unwrap();
        assert_eq!(none.auth, None);

        let empty_password = ServeArgs {
            password: Some(String::new()),
            ..serve_args()
        };
        let cfg = ServerConfig::resolve(&empty_password, false, PathBuf::from("/app")).unwrap();
        assert_eq!(cfg.auth, None);

        let with_password = ServeArgs {
            username: "lab".to_string(),
            password: Some("s3cret".to_string()),
            ..serve_args()
        };
        let auth = ServerConfig::resolve(&with_password, false, PathBuf::from("/app"))
            .unwrap()
            .auth
            .unwrap();
        assert_eq!(auth.username, "lab");
        assert_eq!(auth.password, "s3cret");
        assert!(!auth.generated);

        let generated = ServeArgs {
            auth: true,
            ..serve_args()
        };
        let auth = ServerConfig::resolve(&generated, false, PathBuf::from("/app"))
            .unwrap()
            .auth
            .unwrap();
        assert!(auth.generated);
        assert_eq!(auth.username, DEFAULT_USERNAME);
        assert_eq!(auth.password.len(), 22);
        assert!(auth.password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_zero_port_rejected() {
        let args = ServeArgs {
            port: 0,
            ..serve_args()
        };
        assert!(ServerConfig::resolve(&args, false, PathBuf::from("/app")).is_err());
    }
}
