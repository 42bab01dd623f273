//! HTTP Basic Auth gate

use actix_web::dev::ServiceRequest;
use actix_web::web;
use actix_web_httpauth::extractors::basic::{BasicAuth, Config};
use actix_web_httpauth::extractors::AuthenticationError;
use subtle::ConstantTimeEq;

use crate::config::AuthConfig;

const REALM: &str = "DESeq2 Dashboard";

/// Check a username / password pair against the configured credentials
pub fn credentials_match(auth: &AuthConfig, user: &str, password: &str) -> bool {
    // Evaluate both so a wrong username takes as long as a wrong password
    let user_ok = user.as_bytes().ct_eq(auth.username.as_bytes());
    let password_ok = password.as_bytes().ct_eq(auth.password.as_bytes());
    (user_ok & password_ok).into()
}

pub(super) async fn validator(
    req: ServiceRequest,
    credentials: BasicAuth,
) -> Result<ServiceRequest, (actix_web::Error, ServiceRequest)> {
    let accepted = match req.app_data::<web::Data<AuthConfig>>() {
        Some(auth) => credentials_match(
            auth,
            credentials.user_id(),
            credentials.password().unwrap_or(""),
        ),
        None => false,
    };

    if accepted {
        Ok(req)
    } else {
        log::warn!("Rejected credentials for user '{}'", credentials.user_id());
        let config = Config::default().realm(REALM);
        Err((AuthenticationError::from(config).into(), req))
    }
}
