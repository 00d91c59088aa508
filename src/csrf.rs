//! Double-submit form tokens: the token is rendered into the form and kept in
//! a signed cookie, and a submission is accepted only when the two agree.

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};

use crate::forms::FormErrors;

pub const COOKIE_NAME: &str = "csrf_token";
pub const FIELD_NAME: &str = "csrf_token";

const TOKEN_TTL_HOURS: i64 = 12;

/// Key used to sign the token cookie.
pub fn cookie_key(secret: Option<&str>) -> Key {
    let Some(secret) = secret else {
        tracing::warn!("SECRET_KEY not set - form tokens will not survive a restart");
        return Key::generate();
    };

    match Key::try_from(secret.as_bytes()) {
        Ok(key) => key,
        Err(_) if secret.len() >= 32 => Key::derive_from(secret.as_bytes()),
        Err(_) => {
            tracing::warn!("SECRET_KEY is shorter than 32 bytes - using a random key");
            Key::generate()
        },
    }
}

/// Token for a freshly rendered form, reusing the one already in the jar.
pub fn issue(jar: SignedCookieJar) -> (SignedCookieJar, String) {
    if let Some(existing) = jar.get(COOKIE_NAME) {
        let token = existing.value().to_string();
        return (jar, token);
    }

    let token = new_token();
    let cookie = Cookie::build((COOKIE_NAME, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::hours(TOKEN_TTL_HOURS))
        .build();
    (jar.add(cookie), token)
}

pub fn verify(enabled: bool, jar: &SignedCookieJar, submitted: &str) -> Result<(), FormErrors> {
    if !enabled {
        return Ok(());
    }

    match jar.get(COOKIE_NAME) {
        Some(cookie) if !submitted.is_empty() && cookie.value() == submitted => Ok(()),
        _ => Err(FormErrors::single(FIELD_NAME, "The CSRF token is missing or invalid.")),
    }
}

fn new_token() -> String {
    Key::generate().signing()[..16].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_against_its_jar() {
        let jar = SignedCookieJar::new(Key::generate());
        let (jar, token) = issue(jar);

        assert_eq!(token.len(), 32);
        assert!(verify(true, &jar, &token).is_ok());
        assert!(verify(true, &jar, "forged").is_err());
        assert!(verify(true, &jar, "").is_err());
    }

    #[test]
    fn issuing_twice_keeps_the_token() {
        let (jar, first) = issue(SignedCookieJar::new(Key::generate()));
        let (_, second) = issue(jar);
        assert_eq!(first, second);
    }

    #[test]
    fn missing_cookie_fails_unless_disabled() {
        let jar = SignedCookieJar::new(Key::generate());
        assert!(verify(true, &jar, "abc").is_err());
        assert!(verify(false, &jar, "").is_ok());
    }

    #[test]
    fn short_secret_still_yields_a_key() {
        let key = cookie_key(Some("short"));
        assert_eq!(key.signing().len(), 32);

        let long = "k".repeat(40);
        let first = cookie_key(Some(long.as_str()));
        let second = cookie_key(Some(long.as_str()));
        assert_eq!(first.master(), second.master());
    }
}
