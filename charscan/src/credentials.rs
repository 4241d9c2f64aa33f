//! Credential resolution for the command line.
//!
//! Order: `--defaults-file` (or `~/.my.cnf`), then `MYSQL_USER` /
//! `MYSQL_PASSWORD`. `--user` replaces whatever user was found, and
//! `--password-prompt` asks for the password on the terminal.

use charscan_core::Result;
use charscan_core::error::CharScanError;
use charscan_core::security::{
    CredentialProvider, Credentials, EnvCredentials, FirstAvailable, OptionFileCredentials,
};
use std::path::PathBuf;

/// Asks for the password interactively after another provider supplied the user.
pub struct PromptCredentials<P> {
    inner: P,
}

impl<P: CredentialProvider> PromptCredentials<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: CredentialProvider> CredentialProvider for PromptCredentials<P> {
    fn resolve(&self) -> Result<Credentials> {
        let credentials = self.inner.resolve()?;
        let password =
            rpassword::prompt_password(format!("Enter password for {}: ", credentials.username()))
                .map_err(|e| {
                    CharScanError::credentials(format!("Failed to read password: {}", e))
                })?;

        if password.is_empty() {
            return Err(CharScanError::credentials("Password cannot be empty"));
        }

        Ok(credentials.with_password(password))
    }
}

/// Overrides the user of the wrapped provider, keeping its password.
///
/// Falls back to a password-less login when the wrapped provider has nothing.
pub struct UserOverride<P> {
    inner: P,
    user: String,
}

impl<P: CredentialProvider> UserOverride<P> {
    pub fn new(inner: P, user: impl Into<String>) -> Self {
        Self {
            inner,
            user: user.into(),
        }
    }
}

impl<P: CredentialProvider> CredentialProvider for UserOverride<P> {
    fn resolve(&self) -> Result<Credentials> {
        let password = match self.inner.resolve() {
            Ok(found) => found.expose_password().map(str::to_string),
            Err(e) => {
                tracing::debug!("Using --user without a stored password: {}", e);
                None
            }
        };
        Ok(Credentials::new(self.user.clone(), password))
    }
}

/// Builds the provider chain from the command-line options.
pub fn provider(
    defaults_file: Option<PathBuf>,
    user: Option<&str>,
    prompt: bool,
) -> Box<dyn CredentialProvider> {
    let mut sources: Vec<Box<dyn CredentialProvider>> = Vec::new();
    if let Some(path) = defaults_file.or_else(OptionFileCredentials::default_path) {
        sources.push(Box::new(OptionFileCredentials::new(path)));
    }
    sources.push(Box::new(EnvCredentials::default()));

    let base: Box<dyn CredentialProvider> = match user {
        Some(user) => Box::new(UserOverride::new(FirstAvailable::new(sources), user)),
        None => Box::new(FirstAvailable::new(sources)),
    };

    if prompt {
        Box::new(PromptCredentials::new(base))
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charscan_core::security::StaticCredentials;
    use std::io::Write;

    struct Unavailable;

    impl CredentialProvider for Unavailable {
        fn resolve(&self) -> Result<Credentials> {
            Err(CharScanError::credentials("nothing here"))
        }
    }

    #[test]
    fn test_user_override_keeps_password() {
        let inner = StaticCredentials(Credentials::new("app", Some("secret".to_string())));
        let credentials = UserOverride::new(inner, "auditor").resolve().unwrap();

        assert_eq!(credentials.username(), "auditor");
        assert_eq!(credentials.expose_password(), Some("secret"));
    }

    #[test]
    fn test_user_override_without_source() {
        let credentials = UserOverride::new(Unavailable, "auditor").resolve().unwrap();

        assert_eq!(credentials.username(), "auditor");
        assert!(!credentials.has_password());
    }

    #[test]
    fn test_provider_reads_defaults_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\nuser=reporter\npassword=\"p@ss word\"").unwrap();

        let credentials = provider(Some(file.path().to_path_buf()), None, false)
            .resolve()
            .unwrap();

        assert_eq!(credentials.username(), "reporter");
        assert_eq!(credentials.expose_password(), Some("p@ss word"));
    }

    #[test]
    fn test_provider_user_flag_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "user=reporter\npassword=secret").unwrap();

        let credentials = provider(Some(file.path().to_path_buf()), Some("root"), false)
            .resolve()
            .unwrap();

        assert_eq!(credentials.username(), "root");
        assert_eq!(credentials.expose_password(), Some("secret"));
    }
}
