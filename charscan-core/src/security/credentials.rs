//! Credential container and providers.
//!
//! Passwords are held in `Zeroizing` containers so they are wiped when the
//! credentials are dropped, and are never printed by `Debug`.

use crate::Result;
use crate::error::CharScanError;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use super::option_file::OptionFile;

/// Database user and optional password.
///
/// # Example
///
/// ```rust
/// use charscan_core::security::Credentials;
///
/// let creds = Credentials::new("scanner", Some("secret".to_string()));
/// assert_eq!(creds.username(), "scanner");
/// assert!(creds.has_password());
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    /// Creates new credentials.
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username.into()),
            password: Zeroizing::new(password),
        }
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Checks if a password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Password for handing to the driver. Never log the result.
    pub fn expose_password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Returns a copy with the password replaced.
    pub fn with_password(&self, password: String) -> Self {
        Self::new(self.username().to_string(), Some(password))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username())
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

/// Source of database credentials.
///
/// The binary picks providers at startup; tests inject fixed credentials
/// through [`StaticCredentials`] without touching files or the environment.
pub trait CredentialProvider {
    /// Resolves the user and password.
    ///
    /// # Errors
    /// Returns a `Credentials` error when the source is missing or has no user.
    fn resolve(&self) -> Result<Credentials>;
}

impl<T: CredentialProvider + ?Sized> CredentialProvider for Box<T> {
    fn resolve(&self) -> Result<Credentials> {
        (**self).resolve()
    }
}

/// Fixed credentials.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Credentials);

impl CredentialProvider for StaticCredentials {
    fn resolve(&self) -> Result<Credentials> {
        Ok(self.0.clone())
    }
}

/// Reads `user` and `password` from a MySQL option file such as `~/.my.cnf`.
#[derive(Debug, Clone)]
pub struct OptionFileCredentials {
    path: PathBuf,
}

impl OptionFileCredentials {
    /// Reads from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.my.cnf`, if `HOME` is set.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| Path::new(&home).join(".my.cnf"))
    }
}

impl CredentialProvider for OptionFileCredentials {
    fn resolve(&self) -> Result<Credentials> {
        let contents = Zeroizing::new(std::fs::read_to_string(&self.path).map_err(|e| {
            CharScanError::Io {
                context: format!("Failed to read option file {}", self.path.display()),
                source: e,
            }
        })?);
        let options = OptionFile::parse(&contents);

        let username = options.get("user").filter(|u| !u.is_empty()).ok_or_else(|| {
            CharScanError::credentials(format!(
                "No user entry in option file {}",
                self.path.display()
            ))
        })?;
        let password = options.get("password").map(str::to_string);

        tracing::debug!("Loaded credentials from {}", self.path.display());
        Ok(Credentials::new(username, password))
    }
}

/// Reads credentials from environment variables.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    user_var: String,
    password_var: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self {
            user_var: "MYSQL_USER".to_string(),
            password_var: "MYSQL_PASSWORD".to_string(),
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn resolve(&self) -> Result<Credentials> {
        let username = std::env::var(&self.user_var)
            .ok()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                CharScanError::credentials(format!("{} is not set", self.user_var))
            })?;
        let password = std::env::var(&self.password_var).ok();
        Ok(Credentials::new(username, password))
    }
}

/// Tries each provider in order and returns the first success.
pub struct FirstAvailable {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl FirstAvailable {
    /// Chains `providers` in priority order.
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }
}

impl CredentialProvider for FirstAvailable {
    fn resolve(&self) -> Result<Credentials> {
        let mut reasons = Vec::new();
        for provider in &self.providers {
            match provider.resolve() {
                Ok(credentials) => return Ok(credentials),
                Err(e) => {
                    tracing::debug!("Credential source unavailable: {}", e);
                    reasons.push(e.to_string());
                }
            }
        }
        Err(CharScanError::credentials(if reasons.is_empty() {
            "no credential sources configured".to_string()
        } else {
            reasons.join("; ")
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("scanner", Some("hunter2".to_string()));
        let debug = format!("{:?}", creds);
        assert!(debug.contains("scanner"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_credentials_no_password() {
        let creds = Credentials::new("scanner", None);
        assert!(!creds.has_password());
        assert_eq!(creds.expose_password(), None);

        let creds = creds.with_password("typed".to_string());
        assert_eq!(creds.expose_password(), Some("typed"));
        assert_eq!(creds.username(), "scanner");
    }

    #[test]
    fn test_option_file_credentials() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\nuser = scanner\npassword = \"p@ss word\"").unwrap();

        let creds = OptionFileCredentials::new(file.path()).resolve().unwrap();
        assert_eq!(creds.username(), "scanner");
        assert_eq!(creds.expose_password(), Some("p@ss word"));
    }

    #[test]
    fn test_option_file_without_user_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\npassword=secret").unwrap();

        let error = OptionFileCredentials::new(file.path()).resolve().unwrap_err();
        assert!(matches!(error, CharScanError::Credentials { .. }));
        assert!(!error.to_string().contains("secret"));
    }

    #[test]
    fn test_missing_option_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = OptionFileCredentials::new(dir.path().join("absent.cnf"))
            .resolve()
            .unwrap_err();
        assert!(matches!(error, CharScanError::Io { .. }));
    }

    #[test]
    fn test_first_available_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let chain = FirstAvailable::new(vec![
            Box::new(OptionFileCredentials::new(dir.path().join("absent.cnf"))),
            Box::new(StaticCredentials(Credentials::new("fallback", None))),
        ]);
        assert_eq!(chain.resolve().unwrap().username(), "fallback");

        let empty = FirstAvailable::new(Vec::new());
        assert!(empty.resolve().is_err());
    }
}
