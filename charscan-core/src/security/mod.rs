//! Credential handling.
//!
//! - `credentials`: zeroizing container and the `CredentialProvider` trait
//!   with option-file, environment, static and chained providers
//! - `option_file`: parser for MySQL option files
//!
//! Credentials never appear in logs, `Debug` output or error messages.

mod credentials;
mod option_file;

pub use credentials::{
    CredentialProvider, Credentials, EnvCredentials, FirstAvailable, OptionFileCredentials,
    StaticCredentials,
};
