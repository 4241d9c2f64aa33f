//! Minimal reader for MySQL option files (`my.cnf`).
//!
//! Only the client-facing groups are read: options before any group header,
//! and the `[client]` and `[mysql]` groups. Later values override earlier ones.

use std::collections::HashMap;

const CLIENT_GROUPS: &[&str] = &["client", "mysql"];

/// Parsed key/value options relevant to a client connection.
#[derive(Default)]
pub(crate) struct OptionFile {
    values: HashMap<String, String>,
}

impl OptionFile {
    /// Parses option file text. Malformed lines are ignored.
    pub(crate) fn parse(contents: &str) -> Self {
        let mut values = HashMap::new();
        let mut in_client_group = true;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(group) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let group = group.trim().to_ascii_lowercase();
                in_client_group = CLIENT_GROUPS.contains(&group.as_str());
                continue;
            }

            if !in_client_group {
                continue;
            }

            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key, value),
                None => line.split_once(char::is_whitespace).unwrap_or((line, "")),
            };
            let key = key.trim().to_ascii_lowercase().replace('_', "-");
            values.insert(key, unquote(value.trim()).to_string());
        }

        Self { values }
    }

    /// Value of `key`, if present.
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_group() {
        let options = OptionFile::parse(
            "# comment\n[client]\nuser=scanner\npassword = 's3cret'\nport=3307\n",
        );
        assert_eq!(options.get("user"), Some("scanner"));
        assert_eq!(options.get("password"), Some("s3cret"));
        assert_eq!(options.get("port"), Some("3307"));
    }

    #[test]
    fn test_bare_lines_without_group() {
        let options = OptionFile::parse("user scanner\npassword\thunter2\n");
        assert_eq!(options.get("user"), Some("scanner"));
        assert_eq!(options.get("password"), Some("hunter2"));
    }

    #[test]
    fn test_server_groups_are_ignored() {
        let options = OptionFile::parse("[mysqld]\nuser=mysql\n[client]\nuser=scanner\n");
        assert_eq!(options.get("user"), Some("scanner"));

        let options = OptionFile::parse("[client]\nuser=scanner\n[mysqld]\nuser=mysql\n");
        assert_eq!(options.get("user"), Some("scanner"));
    }

    #[test]
    fn test_empty_password_is_present() {
        let options = OptionFile::parse("[client]\nuser=scanner\npassword=\n");
        assert_eq!(options.get("password"), Some(""));
    }
}
