// src/arguments.rs

//! Script arguments passed after `--` on the command line.
//!
//! Accepted forms:
//! - `--key=value`
//! - `--key value` (when the next token does not start with `-`, or is a
//!   negative number such as `-5`)
//! - `--flag` (present, empty value)
//!
//! Keys are case-insensitive; a key may be given more than once.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    values: BTreeMap<String, Vec<String>>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw tokens. Tokens that are not introduced by a `-` key are
    /// ignored.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut args = Arguments::new();
        let mut index = 0;

        while index < tokens.len() {
            let token = tokens[index].as_ref();
            index += 1;

            if !token.starts_with('-') {
                continue;
            }

            let stripped = token.trim_start_matches('-');
            let (key, mut value) = match stripped.split_once('=') {
                Some((key, value)) => (key, value.to_string()),
                None => (stripped, String::new()),
            };

            if value.is_empty() && !stripped.contains('=') {
                if let Some(next) = tokens.get(index).map(AsRef::as_ref) {
                    if !next.starts_with('-') || is_number(next) {
                        value = next.to_string();
                        index += 1;
                    }
                }
            }

            if key.is_empty() {
                continue;
            }
            args.insert(key, value.trim_matches('"'));
        }

        args
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values
            .entry(key.to_lowercase())
            .or_default()
            .push(value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(&key.to_lowercase())
    }

    /// Last value given for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_lowercase())
            .and_then(|v| v.last())
            .map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.values
            .get(&key.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn is_number(token: &str) -> bool {
    token.parse::<f64>().is_ok()
}
