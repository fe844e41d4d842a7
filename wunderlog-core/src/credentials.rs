//! API key lookup in the user's `.netrc`.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::{Result, WunderlogError};

/// Machine name the key is stored under.
pub const API_HOST: &str = "api.wunderground.com";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authenticator {
    pub login: String,
    pub account: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct Netrc {
    machines: HashMap<String, Authenticator>,
    default: Option<Authenticator>,
}

impl Netrc {
    pub fn parse(contents: &str) -> Self {
        let mut netrc = Netrc::default();
        let mut lines = contents.lines();
        // (machine name, entry); `None` name is the `default` entry
        let mut current: Option<(Option<String>, Authenticator)> = None;

        while let Some(line) = lines.next() {
            if line.trim_start().starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            while let Some(token) = tokens.next() {
                match token {
                    "machine" | "default" => {
                        if let Some((name, entry)) = current.take() {
                            netrc.insert(name, entry);
                        }
                        let name = if token == "machine" {
                            tokens.next().map(str::to_owned)
                        } else {
                            None
                        };
                        current = Some((name, Authenticator::default()));
                    }
                    "login" | "user" | "account" | "password" => {
                        let value = tokens.next().unwrap_or_default().to_owned();
                        if let Some((_, entry)) = current.as_mut() {
                            match token {
                                "account" => entry.account = value,
                                "password" => entry.password = value,
                                _ => entry.login = value,
                            }
                        }
                    }
                    "macdef" => {
                        // macro body runs until the next blank line
                        for body in lines.by_ref() {
                            if body.trim().is_empty() {
                                break;
                            }
                        }
                        break;
                    }
                    _ => {}
                }
            }
        }

        if let Some((name, entry)) = current {
            netrc.insert(name, entry);
        }
        netrc
    }

    fn insert(&mut self, name: Option<String>, entry: Authenticator) {
        match name {
            Some(name) => {
                self.machines.insert(name, entry);
            }
            None => self.default = Some(entry),
        }
    }

    /// Entry for `host`, falling back to the `default` entry.
    pub fn authenticators(&self, host: &str) -> Option<&Authenticator> {
        self.machines.get(host).or(self.default.as_ref())
    }
}

/// `$NETRC` if set, otherwise `~/.netrc`.
pub fn netrc_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("NETRC") {
        return Some(PathBuf::from(path));
    }
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".netrc"))
}

/// Password field of the `.netrc` entry for the API host.
pub fn api_key_from_netrc() -> Result<String> {
    let path = netrc_path()
        .ok_or_else(|| WunderlogError::Credentials("could not locate a home directory".into()))?;
    let contents =
        std::fs::read_to_string(&path).map_err(|e| WunderlogError::io(&path, e))?;

    api_key_from(&Netrc::parse(&contents))
}

fn api_key_from(netrc: &Netrc) -> Result<String> {
    netrc
        .authenticators(API_HOST)
        .map(|auth| auth.password.clone())
        .filter(|password| !password.is_empty())
        .ok_or_else(|| WunderlogError::Credentials(format!("no password for machine {API_HOST}")))
}
