use crate::control::{ControlCommand, Toggle};
use crate::error::{Error, Result};

/// Default key expression prefix for all rigdash traffic.
pub const KEY_PREFIX: &str = "rigdash";

const SNAPSHOT: &str = "snapshot";
const CONTROL: &str = "control";
const CHECK: &str = "check";

/// Builder for rigdash key expressions.
///
/// Key expressions follow these patterns:
/// - `<prefix>/snapshot` for the device feed
/// - `<prefix>/control/<command>/<address>` for one-way commands
/// - `<prefix>/check/<toggle>/<address>` for state queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExprBuilder {
    prefix: String,
}

impl Default for KeyExprBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyExprBuilder {
    /// Create a builder using [`KEY_PREFIX`].
    pub fn new() -> Self {
        Self::with_prefix(KEY_PREFIX)
    }

    /// Create a builder with a custom prefix. Trailing slashes are dropped.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key the feed publishes snapshot batches on.
    ///
    /// # Example
    /// ```
    /// use rigdash_common::keyexpr::KeyExprBuilder;
    ///
    /// assert_eq!(KeyExprBuilder::new().snapshot(), "rigdash/snapshot");
    /// ```
    pub fn snapshot(&self) -> String {
        format!("{}/{}", self.prefix, SNAPSHOT)
    }

    /// Key a command for one device is put on.
    ///
    /// # Example
    /// ```
    /// use rigdash_common::control::ControlCommand;
    /// use rigdash_common::keyexpr::KeyExprBuilder;
    ///
    /// let key = KeyExprBuilder::new().command(ControlCommand::Unlight, "10.0.0.5");
    /// assert_eq!(key, "rigdash/control/unlight/10.0.0.5");
    /// ```
    pub fn command(&self, command: ControlCommand, address: &str) -> String {
        format!("{}/{}/{}/{}", self.prefix, CONTROL, command.as_str(), address)
    }

    /// Key a toggle state query for one device is sent to.
    ///
    /// # Example
    /// ```
    /// use rigdash_common::control::Toggle;
    /// use rigdash_common::keyexpr::KeyExprBuilder;
    ///
    /// let key = KeyExprBuilder::new().check(Toggle::Pause, "10.0.0.5");
    /// assert_eq!(key, "rigdash/check/pause/10.0.0.5");
    /// ```
    pub fn check(&self, toggle: Toggle, address: &str) -> String {
        format!("{}/{}/{}/{}", self.prefix, CHECK, toggle.as_str(), address)
    }

    /// Wildcard matching every command for every device.
    pub fn control_wildcard(&self) -> String {
        format!("{}/{}/**", self.prefix, CONTROL)
    }

    /// Wildcard matching every check for every device.
    pub fn check_wildcard(&self) -> String {
        format!("{}/{}/**", self.prefix, CHECK)
    }

    /// Parse a key expression produced by this builder.
    pub fn parse<'a>(&self, key: &'a str) -> Result<ParsedKeyExpr<'a>> {
        let rest = key
            .strip_prefix(self.prefix.as_str())
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(|| {
                Error::KeyExpr(format!("'{}' is outside prefix '{}'", key, self.prefix))
            })?;

        let mut parts = rest.splitn(3, '/');
        let parsed = match (parts.next(), parts.next(), parts.next()) {
            (Some(SNAPSHOT), None, None) => Some(ParsedKeyExpr::Snapshot),
            (Some(CONTROL), Some(command), Some(address)) if !address.is_empty() => {
                ControlCommand::parse(command)
                    .map(|command| ParsedKeyExpr::Command { command, address })
            }
            (Some(CHECK), Some(toggle), Some(address)) if !address.is_empty() => {
                Toggle::parse(toggle).map(|toggle| ParsedKeyExpr::Check { toggle, address })
            }
            _ => None,
        };

        parsed.ok_or_else(|| Error::KeyExpr(format!("unrecognized key '{}'", key)))
    }
}

/// Parsed components of a rigdash key expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedKeyExpr<'a> {
    Snapshot,
    Command {
        command: ControlCommand,
        address: &'a str,
    },
    Check {
        toggle: Toggle,
        address: &'a str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_builder() {
        let builder = KeyExprBuilder::with_prefix("lab/bench1/");

        assert_eq!(builder.snapshot(), "lab/bench1/snapshot");
        assert_eq!(
            builder.command(ControlCommand::Pause, "10.0.0.5"),
            "lab/bench1/control/pause/10.0.0.5"
        );
        assert_eq!(
            builder.check(Toggle::Light, "10.0.0.5"),
            "lab/bench1/check/light/10.0.0.5"
        );
        assert_eq!(builder.control_wildcard(), "lab/bench1/control/**");
        assert_eq!(builder.check_wildcard(), "lab/bench1/check/**");
    }

    #[test]
    fn test_parse_key_expr() {
        let builder = KeyExprBuilder::new();

        assert_eq!(
            builder.parse("rigdash/snapshot").unwrap(),
            ParsedKeyExpr::Snapshot
        );
        assert_eq!(
            builder.parse("rigdash/control/unpause/10.0.0.7").unwrap(),
            ParsedKeyExpr::Command {
                command: ControlCommand::Unpause,
                address: "10.0.0.7"
            }
        );
        assert_eq!(
            builder.parse("rigdash/check/light/10.0.0.7").unwrap(),
            ParsedKeyExpr::Check {
                toggle: Toggle::Light,
                address: "10.0.0.7"
            }
        );
    }

    #[test]
    fn test_parse_invalid_key() {
        let builder = KeyExprBuilder::new();

        assert!(builder.parse("other/snapshot").is_err());
        assert!(builder.parse("rigdashx/snapshot").is_err());
        assert!(builder.parse("rigdash/control/reboot/10.0.0.7").is_err());
        assert!(builder.parse("rigdash/check/fan/10.0.0.7").is_err());
        assert!(builder.parse("rigdash/check/light/").is_err());
    }
}
