#![forbid(unsafe_code)]

//! Session configuration.
//!
//! Defaults suit most hosts. [`SessionConfig::from_env`] lets deployments
//! tune the engine without recompiling:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `TETHER_MAPPING_ATTRIBUTE` | `mapping_attribute` | `mapping` |
//! | `TETHER_MAX_DISPATCH_DEPTH` | `max_dispatch_depth` | `32` |
//! | `TETHER_EDITABLE_DISPLAY` | `editable_display` | `false` |
//!
//! Unparseable values fall back to the default.

use std::env;

/// Default name of the attribute carrying a control's path.
pub const DEFAULT_MAPPING_ATTRIBUTE: &str = "mapping";

/// Default bound on nested (re-entrant) writes.
pub const DEFAULT_MAX_DISPATCH_DEPTH: usize = 32;

/// Tunables for a [`BindingSession`](crate::BindingSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Attribute read from each control at bind time.
    pub mapping_attribute: String,
    /// Maximum nesting of writes issued from inside callbacks.
    pub max_dispatch_depth: usize,
    /// Let display controls report user edits like text controls do.
    pub editable_display: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mapping_attribute: DEFAULT_MAPPING_ATTRIBUTE.to_owned(),
            max_dispatch_depth: DEFAULT_MAX_DISPATCH_DEPTH,
            editable_display: false,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(attr) = lookup("TETHER_MAPPING_ATTRIBUTE") {
            let attr = attr.trim();
            if !attr.is_empty() {
                config.mapping_attribute = attr.to_owned();
            }
        }
        if let Some(depth) = lookup("TETHER_MAX_DISPATCH_DEPTH")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|depth| *depth > 0)
        {
            config.max_dispatch_depth = depth;
        }
        if let Some(flag) = lookup("TETHER_EDITABLE_DISPLAY").and_then(|raw| parse_flag(&raw)) {
            config.editable_display = flag;
        }
        config
    }

    #[must_use]
    pub fn with_mapping_attribute(mut self, name: impl Into<String>) -> Self {
        self.mapping_attribute = name.into();
        self
    }

    /// Values below 1 are raised to 1 so top-level writes always run.
    #[must_use]
    pub fn with_max_dispatch_depth(mut self, depth: usize) -> Self {
        self.max_dispatch_depth = depth.max(1);
        self
    }

    #[must_use]
    pub fn with_editable_display(mut self, editable: bool) -> Self {
        self.editable_display = editable;
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.mapping_attribute, "mapping");
        assert_eq!(config.max_dispatch_depth, 32);
        assert!(!config.editable_display);
    }

    #[test]
    fn env_overrides() {
        let config = SessionConfig::from_lookup(lookup(&[
            ("TETHER_MAPPING_ATTRIBUTE", " bind "),
            ("TETHER_MAX_DISPATCH_DEPTH", "8"),
            ("TETHER_EDITABLE_DISPLAY", "yes"),
        ]));
        assert_eq!(config.mapping_attribute, "bind");
        assert_eq!(config.max_dispatch_depth, 8);
        assert!(config.editable_display);
    }

    #[test]
    fn invalid_env_values_fall_back() {
        let config = SessionConfig::from_lookup(lookup(&[
            ("TETHER_MAPPING_ATTRIBUTE", "   "),
            ("TETHER_MAX_DISPATCH_DEPTH", "0"),
            ("TETHER_EDITABLE_DISPLAY", "maybe"),
        ]));
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn builder_clamps_depth() {
        let config = SessionConfig::new()
            .with_mapping_attribute("path")
            .with_max_dispatch_depth(0)
            .with_editable_display(true);
        assert_eq!(config.mapping_attribute, "path");
        assert_eq!(config.max_dispatch_depth, 1);
        assert!(config.editable_display);
    }
}
