//! Resolution of user-tunable options.
//!
//! Each option is looked up in order: an explicit value (CLI flag or MCP
//! parameter), the environment, the store's settings table, and finally a
//! built-in default.

use crate::{
    error::{Error, Result},
    matcher::{DEFAULT_TAG_BONUS, MatchConfig},
    store::EntryStore,
};

/// Default number of results shown per collection.
pub const DEFAULT_LIMIT: usize = 5;

/// A persisted, user-tunable option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    /// Score increment for entries whose tag appears in the query.
    TagBonus,
    /// Maximum results shown per collection.
    Limit,
}

impl Setting {
    pub const ALL: [Setting; 2] = [Setting::TagBonus, Setting::Limit];

    /// Key in the store's settings table.
    pub fn key(self) -> &'static str {
        match self {
            Setting::TagBonus => "tag_bonus",
            Setting::Limit => "limit",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            Setting::TagBonus => "QUICKFIX_TAG_BONUS",
            Setting::Limit => "QUICKFIX_LIMIT",
        }
    }

    pub fn default_value(self) -> usize {
        match self {
            Setting::TagBonus => DEFAULT_TAG_BONUS,
            Setting::Limit => DEFAULT_LIMIT,
        }
    }

    pub fn from_key(key: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.key() == key)
            .ok_or_else(|| {
                Error::Config(format!(
                    "unknown setting '{key}' (expected one of: tag_bonus, limit)"
                ))
            })
    }

    /// Parse a value for this setting.
    pub fn parse(self, raw: &str) -> Result<usize> {
        let value: usize = raw.trim().parse().map_err(|_| {
            Error::Config(format!(
                "invalid value for {}: '{raw}' (expected a non-negative integer)",
                self.key()
            ))
        })?;
        self.validate(value)
    }

    pub fn validate(self, value: usize) -> Result<usize> {
        if self == Setting::Limit && value == 0 {
            return Err(Error::Config("limit must be at least 1".to_string()));
        }
        Ok(value)
    }
}

/// Where a resolved value came from, for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Explicit,
    Environment,
    Stored,
    Default,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Explicit => "flag",
            Source::Environment => "env",
            Source::Stored => "stored",
            Source::Default => "default",
        }
    }
}

/// Resolve a setting's value and report where it came from.
pub fn resolve(
    setting: Setting,
    explicit: Option<usize>,
    store: &EntryStore,
) -> Result<(usize, Source)> {
    let env = std::env::var(setting.env_var()).ok();
    let stored = store.get_setting(setting.key())?;
    resolve_layers(setting, explicit, env.as_deref(), stored.as_deref())
}

fn resolve_layers(
    setting: Setting,
    explicit: Option<usize>,
    env: Option<&str>,
    stored: Option<&str>,
) -> Result<(usize, Source)> {
    if let Some(value) = explicit {
        return Ok((setting.validate(value)?, Source::Explicit));
    }
    if let Some(raw) = env {
        return Ok((setting.parse(raw)?, Source::Environment));
    }
    if let Some(raw) = stored {
        return Ok((setting.parse(raw)?, Source::Stored));
    }
    Ok((setting.default_value(), Source::Default))
}

/// Build the matcher configuration, honouring an explicit tag bonus.
pub fn match_config(
    store: &EntryStore,
    tag_bonus: Option<usize>,
) -> Result<MatchConfig> {
    let (tag_bonus, _) = resolve(Setting::TagBonus, tag_bonus, store)?;
    Ok(MatchConfig { tag_bonus })
}

/// Resolve the per-collection result limit.
pub fn limit(store: &EntryStore, explicit: Option<usize>) -> Result<usize> {
    Ok(resolve(Setting::Limit, explicit, store)?.0)
}
