//! Canonical role vocabulary and role normalization.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// The normalized, deduplicated form of a role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalRole {
    /// Wildcard: matches every role.
    Any,
    /// Full administrator.
    Admin,
    /// Can publish and edit content.
    Editor,
    /// Regular authenticated user.
    User,
    /// Account awaiting role assignment; also the fallback for
    /// unrecognized input.
    Pending,
}

impl CanonicalRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::User => "user",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for CanonicalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role alias table mapping raw role strings to canonical roles.
///
/// Explicitly constructed and injectable rather than process-wide state, so
/// that engines under test can carry their own alias overrides.
/// Normalization is total: every input maps to exactly one canonical role,
/// with empty or unrecognized input falling back to [`CanonicalRole::Pending`].
#[derive(Debug)]
pub struct RoleTable {
    /// Lowercased alias → canonical role.
    aliases: RwLock<HashMap<String, CanonicalRole>>,
}

impl RoleTable {
    /// Create a table seeded with the default synonym sets.
    pub fn new() -> Self {
        Self {
            aliases: RwLock::new(Self::default_aliases()),
        }
    }

    fn default_aliases() -> HashMap<String, CanonicalRole> {
        let mut map = HashMap::new();
        for alias in ["any", "all", "*"] {
            map.insert(alias.to_string(), CanonicalRole::Any);
        }
        for alias in ["admin", "administrator", "administrador"] {
            map.insert(alias.to_string(), CanonicalRole::Admin);
        }
        for alias in ["editor", "publisher"] {
            map.insert(alias.to_string(), CanonicalRole::Editor);
        }
        for alias in ["user", "member", "usuario"] {
            map.insert(alias.to_string(), CanonicalRole::User);
        }
        map.insert("pending".to_string(), CanonicalRole::Pending);
        map
    }

    /// Canonicalize an arbitrary role string.
    ///
    /// Trims, lower-cases, and resolves through the alias table. Unknown or
    /// empty input maps to `Pending`. Idempotent: canonical role names are
    /// always aliases of themselves.
    pub fn normalize(&self, raw: &str) -> CanonicalRole {
        let key = raw.trim().to_lowercase();
        if key.is_empty() {
            return CanonicalRole::Pending;
        }
        self.aliases
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .copied()
            .unwrap_or(CanonicalRole::Pending)
    }

    /// Look up an alias without the pending fallback.
    pub fn alias(&self, raw: &str) -> Option<CanonicalRole> {
        let key = raw.trim().to_lowercase();
        self.aliases
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .copied()
    }

    /// Register or override an alias.
    pub fn set_alias(&self, raw: &str, role: CanonicalRole) {
        let key = raw.trim().to_lowercase();
        self.aliases
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, role);
    }

    /// Restore the default alias set, dropping all overrides.
    pub fn reset(&self) {
        *self.aliases.write().unwrap_or_else(|e| e.into_inner()) = Self::default_aliases();
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_synonyms() {
        let roles = RoleTable::new();
        assert_eq!(roles.normalize("any"), CanonicalRole::Any);
        assert_eq!(roles.normalize("ALL"), CanonicalRole::Any);
        assert_eq!(roles.normalize("  Administrator "), CanonicalRole::Admin);
        assert_eq!(roles.normalize("usuario"), CanonicalRole::User);
    }

    #[test]
    fn test_normalize_fallback() {
        let roles = RoleTable::new();
        assert_eq!(roles.normalize(""), CanonicalRole::Pending);
        assert_eq!(roles.normalize("   "), CanonicalRole::Pending);
        assert_eq!(roles.normalize("intern"), CanonicalRole::Pending);
    }

    #[test]
    fn test_normalize_idempotent() {
        let roles = RoleTable::new();
        for raw in ["any", "Administrator", "publisher", "member", "", "junk"] {
            let once = roles.normalize(raw);
            assert_eq!(roles.normalize(once.as_str()), once);
        }
    }

    #[test]
    fn test_alias_override_and_reset() {
        let roles = RoleTable::new();
        roles.set_alias("supervisor", CanonicalRole::Admin);
        assert_eq!(roles.normalize("supervisor"), CanonicalRole::Admin);

        roles.reset();
        assert_eq!(roles.normalize("supervisor"), CanonicalRole::Pending);
        assert_eq!(roles.normalize("admin"), CanonicalRole::Admin);
    }
}
