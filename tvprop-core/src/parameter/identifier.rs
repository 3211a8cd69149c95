use serde::{Deserialize, Serialize};
use std::fmt;

/// Field of an [Identifier] used to look up substances in parameter files.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierOption {
    Cas,
    #[default]
    Name,
    Formula,
}

/// Names under which a substance can be found in a parameter file.
///
/// Name lookups ignore case, CAS numbers and formulas have to match exactly.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl Identifier {
    pub fn from_name(name: &str) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// The identifier selected by `option`, if the record carries it.
    pub fn get(&self, option: IdentifierOption) -> Option<&str> {
        match option {
            IdentifierOption::Cas => self.cas.as_deref(),
            IdentifierOption::Name => self.name.as_deref(),
            IdentifierOption::Formula => self.formula.as_deref(),
        }
    }

    /// Key under which the record is stored for a lookup by `option`.
    pub(crate) fn key(&self, option: IdentifierOption) -> Option<String> {
        self.get(option).map(|id| lookup_key(id, option))
    }
}

/// Normalized form of a requested substance.
pub(crate) fn lookup_key(id: &str, option: IdentifierOption) -> String {
    match option {
        IdentifierOption::Name => id.trim().to_lowercase(),
        IdentifierOption::Cas | IdentifierOption::Formula => id.trim().to_string(),
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(name) = &self.name {
            parts.push(name.clone());
        }
        if let Some(cas) = &self.cas {
            parts.push(format!("cas {cas}"));
        }
        if let Some(formula) = &self.formula {
            parts.push(formula.clone());
        }
        if parts.is_empty() {
            write!(f, "<unnamed>")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}
