//! Catalog types
//!
//! This module defines the values a catalog scan works with:
//! - TypeName: Non-empty name of a catalog partition
//! - TypeKind: Classification of a type (plain record or recoverable transaction)
//! - TypeSelector: Filter over type names
//! - CatalogEntry: One `(type, uid)` pair

use crate::error::{CatalogError, CatalogResult};
use crate::uid::Uid;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Substring that marks a type as holding recoverable transaction state
pub const RECOVERABLE_TYPE_MARKER: &str = "StateManager";

/// Name of a catalog partition
///
/// Never empty: the empty string terminates a packed type directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeName(String);

impl TypeName {
    /// Create a type name, rejecting the empty string
    pub fn new(name: impl Into<String>) -> CatalogResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(CatalogError::invalid_argument(
                "type name must not be empty",
            ));
        }
        Ok(TypeName(name))
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify this type
    pub fn kind(&self) -> TypeKind {
        TypeKind::classify(&self.0)
    }
}

impl TryFrom<String> for TypeName {
    type Error = CatalogError;

    fn try_from(name: String) -> CatalogResult<Self> {
        TypeName::new(name)
    }
}

impl From<TypeName> for String {
    fn from(name: TypeName) -> String {
        name.0
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification of a catalog type, resolved once per type name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Entries are plain records
    Plain,
    /// Entries wrap recoverable transaction state and get a recovered view
    RecoverableTransaction,
}

impl TypeKind {
    /// Classify a raw type name
    pub fn classify(name: &str) -> Self {
        if name.contains(RECOVERABLE_TYPE_MARKER) {
            TypeKind::RecoverableTransaction
        } else {
            TypeKind::Plain
        }
    }

    /// Whether entries of this kind carry a recovered view
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TypeKind::RecoverableTransaction)
    }
}

/// Filter over catalog type names
///
/// Matching is exact-string. Once parsed a selector does not change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeSelector {
    /// Every type
    #[default]
    All,
    /// Only the listed types, in the order first given
    Only(Vec<String>),
}

impl TypeSelector {
    /// Parse an optional comma-delimited list; `None` selects every type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a list that names no type.
    pub fn parse(list: Option<&str>) -> CatalogResult<Self> {
        match list {
            None => Ok(TypeSelector::All),
            Some(list) => Self::from_list(list),
        }
    }

    /// Parse a comma-delimited list of exact type names
    ///
    /// Empty segments (`"A,,B"`, trailing commas) are dropped: they could
    /// only ever match the directory terminator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when no type name remains.
    pub fn from_list(list: &str) -> CatalogResult<Self> {
        let mut names: Vec<String> = Vec::new();
        for name in list.split(',').filter(|name| !name.is_empty()) {
            if !names.iter().any(|seen| seen == name) {
                names.push(name.to_string());
            }
        }
        if names.is_empty() {
            return Err(CatalogError::invalid_argument(format!(
                "type selector '{}' names no type",
                list
            )));
        }
        Ok(TypeSelector::Only(names))
    }

    /// Build a selector from explicit names
    pub fn only<I, S>(names: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::from_list(&joined)
    }

    /// Whether this selector admits every type
    pub fn is_all(&self) -> bool {
        matches!(self, TypeSelector::All)
    }

    /// Whether `type_name` passes this selector
    pub fn matches(&self, type_name: &str) -> bool {
        match self {
            TypeSelector::All => true,
            TypeSelector::Only(names) => names.iter().any(|name| name == type_name),
        }
    }
}

impl FromStr for TypeSelector {
    type Err = CatalogError;

    fn from_str(s: &str) -> CatalogResult<Self> {
        Self::from_list(s)
    }
}

impl fmt::Display for TypeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSelector::All => f.write_str("<all types>"),
            TypeSelector::Only(names) => f.write_str(&names.join(",")),
        }
    }
}

/// One `(type, uid)` pair found by a scan
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Type the entry is filed under
    pub type_name: TypeName,
    /// Uid of the entry
    pub uid: Uid,
}

impl CatalogEntry {
    /// Create an entry
    pub fn new(type_name: TypeName, uid: Uid) -> Self {
        CatalogEntry { type_name, uid }
    }

    /// Classification of the entry's type
    pub fn kind(&self) -> TypeKind {
        self.type_name.kind()
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.uid, self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_rejects_empty() {
        assert!(matches!(
            TypeName::new(""),
            Err(CatalogError::InvalidArgument(_))
        ));
        assert_eq!(TypeName::new("Alpha").unwrap().as_str(), "Alpha");
    }

    #[test]
    fn test_type_name_serde_rejects_empty() {
        let name: TypeName = serde_json::from_str("\"Alpha\"").unwrap();
        assert_eq!(name.as_str(), "Alpha");
        assert!(serde_json::from_str::<TypeName>("\"\"").is_err());
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            TypeKind::classify("/StateManager/BasicAction/TwoPhaseCoordinator/AtomicAction"),
            TypeKind::RecoverableTransaction
        );
        assert_eq!(TypeKind::classify("/Recovery/Xid"), TypeKind::Plain);
        // Case sensitive
        assert_eq!(TypeKind::classify("/statemanager/x"), TypeKind::Plain);
    }

    #[test]
    fn test_selector_none_is_all() {
        let selector = TypeSelector::parse(None).unwrap();
        assert!(selector.is_all());
        assert!(selector.matches("anything"));
    }

    #[test]
    fn test_selector_exact_match() {
        let selector = TypeSelector::from_list("Alpha,Gamma").unwrap();
        assert!(selector.matches("Alpha"));
        assert!(selector.matches("Gamma"));
        assert!(!selector.matches("Alph"));
        assert!(!selector.matches("AlphaBeta"));
        assert!(!selector.matches(""));
    }

    #[test]
    fn test_selector_rejects_empty() {
        assert!(matches!(
            TypeSelector::parse(Some("")),
            Err(CatalogError::InvalidArgument(_))
        ));
        assert!(TypeSelector::from_list(",,").is_err());
    }

    #[test]
    fn test_selector_drops_empty_segments_and_duplicates() {
        let selector: TypeSelector = "A,,B,A,".parse().unwrap();
        assert_eq!(
            selector,
            TypeSelector::Only(vec!["A".to_string(), "B".to_string()])
        );
        assert_eq!(selector.to_string(), "A,B");
    }

    #[test]
    fn test_selector_only() {
        let selector = TypeSelector::only(["Alpha", "Beta"]).unwrap();
        assert!(selector.matches("Beta"));
        assert!(TypeSelector::only(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_entry_display() {
        let uid = Uid::new();
        let entry = CatalogEntry::new(TypeName::new("Alpha").unwrap(), uid);
        assert_eq!(entry.to_string(), format!("{}, Alpha", uid));
        assert_eq!(entry.kind(), TypeKind::Plain);
    }
}
