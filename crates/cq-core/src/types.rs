//! Common types used throughout content-query

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;

/// Target wire dialect of the content API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// High-level service dialect
    #[default]
    Service,
    /// Entity service dialect
    Entity,
    /// Low-level query engine dialect
    Engine,
    /// REST API dialect
    Rest,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [Self::Service, Self::Entity, Self::Engine, Self::Rest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Entity => "entity",
            Self::Engine => "engine",
            Self::Rest => "rest",
        }
    }

    /// Whether locale and publication state are part of this dialect
    pub fn supports_locale(&self) -> bool {
        !matches!(self, Self::Engine)
    }
}

impl FromStr for Dialect {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "service" => Ok(Self::Service),
            "entity" | "entity_service" | "entityservice" => Ok(Self::Entity),
            "engine" | "query_engine" | "queryengine" => Ok(Self::Engine),
            "rest" | "rest_api" | "restapi" => Ok(Self::Rest),
            _ => Err(QueryError::UnknownDialect(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 1-9, oldest first)
    #[default]
    Asc,
    /// Descending order (Z-A, 9-1, newest first)
    Desc,
}

impl SortDirection {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(QueryError::UnknownSortDirection(s.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication state variant of the requested content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationState {
    /// Drafts and published entries
    Preview,
    /// Published entries only
    Live,
}

impl PublicationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Live => "live",
        }
    }
}

impl FromStr for PublicationState {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "preview" => Ok(Self::Preview),
            "live" => Ok(Self::Live),
            _ => Err(QueryError::UnknownPublicationState(s.to_string())),
        }
    }
}

impl fmt::Display for PublicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_parsing() {
        assert_eq!("service".parse::<Dialect>(), Ok(Dialect::Service));
        assert_eq!("Entity".parse::<Dialect>(), Ok(Dialect::Entity));
        assert_eq!("query_engine".parse::<Dialect>(), Ok(Dialect::Engine));
        assert_eq!("REST".parse::<Dialect>(), Ok(Dialect::Rest));
        assert!(matches!(
            "graphql".parse::<Dialect>(),
            Err(QueryError::UnknownDialect(_))
        ));
        assert_eq!(Dialect::default(), Dialect::Service);
    }

    #[test]
    fn test_dialect_locale_support() {
        assert!(Dialect::Service.supports_locale());
        assert!(Dialect::Entity.supports_locale());
        assert!(Dialect::Rest.supports_locale());
        assert!(!Dialect::Engine.supports_locale());
    }

    #[test]
    fn test_sort_direction() {
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("up".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_publication_state() {
        assert_eq!("live".parse::<PublicationState>(), Ok(PublicationState::Live));
        assert_eq!(PublicationState::Preview.to_string(), "preview");
        assert!("draft".parse::<PublicationState>().is_err());
    }
}
