// Query classification: identifier digits vs normalized text

use crate::error::{Error, Result};
use crate::normalize::{digits_only, normalize};
use serde::{Deserialize, Serialize};

/// Minimum digit count for a query to be treated as an identifier
pub const MIN_IDENTIFIER_DIGITS: usize = 6;

/// A single classified query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedQuery {
    pub raw: String,
    /// Identifier candidate, empty if none
    pub digits: String,
    /// Canonical text candidate
    pub text: String,
    pub is_numeric: bool,
}

impl ClassifiedQuery {
    pub fn classify(raw: &str) -> Self {
        let digits = digits_only(raw);
        let text = normalize(raw);
        let is_numeric = digits.len() >= MIN_IDENTIFIER_DIGITS;
        Self {
            raw: raw.to_string(),
            digits,
            text,
            is_numeric,
        }
    }

    /// True when the query carries nothing that could ever match
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty() && self.text.is_empty()
    }
}

/// Query material as supplied by the HTTP layer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryMaterial {
    /// Free-text query
    #[serde(default)]
    pub query: Option<String>,
    /// Explicit identifier (CPF/CNS)
    #[serde(default)]
    pub query_cpf: Option<String>,
    /// Explicit name hint
    #[serde(default)]
    pub query_nome: Option<String>,
}

impl QueryMaterial {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn identifier(cpf: impl Into<String>, name: Option<String>) -> Self {
        Self {
            query_cpf: Some(cpf.into()),
            query_nome: name,
            ..Default::default()
        }
    }
}

/// Which pass of a two-phase search produced a sheet's matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPhase {
    Primary,
    Secondary,
}

/// The classified search: a primary key and an optional fallback key
/// consulted only when the primary pass finds nothing in a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub primary: ClassifiedQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<ClassifiedQuery>,
}

impl SearchQuery {
    /// Classify caller material, rejecting requests with nothing usable.
    ///
    /// An explicit identifier takes priority; a name supplied next to it
    /// becomes the fallback. The free-text `query` is used when no usable
    /// explicit field is present. An identifier with fewer than
    /// [`MIN_IDENTIFIER_DIGITS`] digits is rejected.
    pub fn from_material(material: &QueryMaterial) -> Result<Self> {
        let usable = |field: &Option<String>| {
            field
                .as_deref()
                .map(ClassifiedQuery::classify)
                .filter(|q| !q.is_empty())
        };

        let identifier = usable(&material.query_cpf).filter(|q| !q.digits.is_empty());
        if let Some(id) = &identifier {
            // A short digit run would fall through to substring text matching
            if !id.is_numeric {
                return Err(Error::Validation(format!(
                    "query_cpf must contain at least {} digits",
                    MIN_IDENTIFIER_DIGITS
                )));
            }
        }
        let name = usable(&material.query_nome).filter(|q| !q.text.is_empty());
        let free = usable(&material.query);

        match (identifier, name, free) {
            (Some(id), name, free) => Ok(Self {
                primary: id,
                secondary: name.or(free),
            }),
            (None, Some(name), Some(free)) => Ok(Self {
                secondary: (free != name).then_some(name),
                primary: free,
            }),
            (None, Some(name), None) => Ok(Self {
                primary: name,
                secondary: None,
            }),
            (None, None, Some(free)) => Ok(Self {
                primary: free,
                secondary: None,
            }),
            (None, None, None) => Err(Error::Validation(
                "one of query, query_cpf or query_nome must be provided".into(),
            )),
        }
    }

    pub fn single(raw: &str) -> Result<Self> {
        Self::from_material(&QueryMaterial::text(raw))
    }

    pub fn has_fallback(&self) -> bool {
        self.secondary.is_some()
    }
}
