//! Product Aggregate

use thiserror::Error;
use uuid::Uuid;

/// How a new product names its category: by id, or by a name that is created on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryRef {
    Id(Uuid),
    Name(String),
}

impl CategoryRef {
    pub fn from_parts(id: Option<Uuid>, name: Option<&str>) -> Result<Self, CategoryRefError> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        match (id, name) {
            (Some(id), None) => Ok(Self::Id(id)),
            (None, Some(name)) => Ok(Self::Name(name.to_string())),
            (None, None) => Err(CategoryRefError::Missing),
            (Some(_), Some(_)) => Err(CategoryRefError::Ambiguous),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryRefError {
    #[error("Either categoryId or categoryName must be provided")]
    Missing,
    #[error("Provide categoryId or categoryName, not both")]
    Ambiguous,
}
