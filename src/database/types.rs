//! Warehouse table identifiers

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// A bare SQL identifier
static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// A validated `dataset.table` name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    dataset: String,
    table: String,
}

impl TableName {
    /// Parse `dataset.table`, rejecting anything that is not two plain identifiers
    pub fn parse(name: &str) -> Result<Self> {
        let (dataset, table) = name.split_once('.').ok_or_else(|| {
            Error::load(name, "table name must have the form 'dataset.table'")
        })?;

        for part in [dataset, table] {
            if !IDENTIFIER_REGEX.is_match(part) {
                return Err(Error::load(
                    name,
                    format!("'{part}' is not a valid identifier"),
                ));
            }
        }

        Ok(Self {
            dataset: dataset.to_string(),
            table: table.to_string(),
        })
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.table)
    }
}

impl FromStr for TableName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
