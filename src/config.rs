//! Configuration for the MySQL query generator
//!
//! Provides a builder pattern for configuring statement defaults.

use chrono::{FixedOffset, Offset, Utc};

/// Default storage engine for `CREATE TABLE`
pub const DEFAULT_ENGINE: &str = "InnoDB";

/// Configuration shared by every statement a generator produces
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Storage engine used when a table does not name one (default: "InnoDB")
    pub engine: String,
    /// Default charset appended as `DEFAULT CHARSET=...`
    pub charset: Option<String>,
    /// Default collation appended as `COLLATE ...`
    pub collate: Option<String>,
    /// Default row format appended as `ROW_FORMAT=...`
    pub row_format: Option<String>,
    /// Offset applied when escaping date-time values (default: +00:00)
    pub timezone: FixedOffset,
}

impl GeneratorConfig {
    /// Create a new configuration builder
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::new()
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfigBuilder::new().build()
    }
}

/// Builder for GeneratorConfig
#[derive(Debug)]
pub struct GeneratorConfigBuilder {
    engine: String,
    charset: Option<String>,
    collate: Option<String>,
    row_format: Option<String>,
    timezone: FixedOffset,
}

impl GeneratorConfigBuilder {
    pub fn new() -> Self {
        Self {
            engine: DEFAULT_ENGINE.to_string(),
            charset: None,
            collate: None,
            row_format: None,
            timezone: utc_offset(),
        }
    }

    /// Set the default storage engine (default: "InnoDB")
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    /// Set the default table charset
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Set the default table collation
    pub fn collate(mut self, collate: impl Into<String>) -> Self {
        self.collate = Some(collate.into());
        self
    }

    /// Set the default row format
    pub fn row_format(mut self, row_format: impl Into<String>) -> Self {
        self.row_format = Some(row_format.into());
        self
    }

    /// Set the offset date-time literals are rendered in
    pub fn timezone(mut self, offset: FixedOffset) -> Self {
        self.timezone = offset;
        self
    }

    /// Build the configuration
    pub fn build(self) -> GeneratorConfig {
        GeneratorConfig {
            engine: self.engine,
            charset: self.charset,
            collate: self.collate,
            row_format: self.row_format,
            timezone: self.timezone,
        }
    }
}

impl Default for GeneratorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
