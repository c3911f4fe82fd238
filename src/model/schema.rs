//! Column metadata and declared type classification

/// Broad family of a store-declared column type
///
/// Classification only looks at the declared type name, never at the values,
/// so a column keeps its family even when every row is null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    Binary,
    Boolean,
    Integer,
    Decimal,
    Float,
    Text,
    DateTime,
    Date,
    Time,
    Unknown,
}

impl TypeFamily {
    /// Classify a declared type name such as `VARBINARY(8)` or `decimal(10,2)`
    pub fn classify(source_type: &str) -> TypeFamily {
        let upper = source_type.trim().to_ascii_uppercase();
        let base = upper
            .split('(')
            .next()
            .unwrap_or_default()
            .trim();

        if base.is_empty() {
            return TypeFamily::Unknown;
        }

        if base.contains("BINARY") || base.contains("ROWVERSION") || base.contains("BLOB") || base == "IMAGE" {
            return TypeFamily::Binary;
        }

        match base {
            "BIT" | "BOOL" | "BOOLEAN" => TypeFamily::Boolean,
            "DATE" => TypeFamily::Date,
            "TIME" => TypeFamily::Time,
            "TIMESTAMP" | "SMALLDATETIME" | "DATETIMEOFFSET" => TypeFamily::DateTime,
            "DECIMAL" | "NUMERIC" | "MONEY" | "SMALLMONEY" => TypeFamily::Decimal,
            "REAL" | "FLOAT" | "DOUBLE" | "DOUBLE PRECISION" => TypeFamily::Float,
            _ if base.starts_with("DATETIME") => TypeFamily::DateTime,
            _ if base.contains("INT") => TypeFamily::Integer,
            _ if base.contains("CHAR") || base.contains("TEXT") || base.contains("CLOB") => {
                TypeFamily::Text
            }
            _ => TypeFamily::Unknown,
        }
    }

    /// True for raw binary and version-stamp types
    pub fn is_binary(self) -> bool {
        self == TypeFamily::Binary
    }
}

/// Column metadata
#[derive(Debug, Clone)]
pub struct Column {
    /// Column name as reported by the query
    pub name: String,
    /// Column index (0-based position)
    pub index: usize,
    /// Declared type name from the originating store, empty when unknown
    pub source_type: String,
}

impl Column {
    /// Create a column with a declared source type
    pub fn with_type(name: impl Into<String>, index: usize, source_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index,
            source_type: source_type.into(),
        }
    }

    /// Type family of the declared source type
    pub fn family(&self) -> TypeFamily {
        TypeFamily::classify(&self.source_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_binary_family() {
        assert_eq!(TypeFamily::classify("VARBINARY(8)"), TypeFamily::Binary);
        assert_eq!(TypeFamily::classify("varbinary(max)"), TypeFamily::Binary);
        assert_eq!(TypeFamily::classify("ROWVERSION"), TypeFamily::Binary);
        assert_eq!(TypeFamily::classify("BLOB"), TypeFamily::Binary);
        assert!(TypeFamily::classify("BINARY").is_binary());
    }

    #[test]
    fn test_classify_scalar_families() {
        assert_eq!(TypeFamily::classify("DECIMAL(10,2)"), TypeFamily::Decimal);
        assert_eq!(TypeFamily::classify("BIGINT"), TypeFamily::Integer);
        assert_eq!(TypeFamily::classify("NVARCHAR(100)"), TypeFamily::Text);
        assert_eq!(TypeFamily::classify("DATETIME2"), TypeFamily::DateTime);
        assert_eq!(TypeFamily::classify("DATE"), TypeFamily::Date);
        assert_eq!(TypeFamily::classify("BIT"), TypeFamily::Boolean);
        assert_eq!(TypeFamily::classify(""), TypeFamily::Unknown);
        assert_eq!(TypeFamily::classify("GEOGRAPHY"), TypeFamily::Unknown);
    }
}
