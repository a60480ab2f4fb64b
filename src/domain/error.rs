//! Domain error types.

/// Top-level error type for pricecast.
#[derive(Debug, thiserror::Error)]
pub enum PricecastError {
    #[error("missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("parse error in row {row}, column {column}: {reason}")]
    Parse {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("duplicate date {date} in input series")]
    DuplicateDate { date: chrono::NaiveDate },

    #[error("input exceeds the {limit}-row limit (reached row {rows})")]
    TooManyRows { rows: usize, limit: usize },

    #[error("insufficient data for {stage}: have {rows} rows, need {minimum}")]
    InsufficientData {
        stage: String,
        rows: usize,
        minimum: usize,
    },

    #[error("unsupported model: {name}")]
    UnsupportedModel { name: String },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to serialize report: {reason}")]
    Serialize { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PricecastError {
    /// Process exit status for this error family.
    pub fn exit_status(&self) -> u8 {
        match self {
            PricecastError::Io(_) | PricecastError::Serialize { .. } => 1,
            PricecastError::ConfigParse { .. } | PricecastError::ConfigInvalid { .. } => 2,
            PricecastError::Schema { .. }
            | PricecastError::Parse { .. }
            | PricecastError::DuplicateDate { .. }
            | PricecastError::TooManyRows { .. } => 3,
            PricecastError::UnsupportedModel { .. } | PricecastError::InvalidParameter { .. } => 4,
            PricecastError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&PricecastError> for std::process::ExitCode {
    fn from(err: &PricecastError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn schema_error_lists_missing_columns() {
        let err = PricecastError::Schema {
            missing: vec!["Date".into(), "Close".into()],
        };
        assert_eq!(err.to_string(), "missing required column(s): Date, Close");
    }

    #[test]
    fn parse_error_display() {
        let err = PricecastError::Parse {
            row: 3,
            column: "Close".into(),
            reason: "not a number".into(),
        };
        assert_eq!(
            err.to_string(),
            "parse error in row 3, column Close: not a number"
        );
    }

    #[test]
    fn duplicate_date_display() {
        let err = PricecastError::DuplicateDate {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        };
        assert_eq!(err.to_string(), "duplicate date 2024-01-02 in input series");
    }

    #[test]
    fn insufficient_data_display() {
        let err = PricecastError::InsufficientData {
            stage: "test split".into(),
            rows: 0,
            minimum: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for test split: have 0 rows, need 1"
        );
    }

    #[test]
    fn exit_status_by_family() {
        let io = PricecastError::Io(std::io::Error::other("x"));
        assert_eq!(io.exit_status(), 1);
        let config = PricecastError::ConfigInvalid {
            section: "model".into(),
            key: "kind".into(),
            reason: "empty".into(),
        };
        assert_eq!(config.exit_status(), 2);
        let rows = PricecastError::TooManyRows { rows: 5, limit: 4 };
        assert_eq!(rows.exit_status(), 3);
        let model = PricecastError::UnsupportedModel { name: "svm".into() };
        assert_eq!(model.exit_status(), 4);
        let data = PricecastError::InsufficientData {
            stage: "features".into(),
            rows: 0,
            minimum: 1,
        };
        assert_eq!(data.exit_status(), 5);
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PricecastError = io.into();
        assert!(matches!(err, PricecastError::Io(_)));
    }
}
