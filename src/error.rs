// Error taxonomy for the data access layer
// Every store operation returns one of these; nothing here is fatal to the
// process. The CLI prints them, the server maps them to HTTP statuses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed or missing input (required field absent, unknown column,
    /// type mismatch such as a non-numeric balance).
    #[error("validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// Referenced primary key does not exist.
    #[error("{table}: no row with id '{id}'")]
    NotFound { table: String, id: String },

    /// A debit would take the account below the minimum balance floor.
    #[error(
        "insufficient balance: {balance:.2} available, debit of {requested:.2} \
         would drop below the {floor:.2} minimum"
    )]
    InsufficientBalance {
        balance: f64,
        requested: f64,
        floor: f64,
    },

    /// Table name not in the registry.
    #[error("unknown table: '{0}'")]
    UnknownTable(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(table: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            table: table.into(),
            id: id.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = StoreError::validation("account_balance", "expected a number");
        assert!(err.to_string().contains("account_balance"));

        let err = StoreError::not_found("accounts", "ACC999");
        assert!(err.to_string().contains("ACC999"));

        let err = StoreError::InsufficientBalance {
            balance: 1500.0,
            requested: 1000.0,
            floor: 1000.0,
        };
        assert!(err.to_string().contains("1500.00"));
    }
}
