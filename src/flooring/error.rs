use crate::store::codec::RecordError;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlooringError {
    #[error("No orders found on {0}")]
    NoOrdersOnDate(NaiveDate),

    #[error("Order #{order_number} not found on {date}")]
    OrderNotFound { order_number: u32, date: NaiveDate },

    #[error("{context}: {source}")]
    Persistence {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record in {origin}, line {line}: {source}")]
    Malformed {
        origin: String,
        line: usize,
        #[source]
        source: RecordError,
    },

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("Amount out of range computing {0}")]
    AmountOutOfRange(&'static str),

    #[error("No order numbers left after #{0}")]
    OrderNumbersExhausted(u32),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FlooringError {
    /// Wrap an I/O failure with a short description of what was being attempted.
    pub fn persistence(context: impl Into<String>, source: std::io::Error) -> Self {
        FlooringError::Persistence {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlooringError>;
