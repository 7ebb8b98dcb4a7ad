use thiserror::Error;

/// Errors raised while decoding a packed pizza or parsing an order line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown pizza type byte {0}")]
    UnknownPizzaType(u8),

    #[error("unknown size byte {0}")]
    UnknownSize(u8),

    #[error("unrecognised pizza type {0:?}")]
    UnknownPizzaName(String),

    #[error("order segment does not match the expected grammar: {0:?}")]
    MalformedSegment(String),

    #[error("order quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),
}
