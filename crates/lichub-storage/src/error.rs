/// Errors surfaced by the entity store.
///
/// The API layer maps these onto HTTP statuses: [`StoreError::NotFound`]
/// → 404, [`StoreError::MissingReference`] → 400 (a validation failure,
/// the caller named a row that does not exist), everything else → 500
/// with the detail logged server-side only.
///
/// # Examples
///
/// ```rust
/// use lichub_storage::error::StoreError;
///
/// let err = StoreError::NotFound { entity: "customer", id: 42 };
/// assert!(err.to_string().contains("customer"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The operation targeted an id with no matching row.
    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: i64 },

    /// A submitted foreign key or association id does not resolve to an
    /// existing row. The surrounding transaction is rolled back.
    #[error("{entity} with id {id} does not exist")]
    MissingReference { entity: &'static str, id: i64 },

    /// An insert succeeded but the row could not be read back, which
    /// should be unreachable under normal conditions.
    #[error("insert of {entity} succeeded but the row could not be read back")]
    InsertReadback { entity: &'static str },

    /// An underlying database error.
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    /// A raw-query column could not be decoded into the expected type.
    #[error("row decode error: {0:?}")]
    Decode(sea_orm::TryGetError),
}

impl From<sea_orm::TryGetError> for StoreError {
    fn from(err: sea_orm::TryGetError) -> Self {
        StoreError::Decode(err)
    }
}

/// Convenience `Result` alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
