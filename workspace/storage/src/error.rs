use thiserror::Error;

/// Error types for the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A row addressed by id (or code) does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// An order line references a book that does not exist
    #[error("Book not found: {0}")]
    BookNotFound(i32),

    /// Registration or profile change collides with an existing account
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Category slug collides with an existing category
    #[error("Slug already in use: {0}")]
    SlugTaken(String),

    /// Points redemption with an insufficient balance
    #[error("Not enough points: {required} required, {available} available")]
    InsufficientPoints { required: i32, available: i32 },

    /// Admin accounts are never deleted
    #[error("Cannot delete admin users")]
    AdminUndeletable,

    /// Input rejected by a storage-level rule
    #[error("{0}")]
    Invalid(String),
}

impl StorageError {
    pub(crate) fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }
}

/// Type alias for Result with StorageError
pub type Result<T> = std::result::Result<T, StorageError>;
