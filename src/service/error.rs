//! Downstream failure taxonomy
//!
//! `Display` output is what handlers interpolate into the error envelope, so
//! the messages are written for the API's clients.

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("No se pudo obtener la conexión a la base de datos: {0}")]
    Connection(String),

    #[error("Error al ejecutar procedimiento {procedure}: {message}")]
    Procedure {
        procedure: &'static str,
        message: String,
    },

    /// The procedure returned no row where one was required
    #[error("{0}")]
    NotFound(String),

    /// The procedure ran but refused the operation
    #[error("{0}")]
    Rejected(String),

    #[error("Resultado inesperado de {procedure}: {message}")]
    Decode {
        procedure: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn connection(err: &tokio_postgres::Error) -> Self {
        Self::Connection(db_message(err))
    }

    pub fn procedure(procedure: &'static str, err: &tokio_postgres::Error) -> Self {
        Self::Procedure {
            procedure,
            message: db_message(err),
        }
    }

    pub fn decode(procedure: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            procedure,
            message: message.into(),
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Prefer the server's own message over the driver's wrapper text
fn db_message(err: &tokio_postgres::Error) -> String {
    err.as_db_error()
        .map_or_else(|| err.to_string(), |db| db.message().to_string())
}
