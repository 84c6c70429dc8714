//! Conversions from external infrastructure errors into domain errors.
//!
//! Storage errors split on the direction of the failed operation: reads
//! surface as `ReadFailed`, writes as `WriteFailed`. `QueryReturnedNoRows`
//! becomes `NotFound` either way so repositories can bubble it with `?`.

use jimpitan_domain::JimpitanError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → JimpitanError */
/* -------------------------------------------------------------------------- */

fn describe_sql_error(err: &SqlError) -> String {
    use rusqlite::ffi::ErrorCode;
    use rusqlite::Error as RE;

    match err {
        RE::SqliteFailure(cause, maybe_message) => {
            let message = maybe_message.clone().unwrap_or_default();
            match (cause.code, cause.extended_code) {
                (ErrorCode::DatabaseBusy, _) => "database is busy".into(),
                (ErrorCode::DatabaseLocked, _) => "database is locked".into(),
                (ErrorCode::ConstraintViolation, 2067) => "unique constraint violation".into(),
                (ErrorCode::ConstraintViolation, 787) => {
                    "foreign key constraint violation".into()
                }
                _ => format!(
                    "sqlite failure {:?} (code {}): {}",
                    cause.code, cause.extended_code, message
                ),
            }
        }
        RE::FromSqlConversionFailure(_, _, cause) => {
            format!("failed to convert sqlite value: {cause}")
        }
        RE::InvalidColumnType(_, _, ty) => format!("invalid column type: {ty}"),
        RE::Utf8Error(_) => "invalid UTF-8 returned from sqlite".into(),
        RE::InvalidParameterName(parameter_name) => {
            format!("invalid parameter name: {parameter_name}")
        }
        RE::InvalidQuery => "invalid SQL query".into(),
        other => other.to_string(),
    }
}

/// Map a sqlite error raised by a read operation.
pub fn map_read_error(err: SqlError) -> JimpitanError {
    if matches!(err, SqlError::QueryReturnedNoRows) {
        return JimpitanError::NotFound("no rows returned by query".into());
    }
    JimpitanError::ReadFailed(describe_sql_error(&err))
}

/// Map a sqlite error raised by a write operation.
pub fn map_write_error(err: SqlError) -> JimpitanError {
    if matches!(err, SqlError::QueryReturnedNoRows) {
        return JimpitanError::NotFound("no rows returned by query".into());
    }
    JimpitanError::WriteFailed(describe_sql_error(&err))
}

/// Map a sqlite error raised while provisioning or probing the database.
///
/// Schema and health failures mean the store cannot be trusted at all,
/// which is a different condition from one read or write going wrong.
pub fn map_sql_error(err: SqlError) -> JimpitanError {
    JimpitanError::StorageUnavailable(describe_sql_error(&err))
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → JimpitanError */
/* -------------------------------------------------------------------------- */

/// Map an HTTP transport error. Every shape lands on `Network`: the
/// queue/retry machinery treats timeouts, refused connections and bad
/// statuses identically.
pub fn map_http_error(err: HttpError) -> JimpitanError {
    if err.is_timeout() {
        return JimpitanError::Network("HTTP request timed out".into());
    }

    if err.is_connect() {
        return JimpitanError::Network("HTTP connection failure".into());
    }

    if let Some(status) = err.status() {
        let code = status.as_u16();
        return JimpitanError::Network(format!(
            "HTTP {} {}",
            code,
            status.canonical_reason().unwrap_or("unknown status")
        ));
    }

    JimpitanError::Network(err.to_string())
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → JimpitanError */
/* -------------------------------------------------------------------------- */

/// Map a blocking-task join failure from the storage layer.
pub fn map_join_error(err: JoinError) -> JimpitanError {
    if err.is_cancelled() {
        JimpitanError::Internal("storage task cancelled".into())
    } else {
        JimpitanError::Internal(format!("storage task panic: {err}"))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
