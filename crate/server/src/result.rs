use crate::error::HashaError;

pub type HResult<R> = Result<R, HashaError>;

/// A helper trait for `HResult` that provides additional methods for error handling.
pub trait HResultHelper<T> {
    /// Sets the context for the error.
    ///
    /// # Errors
    ///
    /// Returns a `HResult` with the specified context if the original result is an error.
    fn context(self, context: &str) -> HResult<T>;

    /// Sets the context for the error using a closure.
    ///
    /// # Errors
    ///
    /// Returns a `HResult` with the context returned by the closure if the original result is an error.
    fn with_context<O>(self, op: O) -> HResult<T>
    where
        O: FnOnce() -> String;
}

impl<T, E> HResultHelper<T> for Result<T, E>
where
    E: std::error::Error,
{
    fn context(self, context: &str) -> HResult<T> {
        self.map_err(|e| HashaError::ServerError(format!("{context}: {e}")))
    }

    fn with_context<O>(self, op: O) -> HResult<T>
    where
        O: FnOnce() -> String,
    {
        self.map_err(|e| HashaError::ServerError(format!("{}: {e}", op())))
    }
}

impl<T> HResultHelper<T> for Option<T> {
    fn context(self, context: &str) -> HResult<T> {
        self.ok_or_else(|| HashaError::ServerError(context.to_owned()))
    }

    fn with_context<O>(self, op: O) -> HResult<T>
    where
        O: FnOnce() -> String,
    {
        self.ok_or_else(|| HashaError::ServerError(op()))
    }
}
