use super::LoggerError;

pub type LoggerResult<R> = Result<R, LoggerError>;

pub(crate) trait LoggerResultHelper<T> {
    fn context(self, context: &str) -> LoggerResult<T>;
}

impl<T, E> LoggerResultHelper<T> for Result<T, E>
where
    E: std::error::Error,
{
    fn context(self, context: &str) -> LoggerResult<T> {
        self.map_err(|e| LoggerError::Default(format!("{context}: {e}")))
    }
}
