/// Boxed error accepted from handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A handler panicked instead of returning.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Handler panicked: {message}")]
pub struct HandlerPanic {
    message: String,
}

impl HandlerPanic {
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_owned(),
                Err(_) => String::from("non-string panic payload"),
            },
        };

        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Stand-in result held while a handler owns the current value.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Result is in use by a running handler")]
pub struct ResultInUse;
