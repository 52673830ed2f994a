//! Request-scoped context
//!
//! Every handler call receives a `Context` carrying a request id and a
//! cancellation signal. The host wraps each dispatch in the context's span
//! so API client logs can be correlated with the Terraform operation.

use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Pass this as first parameter to all async handler methods
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    request_id: Uuid,
    operation: String,
    done: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        Self::for_operation("unspecified")
    }

    pub fn for_operation(operation: impl Into<String>) -> Self {
        let (done_tx, done) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner {
                request_id: Uuid::new_v4(),
                operation: operation.into(),
                done,
                done_tx,
            }),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.inner.request_id
    }

    pub fn operation(&self) -> &str {
        &self.inner.operation
    }

    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "tf_request",
            request_id = %self.inner.request_id,
            operation = %self.inner.operation
        )
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.inner.request_id)
            .field("operation", &self.inner.operation)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
