use std::future::Future;
use std::pin::Pin;

use crate::core::{InferenceEnvelope, InferenceError, InferenceRequest};

// ---------------------------------------------------------------------------
// InferenceClient: the external text-generation service (object-safe async)
// ---------------------------------------------------------------------------

/// One request, one envelope. Implementations enforce their own timeout and
/// map every transport or service failure into `InferenceError`.
pub trait InferenceClient: Send + Sync {
    fn create_response<'a>(
        &'a self,
        request: &'a InferenceRequest,
    ) -> Pin<Box<dyn Future<Output = Result<InferenceEnvelope, InferenceError>> + Send + 'a>>;
}
