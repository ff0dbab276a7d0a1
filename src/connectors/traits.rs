use crate::connectors::assessment::Assessment;
use crate::connectors::prompt::AssessmentRequest;
use crate::error::AdvisoryError;
use async_trait::async_trait;

/// The external advisory service. One call per activation; the engine
/// never retries on its own.
#[async_trait]
pub trait AdvisoryClient: Send + Sync {
    async fn assess(&self, request: &AssessmentRequest) -> Result<Assessment, AdvisoryError>;
}
