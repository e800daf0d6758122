/// Failure to acquire a resource the renderer cannot run without.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("{resource} unavailable: {reason}")]
    Unavailable {
        resource: &'static str,
        reason: String,
    },
}

impl ResourceError {
    pub fn unavailable(resource: &'static str, reason: impl ToString) -> Self {
        Self::Unavailable {
            resource,
            reason: reason.to_string(),
        }
    }
}
