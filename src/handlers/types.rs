//! Shared response envelopes for the API handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard wrapper for successful responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Plain acknowledgement payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "BRANCH_CREATED_SUCCESSFULLY")]
    pub message: String,
}
