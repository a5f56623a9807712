use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Envelope for paged listings.
#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub success: bool,
    pub count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub data: Vec<T>,
}

impl<T> PagedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        Self {
            success: true,
            count: total,
            total_pages: crate::utils::query::total_pages(total, limit),
            current_page: page,
            data,
        }
    }
}
