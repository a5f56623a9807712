//! Buffered multipart form reader shared by the upload endpoints.

use axum::extract::Multipart;
use service_core::error::AppError;
use std::collections::HashMap;

pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// All text and file parts of a form, read into memory. Files larger than
/// `max_file_bytes` are rejected up front.
pub struct FormData {
    texts: HashMap<String, Vec<String>>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart, max_file_bytes: usize) -> Result<Self, AppError> {
        let mut texts: HashMap<String, Vec<String>> = HashMap::new();
        let mut files = HashMap::new();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
        })? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if let Some(filename) = field.file_name().map(str::to_string) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        AppError::BadRequest(anyhow::anyhow!("Failed to read file {}: {}", name, e))
                    })?
                    .to_vec();
                if data.len() > max_file_bytes {
                    return Err(AppError::BadRequest(anyhow::anyhow!(
                        "File {} exceeds the {} byte limit",
                        name,
                        max_file_bytes
                    )));
                }
                // Empty file parts count as absent.
                if !data.is_empty() {
                    files.insert(name, UploadedFile { filename, content_type, data });
                }
            } else {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read field {}: {}", name, e))
                })?;
                texts.entry(name).or_default().push(value);
            }
        }

        Ok(Self { texts, files })
    }

    /// First non-empty value of a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .get(name)
            .and_then(|values| values.iter().map(|v| v.trim()).find(|v| !v.is_empty()))
    }

    /// All non-empty values of a repeated text field.
    pub fn text_values(&self, name: &str) -> Vec<String> {
        self.texts
            .get(name)
            .map(|values| {
                values
                    .iter()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Collects the names of required fields missing from the form, so the
/// whole shortfall is reported in one response.
pub fn missing_fields(form: &FormData, texts: &[&str], files: &[&str]) -> Vec<String> {
    let mut missing = Vec::new();
    for name in texts {
        if form.text(name).is_none() {
            missing.push((*name).to_string());
        }
    }
    for name in files {
        if form.file(name).is_none() {
            missing.push((*name).to_string());
        }
    }
    missing
}
