/// Buffered multipart/form-data parsing
use crate::error::{Result, ServerError};
use axum::http::{header, HeaderMap};
use bytes::Bytes;
use std::collections::HashMap;

#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// Text fields and file parts of a form, keyed by field name
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    pub async fn parse(headers: &HeaderMap, body: Bytes) -> Result<Self> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ServerError::BadRequest("Missing Content-Type".to_string()))?;

        if !content_type.starts_with("multipart/form-data") {
            return Err(ServerError::BadRequest(
                "Expected multipart/form-data".to_string(),
            ));
        }

        let boundary = multer::parse_boundary(content_type)
            .map_err(|_| ServerError::BadRequest("Missing boundary".to_string()))?;

        let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Failed to parse multipart: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let data = field.bytes().await.map_err(|e| {
                        ServerError::BadRequest(format!("Failed to read file: {}", e))
                    })?;
                    form.files.insert(name, UploadedFile { filename, data });
                }
                None => {
                    let text = field.text().await.map_err(|e| {
                        ServerError::BadRequest(format!("Failed to read field: {}", e))
                    })?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Required text field
    pub fn text(&self, name: &str) -> Result<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ServerError::Validation(format!("Missing field: {name}")))
    }

    /// Required file part
    pub fn take_file(&mut self, name: &str) -> Result<UploadedFile> {
        self.files
            .remove(name)
            .ok_or_else(|| ServerError::Validation(format!("Missing file: {name}")))
    }
}
