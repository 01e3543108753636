//! Object storage for order attachments and catalog images
//!
//! One S3 bucket holds everything, keyed by convention:
//! - `orders/{order_id}/{file}` — checkout-level attachment
//! - `orders/{order_id}/products/{product_id}/{file}` — per-item attachment
//! - `products/{product_id}/{file}` — catalog product images
//! - `business/{business_id}/{file}` — business logos
//!
//! Reads resolve to presigned GET URLs; a missing object resolves to "no
//! image", not an error.

use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::presigning::PresigningConfig;
use std::time::Duration;

use shared::error::{AppError, ErrorCode};

use crate::cart::Attachment;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Maximum attachment size (10MB)
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Key for a checkout-level order attachment
pub fn order_attachment_key(order_id: i64, file_name: &str) -> String {
    format!("orders/{order_id}/{file_name}")
}

/// Key for a per-item order attachment
pub fn order_item_attachment_key(order_id: i64, product_id: i64, file_name: &str) -> String {
    format!("orders/{order_id}/products/{product_id}/{file_name}")
}

/// Key for a catalog product image
pub fn product_image_key(product_id: i64, file_name: &str) -> String {
    format!("products/{product_id}/{file_name}")
}

/// Key for a business logo
pub fn business_logo_key(business_id: i64, file_name: &str) -> String {
    format!("business/{business_id}/{file_name}")
}

/// Validate an uploaded attachment and derive its content type.
///
/// Rejects oversized, wrongly-typed, and undecodable files before any bytes
/// are held in the cart session.
pub fn validate_attachment(file_name: &str, data: &[u8]) -> Result<String, AppError> {
    if data.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::NoFileProvided,
            "Empty file",
        ));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large: {} bytes (max {})", data.len(), MAX_FILE_SIZE),
        ));
    }

    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!("Unsupported format: {ext}. Supported: png, jpg, jpeg, webp"),
        ));
    }

    // Validate image content, not just the extension
    image::load_from_memory(data).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidImageFile, format!("Invalid image: {e}"))
    })?;

    Ok(mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .to_string())
}

/// S3-backed object storage handle
#[derive(Clone)]
pub struct ObjectStorage {
    client: S3Client,
    bucket: String,
    presign_ttl: Duration,
}

impl ObjectStorage {
    pub async fn new(bucket: impl Into<String>, presign_ttl_secs: u64) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: S3Client::new(&aws_config),
            bucket: bucket.into(),
            presign_ttl: Duration::from_secs(presign_ttl_secs),
        }
    }

    /// Upload an object
    pub async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), BoxError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(data.into())
            .content_type(content_type)
            .send()
            .await?;
        Ok(())
    }

    /// Upload a cart attachment under the given key, logging but not
    /// propagating failure — attachments are supplementary and must never
    /// fail an order.
    pub async fn put_attachment_best_effort(&self, key: &str, attachment: &Attachment) {
        match self
            .put(key, attachment.data.clone(), &attachment.content_type)
            .await
        {
            Ok(()) => {
                tracing::info!(key = %key, "Order attachment uploaded");
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Order attachment upload failed, continuing");
            }
        }
    }

    /// Resolve a presigned GET URL for an object, or None when it does not
    /// exist.
    pub async fn public_url(&self, key: &str) -> Result<Option<String>, BoxError> {
        // Existence check first: presigning alone never touches the bucket
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => {}
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_not_found()) =>
            {
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }

        let presigning = PresigningConfig::expires_in(self.presign_ttl)?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await?;

        Ok(Some(presigned.uri().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_conventions() {
        assert_eq!(order_attachment_key(42, "note.png"), "orders/42/note.png");
        assert_eq!(
            order_item_attachment_key(42, 7, "ref.jpg"),
            "orders/42/products/7/ref.jpg"
        );
        assert_eq!(product_image_key(7, "front.webp"), "products/7/front.webp");
        assert_eq!(business_logo_key(3, "logo.png"), "business/3/logo.png");
    }

    #[test]
    fn test_validate_rejects_empty() {
        let err = validate_attachment("a.png", &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoFileProvided);
    }

    #[test]
    fn test_validate_rejects_oversized() {
        let data = vec![0u8; MAX_FILE_SIZE + 1];
        let err = validate_attachment("a.png", &data).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileTooLarge);
    }

    #[test]
    fn test_validate_rejects_unknown_extension() {
        let err = validate_attachment("a.pdf", &[1, 2, 3]).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFileFormat);
    }

    #[test]
    fn test_validate_rejects_corrupt_image() {
        // Right extension, garbage bytes
        let err = validate_attachment("a.png", &[1, 2, 3, 4]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidImageFile);
    }

    #[test]
    fn test_validate_accepts_real_png() {
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(1, 1))
            .write_to(
                &mut std::io::Cursor::new(&mut png),
                image::ImageFormat::Png,
            )
            .unwrap();

        let content_type = validate_attachment("pixel.png", &png).unwrap();
        assert_eq!(content_type, "image/png");
    }
}
