//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::BusinessNotFound
            | Self::CustomerNotFound
            | Self::ProductNotFound
            | Self::OrderNotFound
            | Self::CartNotFound
            | Self::CartItemNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::CustomerExists
            | Self::OrderAlreadyPaid
            | Self::OrderConfirmFailed => StatusCode::CONFLICT,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::WalletNotEnabled
            | Self::InvalidPhoneNumber
            | Self::ProductInactive
            | Self::ProductInvalidPrice
            | Self::CartEmpty
            | Self::FileTooLarge
            | Self::UnsupportedFileFormat
            | Self::InvalidImageFile
            | Self::NoFileProvided => StatusCode::BAD_REQUEST,

            // 502 Bad Gateway (upstream payment gateway / network)
            Self::PaymentGatewayError | Self::PaymentInitFailed | Self::NetworkError => {
                StatusCode::BAD_GATEWAY
            }

            // 504 Gateway Timeout
            Self::PaymentTimeout | Self::TimeoutError => StatusCode::GATEWAY_TIMEOUT,

            // 402 Payment Required (terminal payment failure)
            Self::PaymentFailed => StatusCode::PAYMENT_REQUIRED,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mapping() {
        assert_eq!(
            ErrorCode::BusinessNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ErrorCode::CartNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_mapping() {
        assert_eq!(
            ErrorCode::InvalidPhoneNumber.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::CartEmpty.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_gateway_mapping() {
        assert_eq!(
            ErrorCode::PaymentGatewayError.http_status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ErrorCode::PaymentTimeout.http_status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_system_mapping() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
