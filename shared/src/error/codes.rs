//! Unified error codes for the storefront platform
//!
//! This module defines all error codes used across the storefront server and
//! frontend. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Business errors
//! - 2xxx: Customer errors
//! - 3xxx: Product errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Cart and upload errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Business ====================
    /// Business not found for the given alias or id
    BusinessNotFound = 1001,
    /// Business is not wallet-enabled
    WalletNotEnabled = 1002,

    // ==================== 2xxx: Customer ====================
    /// Customer not found
    CustomerNotFound = 2001,
    /// Customer already exists for this phone and business
    CustomerExists = 2002,
    /// Phone number format is invalid
    InvalidPhoneNumber = 2003,

    // ==================== 3xxx: Product ====================
    /// Product not found
    ProductNotFound = 3001,
    /// Product is inactive
    ProductInactive = 3002,
    /// Product has invalid price
    ProductInvalidPrice = 3003,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order payment confirmation matched no pending order
    OrderConfirmFailed = 4003,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Payment gateway request failed
    PaymentGatewayError = 5002,
    /// Payment initiation failed
    PaymentInitFailed = 5003,
    /// Payment verification timed out
    PaymentTimeout = 5004,

    // ==================== 6xxx: Cart ====================
    /// Cart session not found (or expired)
    CartNotFound = 6001,
    /// Cart is empty
    CartEmpty = 6002,
    /// Cart item not found
    CartItemNotFound = 6003,

    // ==================== 65xx: File Upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// Invalid/corrupted image file
    InvalidImageFile = 6503,
    /// No file provided in request
    NoFileProvided = 6504,
    /// File storage failed
    FileStorageFailed = 6505,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Business
            ErrorCode::BusinessNotFound => "Business not found",
            ErrorCode::WalletNotEnabled => "Business is not wallet-enabled",

            // Customer
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::CustomerExists => "Customer already exists for this phone and business",
            ErrorCode::InvalidPhoneNumber => "Phone number format is invalid",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInactive => "Product is inactive",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderConfirmFailed => "Payment confirmation matched no pending order",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentGatewayError => "Payment gateway request failed",
            ErrorCode::PaymentInitFailed => "Payment initiation failed",
            ErrorCode::PaymentTimeout => "Payment verification timed out",

            // Cart
            ErrorCode::CartNotFound => "Cart session not found",
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::CartItemNotFound => "Cart item not found",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::FileStorageFailed => "File storage failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Business
            1001 => Ok(ErrorCode::BusinessNotFound),
            1002 => Ok(ErrorCode::WalletNotEnabled),

            // Customer
            2001 => Ok(ErrorCode::CustomerNotFound),
            2002 => Ok(ErrorCode::CustomerExists),
            2003 => Ok(ErrorCode::InvalidPhoneNumber),

            // Product
            3001 => Ok(ErrorCode::ProductNotFound),
            3002 => Ok(ErrorCode::ProductInactive),
            3003 => Ok(ErrorCode::ProductInvalidPrice),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4003 => Ok(ErrorCode::OrderConfirmFailed),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::PaymentGatewayError),
            5003 => Ok(ErrorCode::PaymentInitFailed),
            5004 => Ok(ErrorCode::PaymentTimeout),

            // Cart
            6001 => Ok(ErrorCode::CartNotFound),
            6002 => Ok(ErrorCode::CartEmpty),
            6003 => Ok(ErrorCode::CartItemNotFound),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::InvalidImageFile),
            6504 => Ok(ErrorCode::NoFileProvided),
            6505 => Ok(ErrorCode::FileStorageFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
