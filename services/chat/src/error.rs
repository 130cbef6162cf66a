use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Chat service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum ChatServiceError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("phone number already registered")]
    DuplicatePhone,
    #[error("vehicle already registered")]
    DuplicateVehicle,
    #[error("GST number already registered")]
    DuplicateGst,
    #[error("trucker not found")]
    TruckerNotFound,
    #[error("shipper not found")]
    ShipperNotFound,
    #[error("load not found")]
    LoadNotFound,
    #[error("booking not found")]
    BookingNotFound,
    #[error("session not found")]
    SessionNotFound,
    #[error("otp not found")]
    OtpNotFound,
    #[error("load not available")]
    LoadNotAvailable,
    #[error("trucker not available")]
    TruckerNotAvailable,
    #[error("booking belongs to another user")]
    NotBookingOwner,
    #[error("load already picked up")]
    AlreadyPickedUp,
    #[error("load not picked up yet")]
    NotPickedUp,
    #[error("load already delivered")]
    AlreadyDelivered,
    #[error("load not delivered yet")]
    NotDelivered,
    #[error("booking cancelled")]
    BookingCancelled,
    #[error("otp expired")]
    OtpExpired,
    #[error("otp already used")]
    OtpAlreadyUsed,
    #[error("too many otp attempts")]
    OtpTooManyAttempts,
    #[error("otp does not match")]
    OtpMismatch,
    #[error("otp issued for a different booking")]
    OtpWrongBooking,
    #[error("notification failed: {0}")]
    Notification(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ChatServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::DuplicatePhone => "DUPLICATE_PHONE",
            Self::DuplicateVehicle => "DUPLICATE_VEHICLE",
            Self::DuplicateGst => "DUPLICATE_GST",
            Self::TruckerNotFound => "TRUCKER_NOT_FOUND",
            Self::ShipperNotFound => "SHIPPER_NOT_FOUND",
            Self::LoadNotFound => "LOAD_NOT_FOUND",
            Self::BookingNotFound => "BOOKING_NOT_FOUND",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::OtpNotFound => "OTP_NOT_FOUND",
            Self::LoadNotAvailable => "LOAD_NOT_AVAILABLE",
            Self::TruckerNotAvailable => "TRUCKER_NOT_AVAILABLE",
            Self::NotBookingOwner => "NOT_BOOKING_OWNER",
            Self::AlreadyPickedUp => "ALREADY_PICKED_UP",
            Self::NotPickedUp => "NOT_PICKED_UP",
            Self::AlreadyDelivered => "ALREADY_DELIVERED",
            Self::NotDelivered => "NOT_DELIVERED",
            Self::BookingCancelled => "BOOKING_CANCELLED",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::OtpAlreadyUsed => "OTP_ALREADY_USED",
            Self::OtpTooManyAttempts => "OTP_TOO_MANY_ATTEMPTS",
            Self::OtpMismatch => "OTP_MISMATCH",
            Self::OtpWrongBooking => "OTP_WRONG_BOOKING",
            Self::Notification(_) => "NOTIFICATION",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Storage or transport failure rather than something the user can fix.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Internal(_) | Self::Notification(_))
    }

    /// Chat reply for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => format!("❌ {msg}"),
            Self::DuplicatePhone => {
                "❌ This phone number is already registered! Please contact support if you need help."
                    .to_owned()
            }
            Self::DuplicateVehicle => {
                "❌ This vehicle is already registered with another account!".to_owned()
            }
            Self::DuplicateGst => "❌ This GST number is already registered!".to_owned(),
            Self::TruckerNotFound => "❌ Trucker not found. Please register first!".to_owned(),
            Self::ShipperNotFound => "❌ Please register as shipper first!".to_owned(),
            Self::LoadNotFound => "❌ Load not found. Please check the Load ID.".to_owned(),
            Self::BookingNotFound => "❌ Booking not found. Check the booking ID.".to_owned(),
            Self::SessionNotFound => {
                "❌ Your session has ended. Send any message to start again.".to_owned()
            }
            Self::OtpNotFound | Self::OtpMismatch => {
                "❌ Invalid OTP. Please check and try again.".to_owned()
            }
            Self::LoadNotAvailable => "❌ Sorry! This load has already been booked.".to_owned(),
            Self::TruckerNotAvailable => {
                "❌ You already have an active booking. Complete it first!".to_owned()
            }
            Self::NotBookingOwner => "❌ This booking doesn't belong to you.".to_owned(),
            Self::AlreadyPickedUp => "❌ This load has already been picked up!".to_owned(),
            Self::NotPickedUp => "❌ Please complete pickup first!".to_owned(),
            Self::AlreadyDelivered => "❌ This load has already been delivered!".to_owned(),
            Self::NotDelivered => "❌ This load has not been delivered yet.".to_owned(),
            Self::BookingCancelled => "❌ This booking has been cancelled.".to_owned(),
            Self::OtpExpired => "❌ OTP has expired. Please request a new one.".to_owned(),
            Self::OtpAlreadyUsed => "❌ This OTP has already been used.".to_owned(),
            Self::OtpTooManyAttempts => {
                "❌ Too many wrong attempts. Please request a new OTP.".to_owned()
            }
            Self::OtpWrongBooking => "❌ OTP doesn't match this booking.".to_owned(),
            Self::Notification(_) | Self::Internal(_) => {
                "❌ Something went wrong. Please try again.".to_owned()
            }
        }
    }
}

impl IntoResponse for ChatServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::TruckerNotFound
            | Self::ShipperNotFound
            | Self::LoadNotFound
            | Self::BookingNotFound
            | Self::SessionNotFound
            | Self::OtpNotFound => StatusCode::NOT_FOUND,
            Self::DuplicatePhone
            | Self::DuplicateVehicle
            | Self::DuplicateGst
            | Self::LoadNotAvailable
            | Self::TruckerNotAvailable
            | Self::AlreadyPickedUp
            | Self::NotPickedUp
            | Self::AlreadyDelivered
            | Self::NotDelivered
            | Self::BookingCancelled
            | Self::OtpExpired
            | Self::OtpAlreadyUsed
            | Self::OtpTooManyAttempts => StatusCode::CONFLICT,
            Self::NotBookingOwner => StatusCode::FORBIDDEN,
            Self::OtpMismatch | Self::OtpWrongBooking => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Notification(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
