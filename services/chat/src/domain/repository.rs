use std::future::Future;

use uuid::Uuid;

use cargolink_domain::id::{BookingId, LoadId, ShipperId, TruckerId};
use cargolink_domain::status::OtpPurpose;

use crate::domain::types::{
    Booking, BookingTransition, Load, LoadSearch, NewLoad, NewShipper, NewSupportTicket,
    NewTrucker, Otp, Shipper, SupportTicket, Trucker,
};
use crate::error::ChatServiceError;

/// Persistence for every entity the conversations touch.
///
/// Lookups by id fail with the matching `*NotFound` variant; lookups by phone return
/// `None`. A phone belongs to at most one trucker or shipper, enforced on create.
pub trait Storage: Send + Sync + 'static {
    // ── Truckers ─────────────────────────────────────────────────────────────

    fn create_trucker(
        &self,
        new: NewTrucker,
    ) -> impl Future<Output = Result<Trucker, ChatServiceError>> + Send;

    fn get_trucker(
        &self,
        id: TruckerId,
    ) -> impl Future<Output = Result<Trucker, ChatServiceError>> + Send;

    fn get_trucker_by_phone(
        &self,
        phone: &str,
    ) -> impl Future<Output = Result<Option<Trucker>, ChatServiceError>> + Send;

    fn list_available_truckers(
        &self,
    ) -> impl Future<Output = Result<Vec<Trucker>, ChatServiceError>> + Send;

    // ── Shippers ─────────────────────────────────────────────────────────────

    fn create_shipper(
        &self,
        new: NewShipper,
    ) -> impl Future<Output = Result<Shipper, ChatServiceError>> + Send;

    fn get_shipper(
        &self,
        id: ShipperId,
    ) -> impl Future<Output = Result<Shipper, ChatServiceError>> + Send;

    fn get_shipper_by_phone(
        &self,
        phone: &str,
    ) -> impl Future<Output = Result<Option<Shipper>, ChatServiceError>> + Send;

    // ── Loads ────────────────────────────────────────────────────────────────

    /// Insert an available load and bump the shipper's `total_loads`.
    fn create_load(
        &self,
        new: NewLoad,
    ) -> impl Future<Output = Result<Load, ChatServiceError>> + Send;

    fn get_load(&self, id: LoadId) -> impl Future<Output = Result<Load, ChatServiceError>> + Send;

    /// Available loads matching `search`, oldest first.
    fn search_loads(
        &self,
        search: &LoadSearch,
    ) -> impl Future<Output = Result<Vec<Load>, ChatServiceError>> + Send;

    /// Newest first.
    fn list_loads_by_shipper(
        &self,
        shipper_id: ShipperId,
    ) -> impl Future<Output = Result<Vec<Load>, ChatServiceError>> + Send;

    // ── Bookings ─────────────────────────────────────────────────────────────

    /// Atomically move the load to `booked` and the trucker to unavailable.
    ///
    /// Of two concurrent calls for the same load exactly one succeeds; the other
    /// fails with `LoadNotAvailable`.
    fn create_booking(
        &self,
        load_id: LoadId,
        trucker_id: TruckerId,
    ) -> impl Future<Output = Result<Booking, ChatServiceError>> + Send;

    fn get_booking(
        &self,
        id: BookingId,
    ) -> impl Future<Output = Result<Booking, ChatServiceError>> + Send;

    /// Newest first.
    fn list_bookings_by_trucker(
        &self,
        trucker_id: TruckerId,
    ) -> impl Future<Output = Result<Vec<Booking>, ChatServiceError>> + Send;

    /// Newest first.
    fn list_bookings_by_load(
        &self,
        load_id: LoadId,
    ) -> impl Future<Output = Result<Vec<Booking>, ChatServiceError>> + Send;

    /// Apply `step` if the booking is still in `step.from()`, in one atomic write with
    /// its load and trucker effects. When `otp` is given that code is consumed in the
    /// same write and must still be unused.
    ///
    /// A booking in any other status fails with `step.conflict(status)`. Nothing is
    /// changed on failure, so of two racing steps on one booking at most one applies.
    fn transition_booking(
        &self,
        id: BookingId,
        step: BookingTransition,
        otp: Option<Uuid>,
    ) -> impl Future<Output = Result<Booking, ChatServiceError>> + Send;

    // ── One-time codes ───────────────────────────────────────────────────────

    fn create_otp(&self, otp: &Otp) -> impl Future<Output = Result<(), ChatServiceError>> + Send;

    /// Most recent code matching all three keys, whatever its state.
    fn find_otp(
        &self,
        phone: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> impl Future<Output = Result<Option<Otp>, ChatServiceError>> + Send;

    /// Most recent unused, unrevoked code for the phone and purpose.
    fn find_active_otp(
        &self,
        phone: &str,
        purpose: OtpPurpose,
    ) -> impl Future<Output = Result<Option<Otp>, ChatServiceError>> + Send;

    fn update_otp(&self, otp: &Otp) -> impl Future<Output = Result<(), ChatServiceError>> + Send;

    /// Revoke every active code for the phone and purpose. Returns how many were revoked.
    fn revoke_otps(
        &self,
        phone: &str,
        purpose: OtpPurpose,
    ) -> impl Future<Output = Result<u64, ChatServiceError>> + Send;

    // ── Support ──────────────────────────────────────────────────────────────

    fn create_support_ticket(
        &self,
        new: NewSupportTicket,
    ) -> impl Future<Output = Result<SupportTicket, ChatServiceError>> + Send;
}

/// Outbound message delivery.
///
/// `params` are named template parameters; the transport maps them onto the
/// template's positional slots.
pub trait Notifier: Send + Sync + 'static {
    fn send_template(
        &self,
        phone: &str,
        template: &str,
        params: &[(&'static str, String)],
    ) -> impl Future<Output = Result<(), ChatServiceError>> + Send;

    fn send_text(
        &self,
        phone: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), ChatServiceError>> + Send;
}
