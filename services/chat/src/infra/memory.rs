use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use cargolink_domain::id::{BookingId, LoadId, ShipperId, TicketId, TruckerId};
use cargolink_domain::status::{BookingStatus, LoadStatus, OtpPurpose, PaymentStatus};

use crate::domain::repository::Storage;
use crate::domain::types::{
    Booking, BookingTransition, Load, LoadSearch, NewLoad, NewShipper, NewSupportTicket,
    NewTrucker, Otp, Shipper, SupportTicket, Trucker, commission_split,
};
use crate::error::ChatServiceError;

#[derive(Default)]
struct Tables {
    truckers: BTreeMap<TruckerId, Trucker>,
    shippers: BTreeMap<ShipperId, Shipper>,
    loads: BTreeMap<LoadId, Load>,
    bookings: BTreeMap<BookingId, Booking>,
    otps: Vec<Otp>,
    tickets: BTreeMap<TicketId, SupportTicket>,
    next_trucker: i32,
    next_shipper: i32,
    next_load: i32,
    next_booking: i32,
    next_ticket: i32,
}

impl Tables {
    fn phone_taken(&self, phone: &str) -> bool {
        self.truckers.values().any(|t| t.phone == phone)
            || self.shippers.values().any(|s| s.phone == phone)
    }
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

/// Process-local storage. Every operation takes one lock over all tables, so
/// multi-table writes such as booking creation are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStore {
    // ── Truckers ─────────────────────────────────────────────────────────────

    async fn create_trucker(&self, new: NewTrucker) -> Result<Trucker, ChatServiceError> {
        let mut t = self.tables.write().await;
        if t.phone_taken(&new.phone) {
            return Err(ChatServiceError::DuplicatePhone);
        }
        if t.truckers.values().any(|x| x.vehicle_no == new.vehicle_no) {
            return Err(ChatServiceError::DuplicateVehicle);
        }
        let now = Utc::now();
        let trucker = Trucker {
            id: TruckerId(next(&mut t.next_trucker)),
            name: new.name,
            phone: new.phone,
            vehicle_no: new.vehicle_no,
            vehicle_type: new.vehicle_type,
            capacity: new.capacity,
            verified: false,
            rating: 5.0,
            total_trips: 0,
            current_city: None,
            available: true,
            created_at: now,
            updated_at: now,
        };
        t.truckers.insert(trucker.id, trucker.clone());
        Ok(trucker)
    }

    async fn get_trucker(&self, id: TruckerId) -> Result<Trucker, ChatServiceError> {
        self.tables
            .read()
            .await
            .truckers
            .get(&id)
            .cloned()
            .ok_or(ChatServiceError::TruckerNotFound)
    }

    async fn get_trucker_by_phone(&self, phone: &str) -> Result<Option<Trucker>, ChatServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .truckers
            .values()
            .find(|t| t.phone == phone)
            .cloned())
    }

    async fn list_available_truckers(&self) -> Result<Vec<Trucker>, ChatServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .truckers
            .values()
            .filter(|t| t.available)
            .cloned()
            .collect())
    }

    // ── Shippers ─────────────────────────────────────────────────────────────

    async fn create_shipper(&self, new: NewShipper) -> Result<Shipper, ChatServiceError> {
        let mut t = self.tables.write().await;
        if t.phone_taken(&new.phone) {
            return Err(ChatServiceError::DuplicatePhone);
        }
        if t.shippers.values().any(|s| s.gst_number == new.gst_number) {
            return Err(ChatServiceError::DuplicateGst);
        }
        let now = Utc::now();
        let shipper = Shipper {
            id: ShipperId(next(&mut t.next_shipper)),
            company_name: new.company_name,
            contact_name: new.contact_name,
            gst_number: new.gst_number,
            phone: new.phone,
            state: new.state,
            verified: false,
            active: true,
            total_loads: 0,
            rating: 5.0,
            created_at: now,
            updated_at: now,
        };
        t.shippers.insert(shipper.id, shipper.clone());
        Ok(shipper)
    }

    async fn get_shipper(&self, id: ShipperId) -> Result<Shipper, ChatServiceError> {
        self.tables
            .read()
            .await
            .shippers
            .get(&id)
            .cloned()
            .ok_or(ChatServiceError::ShipperNotFound)
    }

    async fn get_shipper_by_phone(&self, phone: &str) -> Result<Option<Shipper>, ChatServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .shippers
            .values()
            .find(|s| s.phone == phone)
            .cloned())
    }

    // ── Loads ────────────────────────────────────────────────────────────────

    async fn create_load(&self, new: NewLoad) -> Result<Load, ChatServiceError> {
        let mut t = self.tables.write().await;
        let now = Utc::now();
        let shipper = t
            .shippers
            .get_mut(&new.shipper_id)
            .ok_or(ChatServiceError::ShipperNotFound)?;
        shipper.total_loads += 1;
        shipper.updated_at = now;

        let load = Load {
            id: LoadId(next(&mut t.next_load)),
            shipper_id: new.shipper_id,
            shipper_name: new.shipper_name,
            shipper_phone: new.shipper_phone,
            from_city: new.from_city,
            to_city: new.to_city,
            material: new.material,
            weight: new.weight,
            vehicle_type: new.vehicle_type,
            price: new.price,
            loading_date: new.loading_date,
            status: LoadStatus::Available,
            created_at: now,
            updated_at: now,
        };
        t.loads.insert(load.id, load.clone());
        Ok(load)
    }

    async fn get_load(&self, id: LoadId) -> Result<Load, ChatServiceError> {
        self.tables
            .read()
            .await
            .loads
            .get(&id)
            .cloned()
            .ok_or(ChatServiceError::LoadNotFound)
    }

    async fn search_loads(&self, search: &LoadSearch) -> Result<Vec<Load>, ChatServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .loads
            .values()
            .filter(|l| search.matches(l))
            .cloned()
            .collect())
    }

    async fn list_loads_by_shipper(
        &self,
        shipper_id: ShipperId,
    ) -> Result<Vec<Load>, ChatServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .loads
            .values()
            .rev()
            .filter(|l| l.shipper_id == shipper_id)
            .cloned()
            .collect())
    }

    // ── Bookings ─────────────────────────────────────────────────────────────

    async fn create_booking(
        &self,
        load_id: LoadId,
        trucker_id: TruckerId,
    ) -> Result<Booking, ChatServiceError> {
        let mut t = self.tables.write().await;
        let load = t.loads.get(&load_id).ok_or(ChatServiceError::LoadNotFound)?;
        let trucker = t
            .truckers
            .get(&trucker_id)
            .ok_or(ChatServiceError::TruckerNotFound)?;
        if load.status != LoadStatus::Available {
            return Err(ChatServiceError::LoadNotAvailable);
        }
        if !trucker.available {
            return Err(ChatServiceError::TruckerNotAvailable);
        }

        let now = Utc::now();
        let (shipper_id, price) = (load.shipper_id, load.price);
        let (commission, net_amount) = commission_split(price);
        let booking = Booking {
            id: BookingId(next(&mut t.next_booking)),
            load_id,
            trucker_id,
            shipper_id,
            agreed_price: price,
            commission,
            net_amount,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Pending,
            confirmed_at: now,
            picked_up_at: None,
            delivered_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };

        if let Some(load) = t.loads.get_mut(&load_id) {
            load.status = LoadStatus::Booked;
            load.updated_at = now;
        }
        if let Some(trucker) = t.truckers.get_mut(&trucker_id) {
            trucker.available = false;
            trucker.updated_at = now;
        }
        t.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, id: BookingId) -> Result<Booking, ChatServiceError> {
        self.tables
            .read()
            .await
            .bookings
            .get(&id)
            .cloned()
            .ok_or(ChatServiceError::BookingNotFound)
    }

    async fn list_bookings_by_trucker(
        &self,
        trucker_id: TruckerId,
    ) -> Result<Vec<Booking>, ChatServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .bookings
            .values()
            .rev()
            .filter(|b| b.trucker_id == trucker_id)
            .cloned()
            .collect())
    }

    async fn list_bookings_by_load(&self, load_id: LoadId) -> Result<Vec<Booking>, ChatServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .bookings
            .values()
            .rev()
            .filter(|b| b.load_id == load_id)
            .cloned()
            .collect())
    }

    async fn transition_booking(
        &self,
        id: BookingId,
        step: BookingTransition,
        otp: Option<Uuid>,
    ) -> Result<Booking, ChatServiceError> {
        let now = Utc::now();
        let mut t = self.tables.write().await;

        // Every check runs before the first write.
        let current = t
            .bookings
            .get(&id)
            .ok_or(ChatServiceError::BookingNotFound)?
            .status;
        if current != step.from() {
            return Err(step.conflict(current));
        }
        if let Some(otp_id) = otp {
            let code = t
                .otps
                .iter()
                .find(|o| o.id == otp_id)
                .ok_or(ChatServiceError::OtpNotFound)?;
            if code.used {
                return Err(ChatServiceError::OtpAlreadyUsed);
            }
        }

        let booking = t
            .bookings
            .get_mut(&id)
            .ok_or(ChatServiceError::BookingNotFound)?;
        step.apply(booking, now);
        let booking = booking.clone();

        if let Some(code) = otp.and_then(|otp_id| t.otps.iter_mut().find(|o| o.id == otp_id)) {
            code.used = true;
            code.verified_at = Some(now);
        }
        if let Some(status) = step.load_status() {
            if let Some(load) = t.loads.get_mut(&booking.load_id) {
                load.status = status;
                load.updated_at = now;
            }
        }
        if let Some(trip_completed) = step.releases_trucker() {
            if let Some(trucker) = t.truckers.get_mut(&booking.trucker_id) {
                trucker.available = true;
                if trip_completed {
                    trucker.total_trips += 1;
                }
                trucker.updated_at = now;
            }
        }
        Ok(booking)
    }

    // ── One-time codes ───────────────────────────────────────────────────────

    async fn create_otp(&self, otp: &Otp) -> Result<(), ChatServiceError> {
        self.tables.write().await.otps.push(otp.clone());
        Ok(())
    }

    async fn find_otp(
        &self,
        phone: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<Otp>, ChatServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .otps
            .iter()
            .rev()
            .find(|o| o.phone == phone && o.code == code && o.purpose == purpose)
            .cloned())
    }

    async fn find_active_otp(
        &self,
        phone: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<Otp>, ChatServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .otps
            .iter()
            .rev()
            .find(|o| o.phone == phone && o.purpose == purpose && o.is_active())
            .cloned())
    }

    async fn update_otp(&self, otp: &Otp) -> Result<(), ChatServiceError> {
        let mut t = self.tables.write().await;
        let stored = t
            .otps
            .iter_mut()
            .find(|o| o.id == otp.id)
            .ok_or(ChatServiceError::OtpNotFound)?;
        *stored = otp.clone();
        Ok(())
    }

    async fn revoke_otps(&self, phone: &str, purpose: OtpPurpose) -> Result<u64, ChatServiceError> {
        let now = Utc::now();
        let mut t = self.tables.write().await;
        let mut revoked = 0;
        for otp in t
            .otps
            .iter_mut()
            .filter(|o| o.phone == phone && o.purpose == purpose && o.is_active())
        {
            otp.revoked_at = Some(now);
            revoked += 1;
        }
        Ok(revoked)
    }

    // ── Support ──────────────────────────────────────────────────────────────

    async fn create_support_ticket(
        &self,
        new: NewSupportTicket,
    ) -> Result<SupportTicket, ChatServiceError> {
        let mut t = self.tables.write().await;
        let ticket = SupportTicket {
            id: TicketId(next(&mut t.next_ticket)),
            user_phone: new.user_phone,
            user_type: new.user_type,
            user_id: new.user_id,
            issue_type: new.issue_type,
            description: new.description,
            status: new.status,
            priority: new.priority,
            created_at: Utc::now(),
        };
        t.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }
}
