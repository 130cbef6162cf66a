use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use cargolink_chat::domain::repository::{Notifier, Storage};
use cargolink_chat::domain::types::{
    Booking, BookingTransition, Load, LoadSearch, NewLoad, NewShipper, NewSupportTicket,
    NewTrucker, Otp, Shipper, SupportTicket, Trucker,
};
use cargolink_chat::error::ChatServiceError;
use cargolink_chat::infra::memory::MemoryStore;
use cargolink_chat::state::{AppState, InteractionMode};
use cargolink_chat::usecase::load::PostLoadInput;
use cargolink_domain::id::{BookingId, LoadId, ShipperId, TruckerId};
use cargolink_domain::status::OtpPurpose;

pub type TestState = AppState<MemoryStore, RecordingNotifier>;
pub type ScriptedState = AppState<ScriptedStore, RecordingNotifier>;

// ── RecordingNotifier ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Template {
        phone: String,
        template: String,
        params: Vec<(&'static str, String)>,
    },
    Text {
        phone: String,
        body: String,
    },
}

/// Records every outbound message. Template sends can be made to fail so the
/// plain-text fallbacks are exercised.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
    fail_templates: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_templates(&self, fail: bool) {
        self.fail_templates.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn texts_to(&self, phone: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { phone: p, body } if p == phone => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn last_text_to(&self, phone: &str) -> Option<String> {
        self.texts_to(phone).pop()
    }

    /// Names of the templates delivered to `phone`, in order.
    pub fn templates_to(&self, phone: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Template {
                    phone: p, template, ..
                } if p == phone => Some(template),
                _ => None,
            })
            .collect()
    }

    /// Parameters of the last `template` delivered to `phone`.
    pub fn template_params(&self, phone: &str, template: &str) -> Option<Vec<(&'static str, String)>> {
        self.sent().into_iter().rev().find_map(|s| match s {
            Sent::Template {
                phone: p,
                template: t,
                params,
            } if p == phone && t == template => Some(params),
            _ => None,
        })
    }
}

impl Notifier for RecordingNotifier {
    async fn send_template(
        &self,
        phone: &str,
        template: &str,
        params: &[(&'static str, String)],
    ) -> Result<(), ChatServiceError> {
        if self.fail_templates.load(Ordering::SeqCst) {
            return Err(ChatServiceError::Notification(format!(
                "template {template} rejected"
            )));
        }
        self.sent.lock().unwrap().push(Sent::Template {
            phone: phone.to_owned(),
            template: template.to_owned(),
            params: params.to_vec(),
        });
        Ok(())
    }

    async fn send_text(&self, phone: &str, body: &str) -> Result<(), ChatServiceError> {
        self.sent.lock().unwrap().push(Sent::Text {
            phone: phone.to_owned(),
            body: body.to_owned(),
        });
        Ok(())
    }
}

// ── ScriptedStore ───────────────────────────────────────────────────────────

/// In-memory storage with switches to interleave concurrent callers and to fail
/// booking transitions.
#[derive(Default)]
pub struct ScriptedStore {
    inner: MemoryStore,
    yield_after_read: AtomicBool,
    fail_transitions: AtomicBool,
}

impl ScriptedStore {
    /// Yield to other tasks after each booking read, so callers joined on one task
    /// all act on the same snapshot.
    pub fn yield_after_read(&self, on: bool) {
        self.yield_after_read.store(on, Ordering::SeqCst);
    }

    pub fn fail_transitions(&self, on: bool) {
        self.fail_transitions.store(on, Ordering::SeqCst);
    }
}

impl Storage for ScriptedStore {
    async fn create_trucker(&self, new: NewTrucker) -> Result<Trucker, ChatServiceError> {
        self.inner.create_trucker(new).await
    }

    async fn get_trucker(&self, id: TruckerId) -> Result<Trucker, ChatServiceError> {
        self.inner.get_trucker(id).await
    }

    async fn get_trucker_by_phone(&self, phone: &str) -> Result<Option<Trucker>, ChatServiceError> {
        self.inner.get_trucker_by_phone(phone).await
    }

    async fn list_available_truckers(&self) -> Result<Vec<Trucker>, ChatServiceError> {
        self.inner.list_available_truckers().await
    }

    async fn create_shipper(&self, new: NewShipper) -> Result<Shipper, ChatServiceError> {
        self.inner.create_shipper(new).await
    }

    async fn get_shipper(&self, id: ShipperId) -> Result<Shipper, ChatServiceError> {
        self.inner.get_shipper(id).await
    }

    async fn get_shipper_by_phone(&self, phone: &str) -> Result<Option<Shipper>, ChatServiceError> {
        self.inner.get_shipper_by_phone(phone).await
    }

    async fn create_load(&self, new: NewLoad) -> Result<Load, ChatServiceError> {
        self.inner.create_load(new).await
    }

    async fn get_load(&self, id: LoadId) -> Result<Load, ChatServiceError> {
        self.inner.get_load(id).await
    }

    async fn search_loads(&self, search: &LoadSearch) -> Result<Vec<Load>, ChatServiceError> {
        self.inner.search_loads(search).await
    }

    async fn list_loads_by_shipper(&self, shipper_id: ShipperId) -> Result<Vec<Load>, ChatServiceError> {
        self.inner.list_loads_by_shipper(shipper_id).await
    }

    async fn create_booking(
        &self,
        load_id: LoadId,
        trucker_id: TruckerId,
    ) -> Result<Booking, ChatServiceError> {
        self.inner.create_booking(load_id, trucker_id).await
    }

    async fn get_booking(&self, id: BookingId) -> Result<Booking, ChatServiceError> {
        let booking = self.inner.get_booking(id).await;
        if self.yield_after_read.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        booking
    }

    async fn list_bookings_by_trucker(
        &self,
        trucker_id: TruckerId,
    ) -> Result<Vec<Booking>, ChatServiceError> {
        self.inner.list_bookings_by_trucker(trucker_id).await
    }

    async fn list_bookings_by_load(&self, load_id: LoadId) -> Result<Vec<Booking>, ChatServiceError> {
        self.inner.list_bookings_by_load(load_id).await
    }

    async fn transition_booking(
        &self,
        id: BookingId,
        step: BookingTransition,
        otp: Option<Uuid>,
    ) -> Result<Booking, ChatServiceError> {
        if self.fail_transitions.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("storage unavailable").into());
        }
        self.inner.transition_booking(id, step, otp).await
    }

    async fn create_otp(&self, otp: &Otp) -> Result<(), ChatServiceError> {
        self.inner.create_otp(otp).await
    }

    async fn find_otp(
        &self,
        phone: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<Otp>, ChatServiceError> {
        self.inner.find_otp(phone, code, purpose).await
    }

    async fn find_active_otp(
        &self,
        phone: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<Otp>, ChatServiceError> {
        self.inner.find_active_otp(phone, purpose).await
    }

    async fn update_otp(&self, otp: &Otp) -> Result<(), ChatServiceError> {
        self.inner.update_otp(otp).await
    }

    async fn revoke_otps(&self, phone: &str, purpose: OtpPurpose) -> Result<u64, ChatServiceError> {
        self.inner.revoke_otps(phone, purpose).await
    }

    async fn create_support_ticket(
        &self,
        new: NewSupportTicket,
    ) -> Result<SupportTicket, ChatServiceError> {
        self.inner.create_support_ticket(new).await
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// Fresh in-memory app. The deferred worker is returned unspawned; drop it when
/// deferred messages do not matter.
pub fn test_app(
    mode: InteractionMode,
) -> (
    TestState,
    cargolink_chat::jobs::deferred::DeferredWorker<RecordingNotifier>,
) {
    AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(RecordingNotifier::new()),
        chrono::Duration::minutes(30),
        mode,
    )
}

pub fn guided_app() -> TestState {
    test_app(InteractionMode::Guided).0
}

pub fn legacy_app() -> TestState {
    test_app(InteractionMode::Legacy).0
}

pub fn scripted_app() -> ScriptedState {
    AppState::new(
        Arc::new(ScriptedStore::default()),
        Arc::new(RecordingNotifier::new()),
        chrono::Duration::minutes(30),
        InteractionMode::Guided,
    )
    .0
}

static NEXT_VEHICLE: AtomicU32 = AtomicU32::new(1);

/// A distinct upper-case registration number.
pub fn unique_vehicle_no() -> String {
    let n = NEXT_VEHICLE.fetch_add(1, Ordering::Relaxed);
    format!("TN01AB{n:04}")
}

pub async fn seed_trucker<S: Storage>(
    state: &AppState<S, RecordingNotifier>,
    phone: &str,
    name: &str,
) -> Trucker {
    state
        .registration()
        .register_trucker(NewTrucker {
            name: name.to_owned(),
            phone: phone.to_owned(),
            vehicle_no: unique_vehicle_no(),
            vehicle_type: "Heavy Truck".to_owned(),
            capacity: 25.0,
        })
        .await
        .unwrap()
}

pub async fn seed_shipper<S: Storage>(
    state: &AppState<S, RecordingNotifier>,
    phone: &str,
    gst: &str,
) -> Shipper {
    state
        .registration()
        .register_shipper(NewShipper {
            company_name: "ABC Logistics".to_owned(),
            contact_name: Some("Priya Sharma".to_owned()),
            gst_number: gst.to_owned(),
            phone: phone.to_owned(),
            state: "Karnataka".to_owned(),
        })
        .await
        .unwrap()
}

pub async fn seed_load<S: Storage>(
    state: &AppState<S, RecordingNotifier>,
    shipper: &Shipper,
) -> LoadId {
    state
        .post_load()
        .execute(
            shipper,
            PostLoadInput {
                from_city: "chennai".to_owned(),
                to_city: "bangalore".to_owned(),
                material: "electronics".to_owned(),
                weight: 15.0,
                price: 35000.0,
            },
        )
        .await
        .unwrap()
        .id
}

/// The code most recently sent to the shipper for `purpose`, read back from storage.
pub async fn issued_code<S: Storage>(
    state: &AppState<S, RecordingNotifier>,
    trucker_phone: &str,
    purpose: OtpPurpose,
) -> String {
    state
        .store
        .find_active_otp(trucker_phone, purpose)
        .await
        .unwrap()
        .expect("an active code")
        .code
}
