use tracing::{debug, info};

use cargolink_domain::status::{BookingStatus, LoadStatus, PaymentStatus};

use crate::domain::repository::{Notifier, Storage};
use crate::domain::types::{NewShipper, NewTrucker, Shipper, Trucker, rupees};
use crate::error::ChatServiceError;
use crate::legacy::command::Button;
use crate::legacy::{CommandDispatcher, Reply, reply, trips};
use crate::usecase::identity::Identity;
use crate::usecase::registration::{
    parse_capacity, validate_company, validate_gst, validate_person_name, validate_vehicle_no,
};

pub const REGISTER_HINT: &str = "📝 To register as a trucker, type:\n\
REGISTER Name, VehicleNo, VehicleType, Capacity\n\n\
Example:\nREGISTER Rajesh Kumar, TN01AB1234, 32ft, 25\n\n\
🏭 Shipper? Type:\nREGISTER SHIPPER CompanyName, GSTNumber";

const TRUCKER_FORMAT: &str = "❌ Invalid format!\n\n\
Correct format:\nREGISTER Name, VehicleNo, VehicleType, Capacity\n\n\
Example:\nREGISTER Rajesh Kumar, TN01AB1234, 32ft, 25";

const SHIPPER_FORMAT: &str = "❌ Invalid format!\n\n\
Correct format:\nREGISTER SHIPPER CompanyName, GSTNumber\n\n\
Example:\nREGISTER SHIPPER ABC Logistics, 29ABCDE1234F1Z5";

const TRUCKER_SIGNUP: &str = "📝 *Trucker Registration*\n\n\
Send your details in one message:\nREGISTER Name, VehicleNo, VehicleType, Capacity\n\n\
Example:\nREGISTER Rajesh Kumar, TN01AB1234, 32ft, 25";

const SHIPPER_SIGNUP: &str = "🏭 *Shipper Registration*\n\n\
Send your details in one message:\nREGISTER SHIPPER CompanyName, GSTNumber\n\n\
Example:\nREGISTER SHIPPER ABC Logistics, 29ABCDE1234F1Z5";

const SUPPORT_USAGE: &str = "🆘 *Support*\n\nPlease describe your issue:\nSUPPORT <your message>\n\n\
Example: SUPPORT Payment not received for BK00001";

const UNREGISTERED_MENU: &str = "Please choose:\n\n\
1️⃣ Register as Trucker\n2️⃣ Register as Shipper\n3️⃣ Help\n4️⃣ Support";

/// Comma-separated fields, trimmed, with empties kept so counts stay positional.
fn fields(args: &str) -> Vec<&str> {
    args.split(',').map(str::trim).collect()
}

impl<S: Storage, N: Notifier> CommandDispatcher<S, N> {
    // ── REGISTER ─────────────────────────────────────────────────────────────

    pub(super) async fn register_trucker(
        &self,
        identity: &Identity,
        phone: &str,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        match identity {
            Identity::Trucker(t) => {
                return Ok(Some(format!(
                    "✅ *Already Registered!*\n\n*Trucker ID:* {}\n*Name:* {}\n*Vehicle:* {}\n\nYou can search for loads!\nType: LOAD <from> <to>",
                    t.id, t.name, t.vehicle_no
                )));
            }
            Identity::Shipper(_) => {
                return Ok(Some(
                    "❌ This number is registered as a shipper. Use a different number for trucker account."
                        .to_owned(),
                ));
            }
            Identity::Unknown => {}
        }

        let parts = fields(args);
        let [name, vehicle_no, vehicle_type, capacity] = parts.as_slice() else {
            return Ok(Some(TRUCKER_FORMAT.to_owned()));
        };
        if vehicle_type.is_empty() {
            return Ok(Some(TRUCKER_FORMAT.to_owned()));
        }
        let new = NewTrucker {
            name: validate_person_name(name)?,
            phone: phone.to_owned(),
            vehicle_no: validate_vehicle_no(vehicle_no)?,
            vehicle_type: (*vehicle_type).to_owned(),
            capacity: parse_capacity(capacity)?,
        };
        let trucker = self.state.registration().register_trucker(new).await?;
        self.refresh_session(phone, &Identity::Trucker(trucker.clone()))
            .await;

        let fallback = format!(
            "✅ *Registration Successful!*\n\n*Trucker ID:* {}\n*Name:* {}\n*Vehicle:* {} ({})\n*Capacity:* {:.1} tons\n\n✨ You can now search for loads!\nType: LOAD <from> <to>",
            trucker.id, trucker.name, trucker.vehicle_no, trucker.vehicle_type, trucker.capacity
        );
        Ok(self
            .reply_template(
                phone,
                "registration_success",
                &[
                    ("name", trucker.name.clone()),
                    ("user_id", trucker.id.to_string()),
                    ("vehicle_number", trucker.vehicle_no.clone()),
                ],
                fallback,
            )
            .await)
    }

    pub(super) async fn register_shipper(
        &self,
        identity: &Identity,
        phone: &str,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        match identity {
            Identity::Shipper(s) => {
                return Ok(Some(format!(
                    "✅ *Already Registered!*\n\n*Shipper ID:* {}\n*Company:* {}\n*GST:* {}\n\nYou can post loads!\nType: POST to start posting",
                    s.id, s.company_name, s.gst_number
                )));
            }
            Identity::Trucker(_) => {
                return Ok(Some(
                    "❌ This number is registered as a trucker. Use a different number for shipper account."
                        .to_owned(),
                ));
            }
            Identity::Unknown => {}
        }

        let parts = fields(args);
        let [company, gst] = parts.as_slice() else {
            return Ok(Some(SHIPPER_FORMAT.to_owned()));
        };
        let company = validate_company(company)?;
        let (gst, gst_state) = validate_gst(gst)?;
        let shipper = self
            .state
            .registration()
            .register_shipper(NewShipper {
                company_name: company,
                contact_name: None,
                gst_number: gst,
                phone: phone.to_owned(),
                state: gst_state.to_owned(),
            })
            .await?;
        self.refresh_session(phone, &Identity::Shipper(shipper.clone()))
            .await;

        let fallback = format!(
            "✅ *Shipper Registration Successful!*\n\n*Shipper ID:* {}\n*Company:* {}\n*GST:* {}\n*State:* {}\n\n✨ You can now post loads!\nType: POST",
            shipper.id, shipper.company_name, shipper.gst_number, shipper.state
        );
        Ok(self
            .reply_template(
                phone,
                "registration_success",
                &[
                    ("name", shipper.company_name.clone()),
                    ("user_id", shipper.id.to_string()),
                    ("vehicle_number", shipper.gst_number.clone()),
                ],
                fallback,
            )
            .await)
    }

    /// Align the session, if one is open, with a freshly registered identity.
    async fn refresh_session(&self, phone: &str, identity: &Identity) {
        let (role, user_id, name) = (identity.role(), identity.user_id(), identity.name().to_owned());
        let updated = self
            .state
            .sessions
            .update(phone, move |s| {
                s.role = role;
                s.user_id = user_id;
                s.name = name;
            })
            .await;
        if let Err(e) = updated {
            debug!(phone, error = %e, "no session to refresh after registration");
        }
    }

    // ── SUPPORT ──────────────────────────────────────────────────────────────

    pub(super) async fn support(
        &self,
        identity: &Identity,
        phone: &str,
        args: &str,
    ) -> Result<Reply, ChatServiceError> {
        if args.trim().is_empty() {
            return Ok(Some(SUPPORT_USAGE.to_owned()));
        }
        let user_id = identity.user_id().unwrap_or_default();
        let ticket = self
            .state
            .open_ticket()
            .execute(phone, identity.role().as_str(), &user_id, args)
            .await?;
        Ok(Some(format!(
            "📋 *Support Ticket Created*\n\n*Ticket ID:* {}\n*Status:* Open\n*Priority:* Medium\n\nOur team will contact you within 2 hours.\n\n📞 Urgent? Call 1800-XXX-XXXX",
            ticket.id
        )))
    }

    // ── Menu numbers ─────────────────────────────────────────────────────────

    pub(super) async fn menu_selection(
        &self,
        identity: &Identity,
        n: u8,
    ) -> Result<Reply, ChatServiceError> {
        let text = match (identity, n) {
            (Identity::Unknown, 1) => TRUCKER_SIGNUP.to_owned(),
            (Identity::Unknown, 2) => SHIPPER_SIGNUP.to_owned(),
            (_, 4) => SUPPORT_USAGE.to_owned(),
            (Identity::Unknown, 5) => UNREGISTERED_MENU.to_owned(),

            (Identity::Trucker(_), 1) => trips::LOAD_HINT.to_owned(),
            (Identity::Trucker(t), 2) => return self.status(t).await,
            (Identity::Trucker(t), 3) => self.earnings(t).await?,

            (Identity::Shipper(_), 1) => return self.post_instructions(),
            (Identity::Shipper(s), 2) => return self.my_loads(s).await,
            (Identity::Shipper(s), 3) => self.dashboard(s).await?,

            _ => reply::HELP_TEXT.to_owned(),
        };
        Ok(Some(text))
    }

    async fn earnings(&self, trucker: &Trucker) -> Result<String, ChatServiceError> {
        let bookings = self.state.store.list_bookings_by_trucker(trucker.id).await?;
        let finished: Vec<_> = bookings
            .iter()
            .filter(|b| matches!(b.status, BookingStatus::Delivered | BookingStatus::Completed))
            .collect();
        let earned: f64 = finished
            .iter()
            .filter(|b| b.payment_status == PaymentStatus::Completed)
            .map(|b| b.net_amount)
            .sum();
        let pending: f64 = finished
            .iter()
            .filter(|b| b.payment_status != PaymentStatus::Completed)
            .map(|b| b.net_amount)
            .sum();
        Ok(format!(
            "💰 *Your Earnings*\n\n*Completed trips:* {}\n*Total earned:* {}\n*Pending payment:* {}\n\n💰 48-hour payment guarantee!",
            finished.len(),
            rupees(earned),
            rupees(pending)
        ))
    }

    async fn dashboard(&self, shipper: &Shipper) -> Result<String, ChatServiceError> {
        let loads = self.state.load_queries().by_shipper(shipper.id).await?;
        let count = |status: LoadStatus| loads.iter().filter(|l| l.status == status).count();
        Ok(format!(
            "📊 *Dashboard*\n\n*Company:* {}\n*Total loads:* {}\n🟢 Available: {}\n🟡 Booked: {}\n✅ Completed: {}\n*Rating:* ⭐ {:.1}",
            shipper.company_name,
            loads.len(),
            count(LoadStatus::Available),
            count(LoadStatus::Booked),
            count(LoadStatus::Completed),
            shipper.rating
        ))
    }

    // ── Buttons ──────────────────────────────────────────────────────────────

    pub(super) async fn button(
        &self,
        identity: &Identity,
        button: Button,
    ) -> Result<Reply, ChatServiceError> {
        let text = match button {
            Button::RegisterTrucker => TRUCKER_SIGNUP.to_owned(),
            Button::RegisterShipper => SHIPPER_SIGNUP.to_owned(),
            Button::SearchLoads => trips::LOAD_HINT.to_owned(),
            Button::PickupPrompt(id) => format!(
                "🔐 Ask the shipper for the pickup OTP and type:\nPICKUP {} <OTP>",
                id.to_uppercase()
            ),
            Button::ViewTicket => {
                "📋 Our team replies to open tickets within 2 hours.\n\nTo raise a new issue, type SUPPORT <message>".to_owned()
            }
            Button::ViewStatus => {
                return match identity {
                    Identity::Trucker(t) => self.status(t).await,
                    Identity::Shipper(s) => self.my_loads(s).await,
                    Identity::Unknown => Ok(Some(reply::HELP_TEXT.to_owned())),
                };
            }
            Button::Other(action) => {
                info!(action, "unhandled button callback");
                format!("Button clicked: {action}\nProcessing...")
            }
        };
        Ok(Some(text))
    }
}
