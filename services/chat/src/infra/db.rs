use anyhow::{Context as _, anyhow};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionError, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use cargolink_chat_schema::{bookings, loads, otps, shippers, support_tickets, truckers};
use cargolink_domain::id::{BookingId, LoadId, ShipperId, TicketId, TruckerId};
use cargolink_domain::status::{BookingStatus, LoadStatus, OtpPurpose, PaymentStatus};

use crate::domain::repository::Storage;
use crate::domain::types::{
    Booking, BookingTransition, Load, LoadSearch, NewLoad, NewShipper, NewSupportTicket,
    NewTrucker, Otp, Shipper, SupportTicket, Trucker, commission_split,
};
use crate::error::ChatServiceError;

/// Relational storage over sea-orm. Multi-row writes run in a transaction.
#[derive(Clone)]
pub struct DbStore {
    pub db: DatabaseConnection,
}

fn flatten(e: TransactionError<ChatServiceError>) -> ChatServiceError {
    match e {
        TransactionError::Connection(db) => {
            ChatServiceError::Internal(anyhow::Error::new(db).context("transaction"))
        }
        TransactionError::Transaction(inner) => inner,
    }
}

async fn phone_taken<C: sea_orm::ConnectionTrait>(
    conn: &C,
    phone: &str,
) -> Result<bool, ChatServiceError> {
    let truckers = truckers::Entity::find()
        .filter(truckers::Column::Phone.eq(phone))
        .count(conn)
        .await
        .context("count truckers by phone")?;
    let shippers = shippers::Entity::find()
        .filter(shippers::Column::Phone.eq(phone))
        .count(conn)
        .await
        .context("count shippers by phone")?;
    Ok(truckers + shippers > 0)
}

impl Storage for DbStore {
    // ── Truckers ─────────────────────────────────────────────────────────────

    async fn create_trucker(&self, new: NewTrucker) -> Result<Trucker, ChatServiceError> {
        self.db
            .transaction::<_, Trucker, ChatServiceError>(|txn| {
                Box::pin(async move {
                    if phone_taken(txn, &new.phone).await? {
                        return Err(ChatServiceError::DuplicatePhone);
                    }
                    let vehicles = truckers::Entity::find()
                        .filter(truckers::Column::VehicleNo.eq(&new.vehicle_no))
                        .count(txn)
                        .await
                        .context("count truckers by vehicle")?;
                    if vehicles > 0 {
                        return Err(ChatServiceError::DuplicateVehicle);
                    }

                    let now = Utc::now();
                    let model = truckers::ActiveModel {
                        name: Set(new.name),
                        phone: Set(new.phone),
                        vehicle_no: Set(new.vehicle_no),
                        vehicle_type: Set(new.vehicle_type),
                        capacity: Set(new.capacity),
                        verified: Set(false),
                        rating: Set(5.0),
                        total_trips: Set(0),
                        current_city: Set(None),
                        available: Set(true),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .context("insert trucker")?;
                    Ok(trucker_from_model(model))
                })
            })
            .await
            .map_err(flatten)
    }

    async fn get_trucker(&self, id: TruckerId) -> Result<Trucker, ChatServiceError> {
        truckers::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find trucker by id")?
            .map(trucker_from_model)
            .ok_or(ChatServiceError::TruckerNotFound)
    }

    async fn get_trucker_by_phone(&self, phone: &str) -> Result<Option<Trucker>, ChatServiceError> {
        let model = truckers::Entity::find()
            .filter(truckers::Column::Phone.eq(phone))
            .one(&self.db)
            .await
            .context("find trucker by phone")?;
        Ok(model.map(trucker_from_model))
    }

    async fn list_available_truckers(&self) -> Result<Vec<Trucker>, ChatServiceError> {
        let models = truckers::Entity::find()
            .filter(truckers::Column::Available.eq(true))
            .order_by_asc(truckers::Column::Id)
            .all(&self.db)
            .await
            .context("list available truckers")?;
        Ok(models.into_iter().map(trucker_from_model).collect())
    }

    // ── Shippers ─────────────────────────────────────────────────────────────

    async fn create_shipper(&self, new: NewShipper) -> Result<Shipper, ChatServiceError> {
        self.db
            .transaction::<_, Shipper, ChatServiceError>(|txn| {
                Box::pin(async move {
                    if phone_taken(txn, &new.phone).await? {
                        return Err(ChatServiceError::DuplicatePhone);
                    }
                    let gsts = shippers::Entity::find()
                        .filter(shippers::Column::GstNumber.eq(&new.gst_number))
                        .count(txn)
                        .await
                        .context("count shippers by gst")?;
                    if gsts > 0 {
                        return Err(ChatServiceError::DuplicateGst);
                    }

                    let now = Utc::now();
                    let model = shippers::ActiveModel {
                        company_name: Set(new.company_name),
                        contact_name: Set(new.contact_name),
                        gst_number: Set(new.gst_number),
                        phone: Set(new.phone),
                        state: Set(new.state),
                        verified: Set(false),
                        active: Set(true),
                        total_loads: Set(0),
                        rating: Set(5.0),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .context("insert shipper")?;
                    Ok(shipper_from_model(model))
                })
            })
            .await
            .map_err(flatten)
    }

    async fn get_shipper(&self, id: ShipperId) -> Result<Shipper, ChatServiceError> {
        shippers::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find shipper by id")?
            .map(shipper_from_model)
            .ok_or(ChatServiceError::ShipperNotFound)
    }

    async fn get_shipper_by_phone(&self, phone: &str) -> Result<Option<Shipper>, ChatServiceError> {
        let model = shippers::Entity::find()
            .filter(shippers::Column::Phone.eq(phone))
            .one(&self.db)
            .await
            .context("find shipper by phone")?;
        Ok(model.map(shipper_from_model))
    }

    // ── Loads ────────────────────────────────────────────────────────────────

    async fn create_load(&self, new: NewLoad) -> Result<Load, ChatServiceError> {
        self.db
            .transaction::<_, Load, ChatServiceError>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let bumped = shippers::Entity::update_many()
                        .filter(shippers::Column::Id.eq(new.shipper_id.0))
                        .col_expr(
                            shippers::Column::TotalLoads,
                            Expr::col(shippers::Column::TotalLoads).add(1),
                        )
                        .col_expr(shippers::Column::UpdatedAt, Expr::value(now))
                        .exec(txn)
                        .await
                        .context("bump shipper total_loads")?;
                    if bumped.rows_affected == 0 {
                        return Err(ChatServiceError::ShipperNotFound);
                    }

                    let model = loads::ActiveModel {
                        shipper_id: Set(new.shipper_id.0),
                        shipper_name: Set(new.shipper_name),
                        shipper_phone: Set(new.shipper_phone),
                        from_city: Set(new.from_city),
                        to_city: Set(new.to_city),
                        material: Set(new.material),
                        weight: Set(new.weight),
                        vehicle_type: Set(new.vehicle_type),
                        price: Set(new.price),
                        loading_date: Set(new.loading_date),
                        status: Set(LoadStatus::Available.as_str().to_owned()),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .context("insert load")?;
                    load_from_model(model)
                })
            })
            .await
            .map_err(flatten)
    }

    async fn get_load(&self, id: LoadId) -> Result<Load, ChatServiceError> {
        let model = loads::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find load by id")?
            .ok_or(ChatServiceError::LoadNotFound)?;
        load_from_model(model)
    }

    async fn search_loads(&self, search: &LoadSearch) -> Result<Vec<Load>, ChatServiceError> {
        let mut cond = Condition::all()
            .add(loads::Column::Status.eq(LoadStatus::Available.as_str()));
        if let Some(date_from) = search.date_from {
            cond = cond.add(loads::Column::LoadingDate.gte(date_from));
        }
        let models = loads::Entity::find()
            .filter(cond)
            .order_by_asc(loads::Column::CreatedAt)
            .order_by_asc(loads::Column::Id)
            .all(&self.db)
            .await
            .context("search loads")?;

        // City and vehicle matching is case-insensitive; apply it in memory so both
        // stores agree.
        let mut found = Vec::new();
        for model in models {
            let load = load_from_model(model)?;
            if search.matches(&load) {
                found.push(load);
            }
        }
        Ok(found)
    }

    async fn list_loads_by_shipper(
        &self,
        shipper_id: ShipperId,
    ) -> Result<Vec<Load>, ChatServiceError> {
        let models = loads::Entity::find()
            .filter(loads::Column::ShipperId.eq(shipper_id.0))
            .order_by_desc(loads::Column::CreatedAt)
            .order_by_desc(loads::Column::Id)
            .all(&self.db)
            .await
            .context("list loads by shipper")?;
        models.into_iter().map(load_from_model).collect()
    }

    // ── Bookings ─────────────────────────────────────────────────────────────

    async fn create_booking(
        &self,
        load_id: LoadId,
        trucker_id: TruckerId,
    ) -> Result<Booking, ChatServiceError> {
        self.db
            .transaction::<_, Booking, ChatServiceError>(|txn| {
                Box::pin(async move {
                    let load = loads::Entity::find_by_id(load_id.0)
                        .one(txn)
                        .await
                        .context("find load for booking")?
                        .ok_or(ChatServiceError::LoadNotFound)?;
                    truckers::Entity::find_by_id(trucker_id.0)
                        .one(txn)
                        .await
                        .context("find trucker for booking")?
                        .ok_or(ChatServiceError::TruckerNotFound)?;

                    let now = Utc::now();

                    // Conditional updates: the loser of a concurrent race sees zero rows.
                    let claimed = loads::Entity::update_many()
                        .filter(loads::Column::Id.eq(load_id.0))
                        .filter(loads::Column::Status.eq(LoadStatus::Available.as_str()))
                        .col_expr(loads::Column::Status, Expr::value(LoadStatus::Booked.as_str()))
                        .col_expr(loads::Column::UpdatedAt, Expr::value(now))
                        .exec(txn)
                        .await
                        .context("claim load")?;
                    if claimed.rows_affected == 0 {
                        return Err(ChatServiceError::LoadNotAvailable);
                    }
                    let reserved = truckers::Entity::update_many()
                        .filter(truckers::Column::Id.eq(trucker_id.0))
                        .filter(truckers::Column::Available.eq(true))
                        .col_expr(truckers::Column::Available, Expr::value(false))
                        .col_expr(truckers::Column::UpdatedAt, Expr::value(now))
                        .exec(txn)
                        .await
                        .context("reserve trucker")?;
                    if reserved.rows_affected == 0 {
                        return Err(ChatServiceError::TruckerNotAvailable);
                    }

                    let (commission, net_amount) = commission_split(load.price);
                    let model = bookings::ActiveModel {
                        load_id: Set(load_id.0),
                        trucker_id: Set(trucker_id.0),
                        shipper_id: Set(load.shipper_id),
                        agreed_price: Set(load.price),
                        commission: Set(commission),
                        net_amount: Set(net_amount),
                        status: Set(BookingStatus::Confirmed.as_str().to_owned()),
                        payment_status: Set(PaymentStatus::Pending.as_str().to_owned()),
                        confirmed_at: Set(now),
                        picked_up_at: Set(None),
                        delivered_at: Set(None),
                        completed_at: Set(None),
                        cancelled_at: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .context("insert booking")?;
                    booking_from_model(model)
                })
            })
            .await
            .map_err(flatten)
    }

    async fn get_booking(&self, id: BookingId) -> Result<Booking, ChatServiceError> {
        let model = bookings::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find booking by id")?
            .ok_or(ChatServiceError::BookingNotFound)?;
        booking_from_model(model)
    }

    async fn list_bookings_by_trucker(
        &self,
        trucker_id: TruckerId,
    ) -> Result<Vec<Booking>, ChatServiceError> {
        let models = bookings::Entity::find()
            .filter(bookings::Column::TruckerId.eq(trucker_id.0))
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .all(&self.db)
            .await
            .context("list bookings by trucker")?;
        models.into_iter().map(booking_from_model).collect()
    }

    async fn list_bookings_by_load(&self, load_id: LoadId) -> Result<Vec<Booking>, ChatServiceError> {
        let models = bookings::Entity::find()
            .filter(bookings::Column::LoadId.eq(load_id.0))
            .order_by_desc(bookings::Column::CreatedAt)
            .order_by_desc(bookings::Column::Id)
            .all(&self.db)
            .await
            .context("list bookings by load")?;
        models.into_iter().map(booking_from_model).collect()
    }

    async fn transition_booking(
        &self,
        id: BookingId,
        step: BookingTransition,
        otp: Option<Uuid>,
    ) -> Result<Booking, ChatServiceError> {
        self.db
            .transaction::<_, Booking, ChatServiceError>(|txn| {
                Box::pin(async move {
                    let model = bookings::Entity::find_by_id(id.0)
                        .one(txn)
                        .await
                        .context("find booking for transition")?
                        .ok_or(ChatServiceError::BookingNotFound)?;
                    let mut booking = booking_from_model(model)?;
                    if booking.status != step.from() {
                        return Err(step.conflict(booking.status));
                    }
                    let now = Utc::now();
                    step.apply(&mut booking, now);

                    // Guarded on the expected status: a concurrent step sees zero rows.
                    let moved = bookings::Entity::update_many()
                        .filter(bookings::Column::Id.eq(id.0))
                        .filter(bookings::Column::Status.eq(step.from().as_str()))
                        .col_expr(bookings::Column::Status, Expr::value(booking.status.as_str()))
                        .col_expr(
                            bookings::Column::PaymentStatus,
                            Expr::value(booking.payment_status.as_str()),
                        )
                        .col_expr(bookings::Column::PickedUpAt, Expr::value(booking.picked_up_at))
                        .col_expr(bookings::Column::DeliveredAt, Expr::value(booking.delivered_at))
                        .col_expr(bookings::Column::CompletedAt, Expr::value(booking.completed_at))
                        .col_expr(bookings::Column::CancelledAt, Expr::value(booking.cancelled_at))
                        .col_expr(bookings::Column::UpdatedAt, Expr::value(now))
                        .exec(txn)
                        .await
                        .context("transition booking")?;
                    if moved.rows_affected == 0 {
                        let latest = bookings::Entity::find_by_id(id.0)
                            .one(txn)
                            .await
                            .context("reload booking after conflict")?
                            .ok_or(ChatServiceError::BookingNotFound)?;
                        return Err(step.conflict(booking_from_model(latest)?.status));
                    }

                    if let Some(otp_id) = otp {
                        let consumed = otps::Entity::update_many()
                            .filter(otps::Column::Id.eq(otp_id))
                            .filter(otps::Column::Used.eq(false))
                            .col_expr(otps::Column::Used, Expr::value(true))
                            .col_expr(otps::Column::VerifiedAt, Expr::value(Some(now)))
                            .exec(txn)
                            .await
                            .context("consume otp")?;
                        if consumed.rows_affected == 0 {
                            return Err(ChatServiceError::OtpAlreadyUsed);
                        }
                    }
                    if let Some(status) = step.load_status() {
                        loads::Entity::update_many()
                            .filter(loads::Column::Id.eq(booking.load_id.0))
                            .col_expr(loads::Column::Status, Expr::value(status.as_str()))
                            .col_expr(loads::Column::UpdatedAt, Expr::value(now))
                            .exec(txn)
                            .await
                            .context("update load status")?;
                    }
                    if let Some(trip_completed) = step.releases_trucker() {
                        let mut release = truckers::Entity::update_many()
                            .filter(truckers::Column::Id.eq(booking.trucker_id.0))
                            .col_expr(truckers::Column::Available, Expr::value(true))
                            .col_expr(truckers::Column::UpdatedAt, Expr::value(now));
                        if trip_completed {
                            release = release.col_expr(
                                truckers::Column::TotalTrips,
                                Expr::col(truckers::Column::TotalTrips).add(1),
                            );
                        }
                        release.exec(txn).await.context("release trucker")?;
                    }
                    Ok(booking)
                })
            })
            .await
            .map_err(flatten)
    }

    // ── One-time codes ───────────────────────────────────────────────────────

    async fn create_otp(&self, otp: &Otp) -> Result<(), ChatServiceError> {
        otps::ActiveModel {
            id: Set(otp.id),
            phone: Set(otp.phone.clone()),
            code: Set(otp.code.clone()),
            purpose: Set(otp.purpose.as_str().to_owned()),
            reference_id: Set(otp.reference_id.clone()),
            expires_at: Set(otp.expires_at),
            used: Set(otp.used),
            verified_at: Set(otp.verified_at),
            attempts: Set(otp.attempts),
            revoked_at: Set(otp.revoked_at),
            created_at: Set(otp.created_at),
        }
        .insert(&self.db)
        .await
        .context("insert otp")?;
        Ok(())
    }

    async fn find_otp(
        &self,
        phone: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<Otp>, ChatServiceError> {
        let model = otps::Entity::find()
            .filter(otps::Column::Phone.eq(phone))
            .filter(otps::Column::Code.eq(code))
            .filter(otps::Column::Purpose.eq(purpose.as_str()))
            .order_by_desc(otps::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find otp")?;
        model.map(otp_from_model).transpose()
    }

    async fn find_active_otp(
        &self,
        phone: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<Otp>, ChatServiceError> {
        let model = otps::Entity::find()
            .filter(otps::Column::Phone.eq(phone))
            .filter(otps::Column::Purpose.eq(purpose.as_str()))
            .filter(otps::Column::Used.eq(false))
            .filter(otps::Column::RevokedAt.is_null())
            .order_by_desc(otps::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find active otp")?;
        model.map(otp_from_model).transpose()
    }

    async fn update_otp(&self, otp: &Otp) -> Result<(), ChatServiceError> {
        let result = otps::Entity::update_many()
            .filter(otps::Column::Id.eq(otp.id))
            .col_expr(otps::Column::Used, Expr::value(otp.used))
            .col_expr(otps::Column::VerifiedAt, Expr::value(otp.verified_at))
            .col_expr(otps::Column::Attempts, Expr::value(otp.attempts))
            .col_expr(otps::Column::RevokedAt, Expr::value(otp.revoked_at))
            .exec(&self.db)
            .await
            .context("update otp")?;
        if result.rows_affected == 0 {
            return Err(ChatServiceError::OtpNotFound);
        }
        Ok(())
    }

    async fn revoke_otps(&self, phone: &str, purpose: OtpPurpose) -> Result<u64, ChatServiceError> {
        let result = otps::Entity::update_many()
            .filter(otps::Column::Phone.eq(phone))
            .filter(otps::Column::Purpose.eq(purpose.as_str()))
            .filter(otps::Column::Used.eq(false))
            .filter(otps::Column::RevokedAt.is_null())
            .col_expr(otps::Column::RevokedAt, Expr::value(Some(Utc::now())))
            .exec(&self.db)
            .await
            .context("revoke otps")?;
        Ok(result.rows_affected)
    }

    // ── Support ──────────────────────────────────────────────────────────────

    async fn create_support_ticket(
        &self,
        new: NewSupportTicket,
    ) -> Result<SupportTicket, ChatServiceError> {
        let model = support_tickets::ActiveModel {
            user_phone: Set(new.user_phone),
            user_type: Set(new.user_type),
            user_id: Set(new.user_id),
            issue_type: Set(new.issue_type),
            description: Set(new.description),
            status: Set(new.status),
            priority: Set(new.priority),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("insert support ticket")?;
        Ok(ticket_from_model(model))
    }
}

// ── Conversions ──────────────────────────────────────────────────────────────

fn trucker_from_model(model: truckers::Model) -> Trucker {
    Trucker {
        id: TruckerId(model.id),
        name: model.name,
        phone: model.phone,
        vehicle_no: model.vehicle_no,
        vehicle_type: model.vehicle_type,
        capacity: model.capacity,
        verified: model.verified,
        rating: model.rating,
        total_trips: model.total_trips,
        current_city: model.current_city,
        available: model.available,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn shipper_from_model(model: shippers::Model) -> Shipper {
    Shipper {
        id: ShipperId(model.id),
        company_name: model.company_name,
        contact_name: model.contact_name,
        gst_number: model.gst_number,
        phone: model.phone,
        state: model.state,
        verified: model.verified,
        active: model.active,
        total_loads: model.total_loads,
        rating: model.rating,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn load_from_model(model: loads::Model) -> Result<Load, ChatServiceError> {
    let status = LoadStatus::parse(&model.status)
        .ok_or_else(|| anyhow!("unknown load status {:?}", model.status))?;
    Ok(Load {
        id: LoadId(model.id),
        shipper_id: ShipperId(model.shipper_id),
        shipper_name: model.shipper_name,
        shipper_phone: model.shipper_phone,
        from_city: model.from_city,
        to_city: model.to_city,
        material: model.material,
        weight: model.weight,
        vehicle_type: model.vehicle_type,
        price: model.price,
        loading_date: model.loading_date,
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn booking_from_model(model: bookings::Model) -> Result<Booking, ChatServiceError> {
    let status = BookingStatus::parse(&model.status)
        .ok_or_else(|| anyhow!("unknown booking status {:?}", model.status))?;
    let payment_status = PaymentStatus::parse(&model.payment_status)
        .ok_or_else(|| anyhow!("unknown payment status {:?}", model.payment_status))?;
    Ok(Booking {
        id: BookingId(model.id),
        load_id: LoadId(model.load_id),
        trucker_id: TruckerId(model.trucker_id),
        shipper_id: ShipperId(model.shipper_id),
        agreed_price: model.agreed_price,
        commission: model.commission,
        net_amount: model.net_amount,
        status,
        payment_status,
        confirmed_at: model.confirmed_at,
        picked_up_at: model.picked_up_at,
        delivered_at: model.delivered_at,
        completed_at: model.completed_at,
        cancelled_at: model.cancelled_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn otp_from_model(model: otps::Model) -> Result<Otp, ChatServiceError> {
    let purpose = OtpPurpose::parse(&model.purpose)
        .ok_or_else(|| anyhow!("unknown otp purpose {:?}", model.purpose))?;
    Ok(Otp {
        id: model.id,
        phone: model.phone,
        code: model.code,
        purpose,
        reference_id: model.reference_id,
        expires_at: model.expires_at,
        used: model.used,
        verified_at: model.verified_at,
        attempts: model.attempts,
        revoked_at: model.revoked_at,
        created_at: model.created_at,
    })
}

fn ticket_from_model(model: support_tickets::Model) -> SupportTicket {
    SupportTicket {
        id: TicketId(model.id),
        user_phone: model.user_phone,
        user_type: model.user_type,
        user_id: model.user_id,
        issue_type: model.issue_type,
        description: model.description,
        status: model.status,
        priority: model.priority,
        created_at: model.created_at,
    }
}
