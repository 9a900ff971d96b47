//! SeaORM implementation of ReservationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr,
    TransactionTrait,
};

use super::{db_err, from_cents, to_cents};
use crate::domain::reservation::{
    CustomerContact, Locale, PaymentMethod, PaymentStatus, Reservation, ReservationFilter,
    ReservationRepository, ReservationState, ReservationStatus,
};
use crate::domain::{CapacityCheck, DomainError, DomainResult, TimeWindow};
use crate::infrastructure::database::entities::reservation;
use crate::shared::types::{PageRequest, PaginatedResult};

pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn corrupt(code: &str, what: &str, value: &str) -> DomainError {
    DomainError::Storage(format!("Reservation {code} has invalid {what} '{value}'"))
}

fn window_of(m: &reservation::Model) -> DomainResult<TimeWindow> {
    TimeWindow::new(m.start_time, m.end_time)
        .map_err(|_| corrupt(&m.code, "window", &m.start_time.to_rfc3339()))
}

fn model_to_domain(m: reservation::Model) -> DomainResult<Reservation> {
    let window = window_of(&m)?;
    let status = ReservationStatus::parse(&m.status)
        .ok_or_else(|| corrupt(&m.code, "status", &m.status))?;
    let payment_status = PaymentStatus::parse(&m.payment_status)
        .ok_or_else(|| corrupt(&m.code, "payment status", &m.payment_status))?;
    let payment_method = PaymentMethod::parse(&m.payment_method)
        .ok_or_else(|| corrupt(&m.code, "payment method", &m.payment_method))?;

    Ok(Reservation {
        id: m.id,
        code: m.code,
        contact: CustomerContact {
            name: m.full_name,
            email: m.email,
            phone: m.phone,
        },
        vehicle_type_id: m.vehicle_type_id,
        vehicle_plate: m.vehicle_plate,
        vehicle_model: m.vehicle_model,
        payment_method,
        window,
        status,
        payment_status,
        provider_reference: m.provider_reference,
        payment_intent: m.payment_intent,
        total_price: m.total_price_cents.map(from_cents),
        locale: Locale::from_tag(&m.locale),
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(r: &Reservation) -> DomainResult<reservation::ActiveModel> {
    let total_price_cents = r
        .total_price
        .map(|p| to_cents(p, "total_price"))
        .transpose()?;

    Ok(reservation::ActiveModel {
        id: if r.id == 0 { NotSet } else { Set(r.id) },
        code: Set(r.code.clone()),
        full_name: Set(r.contact.name.clone()),
        email: Set(r.contact.email.clone()),
        phone: Set(r.contact.phone.clone()),
        vehicle_type_id: Set(r.vehicle_type_id),
        vehicle_plate: Set(r.vehicle_plate.clone()),
        vehicle_model: Set(r.vehicle_model.clone()),
        payment_method: Set(r.payment_method.as_str().to_string()),
        start_time: Set(r.window.start()),
        end_time: Set(r.window.end()),
        status: Set(r.status.as_str().to_string()),
        payment_status: Set(r.payment_status.as_str().to_string()),
        provider_reference: Set(r.provider_reference.clone()),
        payment_intent: Set(r.payment_intent.clone()),
        total_price_cents: Set(total_price_cents),
        locale: Set(r.locale.as_str().to_string()),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
    })
}

fn status_strings(statuses: &[ReservationStatus]) -> Vec<&'static str> {
    statuses.iter().map(ReservationStatus::as_str).collect()
}

fn apply_filter(
    mut query: Select<reservation::Entity>,
    filter: &ReservationFilter,
) -> Select<reservation::Entity> {
    if let Some(from) = filter.start_from {
        query = query.filter(reservation::Column::StartTime.gte(from));
    }
    if let Some(until) = filter.start_until {
        query = query.filter(reservation::Column::StartTime.lt(until));
    }
    if let Some(code) = filter.code_contains.as_deref() {
        query = query.filter(reservation::Column::Code.contains(code.trim().to_uppercase()));
    }
    if let Some(vehicle_type_id) = filter.vehicle_type_id {
        query = query.filter(reservation::Column::VehicleTypeId.eq(vehicle_type_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(reservation::Column::Status.eq(status.as_str()));
    }
    query
}

/// Overlap query shared by the plain read and the transactional insert.
async fn overlapping_windows<C: ConnectionTrait>(
    conn: &C,
    members: &[i32],
    window: TimeWindow,
    excluded: &[ReservationStatus],
) -> DomainResult<Vec<TimeWindow>> {
    let models = reservation::Entity::find()
        .filter(reservation::Column::VehicleTypeId.is_in(members.iter().copied()))
        .filter(reservation::Column::Status.is_not_in(status_strings(excluded)))
        .filter(reservation::Column::StartTime.lt(window.end()))
        .filter(reservation::Column::EndTime.gt(window.start()))
        .all(conn)
        .await
        .map_err(db_err)?;
    models.iter().map(window_of).collect()
}

fn insert_err(e: DbErr, code: &str) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::DuplicateCode(code.to_string()),
        _ => db_err(e),
    }
}

// ── ReservationRepository impl ──────────────────────────────────

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn insert_within_capacity(
        &self,
        r: Reservation,
        members: &[i32],
        check: CapacityCheck,
    ) -> DomainResult<Reservation> {
        debug!("Inserting reservation {} into pool {}", r.code, check.pool_id);

        let model = domain_to_active(&r)?;
        let txn = self.db.begin().await.map_err(db_err)?;

        let booked = overlapping_windows(
            &txn,
            members,
            check.window,
            &ReservationStatus::NON_OCCUPYING,
        )
        .await?;
        // Dropping `txn` without commit rolls back
        check.verify(&booked)?;

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| insert_err(e, &r.code))?;
        txn.commit().await.map_err(db_err)?;

        model_to_domain(inserted)
    }

    async fn find_overlapping(
        &self,
        members: &[i32],
        window: TimeWindow,
        excluded: &[ReservationStatus],
    ) -> DomainResult<Vec<TimeWindow>> {
        overlapping_windows(&self.db, members, window, excluded).await
    }

    async fn find_by_code(&self, code: &str) -> DomainResult<Option<Reservation>> {
        let model = reservation::Entity::find()
            .filter(reservation::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn find_by_provider_reference(
        &self,
        reference: &str,
    ) -> DomainResult<Option<Reservation>> {
        let model = reservation::Entity::find()
            .filter(reservation::Column::ProviderReference.eq(reference))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn update(&self, r: &Reservation, expected: ReservationState) -> DomainResult<()> {
        debug!(
            "Updating reservation {} {}/{} -> {}/{}",
            r.code,
            expected.status,
            expected.payment_status.as_str(),
            r.status,
            r.payment_status.as_str()
        );

        let result = reservation::Entity::update_many()
            .col_expr(reservation::Column::Status, Expr::value(r.status.as_str()))
            .col_expr(
                reservation::Column::PaymentStatus,
                Expr::value(r.payment_status.as_str()),
            )
            .col_expr(
                reservation::Column::ProviderReference,
                Expr::value(r.provider_reference.clone()),
            )
            .col_expr(
                reservation::Column::PaymentIntent,
                Expr::value(r.payment_intent.clone()),
            )
            .col_expr(reservation::Column::UpdatedAt, Expr::value(r.updated_at))
            .filter(reservation::Column::Id.eq(r.id))
            .filter(reservation::Column::Status.eq(expected.status.as_str()))
            .filter(reservation::Column::PaymentStatus.eq(expected.payment_status.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::StaleState(r.code.clone()));
        }
        Ok(())
    }

    async fn list_active_past_end(&self, now: DateTime<Utc>) -> DomainResult<Vec<i32>> {
        reservation::Entity::find()
            .select_only()
            .column(reservation::Column::Id)
            .filter(reservation::Column::Status.eq(ReservationStatus::Active.as_str()))
            .filter(reservation::Column::EndTime.lt(now))
            .order_by_asc(reservation::Column::Id)
            .into_tuple::<i32>()
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn list_pending_created_before(
        &self,
        created_before: DateTime<Utc>,
    ) -> DomainResult<Vec<Reservation>> {
        let models = reservation::Entity::find()
            .filter(reservation::Column::Status.eq(ReservationStatus::Pending.as_str()))
            .filter(reservation::Column::CreatedAt.lt(created_before))
            .order_by_asc(reservation::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_domain).collect()
    }

    async fn bulk_update_status(
        &self,
        ids: &[i32],
        status: ReservationStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let from: Vec<ReservationStatus> = ReservationStatus::ALL
            .into_iter()
            .filter(|s| s.can_transition_to(status))
            .collect();

        let result = reservation::Entity::update_many()
            .col_expr(reservation::Column::Status, Expr::value(status.as_str()))
            .col_expr(reservation::Column::UpdatedAt, Expr::value(now))
            .filter(reservation::Column::Id.is_in(ids.iter().copied()))
            .filter(reservation::Column::Status.is_in(status_strings(&from)))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        debug!("Bulk status update to {}: {} rows", status, result.rows_affected);
        Ok(result.rows_affected)
    }

    async fn list(
        &self,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> DomainResult<PaginatedResult<Reservation>> {
        let query = apply_filter(reservation::Entity::find(), filter);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let models = query
            .order_by_desc(reservation::Column::CreatedAt)
            .order_by_desc(reservation::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items = models
            .into_iter()
            .map(model_to_domain)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(items, total, page))
    }

    async fn delete_by_code(&self, code: &str) -> DomainResult<bool> {
        let result = reservation::Entity::delete_many()
            .filter(reservation::Column::Code.eq(code))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reservation::ReservationDraft;
    use crate::infrastructure::database::repositories::test_db;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    fn at(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap() + Duration::hours(h)
    }

    fn window(start: i64, end: i64) -> TimeWindow {
        TimeWindow::new(at(start), at(end)).unwrap()
    }

    fn reservation(code: &str, vehicle_type_id: i32, w: TimeWindow) -> Reservation {
        let draft = ReservationDraft {
            contact: CustomerContact {
                name: "Luca Bianchi".into(),
                email: "luca@example.com".into(),
                phone: None,
            },
            vehicle_type_id,
            vehicle_plate: "xy987zw".into(),
            vehicle_model: None,
            payment_method: PaymentMethod::Online,
            window: w,
            locale: Locale::It,
        };
        Reservation::new(draft, code, ReservationStatus::Active, Some(Decimal::new(1550, 2)))
    }

    fn check(total: u32, w: TimeWindow) -> CapacityCheck {
        CapacityCheck {
            window: w,
            vehicle_type_id: 1,
            pool_id: 1,
            total,
        }
    }

    #[tokio::test]
    async fn insert_and_read_back() {
        let repo = SeaOrmReservationRepository::new(test_db().await);
        let stored = repo
            .insert_within_capacity(reservation("0A1B2C3D", 1, window(10, 12)), &[1, 3], check(2, window(10, 12)))
            .await
            .unwrap();
        assert!(stored.id > 0);

        let found = repo.find_by_code("0A1B2C3D").await.unwrap().unwrap();
        assert_eq!(found.id, stored.id);
        assert_eq!(found.vehicle_plate, "XY987ZW");
        assert_eq!(found.locale, Locale::It);
        assert_eq!(found.total_price, Some(Decimal::new(155, 1)));
        assert_eq!(found.window, window(10, 12));
    }

    #[tokio::test]
    async fn capacity_is_rechecked_inside_the_transaction() {
        let repo = SeaOrmReservationRepository::new(test_db().await);
        repo.insert_within_capacity(reservation("AAAA0001", 1, window(10, 12)), &[1, 3], check(1, window(10, 12)))
            .await
            .unwrap();

        let err = repo
            .insert_within_capacity(reservation("AAAA0002", 3, window(11, 13)), &[1, 3], check(1, window(11, 13)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(repo.find_by_code("AAAA0002").await.unwrap().is_none());

        // Motorcycles are outside the pool
        repo.insert_within_capacity(reservation("AAAA0003", 2, window(11, 13)), &[2], check(1, window(11, 13)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn duplicate_code_is_reported() {
        let repo = SeaOrmReservationRepository::new(test_db().await);
        repo.insert_within_capacity(reservation("DEADBEEF", 1, window(1, 2)), &[1], check(5, window(1, 2)))
            .await
            .unwrap();
        let err = repo
            .insert_within_capacity(reservation("DEADBEEF", 1, window(5, 6)), &[1], check(5, window(5, 6)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateCode(_)));
    }

    #[tokio::test]
    async fn overlap_skips_released_statuses() {
        let repo = SeaOrmReservationRepository::new(test_db().await);
        let mut canceled = repo
            .insert_within_capacity(reservation("CCCC0001", 1, window(10, 12)), &[1], check(5, window(10, 12)))
            .await
            .unwrap();
        let expected = canceled.state();
        canceled.cancel().unwrap();
        repo.update(&canceled, expected).await.unwrap();

        repo.insert_within_capacity(reservation("CCCC0002", 3, window(11, 12)), &[1, 3], check(5, window(11, 12)))
            .await
            .unwrap();

        let booked = repo
            .find_overlapping(&[1, 3], window(10, 13), &ReservationStatus::NON_OCCUPYING)
            .await
            .unwrap();
        assert_eq!(booked, vec![window(11, 12)]);

        // Touching windows do not overlap
        let touching = repo
            .find_overlapping(&[1, 3], window(12, 13), &ReservationStatus::NON_OCCUPYING)
            .await
            .unwrap();
        assert!(touching.is_empty());
    }

    #[tokio::test]
    async fn sweep_queries_only_move_elapsed_active_rows() {
        let repo = SeaOrmReservationRepository::new(test_db().await);
        let done = repo
            .insert_within_capacity(reservation("EEEE0001", 1, window(1, 2)), &[1], check(5, window(1, 2)))
            .await
            .unwrap();
        repo.insert_within_capacity(reservation("EEEE0002", 1, window(1, 8)), &[1], check(5, window(1, 8)))
            .await
            .unwrap();

        // Ending exactly now is not elapsed yet
        assert!(repo.list_active_past_end(at(2)).await.unwrap().is_empty());

        let ids = repo.list_active_past_end(at(3)).await.unwrap();
        assert_eq!(ids, vec![done.id]);

        let moved = repo
            .bulk_update_status(&ids, ReservationStatus::Finished, at(3))
            .await
            .unwrap();
        assert_eq!(moved, 1);
        assert!(repo.list_active_past_end(at(3)).await.unwrap().is_empty());
        assert_eq!(
            repo.find_by_code("EEEE0001").await.unwrap().unwrap().status,
            ReservationStatus::Finished
        );
        assert_eq!(repo.bulk_update_status(&[], ReservationStatus::Finished, at(3)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn filtered_listing_and_delete() {
        let repo = SeaOrmReservationRepository::new(test_db().await);
        for (i, vt) in [1, 2, 3, 1].into_iter().enumerate() {
            let w = window(i as i64 * 2, i as i64 * 2 + 1);
            repo.insert_within_capacity(reservation(&format!("FFFF000{i}"), vt, w), &[vt], check(5, w))
                .await
                .unwrap();
        }

        let page = repo
            .list(&ReservationFilter::default(), PageRequest::new(1, 3))
            .await
            .unwrap();
        assert_eq!((page.total, page.items.len(), page.total_pages), (4, 3, 2));

        let by_type = ReservationFilter {
            vehicle_type_id: Some(1),
            ..Default::default()
        };
        assert_eq!(repo.list(&by_type, PageRequest::default()).await.unwrap().total, 2);

        let by_start = ReservationFilter {
            start_from: Some(at(2)),
            start_until: Some(at(5)),
            ..Default::default()
        };
        assert_eq!(repo.list(&by_start, PageRequest::default()).await.unwrap().total, 2);

        let by_code = ReservationFilter {
            code_contains: Some("ff0003".into()),
            ..Default::default()
        };
        assert_eq!(repo.list(&by_code, PageRequest::default()).await.unwrap().total, 1);

        assert!(repo.delete_by_code("FFFF0000").await.unwrap());
        assert!(!repo.delete_by_code("FFFF0000").await.unwrap());
    }

    #[tokio::test]
    async fn update_only_applies_to_the_expected_state() {
        let repo = SeaOrmReservationRepository::new(test_db().await);
        let stored = repo
            .insert_within_capacity(reservation("ABAB0001", 1, window(10, 12)), &[1], check(5, window(10, 12)))
            .await
            .unwrap();
        let loaded = stored.state();

        let mut canceled = stored.clone();
        canceled.cancel().unwrap();
        repo.update(&canceled, loaded).await.unwrap();

        // A writer still holding the active copy loses
        let mut refunded = stored;
        refunded.payment_status = PaymentStatus::Refunded;
        refunded.provider_reference = Some("cs_1".into());
        let err = repo.update(&refunded, loaded).await.unwrap_err();
        assert!(matches!(err, DomainError::StaleState(code) if code == "ABAB0001"));

        let current = repo.find_by_code("ABAB0001").await.unwrap().unwrap();
        assert_eq!(current.status, ReservationStatus::Canceled);
        assert_eq!(current.payment_status, PaymentStatus::None);
        assert_eq!(current.provider_reference, None);
    }

    #[tokio::test]
    async fn pending_rows_are_listed_by_age() {
        let repo = SeaOrmReservationRepository::new(test_db().await);
        let mut old = reservation("PEND0001", 1, window(10, 12));
        old.status = ReservationStatus::Pending;
        old.created_at = at(-48);
        let mut fresh = reservation("PEND0002", 1, window(10, 12));
        fresh.status = ReservationStatus::Pending;
        fresh.created_at = at(-1);
        let mut paid = reservation("PEND0003", 1, window(10, 12));
        paid.created_at = at(-48);

        for r in [old, fresh, paid] {
            repo.insert_within_capacity(r, &[1], check(5, window(10, 12)))
                .await
                .unwrap();
        }

        let stale = repo.list_pending_created_before(at(-2)).await.unwrap();
        let codes: Vec<&str> = stale.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["PEND0001"]);
    }
}
