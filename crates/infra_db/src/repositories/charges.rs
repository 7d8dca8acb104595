//! Charge source on PostgreSQL
//!
//! Loads a company's stay and charge records and hands them to the pure
//! aggregation function in `domain_charges`; all billing arithmetic stays
//! in the domain, the repository only shuttles rows.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{BillingPeriod, CompanyId, DualAmount, ServiceChargeId, StayId};
use domain_billing::ChargeSource;
use domain_charges::{
    aggregator, AggregationError, ChargeBundle, ContainerNumber, ContainerSize, ContainerStay,
    Occupancy, ServiceCharge,
};

/// Repository implementing the charge source port on PostgreSQL
#[derive(Debug, Clone)]
pub struct PgChargeSource {
    pool: PgPool,
}

impl PgChargeSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_stays(&self, company_id: CompanyId) -> Result<Vec<ContainerStay>, AggregationError> {
        let rows = sqlx::query_as::<_, StayRow>(
            "SELECT id, company_id, container_no, size, occupancy, arrived_on, \
                    departed_on, free_days, daily_rate \
             FROM container_stays WHERE company_id = $1",
        )
        .bind(*company_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;
        rows.into_iter().map(StayRow::into_stay).collect()
    }

    async fn load_charges(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<ServiceCharge>, AggregationError> {
        let rows = sqlx::query_as::<_, ChargeRow>(
            "SELECT id, company_id, container_no, description, charge_date, \
                    amount, recorded_at \
             FROM service_charges WHERE company_id = $1",
        )
        .bind(*company_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;
        rows.into_iter().map(ChargeRow::into_charge).collect()
    }
}

#[async_trait]
impl ChargeSource for PgChargeSource {
    async fn companies_with_activity(
        &self,
        period: BillingPeriod,
    ) -> Result<Vec<CompanyId>, AggregationError> {
        let companies: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT company_id FROM container_stays
            WHERE departed_on >= $1 AND departed_on < $2
            UNION
            SELECT company_id FROM service_charges
            WHERE charge_date >= $1 AND charge_date < $2
            ORDER BY company_id
            "#,
        )
        .bind(period.start())
        .bind(period.end())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(companies.into_iter().map(CompanyId::from_uuid).collect())
    }

    async fn bundle_for(
        &self,
        company_id: CompanyId,
        period: BillingPeriod,
        as_of: NaiveDate,
    ) -> Result<ChargeBundle, AggregationError> {
        let stays = self.load_stays(company_id).await?;
        let charges = self.load_charges(company_id).await?;
        aggregator::aggregate(company_id, period, as_of, &stays, &charges)
    }
}

fn unavailable(e: sqlx::Error) -> AggregationError {
    AggregationError::Unavailable(e.to_string())
}

fn bad_rate(e: serde_json::Error) -> AggregationError {
    AggregationError::Unavailable(format!("undecodable amount: {e}"))
}

#[derive(sqlx::FromRow)]
struct StayRow {
    id: Uuid,
    company_id: Uuid,
    container_no: String,
    size: String,
    occupancy: String,
    arrived_on: NaiveDate,
    departed_on: Option<NaiveDate>,
    free_days: i32,
    daily_rate: serde_json::Value,
}

impl StayRow {
    fn into_stay(self) -> Result<ContainerStay, AggregationError> {
        Ok(ContainerStay {
            id: StayId::from_uuid(self.id),
            company_id: CompanyId::from_uuid(self.company_id),
            container: ContainerNumber::new(self.container_no)?,
            size: parse_size(&self.size)?,
            occupancy: parse_occupancy(&self.occupancy)?,
            arrived_on: self.arrived_on,
            departed_on: self.departed_on,
            free_days: self.free_days.max(0) as u32,
            daily_rate: serde_json::from_value::<DualAmount>(self.daily_rate).map_err(bad_rate)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ChargeRow {
    id: Uuid,
    company_id: Uuid,
    container_no: Option<String>,
    description: String,
    charge_date: NaiveDate,
    amount: serde_json::Value,
    recorded_at: DateTime<Utc>,
}

impl ChargeRow {
    fn into_charge(self) -> Result<ServiceCharge, AggregationError> {
        Ok(ServiceCharge {
            id: ServiceChargeId::from_uuid(self.id),
            company_id: CompanyId::from_uuid(self.company_id),
            container: self.container_no.map(ContainerNumber::new).transpose()?,
            description: self.description,
            charge_date: self.charge_date,
            amount: serde_json::from_value::<DualAmount>(self.amount).map_err(bad_rate)?,
            recorded_at: self.recorded_at,
        })
    }
}

fn parse_size(s: &str) -> Result<ContainerSize, AggregationError> {
    match s {
        "twenty" => Ok(ContainerSize::Twenty),
        "forty" => Ok(ContainerSize::Forty),
        "forty_five" => Ok(ContainerSize::FortyFive),
        other => Err(AggregationError::Unavailable(format!(
            "unknown container size '{other}'"
        ))),
    }
}

fn parse_occupancy(s: &str) -> Result<Occupancy, AggregationError> {
    match s {
        "laden" => Ok(Occupancy::Laden),
        "empty" => Ok(Occupancy::Empty),
        other => Err(AggregationError::Unavailable(format!(
            "unknown occupancy '{other}'"
        ))),
    }
}
