use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use lichub_common::expiry;
use lichub_common::types::{License, LicenseRecord};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};

use crate::entities::customer::{self, Column as CustomerCol, Entity as CustomerEntity};
use crate::entities::license::{self, Column as LicenseCol, Entity as LicenseEntity};
use crate::error::{Result, StoreError};
use crate::store::{associations, EntityStore};

/// License write payload. Date validation (format, ordering) happens at
/// the API boundary; the store enforces that the owning customer exists.
#[derive(Debug, Clone)]
pub struct NewLicense {
    pub customer_id: i64,
    pub license_object: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub feature_code: Option<String>,
    pub valid_points: i64,
    pub description: Option<String>,
}

pub(crate) fn model_to_license(m: license::Model) -> License {
    License {
        id: m.id,
        customer_id: m.customer_id,
        license_object: m.license_object,
        start_date: m.start_date,
        end_date: m.end_date,
        feature_code: m.feature_code,
        valid_points: m.valid_points,
        description: m.description,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

fn joined_record(m: license::Model, owner: Option<&customer::Model>) -> LicenseRecord {
    LicenseRecord {
        id: m.id,
        customer_id: m.customer_id,
        license_object: m.license_object,
        start_date: m.start_date,
        end_date: m.end_date,
        feature_code: m.feature_code,
        valid_points: m.valid_points,
        description: m.description,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
        customer_name: owner.map(|c| c.name.clone()),
        customer_industry: owner.and_then(|c| c.industry.clone()),
        contact_person: owner.and_then(|c| c.contact_person.clone()),
        contact_phone: owner.and_then(|c| c.contact_phone.clone()),
        contact_email: owner.and_then(|c| c.contact_email.clone()),
    }
}

impl EntityStore {
    /// Join license rows with their owning customers' display fields.
    async fn attach_customers(&self, rows: Vec<license::Model>) -> Result<Vec<LicenseRecord>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let mut customer_ids: Vec<i64> = rows.iter().map(|r| r.customer_id).collect();
        customer_ids.sort_unstable();
        customer_ids.dedup();
        let owners: HashMap<i64, customer::Model> = CustomerEntity::find()
            .filter(CustomerCol::Id.is_in(customer_ids))
            .all(self.db())
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        Ok(rows
            .into_iter()
            .map(|m| {
                let owner = owners.get(&m.customer_id);
                joined_record(m, owner)
            })
            .collect())
    }

    pub async fn list_licenses(&self) -> Result<Vec<LicenseRecord>> {
        let rows = LicenseEntity::find()
            .order_by(LicenseCol::CreatedAt, Order::Desc)
            .all(self.db())
            .await?;
        self.attach_customers(rows).await
    }

    pub async fn get_license(&self, id: i64) -> Result<Option<LicenseRecord>> {
        let Some(m) = LicenseEntity::find_by_id(id).one(self.db()).await? else {
            return Ok(None);
        };
        Ok(self.attach_customers(vec![m]).await?.into_iter().next())
    }

    pub async fn licenses_by_customer(&self, customer_id: i64) -> Result<Vec<LicenseRecord>> {
        let rows = LicenseEntity::find()
            .filter(LicenseCol::CustomerId.eq(customer_id))
            .order_by(LicenseCol::CreatedAt, Order::Desc)
            .all(self.db())
            .await?;
        self.attach_customers(rows).await
    }

    /// Licenses whose end date falls inside the inclusive
    /// `[today, today + 30d]` window, soonest first. The window comes
    /// from the same module the response-time classifier uses.
    pub async fn licenses_expiring_soon(&self, today: NaiveDate) -> Result<Vec<LicenseRecord>> {
        let (from, to) = expiry::expiring_window(today);
        let rows = LicenseEntity::find()
            .filter(LicenseCol::EndDate.gte(from))
            .filter(LicenseCol::EndDate.lte(to))
            .order_by(LicenseCol::EndDate, Order::Asc)
            .all(self.db())
            .await?;
        self.attach_customers(rows).await
    }

    /// Licenses with `end_date < today`, most recently expired first.
    pub async fn licenses_expired(&self, today: NaiveDate) -> Result<Vec<LicenseRecord>> {
        let rows = LicenseEntity::find()
            .filter(LicenseCol::EndDate.lt(today))
            .order_by(LicenseCol::EndDate, Order::Desc)
            .all(self.db())
            .await?;
        self.attach_customers(rows).await
    }

    /// Insert a license after checking the owning customer exists.
    pub async fn insert_license(&self, new: &NewLicense) -> Result<i64> {
        let txn = self.db.begin().await?;
        associations::ensure_customer_exists(&txn, new.customer_id).await?;
        let now = Utc::now().fixed_offset();
        let model = license::ActiveModel {
            customer_id: Set(new.customer_id),
            license_object: Set(new.license_object.clone()),
            start_date: Set(new.start_date),
            end_date: Set(new.end_date),
            feature_code: Set(new.feature_code.clone()),
            valid_points: Set(new.valid_points),
            description: Set(new.description.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok(model.id)
    }

    pub async fn update_license(&self, id: i64, new: &NewLicense) -> Result<License> {
        let txn = self.db.begin().await?;
        let Some(m) = LicenseEntity::find_by_id(id).one(&txn).await? else {
            return Err(StoreError::NotFound {
                entity: "license",
                id,
            });
        };
        associations::ensure_customer_exists(&txn, new.customer_id).await?;
        let now = Utc::now().fixed_offset();
        let mut am: license::ActiveModel = m.into();
        am.customer_id = Set(new.customer_id);
        am.license_object = Set(new.license_object.clone());
        am.start_date = Set(new.start_date);
        am.end_date = Set(new.end_date);
        am.feature_code = Set(new.feature_code.clone());
        am.valid_points = Set(new.valid_points);
        am.description = Set(new.description.clone());
        am.updated_at = Set(now);
        let updated = am.update(&txn).await?;
        txn.commit().await?;
        Ok(model_to_license(updated))
    }

    pub async fn license_exists(&self, id: i64) -> Result<bool> {
        Ok(LicenseEntity::find_by_id(id).one(self.db()).await?.is_some())
    }

    pub async fn delete_license(&self, id: i64) -> Result<()> {
        let res = LicenseEntity::delete_by_id(id).exec(self.db()).await?;
        if res.rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "license",
                id,
            });
        }
        Ok(())
    }

    pub async fn count_licenses(&self) -> Result<u64> {
        Ok(LicenseEntity::find().count(self.db()).await?)
    }
}
