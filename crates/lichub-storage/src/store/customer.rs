use chrono::Utc;
use lichub_common::types::{Customer, CustomerDetail, CustomerListItem, CustomerOption};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, Statement, TransactionTrait,
};

use crate::entities::channel::{Column as ChannelCol, Entity as ChannelEntity};
use crate::entities::channel_customer::{
    Column as ChannelCustomerCol, Entity as ChannelCustomerEntity,
};
use crate::entities::customer::{self, Column as CustomerCol, Entity as CustomerEntity};
use crate::entities::customer_product::{
    Column as CustomerProductCol, Entity as CustomerProductEntity,
};
use crate::entities::license::{Column as LicenseCol, Entity as LicenseEntity};
use crate::entities::product::{Column as ProductCol, Entity as ProductEntity};
use crate::error::{Result, StoreError};
use crate::store::{associations, channel, license, product, EntityStore};

/// Customer write payload; association id lists replace in full.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub industry: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub delivery_person: Option<String>,
    pub deployment_plan: Option<String>,
    pub channel_ids: Vec<i64>,
    pub product_ids: Vec<i64>,
}

pub(crate) fn model_to_customer(m: customer::Model) -> Customer {
    Customer {
        id: m.id,
        name: m.name,
        industry: m.industry,
        contact_person: m.contact_person,
        contact_phone: m.contact_phone,
        contact_email: m.contact_email,
        address: m.address,
        delivery_person: m.delivery_person,
        deployment_plan: m.deployment_plan,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

const LIST_SQL: &str = "
SELECT c.id, c.name, c.industry, c.contact_person, c.contact_phone, c.contact_email,
       c.address, c.delivery_person, c.deployment_plan, c.created_at, c.updated_at,
       GROUP_CONCAT(DISTINCT ch.name) AS channel_names,
       GROUP_CONCAT(DISTINCT p.name || ' v' || p.version) AS product_names,
       COUNT(DISTINCT l.id) AS license_count
FROM customers c
LEFT JOIN channel_customers cc ON cc.customer_id = c.id
LEFT JOIN channels ch ON ch.id = cc.channel_id
LEFT JOIN customer_products cp ON cp.customer_id = c.id
LEFT JOIN products p ON p.id = cp.product_id
LEFT JOIN licenses l ON l.customer_id = c.id
GROUP BY c.id
ORDER BY c.created_at DESC";

impl EntityStore {
    /// Customer list shape: aggregated channel/product names plus the
    /// exact count of owned licenses (zero included).
    pub async fn list_customers(&self) -> Result<Vec<CustomerListItem>> {
        let rows = self
            .db()
            .query_all(Statement::from_string(
                sea_orm::DatabaseBackend::Sqlite,
                LIST_SQL.to_string(),
            ))
            .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let created_at: chrono::DateTime<chrono::FixedOffset> =
                row.try_get("", "created_at")?;
            let updated_at: chrono::DateTime<chrono::FixedOffset> =
                row.try_get("", "updated_at")?;
            items.push(CustomerListItem {
                id: row.try_get("", "id")?,
                name: row.try_get("", "name")?,
                industry: row.try_get("", "industry")?,
                contact_person: row.try_get("", "contact_person")?,
                contact_phone: row.try_get("", "contact_phone")?,
                contact_email: row.try_get("", "contact_email")?,
                address: row.try_get("", "address")?,
                delivery_person: row.try_get("", "delivery_person")?,
                deployment_plan: row.try_get("", "deployment_plan")?,
                channel_names: row.try_get("", "channel_names")?,
                product_names: row.try_get("", "product_names")?,
                license_count: row.try_get("", "license_count")?,
                created_at: created_at.with_timezone(&Utc),
                updated_at: updated_at.with_timezone(&Utc),
            });
        }
        Ok(items)
    }

    /// Customer detail shape: expanded channels, products, and owned
    /// licenses (newest first).
    pub async fn get_customer(&self, id: i64) -> Result<Option<CustomerDetail>> {
        let Some(m) = CustomerEntity::find_by_id(id).one(self.db()).await? else {
            return Ok(None);
        };

        let channel_ids: Vec<i64> = ChannelCustomerEntity::find()
            .filter(ChannelCustomerCol::CustomerId.eq(id))
            .all(self.db())
            .await?
            .into_iter()
            .map(|r| r.channel_id)
            .collect();
        let channels = if channel_ids.is_empty() {
            Vec::new()
        } else {
            ChannelEntity::find()
                .filter(ChannelCol::Id.is_in(channel_ids))
                .order_by(ChannelCol::Name, Order::Asc)
                .all(self.db())
                .await?
                .into_iter()
                .map(channel::model_to_channel)
                .collect()
        };

        let product_ids: Vec<i64> = CustomerProductEntity::find()
            .filter(CustomerProductCol::CustomerId.eq(id))
            .all(self.db())
            .await?
            .into_iter()
            .map(|r| r.product_id)
            .collect();
        let products = if product_ids.is_empty() {
            Vec::new()
        } else {
            ProductEntity::find()
                .filter(ProductCol::Id.is_in(product_ids))
                .order_by(ProductCol::Name, Order::Asc)
                .all(self.db())
                .await?
                .into_iter()
                .map(product::model_to_product)
                .collect()
        };

        let licenses = LicenseEntity::find()
            .filter(LicenseCol::CustomerId.eq(id))
            .order_by(LicenseCol::CreatedAt, Order::Desc)
            .all(self.db())
            .await?
            .into_iter()
            .map(license::model_to_license)
            .collect();

        let cu = model_to_customer(m);
        Ok(Some(CustomerDetail {
            id: cu.id,
            name: cu.name,
            industry: cu.industry,
            contact_person: cu.contact_person,
            contact_phone: cu.contact_phone,
            contact_email: cu.contact_email,
            address: cu.address,
            delivery_person: cu.delivery_person,
            deployment_plan: cu.deployment_plan,
            created_at: cu.created_at,
            updated_at: cu.updated_at,
            channels,
            products,
            licenses,
        }))
    }

    /// Insert a customer and its association rows in one transaction.
    pub async fn insert_customer(&self, new: &NewCustomer) -> Result<i64> {
        let txn = self.db.begin().await?;
        let now = Utc::now().fixed_offset();
        let model = customer::ActiveModel {
            name: Set(new.name.clone()),
            industry: Set(new.industry.clone()),
            contact_person: Set(new.contact_person.clone()),
            contact_phone: Set(new.contact_phone.clone()),
            contact_email: Set(new.contact_email.clone()),
            address: Set(new.address.clone()),
            delivery_person: Set(new.delivery_person.clone()),
            deployment_plan: Set(new.deployment_plan.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        associations::replace_customer_channels(&txn, model.id, &new.channel_ids).await?;
        associations::replace_customer_products(&txn, model.id, &new.product_ids).await?;
        txn.commit().await?;
        Ok(model.id)
    }

    /// Update a customer and fully replace its associations, atomically.
    pub async fn update_customer(&self, id: i64, new: &NewCustomer) -> Result<Customer> {
        let txn = self.db.begin().await?;
        let Some(m) = CustomerEntity::find_by_id(id).one(&txn).await? else {
            return Err(StoreError::NotFound {
                entity: "customer",
                id,
            });
        };
        let now = Utc::now().fixed_offset();
        let mut am: customer::ActiveModel = m.into();
        am.name = Set(new.name.clone());
        am.industry = Set(new.industry.clone());
        am.contact_person = Set(new.contact_person.clone());
        am.contact_phone = Set(new.contact_phone.clone());
        am.contact_email = Set(new.contact_email.clone());
        am.address = Set(new.address.clone());
        am.delivery_person = Set(new.delivery_person.clone());
        am.deployment_plan = Set(new.deployment_plan.clone());
        am.updated_at = Set(now);
        let updated = am.update(&txn).await?;
        associations::replace_customer_channels(&txn, id, &new.channel_ids).await?;
        associations::replace_customer_products(&txn, id, &new.product_ids).await?;
        txn.commit().await?;
        Ok(model_to_customer(updated))
    }

    /// Delete a customer, its licenses, and every association row
    /// naming it, in one transaction.
    pub async fn delete_customer(&self, id: i64) -> Result<()> {
        let txn = self.db.begin().await?;
        if CustomerEntity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(StoreError::NotFound {
                entity: "customer",
                id,
            });
        }
        ChannelCustomerEntity::delete_many()
            .filter(ChannelCustomerCol::CustomerId.eq(id))
            .exec(&txn)
            .await?;
        CustomerProductEntity::delete_many()
            .filter(CustomerProductCol::CustomerId.eq(id))
            .exec(&txn)
            .await?;
        LicenseEntity::delete_many()
            .filter(LicenseCol::CustomerId.eq(id))
            .exec(&txn)
            .await?;
        CustomerEntity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn customer_exists(&self, id: i64) -> Result<bool> {
        Ok(CustomerEntity::find_by_id(id)
            .one(self.db())
            .await?
            .is_some())
    }

    /// Customers offered for association pickers, ordered by name.
    pub async fn customer_options(&self) -> Result<Vec<CustomerOption>> {
        let rows = CustomerEntity::find()
            .order_by(CustomerCol::Name, Order::Asc)
            .all(self.db())
            .await?;
        Ok(rows
            .into_iter()
            .map(|m| CustomerOption {
                id: m.id,
                name: m.name,
                industry: m.industry,
            })
            .collect())
    }

    pub async fn count_customers(&self) -> Result<u64> {
        Ok(CustomerEntity::find().count(self.db()).await?)
    }
}
