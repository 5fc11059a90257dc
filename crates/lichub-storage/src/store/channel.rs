use chrono::Utc;
use lichub_common::types::{
    Channel, ChannelDetail, ChannelListItem, ChannelOption, ChannelType,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, Statement, TransactionTrait,
};

use crate::entities::channel::{self, Column as ChannelCol, Entity as ChannelEntity};
use crate::entities::channel_customer::{
    Column as ChannelCustomerCol, Entity as ChannelCustomerEntity,
};
use crate::entities::channel_product::{
    Column as ChannelProductCol, Entity as ChannelProductEntity,
};
use crate::entities::customer::{Column as CustomerCol, Entity as CustomerEntity};
use crate::entities::product::{Column as ProductCol, Entity as ProductEntity};
use crate::error::{Result, StoreError};
use crate::store::{associations, customer, product, EntityStore};

/// Channel write payload. The association id lists replace whatever is
/// stored (full-replace semantics).
#[derive(Debug, Clone)]
pub struct NewChannel {
    pub name: String,
    pub channel_type: ChannelType,
    pub description: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub customer_ids: Vec<i64>,
    pub product_ids: Vec<i64>,
}

pub(crate) fn model_to_channel(m: channel::Model) -> Channel {
    Channel {
        id: m.id,
        name: m.name,
        channel_type: m.channel_type.parse().unwrap_or(ChannelType::Other),
        description: m.description,
        contact_person: m.contact_person,
        contact_phone: m.contact_phone,
        contact_email: m.contact_email,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

const LIST_SQL: &str = "
SELECT c.id, c.name, c.type, c.description, c.contact_person, c.contact_phone, c.contact_email,
       c.created_at, c.updated_at,
       GROUP_CONCAT(DISTINCT cu.name) AS customer_names,
       GROUP_CONCAT(DISTINCT p.name || ' v' || p.version) AS product_names
FROM channels c
LEFT JOIN channel_customers cc ON cc.channel_id = c.id
LEFT JOIN customers cu ON cu.id = cc.customer_id
LEFT JOIN channel_products cp ON cp.channel_id = c.id
LEFT JOIN products p ON p.id = cp.product_id
GROUP BY c.id
ORDER BY c.created_at DESC";

impl EntityStore {
    /// Channel list shape: one row per channel with comma-joined names
    /// of related customers and products, always computed fresh from
    /// the association tables.
    pub async fn list_channels(&self) -> Result<Vec<ChannelListItem>> {
        let rows = self
            .db()
            .query_all(Statement::from_string(
                sea_orm::DatabaseBackend::Sqlite,
                LIST_SQL.to_string(),
            ))
            .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let channel_type: String = row.try_get("", "type")?;
            let created_at: chrono::DateTime<chrono::FixedOffset> =
                row.try_get("", "created_at")?;
            let updated_at: chrono::DateTime<chrono::FixedOffset> =
                row.try_get("", "updated_at")?;
            items.push(ChannelListItem {
                id: row.try_get("", "id")?,
                name: row.try_get("", "name")?,
                channel_type: channel_type.parse().unwrap_or(ChannelType::Other),
                description: row.try_get("", "description")?,
                contact_person: row.try_get("", "contact_person")?,
                contact_phone: row.try_get("", "contact_phone")?,
                contact_email: row.try_get("", "contact_email")?,
                customer_names: row.try_get("", "customer_names")?,
                product_names: row.try_get("", "product_names")?,
                created_at: created_at.with_timezone(&Utc),
                updated_at: updated_at.with_timezone(&Utc),
            });
        }
        Ok(items)
    }

    /// Channel detail shape: the row plus fully expanded related
    /// customers and products.
    pub async fn get_channel(&self, id: i64) -> Result<Option<ChannelDetail>> {
        let Some(m) = ChannelEntity::find_by_id(id).one(self.db()).await? else {
            return Ok(None);
        };

        let customer_ids: Vec<i64> = ChannelCustomerEntity::find()
            .filter(ChannelCustomerCol::ChannelId.eq(id))
            .all(self.db())
            .await?
            .into_iter()
            .map(|r| r.customer_id)
            .collect();
        let customers = if customer_ids.is_empty() {
            Vec::new()
        } else {
            CustomerEntity::find()
                .filter(CustomerCol::Id.is_in(customer_ids))
                .order_by(CustomerCol::Name, Order::Asc)
                .all(self.db())
                .await?
                .into_iter()
                .map(customer::model_to_customer)
                .collect()
        };

        let product_ids: Vec<i64> = ChannelProductEntity::find()
            .filter(ChannelProductCol::ChannelId.eq(id))
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

        let ch = model_to_channel(m);
        Ok(Some(ChannelDetail {
            id: ch.id,
            name: ch.name,
            channel_type: ch.channel_type,
            description: ch.description,
            contact_person: ch.contact_person,
            contact_phone: ch.contact_phone,
            contact_email: ch.contact_email,
            created_at: ch.created_at,
            updated_at: ch.updated_at,
            customers,
            products,
        }))
    }

    /// Insert a channel and its association rows in one transaction.
    pub async fn insert_channel(&self, new: &NewChannel) -> Result<i64> {
        let txn = self.db.begin().await?;
        let now = Utc::now().fixed_offset();
        let model = channel::ActiveModel {
            name: Set(new.name.clone()),
            channel_type: Set(new.channel_type.to_string()),
            description: Set(new.description.clone()),
            contact_person: Set(new.contact_person.clone()),
            contact_phone: Set(new.contact_phone.clone()),
            contact_email: Set(new.contact_email.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        associations::replace_channel_customers(&txn, model.id, &new.customer_ids).await?;
        associations::replace_channel_products(&txn, model.id, &new.product_ids).await?;
        txn.commit().await?;
        Ok(model.id)
    }

    /// Update a channel and fully replace its associations, atomically.
    pub async fn update_channel(&self, id: i64, new: &NewChannel) -> Result<Channel> {
        let txn = self.db.begin().await?;
        let Some(m) = ChannelEntity::find_by_id(id).one(&txn).await? else {
            return Err(StoreError::NotFound {
                entity: "channel",
                id,
            });
        };
        let now = Utc::now().fixed_offset();
        let mut am: channel::ActiveModel = m.into();
        am.name = Set(new.name.clone());
        am.channel_type = Set(new.channel_type.to_string());
        am.description = Set(new.description.clone());
        am.contact_person = Set(new.contact_person.clone());
        am.contact_phone = Set(new.contact_phone.clone());
        am.contact_email = Set(new.contact_email.clone());
        am.updated_at = Set(now);
        let updated = am.update(&txn).await?;
        associations::replace_channel_customers(&txn, id, &new.customer_ids).await?;
        associations::replace_channel_products(&txn, id, &new.product_ids).await?;
        txn.commit().await?;
        Ok(model_to_channel(updated))
    }

    /// Delete a channel and every association row naming it.
    pub async fn delete_channel(&self, id: i64) -> Result<()> {
        let txn = self.db.begin().await?;
        if ChannelEntity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(StoreError::NotFound {
                entity: "channel",
                id,
            });
        }
        ChannelCustomerEntity::delete_many()
            .filter(ChannelCustomerCol::ChannelId.eq(id))
            .exec(&txn)
            .await?;
        ChannelProductEntity::delete_many()
            .filter(ChannelProductCol::ChannelId.eq(id))
            .exec(&txn)
            .await?;
        ChannelEntity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn channel_exists(&self, id: i64) -> Result<bool> {
        Ok(ChannelEntity::find_by_id(id).one(self.db()).await?.is_some())
    }

    /// Channels offered for association pickers, ordered by name.
    pub async fn channel_options(&self) -> Result<Vec<ChannelOption>> {
        let rows = ChannelEntity::find()
            .order_by(ChannelCol::Name, Order::Asc)
            .all(self.db())
            .await?;
        Ok(rows
            .into_iter()
            .map(|m| ChannelOption {
                id: m.id,
                name: m.name,
                channel_type: m.channel_type.parse().unwrap_or(ChannelType::Other),
            })
            .collect())
    }

    pub async fn count_channels(&self) -> Result<u64> {
        Ok(ChannelEntity::find().count(self.db()).await?)
    }
}
