//! Full-replace synchronization of the three association tables.
//!
//! An association list is a set: duplicates in the submitted ids are
//! dropped (first occurrence wins, input order preserved) and every
//! referenced id must resolve to an existing row, otherwise the caller's
//! transaction is aborted with a `MissingReference`. The UNIQUE pair
//! indexes in the schema back this up.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};

use crate::entities::channel::Entity as ChannelEntity;
use crate::entities::channel_customer::{
    self, Column as ChannelCustomerCol, Entity as ChannelCustomerEntity,
};
use crate::entities::channel_product::{
    self, Column as ChannelProductCol, Entity as ChannelProductEntity,
};
use crate::entities::customer::Entity as CustomerEntity;
use crate::entities::customer_product::{
    self, Column as CustomerProductCol, Entity as CustomerProductEntity,
};
use crate::entities::product::Entity as ProductEntity;
use crate::error::{Result, StoreError};

/// Drop duplicate ids, keeping the first occurrence in input order.
fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

pub(crate) async fn ensure_channel_exists<C: ConnectionTrait>(conn: &C, id: i64) -> Result<()> {
    if ChannelEntity::find_by_id(id).one(conn).await?.is_none() {
        return Err(StoreError::MissingReference {
            entity: "channel",
            id,
        });
    }
    Ok(())
}

pub(crate) async fn ensure_customer_exists<C: ConnectionTrait>(conn: &C, id: i64) -> Result<()> {
    if CustomerEntity::find_by_id(id).one(conn).await?.is_none() {
        return Err(StoreError::MissingReference {
            entity: "customer",
            id,
        });
    }
    Ok(())
}

pub(crate) async fn ensure_product_exists<C: ConnectionTrait>(conn: &C, id: i64) -> Result<()> {
    if ProductEntity::find_by_id(id).one(conn).await?.is_none() {
        return Err(StoreError::MissingReference {
            entity: "product",
            id,
        });
    }
    Ok(())
}

/// Replace a channel's customer associations with `customer_ids`.
pub(crate) async fn replace_channel_customers<C: ConnectionTrait>(
    conn: &C,
    channel_id: i64,
    customer_ids: &[i64],
) -> Result<()> {
    ChannelCustomerEntity::delete_many()
        .filter(ChannelCustomerCol::ChannelId.eq(channel_id))
        .exec(conn)
        .await?;
    let now = Utc::now().fixed_offset();
    for customer_id in dedup_ids(customer_ids) {
        ensure_customer_exists(conn, customer_id).await?;
        channel_customer::ActiveModel {
            channel_id: Set(channel_id),
            customer_id: Set(customer_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Replace a channel's product associations with `product_ids`.
pub(crate) async fn replace_channel_products<C: ConnectionTrait>(
    conn: &C,
    channel_id: i64,
    product_ids: &[i64],
) -> Result<()> {
    ChannelProductEntity::delete_many()
        .filter(ChannelProductCol::ChannelId.eq(channel_id))
        .exec(conn)
        .await?;
    let now = Utc::now().fixed_offset();
    for product_id in dedup_ids(product_ids) {
        ensure_product_exists(conn, product_id).await?;
        channel_product::ActiveModel {
            channel_id: Set(channel_id),
            product_id: Set(product_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Replace a customer's channel associations with `channel_ids`.
pub(crate) async fn replace_customer_channels<C: ConnectionTrait>(
    conn: &C,
    customer_id: i64,
    channel_ids: &[i64],
) -> Result<()> {
    ChannelCustomerEntity::delete_many()
        .filter(ChannelCustomerCol::CustomerId.eq(customer_id))
        .exec(conn)
        .await?;
    let now = Utc::now().fixed_offset();
    for channel_id in dedup_ids(channel_ids) {
        ensure_channel_exists(conn, channel_id).await?;
        channel_customer::ActiveModel {
            channel_id: Set(channel_id),
            customer_id: Set(customer_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Replace a customer's product associations with `product_ids`.
pub(crate) async fn replace_customer_products<C: ConnectionTrait>(
    conn: &C,
    customer_id: i64,
    product_ids: &[i64],
) -> Result<()> {
    CustomerProductEntity::delete_many()
        .filter(CustomerProductCol::CustomerId.eq(customer_id))
        .exec(conn)
        .await?;
    let now = Utc::now().fixed_offset();
    for product_id in dedup_ids(product_ids) {
        ensure_product_exists(conn, product_id).await?;
        customer_product::ActiveModel {
            customer_id: Set(customer_id),
            product_id: Set(product_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}
