use chrono::Utc;
use lichub_common::types::{AttachmentMeta, Product, ProductOption};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};

use crate::entities::channel_product::{
    Column as ChannelProductCol, Entity as ChannelProductEntity,
};
use crate::entities::customer_product::{
    Column as CustomerProductCol, Entity as CustomerProductEntity,
};
use crate::entities::product::{self, Column as ProductCol, Entity as ProductEntity};
use crate::error::{Result, StoreError};
use crate::store::EntityStore;

/// Product write payload. Attachment metadata travels separately
/// because only some writes carry a new file.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
}

pub(crate) fn model_to_product(m: product::Model) -> Product {
    Product {
        id: m.id,
        name: m.name,
        version: m.version,
        description: m.description,
        file_path: m.file_path,
        file_name: m.file_name,
        file_size: m.file_size,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl EntityStore {
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = ProductEntity::find()
            .order_by(ProductCol::CreatedAt, Order::Desc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(model_to_product).collect())
    }

    pub async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let model = ProductEntity::find_by_id(id).one(self.db()).await?;
        Ok(model.map(model_to_product))
    }

    pub async fn insert_product(
        &self,
        new: &NewProduct,
        attachment: Option<&AttachmentMeta>,
    ) -> Result<Product> {
        let now = Utc::now().fixed_offset();
        let am = product::ActiveModel {
            name: Set(new.name.clone()),
            version: Set(new.version.clone()),
            description: Set(new.description.clone()),
            file_path: Set(attachment.map(|a| a.file_path.clone())),
            file_name: Set(attachment.map(|a| a.file_name.clone())),
            file_size: Set(attachment.map(|a| a.file_size)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let model = am.insert(self.db()).await?;
        Ok(model_to_product(model))
    }

    /// Update a product's fields, replacing the recorded attachment
    /// metadata when a new file was uploaded. The previous file itself
    /// is removed by the caller only after this commit succeeds.
    pub async fn update_product(
        &self,
        id: i64,
        new: &NewProduct,
        attachment: Option<&AttachmentMeta>,
    ) -> Result<Product> {
        let Some(m) = ProductEntity::find_by_id(id).one(self.db()).await? else {
            return Err(StoreError::NotFound {
                entity: "product",
                id,
            });
        };
        let now = Utc::now().fixed_offset();
        let mut am: product::ActiveModel = m.into();
        am.name = Set(new.name.clone());
        am.version = Set(new.version.clone());
        am.description = Set(new.description.clone());
        if let Some(a) = attachment {
            am.file_path = Set(Some(a.file_path.clone()));
            am.file_name = Set(Some(a.file_name.clone()));
            am.file_size = Set(Some(a.file_size));
        }
        am.updated_at = Set(now);
        let updated = am.update(self.db()).await?;
        Ok(model_to_product(updated))
    }

    /// Delete a product and its association rows in one transaction.
    /// Returns the removed row so the caller can clean up its file.
    pub async fn delete_product(&self, id: i64) -> Result<Product> {
        let txn = self.db.begin().await?;
        let Some(m) = ProductEntity::find_by_id(id).one(&txn).await? else {
            return Err(StoreError::NotFound {
                entity: "product",
                id,
            });
        };
        ChannelProductEntity::delete_many()
            .filter(ChannelProductCol::ProductId.eq(id))
            .exec(&txn)
            .await?;
        CustomerProductEntity::delete_many()
            .filter(CustomerProductCol::ProductId.eq(id))
            .exec(&txn)
            .await?;
        ProductEntity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(model_to_product(m))
    }

    /// Products offered for association pickers, ordered by name.
    pub async fn product_options(&self) -> Result<Vec<ProductOption>> {
        let rows = ProductEntity::find()
            .order_by(ProductCol::Name, Order::Asc)
            .all(self.db())
            .await?;
        Ok(rows
            .into_iter()
            .map(|m| ProductOption {
                id: m.id,
                name: m.name,
                version: m.version,
            })
            .collect())
    }

    pub async fn count_products(&self) -> Result<u64> {
        Ok(ProductEntity::find().count(self.db()).await?)
    }
}
