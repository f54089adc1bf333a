use moka::sync::Cache;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;
use std::time::Duration;

use crate::entities::{module, part, product, workstation};
use crate::errors::AppError;

/// Read-mostly catalog of products, modules, parts and workstations (§4.3 /
/// Master Data in §2). Backed by a TTL'd `moka` cache since these rows change
/// rarely relative to order traffic.
#[derive(Clone)]
pub struct MasterDataService {
    db: Arc<DatabaseConnection>,
    product_cache: Cache<i64, product::Model>,
    module_cache: Cache<i64, module::Model>,
    part_cache: Cache<i64, part::Model>,
    workstation_cache: Cache<i32, workstation::Model>,
}

impl MasterDataService {
    pub fn new(db: Arc<DatabaseConnection>, cache_ttl: Duration) -> Self {
        let build = || Cache::builder().time_to_live(cache_ttl).max_capacity(10_000).build();
        Self {
            db,
            product_cache: build(),
            module_cache: build(),
            part_cache: build(),
            workstation_cache: build(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> Result<product::Model, AppError> {
        if let Some(hit) = self.product_cache.get(&id) {
            return Ok(hit);
        }
        let model = product::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::MasterDataNotFound(format!("product {id} not found")))?;
        self.product_cache.insert(id, model.clone());
        Ok(model)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_module(&self, id: i64) -> Result<module::Model, AppError> {
        if let Some(hit) = self.module_cache.get(&id) {
            return Ok(hit);
        }
        let model = module::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::MasterDataNotFound(format!("module {id} not found")))?;
        self.module_cache.insert(id, model.clone());
        Ok(model)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_part(&self, id: i64) -> Result<part::Model, AppError> {
        if let Some(hit) = self.part_cache.get(&id) {
            return Ok(hit);
        }
        let model = part::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::MasterDataNotFound(format!("part {id} not found")))?;
        self.part_cache.insert(id, model.clone());
        Ok(model)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_workstation(&self, id: i32) -> Result<workstation::Model, AppError> {
        if let Some(hit) = self.workstation_cache.get(&id) {
            return Ok(hit);
        }
        let model = workstation::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AppError::MasterDataNotFound(format!("workstation {id} not found")))?;
        self.workstation_cache.insert(id, model.clone());
        Ok(model)
    }

    /// All modules produced at manufacturing cells WS-1..3.
    pub async fn list_manufacturing_modules(&self) -> Result<Vec<module::Model>, AppError> {
        module::Entity::find()
            .filter(module::Column::ProductionWorkstationId.gte(1))
            .filter(module::Column::ProductionWorkstationId.lte(3))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }

    /// All modules produced at assembly cells WS-4..6.
    pub async fn list_assembly_modules(&self) -> Result<Vec<module::Model>, AppError> {
        module::Entity::find()
            .filter(module::Column::ProductionWorkstationId.gte(4))
            .filter(module::Column::ProductionWorkstationId.lte(6))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }
}
