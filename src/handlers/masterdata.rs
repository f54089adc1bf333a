use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::entities::enums::ItemType;
use crate::errors::AppError;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct ComponentView {
    pub component_id: i64,
    pub component_name: String,
    pub component_type: ItemType,
    pub quantity: i32,
}

/// `GET /masterdata/products/{id}/modules` (§6). The response's canonical
/// field is `componentId`; `moduleId` is accepted as an alias wherever this
/// shape is later used as request input.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ComponentRef {
    #[serde(alias = "moduleId")]
    component_id: i64,
}

async fn product_modules(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Vec<ComponentView>>, AppError> {
    state.master_data.get_product(id).await?;

    let edges = state.orchestrator.bom.direct_children(ItemType::Product, id).await?;
    let mut views = Vec::with_capacity(edges.len());
    for edge in edges {
        let name = match edge.child_type {
            ItemType::Module => state.master_data.get_module(edge.child_id).await?.name,
            ItemType::Part => state.master_data.get_part(edge.child_id).await?.name,
            ItemType::Product => {
                return Err(AppError::Internal(format!("BOM edge from product {id} has a PRODUCT child")));
            }
        };
        views.push(ComponentView {
            component_id: edge.child_id,
            component_name: name,
            component_type: edge.child_type,
            quantity: edge.quantity,
        });
    }
    Ok(Json(views))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/masterdata/products/:id/modules", get(product_modules))
}
