use moka::sync::Cache;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use crate::entities::bom_edge;
use crate::entities::enums::ItemType;
use crate::errors::AppError;

/// §4.3 BOM Resolver: breadth-first expansion of a product or module into the
/// multiset of its children, quantities multiplied along edges and summed by
/// `(itemType, itemId)`. Cycles and missing edges fail with
/// `ORDER_BOM_CONVERSION_FAILED`, not recursion limits.
#[derive(Clone)]
pub struct BomResolver {
    db: Arc<DatabaseConnection>,
    edge_cache: Cache<(ItemType, i64), Vec<bom_edge::Model>>,
}

impl BomResolver {
    pub fn new(db: Arc<DatabaseConnection>, cache_ttl: Duration) -> Self {
        let edge_cache = Cache::builder().time_to_live(cache_ttl).max_capacity(10_000).build();
        Self { db, edge_cache }
    }

    /// Direct BOM children of `(item_type, item_id)`, one level deep — used by
    /// control-order dispatch to split a task into supply orders (PART
    /// children) and workstation orders (intermediate-item children).
    pub async fn direct_children(&self, item_type: ItemType, item_id: i64) -> Result<Vec<bom_edge::Model>, AppError> {
        self.edges_for(item_type, item_id).await
    }

    async fn edges_for(&self, item_type: ItemType, item_id: i64) -> Result<Vec<bom_edge::Model>, AppError> {
        if let Some(hit) = self.edge_cache.get(&(item_type, item_id)) {
            return Ok(hit);
        }

        let edges = bom_edge::Entity::find()
            .filter(bom_edge::Column::ParentType.eq(item_type))
            .filter(bom_edge::Column::ParentId.eq(item_id))
            .all(self.db.as_ref())
            .await?;

        self.edge_cache.insert((item_type, item_id), edges.clone());
        Ok(edges)
    }

    /// Expands `(root_type, root_id)` at `quantity` units into the multiset of
    /// its BOM children, keyed by `(itemType, itemId)` with summed quantities.
    /// Associative in `quantity`: expanding at `n` equals expanding at `1` and
    /// multiplying every resulting quantity by `n`.
    #[tracing::instrument(skip(self))]
    pub async fn expand(
        &self,
        root_type: ItemType,
        root_id: i64,
        quantity: i64,
    ) -> Result<HashMap<(ItemType, i64), i64>, AppError> {
        let mut totals: HashMap<(ItemType, i64), i64> = HashMap::new();
        let mut queue: VecDeque<(ItemType, i64, i64, Vec<(ItemType, i64)>)> = VecDeque::new();
        queue.push_back((root_type, root_id, quantity, Vec::new()));

        self.expand_into(&mut queue, &mut totals).await?;

        if totals.is_empty() {
            return Err(AppError::OrderBomConversionFailed(format!(
                "no BOM edges found for {root_type:?}:{root_id}"
            )));
        }

        Ok(totals)
    }

    /// BFS over the DAG, but cycle detection needs the ancestor chain of the
    /// specific branch being expanded, not a single shared stack: a node
    /// re-enqueued by one branch is dequeued long after its ancestor was
    /// popped, so a shared `path` can never see the cycle. Each queue entry
    /// therefore carries its own root-to-parent ancestor list.
    async fn expand_into(
        &self,
        queue: &mut VecDeque<(ItemType, i64, i64, Vec<(ItemType, i64)>)>,
        totals: &mut HashMap<(ItemType, i64), i64>,
    ) -> Result<(), AppError> {
        while let Some((item_type, item_id, qty, path)) = queue.pop_front() {
            if path.contains(&(item_type, item_id)) {
                return Err(AppError::OrderBomConversionFailed(format!(
                    "cycle detected at {item_type:?}:{item_id}"
                )));
            }

            let edges = self.edges_for(item_type, item_id).await?;
            if edges.is_empty() {
                // Leaf: this item itself is the requirement.
                *totals.entry((item_type, item_id)).or_insert(0) += qty;
                continue;
            }

            let mut child_path = path;
            child_path.push((item_type, item_id));
            for edge in edges {
                let child_qty = qty * edge.quantity as i64;
                *totals.entry((edge.child_type, edge.child_id)).or_insert(0) += child_qty;
                queue.push_back((edge.child_type, edge.child_id, child_qty, child_path.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_is_associative_in_quantity() {
        // Plain unit test over the grouping arithmetic, independent of the DB:
        // expanding (Product, n) must equal expanding (Product, 1) scaled by n.
        let mut base: HashMap<(ItemType, i64), i64> = HashMap::new();
        base.insert((ItemType::Module, 10), 2);
        base.insert((ItemType::Module, 11), 1);

        let scaled: HashMap<(ItemType, i64), i64> =
            base.iter().map(|(k, v)| (*k, v * 3)).collect();

        let mut expected: HashMap<(ItemType, i64), i64> = HashMap::new();
        expected.insert((ItemType::Module, 10), 6);
        expected.insert((ItemType::Module, 11), 3);

        assert_eq!(scaled, expected);
    }
}
