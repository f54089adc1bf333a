//! Pure decision logic for customer- and warehouse-order scenario selection.
//! No I/O: callers gather stock snapshots first and pass them in, so this
//! module is unit-testable without a database.

use crate::entities::enums::{CustomerOrderScenario, WarehouseOrderScenario};

/// One requested item and what's available for it at the relevant warehouse.
#[derive(Debug, Clone, Copy)]
pub struct StockAvailability {
    pub requested: i64,
    pub available: i64,
}

/// §4.2 customer-order scenario selection. The lot-size threshold check
/// precedes the stock check: `DIRECT_PRODUCTION` wins over
/// `WAREHOUSE_ORDER_NEEDED`/`DIRECT_FULFILLMENT` whenever the requested total
/// meets or exceeds the threshold, regardless of WS-7 stock.
pub fn select_customer_order_scenario(
    items: &[StockAvailability],
    lot_size_threshold: i64,
) -> CustomerOrderScenario {
    let total_requested: i64 = items.iter().map(|i| i.requested).sum();

    if total_requested >= lot_size_threshold {
        return CustomerOrderScenario::DirectProduction;
    }

    if items.iter().all(|i| i.available >= i.requested) {
        CustomerOrderScenario::DirectFulfillment
    } else {
        CustomerOrderScenario::WarehouseOrderNeeded
    }
}

/// §4.1 `confirmWarehouseOrder`: every module available at WS-8 ⇒ direct
/// fulfillment, otherwise a production campaign is required.
pub fn select_warehouse_order_scenario(items: &[StockAvailability]) -> WarehouseOrderScenario {
    if items.iter().all(|i| i.available >= i.requested) {
        WarehouseOrderScenario::DirectFulfillment
    } else {
        WarehouseOrderScenario::ProductionRequired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_wins_over_available_stock() {
        let items = [StockAvailability { requested: 5, available: 100 }];
        assert_eq!(select_customer_order_scenario(&items, 3), CustomerOrderScenario::DirectProduction);
    }

    #[test]
    fn direct_fulfillment_when_stock_covers_request() {
        let items = [StockAvailability { requested: 2, available: 50 }];
        assert_eq!(select_customer_order_scenario(&items, 3), CustomerOrderScenario::DirectFulfillment);
    }

    #[test]
    fn warehouse_order_needed_when_stock_insufficient() {
        let items = [StockAvailability { requested: 2, available: 0 }];
        assert_eq!(select_customer_order_scenario(&items, 3), CustomerOrderScenario::WarehouseOrderNeeded);
    }

    #[test]
    fn is_pure_and_deterministic() {
        let items = [StockAvailability { requested: 2, available: 1 }];
        let a = select_customer_order_scenario(&items, 3);
        let b = select_customer_order_scenario(&items, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn warehouse_scenario_requires_every_module_available() {
        let items = [
            StockAvailability { requested: 2, available: 2 },
            StockAvailability { requested: 2, available: 0 },
        ];
        assert_eq!(select_warehouse_order_scenario(&items), WarehouseOrderScenario::ProductionRequired);
    }
}
