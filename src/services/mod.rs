//! Service layer: one module per concern from §4, wired together by
//! `OrderOrchestrator` and exposed to handlers via `AppState`.

pub mod bom_resolver;
pub mod inventory_ledger;
pub mod master_data;
pub mod orchestrator;
pub mod scenario_selector;
pub mod scheduler_adapter;
