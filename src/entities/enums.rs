use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Disjoint item categories tracked across stock, BOM edges and order items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ItemType {
    #[sea_orm(string_value = "PRODUCT")]
    Product,
    #[sea_orm(string_value = "MODULE")]
    Module,
    #[sea_orm(string_value = "PART")]
    Part,
}

/// Warehouse, manufacturing or assembly role of a workstation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum WorkstationRole {
    #[sea_orm(string_value = "WAREHOUSE")]
    Warehouse,
    #[sea_orm(string_value = "MANUFACTURING")]
    Manufacturing,
    #[sea_orm(string_value = "ASSEMBLY")]
    Assembly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum Priority {
    #[sea_orm(string_value = "LOW")]
    Low,
    #[sea_orm(string_value = "NORMAL")]
    Normal,
    #[sea_orm(string_value = "HIGH")]
    High,
    #[sea_orm(string_value = "URGENT")]
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// Reason code attached to every inventory ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AdjustReason {
    #[sea_orm(string_value = "FULFILLMENT")]
    Fulfillment,
    #[sea_orm(string_value = "PRODUCTION")]
    Production,
    #[sea_orm(string_value = "CONSUMPTION")]
    Consumption,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
    #[sea_orm(string_value = "RETURN")]
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
pub enum CustomerOrderStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
pub enum CustomerOrderScenario {
    #[sea_orm(string_value = "DIRECT_FULFILLMENT")]
    DirectFulfillment,
    #[sea_orm(string_value = "WAREHOUSE_ORDER_NEEDED")]
    WarehouseOrderNeeded,
    #[sea_orm(string_value = "DIRECT_PRODUCTION")]
    DirectProduction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum WarehouseOrderStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "PROCESSING")]
    Processing,
    #[sea_orm(string_value = "FULFILLED")]
    Fulfilled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
pub enum WarehouseOrderScenario {
    #[sea_orm(string_value = "DIRECT_FULFILLMENT")]
    DirectFulfillment,
    #[sea_orm(string_value = "PRODUCTION_REQUIRED")]
    ProductionRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ProductionOrderStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "SCHEDULED")]
    Scheduled,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

/// Distinguishes a ProductionControlOrder (PCO) from an AssemblyControlOrder (ACO).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
pub enum ControlOrderKind {
    #[sea_orm(string_value = "PRODUCTION_CONTROL")]
    ProductionControl,
    #[sea_orm(string_value = "ASSEMBLY_CONTROL")]
    AssemblyControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ControlOrderStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "ASSIGNED")]
    Assigned,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum SupplyOrderStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "FULFILLED")]
    Fulfilled,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// The five workstation-order kinds that are leaves of a control order
/// (final assembly is modeled as its own `FinalAssemblyOrder` entity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
pub enum WorkstationOrderKind {
    #[sea_orm(string_value = "INJECTION_MOLDING")]
    InjectionMolding,
    #[sea_orm(string_value = "PARTS_PRE_PRODUCTION")]
    PartsPreProduction,
    #[sea_orm(string_value = "PART_FINISHING")]
    PartFinishing,
    #[sea_orm(string_value = "GEAR_ASSEMBLY")]
    GearAssembly,
    #[sea_orm(string_value = "MOTOR_ASSEMBLY")]
    MotorAssembly,
}

impl WorkstationOrderKind {
    /// Manufacturing-cell kinds skip `COMPLETED_ASSEMBLY` on their way to `COMPLETED`.
    pub fn is_manufacturing(&self) -> bool {
        matches!(self, WorkstationOrderKind::InjectionMolding | WorkstationOrderKind::PartsPreProduction | WorkstationOrderKind::PartFinishing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
pub enum WorkstationOrderStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "COMPLETED_ASSEMBLY")]
    CompletedAssembly,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum FinalAssemblyParentType {
    #[sea_orm(string_value = "WAREHOUSE_ORDER")]
    WarehouseOrder,
    #[sea_orm(string_value = "PRODUCTION_ORDER")]
    ProductionOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    #[sea_orm(string_value = "WAREHOUSE_OPERATOR")]
    WarehouseOperator,
    #[sea_orm(string_value = "MANUFACTURING_OPERATOR")]
    ManufacturingOperator,
    #[sea_orm(string_value = "ASSEMBLY_OPERATOR")]
    AssemblyOperator,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}
