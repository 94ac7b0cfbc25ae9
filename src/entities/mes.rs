//! MES entry - manufacturing execution system fields tracked per project

use serde::{Deserialize, Serialize};

/// MES workflow fields for a project.
///
/// A project carries at most one live entry; saving replaces the previous
/// one. Quantities are optional because the source systems leave them blank
/// until a work order is cut.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MesEntry {
    #[serde(default)]
    pub lot_id: String,

    /// SMT workflow name
    #[serde(default)]
    pub workflow_smt: String,

    /// Top-level-assembly workflow name
    #[serde(default)]
    pub workflow_tla: String,

    #[serde(default)]
    pub smt_work_order: String,

    #[serde(default)]
    pub tla_work_order: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_order_qty: Option<i64>,

    #[serde(default)]
    pub po_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_qty: Option<i64>,
}

impl MesEntry {
    /// True when every field is blank
    pub fn is_empty(&self) -> bool {
        self.lot_id.is_empty()
            && self.workflow_smt.is_empty()
            && self.workflow_tla.is_empty()
            && self.smt_work_order.is_empty()
            && self.tla_work_order.is_empty()
            && self.work_order_qty.is_none()
            && self.po_number.is_empty()
            && self.po_qty.is_none()
    }
}
