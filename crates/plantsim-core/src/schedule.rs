use crate::commerce::{Tender, wire_enum};
use crate::error::{SimError, SimResult};
use crate::id::{TenderId, identity_keyed};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Whether the materials for a plan row have been secured.
    ProvisioningStatus default NotProvisioned {
        NotProvisioned => "NOT_PROVISIONED",
        PartiallyProvisioned => "PARTIALLY_PROVISIONED",
        Provisioned => "PROVISIONED",
    }
}

/// One production-plan line, tracking a single tender. Compared and hashed
/// by `tender_id` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionPlanRow {
    pub tender_id: TenderId,
    pub product_name: String,
    /// Lower numbers are produced first.
    pub priority: u32,
    pub planned_start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub planned_quantity: u64,
    pub actual_quantity: u64,
    pub remaining_to_produce: u64,
    pub provisioning_status: ProvisioningStatus,
    pub note: Option<String>,
}

identity_keyed!(ProductionPlanRow, tender_id);

impl ProductionPlanRow {
    pub fn new(tender_id: impl Into<TenderId>) -> Self {
        Self {
            tender_id: tender_id.into(),
            product_name: String::new(),
            priority: 0,
            planned_start_date: None,
            planned_end_date: None,
            actual_start_date: None,
            actual_end_date: None,
            planned_quantity: 0,
            actual_quantity: 0,
            remaining_to_produce: 0,
            provisioning_status: ProvisioningStatus::default(),
            note: None,
        }
    }

    /// The row a freshly accepted tender starts with: everything planned,
    /// nothing produced.
    pub fn for_tender(tender: &Tender) -> Self {
        Self {
            product_name: tender.name.clone(),
            planned_quantity: tender.quantity_of_products,
            remaining_to_produce: tender.quantity_of_products,
            ..Self::new(tender.tender_id.clone())
        }
    }

    /// Share of the planned quantity already produced, in [0, 1].
    pub fn completion(&self) -> crate::fixed::Fixed64 {
        let planned = i64::try_from(self.planned_quantity).unwrap_or(i64::MAX);
        let actual = i64::try_from(self.actual_quantity).unwrap_or(i64::MAX);
        crate::fixed::clamp_unit(crate::fixed::ratio(actual, planned))
    }
}

/// The production plan: at most one row per tender.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionSchedule {
    rows: Vec<ProductionPlanRow>,
}

impl ProductionSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[ProductionPlanRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, tender_id: &TenderId) -> Option<&ProductionPlanRow> {
        self.rows.iter().find(|r| &r.tender_id == tender_id)
    }

    pub fn contains(&self, tender_id: &TenderId) -> bool {
        self.row(tender_id).is_some()
    }

    pub fn tender_ids(&self) -> impl Iterator<Item = &TenderId> {
        self.rows.iter().map(|r| &r.tender_id)
    }

    /// Insert or replace the row for `row.tender_id`, keeping its position.
    pub fn set_row(&mut self, row: ProductionPlanRow) {
        match self.rows.iter_mut().find(|r| r.tender_id == row.tender_id) {
            Some(existing) => *existing = row,
            None => self.rows.push(row),
        }
    }

    /// Replace an existing row. Fails with `NotFound` if the tender has no
    /// row yet.
    pub fn update_row(&mut self, row: ProductionPlanRow) -> SimResult<()> {
        let existing = self
            .rows
            .iter_mut()
            .find(|r| r.tender_id == row.tender_id)
            .ok_or_else(|| SimError::not_found("production plan row", &row.tender_id))?;
        *existing = row;
        Ok(())
    }

    /// Remove a row. Absent rows are a silent no-op.
    pub fn remove_row(&mut self, tender_id: &TenderId) -> Option<ProductionPlanRow> {
        let index = self.rows.iter().position(|r| &r.tender_id == tender_id)?;
        Some(self.rows.remove(index))
    }

    pub fn total_planned(&self) -> u64 {
        self.rows
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.planned_quantity))
    }

    pub fn total_remaining(&self) -> u64 {
        self.rows
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.remaining_to_produce))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commerce::Consumer;
    use crate::error::ErrorKind;
    use crate::fixed::ratio;

    fn tid(s: &str) -> TenderId {
        TenderId::new(s)
    }

    #[test]
    fn row_for_tender_plans_everything() {
        let tender = Tender::new("t1", Consumer::new("c1", "City"), 1000, 40);
        let row = ProductionPlanRow::for_tender(&tender);
        assert_eq!(row.tender_id, tid("t1"));
        assert_eq!(row.planned_quantity, 40);
        assert_eq!(row.remaining_to_produce, 40);
        assert_eq!(row.actual_quantity, 0);
        assert_eq!(row.provisioning_status, ProvisioningStatus::NotProvisioned);
    }

    #[test]
    fn set_row_upserts_by_key() {
        let mut s = ProductionSchedule::new();
        s.set_row(ProductionPlanRow::new("t1"));
        s.set_row(ProductionPlanRow::new("t2"));
        let mut replacement = ProductionPlanRow::new("t1");
        replacement.priority = 5;
        s.set_row(replacement);

        assert_eq!(s.len(), 2);
        assert_eq!(s.rows()[0].tender_id, tid("t1"));
        assert_eq!(s.rows()[0].priority, 5);
    }

    #[test]
    fn update_row_requires_existing_key() {
        let mut s = ProductionSchedule::new();
        let err = s.update_row(ProductionPlanRow::new("t1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(s.is_empty());

        s.set_row(ProductionPlanRow::new("t1"));
        let mut row = ProductionPlanRow::new("t1");
        row.note = Some("rush".into());
        s.update_row(row).unwrap();
        assert_eq!(s.row(&tid("t1")).unwrap().note.as_deref(), Some("rush"));
    }

    #[test]
    fn remove_row_is_silent_for_absent_key() {
        let mut s = ProductionSchedule::new();
        s.set_row(ProductionPlanRow::new("t1"));
        assert!(s.remove_row(&tid("t9")).is_none());
        assert!(s.remove_row(&tid("t1")).is_some());
        assert!(!s.contains(&tid("t1")));
    }

    #[test]
    fn totals_sum_rows() {
        let mut s = ProductionSchedule::new();
        let mut a = ProductionPlanRow::new("t1");
        a.planned_quantity = 10;
        a.remaining_to_produce = 4;
        let mut b = ProductionPlanRow::new("t2");
        b.planned_quantity = 5;
        b.remaining_to_produce = 5;
        s.set_row(a);
        s.set_row(b);
        assert_eq!(s.total_planned(), 15);
        assert_eq!(s.total_remaining(), 9);
    }

    #[test]
    fn completion_ratio() {
        let mut row = ProductionPlanRow::new("t1");
        assert_eq!(row.completion(), crate::fixed::Fixed64::ZERO);
        row.planned_quantity = 8;
        row.actual_quantity = 2;
        assert_eq!(row.completion(), ratio(1, 4));
        row.actual_quantity = 20;
        assert_eq!(row.completion(), crate::fixed::Fixed64::ONE);
    }

    #[test]
    fn rows_compare_by_tender_only() {
        let mut a = ProductionPlanRow::new("t1");
        a.priority = 3;
        assert_eq!(a, ProductionPlanRow::new("t1"));
    }
}
