//! The configuration aggregate for one simulation step.
//!
//! [`SimulationParameters`] owns everything a player can change during a
//! step: suppliers, warehouses, the process graph, tenders and their
//! production plan, certifications, improvements, strategies, and capital.
//! Every mutator validates before it writes, so a failed call leaves the
//! aggregate untouched.

use crate::commerce::{DealingWithDefects, DistributionStrategy, SalesStrategy, Supplier, Tender};
use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult, day_count};
use crate::fingerprint::Fingerprint;
use crate::graph::ProcessGraph;
use crate::id::{EquipmentId, ImprovementId, SupplierId, TenderId, WorkplaceId};
use crate::improvement::{Certification, LeanImprovement};
use crate::resource::{Equipment, Logist, Worker};
use crate::schedule::{ProductionPlanRow, ProductionSchedule};
use crate::sim::{FIRST_STEP, StateHash, Step};
use crate::warehouse::Warehouse;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Capital charged per unit of added warehouse capacity.
pub const WAREHOUSE_EXPANSION_COST_PER_UNIT: i64 = 100;

/// Capacity of each warehouse in a freshly constructed parameters set.
pub const DEFAULT_WAREHOUSE_CAPACITY: u64 = 1000;

/// Which of the two warehouses an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarehouseKind {
    Materials,
    Products,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub step: Step,
    pub capital: i64,
    pub logist: Option<Logist>,
    suppliers: Vec<Supplier>,
    backup_suppliers: Vec<Supplier>,
    pub materials_warehouse: Warehouse,
    pub products_warehouse: Warehouse,
    process_graph: ProcessGraph,
    tenders: Vec<Tender>,
    production_schedule: ProductionSchedule,
    certifications: Vec<Certification>,
    lean_improvements: Vec<LeanImprovement>,
    production_improvements: Vec<LeanImprovement>,
    pub dealing_with_defects: DealingWithDefects,
    pub sales_strategy: SalesStrategy,
    pub distribution_strategy: DistributionStrategy,
}

impl SimulationParameters {
    /// Step-1 parameters with the given capital and default-sized warehouses.
    pub fn new(capital: i64) -> Self {
        Self {
            step: FIRST_STEP,
            capital,
            logist: None,
            suppliers: Vec::new(),
            backup_suppliers: Vec::new(),
            materials_warehouse: Warehouse::new(DEFAULT_WAREHOUSE_CAPACITY),
            products_warehouse: Warehouse::new(DEFAULT_WAREHOUSE_CAPACITY),
            process_graph: ProcessGraph::default(),
            tenders: Vec::new(),
            production_schedule: ProductionSchedule::new(),
            certifications: Vec::new(),
            lean_improvements: Vec::new(),
            production_improvements: Vec::new(),
            dealing_with_defects: DealingWithDefects::default(),
            sales_strategy: SalesStrategy::default(),
            distribution_strategy: DistributionStrategy::default(),
        }
    }

    /// Step-1 parameters sized and funded from configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            materials_warehouse: Warehouse::new(config.materials_warehouse_capacity),
            products_warehouse: Warehouse::new(config.products_warehouse_capacity),
            dealing_with_defects: config.default_dealing_with_defects,
            sales_strategy: config.default_sales_strategy,
            distribution_strategy: config.default_distribution_strategy,
            ..Self::new(config.initial_capital)
        }
    }

    /// An independent copy carried forward into `step`.
    pub fn clone_for_step(&self, step: Step) -> Self {
        Self {
            step,
            ..self.clone()
        }
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn backup_suppliers(&self) -> &[Supplier] {
        &self.backup_suppliers
    }

    pub fn process_graph(&self) -> &ProcessGraph {
        &self.process_graph
    }

    /// Direct access for node, route, and flag operations on the graph.
    pub fn process_graph_mut(&mut self) -> &mut ProcessGraph {
        &mut self.process_graph
    }

    pub fn tenders(&self) -> &[Tender] {
        &self.tenders
    }

    pub fn tender(&self, tender_id: &TenderId) -> Option<&Tender> {
        self.tenders.iter().find(|t| &t.tender_id == tender_id)
    }

    pub fn production_schedule(&self) -> &ProductionSchedule {
        &self.production_schedule
    }

    pub fn certifications(&self) -> &[Certification] {
        &self.certifications
    }

    pub fn lean_improvements(&self) -> &[LeanImprovement] {
        &self.lean_improvements
    }

    pub fn production_improvements(&self) -> &[LeanImprovement] {
        &self.production_improvements
    }

    pub fn warehouse(&self, kind: WarehouseKind) -> &Warehouse {
        match kind {
            WarehouseKind::Materials => &self.materials_warehouse,
            WarehouseKind::Products => &self.products_warehouse,
        }
    }

    pub fn warehouse_mut(&mut self, kind: WarehouseKind) -> &mut Warehouse {
        match kind {
            WarehouseKind::Materials => &mut self.materials_warehouse,
            WarehouseKind::Products => &mut self.products_warehouse,
        }
    }

    // -----------------------------------------------------------------------
    // Logistics & suppliers
    // -----------------------------------------------------------------------

    pub fn set_logist(&mut self, logist: Option<Logist>) {
        self.logist = logist;
    }

    pub fn add_supplier(&mut self, supplier: Supplier) -> SimResult<()> {
        if self.suppliers.contains(&supplier) {
            return Err(SimError::duplicate("supplier", &supplier.supplier_id));
        }
        self.suppliers.push(supplier);
        Ok(())
    }

    /// Backup suppliers are a separate id space from primary suppliers.
    pub fn add_backup_supplier(&mut self, supplier: Supplier) -> SimResult<()> {
        if self.backup_suppliers.contains(&supplier) {
            return Err(SimError::duplicate("backup supplier", &supplier.supplier_id));
        }
        self.backup_suppliers.push(supplier);
        Ok(())
    }

    pub fn remove_supplier(&mut self, supplier_id: &SupplierId) -> Option<Supplier> {
        let index = self
            .suppliers
            .iter()
            .position(|s| &s.supplier_id == supplier_id)?;
        Some(self.suppliers.remove(index))
    }

    pub fn remove_backup_supplier(&mut self, supplier_id: &SupplierId) -> Option<Supplier> {
        let index = self
            .backup_suppliers
            .iter()
            .position(|s| &s.supplier_id == supplier_id)?;
        Some(self.backup_suppliers.remove(index))
    }

    /// Primary suppliers are searched before backup suppliers.
    fn any_supplier_mut(&mut self, supplier_id: &SupplierId) -> SimResult<&mut Supplier> {
        self.suppliers
            .iter_mut()
            .chain(self.backup_suppliers.iter_mut())
            .find(|s| &s.supplier_id == supplier_id)
            .ok_or_else(|| SimError::not_found("supplier", supplier_id))
    }

    pub fn set_quality_inspection(&mut self, supplier_id: &SupplierId, enabled: bool) -> SimResult<()> {
        self.any_supplier_mut(supplier_id)?.quality_inspection_enabled = enabled;
        Ok(())
    }

    /// Negative periods are rejected before any supplier lookup.
    pub fn set_delivery_period(&mut self, supplier_id: &SupplierId, days: i64) -> SimResult<()> {
        let days = day_count(days, "delivery period")?;
        self.any_supplier_mut(supplier_id)?.delivery_period_days = days;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Warehouses
    // -----------------------------------------------------------------------

    pub fn increase_material_warehouse_size(&mut self, amount: i64) -> SimResult<()> {
        self.expand_warehouse(WarehouseKind::Materials, amount)
    }

    pub fn increase_product_warehouse_size(&mut self, amount: i64) -> SimResult<()> {
        self.expand_warehouse(WarehouseKind::Products, amount)
    }

    /// Buy `amount` units of capacity at [`WAREHOUSE_EXPANSION_COST_PER_UNIT`].
    fn expand_warehouse(&mut self, kind: WarehouseKind, amount: i64) -> SimResult<()> {
        if amount <= 0 {
            return Err(SimError::InvalidArgument(format!(
                "warehouse expansion must be > 0, got {amount}"
            )));
        }
        let cost = amount
            .checked_mul(WAREHOUSE_EXPANSION_COST_PER_UNIT)
            .ok_or(SimError::InsufficientFunds {
                required: i64::MAX,
                available: self.capital,
            })?;
        if self.capital < cost {
            return Err(SimError::InsufficientFunds {
                required: cost,
                available: self.capital,
            });
        }
        self.capital -= cost;
        self.warehouse_mut(kind).increase_size(amount as u64);
        debug!(step = self.step, ?kind, amount, cost, capital = self.capital, "warehouse expanded");
        Ok(())
    }

    pub fn set_warehouse_worker(&mut self, kind: WarehouseKind, worker: Option<Worker>) {
        self.warehouse_mut(kind).set_inventory_worker(worker);
    }

    pub fn add_material(&mut self, kind: WarehouseKind, material: &str, quantity: i64) -> SimResult<()> {
        self.warehouse_mut(kind).add_material(material, quantity)
    }

    pub fn remove_material(&mut self, kind: WarehouseKind, material: &str, quantity: i64) -> SimResult<()> {
        self.warehouse_mut(kind).remove_material(material, quantity)
    }

    // -----------------------------------------------------------------------
    // Process graph
    // -----------------------------------------------------------------------

    /// Restricted merge of an edited graph; see [`ProcessGraph::merge_layout`].
    /// Rejects the whole change if `graph` names any unknown workplace.
    pub fn set_process_graph(&mut self, graph: &ProcessGraph) -> SimResult<()> {
        self.process_graph.merge_layout(graph).inspect_err(|err| {
            debug!(step = self.step, %err, "process graph merge rejected");
        })
    }

    pub fn set_worker_on_workplace(&mut self, workplace_id: &WorkplaceId, worker: Worker) -> bool {
        self.process_graph.set_worker_on_workplace(workplace_id, worker)
    }

    pub fn unset_worker_on_workplace(&mut self, workplace_id: &WorkplaceId) -> Option<Worker> {
        self.process_graph.unset_worker_on_workplace(workplace_id)
    }

    pub fn set_equipment_on_workplace(&mut self, workplace_id: &WorkplaceId, equipment: Equipment) -> bool {
        self.process_graph.set_equipment_on_workplace(workplace_id, equipment)
    }

    pub fn unset_equipment_on_workplace(&mut self, workplace_id: &WorkplaceId) -> Option<Equipment> {
        self.process_graph.unset_equipment_on_workplace(workplace_id)
    }

    /// Equipment is located through the workplaces of the process graph.
    pub fn set_equipment_maintenance_interval(
        &mut self,
        equipment_id: &EquipmentId,
        days: i64,
    ) -> SimResult<()> {
        let days = day_count(days, "maintenance interval")?;
        let equipment = self
            .process_graph
            .equipment_mut(equipment_id)
            .ok_or_else(|| SimError::not_found("equipment", equipment_id))?;
        equipment.maintenance_period_days = days;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tenders & production schedule
    // -----------------------------------------------------------------------

    /// Accept a tender and create its production plan row. This is the only
    /// way rows are created, which keeps tenders and rows in lockstep.
    pub fn add_tender(&mut self, tender: Tender) -> SimResult<()> {
        if self.tenders.contains(&tender) {
            return Err(SimError::duplicate("tender", &tender.tender_id));
        }
        self.production_schedule
            .set_row(ProductionPlanRow::for_tender(&tender));
        self.tenders.push(tender);
        Ok(())
    }

    /// Drop a tender and its plan row. Absent tenders are a silent no-op.
    pub fn remove_tender(&mut self, tender_id: &TenderId) -> Option<Tender> {
        self.production_schedule.remove_row(tender_id);
        let index = self.tenders.iter().position(|t| &t.tender_id == tender_id)?;
        Some(self.tenders.remove(index))
    }

    /// Update an existing plan row. Rows are created by [`Self::add_tender`].
    pub fn set_production_plan_row(&mut self, row: ProductionPlanRow) -> SimResult<()> {
        self.production_schedule.update_row(row)
    }

    // -----------------------------------------------------------------------
    // Certifications & improvements
    // -----------------------------------------------------------------------

    pub fn add_certification(&mut self, certification: Certification) -> SimResult<()> {
        if self.certifications.contains(&certification) {
            return Err(SimError::duplicate(
                "certification",
                &certification.certificate_type,
            ));
        }
        self.certifications.push(certification);
        Ok(())
    }

    pub fn set_certification_obtained(&mut self, certificate_type: &str, obtained: bool) -> SimResult<()> {
        let certification = self
            .certifications
            .iter_mut()
            .find(|c| c.certificate_type == certificate_type)
            .ok_or_else(|| SimError::not_found("certification", certificate_type))?;
        certification.is_obtained = obtained;
        Ok(())
    }

    pub fn add_lean_improvement(&mut self, improvement: LeanImprovement) -> SimResult<()> {
        if self
            .lean_improvements
            .iter()
            .any(|i| i.improvement_id == improvement.improvement_id)
        {
            return Err(SimError::duplicate(
                "lean improvement",
                &improvement.improvement_id,
            ));
        }
        self.lean_improvements.push(improvement);
        Ok(())
    }

    pub fn set_lean_improvement_implemented(
        &mut self,
        improvement_id: &ImprovementId,
        implemented: bool,
    ) -> SimResult<()> {
        let improvement = self
            .lean_improvements
            .iter_mut()
            .find(|i| &i.improvement_id == improvement_id)
            .ok_or_else(|| SimError::not_found("lean improvement", improvement_id))?;
        improvement.is_implemented = implemented;
        Ok(())
    }

    /// Register a production improvement option. Fails on a duplicate id.
    pub fn add_production_improvement_option(&mut self, improvement: LeanImprovement) -> SimResult<()> {
        if self.find_product_improvement_by_id(&improvement.improvement_id).is_some() {
            return Err(SimError::duplicate(
                "production improvement",
                &improvement.improvement_id,
            ));
        }
        self.production_improvements.push(improvement);
        Ok(())
    }

    pub fn find_product_improvement_by_id(&self, improvement_id: &ImprovementId) -> Option<&LeanImprovement> {
        self.production_improvements
            .iter()
            .find(|i| &i.improvement_id == improvement_id)
    }

    pub fn find_product_improvement_by_name(&self, name: &str) -> Option<&LeanImprovement> {
        self.production_improvements.iter().find(|i| i.name == name)
    }

    /// Position of a production improvement matched by id first, then name.
    fn product_improvement_index(&self, key: &str) -> SimResult<usize> {
        self.production_improvements
            .iter()
            .position(|i| i.improvement_id.as_str() == key)
            .or_else(|| self.production_improvements.iter().position(|i| i.name == key))
            .ok_or_else(|| SimError::not_found("production improvement", key))
    }

    /// Mark a production improvement implemented. `key` is tried as an id
    /// first, then as a display name.
    pub fn add_product_improvement(&mut self, key: &str) -> SimResult<()> {
        let index = self.product_improvement_index(key)?;
        self.production_improvements[index].is_implemented = true;
        Ok(())
    }

    /// Mark a production improvement not implemented. `key` is tried as an
    /// id first, then as a display name.
    pub fn remove_product_improvement(&mut self, key: &str) -> SimResult<()> {
        let index = self.product_improvement_index(key)?;
        self.production_improvements[index].is_implemented = false;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Strategies
    // -----------------------------------------------------------------------

    pub fn set_sales_strategy(&mut self, tag: &str) -> SimResult<()> {
        self.sales_strategy = tag.parse()?;
        Ok(())
    }

    pub fn set_dealing_with_defects(&mut self, tag: &str) -> SimResult<()> {
        self.dealing_with_defects = tag.parse()?;
        Ok(())
    }

    pub fn set_distribution_strategy(&mut self, tag: &str) -> SimResult<()> {
        self.distribution_strategy = tag.parse()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Fingerprint
    // -----------------------------------------------------------------------

    /// FNV-1a fingerprint of every configuration field. Identical
    /// configurations hash identically regardless of step.
    pub fn fingerprint(&self) -> [u8; 8] {
        let mut h = StateHash::new();
        self.feed(&mut h);
        h.finish_bytes()
    }
}

impl Fingerprint for SimulationParameters {
    fn feed(&self, h: &mut StateHash) {
        let Self {
            step: _,
            capital,
            logist,
            suppliers,
            backup_suppliers,
            materials_warehouse,
            products_warehouse,
            process_graph,
            tenders,
            production_schedule,
            certifications,
            lean_improvements,
            production_improvements,
            dealing_with_defects,
            sales_strategy,
            distribution_strategy,
        } = self;
        capital.feed(h);
        logist.feed(h);
        suppliers.feed(h);
        backup_suppliers.feed(h);
        materials_warehouse.feed(h);
        products_warehouse.feed(h);
        process_graph.feed(h);
        tenders.feed(h);
        production_schedule.feed(h);
        certifications.feed(h);
        lean_improvements.feed(h);
        production_improvements.feed(h);
        dealing_with_defects.as_wire().feed(h);
        sales_strategy.as_wire().feed(h);
        distribution_strategy.as_wire().feed(h);
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}
