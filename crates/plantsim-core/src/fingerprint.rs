//! Field-by-field feeding of entities into a [`StateHash`].
//!
//! Every impl destructures its type without `..`, so a field added later
//! fails to compile until it is hashed (or explicitly skipped) here.

use crate::commerce::{Consumer, Supplier, Tender};
use crate::fixed::Fixed64;
use crate::graph::{ProcessGraph, Route, Workplace};
use crate::id::WorkplaceId;
use crate::improvement::{Certification, LeanImprovement};
use crate::resource::{Equipment, Logist, Worker};
use crate::schedule::{ProductionPlanRow, ProductionSchedule};
use crate::sim::StateHash;
use crate::warehouse::Warehouse;
use chrono::{Datelike, NaiveDate};

/// A value that can be fed into a [`StateHash`].
pub trait Fingerprint {
    fn feed(&self, h: &mut StateHash);
}

impl Fingerprint for str {
    fn feed(&self, h: &mut StateHash) {
        h.write_str(self);
    }
}

impl Fingerprint for String {
    fn feed(&self, h: &mut StateHash) {
        h.write_str(self);
    }
}

impl Fingerprint for i64 {
    fn feed(&self, h: &mut StateHash) {
        h.write_i64(*self);
    }
}

impl Fingerprint for u64 {
    fn feed(&self, h: &mut StateHash) {
        h.write_u64(*self);
    }
}

impl Fingerprint for u32 {
    fn feed(&self, h: &mut StateHash) {
        h.write_u32(*self);
    }
}

impl Fingerprint for i32 {
    fn feed(&self, h: &mut StateHash) {
        h.write_i64(i64::from(*self));
    }
}

impl Fingerprint for bool {
    fn feed(&self, h: &mut StateHash) {
        h.write_bool(*self);
    }
}

impl Fingerprint for Fixed64 {
    fn feed(&self, h: &mut StateHash) {
        h.write_fixed64(*self);
    }
}

impl Fingerprint for NaiveDate {
    fn feed(&self, h: &mut StateHash) {
        h.write_i64(i64::from(self.num_days_from_ce()));
    }
}

impl Fingerprint for WorkplaceId {
    fn feed(&self, h: &mut StateHash) {
        h.write_str(self.as_str());
    }
}

impl<T: Fingerprint> Fingerprint for Option<T> {
    fn feed(&self, h: &mut StateHash) {
        match self {
            Some(v) => {
                h.write_bool(true);
                v.feed(h);
            }
            None => h.write_bool(false),
        }
    }
}

/// Lists are length-prefixed so neighbouring lists cannot alias.
impl<T: Fingerprint> Fingerprint for [T] {
    fn feed(&self, h: &mut StateHash) {
        h.write_u64(self.len() as u64);
        for v in self {
            v.feed(h);
        }
    }
}

impl<T: Fingerprint> Fingerprint for Vec<T> {
    fn feed(&self, h: &mut StateHash) {
        self.as_slice().feed(h);
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

impl Fingerprint for Worker {
    fn feed(&self, h: &mut StateHash) {
        let Worker {
            worker_id,
            name,
            specialty,
            qualification,
            salary,
        } = self;
        worker_id.as_str().feed(h);
        name.feed(h);
        specialty.feed(h);
        qualification.feed(h);
        salary.feed(h);
    }
}

impl Fingerprint for Equipment {
    fn feed(&self, h: &mut StateHash) {
        let Equipment {
            equipment_id,
            name,
            reliability,
            maintenance_period_days,
            maintenance_cost,
            purchase_cost,
            repair_cost,
            repair_time_days,
        } = self;
        equipment_id.as_str().feed(h);
        name.feed(h);
        reliability.feed(h);
        maintenance_period_days.feed(h);
        maintenance_cost.feed(h);
        purchase_cost.feed(h);
        repair_cost.feed(h);
        repair_time_days.feed(h);
    }
}

impl Fingerprint for Logist {
    fn feed(&self, h: &mut StateHash) {
        let Logist {
            logist_id,
            name,
            vehicle_type,
            vehicle_capacity,
            salary,
        } = self;
        logist_id.as_str().feed(h);
        name.feed(h);
        vehicle_type.feed(h);
        vehicle_capacity.feed(h);
        salary.feed(h);
    }
}

impl Fingerprint for Supplier {
    fn feed(&self, h: &mut StateHash) {
        let Supplier {
            supplier_id,
            name,
            material_type,
            reliability,
            product_quality,
            cost,
            delivery_cost,
            quality_inspection_enabled,
            delivery_period_days,
        } = self;
        supplier_id.as_str().feed(h);
        name.feed(h);
        material_type.feed(h);
        reliability.feed(h);
        product_quality.feed(h);
        cost.feed(h);
        delivery_cost.feed(h);
        quality_inspection_enabled.feed(h);
        delivery_period_days.feed(h);
    }
}

impl Fingerprint for Consumer {
    fn feed(&self, h: &mut StateHash) {
        let Consumer {
            consumer_id,
            name,
            is_government,
        } = self;
        consumer_id.as_str().feed(h);
        name.feed(h);
        is_government.feed(h);
    }
}

impl Fingerprint for Tender {
    fn feed(&self, h: &mut StateHash) {
        let Tender {
            tender_id,
            name,
            consumer,
            cost,
            quantity_of_products,
        } = self;
        tender_id.as_str().feed(h);
        name.feed(h);
        consumer.feed(h);
        cost.feed(h);
        quantity_of_products.feed(h);
    }
}

impl Fingerprint for Warehouse {
    fn feed(&self, h: &mut StateHash) {
        let Warehouse {
            capacity,
            contents,
            inventory_worker,
        } = self;
        capacity.feed(h);
        h.write_u64(contents.len() as u64);
        for (material, quantity) in contents {
            material.feed(h);
            quantity.feed(h);
        }
        inventory_worker.feed(h);
    }
}

impl Fingerprint for Workplace {
    fn feed(&self, h: &mut StateHash) {
        let Workplace {
            workplace_id,
            workplace_name,
            required_speciality,
            required_qualification,
            worker,
            equipment,
            required_stages,
            is_start_node,
            is_end_node,
            next_workplace_ids,
            x,
            y,
        } = self;
        workplace_id.feed(h);
        workplace_name.feed(h);
        required_speciality.feed(h);
        required_qualification.feed(h);
        worker.feed(h);
        equipment.feed(h);
        required_stages.feed(h);
        is_start_node.feed(h);
        is_end_node.feed(h);
        next_workplace_ids.feed(h);
        x.feed(h);
        y.feed(h);
    }
}

impl Fingerprint for Route {
    fn feed(&self, h: &mut StateHash) {
        let Route {
            from_workplace,
            to_workplace,
            length,
            delivery_period,
            cost,
        } = self;
        from_workplace.feed(h);
        to_workplace.feed(h);
        length.feed(h);
        delivery_period.feed(h);
        cost.feed(h);
    }
}

impl Fingerprint for ProcessGraph {
    fn feed(&self, h: &mut StateHash) {
        self.id.feed(h);
        self.workplaces().feed(h);
        self.routes().feed(h);
    }
}

impl Fingerprint for ProductionPlanRow {
    fn feed(&self, h: &mut StateHash) {
        let ProductionPlanRow {
            tender_id,
            product_name,
            priority,
            planned_start_date,
            planned_end_date,
            actual_start_date,
            actual_end_date,
            planned_quantity,
            actual_quantity,
            remaining_to_produce,
            provisioning_status,
            note,
        } = self;
        tender_id.as_str().feed(h);
        product_name.feed(h);
        priority.feed(h);
        planned_start_date.feed(h);
        planned_end_date.feed(h);
        actual_start_date.feed(h);
        actual_end_date.feed(h);
        planned_quantity.feed(h);
        actual_quantity.feed(h);
        remaining_to_produce.feed(h);
        provisioning_status.as_wire().feed(h);
        note.feed(h);
    }
}

impl Fingerprint for ProductionSchedule {
    fn feed(&self, h: &mut StateHash) {
        self.rows().feed(h);
    }
}

impl Fingerprint for Certification {
    fn feed(&self, h: &mut StateHash) {
        let Certification {
            certificate_type,
            is_obtained,
            implementation_cost,
            implementation_time_days,
        } = self;
        certificate_type.feed(h);
        is_obtained.feed(h);
        implementation_cost.feed(h);
        implementation_time_days.feed(h);
    }
}

impl Fingerprint for LeanImprovement {
    fn feed(&self, h: &mut StateHash) {
        let LeanImprovement {
            improvement_id,
            name,
            is_implemented,
            implementation_cost,
            efficiency_gain,
        } = self;
        improvement_id.as_str().feed(h);
        name.feed(h);
        is_implemented.feed(h);
        implementation_cost.feed(h);
        efficiency_gain.feed(h);
    }
}

/// Hash a single value from a fresh [`StateHash`].
pub fn fingerprint_of<T: Fingerprint + ?Sized>(value: &T) -> u64 {
    let mut h = StateHash::new();
    value.feed(&mut h);
    h.finish()
}
