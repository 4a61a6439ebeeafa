//! Flat, ordered key-value records for external caches.
//!
//! Every core entity converts to a [`Record`] through [`ToRecord`]:
//!
//! - the first field is always `_type`, the entity's type name;
//! - unset optional fields are omitted;
//! - nested entities expand recursively into records;
//! - byte sequences become lowercase hex text, fixed-point values become
//!   exact decimal text, tagged choices become their wire value, and dates
//!   become ISO-8601 text;
//! - collections become ordered lists.
//!
//! Records serialize through serde as ordered maps, so JSON output keeps the
//! field order above. The conversion is one-way except for
//! [`LeanImprovement::from_record`].

use crate::commerce::{Consumer, Supplier, Tender};
use crate::fixed::{Fixed64, decimal_text};
use crate::graph::{ProcessGraph, Route, Workplace};
use crate::improvement::{Certification, LeanImprovement};
use crate::metrics::{
    CommercialMetrics, EngineeringMetrics, FactoryMetrics, ProcurementMetrics,
    ProductionMetrics, QualityMetrics, SimulationResults,
};
use crate::params::SimulationParameters;
use crate::resource::{Equipment, Logist, Worker};
use crate::schedule::{ProductionPlanRow, ProductionSchedule};
use crate::simulation::Simulation;
use crate::warehouse::Warehouse;
use chrono::NaiveDate;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Reserved key carrying the entity type name.
pub const TYPE_KEY: &str = "_type";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("expected a '{expected}' record, found '{found}'")]
    TypeMismatch { expected: &'static str, found: String },
    #[error("field '{field}' must be {expected}")]
    WrongFieldType { field: String, expected: &'static str },
    #[error("field '{field}' is not a decimal: '{value}'")]
    InvalidDecimal { field: String, value: String },
    #[error("json: {0}")]
    Json(String),
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Bool(bool),
    List(Vec<FieldValue>),
    Record(Record),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            FieldValue::Integer(v) => Some(v),
            FieldValue::Unsigned(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            FieldValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    fn from_json(value: serde_json::Value) -> Result<Self, RecordError> {
        use serde_json::Value;
        Ok(match value {
            Value::String(s) => FieldValue::Text(s),
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(v), _) => FieldValue::Integer(v),
                (None, Some(v)) => FieldValue::Unsigned(v),
                _ => return Err(RecordError::Json(format!("non-integer number {n}"))),
            },
            Value::Array(items) => FieldValue::List(
                items
                    .into_iter()
                    .map(FieldValue::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => {
                let mut record = Record::default();
                for (key, value) in map {
                    record.fields.push((key, FieldValue::from_json(value)?));
                }
                FieldValue::Record(record)
            }
            Value::Null => return Err(RecordError::Json("null values are never emitted".into())),
        })
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Integer(v) => serializer.serialize_i64(*v),
            FieldValue::Unsigned(v) => serializer.serialize_u64(*v),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FieldValue::Record(record) => record.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// An ordered key-value record. Built with the chaining helpers below, which
/// skip `None` values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// An empty record tagged with `type_name`.
    pub fn new(type_name: &str) -> Self {
        Self {
            fields: vec![(TYPE_KEY.to_string(), FieldValue::Text(type_name.to_string()))],
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.get(TYPE_KEY).and_then(FieldValue::as_text)
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append a raw field.
    pub fn field(mut self, key: &str, value: FieldValue) -> Self {
        self.fields.push((key.to_string(), value));
        self
    }

    pub fn text(self, key: &str, value: impl Into<String>) -> Self {
        self.field(key, FieldValue::Text(value.into()))
    }

    pub fn opt_text(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.text(key, v),
            None => self,
        }
    }

    pub fn int(self, key: &str, value: i64) -> Self {
        self.field(key, FieldValue::Integer(value))
    }

    pub fn opt_int(self, key: &str, value: Option<i64>) -> Self {
        match value {
            Some(v) => self.int(key, v),
            None => self,
        }
    }

    pub fn uint(self, key: &str, value: u64) -> Self {
        self.field(key, FieldValue::Unsigned(value))
    }

    pub fn boolean(self, key: &str, value: bool) -> Self {
        self.field(key, FieldValue::Bool(value))
    }

    /// Exact decimal text.
    pub fn decimal(self, key: &str, value: Fixed64) -> Self {
        self.text(key, decimal_text(value))
    }

    /// Lowercase hex text.
    pub fn bytes(self, key: &str, value: &[u8]) -> Self {
        self.text(key, hex::encode(value))
    }

    /// ISO-8601 date text, omitted when unset.
    pub fn date(self, key: &str, value: Option<NaiveDate>) -> Self {
        match value {
            Some(d) => self.text(key, d.format("%Y-%m-%d").to_string()),
            None => self,
        }
    }

    pub fn nested<T: ToRecord>(self, key: &str, value: Option<&T>) -> Self {
        match value {
            Some(v) => self.field(key, FieldValue::Record(v.to_record())),
            None => self,
        }
    }

    pub fn list<'a, T: ToRecord + 'a>(self, key: &str, items: impl IntoIterator<Item = &'a T>) -> Self {
        let items = items
            .into_iter()
            .map(|i| FieldValue::Record(i.to_record()))
            .collect();
        self.field(key, FieldValue::List(items))
    }

    pub fn text_list<S: AsRef<str>>(self, key: &str, items: impl IntoIterator<Item = S>) -> Self {
        let items = items
            .into_iter()
            .map(|s| FieldValue::Text(s.as_ref().to_string()))
            .collect();
        self.field(key, FieldValue::List(items))
    }

    pub fn to_json_string(&self) -> Result<String, RecordError> {
        serde_json::to_string(self).map_err(|e| RecordError::Json(e.to_string()))
    }

    /// Parse a JSON object back into a record. Key order follows the JSON
    /// map, which may not match the order the record was written in.
    pub fn from_json_str(json: &str) -> Result<Self, RecordError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| RecordError::Json(e.to_string()))?;
        match FieldValue::from_json(value)? {
            FieldValue::Record(record) => Ok(record),
            _ => Err(RecordError::Json("top-level value is not an object".into())),
        }
    }

    fn expect_type(&self, expected: &'static str) -> Result<(), RecordError> {
        match self.type_name() {
            Some(found) if found == expected => Ok(()),
            found => Err(RecordError::TypeMismatch {
                expected,
                found: found.unwrap_or_default().to_string(),
            }),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Conversion into a flat record.
pub trait ToRecord {
    const TYPE_NAME: &'static str;

    fn to_record(&self) -> Record;
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

impl ToRecord for Worker {
    const TYPE_NAME: &'static str = "Worker";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("worker_id", self.worker_id.as_str())
            .text("name", &self.name)
            .text("specialty", &self.specialty)
            .uint("qualification", u64::from(self.qualification))
            .int("salary", self.salary)
    }
}

impl ToRecord for Equipment {
    const TYPE_NAME: &'static str = "Equipment";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("equipment_id", self.equipment_id.as_str())
            .text("name", &self.name)
            .decimal("reliability", self.reliability)
            .uint("maintenance_period_days", u64::from(self.maintenance_period_days))
            .int("maintenance_cost", self.maintenance_cost)
            .int("purchase_cost", self.purchase_cost)
            .int("repair_cost", self.repair_cost)
            .uint("repair_time_days", u64::from(self.repair_time_days))
    }
}

impl ToRecord for Logist {
    const TYPE_NAME: &'static str = "Logist";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("logist_id", self.logist_id.as_str())
            .text("name", &self.name)
            .text("vehicle_type", &self.vehicle_type)
            .uint("vehicle_capacity", u64::from(self.vehicle_capacity))
            .int("salary", self.salary)
    }
}

// ---------------------------------------------------------------------------
// Warehouse
// ---------------------------------------------------------------------------

impl ToRecord for Warehouse {
    const TYPE_NAME: &'static str = "Warehouse";

    fn to_record(&self) -> Record {
        let entries = self
            .contents
            .iter()
            .map(|(material, quantity)| {
                FieldValue::Record(
                    Record::new("WarehouseEntry")
                        .text("material", material)
                        .uint("quantity", *quantity),
                )
            })
            .collect();
        Record::new(Self::TYPE_NAME)
            .uint("capacity", self.capacity)
            .uint("load", self.load())
            .field("contents", FieldValue::List(entries))
            .nested("inventory_worker", self.inventory_worker.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Process graph
// ---------------------------------------------------------------------------

impl ToRecord for Workplace {
    const TYPE_NAME: &'static str = "Workplace";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("workplace_id", self.workplace_id.as_str())
            .text("workplace_name", &self.workplace_name)
            .text("required_speciality", &self.required_speciality)
            .uint("required_qualification", u64::from(self.required_qualification))
            .nested("worker", self.worker.as_ref())
            .nested("equipment", self.equipment.as_ref())
            .text_list("required_stages", &self.required_stages)
            .boolean("is_start_node", self.is_start_node)
            .boolean("is_end_node", self.is_end_node)
            .text_list(
                "next_workplace_ids",
                self.next_workplace_ids.iter().map(|id| id.as_str()),
            )
            .opt_int("x", self.x.map(i64::from))
            .opt_int("y", self.y.map(i64::from))
    }
}

impl ToRecord for Route {
    const TYPE_NAME: &'static str = "Route";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("from_workplace", self.from_workplace.as_str())
            .text("to_workplace", self.to_workplace.as_str())
            .uint("length", u64::from(self.length))
            .uint("delivery_period", u64::from(self.delivery_period))
            .int("cost", self.cost)
    }
}

impl ToRecord for ProcessGraph {
    const TYPE_NAME: &'static str = "ProcessGraph";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("id", &self.id)
            .list("workplaces", self.workplaces())
            .list("routes", self.routes())
    }
}

// ---------------------------------------------------------------------------
// Commerce
// ---------------------------------------------------------------------------

impl ToRecord for Consumer {
    const TYPE_NAME: &'static str = "Consumer";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("consumer_id", self.consumer_id.as_str())
            .text("name", &self.name)
            .boolean("is_government", self.is_government)
    }
}

impl ToRecord for Tender {
    const TYPE_NAME: &'static str = "Tender";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("tender_id", self.tender_id.as_str())
            .text("name", &self.name)
            .nested("consumer", Some(&self.consumer))
            .int("cost", self.cost)
            .uint("quantity_of_products", self.quantity_of_products)
    }
}

impl ToRecord for Supplier {
    const TYPE_NAME: &'static str = "Supplier";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("supplier_id", self.supplier_id.as_str())
            .text("name", &self.name)
            .text("material_type", &self.material_type)
            .decimal("reliability", self.reliability)
            .decimal("product_quality", self.product_quality)
            .int("cost", self.cost)
            .int("delivery_cost", self.delivery_cost)
            .boolean("quality_inspection_enabled", self.quality_inspection_enabled)
            .uint("delivery_period_days", u64::from(self.delivery_period_days))
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

impl ToRecord for ProductionPlanRow {
    const TYPE_NAME: &'static str = "ProductionPlanRow";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("tender_id", self.tender_id.as_str())
            .text("product_name", &self.product_name)
            .uint("priority", u64::from(self.priority))
            .date("planned_start_date", self.planned_start_date)
            .date("planned_end_date", self.planned_end_date)
            .date("actual_start_date", self.actual_start_date)
            .date("actual_end_date", self.actual_end_date)
            .uint("planned_quantity", self.planned_quantity)
            .uint("actual_quantity", self.actual_quantity)
            .uint("remaining_to_produce", self.remaining_to_produce)
            .text("provisioning_status", self.provisioning_status.as_wire())
            .opt_text("note", self.note.as_deref())
    }
}

impl ToRecord for ProductionSchedule {
    const TYPE_NAME: &'static str = "ProductionSchedule";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME).list("rows", self.rows())
    }
}

// ---------------------------------------------------------------------------
// Improvements
// ---------------------------------------------------------------------------

impl ToRecord for Certification {
    const TYPE_NAME: &'static str = "Certification";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("certificate_type", &self.certificate_type)
            .boolean("is_obtained", self.is_obtained)
            .int("implementation_cost", self.implementation_cost)
            .uint("implementation_time_days", u64::from(self.implementation_time_days))
    }
}

impl ToRecord for LeanImprovement {
    const TYPE_NAME: &'static str = "LeanImprovement";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("improvement_id", self.improvement_id.as_str())
            .text("name", &self.name)
            .boolean("is_implemented", self.is_implemented)
            .int("implementation_cost", self.implementation_cost)
            .decimal("efficiency_gain", self.efficiency_gain)
    }
}

impl LeanImprovement {
    /// Rebuild an improvement from its record.
    ///
    /// An absent or empty id becomes the empty id; absent text, boolean, and
    /// numeric fields take their zero values. Present fields of the wrong
    /// shape are rejected.
    pub fn from_record(record: &Record) -> Result<Self, RecordError> {
        record.expect_type(Self::TYPE_NAME)?;

        let text = |field: &str| -> Result<String, RecordError> {
            match record.get(field) {
                None => Ok(String::new()),
                Some(v) => v.as_text().map(str::to_string).ok_or_else(|| {
                    RecordError::WrongFieldType {
                        field: field.to_string(),
                        expected: "text",
                    }
                }),
            }
        };

        let is_implemented = match record.get("is_implemented") {
            None => false,
            Some(v) => v.as_bool().ok_or_else(|| RecordError::WrongFieldType {
                field: "is_implemented".into(),
                expected: "a boolean",
            })?,
        };
        let implementation_cost = match record.get("implementation_cost") {
            None => 0,
            Some(v) => v.as_i64().ok_or_else(|| RecordError::WrongFieldType {
                field: "implementation_cost".into(),
                expected: "an integer",
            })?,
        };
        let gain_text = text("efficiency_gain")?;
        let efficiency_gain = if gain_text.is_empty() {
            Fixed64::ZERO
        } else {
            gain_text
                .parse::<Fixed64>()
                .map_err(|_| RecordError::InvalidDecimal {
                    field: "efficiency_gain".into(),
                    value: gain_text.clone(),
                })?
        };

        Ok(Self {
            improvement_id: text("improvement_id")?.into(),
            name: text("name")?,
            is_implemented,
            implementation_cost,
            efficiency_gain,
        })
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

impl ToRecord for SimulationParameters {
    const TYPE_NAME: &'static str = "SimulationParameters";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .uint("step", u64::from(self.step))
            .int("capital", self.capital)
            .nested("logist", self.logist.as_ref())
            .list("suppliers", self.suppliers())
            .list("backup_suppliers", self.backup_suppliers())
            .nested("materials_warehouse", Some(&self.materials_warehouse))
            .nested("products_warehouse", Some(&self.products_warehouse))
            .nested("process_graph", Some(self.process_graph()))
            .list("tenders", self.tenders())
            .nested("production_schedule", Some(self.production_schedule()))
            .list("certifications", self.certifications())
            .list("lean_improvements", self.lean_improvements())
            .list("production_improvements", self.production_improvements())
            .text("dealing_with_defects", self.dealing_with_defects.as_wire())
            .text("sales_strategy", self.sales_strategy.as_wire())
            .text("distribution_strategy", self.distribution_strategy.as_wire())
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

impl ToRecord for FactoryMetrics {
    const TYPE_NAME: &'static str = "FactoryMetrics";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .int("profit", self.profit)
            .int("cost", self.cost)
            .decimal("profitability", self.profitability)
            .decimal("on_time_delivery_rate", self.on_time_delivery_rate)
            .decimal("warehouse_utilization", self.warehouse_utilization)
            .int("total_capital", self.total_capital)
    }
}

impl ToRecord for ProductionMetrics {
    const TYPE_NAME: &'static str = "ProductionMetrics";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .uint("planned", self.planned)
            .uint("produced", self.produced)
            .uint("remaining", self.remaining)
            .uint("staffed_workplaces", u64::from(self.staffed_workplaces))
            .uint("total_workplaces", u64::from(self.total_workplaces))
            .decimal("throughput_rate", self.throughput_rate)
    }
}

impl ToRecord for QualityMetrics {
    const TYPE_NAME: &'static str = "QualityMetrics";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .decimal("defect_rate", self.defect_rate)
            .decimal("good_output_rate", self.good_output_rate)
            .uint("inspected_suppliers", u64::from(self.inspected_suppliers))
            .uint("certifications_obtained", u64::from(self.certifications_obtained))
    }
}

impl ToRecord for EngineeringMetrics {
    const TYPE_NAME: &'static str = "EngineeringMetrics";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .uint("equipment_count", u64::from(self.equipment_count))
            .decimal("average_reliability", self.average_reliability)
            .int("maintenance_cost", self.maintenance_cost)
            .decimal("downtime_rate", self.downtime_rate)
    }
}

impl ToRecord for CommercialMetrics {
    const TYPE_NAME: &'static str = "CommercialMetrics";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .int("revenue", self.revenue)
            .uint("tenders_accepted", u64::from(self.tenders_accepted))
            .text("sales_strategy", self.sales_strategy.as_wire())
            .text("distribution_strategy", self.distribution_strategy.as_wire())
            .decimal("market_share", self.market_share)
    }
}

impl ToRecord for ProcurementMetrics {
    const TYPE_NAME: &'static str = "ProcurementMetrics";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .uint("supplier_count", u64::from(self.supplier_count))
            .uint("backup_supplier_count", u64::from(self.backup_supplier_count))
            .int("procurement_cost", self.procurement_cost)
            .decimal("average_supplier_reliability", self.average_supplier_reliability)
            .uint(
                "average_delivery_period_days",
                u64::from(self.average_delivery_period_days),
            )
    }
}

impl ToRecord for SimulationResults {
    const TYPE_NAME: &'static str = "SimulationResults";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .uint("step", u64::from(self.step))
            .int("profit", self.profit)
            .int("cost", self.cost)
            .decimal("profitability", self.profitability)
            .bytes("parameters_fingerprint", &self.parameters_fingerprint)
            .nested("factory", self.factory.as_ref())
            .nested("production", self.production.as_ref())
            .nested("quality", self.quality.as_ref())
            .nested("engineering", self.engineering.as_ref())
            .nested("commercial", self.commercial.as_ref())
            .nested("procurement", self.procurement.as_ref())
    }
}

impl ToRecord for Simulation {
    const TYPE_NAME: &'static str = "Simulation";

    fn to_record(&self) -> Record {
        Record::new(Self::TYPE_NAME)
            .text("id", &self.id)
            .text("room_id", &self.room_id)
            .int("capital", self.capital())
            .boolean("is_completed", self.is_completed())
            .list("parameters", self.parameters())
            .list("results", self.results())
    }
}
