//! Step results and the metrics-deriver collaborator.
//!
//! A [`MetricsDeriver`] turns one step's [`SimulationParameters`] into a
//! [`SimulationResults`]. The engine only checks that the returned `step`
//! matches the one requested; the formulas are the deriver's business.
//! [`HeuristicDeriver`] is the default: a seeded, deterministic model that
//! keeps every rate in [0, 1].

use crate::commerce::{DistributionStrategy, SalesStrategy};
use crate::fixed::{Fixed64, clamp_unit, mean, ratio, scale};
use crate::improvement::implemented_gain;
use crate::params::SimulationParameters;
use crate::rng::SimRng;
use crate::sim::Step;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Metric bundles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryMetrics {
    pub profit: i64,
    pub cost: i64,
    pub profitability: Fixed64,
    pub on_time_delivery_rate: Fixed64,
    /// Combined load over combined capacity of both warehouses.
    pub warehouse_utilization: Fixed64,
    /// Capital after this step's profit is booked.
    pub total_capital: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionMetrics {
    pub planned: u64,
    pub produced: u64,
    pub remaining: u64,
    pub staffed_workplaces: u32,
    pub total_workplaces: u32,
    pub throughput_rate: Fixed64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub defect_rate: Fixed64,
    pub good_output_rate: Fixed64,
    pub inspected_suppliers: u32,
    pub certifications_obtained: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineeringMetrics {
    pub equipment_count: u32,
    pub average_reliability: Fixed64,
    pub maintenance_cost: i64,
    pub downtime_rate: Fixed64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommercialMetrics {
    pub revenue: i64,
    pub tenders_accepted: u32,
    pub sales_strategy: SalesStrategy,
    pub distribution_strategy: DistributionStrategy,
    pub market_share: Fixed64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcurementMetrics {
    pub supplier_count: u32,
    pub backup_supplier_count: u32,
    pub procurement_cost: i64,
    pub average_supplier_reliability: Fixed64,
    pub average_delivery_period_days: u32,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The derived outcome of one completed step. Immutable once appended to a
/// simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub step: Step,
    pub profit: i64,
    pub cost: i64,
    pub profitability: Fixed64,
    /// Fingerprint of the parameters the results were derived from.
    pub parameters_fingerprint: Vec<u8>,
    pub factory: Option<FactoryMetrics>,
    pub production: Option<ProductionMetrics>,
    pub quality: Option<QualityMetrics>,
    pub engineering: Option<EngineeringMetrics>,
    pub commercial: Option<CommercialMetrics>,
    pub procurement: Option<ProcurementMetrics>,
}

impl SimulationResults {
    /// Results with zero totals and no bundles.
    pub fn empty(step: Step) -> Self {
        Self {
            step,
            profit: 0,
            cost: 0,
            profitability: Fixed64::ZERO,
            parameters_fingerprint: Vec::new(),
            factory: None,
            production: None,
            quality: None,
            engineering: None,
            commercial: None,
            procurement: None,
        }
    }

    pub fn has_all_bundles(&self) -> bool {
        self.factory.is_some()
            && self.production.is_some()
            && self.quality.is_some()
            && self.engineering.is_some()
            && self.commercial.is_some()
            && self.procurement.is_some()
    }
}

// ---------------------------------------------------------------------------
// Deriver
// ---------------------------------------------------------------------------

/// Derives the results of `step` from that step's configuration.
pub trait MetricsDeriver {
    fn derive(&mut self, parameters: &SimulationParameters, step: Step) -> SimulationResults;
}

impl<F> MetricsDeriver for F
where
    F: FnMut(&SimulationParameters, Step) -> SimulationResults,
{
    fn derive(&mut self, parameters: &SimulationParameters, step: Step) -> SimulationResults {
        self(parameters, step)
    }
}

/// Seeded deterministic deriver. Two derivers built from the same seed give
/// identical results for identical inputs.
#[derive(Debug, Clone)]
pub struct HeuristicDeriver {
    rng: SimRng,
}

/// Upper bound of the multiplicative noise applied to defect and market rates.
const NOISE_PERCENT: i64 = 5;

/// Tender count at which market share saturates before strategy factors.
const MARKET_SATURATION_TENDERS: i64 = 10;

impl HeuristicDeriver {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SimRng::new(seed),
        }
    }

    fn noise(&mut self) -> Fixed64 {
        self.rng.next_in(Fixed64::ZERO, ratio(NOISE_PERCENT, 100))
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn as_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl MetricsDeriver for HeuristicDeriver {
    fn derive(&mut self, p: &SimulationParameters, step: Step) -> SimulationResults {
        let graph = p.process_graph();

        // -- Procurement --
        let procurement_cost = p
            .suppliers()
            .iter()
            .fold(0i64, |acc, s| acc.saturating_add(s.step_cost()));
        let average_supplier_reliability = if p.suppliers().is_empty() {
            Fixed64::ZERO
        } else {
            clamp_unit(mean(p.suppliers().iter().map(|s| s.reliability)))
        };
        let average_delivery_period_days = if p.suppliers().is_empty() {
            0
        } else {
            let total: u64 = p
                .suppliers()
                .iter()
                .map(|s| u64::from(s.delivery_period_days))
                .sum();
            u32::try_from(total / p.suppliers().len() as u64).unwrap_or(u32::MAX)
        };

        // -- Engineering --
        let equipment_count = count(graph.equipment().count());
        let average_reliability = if equipment_count == 0 {
            Fixed64::ZERO
        } else {
            clamp_unit(mean(graph.equipment().map(|e| e.reliability)))
        };
        let maintenance_cost = graph
            .equipment()
            .fold(0i64, |acc, e| acc.saturating_add(e.maintenance_cost));
        let downtime_rate = if equipment_count == 0 {
            Fixed64::ZERO
        } else {
            Fixed64::ONE - average_reliability
        };

        // -- Staff & route costs --
        let salaries = graph
            .workers()
            .chain(p.materials_warehouse.inventory_worker.as_ref())
            .chain(p.products_warehouse.inventory_worker.as_ref())
            .fold(0i64, |acc, w| acc.saturating_add(w.salary))
            .saturating_add(p.logist.as_ref().map_or(0, |l| l.salary));
        let route_cost = graph
            .routes()
            .iter()
            .fold(0i64, |acc, r| acc.saturating_add(r.cost));

        // -- Production --
        let total_workplaces = count(graph.workplace_count());
        let staffed_workplaces = count(graph.workplaces().iter().filter(|w| w.is_staffed()).count());
        let staffing = ratio(i64::from(staffed_workplaces), i64::from(total_workplaces));
        let gain = implemented_gain(p.lean_improvements().iter().chain(p.production_improvements()));
        let reliability_factor = if equipment_count == 0 {
            Fixed64::ONE
        } else {
            average_reliability
        };
        let throughput_rate =
            clamp_unit(staffing.saturating_mul(reliability_factor).saturating_mul(Fixed64::ONE.saturating_add(gain)));
        let planned = p.production_schedule().total_planned();
        let produced = u64::try_from(scale(as_i64(planned), throughput_rate)).unwrap_or(0);
        let remaining = planned.saturating_sub(produced);

        // -- Quality --
        let supplier_quality = if p.suppliers().is_empty() {
            Fixed64::ONE
        } else {
            clamp_unit(mean(p.suppliers().iter().map(|s| s.product_quality)))
        };
        let inspected_suppliers = count(
            p.suppliers()
                .iter()
                .chain(p.backup_suppliers())
                .filter(|s| s.quality_inspection_enabled)
                .count(),
        );
        let certifications_obtained = count(p.certifications().iter().filter(|c| c.is_obtained).count());
        let inspection_relief = if inspected_suppliers > 0 {
            ratio(1, 2)
        } else {
            Fixed64::ONE
        };
        let defect_rate = clamp_unit(
            (Fixed64::ONE - supplier_quality).saturating_mul(inspection_relief) + self.noise(),
        );
        let good_output_rate = Fixed64::ONE - defect_rate;

        // -- Commercial --
        let contract_value = p
            .tenders()
            .iter()
            .fold(0i64, |acc, t| acc.saturating_add(t.cost));
        let delivered_share = if planned == 0 {
            Fixed64::ZERO
        } else {
            ratio(as_i64(produced), as_i64(planned))
        };
        let revenue = scale(
            contract_value,
            delivered_share
                .saturating_mul(good_output_rate)
                .saturating_mul(p.sales_strategy.revenue_factor()),
        );
        let tenders_accepted = count(p.tenders().len());
        let market_share = clamp_unit(
            ratio(i64::from(tenders_accepted), MARKET_SATURATION_TENDERS)
                .saturating_mul(p.sales_strategy.revenue_factor())
                .saturating_sub(self.noise()),
        );

        // -- Factory --
        let cost = procurement_cost
            .saturating_add(maintenance_cost)
            .saturating_add(salaries)
            .saturating_add(route_cost);
        let profit = revenue.saturating_sub(cost);
        let profitability = ratio(profit, cost);
        let logistics_factor = if p.logist.is_some() {
            Fixed64::ONE
        } else {
            ratio(1, 2)
        };
        let on_time_delivery_rate = if p.suppliers().is_empty() {
            Fixed64::ZERO
        } else {
            clamp_unit(average_supplier_reliability.saturating_mul(logistics_factor))
        };
        let load = p
            .materials_warehouse
            .load()
            .saturating_add(p.products_warehouse.load());
        let capacity = p
            .materials_warehouse
            .capacity
            .saturating_add(p.products_warehouse.capacity);
        let warehouse_utilization = clamp_unit(ratio(as_i64(load), as_i64(capacity)));

        SimulationResults {
            step,
            profit,
            cost,
            profitability,
            parameters_fingerprint: p.fingerprint().to_vec(),
            factory: Some(FactoryMetrics {
                profit,
                cost,
                profitability,
                on_time_delivery_rate,
                warehouse_utilization,
                total_capital: p.capital.saturating_add(profit),
            }),
            production: Some(ProductionMetrics {
                planned,
                produced,
                remaining,
                staffed_workplaces,
                total_workplaces,
                throughput_rate,
            }),
            quality: Some(QualityMetrics {
                defect_rate,
                good_output_rate,
                inspected_suppliers,
                certifications_obtained,
            }),
            engineering: Some(EngineeringMetrics {
                equipment_count,
                average_reliability,
                maintenance_cost,
                downtime_rate,
            }),
            commercial: Some(CommercialMetrics {
                revenue,
                tenders_accepted,
                sales_strategy: p.sales_strategy,
                distribution_strategy: p.distribution_strategy,
                market_share,
            }),
            procurement: Some(ProcurementMetrics {
                supplier_count: count(p.suppliers().len()),
                backup_supplier_count: count(p.backup_suppliers().len()),
                procurement_cost,
                average_supplier_reliability,
                average_delivery_period_days,
            }),
        }
    }
}
