//! The simulation aggregate and its step-advance state machine.
//!
//! A [`Simulation`] keeps the full history of one training session: one
//! [`SimulationParameters`] snapshot per step and one [`SimulationResults`]
//! per completed step. Two counters move independently:
//!
//! - the *result step* counts completed advances, and
//! - the *parameter step* counts configuration snapshots.
//!
//! Each advance derives results for the next result step from the latest
//! parameters, then clones those parameters forward unless the step ceiling
//! has been reached. Results are never recomputed once produced.

use crate::error::{SimError, SimResult};
use crate::metrics::{MetricsDeriver, SimulationResults};
use crate::params::SimulationParameters;
use crate::sim::{AdvanceResult, FIRST_STEP, MAX_STEPS, Step};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub id: String,
    pub room_id: String,
    capital: i64,
    is_completed: bool,
    parameters: Vec<SimulationParameters>,
    results: Vec<SimulationResults>,
}

impl Simulation {
    /// Start a session with `initial` as its step-1 configuration. The step
    /// of `initial` is forced to 1.
    pub fn new(room_id: impl Into<String>, initial: SimulationParameters) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), room_id, initial)
    }

    pub fn with_id(
        id: impl Into<String>,
        room_id: impl Into<String>,
        mut initial: SimulationParameters,
    ) -> Self {
        initial.step = FIRST_STEP;
        Self {
            id: id.into(),
            room_id: room_id.into(),
            capital: initial.capital,
            is_completed: false,
            parameters: vec![initial],
            results: Vec::new(),
        }
    }

    /// Rebuild a session from stored history.
    ///
    /// Parameter steps must be unique and within `1..=MAX_STEPS`. Result
    /// steps must be unique and no later than the latest parameters step,
    /// and there may be no more results than parameters. An empty history
    /// is accepted, though such a session cannot advance.
    pub fn from_history(
        id: impl Into<String>,
        room_id: impl Into<String>,
        parameters: Vec<SimulationParameters>,
        results: Vec<SimulationResults>,
    ) -> SimResult<Self> {
        let mut seen = HashSet::new();
        for p in &parameters {
            if !(FIRST_STEP..=MAX_STEPS).contains(&p.step) {
                return Err(SimError::InvalidArgument(format!(
                    "parameters step {} is outside 1..={MAX_STEPS}",
                    p.step
                )));
            }
            if !seen.insert(p.step) {
                return Err(SimError::duplicate("parameters step", p.step));
            }
        }
        if results.len() > parameters.len() {
            return Err(SimError::InvalidArgument(format!(
                "{} results stored for {} parameters snapshots",
                results.len(),
                parameters.len()
            )));
        }
        let latest = parameters.iter().map(|p| p.step).max().unwrap_or(0);
        let mut seen = HashSet::new();
        for r in &results {
            if r.step > latest {
                return Err(SimError::InvalidArgument(format!(
                    "results step {} has no parameters (latest parameters step is {latest})",
                    r.step
                )));
            }
            if !seen.insert(r.step) {
                return Err(SimError::duplicate("results step", r.step));
            }
        }

        let mut simulation = Self {
            id: id.into(),
            room_id: room_id.into(),
            capital: 0,
            is_completed: results.iter().any(|r| r.step >= MAX_STEPS),
            parameters,
            results,
        };
        simulation.capital = simulation.current_parameters().map_or(0, |p| p.capital);
        Ok(simulation)
    }

    // -----------------------------------------------------------------------
    // History access
    // -----------------------------------------------------------------------

    pub fn parameters(&self) -> &[SimulationParameters] {
        &self.parameters
    }

    pub fn results(&self) -> &[SimulationResults] {
        &self.results
    }

    /// Capital of the latest parameters as of the last successful advance.
    pub fn capital(&self) -> i64 {
        self.capital
    }

    /// True once results for the final step exist.
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// The parameters with the highest step: the ones callers edit.
    pub fn current_parameters(&self) -> Option<&SimulationParameters> {
        self.parameters.iter().max_by_key(|p| p.step)
    }

    pub fn current_parameters_mut(&mut self) -> Option<&mut SimulationParameters> {
        self.parameters.iter_mut().max_by_key(|p| p.step)
    }

    pub fn parameters_for_step(&self, step: Step) -> Option<&SimulationParameters> {
        self.parameters.iter().find(|p| p.step == step)
    }

    /// Number of results with a positive step.
    pub fn completed_steps(&self) -> Step {
        let n = self.results.iter().filter(|r| r.step > 0).count();
        Step::try_from(n).unwrap_or(Step::MAX)
    }

    /// Seed a parameters snapshot ahead of the results track.
    pub fn push_parameters(&mut self, parameters: SimulationParameters) -> SimResult<()> {
        if !(FIRST_STEP..=MAX_STEPS).contains(&parameters.step) {
            return Err(SimError::InvalidArgument(format!(
                "parameters step {} is outside 1..={MAX_STEPS}",
                parameters.step
            )));
        }
        if self.parameters_for_step(parameters.step).is_some() {
            return Err(SimError::duplicate("parameters step", parameters.step));
        }
        debug!(simulation = %self.id, step = parameters.step, "parameters seeded");
        self.parameters.push(parameters);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Step advance
    // -----------------------------------------------------------------------

    /// Derive results for the next step and clone the latest parameters
    /// forward.
    ///
    /// Fails with `InvalidState` if there are no parameters or the deriver
    /// returns results for a different step, and with `StepLimitReached`
    /// once results for the final step exist. If results for the next step
    /// already exist the call succeeds without changing anything.
    pub fn advance_step<D: MetricsDeriver + ?Sized>(
        &mut self,
        deriver: &mut D,
    ) -> SimResult<AdvanceResult> {
        let Some(selected) = self.current_parameters() else {
            return Err(SimError::InvalidState(
                "simulation has no parameters to advance from".into(),
            ));
        };

        if self
            .results
            .iter()
            .map(|r| r.step)
            .max()
            .is_some_and(|step| step >= MAX_STEPS)
        {
            return Err(SimError::StepLimitReached { limit: MAX_STEPS });
        }

        let next_result_step = self.completed_steps().saturating_add(1);
        if next_result_step > MAX_STEPS {
            return Err(SimError::StepLimitReached { limit: MAX_STEPS });
        }

        if self.results.iter().any(|r| r.step == next_result_step) {
            debug!(
                simulation = %self.id,
                step = next_result_step,
                "results already derived; advance is a no-op"
            );
            return Ok(AdvanceResult::unchanged(next_result_step));
        }

        if next_result_step > selected.step {
            return Err(SimError::InvalidState(format!(
                "results for step {next_result_step} requested but the latest parameters are for step {}",
                selected.step
            )));
        }

        let results = deriver.derive(selected, next_result_step);
        if results.step != next_result_step {
            return Err(SimError::InvalidState(format!(
                "deriver returned results for step {} but step {next_result_step} was requested",
                results.step
            )));
        }

        let next_param_step = selected.step.saturating_add(1);
        let forward = (next_param_step <= MAX_STEPS).then(|| selected.clone_for_step(next_param_step));
        let capital = forward.as_ref().map_or(selected.capital, |p| p.capital);

        info!(
            simulation = %self.id,
            room = %self.room_id,
            result_step = next_result_step,
            profit = results.profit,
            "step advanced"
        );
        self.results.push(results);
        if let Some(p) = forward {
            debug!(simulation = %self.id, step = next_param_step, "parameters cloned forward");
            self.parameters.push(p);
        }
        self.capital = capital;
        if next_result_step == MAX_STEPS {
            self.is_completed = true;
            info!(simulation = %self.id, "simulation completed");
        }

        Ok(AdvanceResult {
            result_step: next_result_step,
            derived: true,
            parameters_step: (next_param_step <= MAX_STEPS).then_some(next_param_step),
        })
    }
}
