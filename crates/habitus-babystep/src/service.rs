//! Store-backed planning

use crate::{BabyStepConfig, BabySteps, PlanError, Planner};
use habitus_domain::{HabitId, HabitStore};
use std::fmt::Display;
use tracing::{debug, info};

/// Loads a habit and its latest estimate, then plans
pub struct BabyStepService<S> {
    store: S,
    planner: Planner,
}

impl<S> BabyStepService<S>
where
    S: HabitStore,
    S::Error: Display,
{
    /// Create a service over `store`, rejecting an invalid configuration
    pub fn new(store: S, config: BabyStepConfig) -> Result<Self, PlanError> {
        Ok(Self {
            store,
            planner: Planner::new(config)?,
        })
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Give the store back
    pub fn into_store(self) -> S {
        self.store
    }

    /// Lv50 and Lv10 plans for a stored habit
    ///
    /// Fails with `NotFound` if the habit or its estimate is missing.
    pub fn plans_for_habit(&self, habit_id: HabitId) -> Result<BabySteps, PlanError> {
        let habit = self
            .store
            .get_habit(habit_id)
            .map_err(|e| PlanError::Store(e.to_string()))?
            .ok_or_else(|| PlanError::NotFound {
                kind: "habit",
                id: habit_id.to_string(),
            })?;

        let estimate = self
            .store
            .latest_estimate(habit_id)
            .map_err(|e| PlanError::Store(e.to_string()))?
            .ok_or_else(|| PlanError::NotFound {
                kind: "estimate",
                id: habit_id.to_string(),
            })?;

        if estimate.firewall.triggered {
            debug!("Planning from a provisional estimate for habit {}", habit_id);
        }

        let plans = self.planner.plans(&habit, &estimate.variables)?;
        info!(
            "Planned habit {}: level {} -> lv50 {} / lv10 {}",
            habit_id, plans.lv50.current_level, plans.lv50.achieved_level, plans.lv10.achieved_level
        );

        Ok(plans)
    }
}
