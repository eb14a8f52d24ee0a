use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ConfigurationError, IterationError};
use crate::grid::{Field, ParameterSet, RenderStrategy, VariableSet, finite_range};
use crate::maps::{Map, Setup};
use crate::progress::ProgressReporter;

/// Trailing snapshots of a run, oldest first. Each snapshot holds one array
/// per state variable in declared order. Clones share the snapshots.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryWindow {
    snapshots: Arc<Vec<Vec<Field>>>,
}

impl HistoryWindow {
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[Vec<Field>] {
        &self.snapshots
    }

    pub fn snapshot(&self, index: usize) -> &[Field] {
        &self.snapshots[index]
    }

    pub fn last(&self) -> Option<&[Field]> {
        self.snapshots.last().map(Vec::as_slice)
    }

    /// Finite min/max of one variable across every retained snapshot.
    pub fn variable_range(&self, variable: usize) -> Option<(f64, f64)> {
        finite_range(
            self.snapshots
                .iter()
                .flat_map(|s| s[variable].as_slice().iter().copied()),
        )
    }
}

pub struct SimulationEngine<M: Map> {
    map: M,
    params: ParameterSet,
    vars: VariableSet,
    window: HistoryWindow,
}

impl<M: Map> SimulationEngine<M> {
    /// Checks the inputs against the map and fixes the render strategy.
    pub fn configure(map: M, params: ParameterSet, vars: VariableSet) -> Result<Self, ConfigurationError> {
        if let Some(missing) = map.parameters().iter().find(|name| params.get(name).is_none()) {
            return Err(ConfigurationError::MissingParameter(missing.to_string()));
        }
        if vars.len() != map.variables().len() {
            return Err(ConfigurationError::VariableCount {
                expected: map.variables().len(),
                actual: vars.len(),
            });
        }
        vars.validate(&params)?;

        debug!(
            map = map.name(),
            strategy = ?params.strategy(),
            shape = ?params.shape(),
            "configured engine"
        );

        Ok(SimulationEngine { map, params, vars, window: HistoryWindow::default() })
    }

    pub fn from_setup(setup: Setup<M>) -> Result<Self, ConfigurationError> {
        Self::configure(setup.map, setup.params, setup.vars)
    }

    pub fn name(&self) -> &str {
        self.map.name()
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn vars(&self) -> &VariableSet {
        &self.vars
    }

    pub fn strategy(&self) -> RenderStrategy {
        self.params.strategy()
    }

    pub fn window(&self) -> &HistoryWindow {
        &self.window
    }

    /// Applies the map `iterations` times from the initial state and keeps
    /// the last `last_num` post-step states.
    ///
    /// The previous window is discarded first. On error the window stays
    /// empty and the reporter is not finished.
    pub fn iterate_field(
        &mut self,
        iterations: usize,
        last_num: usize,
        progress: &mut impl ProgressReporter,
    ) -> Result<&HistoryWindow, IterationError> {
        self.window = HistoryWindow::default();

        info!("Iterating {}...", self.map.name());

        let expected = self.vars.len();
        let shape = self.params.shape();
        let first_kept = iterations.saturating_sub(last_num);
        let mut snapshots: Vec<Vec<Field>> = Vec::with_capacity(iterations.min(last_num));

        // state before the first kept step; afterwards the latest snapshot is the state
        let mut scratch: Option<Vec<Field>> = None;
        for i in 0..iterations {
            let next = {
                let args: Vec<Option<&Field>> = match snapshots.last().or(scratch.as_ref()) {
                    Some(current) => current.iter().map(Some).collect(),
                    None => self.vars.values().collect(),
                };
                self.map.iterate(&self.params, &args)?
            };

            if next.len() != expected {
                return Err(IterationError::ArityMismatch { expected, actual: next.len() });
            }
            if let Some(bad) = next.iter().find(|f| f.shape() != shape) {
                return Err(IterationError::ShapeMismatch { expected: shape, actual: bad.shape() });
            }

            if i >= first_kept {
                snapshots.push(next);
            } else {
                scratch = Some(next);
            }

            progress.update(i as f64 / iterations as f64);
        }
        progress.finish();

        self.window = HistoryWindow { snapshots: Arc::new(snapshots) };
        info!(
            map = self.map.name(),
            iterations,
            retained = self.window.len(),
            "iteration finished"
        );
        Ok(&self.window)
    }
}
