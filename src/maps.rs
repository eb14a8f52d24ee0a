//! Discrete-time maps the engine can drive.
//!
//! A map is a pure transition function: it reads the current state arrays
//! (in declared order) and the parameter grid, and returns the next state in
//! the same order. Maps never hold state of their own.

use crate::error::{ConfigurationError, IterationError};
use crate::grid::{Field, ParameterSet, VariableSet, linspace};

pub trait Map {
    fn name(&self) -> &str;

    /// Parameter names the map reads from the parameter set.
    fn parameters(&self) -> &'static [&'static str];

    /// State variable names, in argument order.
    fn variables(&self) -> &'static [&'static str];

    fn iterate(
        &self,
        params: &ParameterSet,
        state: &[Option<&Field>],
    ) -> Result<Vec<Field>, IterationError>;
}

/// A map together with the inputs it should be configured with.
pub struct Setup<M> {
    pub map: M,
    pub params: ParameterSet,
    pub vars: VariableSet,
}

fn required<'a>(
    state: &[Option<&'a Field>],
    index: usize,
    name: &str,
) -> Result<&'a Field, IterationError> {
    state
        .get(index)
        .copied()
        .flatten()
        .ok_or_else(|| IterationError::MissingVariable { name: name.to_string() })
}

fn parameter<'a>(params: &'a ParameterSet, name: &str) -> Result<&'a Field, IterationError> {
    params
        .get(name)
        .ok_or_else(|| IterationError::MissingParameter { name: name.to_string() })
}

const INITIAL_STATE: f64 = 1e-5;

#[derive(Clone, Copy, Debug, Default)]
pub struct Logistic;

impl Logistic {
    pub fn setup(r: Vec<f64>, x0: Field) -> Result<Setup<Self>, ConfigurationError> {
        Ok(Setup {
            map: Logistic,
            params: ParameterSet::single("r", r)?,
            vars: VariableSet::new().with("x_n", x0),
        })
    }

    pub fn preset(n: usize) -> Result<Setup<Self>, ConfigurationError> {
        Self::setup(linspace(2.7, 4.0, n), Field::filled(1, n, INITIAL_STATE))
    }
}

impl Map for Logistic {
    fn name(&self) -> &str {
        "Logistic"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["r"]
    }

    fn variables(&self) -> &'static [&'static str] {
        &["x_n"]
    }

    fn iterate(
        &self,
        params: &ParameterSet,
        state: &[Option<&Field>],
    ) -> Result<Vec<Field>, IterationError> {
        let x = required(state, 0, "x_n")?;
        let r = parameter(params, "r")?;
        Ok(vec![r.zip_map(x, |r, x| r * x * (1.0 - x))])
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Gauss;

impl Gauss {
    pub fn setup(alpha: &[f64], beta: &[f64], x0: Field) -> Result<Setup<Self>, ConfigurationError> {
        Ok(Setup {
            map: Gauss,
            params: ParameterSet::grid(("alpha", alpha), ("beta", beta))?,
            vars: VariableSet::new().with("x_n", x0),
        })
    }

    pub fn preset(n: usize) -> Result<Setup<Self>, ConfigurationError> {
        Self::setup(
            &linspace(3.0, 12.0, n),
            &linspace(-1.0, 1.0, n),
            Field::filled(n, n, INITIAL_STATE),
        )
    }
}

impl Map for Gauss {
    fn name(&self) -> &str {
        "Gauss"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["alpha", "beta"]
    }

    fn variables(&self) -> &'static [&'static str] {
        &["x_n"]
    }

    fn iterate(
        &self,
        params: &ParameterSet,
        state: &[Option<&Field>],
    ) -> Result<Vec<Field>, IterationError> {
        let x = required(state, 0, "x_n")?;
        let alpha = parameter(params, "alpha")?.as_slice();
        let beta = parameter(params, "beta")?.as_slice();
        let xs = x.as_slice();
        Ok(vec![Field::from_fn(x.rows(), x.cols(), |i| {
            (-alpha[i] * xs[i] * xs[i]).exp() + beta[i]
        })])
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Henon;

impl Henon {
    pub fn setup(a: &[f64], b: &[f64], x0: Field, y0: Field) -> Result<Setup<Self>, ConfigurationError> {
        Ok(Setup {
            map: Henon,
            params: ParameterSet::grid(("a", a), ("b", b))?,
            vars: VariableSet::new().with("x_n", x0).with("y_n", y0),
        })
    }

    pub fn preset(n: usize) -> Result<Setup<Self>, ConfigurationError> {
        Self::setup(
            &linspace(1.0, 1.4, n),
            &linspace(0.29, 0.31, n),
            Field::filled(n, n, INITIAL_STATE),
            Field::filled(n, n, INITIAL_STATE),
        )
    }
}

impl Map for Henon {
    fn name(&self) -> &str {
        "Henon"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["a", "b"]
    }

    fn variables(&self) -> &'static [&'static str] {
        &["x_n", "y_n"]
    }

    fn iterate(
        &self,
        params: &ParameterSet,
        state: &[Option<&Field>],
    ) -> Result<Vec<Field>, IterationError> {
        let x = required(state, 0, "x_n")?;
        let y = required(state, 1, "y_n")?;
        let a = parameter(params, "a")?.as_slice();
        let b = parameter(params, "b")?.as_slice();
        let (xs, ys) = (x.as_slice(), y.as_slice());
        let (rows, cols) = x.shape();
        Ok(vec![
            Field::from_fn(rows, cols, |i| ys[i] + 1.0 - a[i] * xs[i] * xs[i]),
            Field::from_fn(rows, cols, |i| b[i] * xs[i]),
        ])
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Duffing;

impl Duffing {
    pub fn setup(a: &[f64], b: &[f64], x0: Field, y0: Field) -> Result<Setup<Self>, ConfigurationError> {
        Ok(Setup {
            map: Duffing,
            params: ParameterSet::grid(("a", a), ("b", b))?,
            vars: VariableSet::new().with("x_n", x0).with("y_n", y0),
        })
    }

    pub fn preset(n: usize) -> Result<Setup<Self>, ConfigurationError> {
        Self::setup(
            &linspace(2.5, 3.8, n),
            &linspace(0.0, 0.5, n),
            Field::filled(n, n, INITIAL_STATE),
            Field::filled(n, n, INITIAL_STATE),
        )
    }
}

impl Map for Duffing {
    fn name(&self) -> &str {
        "Duffing"
    }

    fn parameters(&self) -> &'static [&'static str] {
        &["a", "b"]
    }

    fn variables(&self) -> &'static [&'static str] {
        &["x_n", "y_n"]
    }

    fn iterate(
        &self,
        params: &ParameterSet,
        state: &[Option<&Field>],
    ) -> Result<Vec<Field>, IterationError> {
        let x = required(state, 0, "x_n")?;
        let y = required(state, 1, "y_n")?;
        let a = parameter(params, "a")?.as_slice();
        let b = parameter(params, "b")?.as_slice();
        let (xs, ys) = (x.as_slice(), y.as_slice());
        let (rows, cols) = x.shape();
        Ok(vec![
            y.clone(),
            Field::from_fn(rows, cols, |i| -b[i] * xs[i] + a[i] * ys[i] - ys[i] * ys[i]),
        ])
    }
}
