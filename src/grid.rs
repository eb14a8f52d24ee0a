use crate::error::ConfigurationError;

/// Dense row-major 2-D array of `f64`.
///
/// Single-parameter grids use shape `(1, n)`; two-parameter grids use
/// `(len(second), len(first))` so that a row fixes the second parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Field {
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Field { rows, cols, data: vec![value; rows * cols] }
    }

    /// A one-row field holding `values`.
    pub fn row(values: Vec<f64>) -> Self {
        Field { rows: 1, cols: values.len(), data: values }
    }

    pub fn scalar(value: f64) -> Self {
        Field::row(vec![value])
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize) -> f64) -> Self {
        Field { rows, cols, data: (0..rows * cols).map(&mut f).collect() }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn first(&self) -> f64 {
        self.data[0]
    }

    pub fn last(&self) -> f64 {
        self.data[self.data.len() - 1]
    }

    /// Copies column `col` (one value per row) into `out`, reusing its allocation.
    pub fn column_into(&self, col: usize, out: &mut Vec<f64>) {
        out.clear();
        out.extend((0..self.rows).map(|row| self.data[row * self.cols + col]));
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.rows);
        self.column_into(col, &mut out);
        out
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Field {
        Field { rows: self.rows, cols: self.cols, data: self.data.iter().map(|&v| f(v)).collect() }
    }

    /// Elementwise combination of two fields. A `(1, 1)` operand broadcasts.
    pub fn zip_map(&self, other: &Field, f: impl Fn(f64, f64) -> f64) -> Field {
        if other.len() == 1 && self.len() != 1 {
            let b = other.data[0];
            return self.map(|a| f(a, b));
        }
        if self.len() == 1 && other.len() != 1 {
            let a = self.data[0];
            return other.map(|b| f(a, b));
        }
        assert_eq!(self.shape(), other.shape(), "fields must share a shape");
        Field {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&other.data).map(|(&a, &b)| f(a, b)).collect(),
        }
    }

    /// Smallest and largest finite value, if any.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        finite_range(self.data.iter().copied())
    }
}

pub(crate) fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Evenly spaced values over `[start, stop]`, endpoint included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Cartesian product of two sequences as two `(b.len(), a.len())` grids.
pub fn meshgrid(a: &[f64], b: &[f64]) -> (Field, Field) {
    let (rows, cols) = (b.len(), a.len());
    let aa = Field::from_fn(rows, cols, |i| a[i % cols]);
    let bb = Field::from_fn(rows, cols, |i| b[i / cols]);
    (aa, bb)
}

/// Which diagram a parameter set produces. Fixed once the set is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStrategy {
    TwoD,
    ThreeD,
}

#[derive(Clone, Debug)]
pub struct ParameterSet {
    entries: Vec<(String, Field)>,
    strategy: RenderStrategy,
}

impl ParameterSet {
    /// Validates arity (1 or 2), names and shapes.
    pub fn from_entries(entries: Vec<(String, Field)>) -> Result<Self, ConfigurationError> {
        let strategy = match entries.len() {
            1 => RenderStrategy::TwoD,
            2 => RenderStrategy::ThreeD,
            n => return Err(ConfigurationError::UnsupportedArity(n)),
        };

        for (i, (name, values)) in entries.iter().enumerate() {
            if values.is_empty() {
                return Err(ConfigurationError::EmptyParameter(name.clone()));
            }
            if entries[..i].iter().any(|(other, _)| other == name) {
                return Err(ConfigurationError::DuplicateName(name.clone()));
            }
        }

        let expected = entries[0].1.shape();
        if let Some((name, values)) = entries.iter().find(|(_, v)| v.shape() != expected) {
            return Err(ConfigurationError::ShapeMismatch {
                name: name.clone(),
                expected,
                actual: values.shape(),
            });
        }

        Ok(ParameterSet { entries, strategy })
    }

    /// One parameter swept over `values`.
    pub fn single(name: &str, values: Vec<f64>) -> Result<Self, ConfigurationError> {
        Self::from_entries(vec![(name.to_string(), Field::row(values))])
    }

    /// Two parameters combined into a grid.
    pub fn grid(
        first: (&str, &[f64]),
        second: (&str, &[f64]),
    ) -> Result<Self, ConfigurationError> {
        let (a, b) = meshgrid(first.1, second.1);
        Self::from_entries(vec![(first.0.to_string(), a), (second.0.to_string(), b)])
    }

    pub fn strategy(&self) -> RenderStrategy {
        self.strategy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.entries[0].1.shape()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn by_index(&self, index: usize) -> (&str, &Field) {
        let (name, values) = &self.entries[index];
        (name, values)
    }
}

/// Named state arrays in declaration order. The order is the argument
/// order handed to the map.
#[derive(Clone, Debug, Default)]
pub struct VariableSet {
    entries: Vec<(String, Option<Field>)>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, initial: Field) -> Self {
        self.entries.push((name.to_string(), Some(initial)));
        self
    }

    /// Declares a variable without an initial value.
    pub fn declare(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), None));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = Option<&Field>> {
        self.entries.iter().map(|(_, v)| v.as_ref())
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.entries.iter().find(|(n, _)| n == name).and_then(|(_, v)| v.as_ref())
    }

    pub(crate) fn validate(&self, params: &ParameterSet) -> Result<(), ConfigurationError> {
        if self.entries.is_empty() {
            return Err(ConfigurationError::NoVariables);
        }

        let expected = params.shape();
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|(other, _)| other == name)
                || params.get(name).is_some()
            {
                return Err(ConfigurationError::DuplicateName(name.clone()));
            }
            if let Some(value) = value {
                if value.shape() != expected {
                    return Err(ConfigurationError::ShapeMismatch {
                        name: name.clone(),
                        expected,
                        actual: value.shape(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_ends() {
        let v = linspace(2.7, 4.0, 5);
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], 2.7);
        assert_eq!(v[4], 4.0);
        assert!((v[2] - 3.35).abs() < 1e-12);
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }

    #[test]
    fn meshgrid_rows_follow_second_sequence() {
        let (a, b) = meshgrid(&[1.0, 2.0, 3.0], &[10.0, 20.0]);
        assert_eq!(a.shape(), (2, 3));
        assert_eq!(b.shape(), (2, 3));
        assert_eq!(a.get(1, 2), 3.0);
        assert_eq!(b.get(1, 2), 20.0);
        assert_eq!(a.column(1), vec![2.0, 2.0]);
        assert_eq!(b.column(1), vec![10.0, 20.0]);
    }

    #[test]
    fn zip_map_broadcasts_scalars() {
        let x = Field::row(vec![0.5, 0.25]);
        let r = Field::scalar(2.0);
        let y = r.zip_map(&x, |r, x| r * x);
        assert_eq!(y.as_slice(), &[1.0, 0.5]);
    }

    #[test]
    fn arity_selects_strategy() {
        let one = ParameterSet::single("r", vec![1.0, 2.0]).unwrap();
        assert_eq!(one.strategy(), RenderStrategy::TwoD);
        let two = ParameterSet::grid(("a", &[1.0, 2.0]), ("b", &[0.1])).unwrap();
        assert_eq!(two.strategy(), RenderStrategy::ThreeD);
        assert_eq!(two.shape(), (1, 2));
    }

    #[test]
    fn rejects_bad_parameter_sets() {
        assert_eq!(
            ParameterSet::from_entries(Vec::new()).unwrap_err(),
            ConfigurationError::UnsupportedArity(0)
        );
        let dup = vec![
            ("a".to_string(), Field::scalar(1.0)),
            ("a".to_string(), Field::scalar(2.0)),
        ];
        assert_eq!(
            ParameterSet::from_entries(dup).unwrap_err(),
            ConfigurationError::DuplicateName("a".into())
        );
        let ragged = vec![
            ("a".to_string(), Field::row(vec![1.0, 2.0])),
            ("b".to_string(), Field::scalar(2.0)),
        ];
        assert!(matches!(
            ParameterSet::from_entries(ragged),
            Err(ConfigurationError::ShapeMismatch { .. })
        ));
        assert_eq!(
            ParameterSet::single("r", Vec::new()).unwrap_err(),
            ConfigurationError::EmptyParameter("r".into())
        );
    }

    #[test]
    fn variables_must_match_grid() {
        let params = ParameterSet::single("r", vec![1.0, 2.0, 3.0]).unwrap();
        let vars = VariableSet::new().with("x_n", Field::filled(1, 2, 0.1));
        assert!(matches!(
            vars.validate(&params),
            Err(ConfigurationError::ShapeMismatch { .. })
        ));
        let declared = VariableSet::new().declare("x_n");
        assert!(declared.validate(&params).is_ok());
        assert_eq!(
            VariableSet::new().validate(&params).unwrap_err(),
            ConfigurationError::NoVariables
        );
    }
}
