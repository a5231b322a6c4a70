//! Solver adapter contract. The SOS layer produces affine expressions over
//! decision variables and hands them to an implementor of [`SosSolver`];
//! bindings to concrete conic solvers live outside this crate and only need
//! to implement this trait.

use std::fmt;

use nalgebra::DMatrix;

use crate::polynomials::coefficient::{DecisionVariable, LinExpr};

/// Opaque failure of the external solver (infeasible, numerical breakdown,
/// backend error). Never retried by this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverError(pub String);

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "solver failure: {}", self.0)
    }
}

impl std::error::Error for SolverError {}

/// What the SOS layer requires of a convex solver backend.
pub trait SosSolver {
    /// `count` fresh free scalar decision variables.
    fn new_free_variables(&mut self, count: usize) -> Vec<DecisionVariable>;

    /// A fresh `size` x `size` symmetric matrix of decision variables,
    /// constrained positive semidefinite. Returns the matrix and the
    /// backend's id of the PSD constraint block.
    fn new_symmetric_psd_variable(&mut self, size: usize) -> (DMatrix<LinExpr>, usize);

    /// Adds the linear equality `expr == 0`.
    fn add_linear_equality(&mut self, expr: LinExpr);

    /// Sets the linear objective to minimize.
    fn minimize(&mut self, objective: &LinExpr);

    /// Runs the optimization once; returns the optimal objective value.
    fn solve(&mut self) -> Result<f64, SolverError>;

    /// Value of a decision variable at the optimum; `None` before a
    /// successful solve.
    fn value_of(&self, variable: DecisionVariable) -> Option<f64>;
}

/// Mirrors a row-major upper triangle of `size * (size + 1) / 2` fresh
/// variables into a full symmetric matrix. Helper for backend implementors
/// of [`SosSolver::new_symmetric_psd_variable`].
pub fn symmetric_matrix_of_variables(
    upper_triangle: &[DecisionVariable],
    size: usize,
) -> DMatrix<LinExpr> {
    assert_eq!(
        upper_triangle.len(),
        size * (size + 1) / 2,
        "upper triangle of a {0}x{0} matrix needs {0}*({0}+1)/2 variables",
        size
    );
    DMatrix::from_fn(size, size, |i, j| {
        let (row, col) = if i <= j { (i, j) } else { (j, i) };
        let index = row * size - row * (row + 1) / 2 + col;
        LinExpr::variable(upper_triangle[index])
    })
}

//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_matrix_layout() {
        let vars: Vec<DecisionVariable> = (0..6).map(DecisionVariable::new).collect();
        let q = symmetric_matrix_of_variables(&vars, 3);
        // upper triangle row-major: (0,0)=v0 (0,1)=v1 (0,2)=v2 (1,1)=v3 ...
        assert_eq!(q[(0, 0)], LinExpr::variable(vars[0]));
        assert_eq!(q[(0, 2)], LinExpr::variable(vars[2]));
        assert_eq!(q[(1, 1)], LinExpr::variable(vars[3]));
        assert_eq!(q[(2, 2)], LinExpr::variable(vars[5]));
        // symmetry
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(q[(i, j)], q[(j, i)]);
            }
        }
    }

    #[test]
    #[should_panic(expected = "upper triangle")]
    fn wrong_triangle_length_panics() {
        let vars: Vec<DecisionVariable> = (0..5).map(DecisionVariable::new).collect();
        symmetric_matrix_of_variables(&vars, 3);
    }
}
