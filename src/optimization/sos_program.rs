//! # SOS program
//!
//! `SosProgram` wraps a solver backend and builds sum-of-squares
//! certificates: given a target polynomial `p`, it constructs an auxiliary
//! SOS polynomial `b' Q b` over the candidate basis of degree `p.degree()/2`
//! (one PSD Gram matrix `Q`, or two when `p` is even and the basis splits by
//! parity) and emits one linear equality per coefficient of `p - b' Q b`.
//! All rejections (odd degree, empty target) happen before any solver
//! variable is allocated.

use std::fmt;

use log::{debug, info};
use nalgebra::DMatrix;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode,
};

use crate::optimization::solver_api::{SolverError, SosSolver};
use crate::polynomials::basis_vector::{BasisVector, PolynomialError};
use crate::polynomials::coefficient::{Coefficient, DecisionVariable, LinExpr};
use crate::polynomials::polynomial::Polynomial;

/// Errors of the SOS constraint construction and of the solve call.
#[derive(Debug, Clone, PartialEq)]
pub enum SosError {
    /// An SOS polynomial always has even degree.
    OddDegree(u32),
    /// The zero polynomial leaves the representation of the auxiliary SOS
    /// polynomial ambiguous.
    EmptyPolynomial,
    /// Pass-through from the external solver.
    Solver(SolverError),
    /// Error raised by the underlying polynomial algebra.
    Poly(PolynomialError),
}

impl fmt::Display for SosError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SosError::OddDegree(degree) => write!(
                f,
                "SOS polynomials must have even degree, got degree {}",
                degree
            ),
            SosError::EmptyPolynomial => {
                write!(f, "cannot build an SOS certificate for the zero polynomial")
            }
            SosError::Solver(error) => write!(f, "{}", error),
            SosError::Poly(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for SosError {}

impl From<SolverError> for SosError {
    fn from(error: SolverError) -> Self {
        SosError::Solver(error)
    }
}

impl From<PolynomialError> for SosError {
    fn from(error: PolynomialError) -> Self {
        SosError::Poly(error)
    }
}

pub struct SosProgram<S: SosSolver> {
    solver: S,
    objective: LinExpr,
    optimal_value: Option<f64>,
    pub loglevel: Option<String>,
}

impl<S: SosSolver> SosProgram<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            objective: LinExpr::constant(0.0),
            optimal_value: None,
            loglevel: None,
        }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// A polynomial over `basis` with one fresh free decision variable per
    /// basis vector.
    pub fn new_free_polynomial(
        &mut self,
        basis: &[BasisVector],
    ) -> Result<Polynomial<LinExpr>, SosError> {
        let variables = self.solver.new_free_variables(basis.len());
        let mut polynomial = Polynomial::zero();
        for (vector, variable) in basis.iter().zip(variables) {
            polynomial.set(vector.clone(), LinExpr::variable(variable))?;
        }
        Ok(polynomial)
    }

    /// The quadratic form of a fresh PSD Gram matrix over `basis`: an SOS
    /// polynomial by construction.
    pub fn new_sos_polynomial(
        &mut self,
        basis: &[BasisVector],
    ) -> Result<(Polynomial<LinExpr>, DMatrix<LinExpr>), SosError> {
        let (gram, psd_id) = self.solver.new_symmetric_psd_variable(basis.len());
        debug!(
            "new SOS polynomial: basis of {} vectors, PSD block {}",
            basis.len(),
            psd_id
        );
        let polynomial = Polynomial::quadratic_form(basis, &gram)?;
        Ok((polynomial, gram))
    }

    /// Two Gram blocks over the even-degree and odd-degree halves of
    /// `basis`, summed. For an even target this halves the PSD dimension per
    /// block: cross products of mixed parity cannot appear in an even
    /// polynomial.
    pub fn new_even_degree_sos_polynomial(
        &mut self,
        basis: &[BasisVector],
    ) -> Result<(Polynomial<LinExpr>, Vec<DMatrix<LinExpr>>), SosError> {
        let basis_even: Vec<BasisVector> =
            basis.iter().filter(|v| v.is_even()).cloned().collect();
        let basis_odd: Vec<BasisVector> = basis.iter().filter(|v| v.is_odd()).cloned().collect();
        let (p_even, gram_even) = self.new_sos_polynomial(&basis_even)?;
        let (p_odd, gram_odd) = self.new_sos_polynomial(&basis_odd)?;
        Ok((p_even.add(&p_odd)?, vec![gram_even, gram_odd]))
    }

    /// Constrains `target` to be a sum of squares. Returns the Gram
    /// matrix (or matrices, for an even target) whose PSD-ness certifies the
    /// decomposition.
    pub fn add_sos_constraint(
        &mut self,
        target: &Polynomial<LinExpr>,
    ) -> Result<Vec<DMatrix<LinExpr>>, SosError> {
        let degree = target.degree();
        if degree % 2 == 1 {
            return Err(SosError::OddDegree(degree));
        }
        let Some(rep) = target.representation() else {
            return Err(SosError::EmptyPolynomial);
        };
        let variables = target.variables();
        let basis = BasisVector::construct_basis(rep, &variables, degree / 2, true, true)?;
        info!(
            "SOS constraint: target degree {}, {} variables, candidate basis of {} vectors",
            degree,
            variables.len(),
            basis.len()
        );
        let (sos_polynomial, grams) = if target.is_even() {
            self.new_even_degree_sos_polynomial(&basis)?
        } else {
            let (polynomial, gram) = self.new_sos_polynomial(&basis)?;
            (polynomial, vec![gram])
        };
        let residual = target.sub(&sos_polynomial)?;
        debug!("coefficient matching: {} linear equalities", residual.len());
        for (_, coefficient) in residual.iter() {
            self.solver.add_linear_equality(coefficient.clone());
        }
        Ok(grams)
    }

    pub fn add_linear_equality(&mut self, expr: LinExpr) {
        self.solver.add_linear_equality(expr);
    }

    /// Accumulates a term of the linear objective to minimize.
    pub fn add_linear_cost(&mut self, expr: LinExpr) {
        self.objective = Coefficient::add(&self.objective, &expr);
    }

    /// Runs the solver on the accumulated program, with terminal logging
    /// when `loglevel` is set ("off"/"none" disables).
    pub fn solve(&mut self) -> Result<f64, SosError> {
        if let Some(level) = self.loglevel.clone() {
            let filter = match level.as_str() {
                "off" | "none" => None,
                "debug" => Some(LevelFilter::Debug),
                "info" => Some(LevelFilter::Info),
                "warn" => Some(LevelFilter::Warn),
                "error" => Some(LevelFilter::Error),
                _ => panic!("loglevel must be off, none, debug, info, warn or error"),
            };
            if let Some(filter) = filter {
                // a second init in the same process fails; logging is then
                // already routed, so the result can be ignored
                let _ = CombinedLogger::init(vec![TermLogger::new(
                    filter,
                    Config::default(),
                    TerminalMode::Mixed,
                    ColorChoice::Auto,
                )]);
            }
        }
        self.run_solver()
    }

    fn run_solver(&mut self) -> Result<f64, SosError> {
        let objective = self.objective.clone();
        self.solver.minimize(&objective);
        let value = self.solver.solve()?;
        info!("solver finished, optimal value {}", value);
        self.optimal_value = Some(value);
        Ok(value)
    }

    pub fn optimal_value(&self) -> Option<f64> {
        self.optimal_value
    }

    /// Value of one decision variable at the optimum.
    pub fn value_of(&self, variable: DecisionVariable) -> Result<f64, SosError> {
        self.solver
            .value_of(variable)
            .ok_or_else(|| SosError::Solver(SolverError(format!(
                "no value for {} (before a successful solve?)",
                variable
            ))))
    }

    /// The polynomial with every coefficient replaced by its value at the
    /// optimum.
    pub fn substitute_minimizer(
        &self,
        polynomial: &Polynomial<LinExpr>,
    ) -> Result<Polynomial<f64>, SosError> {
        let mut optimal = Polynomial::zero();
        for (vector, coefficient) in polynomial.iter() {
            let value = self.resolve(coefficient)?;
            optimal.set(vector.clone(), value)?;
        }
        Ok(optimal)
    }

    /// A Gram matrix variable resolved to numbers at the optimum.
    pub fn substitute_minimizer_matrix(
        &self,
        gram: &DMatrix<LinExpr>,
    ) -> Result<DMatrix<f64>, SosError> {
        let mut values = DMatrix::zeros(gram.nrows(), gram.ncols());
        for i in 0..gram.nrows() {
            for j in 0..gram.ncols() {
                values[(i, j)] = self.resolve(&gram[(i, j)])?;
            }
        }
        Ok(values)
    }

    fn resolve(&self, expr: &LinExpr) -> Result<f64, SosError> {
        expr.evaluate(|v| self.solver.value_of(v)).ok_or_else(|| {
            SosError::Solver(SolverError(
                "expression mentions an unvalued decision variable (before a successful solve?)"
                    .to_string(),
            ))
        })
    }
}

//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::solver_api::symmetric_matrix_of_variables;
    use crate::polynomials::basis_vector::Representation;
    use crate::polynomials::variable::Variable;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    /// Recording backend: allocates handles, stores constraints, and returns
    /// values from a preloaded assignment.
    struct MockSolver {
        next_id: usize,
        equalities: Vec<LinExpr>,
        psd_blocks: Vec<Vec<DecisionVariable>>,
        objective: Option<LinExpr>,
        assignment: BTreeMap<DecisionVariable, f64>,
        outcome: Result<f64, SolverError>,
        solved: bool,
    }

    impl MockSolver {
        fn new() -> Self {
            Self {
                next_id: 0,
                equalities: Vec::new(),
                psd_blocks: Vec::new(),
                objective: None,
                assignment: BTreeMap::new(),
                outcome: Ok(0.0),
                solved: false,
            }
        }

        fn fresh(&mut self, count: usize) -> Vec<DecisionVariable> {
            let vars = (self.next_id..self.next_id + count)
                .map(DecisionVariable::new)
                .collect();
            self.next_id += count;
            vars
        }
    }

    impl SosSolver for MockSolver {
        fn new_free_variables(&mut self, count: usize) -> Vec<DecisionVariable> {
            self.fresh(count)
        }

        fn new_symmetric_psd_variable(&mut self, size: usize) -> (DMatrix<LinExpr>, usize) {
            let upper = self.fresh(size * (size + 1) / 2);
            let gram = symmetric_matrix_of_variables(&upper, size);
            self.psd_blocks.push(upper);
            (gram, self.psd_blocks.len() - 1)
        }

        fn add_linear_equality(&mut self, expr: LinExpr) {
            self.equalities.push(expr);
        }

        fn minimize(&mut self, objective: &LinExpr) {
            self.objective = Some(objective.clone());
        }

        fn solve(&mut self) -> Result<f64, SolverError> {
            self.solved = self.outcome.is_ok();
            self.outcome.clone()
        }

        fn value_of(&self, variable: DecisionVariable) -> Option<f64> {
            if !self.solved {
                return None;
            }
            Some(self.assignment.get(&variable).copied().unwrap_or(0.0))
        }
    }

    fn mono_poly(entries: &[(&[(&Variable, u32)], f64)]) -> Polynomial<f64> {
        let mut p = Polynomial::zero();
        for (powers, coefficient) in entries {
            let vector = BasisVector::monomial(
                powers
                    .iter()
                    .map(|(v, q)| ((*v).clone(), *q))
                    .collect::<BTreeMap<_, _>>(),
            );
            p.set(vector, *coefficient).unwrap();
        }
        p
    }

    fn lift(p: &Polynomial<f64>) -> Polynomial<LinExpr> {
        p.map_coefficients(|c| LinExpr::constant(*c))
    }

    #[test]
    fn odd_degree_rejected_before_allocation() {
        let x = Variable::new("x");
        let mut program = SosProgram::new(MockSolver::new());
        let p = lift(&mono_poly(&[(&[(&x, 3)], 1.0)]));
        assert_eq!(program.add_sos_constraint(&p), Err(SosError::OddDegree(3)));
        assert_eq!(program.solver().next_id, 0);
        assert!(program.solver().equalities.is_empty());
    }

    #[test]
    fn empty_polynomial_rejected_before_allocation() {
        let mut program = SosProgram::new(MockSolver::new());
        let zero: Polynomial<LinExpr> = Polynomial::zero();
        assert_eq!(
            program.add_sos_constraint(&zero),
            Err(SosError::EmptyPolynomial)
        );
        assert_eq!(program.solver().next_id, 0);
    }

    #[test]
    fn even_target_splits_gram_blocks_by_parity() {
        let x = Variable::new("x");
        let mut program = SosProgram::new(MockSolver::new());
        // p = x^2 + 1 is even; candidate basis of degree <= 1 is [1, x]
        let p = lift(&mono_poly(&[(&[(&x, 2)], 1.0), (&[], 1.0)]));
        let grams = program.add_sos_constraint(&p).unwrap();
        assert_eq!(grams.len(), 2);
        assert_eq!(grams[0].nrows(), 1); // even half: [1]
        assert_eq!(grams[1].nrows(), 1); // odd half: [x]
        // residual terms: 1 and x^2
        assert_eq!(program.solver().equalities.len(), 2);
    }

    #[test]
    fn non_even_target_uses_one_full_gram_block() {
        let x = Variable::new("x");
        let mut program = SosProgram::new(MockSolver::new());
        // p = x^2 + x is neither even nor odd
        let p = lift(&mono_poly(&[(&[(&x, 2)], 1.0), (&[(&x, 1)], 1.0)]));
        let grams = program.add_sos_constraint(&p).unwrap();
        assert_eq!(grams.len(), 1);
        assert_eq!(grams[0].nrows(), 2); // full basis [1, x]
        // sos = Q00 + 2 Q01 x + Q11 x^2, residual has terms 1, x, x^2
        assert_eq!(program.solver().equalities.len(), 3);
    }

    #[test]
    fn coefficient_matching_closes_under_a_feasible_gram() {
        let x = Variable::new("x");
        let mut program = SosProgram::new(MockSolver::new());
        // p = x^2 + 1 = (1)*1 + (1)*x^2: Gram blocks Qe = [1], Qo = [1]
        let p = lift(&mono_poly(&[(&[(&x, 2)], 1.0), (&[], 1.0)]));
        let grams = program.add_sos_constraint(&p).unwrap();
        let qe = program.solver().psd_blocks[0][0];
        let qo = program.solver().psd_blocks[1][0];
        {
            let solver = &mut program.solver;
            solver.assignment.insert(qe, 1.0);
            solver.assignment.insert(qo, 1.0);
        }
        program.solve().unwrap();
        // every matching equality holds at the assignment
        for equality in &program.solver().equalities {
            let value = equality
                .evaluate(|v| program.solver().value_of(v))
                .unwrap();
            assert_relative_eq!(value, 0.0);
        }
        // the Gram matrices resolve to the chosen values
        let qe_value = program.substitute_minimizer_matrix(&grams[0]).unwrap();
        assert_relative_eq!(qe_value[(0, 0)], 1.0);
    }

    #[test]
    fn chebyshev_target_matches_through_product_to_sum() {
        let x = Variable::new("x");
        let mut program = SosProgram::new(MockSolver::new());
        // p = T_2(x) + 1, even; basis [1, T_1]; T_1^2 = T_2/2 + T_0/2
        let t2 = BasisVector::univariate(Representation::Chebyshev, &x, 2);
        let one = BasisVector::one(Representation::Chebyshev);
        let mut p = Polynomial::zero();
        p.set(t2, LinExpr::constant(1.0)).unwrap();
        p.set(one, LinExpr::constant(1.0)).unwrap();
        program.add_sos_constraint(&p).unwrap();
        // residual terms T_0 and T_2
        assert_eq!(program.solver().equalities.len(), 2);
        // feasible assignment: Qo = 2 (so T_2/2*2 = T_2), Qe = 1 - 2/2 = 0
        let qe = program.solver().psd_blocks[0][0];
        let qo = program.solver().psd_blocks[1][0];
        {
            let solver = &mut program.solver;
            solver.assignment.insert(qe, 0.0);
            solver.assignment.insert(qo, 2.0);
        }
        program.solve().unwrap();
        for equality in &program.solver().equalities {
            let value = equality
                .evaluate(|v| program.solver().value_of(v))
                .unwrap();
            assert_relative_eq!(value, 0.0);
        }
    }

    #[test]
    fn free_polynomial_fit_through_points() {
        // two variables, monomial basis of degree <= 3, fit through
        // (0,0) -> 0, (1,1) -> 1, (2,2) -> 2
        let vars = Variable::multivariate("x", 2);
        let mut program = SosProgram::new(MockSolver::new());
        let basis = BasisVector::construct_basis(
            Representation::Monomial,
            &vars,
            3,
            true,
            true,
        )
        .unwrap();
        assert_eq!(basis.len(), 10);
        let p = program.new_free_polynomial(&basis).unwrap();
        assert_eq!(p.len(), 10);
        assert_eq!(p.degree(), 3);
        let points = [(0.0, 0.0, 0.0), (1.0, 1.0, 1.0), (2.0, 2.0, 2.0)];
        for (x1, x2, target) in points {
            let point =
                BTreeMap::from([(vars[0].clone(), x1), (vars[1].clone(), x2)]);
            let at_point = p.substitute(&point);
            // fully substituted: a single constant-vector term remains
            assert_eq!(at_point.degree(), 0);
            let expr = at_point.get(&BasisVector::one(Representation::Monomial));
            program.add_linear_equality(Coefficient::sub(&expr, &LinExpr::constant(target)));
        }
        assert_eq!(program.solver().equalities.len(), 3);
        // p(x1, x2) = (x1 + x2) / 2 satisfies all three interpolation
        // equalities; assign 0.5 to the two linear-term variables
        let x1_vec = BasisVector::univariate(Representation::Monomial, &vars[0], 1);
        let x2_vec = BasisVector::univariate(Representation::Monomial, &vars[1], 1);
        let w1 = p.get(&x1_vec).variables()[0];
        let w2 = p.get(&x2_vec).variables()[0];
        {
            let solver = &mut program.solver;
            solver.assignment.insert(w1, 0.5);
            solver.assignment.insert(w2, 0.5);
        }
        program.solve().unwrap();
        for equality in &program.solver().equalities {
            let value = equality
                .evaluate(|v| program.solver().value_of(v))
                .unwrap();
            assert_relative_eq!(value, 0.0);
        }
        // read back the fitted polynomial and check the three points
        let fitted = program.substitute_minimizer(&p).unwrap();
        for (x1, x2, target) in points {
            let point =
                BTreeMap::from([(vars[0].clone(), x1), (vars[1].clone(), x2)]);
            assert_relative_eq!(fitted.evaluate(&point).unwrap(), target, epsilon = 1e-4);
        }
    }

    #[test]
    fn objective_accumulates() {
        let mut program = SosProgram::new(MockSolver::new());
        let vars = program.solver.new_free_variables(2);
        program.add_linear_cost(LinExpr::variable(vars[0]));
        program.add_linear_cost(LinExpr::variable(vars[1]).scale(2.0));
        program.solve().unwrap();
        let objective = program.solver().objective.clone().unwrap();
        assert_eq!(
            objective,
            Coefficient::add(
                &LinExpr::variable(vars[0]),
                &LinExpr::variable(vars[1]).scale(2.0)
            )
        );
    }

    #[test]
    fn solver_failure_passes_through() {
        let mut solver = MockSolver::new();
        solver.outcome = Err(SolverError("infeasible".to_string()));
        let mut program = SosProgram::new(solver);
        let result = program.solve();
        assert_eq!(
            result,
            Err(SosError::Solver(SolverError("infeasible".to_string())))
        );
        assert_eq!(program.optimal_value(), None);
    }

    #[test]
    fn value_before_solve_is_an_error() {
        let mut program = SosProgram::new(MockSolver::new());
        let vars = program.solver.new_free_variables(1);
        assert!(program.value_of(vars[0]).is_err());
        let p = Polynomial::from_term(
            BasisVector::one(Representation::Monomial),
            LinExpr::variable(vars[0]),
        );
        assert!(program.substitute_minimizer(&p).is_err());
    }
}
