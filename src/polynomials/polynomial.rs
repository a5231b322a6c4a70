//! # Polynomial module
//!
//! A [`Polynomial`] is a finite linear combination of [`BasisVector`]s of a
//! single representation, stored as a sorted map from basis vector to
//! coefficient. The coefficient type is generic over [`Coefficient`]: plain
//! `f64` for ordinary algebra, or [`LinExpr`](crate::polynomials::coefficient::LinExpr)
//! when the coefficients are decision variables of an external solver.
//!
//! Invariants held at every mutation:
//! - all keys share one representation (violations are
//!   [`PolynomialError::MixedBasis`]);
//! - coefficients that are *numerically* zero are never stored; symbolic
//!   coefficients are never pruned (see `Coefficient::is_probably_zero`).
//!
//! The zero polynomial is the empty map: it carries no representation, is
//! even, has degree 0, and is compatible with either representation in the
//! ring operations.
//!
//! Every operation returns a new value; operands are never mutated. The
//! `std::ops` impls (`+`, `-`, `*`) delegate to the fallible inherent
//! methods and panic with the error message when representations are mixed —
//! use the inherent methods where the error should propagate instead.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use nalgebra::DMatrix;

use crate::polynomials::basis_vector::{BasisVector, PolynomialError, Representation};
use crate::polynomials::coefficient::Coefficient;
use crate::polynomials::variable::Variable;

#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial<C: Coefficient> {
    terms: BTreeMap<BasisVector, C>,
}

impl<C: Coefficient> Polynomial<C> {
    /// Builds a polynomial from a coefficient map, pruning numerically zero
    /// coefficients. All keys must share one representation.
    pub fn new(terms: BTreeMap<BasisVector, C>) -> Result<Self, PolynomialError> {
        let mut representation: Option<Representation> = None;
        for vector in terms.keys() {
            match representation {
                None => representation = Some(vector.representation()),
                Some(rep) if rep != vector.representation() => {
                    return Err(PolynomialError::MixedBasis(rep, vector.representation()));
                }
                _ => {}
            }
        }
        Ok(Self {
            terms: terms
                .into_iter()
                .filter(|(_, c)| !c.is_probably_zero())
                .collect(),
        })
    }

    pub fn zero() -> Self {
        Self {
            terms: BTreeMap::new(),
        }
    }

    /// The constant polynomial "1" of the given representation.
    pub fn one(rep: Representation) -> Self {
        Self::from_term(BasisVector::one(rep), C::from_scalar(1.0))
    }

    /// Single-term polynomial; a numerically zero coefficient yields the
    /// zero polynomial.
    pub fn from_term(vector: BasisVector, coefficient: C) -> Self {
        let mut polynomial = Self::zero();
        polynomial.add_assign_term(vector, coefficient);
        polynomial
    }

    /// Representation shared by the terms; `None` for the zero polynomial.
    pub fn representation(&self) -> Option<Representation> {
        self.terms.keys().next().map(|v| v.representation())
    }

    /// Coefficient of `vector`, zero if absent.
    pub fn get(&self, vector: &BasisVector) -> C {
        self.terms
            .get(vector)
            .cloned()
            .unwrap_or_else(|| C::zero())
    }

    /// Sets the coefficient of `vector`. A numerically zero coefficient
    /// deletes the entry; a symbolic coefficient is always stored.
    pub fn set(&mut self, vector: BasisVector, coefficient: C) -> Result<(), PolynomialError> {
        if let Some(rep) = self.representation() {
            if !self.terms.contains_key(&vector) && rep != vector.representation() {
                return Err(PolynomialError::MixedBasis(rep, vector.representation()));
            }
        }
        if coefficient.is_probably_zero() {
            self.terms.remove(&vector);
        } else {
            self.terms.insert(vector, coefficient);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BasisVector, &C)> {
        self.terms.iter()
    }

    pub fn vectors(&self) -> Vec<BasisVector> {
        self.terms.keys().cloned().collect()
    }

    pub fn coefficients(&self) -> Vec<C> {
        self.terms.values().cloned().collect()
    }

    /// All variables appearing in the polynomial, sorted, without duplicates.
    pub fn variables(&self) -> Vec<Variable> {
        let set: BTreeSet<Variable> = self
            .terms
            .keys()
            .flat_map(|v| v.variables())
            .collect();
        set.into_iter().collect()
    }

    /// Maximum term degree; 0 for the zero polynomial.
    pub fn degree(&self) -> u32 {
        self.terms.keys().map(|v| v.degree()).max().unwrap_or(0)
    }

    /// True iff every term has even degree; the zero polynomial is even.
    pub fn is_even(&self) -> bool {
        self.terms.keys().all(|v| v.is_even())
    }

    /// True iff the polynomial is non-zero and every term has odd degree.
    pub fn is_odd(&self) -> bool {
        !self.is_zero() && self.terms.keys().all(|v| v.is_odd())
    }

    pub fn add(&self, other: &Self) -> Result<Self, PolynomialError> {
        self.compatible_with(other)?;
        let mut sum = self.clone();
        for (vector, coefficient) in other.iter() {
            sum.add_assign_term(vector.clone(), coefficient.clone());
        }
        Ok(sum)
    }

    pub fn sub(&self, other: &Self) -> Result<Self, PolynomialError> {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|(v, c)| (v.clone(), c.neg()))
                .collect(),
        }
    }

    /// Coefficient-wise multiplication by a plain number.
    pub fn scale(&self, factor: f64) -> Self {
        let mut scaled = Self::zero();
        for (vector, coefficient) in self.iter() {
            scaled.add_assign_term(vector.clone(), coefficient.scale(factor));
        }
        scaled
    }

    /// Bilinear expansion: the product of every pair of terms, each pair
    /// expanded through the representation-specific basis-vector product.
    pub fn mul(&self, other: &Self) -> Result<Self, PolynomialError> {
        self.compatible_with(other)?;
        let mut product = Self::zero();
        for (vs, cs) in self.iter() {
            for (vo, co) in other.iter() {
                let term_product = vs.mul(vo)?;
                product.add_scaled(&term_product, &cs.mul(co));
            }
        }
        Ok(product)
    }

    /// `self` raised to `exponent`. `p^0` is the constant 1 in the same
    /// representation, except `0^0` which is undefined.
    pub fn power(&self, exponent: u32) -> Result<Self, PolynomialError> {
        if exponent == 0 {
            return match self.representation() {
                None => Err(PolynomialError::UndefinedResult("0^0".to_string())),
                Some(rep) => Ok(Self::one(rep)),
            };
        }
        let mut power = self.clone();
        for _ in 1..exponent {
            power = power.mul(self)?;
        }
        Ok(power)
    }

    /// Term-wise derivative with respect to `variable`.
    pub fn derivative(&self, variable: &Variable) -> Self {
        let mut derivative = Self::zero();
        for (vector, coefficient) in self.iter() {
            derivative.add_scaled(&vector.derivative(variable), coefficient);
        }
        derivative
    }

    /// Vector of partial derivatives, one per variable.
    pub fn jacobian(&self, variables: &[Variable]) -> Vec<Self> {
        variables.iter().map(|v| self.derivative(v)).collect()
    }

    /// Term-wise indefinite integral with respect to `variable`.
    pub fn integral(&self, variable: &Variable) -> Self {
        let mut integral = Self::zero();
        for (vector, coefficient) in self.iter() {
            integral.add_scaled(&vector.primitive(variable), coefficient);
        }
        integral
    }

    /// Iterated definite integral: integrate with respect to each variable
    /// in turn and evaluate the running antiderivative between the matching
    /// bounds.
    pub fn definite_integral(
        &self,
        variables: &[Variable],
        lower_bounds: &[f64],
        upper_bounds: &[f64],
    ) -> Result<Self, PolynomialError> {
        if variables.len() != lower_bounds.len() || variables.len() != upper_bounds.len() {
            return Err(PolynomialError::LengthMismatch(format!(
                "integration got {} variables, {} lower and {} upper bounds",
                variables.len(),
                lower_bounds.len(),
                upper_bounds.len()
            )));
        }
        let mut running = self.clone();
        for ((variable, lb), ub) in variables.iter().zip(lower_bounds).zip(upper_bounds) {
            let antiderivative = running.integral(variable);
            let upper = antiderivative.substitute(&BTreeMap::from([(variable.clone(), *ub)]));
            let lower = antiderivative.substitute(&BTreeMap::from([(variable.clone(), *lb)]));
            running = upper.sub(&lower)?;
        }
        Ok(running)
    }

    /// Partial substitution: assigned variables are evaluated away, the
    /// result is a polynomial over the remaining free variables (possibly
    /// the zero polynomial when everything cancels).
    pub fn substitute(&self, point: &BTreeMap<Variable, f64>) -> Self {
        let mut substituted = Self::zero();
        for (vector, coefficient) in self.iter() {
            let (factor, remainder) = vector.substitute(point);
            substituted.add_assign_term(remainder, coefficient.scale(factor));
        }
        substituted
    }

    /// The quadratic form sum_{i,j} Q[i,j] b_i b_j over `basis`. Q must be
    /// symmetric: only the upper triangle is read, off-diagonal entries are
    /// doubled.
    pub fn quadratic_form(
        basis: &[BasisVector],
        q: &DMatrix<C>,
    ) -> Result<Self, PolynomialError> {
        if q.nrows() != basis.len() || q.ncols() != basis.len() {
            return Err(PolynomialError::LengthMismatch(format!(
                "{}x{} Gram matrix over a basis of {} vectors",
                q.nrows(),
                q.ncols(),
                basis.len()
            )));
        }
        let mut form = Self::zero();
        for i in 0..basis.len() {
            for j in i..basis.len() {
                let term_product = basis[i].mul(&basis[j])?;
                let coefficient = if i == j {
                    q[(i, j)].clone()
                } else {
                    q[(i, j)].scale(2.0)
                };
                form.add_scaled(&term_product, &coefficient);
            }
        }
        Ok(form)
    }

    /// The polynomial re-expressed in the monomial representation,
    /// term-wise.
    pub fn in_monomial_basis(&self) -> Self {
        let mut converted = Self::zero();
        for (vector, coefficient) in self.iter() {
            converted.add_scaled(&vector.in_monomial_basis(), coefficient);
        }
        converted
    }

    /// The polynomial re-expressed in the Chebyshev representation,
    /// term-wise.
    pub fn in_chebyshev_basis(&self) -> Self {
        let mut converted = Self::zero();
        for (vector, coefficient) in self.iter() {
            converted.add_scaled(&vector.in_chebyshev_basis(), coefficient);
        }
        converted
    }

    /// Rebuilds the polynomial with transformed coefficients, pruning those
    /// that become numerically zero.
    pub fn map_coefficients<D, F>(&self, f: F) -> Polynomial<D>
    where
        D: Coefficient,
        F: Fn(&C) -> D,
    {
        let mut mapped = Polynomial::zero();
        for (vector, coefficient) in self.iter() {
            mapped.add_assign_term(vector.clone(), f(coefficient));
        }
        mapped
    }

    fn compatible_with(&self, other: &Self) -> Result<(), PolynomialError> {
        match (self.representation(), other.representation()) {
            (Some(a), Some(b)) if a != b => Err(PolynomialError::MixedBasis(a, b)),
            _ => Ok(()),
        }
    }

    /// Merges one term into the polynomial, pruning a numerically zero
    /// result. Callers guarantee the representation matches.
    pub(crate) fn add_assign_term(&mut self, vector: BasisVector, coefficient: C) {
        debug_assert!(
            self.representation()
                .map_or(true, |rep| rep == vector.representation()),
            "representation mismatch in term accumulation"
        );
        let merged = match self.terms.get(&vector) {
            Some(existing) => existing.add(&coefficient),
            None => coefficient,
        };
        if merged.is_probably_zero() {
            self.terms.remove(&vector);
        } else {
            self.terms.insert(vector, merged);
        }
    }

    /// self += base * k, where `base` is a numeric polynomial (a basis
    /// product, derivative or conversion) and `k` a coefficient.
    fn add_scaled(&mut self, base: &Polynomial<f64>, k: &C) {
        for (vector, weight) in base.iter() {
            self.add_assign_term(vector.clone(), k.scale(*weight));
        }
    }
}

impl Polynomial<f64> {
    /// Full evaluation; every variable of the polynomial must be assigned.
    pub fn evaluate(&self, point: &BTreeMap<Variable, f64>) -> Result<f64, PolynomialError> {
        let mut total = 0.0;
        for (vector, coefficient) in self.iter() {
            total += coefficient * vector.evaluate(point)?;
        }
        Ok(total)
    }

    /// Coefficient-wise rounding to `digits` decimal places.
    pub fn round(&self, digits: i32) -> Self {
        let scale = 10.0_f64.powi(digits);
        let mut rounded = Self::zero();
        for (vector, coefficient) in self.iter() {
            rounded.add_assign_term(vector.clone(), (coefficient * scale).round() / scale);
        }
        rounded
    }

    /// Coefficient-wise absolute value.
    pub fn abs(&self) -> Self {
        Self {
            terms: self.terms.iter().map(|(v, c)| (v.clone(), c.abs())).collect(),
        }
    }

    /// The value of a degree-0 polynomial.
    pub fn to_scalar(&self) -> Result<f64, PolynomialError> {
        if self.degree() > 0 {
            return Err(PolynomialError::InvalidArgument(format!(
                "polynomial of degree {} cannot be converted to a scalar",
                self.degree()
            )));
        }
        Ok(self
            .terms
            .values()
            .next()
            .copied()
            .unwrap_or(0.0))
    }
}

impl<C: Coefficient> std::ops::Add for Polynomial<C> {
    type Output = Polynomial<C>;

    fn add(self, rhs: Polynomial<C>) -> Polynomial<C> {
        Polynomial::add(&self, &rhs).unwrap_or_else(|error| panic!("{}", error))
    }
}

impl<C: Coefficient> std::ops::Sub for Polynomial<C> {
    type Output = Polynomial<C>;

    fn sub(self, rhs: Polynomial<C>) -> Polynomial<C> {
        Polynomial::sub(&self, &rhs).unwrap_or_else(|error| panic!("{}", error))
    }
}

impl<C: Coefficient> std::ops::Neg for Polynomial<C> {
    type Output = Polynomial<C>;

    fn neg(self) -> Polynomial<C> {
        Polynomial::neg(&self)
    }
}

impl<C: Coefficient> std::ops::Mul for Polynomial<C> {
    type Output = Polynomial<C>;

    fn mul(self, rhs: Polynomial<C>) -> Polynomial<C> {
        Polynomial::mul(&self, &rhs).unwrap_or_else(|error| panic!("{}", error))
    }
}

impl<C: Coefficient> std::ops::Mul<f64> for Polynomial<C> {
    type Output = Polynomial<C>;

    fn mul(self, rhs: f64) -> Polynomial<C> {
        self.scale(rhs)
    }
}

impl<C: Coefficient> fmt::Display for Polynomial<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (i, (vector, coefficient)) in self.iter().enumerate() {
            let positive = coefficient.as_constant().map_or(true, |k| k > 0.0);
            if i > 0 && positive {
                write!(f, "+")?;
            }
            let suppress_coefficient =
                coefficient.as_constant() == Some(1.0) && !vector.is_empty();
            if !suppress_coefficient {
                match coefficient.as_constant() {
                    Some(_) => write!(f, "{}", coefficient)?,
                    None => write!(f, "({})", coefficient)?,
                }
            }
            if !vector.is_empty() {
                write!(f, "{}", vector)?;
            }
        }
        Ok(())
    }
}
