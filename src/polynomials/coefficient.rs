//! # Coefficient abstraction
//!
//! Polynomial coefficients are either plain numbers or opaque expressions
//! over decision variables handed out by an external convex solver. The
//! [`Coefficient`] trait is the seam between the two: the ring layer only
//! ever asks for add/sub/neg/scale/mul and the pruning predicate
//! [`Coefficient::is_probably_zero`].
//!
//! The pruning convention is deliberately asymmetric: a numeric
//! coefficient answers the zero question exactly, while a symbolic expression
//! that mentions any decision variable always answers "not structurally
//! zero", so it can never be dropped by accident before the solver assigns
//! values.

use std::collections::BTreeMap;
use std::fmt;

use num_traits::Zero;

/// What the polynomial ring requires of a coefficient.
pub trait Coefficient: Clone + PartialEq + fmt::Debug + fmt::Display + 'static {
    fn zero() -> Self;
    fn from_scalar(value: f64) -> Self;
    fn add(&self, other: &Self) -> Self;
    fn neg(&self) -> Self;
    fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }
    /// Multiplication by a plain number.
    fn scale(&self, factor: f64) -> Self;
    /// Coefficient-by-coefficient product, used by the bilinear expansion of
    /// polynomial multiplication.
    fn mul(&self, other: &Self) -> Self;
    /// Pruning predicate: exact for numbers, always `false` for expressions
    /// that still mention a decision variable.
    fn is_probably_zero(&self) -> bool;
    /// The numeric value, if the coefficient is concretely numeric.
    fn as_constant(&self) -> Option<f64>;
}

impl Coefficient for f64 {
    fn zero() -> Self {
        Zero::zero()
    }

    fn from_scalar(value: f64) -> Self {
        value
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn neg(&self) -> Self {
        -self
    }

    fn scale(&self, factor: f64) -> Self {
        self * factor
    }

    fn mul(&self, other: &Self) -> Self {
        self * other
    }

    fn is_probably_zero(&self) -> bool {
        self.is_zero()
    }

    fn as_constant(&self) -> Option<f64> {
        Some(*self)
    }
}

/// Opaque handle to a scalar decision variable issued by a solver backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecisionVariable(usize);

impl DecisionVariable {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn id(&self) -> usize {
        self.0
    }
}

impl fmt::Display for DecisionVariable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Affine expression over decision variables: constant + sum of
/// weight * variable. This is the symbolic coefficient type the SOS layer
/// works with; the solver sees it as the left-hand side of a linear
/// constraint or objective.
#[derive(Clone, Debug, PartialEq)]
pub struct LinExpr {
    constant: f64,
    terms: BTreeMap<DecisionVariable, f64>,
}

impl LinExpr {
    pub fn constant(value: f64) -> Self {
        Self {
            constant: value,
            terms: BTreeMap::new(),
        }
    }

    pub fn variable(variable: DecisionVariable) -> Self {
        Self {
            constant: 0.0,
            terms: BTreeMap::from([(variable, 1.0)]),
        }
    }

    pub fn constant_part(&self) -> f64 {
        self.constant
    }

    pub fn iter_terms(&self) -> impl Iterator<Item = (DecisionVariable, f64)> + '_ {
        self.terms.iter().map(|(v, w)| (*v, *w))
    }

    pub fn variables(&self) -> Vec<DecisionVariable> {
        self.terms.keys().copied().collect()
    }

    /// Adds `weight * variable`, merging with an existing term. A term whose
    /// weight cancels to exactly 0 is removed.
    pub fn add_term(&mut self, variable: DecisionVariable, weight: f64) {
        let merged = self.terms.get(&variable).copied().unwrap_or(0.0) + weight;
        if merged == 0.0 {
            self.terms.remove(&variable);
        } else {
            self.terms.insert(variable, merged);
        }
    }

    /// Resolves the expression against an assignment of the decision
    /// variables; `None` if any mentioned variable has no value.
    pub fn evaluate<F>(&self, value_of: F) -> Option<f64>
    where
        F: Fn(DecisionVariable) -> Option<f64>,
    {
        let mut total = self.constant;
        for (variable, weight) in self.iter_terms() {
            total += weight * value_of(variable)?;
        }
        Some(total)
    }
}

impl Coefficient for LinExpr {
    fn zero() -> Self {
        Self::constant(0.0)
    }

    fn from_scalar(value: f64) -> Self {
        Self::constant(value)
    }

    fn add(&self, other: &Self) -> Self {
        let mut sum = self.clone();
        sum.constant += other.constant;
        for (variable, weight) in other.iter_terms() {
            sum.add_term(variable, weight);
        }
        sum
    }

    fn neg(&self) -> Self {
        self.scale(-1.0)
    }

    fn scale(&self, factor: f64) -> Self {
        if factor == 0.0 {
            return Self::constant(0.0);
        }
        Self {
            constant: self.constant * factor,
            terms: self.terms.iter().map(|(v, w)| (*v, w * factor)).collect(),
        }
    }

    /// Affine times affine stays affine only when one side is a plain
    /// constant.
    ///
    /// # Panics
    /// If both operands mention decision variables: the resulting bilinear
    /// term cannot be represented in a linear program.
    fn mul(&self, other: &Self) -> Self {
        if let Some(value) = self.as_constant() {
            other.scale(value)
        } else if let Some(value) = other.as_constant() {
            self.scale(value)
        } else {
            panic!(
                "product of two non-constant affine expressions is not affine: ({}) * ({})",
                self, other
            );
        }
    }

    fn is_probably_zero(&self) -> bool {
        self.terms.is_empty() && self.constant == 0.0
    }

    fn as_constant(&self) -> Option<f64> {
        if self.terms.is_empty() {
            Some(self.constant)
        } else {
            None
        }
    }
}

impl std::ops::Add for LinExpr {
    type Output = LinExpr;

    fn add(self, rhs: LinExpr) -> LinExpr {
        Coefficient::add(&self, &rhs)
    }
}

impl std::ops::Sub for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: LinExpr) -> LinExpr {
        Coefficient::sub(&self, &rhs)
    }
}

impl std::ops::Neg for LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        Coefficient::neg(&self)
    }
}

impl std::ops::Mul<f64> for LinExpr {
    type Output = LinExpr;

    fn mul(self, rhs: f64) -> LinExpr {
        self.scale(rhs)
    }
}

impl fmt::Display for LinExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        if self.constant != 0.0 || self.terms.is_empty() {
            write!(f, "{}", self.constant)?;
            first = false;
        }
        for (variable, weight) in self.iter_terms() {
            if weight < 0.0 {
                write!(f, "{}", if first { "-" } else { " - " })?;
            } else if !first {
                write!(f, " + ")?;
            }
            let magnitude = weight.abs();
            if magnitude == 1.0 {
                write!(f, "{}", variable)?;
            } else {
                write!(f, "{}{}", magnitude, variable)?;
            }
            first = false;
        }
        Ok(())
    }
}

//___________________________________TESTS____________________________________
