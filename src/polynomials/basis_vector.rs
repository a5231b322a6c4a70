//! # Basis vector module
//!
//! A `BasisVector` is one elementary term of a polynomial basis: a finite
//! mapping from [`Variable`] to positive power, tagged with the
//! [`Representation`] that tells how the map is read:
//!
//! - `Monomial`: x1^p1 * x2^p2 * ... * xn^pn
//! - `Chebyshev`: T_p1(x1) * T_p2(x2) * ... * T_pn(xn)
//!
//! The empty map is the multiplicative identity "1" of either representation.
//! Zero powers are never stored: they are pruned on construction and on
//! `set`, so equality and hashing are pure functions of the non-zero power
//! map and the tag.
//!
//! Products, derivatives and antiderivatives of basis vectors are
//! [`Polynomial`]s, because in the Chebyshev representation they expand into
//! several terms. The representation-specific algebra lives in
//! `monomial_vector.rs` and `chebyshev_vector.rs`; this file holds the shared
//! behavior, the dispatch, and the combinatorial basis enumeration
//! [`BasisVector::construct_basis`].

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;

use crate::polynomials::polynomial::Polynomial;
use crate::polynomials::variable::Variable;

/// Closed set of basis representations. Values of different representations
/// are never compared or combined; mixing them is a [`PolynomialError::MixedBasis`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Representation {
    Monomial,
    Chebyshev,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Representation::Monomial => write!(f, "Monomial"),
            Representation::Chebyshev => write!(f, "Chebyshev"),
        }
    }
}

/// Error type of the polynomial algebra layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PolynomialError {
    /// Malformed call input (duplicate basis variables, missing assignment, ...).
    InvalidArgument(String),
    /// Two different representations met in one object or operation.
    MixedBasis(Representation, Representation),
    /// Mathematically undefined result, e.g. 0^0.
    UndefinedResult(String),
    /// Paired argument sequences of different lengths.
    LengthMismatch(String),
}

impl fmt::Display for PolynomialError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PolynomialError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            PolynomialError::MixedBasis(a, b) => {
                write!(f, "cannot combine {} and {} basis vectors", a, b)
            }
            PolynomialError::UndefinedResult(msg) => write!(f, "undefined result: {}", msg),
            PolynomialError::LengthMismatch(msg) => write!(f, "length mismatch: {}", msg),
        }
    }
}

impl std::error::Error for PolynomialError {}

/// One basis term: representation tag plus power map.
///
/// Equality, hashing and ordering derive from the tag and the sorted power
/// map, so a `BasisVector` can key a map and renders in a canonical order
/// independent of how it was built.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BasisVector {
    rep: Representation,
    powers: BTreeMap<Variable, u32>,
}

impl BasisVector {
    /// Builds a basis vector, pruning zero powers.
    pub fn new(rep: Representation, powers: BTreeMap<Variable, u32>) -> Self {
        let powers = powers.into_iter().filter(|(_, p)| *p != 0).collect();
        Self { rep, powers }
    }

    pub fn monomial(powers: BTreeMap<Variable, u32>) -> Self {
        Self::new(Representation::Monomial, powers)
    }

    pub fn chebyshev(powers: BTreeMap<Variable, u32>) -> Self {
        Self::new(Representation::Chebyshev, powers)
    }

    /// The multiplicative identity "1" of the given representation.
    pub fn one(rep: Representation) -> Self {
        Self {
            rep,
            powers: BTreeMap::new(),
        }
    }

    /// Single-variable vector `v^p` or `T_p(v)`.
    pub fn univariate(rep: Representation, variable: &Variable, power: u32) -> Self {
        Self::new(rep, BTreeMap::from([(variable.clone(), power)]))
    }

    pub fn representation(&self) -> Representation {
        self.rep
    }

    /// Power of `variable`, 0 if absent.
    pub fn get(&self, variable: &Variable) -> u32 {
        self.powers.get(variable).copied().unwrap_or(0)
    }

    /// Sets the power of `variable`; power 0 removes the entry.
    pub fn set(&mut self, variable: &Variable, power: u32) {
        if power == 0 {
            self.powers.remove(variable);
        } else {
            self.powers.insert(variable.clone(), power);
        }
    }

    /// Copy of `self` with the power of `variable` replaced.
    pub fn with_power(&self, variable: &Variable, power: u32) -> Self {
        let mut vector = self.clone();
        vector.set(variable, power);
        vector
    }

    /// Number of variables with non-zero power.
    pub fn len(&self) -> usize {
        self.powers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, u32)> {
        self.powers.iter().map(|(v, p)| (v, *p))
    }

    pub fn variables(&self) -> Vec<Variable> {
        self.powers.keys().cloned().collect()
    }

    /// Total degree: the sum of all powers.
    pub fn degree(&self) -> u32 {
        self.powers.values().sum()
    }

    pub fn is_even(&self) -> bool {
        self.degree() % 2 == 0
    }

    pub fn is_odd(&self) -> bool {
        !self.is_even()
    }

    /// Full evaluation at a point. Every variable of the vector must have an
    /// assigned value, otherwise [`PolynomialError::InvalidArgument`].
    pub fn evaluate(&self, point: &BTreeMap<Variable, f64>) -> Result<f64, PolynomialError> {
        let mut product = 1.0;
        for (variable, power) in self.iter() {
            let value = point.get(variable).ok_or_else(|| {
                PolynomialError::InvalidArgument(format!(
                    "no value assigned to variable {}",
                    variable
                ))
            })?;
            product *= self.evaluate_univariate(power, *value);
        }
        Ok(product)
    }

    /// Partial substitution: the numeric factor collected from the assigned
    /// variables, and the remainder vector over the free ones.
    pub fn substitute(&self, point: &BTreeMap<Variable, f64>) -> (f64, BasisVector) {
        let mut factor = 1.0;
        let mut remainder = BasisVector::one(self.rep);
        for (variable, power) in self.iter() {
            match point.get(variable) {
                Some(value) => factor *= self.evaluate_univariate(power, *value),
                None => remainder.set(variable, power),
            }
        }
        (factor, remainder)
    }

    fn evaluate_univariate(&self, power: u32, value: f64) -> f64 {
        match self.rep {
            Representation::Monomial => value.powi(power as i32),
            Representation::Chebyshev => crate::polynomials::chebyshev_vector::chebyshev_eval(
                power, value,
            ),
        }
    }

    /// Product of two basis vectors of the same representation. The result is
    /// a polynomial: a single term for monomials, up to 2^k terms for
    /// Chebyshev vectors sharing k variables.
    pub fn mul(&self, other: &BasisVector) -> Result<Polynomial<f64>, PolynomialError> {
        if self.rep != other.rep {
            return Err(PolynomialError::MixedBasis(self.rep, other.rep));
        }
        Ok(match self.rep {
            Representation::Monomial => self.monomial_mul(other),
            Representation::Chebyshev => self.chebyshev_mul(other),
        })
    }

    /// Derivative with respect to `variable`.
    pub fn derivative(&self, variable: &Variable) -> Polynomial<f64> {
        match self.rep {
            Representation::Monomial => self.monomial_derivative(variable),
            Representation::Chebyshev => self.chebyshev_derivative(variable),
        }
    }

    /// Indefinite integral with respect to `variable` (no integration
    /// constant).
    pub fn primitive(&self, variable: &Variable) -> Polynomial<f64> {
        match self.rep {
            Representation::Monomial => self.monomial_primitive(variable),
            Representation::Chebyshev => self.chebyshev_primitive(variable),
        }
    }

    /// This basis term re-expressed in the monomial representation.
    pub fn in_monomial_basis(&self) -> Polynomial<f64> {
        match self.rep {
            Representation::Monomial => Polynomial::from_term(self.clone(), 1.0),
            Representation::Chebyshev => self.chebyshev_to_monomial(),
        }
    }

    /// This basis term re-expressed in the Chebyshev representation.
    pub fn in_chebyshev_basis(&self) -> Polynomial<f64> {
        match self.rep {
            Representation::Monomial => self.monomial_to_chebyshev(),
            Representation::Chebyshev => Polynomial::from_term(self.clone(), 1.0),
        }
    }

    /// All basis vectors over `variables` of total degree `0..=degree`,
    /// filtered by parity. Enumeration is the stars-and-bars composition of
    /// each degree level into `variables.len()` non-negative parts, so every
    /// valid exponent tuple appears exactly once, in a deterministic order.
    pub fn construct_basis(
        rep: Representation,
        variables: &[Variable],
        degree: u32,
        include_even: bool,
        include_odd: bool,
    ) -> Result<Vec<BasisVector>, PolynomialError> {
        if !variables.iter().all_unique() {
            return Err(PolynomialError::InvalidArgument(
                "duplicate variables in basis construction".to_string(),
            ));
        }
        let mut vectors = Vec::new();
        for d in 0..=degree {
            if (include_even && d % 2 == 0) || (include_odd && d % 2 == 1) {
                vectors.extend(Self::vectors_of_degree(rep, variables, d));
            }
        }
        Ok(vectors)
    }

    /// Stars and bars: a composition of `degree` into `variables.len()` parts
    /// corresponds to choosing `variables.len() - 1` break points among
    /// `variables.len() + degree - 1` positions.
    fn vectors_of_degree(rep: Representation, variables: &[Variable], degree: u32) -> Vec<BasisVector> {
        let n = variables.len();
        if n == 0 {
            return if degree == 0 {
                vec![BasisVector::one(rep)]
            } else {
                vec![]
            };
        }
        let positions = n + degree as usize - 1;
        let breaks = n - 1;
        (0..positions as i64)
            .combinations(breaks)
            .map(|chosen| {
                let mut cuts = Vec::with_capacity(n + 1);
                cuts.push(-1);
                cuts.extend(chosen);
                cuts.push(positions as i64);
                let powers = cuts
                    .windows(2)
                    .zip(variables)
                    .map(|(pair, v)| (v.clone(), (pair[1] - pair[0] - 1) as u32))
                    .collect();
                BasisVector::new(rep, powers)
            })
            .collect()
    }
}

impl fmt::Display for BasisVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "1");
        }
        for (variable, power) in self.iter() {
            match self.rep {
                Representation::Monomial => {
                    if power == 1 {
                        write!(f, "{}", variable)?;
                    } else {
                        write!(f, "{}^{{{}}}", variable, power)?;
                    }
                }
                Representation::Chebyshev => write!(f, "T_{{{}}}({})", power, variable)?,
            }
        }
        Ok(())
    }
}

//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;

    fn binomial(n: u64, k: u64) -> u64 {
        let mut result = 1;
        for i in 0..k {
            result = result * (n - i) / (i + 1);
        }
        result
    }

    #[test]
    fn get_set_prune() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let mut v = BasisVector::one(Representation::Monomial);
        assert_eq!(v.get(&x), 0);
        v.set(&x, 3);
        assert_eq!(v.get(&x), 3);
        assert_eq!(v.get(&y), 0);
        assert_eq!(v.len(), 1);
        // setting back to zero restores the never-set state
        v.set(&x, 0);
        assert_eq!(v, BasisVector::one(Representation::Monomial));
        // zero powers pruned at construction too
        let w = BasisVector::monomial(BTreeMap::from([(x.clone(), 0), (y.clone(), 2)]));
        assert_eq!(w.len(), 1);
        assert_eq!(w.degree(), 2);
    }

    #[test]
    fn degree_and_parity() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let v = BasisVector::chebyshev(BTreeMap::from([(x, 2), (y, 3)]));
        assert_eq!(v.degree(), 5);
        assert!(v.is_odd());
        assert!(!v.is_even());
        assert!(BasisVector::one(Representation::Chebyshev).is_even());
    }

    #[test]
    fn representations_are_distinct() {
        let x = Variable::new("x");
        let m = BasisVector::univariate(Representation::Monomial, &x, 2);
        let c = BasisVector::univariate(Representation::Chebyshev, &x, 2);
        assert_ne!(m, c);
        assert_eq!(
            m.mul(&c),
            Err(PolynomialError::MixedBasis(
                Representation::Monomial,
                Representation::Chebyshev
            ))
        );
    }

    #[test]
    fn basis_counts() {
        // |basis(n, d)| = C(n + d, n)
        for n in 1..4u32 {
            for d in 0..5u32 {
                let vars = Variable::multivariate("x", n);
                let basis = BasisVector::construct_basis(
                    Representation::Monomial,
                    &vars,
                    d,
                    true,
                    true,
                )
                .unwrap();
                let expected = binomial((n + d) as u64, n as u64);
                assert_eq!(basis.len() as u64, expected, "n = {}, d = {}", n, d);
                // no duplicates, degrees within bound
                let unique: std::collections::BTreeSet<_> = basis.iter().collect();
                assert_eq!(unique.len(), basis.len());
                assert!(basis.iter().all(|v| v.degree() <= d));
            }
        }
    }

    #[test]
    fn basis_parity_filters() {
        let vars = Variable::multivariate("x", 2);
        let all =
            BasisVector::construct_basis(Representation::Chebyshev, &vars, 3, true, true).unwrap();
        let even =
            BasisVector::construct_basis(Representation::Chebyshev, &vars, 3, true, false).unwrap();
        let odd =
            BasisVector::construct_basis(Representation::Chebyshev, &vars, 3, false, true).unwrap();
        assert!(even.iter().all(|v| v.is_even()));
        assert!(odd.iter().all(|v| v.is_odd()));
        assert_eq!(even.len() + odd.len(), all.len());
    }

    #[test]
    fn basis_no_variables() {
        let basis =
            BasisVector::construct_basis(Representation::Monomial, &[], 4, true, true).unwrap();
        assert_eq!(basis, vec![BasisVector::one(Representation::Monomial)]);
    }

    #[test]
    fn basis_rejects_duplicates() {
        let x = Variable::new("x");
        let result = BasisVector::construct_basis(
            Representation::Monomial,
            &[x.clone(), x],
            2,
            true,
            true,
        );
        assert!(matches!(result, Err(PolynomialError::InvalidArgument(_))));
    }

    #[test]
    fn display() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let m = BasisVector::monomial(BTreeMap::from([(x.clone(), 1), (y.clone(), 2)]));
        assert_eq!(m.to_string(), "xy^{2}");
        let c = BasisVector::chebyshev(BTreeMap::from([(x, 3)]));
        assert_eq!(c.to_string(), "T_{3}(x)");
        assert_eq!(BasisVector::one(Representation::Monomial).to_string(), "1");
    }
}
