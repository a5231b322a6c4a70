//! # Chebyshev representation
//!
//! A Chebyshev basis vector is a product of Chebyshev polynomials of the
//! first kind, T_p1(v1) * T_p2(v2) * ... * T_pn(vn), one factor per variable
//! with non-zero power (T_0 = 1 factors are never stored).
//!
//! The algebra of this representation does not stay inside single terms:
//!
//! - the product uses T_a T_b = (T_{a+b} + T_{|a-b|}) / 2 per shared
//!   variable, and the multivariate product is the Cartesian combination of
//!   the per-variable expansions;
//! - the derivative of T_p reduces to a finite sum of T_q of the opposite
//!   parity, q < p;
//! - the antiderivative of T_p is a two-term combination of T_{p-1} and
//!   T_{p+1} (with the special cases p = 0 and p = 1).
//!
//! Evaluation uses the three-term recurrence T_0 = 1, T_1 = x,
//! T_{k+1} = 2 x T_k - T_{k-1} for every argument, including |x| > 1 where
//! it reproduces the cosh-based continuation of T_p.

use itertools::Itertools;

use crate::polynomials::basis_vector::{BasisVector, Representation};
use crate::polynomials::polynomial::Polynomial;
use crate::polynomials::variable::Variable;

/// T_p(x) by the three-term recurrence.
pub fn chebyshev_eval(power: u32, x: f64) -> f64 {
    if power == 0 {
        return 1.0;
    }
    let mut t_prev = 1.0;
    let mut t = x;
    for _ in 1..power {
        (t_prev, t) = (t, 2.0 * x * t - t_prev);
    }
    t
}

impl BasisVector {
    /// Product-to-sum expansion. For each variable where both powers are
    /// non-zero the identity contributes the pair (T_{a+b}, T_{|a-b|}) with
    /// factor 1/2 each; where either power is 0 it degenerates to the single
    /// term T_{a+b} with factor 1. The coefficient of every expanded term is
    /// the product of its per-variable factors.
    pub(crate) fn chebyshev_mul(&self, other: &BasisVector) -> Polynomial<f64> {
        let variables: Vec<Variable> = {
            let mut vs = self.variables();
            vs.extend(other.variables());
            vs.into_iter().sorted().dedup().collect()
        };
        if variables.is_empty() {
            return Polynomial::one(Representation::Chebyshev);
        }
        let expansions: Vec<Vec<(u32, f64)>> = variables
            .iter()
            .map(|v| {
                let (a, b) = (self.get(v), other.get(v));
                if a == 0 || b == 0 {
                    vec![(a + b, 1.0)]
                } else {
                    vec![(a + b, 0.5), (a.abs_diff(b), 0.5)]
                }
            })
            .collect();
        let mut product = Polynomial::zero();
        for combination in expansions.iter().multi_cartesian_product() {
            let mut vector = BasisVector::one(Representation::Chebyshev);
            let mut coefficient = 1.0;
            for (variable, (power, factor)) in variables.iter().zip(combination) {
                vector.set(variable, *power);
                coefficient *= factor;
            }
            product.add_assign_term(vector, coefficient);
        }
        product
    }

    /// d/dv T_p(v): zero for p = 0; otherwise T_0 contributes p when p is
    /// odd, and every T_q with 0 < q < p of the parity opposite to p
    /// contributes 2p.
    pub(crate) fn chebyshev_derivative(&self, variable: &Variable) -> Polynomial<f64> {
        let p = self.get(variable);
        let mut derivative = Polynomial::zero();
        for q in 0..p {
            if (p % 2 == 1) != (q % 2 == 1) {
                let coefficient = if q == 0 { p as f64 } else { 2.0 * p as f64 };
                derivative.add_assign_term(self.with_power(variable, q), coefficient);
            }
        }
        derivative
    }

    /// Antiderivative of T_p(v) in v:
    /// p = 0 -> T_1; p = 1 -> T_0/4 + T_2/4;
    /// p > 1 -> T_{p-1} / (2(1-p)) + T_{p+1} / (2(p+1)).
    pub(crate) fn chebyshev_primitive(&self, variable: &Variable) -> Polynomial<f64> {
        let p = self.get(variable);
        let mut primitive = Polynomial::zero();
        match p {
            0 => primitive.add_assign_term(self.with_power(variable, 1), 1.0),
            1 => {
                primitive.add_assign_term(self.with_power(variable, 0), 0.25);
                primitive.add_assign_term(self.with_power(variable, 2), 0.25);
            }
            _ => {
                let p = p as f64;
                primitive.add_assign_term(
                    self.with_power(variable, p as u32 - 1),
                    0.5 / (1.0 - p),
                );
                primitive.add_assign_term(
                    self.with_power(variable, p as u32 + 1),
                    0.5 / (p + 1.0),
                );
            }
        }
        primitive
    }

    /// Re-expresses the product of T_p factors in the monomial basis by
    /// building each univariate T_p(v) with the three-term recurrence in
    /// polynomial arithmetic and multiplying the factors together.
    pub(crate) fn chebyshev_to_monomial(&self) -> Polynomial<f64> {
        let mut conversion = Polynomial::one(Representation::Monomial);
        for (variable, power) in self.iter() {
            conversion = conversion
                .mul(&chebyshev_to_monomial_univariate(variable, power))
                .expect("univariate conversion factors share a representation");
        }
        conversion
    }
}

fn chebyshev_to_monomial_univariate(variable: &Variable, power: u32) -> Polynomial<f64> {
    let x = Polynomial::from_term(
        BasisVector::univariate(Representation::Monomial, variable, 1),
        1.0,
    );
    let mut t_prev = Polynomial::one(Representation::Monomial);
    if power == 0 {
        return t_prev;
    }
    let mut t = x.clone();
    for _ in 1..power {
        let t_next = x
            .mul(&t)
            .expect("recurrence terms share a representation")
            .scale(2.0)
            .sub(&t_prev)
            .expect("recurrence terms share a representation");
        (t_prev, t) = (t, t_next);
    }
    t
}

//___________________________________TESTS____________________________________
