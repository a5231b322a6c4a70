//! Monomial representation of a basis vector: v1^p1 * v2^p2 * ... * vn^pn.
//! The product of two monomials merges the power maps by summing exponents,
//! so it is always a single term with coefficient 1. Conversion to the
//! Chebyshev representation uses the binomial transform
//! x^p = 2^(1-p) * sum_j C(p, j) T_{p-2j}(x), with the T_0 term halved.

use crate::polynomials::basis_vector::{BasisVector, Representation};
use crate::polynomials::polynomial::Polynomial;
use crate::polynomials::variable::Variable;

/// C(n, k) as a float; exact for the small arguments used by the basis
/// transforms.
pub(crate) fn binomial(n: u32, k: u32) -> f64 {
    let mut result = 1.0;
    for i in 0..k.min(n - k) {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result
}

impl BasisVector {
    pub(crate) fn monomial_mul(&self, other: &BasisVector) -> Polynomial<f64> {
        let mut product = self.clone();
        for (variable, power) in other.iter() {
            product.set(variable, product.get(variable) + power);
        }
        Polynomial::from_term(product, 1.0)
    }

    pub(crate) fn monomial_derivative(&self, variable: &Variable) -> Polynomial<f64> {
        let power = self.get(variable);
        if power == 0 {
            return Polynomial::zero();
        }
        Polynomial::from_term(self.with_power(variable, power - 1), power as f64)
    }

    pub(crate) fn monomial_primitive(&self, variable: &Variable) -> Polynomial<f64> {
        let power = self.get(variable);
        Polynomial::from_term(
            self.with_power(variable, power + 1),
            1.0 / (power as f64 + 1.0),
        )
    }

    /// x^p = 2^(1-p) * sum_{j=0}^{floor(p/2)} C(p, j) T_{p-2j}(x), the j with
    /// p - 2j = 0 halved; multivariate by multiplying the per-variable
    /// expansions together.
    pub(crate) fn monomial_to_chebyshev(&self) -> Polynomial<f64> {
        let mut conversion = Polynomial::one(Representation::Chebyshev);
        for (variable, power) in self.iter() {
            let mut univariate = Polynomial::zero();
            let scale = 0.5_f64.powi(power as i32 - 1);
            for j in 0..=power / 2 {
                let k = power - 2 * j;
                let mut coefficient = binomial(power, j) * scale;
                if k == 0 {
                    coefficient /= 2.0;
                }
                let term = BasisVector::univariate(Representation::Chebyshev, variable, k);
                univariate = univariate
                    .add(&Polynomial::from_term(term, coefficient))
                    .expect("univariate conversion terms share a representation");
            }
            conversion = conversion
                .mul(&univariate)
                .expect("univariate conversion factors share a representation");
        }
        conversion
    }
}

//___________________________________TESTS____________________________________
