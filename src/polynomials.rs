#![allow(non_snake_case)]
/// Symbolic variables: named, optionally indexed, totally ordered, usable as
/// map keys everywhere in the crate.
///
/// # Example
/// ```
/// use RustedSOS::polynomials::variable::Variable;
/// let x = Variable::new("x");
/// let q = Variable::multivariate("q", 3);
/// assert_eq!(q[0].to_string(), "q_{1}");
/// assert!(q[0] < q[1]);
/// ```
pub mod variable;
///____________________________________________________________________________
/// # Basis vectors
/// One elementary term of a polynomial basis: a mapping from variables to
/// positive powers, tagged with its representation. `Monomial` reads the map
/// as x1^p1 * x2^p2 * ..., `Chebyshev` as T_p1(x1) * T_p2(x2) * ... .
/// Products, derivatives and antiderivatives of basis vectors are polynomials,
/// since in the Chebyshev representation they do not stay single terms.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use RustedSOS::polynomials::basis_vector::{BasisVector, Representation};
/// use RustedSOS::polynomials::variable::Variable;
///
/// let x = Variable::new("x");
/// let v = BasisVector::monomial(BTreeMap::from([(x.clone(), 3)]));
/// assert_eq!(v.degree(), 3);
/// assert!(v.is_odd());
///
/// // all monomials in x of degree <= 2: [1, x, x^2]
/// let basis = BasisVector::construct_basis(
///     Representation::Monomial, &[x], 2, true, true).unwrap();
/// assert_eq!(basis.len(), 3);
/// ```
pub mod basis_vector;
/// Power-product (monomial) representation: evaluation, product by exponent
/// sum, derivative/antiderivative, and the univariate x^p -> Chebyshev
/// transform.
pub mod monomial_vector;
/// Chebyshev-of-the-first-kind representation: three-term-recurrence
/// evaluation, the product-to-sum expansion T_a T_b = (T_{a+b} + T_{|a-b|})/2,
/// the derivative and antiderivative recursions, and conversion back to the
/// power basis.
pub mod chebyshev_vector;
/// The coefficient abstraction: plain `f64` or an affine expression over
/// opaque solver decision variables. Pruning goes through a single
/// `is_probably_zero` predicate so symbolic coefficients are never dropped.
pub mod coefficient;
///____________________________________________________________________________
/// # Polynomial ring and calculus
/// A polynomial is a coefficient-indexed combination of basis vectors of one
/// representation. Ring operations, differentiation, integration, full and
/// partial evaluation, quadratic forms and basis conversion.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use RustedSOS::polynomials::basis_vector::BasisVector;
/// use RustedSOS::polynomials::polynomial::Polynomial;
/// use RustedSOS::polynomials::variable::Variable;
///
/// let x = Variable::new("x");
/// let x2 = BasisVector::monomial(BTreeMap::from([(x.clone(), 2)]));
/// // p = 3 x^2
/// let p = Polynomial::from_term(x2, 3.0);
/// // dp/dx = 6 x
/// let dp = p.derivative(&x);
/// assert_eq!(dp.degree(), 1);
/// assert_eq!(dp.to_string(), "6x");
/// let point = BTreeMap::from([(x.clone(), 2.0)]);
/// assert_eq!(p.evaluate(&point).unwrap(), 12.0);
/// ```
pub mod polynomial;
