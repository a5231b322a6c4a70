#![allow(non_snake_case)]
/// Contract consumed from an external convex solver: free scalar decision
/// variables, symmetric PSD matrix variables, linear equality constraints, a
/// linear objective, and value read-back after the solve. The core never
/// depends on a specific solver beyond "solved" vs "failed to solve".
pub mod solver_api;
///____________________________________________________________________________
/// # SOS program
/// Turns a sum-of-squares certificate requirement on a target polynomial into
/// linear and PSD constraints for a solver backend: candidate basis of half
/// the target degree, one Gram matrix (or two, when the target is even and
/// the basis splits by parity), and one linear equality per matched
/// coefficient of `target - b' Q b`.
pub mod sos_program;
