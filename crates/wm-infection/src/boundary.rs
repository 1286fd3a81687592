//! The per-domain boundary rule itself (spec §4.6's "Boundary rule
//! (per-domain)"). Runs once a `match`'s row discharge is known (see
//! `wm_coverage::RowDischarge`), at a function return position.

use wm_common::HoleMode;

use crate::registry::InfectionDomain;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryVerdict {
    Ok,
    /// The caller should emit `infectious_call_result_mismatch`.
    Violated,
}

/// Checks whether a function boundary may let `remaining_row_labels` escape,
/// given the domain's rule and whether the declared/inferred return type is
/// itself a carrier of that domain.
///
/// - `error`/`taint`: escaping labels are fine only if the return type is a
///   carrier (e.g. `Result<_, _>`).
/// - `mem`: no obligation may remain, full stop — there is no carrier type
///   that launders a `MustClose`/`MustEnd` obligation away.
/// - `hole`: governed by `hole_mode` instead of the row at all.
#[must_use]
pub fn check_function_boundary(
    domain: InfectionDomain,
    remaining_row_labels: &[String],
    return_type_is_carrier: bool,
    hole_mode: HoleMode,
    has_unresolved_holes: bool,
) -> BoundaryVerdict {
    match domain {
        InfectionDomain::Hole => {
            if has_unresolved_holes && hole_mode == HoleMode::Strict {
                BoundaryVerdict::Violated
            } else {
                BoundaryVerdict::Ok
            }
        }
        InfectionDomain::Mem => {
            if remaining_row_labels.is_empty() {
                BoundaryVerdict::Ok
            } else {
                BoundaryVerdict::Violated
            }
        }
        InfectionDomain::Error | InfectionDomain::Taint => {
            if remaining_row_labels.is_empty() || return_type_is_carrier {
                BoundaryVerdict::Ok
            } else {
                BoundaryVerdict::Violated
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_domain_allows_a_remaining_row_when_the_return_type_is_a_carrier() {
        let verdict = check_function_boundary(
            InfectionDomain::Error,
            &["Missing".to_string()],
            true,
            HoleMode::Permissive,
            false,
        );
        assert_eq!(verdict, BoundaryVerdict::Ok);
    }

    #[test]
    fn error_domain_rejects_a_remaining_row_without_a_carrier_return_type() {
        let verdict = check_function_boundary(
            InfectionDomain::Error,
            &["Missing".to_string()],
            false,
            HoleMode::Permissive,
            false,
        );
        assert_eq!(verdict, BoundaryVerdict::Violated);
    }

    #[test]
    fn mem_domain_never_tolerates_a_remaining_obligation() {
        let verdict = check_function_boundary(
            InfectionDomain::Mem,
            &["MustClose".to_string()],
            true,
            HoleMode::Permissive,
            false,
        );
        assert_eq!(verdict, BoundaryVerdict::Violated);
    }

    #[test]
    fn hole_domain_only_fires_in_strict_mode() {
        let permissive =
            check_function_boundary(InfectionDomain::Hole, &[], false, HoleMode::Permissive, true);
        assert_eq!(permissive, BoundaryVerdict::Ok);
        let strict = check_function_boundary(InfectionDomain::Hole, &[], false, HoleMode::Strict, true);
        assert_eq!(strict, BoundaryVerdict::Violated);
    }
}
