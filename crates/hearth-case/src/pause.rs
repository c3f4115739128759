//! The stop-before-mutate protocol.
//!
//! Boundary files must never be patched while the solver holds them, and
//! a decomposed run only exposes the current state after reconstruction.
//! `paused` wraps a mutation in that protocol and resumes the run
//! afterwards when it interrupted one.

use hearth_core::{CaseError, FieldKind};

/// The run-control surface the protocol drives. Implemented by the
/// controller; small enough to double in tests.
pub(crate) trait RunControl {
    fn is_running(&self) -> bool;
    fn halt(&self) -> Result<(), CaseError>;
    fn resume(&self) -> Result<(), CaseError>;
    /// Whether results currently live in processor directories only.
    fn needs_reconstruct(&self) -> bool;
    /// Pull the named fields of one region out of the processor dirs.
    fn reconstruct_fields(&self, region: &str, fields: &[FieldKind]) -> Result<(), CaseError>;
}

/// Run `mutate` with the solver stopped, then restore the previous
/// running state.
pub(crate) fn paused<C, F, T>(
    control: &C,
    region: &str,
    fields: &[FieldKind],
    mutate: F,
) -> Result<T, CaseError>
where
    C: RunControl,
    F: FnOnce() -> Result<T, CaseError>,
{
    let was_running = control.is_running();
    if was_running {
        control.halt()?;
    }
    if control.needs_reconstruct() {
        control.reconstruct_fields(region, fields)?;
    }
    let out = mutate()?;
    if was_running {
        control.resume()?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Double {
        running: RefCell<bool>,
        decomposed: bool,
        running_at_mutation: RefCell<Option<bool>>,
        reconstructed: RefCell<Vec<(String, Vec<FieldKind>)>>,
        resumes: RefCell<usize>,
    }

    impl RunControl for Double {
        fn is_running(&self) -> bool {
            *self.running.borrow()
        }
        fn halt(&self) -> Result<(), CaseError> {
            *self.running.borrow_mut() = false;
            Ok(())
        }
        fn resume(&self) -> Result<(), CaseError> {
            *self.running.borrow_mut() = true;
            *self.resumes.borrow_mut() += 1;
            Ok(())
        }
        fn needs_reconstruct(&self) -> bool {
            self.decomposed
        }
        fn reconstruct_fields(
            &self,
            region: &str,
            fields: &[FieldKind],
        ) -> Result<(), CaseError> {
            self.reconstructed
                .borrow_mut()
                .push((region.to_string(), fields.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn mutation_sees_a_stopped_case_and_resumes_it() {
        let double = Double::default();
        *double.running.borrow_mut() = true;
        paused(&double, "fluid", &[FieldKind::T], || {
            *double.running_at_mutation.borrow_mut() = Some(double.is_running());
            Ok(())
        })
        .unwrap();
        assert_eq!(*double.running_at_mutation.borrow(), Some(false));
        assert!(double.is_running());
        assert_eq!(*double.resumes.borrow(), 1);
    }

    #[test]
    fn a_stopped_case_stays_stopped() {
        let double = Double::default();
        paused(&double, "fluid", &[FieldKind::T], || Ok(())).unwrap();
        assert!(!double.is_running());
        assert_eq!(*double.resumes.borrow(), 0);
    }

    #[test]
    fn decomposed_results_are_reconstructed_first() {
        let double = Double {
            decomposed: true,
            ..Double::default()
        };
        paused(&double, "fluid", &[FieldKind::T, FieldKind::U], || Ok(())).unwrap();
        assert_eq!(
            *double.reconstructed.borrow(),
            [("fluid".to_string(), vec![FieldKind::T, FieldKind::U])]
        );
    }

    #[test]
    fn a_failing_mutation_does_not_resume() {
        let double = Double::default();
        *double.running.borrow_mut() = true;
        let result: Result<(), CaseError> = paused(&double, "fluid", &[], || {
            Err(CaseError::BadState {
                reason: "boom".into(),
            })
        });
        assert!(result.is_err());
        assert_eq!(*double.resumes.borrow(), 0);
    }
}
