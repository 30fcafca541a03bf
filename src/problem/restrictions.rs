use std::collections::HashMap;

use super::{ConstraintHandle, Problem, ProblemError};

/// Families of constraints whose right-hand side is updated per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestrictionKind {
    Level,
    Forbidden,
    Locked,
    LockedAlias,
    StatTotal,
    MinimumStat,
    AdvancedMinimum,
    StatPointCap,
    StatPointFill,
    StatPointBudget,
}

/// Index of mutable constraints keyed by family and a family-specific key.
#[derive(Debug, Clone, Default)]
pub struct Restrictions {
    handles: HashMap<(RestrictionKind, String), ConstraintHandle>,
}

impl Restrictions {
    pub fn new() -> Self {
        Restrictions::default()
    }

    pub fn insert(&mut self, kind: RestrictionKind, key: impl ToString, handle: ConstraintHandle) {
        self.handles.insert((kind, key.to_string()), handle);
    }

    pub fn get(&self, kind: RestrictionKind, key: &str) -> Option<ConstraintHandle> {
        self.handles.get(&(kind, key.to_string())).copied()
    }

    pub fn require(&self, kind: RestrictionKind, key: &str) -> Result<ConstraintHandle, ProblemError> {
        self.get(kind, key)
            .ok_or_else(|| ProblemError::UnknownRestriction(kind, key.to_string()))
    }

    pub fn set_rhs(
        &self,
        problem: &mut Problem,
        kind: RestrictionKind,
        key: &str,
        rhs: f64,
    ) -> Result<(), ProblemError> {
        let handle = self.require(kind, key)?;
        problem.set_rhs(handle, rhs);
        Ok(())
    }

    /// Keys registered for one family.
    pub fn keys(&self, kind: RestrictionKind) -> impl Iterator<Item = &str> {
        self.handles
            .keys()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, key)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::term;

    #[test]
    fn test_set_rhs_through_index() {
        let mut problem = Problem::new();
        problem.declare_variable("p", 7, Some(0), Some(1)).unwrap();
        let handle = problem.constrain_le(0.0, vec![term(1.0, "p", 7)]).unwrap();

        let mut restrictions = Restrictions::new();
        restrictions.insert(RestrictionKind::Level, 7, handle);
        restrictions
            .set_rhs(&mut problem, RestrictionKind::Level, "7", 1.0)
            .unwrap();
        assert_eq!(problem.rhs(handle), 1.0);
        assert_eq!(restrictions.keys(RestrictionKind::Level).count(), 1);
    }

    #[test]
    fn test_require_unknown_key_fails() {
        let restrictions = Restrictions::new();
        assert!(matches!(
            restrictions.require(RestrictionKind::Forbidden, "3"),
            Err(ProblemError::UnknownRestriction(RestrictionKind::Forbidden, _))
        ));
    }
}
