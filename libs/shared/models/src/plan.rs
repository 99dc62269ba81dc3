use serde::{Deserialize, Serialize};

/// Per-plan resource ceilings. A limit of -1 means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub patients: i64,
    pub dentists: i64,
    pub rooms: i64,
    pub online_booking: bool,
}

impl PlanLimits {
    /// Limits for a stored plan name. Unknown or missing plans get the
    /// basic tier, which is also what trialing clinics run under.
    pub fn for_plan(plan: Option<&str>) -> Self {
        match plan {
            Some("premium") => Self {
                patients: 500,
                dentists: 5,
                rooms: 3,
                online_booking: true,
            },
            Some("enterprise") => Self {
                patients: -1,
                dentists: -1,
                rooms: -1,
                online_booking: true,
            },
            _ => Self {
                patients: 100,
                dentists: 2,
                rooms: 2,
                online_booking: false,
            },
        }
    }

    pub fn allows(limit: i64, current: i64) -> bool {
        limit < 0 || current < limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_plans_fall_back_to_basic() {
        assert_eq!(PlanLimits::for_plan(None), PlanLimits::for_plan(Some("basic")));
        assert_eq!(
            PlanLimits::for_plan(Some("something-else")),
            PlanLimits::for_plan(Some("basic"))
        );
        assert!(!PlanLimits::for_plan(None).online_booking);
    }

    #[test]
    fn test_negative_limit_means_unlimited() {
        assert!(PlanLimits::allows(-1, 10_000));
        assert!(PlanLimits::allows(2, 1));
        assert!(!PlanLimits::allows(2, 2));
    }
}
