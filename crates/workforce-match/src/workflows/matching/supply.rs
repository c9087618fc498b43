use tracing::debug;

use super::domain::{Candidate, CandidateStatus};
use super::temporal::{DayWindow, FlexibleDate, PassClock};

/// Whether a candidate can be offered for upcoming work: free now, or finishing their
/// current job inside `window` days of the pass clock.
pub fn is_supply(candidate: &Candidate, clock: &PassClock, window: DayWindow) -> bool {
    if candidate.status == CandidateStatus::Available {
        return true;
    }

    match &candidate.finish_date {
        Some(FlexibleDate::Valid(finish)) => window.contains(clock.days_until(*finish)),
        Some(FlexibleDate::Invalid(raw)) => {
            debug!(candidate = %candidate.id, finish_date = %raw, "ignoring unparseable finish date");
            false
        }
        None => false,
    }
}

/// Filter the pool down to candidates eligible for any demand. Input order is preserved.
pub fn eligible_supply<'a>(
    candidates: &'a [Candidate],
    clock: &PassClock,
    window: DayWindow,
) -> Vec<&'a Candidate> {
    candidates
        .iter()
        .filter(|candidate| is_supply(candidate, clock, window))
        .collect()
}
