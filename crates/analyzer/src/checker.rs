//! Event-stream lifecycle state machine (spec §4.9): `Unseen -> Submitted ->
//! Scheduled(lane) -> Done`, no backward transitions, halt on first
//! violation. Grounded in `original_source/runner/analyze.py`'s
//! `check_consistency`, which this follows rule-for-rule.

use core::fmt;

use hashbrown::{HashMap, HashSet};

use contend_core::set::ExactSet;
use contend_core::transaction::{compatible, Transaction};

use contend_parser::event_log::Event;

/// One rule in spec §4.9 broken, with the offending transaction id.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    SubmittedTwice(u64),
    ScheduledWithoutSubmit(u64),
    ScheduledTwice(u64),
    LaneOutOfRange { id: u64, lane: u64, num_lanes: u64 },
    Conflict(u64),
    DoneWithoutSchedule(u64),
    DoneTwice(u64),
    DoneNotActive(u64),
    LaneMismatchOnDone { id: u64, scheduled_lane: u64, done_lane: u64 },
    SubmittedNeverScheduled(u64),
    ScheduledNeverDone(u64),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubmittedTwice(id) => write!(f, "Transaction {id} submitted more than once"),
            Self::ScheduledWithoutSubmit(id) => {
                write!(f, "Transaction {id} scheduled without being submitted first")
            }
            Self::ScheduledTwice(id) => write!(f, "Transaction {id} scheduled more than once"),
            Self::LaneOutOfRange { id, lane, num_lanes } => {
                write!(f, "Lane {lane} out of valid range [0, {num_lanes}) at txn {id}")
            }
            Self::Conflict(id) => write!(f, "Conflict detected when scheduling txn {id}"),
            Self::DoneWithoutSchedule(id) => {
                write!(f, "Transaction {id} completed without being scheduled first")
            }
            Self::DoneTwice(id) => write!(f, "Transaction {id} completed more than once"),
            Self::DoneNotActive(id) => write!(f, "Transaction {id} done but not in active set"),
            Self::LaneMismatchOnDone { id, scheduled_lane, done_lane } => {
                write!(f, "Lane mismatch on done for txn {id}: scheduled on {scheduled_lane}, done on {done_lane}")
            }
            Self::SubmittedNeverScheduled(id) => write!(f, "Transaction {id} submitted but never scheduled"),
            Self::ScheduledNeverDone(id) => write!(f, "Transaction {id} scheduled but never completed"),
        }
    }
}

impl std::error::Error for Error {}

/// Everything the metrics aggregator needs, recorded while replaying the
/// event stream in order.
#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub submit_times: HashMap<u64, f64>,
    pub schedule_times: HashMap<u64, f64>,
    pub done_times: HashMap<u64, f64>,
    pub recv_times: HashMap<u64, f64>,
    pub cleanup_times: HashMap<u64, f64>,
    pub scheduled_lane: HashMap<u64, u64>,
    /// Busy seconds per lane, indexed `0..num_lanes`.
    pub lane_busy_time: Vec<f64>,
    pub first_submit_time: Option<f64>,
    pub last_done_time: Option<f64>,
}

/// Replay `events` against `txn_map`, enforcing the lifecycle state machine
/// and the no-overlap-conflict invariant (spec §4.9, §8 invariant 7).
///
/// `recv`/`cleanup` events are timestamped but never gate legality (spec §9
/// Open Question resolution): they exist purely for the metrics aggregator's
/// five-stage breakdown.
///
/// # Errors
///
/// Returns the first [`Error`] encountered, in event order.
pub fn check_consistency(
    txn_map: &HashMap<u64, Transaction<ExactSet>>,
    events: &[Event],
    num_lanes: u64,
) -> Result<CheckResult, Error> {
    let mut submitted: HashSet<u64> = HashSet::new();
    let mut scheduled: HashSet<u64> = HashSet::new();
    let mut done: HashSet<u64> = HashSet::new();

    let mut active: HashMap<u64, u64> = HashMap::new(); // txn id -> lane
    let mut result = CheckResult {
        lane_busy_time: vec![0.0; num_lanes as usize],
        ..CheckResult::default()
    };

    tracing::debug!(num_events = events.len(), num_lanes, "replaying event log");

    for event in events {
        match *event {
            Event::Submit { time, id, .. } => {
                if submitted.contains(&id) {
                    return Err(Error::SubmittedTwice(id));
                }
                submitted.insert(id);
                result.submit_times.insert(id, time);
                result.first_submit_time = Some(result.first_submit_time.map_or(time, |t: f64| t.min(time)));
            }
            Event::Scheduled { time, id, lane } => {
                if !submitted.contains(&id) {
                    return Err(Error::ScheduledWithoutSubmit(id));
                }
                if scheduled.contains(&id) {
                    return Err(Error::ScheduledTwice(id));
                }
                if lane >= num_lanes {
                    return Err(Error::LaneOutOfRange { id, lane, num_lanes });
                }

                let incoming = txn_map.get(&id).expect("scheduled txn must appear in transactions file");
                for &other_id in active.keys() {
                    let other = txn_map.get(&other_id).expect("active txn must appear in transactions file");
                    if !compatible(incoming, other).expect("exact-set compatible never fails") {
                        tracing::debug!(txn_id = id, conflicting_with = other_id, "conflict on scheduling");
                        return Err(Error::Conflict(id));
                    }
                }

                active.insert(id, lane);
                scheduled.insert(id);
                result.schedule_times.insert(id, time);
                result.scheduled_lane.insert(id, lane);
            }
            Event::Done { time, id, lane } => {
                if !scheduled.contains(&id) {
                    return Err(Error::DoneWithoutSchedule(id));
                }
                if done.contains(&id) {
                    return Err(Error::DoneTwice(id));
                }
                let Some(&scheduled_lane) = active.get(&id) else {
                    return Err(Error::DoneNotActive(id));
                };
                if scheduled_lane != lane {
                    return Err(Error::LaneMismatchOnDone { id, scheduled_lane, done_lane: lane });
                }

                let start_time = result.schedule_times[&id];
                result.lane_busy_time[lane as usize] += time - start_time;

                done.insert(id);
                result.done_times.insert(id, time);
                active.remove(&id);
                result.last_done_time = Some(result.last_done_time.map_or(time, |t: f64| t.max(time)));
            }
            Event::Recv { time, id } => {
                result.recv_times.insert(id, time);
            }
            Event::Cleanup { time, id } => {
                result.cleanup_times.insert(id, time);
            }
        }
    }

    for &id in &submitted {
        if !scheduled.contains(&id) {
            return Err(Error::SubmittedNeverScheduled(id));
        }
    }
    for &id in &scheduled {
        if !done.contains(&id) {
            return Err(Error::ScheduledNeverDone(id));
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contend_core::set::ExactSet;

    fn txn(id: u64, reads: &[u64], writes: &[u64]) -> Transaction<ExactSet> {
        Transaction::singleton(
            id,
            ExactSet::from_iter(reads.iter().copied()),
            ExactSet::from_iter(writes.iter().copied()),
        )
    }

    #[test]
    fn s5_happy_path_two_disjoint_txns() {
        let txn_map: HashMap<u64, Transaction<ExactSet>> =
            [(0, txn(0, &[], &[1])), (1, txn(1, &[], &[2]))].into_iter().collect();
        let events = vec![
            Event::Submit { time: 0.0, id: 0, aux: None },
            Event::Submit { time: 0.0, id: 1, aux: None },
            Event::Scheduled { time: 1.0, id: 0, lane: 0 },
            Event::Scheduled { time: 1.0, id: 1, lane: 1 },
            Event::Done { time: 2.0, id: 0, lane: 0 },
            Event::Done { time: 3.0, id: 1, lane: 1 },
        ];
        let result = check_consistency(&txn_map, &events, 2).unwrap();
        assert_eq!(result.lane_busy_time, vec![1.0, 2.0]);
        assert_eq!(result.first_submit_time, Some(0.0));
        assert_eq!(result.last_done_time, Some(3.0));
    }

    #[test]
    fn s6_concurrent_write_write_conflict_is_rejected() {
        let txn_map: HashMap<u64, Transaction<ExactSet>> =
            [(0, txn(0, &[], &[42])), (1, txn(1, &[], &[42]))].into_iter().collect();
        let events = vec![
            Event::Submit { time: 0.0, id: 0, aux: None },
            Event::Submit { time: 0.0, id: 1, aux: None },
            Event::Scheduled { time: 1.0, id: 0, lane: 0 },
            Event::Scheduled { time: 1.0, id: 1, lane: 1 },
        ];
        let err = check_consistency(&txn_map, &events, 2).unwrap_err();
        assert_eq!(err, Error::Conflict(1));
        assert_eq!(err.to_string(), "Conflict detected when scheduling txn 1");
    }

    #[test]
    fn rejects_double_submit() {
        let txn_map: HashMap<u64, Transaction<ExactSet>> = [(0, txn(0, &[], &[1]))].into_iter().collect();
        let events = vec![
            Event::Submit { time: 0.0, id: 0, aux: None },
            Event::Submit { time: 1.0, id: 0, aux: None },
        ];
        assert_eq!(check_consistency(&txn_map, &events, 1).unwrap_err(), Error::SubmittedTwice(0));
    }

    #[test]
    fn rejects_lifecycle_completeness_violation() {
        let txn_map: HashMap<u64, Transaction<ExactSet>> = [(0, txn(0, &[], &[1]))].into_iter().collect();
        let events = vec![Event::Submit { time: 0.0, id: 0, aux: None }];
        assert_eq!(check_consistency(&txn_map, &events, 1).unwrap_err(), Error::SubmittedNeverScheduled(0));
    }

    #[test]
    fn recv_and_cleanup_are_timestamped_but_never_gate_legality() {
        let txn_map: HashMap<u64, Transaction<ExactSet>> = [(0, txn(0, &[], &[1]))].into_iter().collect();
        let events = vec![
            Event::Submit { time: 0.0, id: 0, aux: None },
            Event::Scheduled { time: 1.0, id: 0, lane: 0 },
            Event::Recv { time: 1.5, id: 0 },
            Event::Done { time: 2.0, id: 0, lane: 0 },
            Event::Cleanup { time: 2.5, id: 0 },
        ];
        let result = check_consistency(&txn_map, &events, 1).unwrap();
        assert_eq!(result.recv_times[&0], 1.5);
        assert_eq!(result.cleanup_times[&0], 2.5);
    }
}
