//! Node health classification, per the liveness rules of
//! [BEP_0005](https://www.bittorrent.org/beps/bep_0005.html).
//!
//! A node is:
//! - **Good** if it responded to one of our queries within the last 15 minutes,
//!   or it responded to us at some point and sent us a query within the last 15 minutes.
//! - **Bad** if it failed to respond to multiple queries in a row.
//! - **Questionable** otherwise, and should be pinged before being trusted.
//!
//! All functions here are pure, callers pass the current time explicitly.

use std::time::{Duration, Instant};

/// Default window within which a response or query keeps a node good.
pub const DEFAULT_GOOD_WINDOW: Duration = Duration::from_secs(15 * 60);
/// Default number of consecutive failed requests after which a node is bad.
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Thresholds used to classify nodes.
pub struct HealthPolicy {
    /// How recent a response (or a query from a node that responded before)
    /// must be for the node to be good.
    ///
    /// Defaults to [DEFAULT_GOOD_WINDOW]
    pub good_window: Duration,
    /// Number of consecutive failures that makes a node bad.
    ///
    /// Defaults to [DEFAULT_MAX_CONSECUTIVE_FAILURES]
    pub max_consecutive_failures: u32,
    /// Consider nodes whose id is not valid for their IP as bad, see
    /// [BEP_0042](https://www.bittorrent.org/beps/bep_0042.html).
    ///
    /// Defaults to `false`
    pub require_secure_id: bool,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            good_window: DEFAULT_GOOD_WINDOW,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            require_secure_id: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Liveness fields of a [crate::Node] at a point in time.
pub struct NodeActivity {
    pub last_query_received_at: Option<Instant>,
    pub last_response_received_at: Option<Instant>,
    pub consecutive_failures: u32,
    /// Whether the node's id is valid for its IP.
    pub secure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Good,
    Questionable,
    Bad,
}

/// Classify a node, every node is in exactly one state.
pub fn health(activity: &NodeActivity, now: Instant, policy: &HealthPolicy) -> Health {
    if is_bad(activity, policy) {
        Health::Bad
    } else if is_good(activity, now, policy) {
        Health::Good
    } else {
        Health::Questionable
    }
}

pub fn is_good(activity: &NodeActivity, now: Instant, policy: &HealthPolicy) -> bool {
    if is_bad(activity, policy) {
        return false;
    }

    let within = |at: Option<Instant>| {
        at.map_or(false, |at| {
            now.saturating_duration_since(at) < policy.good_window
        })
    };

    within(activity.last_response_received_at)
        || (activity.last_response_received_at.is_some()
            && within(activity.last_query_received_at))
}

pub fn is_bad(activity: &NodeActivity, policy: &HealthPolicy) -> bool {
    activity.consecutive_failures >= policy.max_consecutive_failures
        || (policy.require_secure_id && !activity.secure)
}

pub fn is_questionable(activity: &NodeActivity, now: Instant, policy: &HealthPolicy) -> bool {
    !is_good(activity, now, policy) && !is_bad(activity, policy)
}
