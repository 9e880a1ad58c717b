//! Message types for actor communication
//!
//! ## Design Principles
//!
//! 1. **Tasks**: units of work queued into a task channel (checks, notifications)
//! 2. **Commands**: control messages sent to an actor on its own channel, so they are not stuck
//!    behind queued work
//! 3. **Request/Response**: oneshot channels for callers that need to wait for an outcome

use std::time::Duration;

use tokio::sync::oneshot;

use crate::Target;

/// A single probe of a target
#[derive(Debug)]
pub struct CheckTask {
    pub target: Target,

    /// Signalled once the probe routine finished, whatever the outcome
    pub respond_to: Option<oneshot::Sender<()>>,
}

impl CheckTask {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            respond_to: None,
        }
    }
}

/// A fully rendered alert waiting for delivery
#[derive(Debug, Clone)]
pub struct NotificationTask {
    pub message: String,
}

/// Items on the notification queue
#[derive(Debug)]
pub enum NotifierMessage {
    Deliver(NotificationTask),

    /// Answered once everything queued before it has been attempted
    Flush { respond_to: oneshot::Sender<()> },
}

/// What happens to in-flight work on shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPolicy {
    /// Wait up to the grace period for in-flight work to finish
    Drain { grace: Duration },

    /// Stop right away and leave in-flight work detached
    Abandon,
}

/// Commands that can be sent to the CheckScheduler
#[derive(Debug)]
pub enum SchedulerCommand {
    /// Stop accepting checks; queued checks that have not started are discarded
    Shutdown {
        policy: ShutdownPolicy,
        respond_to: oneshot::Sender<()>,
    },
}

/// Commands that can be sent to the NotificationDispatcher
#[derive(Debug)]
pub enum NotifierCommand {
    GetStats {
        respond_to: oneshot::Sender<DispatchStats>,
    },

    /// Stop accepting messages; under `Drain` the queued ones are still delivered
    Shutdown {
        policy: ShutdownPolicy,
        respond_to: oneshot::Sender<()>,
    },
}

/// Delivery counters of the notification dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: u64,
    pub failed: u64,
}

/// Commands that can be sent to the PeriodicTrigger
#[derive(Debug)]
pub enum TriggerCommand {
    /// Enqueue a full pass right now, in addition to the regular cadence
    TriggerNow { respond_to: oneshot::Sender<()> },

    /// Stop the timer
    Shutdown { respond_to: oneshot::Sender<()> },
}
