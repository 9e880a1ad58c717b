//! Actor-based check pipeline
//!
//! Each actor runs as an independent async task communicating via Tokio channels.
//!
//! ## Architecture Overview
//!
//! ```text
//!   PeriodicTrigger ──CheckTask──▶ CheckScheduler ──NotificationTask──▶ NotificationDispatcher
//!   (interval timer)               (N concurrent probes)                (1 send at a time)
//!                                        │                                     │
//!                                        ▼                                     ▼
//!                                  SiteStateStore                         Transport
//! ```
//!
//! ## Actor Types
//!
//! - **PeriodicTrigger**: submits every target immediately and then at a fixed cadence
//! - **CheckScheduler**: runs up to N probe routines at once, FIFO
//! - **NotificationDispatcher**: delivers alerts strictly one after the other, in order
//!
//! ## Communication Patterns
//!
//! 1. **Tasks**: bounded mpsc queues; a full queue makes the submitter wait
//! 2. **Commands**: each actor has a separate mpsc command channel for control messages
//! 3. **Request/Response**: oneshot channels for synchronous queries

pub mod messages;
pub mod notifier;
pub mod scheduler;
pub mod trigger;
