//! Application core: port traits, application events and the
//! [`Station`](service::Station) orchestrator.
//!
//! Nothing in here touches hardware, files or sockets directly; every
//! side effect goes through a trait in [`ports`].

pub mod events;
pub mod ports;
pub mod service;
