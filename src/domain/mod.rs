//! Domain types shared by the connector and its adapters.

pub mod credentials;
pub mod outcome;
pub mod ports;
pub mod transaction;
