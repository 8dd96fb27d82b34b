//! SeaORM entity definitions.

pub mod audit_event;
