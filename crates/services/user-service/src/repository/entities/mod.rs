//! SeaORM entity definitions.

pub mod user;
pub mod user_attribute;
