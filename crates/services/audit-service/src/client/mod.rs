//! Downstream clients.

mod fake_forwarder;

pub use fake_forwarder::FakeForwarder;
