//! Pure business logic: no I/O, fully unit-tested.

pub mod cart;
pub mod invoice;
pub mod payment;
pub mod report;
