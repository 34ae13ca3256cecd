pub mod appointment;
pub mod customer;
pub mod payment_event;
pub mod shop;
pub mod subscription;
