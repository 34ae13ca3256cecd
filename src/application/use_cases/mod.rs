pub mod appointment;
pub mod loyalty;
pub mod payment_webhook;
pub mod shop;
pub mod subscription_lifecycle;
