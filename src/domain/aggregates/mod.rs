//! Aggregates module
pub mod user;
pub mod product;
pub mod cart;
pub mod order;
pub mod payment;

pub use user::{normalize_email, Role};
pub use product::{CategoryRef, CategoryRefError};
pub use cart::{availability, Availability};
pub use order::{order_total, OrderStatus};
pub use payment::PaymentStatus;
