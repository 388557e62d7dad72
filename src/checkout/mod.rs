//! Checkout method selection and execution

pub mod engine;
pub mod fallback;
pub mod fetch;
pub mod method;
pub mod primitives;
pub mod selector;
pub mod strategy;

pub use engine::{CheckoutStateResult, GitCloner};
pub use fallback::Fallback;
pub use fetch::{FetchOptions, FetchRef};
pub use method::CheckoutMethod;
pub use selector::{CheckoutPlan, select_checkout_method, select_fallback, select_fetch_options};
pub use strategy::CheckoutStrategy;
