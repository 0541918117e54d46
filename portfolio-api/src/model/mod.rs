pub mod account;
pub mod advice;
pub mod alert;
pub mod order;
pub mod position;
pub mod risk;
pub mod snapshot;
