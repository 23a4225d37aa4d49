//! Core value types for Lendledger

pub mod address;
pub mod amount;
pub mod credit_account;
pub mod fee;
pub mod loan_id;
