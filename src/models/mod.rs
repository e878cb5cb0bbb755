pub mod employee;
pub mod order;
