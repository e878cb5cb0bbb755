pub mod photo;
pub mod upload;
pub mod validation;
