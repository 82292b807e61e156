use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("{param} must be an integer, got '{value}'")]
    InvalidInteger { param: &'static str, value: String },

    #[error("{param} must be a number, got '{value}'")]
    InvalidNumber { param: &'static str, value: String },

    #[error("minPrice cannot be greater than maxPrice")]
    PriceRange,
}
