//! Share records and token normalization.

pub mod model;
pub mod token;

pub use model::ShareRecord;
pub use token::ShareToken;
