//! Settings: schema types, file/env loading and validation.
//!
//! Everything here is optional for the user; missing keys fall back to the
//! struct defaults in `schema`.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
