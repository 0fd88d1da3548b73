//! Collection of general utility functions and common traits.
//!
//! This module serves as a repository for small, reusable helpers that do
//! not fit into a specific domain module: token signing, password hashing,
//! random token generation and the clock abstraction.

pub mod clock;
pub mod generate_random_string;
pub mod jwt;
pub mod password;
