//! MySQL implementations of the core repository contracts

pub mod token_repository_impl;

pub use token_repository_impl::MySqlTokenRepository;
