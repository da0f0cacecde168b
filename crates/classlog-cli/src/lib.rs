//! # Classlog CLI
//!
//! Database seeding utilities for Classlog development and demos.
//!
//! This library crate provides the seeding functionality used by the CLI binary.
//!
//! ## Usage
//!
//! ```ignore
//! use classlog_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::new(3); // 3 teachers with default class sizes
//! seed_all(&pool, config).await?;
//! ```

pub mod seeder;
