// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` persistence for the trip queue engine.
//!
//! This crate provides [`SqliteStore`], a [`trip_queue::Store`] built on
//! Diesel, along with registry seeding.
//!
//! ## Storage Model
//!
//! - Registry tables (`routes`, `vehicles`, `drivers`) are read-only to the
//!   engine and filled through [`SqliteStore::seed_registry`] and the
//!   upsert helpers
//! - `trips` carries a `version` column checked on every update
//! - `route_queues` holds one row per route, written at the start of every
//!   queue mutation
//! - `bookings.ticket_reference` is unique
//! - `payments` is append-only
//!
//! ## Migration Strategy
//!
//! Migrations live in `migrations/` and are embedded at compile time. Every
//! connection runs pending migrations before use.
//!
//! ## Testing Philosophy
//!
//! - Tests run against private in-memory databases from
//!   [`SqliteStore::new_in_memory`]
//! - Each call gets its own database, so tests never share state

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod seed;
mod store;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use seed::RegistrySeed;
pub use store::SqliteStore;
