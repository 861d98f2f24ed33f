//! Personal finance tracker backend: spends and incomes with monthly
//! per-sector summaries, served over HTTP with Rocket.

#[macro_use]
extern crate rocket;

pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod telemetry;

use rocket::figment::Provider;
use rocket::{Build, Rocket};

use store::SharedStore;

/// Assembles the service around an already opened store.
pub fn build(figment: impl Provider, store: SharedStore) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(store)
        .mount("/", routes::all())
        .register("/", routes::catchers())
}
