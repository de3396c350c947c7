#[macro_use]
extern crate rocket;

pub mod api;
pub mod cache;
pub mod config;
pub mod images;
pub mod models;
pub mod proxy;

use rocket::figment::Figment;
use rocket::{Build, Rocket};

use proxy::Pipeline;

/// Assemble the server around an already-built pipeline.
pub fn build(figment: Figment, pipeline: Pipeline) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(pipeline)
        .mount("/", routes![api::fill::fill])
}
