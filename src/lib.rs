use diesel::prelude::*;
use dotenvy::dotenv;
use std::env;

pub mod cache;
pub mod geocoder;
pub mod models;
pub mod navigator;
pub mod orders;
pub mod schema;

pub fn establish_connection() -> PgConnection {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgConnection::establish(&database_url).unwrap()
}
