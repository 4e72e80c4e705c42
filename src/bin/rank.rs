use clap::Parser;
use diesel::prelude::*;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use uuid::Uuid;

use foodcart_service::geocoder::YandexGeocoder;
use foodcart_service::{cache, establish_connection, models, navigator, schema};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Lists the restaurants able to fulfill an order, nearest first.
#[derive(Parser)]
struct Cli {
    /// Order to rank restaurants for
    #[arg(long)]
    order_id: Uuid,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let api_key =
        std::env::var("YANDEX_MAPS_API_KEY").expect("YANDEX_MAPS_API_KEY must be set");
    let geocoder = YandexGeocoder::new(api_key);

    let conn = &mut establish_connection();
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");

    let order = schema::orders::table
        .find(cli.order_id)
        .select(models::Order::as_select())
        .first(conn)?;

    let restaurants = navigator::fetch_available_restaurants(conn, order.id)?;
    if restaurants.is_empty() {
        println!("no restaurant stocks every ordered product");
        return Ok(());
    }

    let ranked = navigator::fetch_restaurants_distances(
        conn,
        &geocoder,
        cache::default_ttl(),
        restaurants,
        &order,
    )?;
    for entry in ranked {
        match entry.distance_km {
            Some(km) => println!("{:>8.2} km  {}", km, entry.restaurant.name),
            None => println!("{:>11}  {}", "?", entry.restaurant.name),
        }
    }

    Ok(())
}
