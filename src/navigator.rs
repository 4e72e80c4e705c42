use std::collections::{HashMap, HashSet};

use chrono::{Duration, Utc};
use diesel::{prelude::*, update, PgConnection};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::cache;
use crate::geocoder::{Geocode, GeocodeError, Point};
use crate::models::{Order, Restaurant, RestaurantMenuItem};
use crate::schema;

#[derive(Error, Debug)]
pub enum NavigatorError {
    #[error("Geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),
    #[error("Unexpected internal error")]
    Internal(#[from] diesel::result::Error),
}

/// Outcome of coordinate resolution for a single entity. `Unknown` stands
/// in for "could not resolve" so that downstream distance math never sees
/// a fabricated coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Located {
    At(Point),
    Unknown,
}

/// One row of the ranked output. `distance_km` is `None` when either end
/// of the pair could not be resolved; such rows sort after every resolved
/// one so the caller can surface them instead of losing them.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantDistance {
    pub restaurant: Restaurant,
    pub distance_km: Option<f64>,
}

impl RestaurantDistance {
    fn sort_key(&self) -> f64 {
        self.distance_km.unwrap_or(f64::INFINITY)
    }
}

/// Restaurants that stock every product of the order via an
/// availability-enabled menu item, ordered by name. An order with no line
/// items qualifies every restaurant (vacuous truth).
pub fn fetch_available_restaurants(
    conn: &mut PgConnection,
    order_id: Uuid,
) -> Result<Vec<Restaurant>, NavigatorError> {
    let ordered_products: Vec<Uuid> = schema::order_line_items::table
        .filter(schema::order_line_items::order_id.eq(order_id))
        .select(schema::order_line_items::product_id)
        .load(conn)?;

    let restaurants = schema::restaurants::table
        .order(schema::restaurants::name.asc())
        .select(Restaurant::as_select())
        .load(conn)?;

    let menu_items = schema::restaurant_menu_items::table
        .filter(schema::restaurant_menu_items::product_id.eq_any(&ordered_products))
        .select(RestaurantMenuItem::as_select())
        .load(conn)?;

    let ordered_products: HashSet<Uuid> = ordered_products.into_iter().collect();
    Ok(with_complete_menu(restaurants, &menu_items, &ordered_products))
}

fn with_complete_menu(
    restaurants: Vec<Restaurant>,
    menu_items: &[RestaurantMenuItem],
    ordered_products: &HashSet<Uuid>,
) -> Vec<Restaurant> {
    let mut stocked: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
    for item in menu_items.iter().filter(|item| item.availability) {
        stocked
            .entry(item.restaurant_id)
            .or_default()
            .insert(item.product_id);
    }

    restaurants
        .into_iter()
        .filter(|restaurant| {
            let menu = stocked.get(&restaurant.id);
            ordered_products
                .iter()
                .all(|product| menu.is_some_and(|menu| menu.contains(product)))
        })
        .collect()
}

/// Ranks `restaurants` by great-circle distance from the order's delivery
/// address, nearest first. Coordinates come from the shared geocode cache,
/// the entity's own stored pair, or the geocoder, in that order; fresh
/// resolutions are persisted back. Unresolvable entities degrade to an
/// unknown distance rather than aborting the whole ranking.
pub fn fetch_restaurants_distances(
    conn: &mut PgConnection,
    geocoder: &dyn Geocode,
    cache_ttl: Duration,
    restaurants: Vec<Restaurant>,
    order: &Order,
) -> Result<Vec<RestaurantDistance>, NavigatorError> {
    let order_location = resolve_order(conn, geocoder, cache_ttl, order)?;

    let mut located = Vec::with_capacity(restaurants.len());
    for restaurant in restaurants {
        let location = resolve_restaurant(conn, geocoder, &restaurant)?;
        located.push((restaurant, location));
    }

    Ok(rank_by_distance(order_location, located))
}

fn resolve_order(
    conn: &mut PgConnection,
    geocoder: &dyn Geocode,
    cache_ttl: Duration,
    order: &Order,
) -> Result<Located, NavigatorError> {
    let now = Utc::now();
    if let Some(cached) = cache::lookup_fresh(conn, &order.address, cache_ttl, now)? {
        return Ok(Located::At(cached.point()));
    }
    if let Some(point) = stored_point(order.latitude, order.longitude) {
        return Ok(Located::At(point));
    }
    if order.address.trim().is_empty() {
        warn!(order_id = %order.id, "order has no delivery address to geocode");
        return Ok(Located::Unknown);
    }

    match geocoder.resolve(&order.address)? {
        Some(point) => {
            update(schema::orders::table.find(order.id))
                .set((
                    schema::orders::latitude.eq(point.latitude),
                    schema::orders::longitude.eq(point.longitude),
                ))
                .execute(conn)?;
            cache::store(conn, &order.address, point, now)?;
            Ok(Located::At(point))
        }
        None => {
            warn!(
                order_id = %order.id,
                address = %order.address,
                "geocoder found nothing for order address"
            );
            Ok(Located::Unknown)
        }
    }
}

fn resolve_restaurant(
    conn: &mut PgConnection,
    geocoder: &dyn Geocode,
    restaurant: &Restaurant,
) -> Result<Located, NavigatorError> {
    if let Some(point) = stored_point(restaurant.latitude, restaurant.longitude) {
        return Ok(Located::At(point));
    }
    if restaurant.address.trim().is_empty() {
        warn!(restaurant_id = %restaurant.id, "restaurant has no address to geocode");
        return Ok(Located::Unknown);
    }

    match geocoder.resolve(&restaurant.address)? {
        Some(point) => {
            update(schema::restaurants::table.find(restaurant.id))
                .set((
                    schema::restaurants::latitude.eq(point.latitude),
                    schema::restaurants::longitude.eq(point.longitude),
                ))
                .execute(conn)?;
            Ok(Located::At(point))
        }
        None => {
            warn!(
                restaurant_id = %restaurant.id,
                address = %restaurant.address,
                "geocoder found nothing for restaurant address"
            );
            Ok(Located::Unknown)
        }
    }
}

fn stored_point(latitude: Option<f64>, longitude: Option<f64>) -> Option<Point> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Point {
            latitude,
            longitude,
        }),
        _ => None,
    }
}

fn rank_by_distance(
    order_location: Located,
    located: Vec<(Restaurant, Located)>,
) -> Vec<RestaurantDistance> {
    let mut ranked: Vec<RestaurantDistance> = located
        .into_iter()
        .map(|(restaurant, location)| RestaurantDistance {
            distance_km: distance_between(order_location, location),
            restaurant,
        })
        .collect();
    // sort_by is stable, so equal distances keep their input order.
    ranked.sort_by(|a, b| a.sort_key().total_cmp(&b.sort_key()));
    ranked
}

fn distance_between(a: Located, b: Located) -> Option<f64> {
    match (a, b) {
        (Located::At(a), Located::At(b)) => Some(great_circle_km(a, b)),
        _ => None,
    }
}

const EARTH_RADIUS_KM: f64 = 6371.0088;

fn great_circle_km(a: Point, b: Point) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
