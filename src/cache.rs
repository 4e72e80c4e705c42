use chrono::{DateTime, Duration, Utc};
use diesel::{insert_into, prelude::*, PgConnection};

use crate::geocoder::Point;
use crate::models::{GeocodeCacheEntry, NewGeocodeCacheEntry};
use crate::schema::geocode_cache;

/// Entries older than this are re-resolved on next lookup.
pub fn default_ttl() -> Duration {
    Duration::days(30)
}

impl GeocodeCacheEntry {
    pub fn point(&self) -> Point {
        Point {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Exact-match lookup by address text, regardless of age.
pub fn lookup(
    conn: &mut PgConnection,
    address: &str,
) -> Result<Option<GeocodeCacheEntry>, diesel::result::Error> {
    geocode_cache::table
        .filter(geocode_cache::address.eq(address))
        .select(GeocodeCacheEntry::as_select())
        .first(conn)
        .optional()
}

/// Lookup that treats entries older than `ttl` as absent, forcing the
/// caller back to the geocoder.
pub fn lookup_fresh(
    conn: &mut PgConnection,
    address: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<Option<GeocodeCacheEntry>, diesel::result::Error> {
    Ok(lookup(conn, address)?.filter(|entry| is_fresh(entry.requested_at, ttl, now)))
}

/// Inserts or refreshes the entry for `address`. The unique index on
/// address makes concurrent resolutions of the same text converge on a
/// single row instead of accumulating duplicates.
pub fn store(
    conn: &mut PgConnection,
    address: &str,
    point: Point,
    requested_at: DateTime<Utc>,
) -> Result<(), diesel::result::Error> {
    let entry = NewGeocodeCacheEntry {
        address: address.to_string(),
        latitude: point.latitude,
        longitude: point.longitude,
        requested_at,
    };
    insert_into(geocode_cache::table)
        .values(&entry)
        .on_conflict(geocode_cache::address)
        .do_update()
        .set((
            geocode_cache::latitude.eq(entry.latitude),
            geocode_cache::longitude.eq(entry.longitude),
            geocode_cache::requested_at.eq(entry.requested_at),
        ))
        .execute(conn)?;
    Ok(())
}

fn is_fresh(requested_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(requested_at) <= ttl
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::establish_connection;

    #[test]
    fn test_is_fresh_within_ttl() {
        let now = Utc::now();
        assert!(is_fresh(now - Duration::days(29), Duration::days(30), now));
        assert!(is_fresh(now, Duration::days(30), now));
    }

    #[test]
    fn test_is_fresh_expired() {
        let now = Utc::now();
        assert!(!is_fresh(now - Duration::days(31), Duration::days(30), now));
    }

    #[test]
    #[ignore = "requires a PostgreSQL database"]
    fn test_store_twice_keeps_single_row() {
        let conn = &mut establish_connection();
        let address = "Москва, Красная площадь, 1";
        let point = Point {
            latitude: 55.755814,
            longitude: 37.617635,
        };

        store(conn, address, point, Utc::now()).unwrap();
        store(conn, address, point, Utc::now()).unwrap();

        let rows: i64 = geocode_cache::table
            .filter(geocode_cache::address.eq(address))
            .count()
            .get_result(conn)
            .unwrap();
        assert_eq!(rows, 1);

        let cached = lookup(conn, address).unwrap().unwrap();
        assert_eq!(cached.point(), point);

        diesel::delete(geocode_cache::table.filter(geocode_cache::address.eq(address)))
            .execute(conn)
            .unwrap();
    }
}
