use std::{future::Future, time::Duration};

use geo_types::LineString;
use sqlx::{FromRow, PgPool};

use crate::{
    error::CorridorError,
    models::{CorridorCandidate, Waypoint},
};

/// Parameters of a corridor search around a route.
#[derive(Debug, Clone, Copy)]
pub struct CorridorQuery<'a> {
    pub geometry: &'a LineString<f64>,
    pub buffer_m: f64,
    pub min_curvature: u32,
    pub min_length_m: f64,
    pub limit: usize,
}

/// Source of curvature segments near a route.
///
/// Implementations return candidates ordered by curvature descending, capped
/// at `limit`, and an empty list (not an error) when nothing matches.
pub trait CorridorSource: Send + Sync {
    fn candidates(
        &self,
        query: &CorridorQuery<'_>,
    ) -> impl Future<Output = Result<Vec<CorridorCandidate>, CorridorError>> + Send;

    fn health(&self) -> impl Future<Output = bool> + Send;
}

/// Paved curvature segments within `$2` meters of the route, with their
/// position along it and their distance from it.
const CORRIDOR_SQL: &str = r#"
    WITH route AS (
        SELECT ST_SetSRID(ST_GeomFromGeoJSON($1), 4326) AS geom
    )
    SELECT
        cs.id::int8 AS id,
        cs.name,
        cs.curvature::int4 AS curvature,
        cs.length::float8 AS length_m,
        cs.paved,
        ST_LineLocatePoint(route.geom, ST_Centroid(cs.geom)) AS route_fraction,
        ST_Distance(cs.geom::geography, route.geom::geography) AS distance_from_route_m,
        ST_X(ST_Centroid(cs.geom)) AS centroid_lng,
        ST_Y(ST_Centroid(cs.geom)) AS centroid_lat
    FROM curvature_segments cs, route
    WHERE ST_DWithin(cs.geom::geography, route.geom::geography, $2::float8)
      AND cs.curvature >= $3::int4
      AND cs.length >= $4::float8
      AND cs.paved = TRUE
    ORDER BY cs.curvature DESC, cs.id
    LIMIT $5::int8
"#;

#[derive(Debug, FromRow)]
struct CorridorRow {
    id: i64,
    name: Option<String>,
    curvature: i32,
    length_m: f64,
    paved: bool,
    route_fraction: f64,
    distance_from_route_m: f64,
    centroid_lng: f64,
    centroid_lat: f64,
}

impl From<CorridorRow> for CorridorCandidate {
    fn from(row: CorridorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            curvature: row.curvature.max(0) as u32,
            length_m: row.length_m,
            is_paved: row.paved,
            route_fraction: row.route_fraction.clamp(0.0, 1.0),
            distance_from_route_m: row.distance_from_route_m,
            centroid: Waypoint::new(row.centroid_lng, row.centroid_lat),
        }
    }
}

/// Corridor search over the PostGIS `curvature_segments` table.
#[derive(Clone)]
pub struct PgCorridorSource {
    pool: PgPool,
    timeout: Duration,
}

impl PgCorridorSource {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

impl CorridorSource for PgCorridorSource {
    async fn candidates(
        &self,
        query: &CorridorQuery<'_>,
    ) -> Result<Vec<CorridorCandidate>, CorridorError> {
        // PostGIS rejects LineStrings with fewer than two points
        if query.geometry.0.len() < 2 {
            return Ok(Vec::new());
        }

        let geojson = line_string_geojson(query.geometry);
        let fetch = sqlx::query_as::<_, CorridorRow>(CORRIDOR_SQL)
            .bind(geojson)
            .bind(query.buffer_m)
            .bind(query.min_curvature.min(i32::MAX as u32) as i32)
            .bind(query.min_length_m)
            .bind(query.limit.min(i64::MAX as usize) as i64)
            .fetch_all(&self.pool);

        let rows = tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| CorridorError::Timeout(self.timeout))??;

        tracing::debug!(
            "corridor query ({:.0} m buffer) returned {} segments",
            query.buffer_m,
            rows.len()
        );
        Ok(rows.into_iter().map(CorridorCandidate::from).collect())
    }

    async fn health(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

pub fn line_string_geojson(line: &LineString<f64>) -> String {
    let coordinates: Vec<[f64; 2]> = line.coords().map(|c| [c.x, c.y]).collect();
    serde_json::json!({
        "type": "LineString",
        "coordinates": coordinates,
    })
    .to_string()
}
