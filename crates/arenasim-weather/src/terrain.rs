//! Terrain elevation cache (bilinear-interpolated heightmap queries).
//! Full HGT loading and theater authoring are out of scope; this
//! exposes the query surface the flight propagator needs, backed by an
//! in-memory grid a scenario can populate.
//!
//!, a failed query returns 0 (sea level) rather than
//! blocking flight.

/// A simple equirectangular elevation grid: row-major, north-to-south,
/// west-to-east, with bilinear interpolation between samples.
#[derive(Debug, Clone)]
pub struct TerrainCache {
    origin_lat_rad: f64,
    origin_lon_rad: f64,
    cell_size_rad: f64,
    width: usize,
    height: usize,
    elevations_m: Vec<f32>,
}

impl TerrainCache {
    /// An empty cache: every query returns sea level (0 m).
    pub fn flat() -> Self {
        Self {
            origin_lat_rad: 0.0,
            origin_lon_rad: 0.0,
            cell_size_rad: 0.0,
            width: 0,
            height: 0,
            elevations_m: Vec::new(),
        }
    }

    pub fn new(
        origin_lat_rad: f64,
        origin_lon_rad: f64,
        cell_size_rad: f64,
        width: usize,
        height: usize,
        elevations_m: Vec<f32>,
    ) -> Self {
        debug_assert_eq!(elevations_m.len(), width * height);
        Self { origin_lat_rad, origin_lon_rad, cell_size_rad, width, height, elevations_m }
    }

    fn geo_to_grid(&self, lat: f64, lon: f64) -> Option<(f64, f64)> {
        if self.width == 0 || self.height == 0 || self.cell_size_rad <= 0.0 {
            return None;
        }
        let north_lat = self.origin_lat_rad + self.height as f64 * self.cell_size_rad;
        let col = (lon - self.origin_lon_rad) / self.cell_size_rad;
        let row = (north_lat - lat) / self.cell_size_rad;
        if col < 0.0 || row < 0.0 || col >= self.width as f64 || row >= self.height as f64 {
            return None;
        }
        Some((row, col))
    }

    fn raw(&self, row: usize, col: usize) -> f32 {
        if row >= self.height || col >= self.width {
            return 0.0;
        }
        self.elevations_m[row * self.width + col]
    }

    /// Elevation (meters) at a geodetic lat/lon, or `0.0` (sea level) if
    /// the point falls outside this cache or the cache is unpopulated.
    pub fn elevation_at(&self, lat_rad: f64, lon_rad: f64) -> f32 {
        let Some((row, col)) = self.geo_to_grid(lat_rad, lon_rad) else { return 0.0 };
        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = (r0 + 1).min(self.height - 1);
        let c1 = (c0 + 1).min(self.width - 1);
        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let e00 = self.raw(r0, c0) as f64;
        let e01 = self.raw(r0, c1) as f64;
        let e10 = self.raw(r1, c0) as f64;
        let e11 = self.raw(r1, c1) as f64;
        let top = e00 * (1.0 - fc) + e01 * fc;
        let bot = e10 * (1.0 - fc) + e11 * fc;
        (top * (1.0 - fr) + bot * fr) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_cache_returns_sea_level_everywhere() {
        let cache = TerrainCache::flat();
        assert_eq!(cache.elevation_at(0.1, 0.2), 0.0);
    }

    #[test]
    fn out_of_bounds_query_returns_sea_level() {
        let cache = TerrainCache::new(0.0, 0.0, 0.0001, 4, 4, vec![100.0; 16]);
        assert_eq!(cache.elevation_at(10.0, 10.0), 0.0);
    }

    #[test]
    fn interpolates_between_samples() {
        #[rustfmt::skip]
        let grid = vec![
            0.0, 0.0, 0.0,
            0.0, 100.0, 0.0,
            0.0, 0.0, 0.0,
        ];
        let cell = 0.0001;
        let cache = TerrainCache::new(0.0, 0.0, cell, 3, 3, grid);
        let north_lat = cache.origin_lat_rad + 3.0 * cell;
        let peak_lat = north_lat - 1.0 * cell;
        let peak_lon = cell;
        let e = cache.elevation_at(peak_lat, peak_lon);
        assert!((e - 100.0).abs() < 1.0);
    }
}
