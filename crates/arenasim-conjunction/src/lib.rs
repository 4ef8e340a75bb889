//! Conjunction / spatial-proximity engine: spatial-hash broad phase,
//! TCA narrow phase, alert severity, and the SDA maneuver-detection
//! variant. `ConjunctionEngine` is an explicitly owned, constructed
//! subsystem that exclusively owns the alert list for its simulation
//! instance, rather than a module-level singleton.

pub mod alerts;
pub mod sda;
pub mod spatial_hash;
pub mod tca;

use std::collections::HashMap;

use arenasim_core::constants::{
    CONJUNCTION_MAX_ALERTS, CONJUNCTION_TCA_HORIZON_SECS, CONJUNCTION_WATCH_M,
};
use arenasim_core::enums::Side;
use arenasim_core::types::{Position, Velocity};
use arenasim_core::EntityId;

pub use alerts::ConjunctionAlert;
pub use sda::ManeuverAlert;

/// One entity as seen by the conjunction engine for one tick.
#[derive(Debug, Clone)]
pub struct ConjunctionEntity {
    pub id: EntityId,
    pub name: String,
    pub team: Side,
    pub position: Position,
    pub velocity: Option<Velocity>,
    pub sma_m: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct ConjunctionConfig {
    pub watch_threshold_m: f64,
    pub tca_horizon_s: f64,
    pub max_alerts: usize,
}

impl Default for ConjunctionConfig {
    fn default() -> Self {
        Self {
            watch_threshold_m: CONJUNCTION_WATCH_M,
            tca_horizon_s: CONJUNCTION_TCA_HORIZON_SECS,
            max_alerts: CONJUNCTION_MAX_ALERTS,
        }
    }
}

pub struct ConjunctionEngine {
    config: ConjunctionConfig,
    alerts: Vec<ConjunctionAlert>,
    maneuver_alerts: Vec<ManeuverAlert>,
    prev_distances: HashMap<(EntityId, EntityId), f64>,
    prev_states: HashMap<EntityId, sda::TrackedState>,
}

impl ConjunctionEngine {
    pub fn new(config: ConjunctionConfig) -> Self {
        Self {
            config,
            alerts: Vec::new(),
            maneuver_alerts: Vec::new(),
            prev_distances: HashMap::new(),
            prev_states: HashMap::new(),
        }
    }

    pub fn alerts(&self) -> &[ConjunctionAlert] {
        &self.alerts
    }

    pub fn maneuver_alerts(&self) -> &[ManeuverAlert] {
        &self.maneuver_alerts
    }

    /// Run one conjunction pass: broad phase, narrow phase, TCA,
    /// severity classification, sort-and-cap. Called at
    /// `CONJUNCTION_RATE_HZ`.
    pub fn step(&mut self, entities: &[ConjunctionEntity], dt: f64) {
        let mut hash = spatial_hash::SpatialHash::new(self.config.watch_threshold_m);
        let by_id: HashMap<&EntityId, &ConjunctionEntity> = entities.iter().map(|e| (&e.id, e)).collect();
        for e in entities {
            hash.insert(e.id.clone(), &e.position);
        }

        let mut found = Vec::new();
        let mut seen_pairs = std::collections::HashSet::new();

        for (id_a, id_b) in hash.candidate_pairs() {
            let (Some(a), Some(b)) = (by_id.get(&id_a), by_id.get(&id_b)) else { continue };
            let distance = a.position.range_to(&b.position);
            if distance > self.config.watch_threshold_m {
                continue;
            }
            let Some(mut severity) = alerts::severity_for_distance(distance) else { continue };

            let pair_key = if id_a <= id_b { (id_a.clone(), id_b.clone()) } else { (id_b.clone(), id_a.clone()) };
            seen_pairs.insert(pair_key.clone());

            let mut tca_s = None;
            if let (Some(va), Some(vb)) = (&a.velocity, &b.velocity) {
                let r_rel = b.position.sub(&a.position);
                let v_rel = vb.sub(va);
                if let Some(t) = tca::time_of_closest_approach(&r_rel, &v_rel, self.config.tca_horizon_s) {
                    let tca_distance = tca::distance_at(&r_rel, &v_rel, t);
                    severity = alerts::upgrade_for_tca(severity, tca_distance);
                    tca_s = Some(t);
                }
            } else if let Some(&prev_distance) = self.prev_distances.get(&pair_key) {
                let closing_rate = tca::trend_closing_rate(prev_distance, distance, dt);
                if closing_rate < 0.0 {
                    let t = (distance / -closing_rate).min(self.config.tca_horizon_s);
                    let tca_distance = (distance + closing_rate * t).max(0.0);
                    severity = alerts::upgrade_for_tca(severity, tca_distance);
                    tca_s = Some(t);
                }
            }

            found.push(ConjunctionAlert {
                a: id_a.clone(),
                b: id_b.clone(),
                name_a: a.name.clone(),
                name_b: b.name.clone(),
                distance_m: distance,
                tca_s,
                severity,
                eci_midpoint: alerts::midpoint(&a.position, &b.position),
            });

            self.prev_distances.insert(pair_key, distance);
        }

        self.prev_distances.retain(|k, _| seen_pairs.contains(k));
        self.alerts = alerts::sort_and_cap(found, self.config.max_alerts);

        self.run_maneuver_detection(entities);
    }

    fn run_maneuver_detection(&mut self, entities: &[ConjunctionEntity]) {
        let mut out = Vec::new();
        let mut next_states = HashMap::new();
        for e in entities {
            let Some(sma) = e.sma_m else { continue };
            let speed = e.velocity.map(|v| v.speed()).unwrap_or(0.0);
            let now = sda::TrackedState { speed_mps: speed, sma_m: sma };
            if let Some(prev) = self.prev_states.get(&e.id) {
                if let Some(alert) = sda::detect_maneuver(&e.id, e.team.clone(), prev, &now) {
                    out.push(alert);
                }
            }
            next_states.insert(e.id.clone(), now);
        }
        self.prev_states = next_states;
        self.maneuver_alerts = out;
    }
}
