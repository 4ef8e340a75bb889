//! `CommEngine`: the explicitly-owned, constructed-at-start subsystem
//! that exclusively owns networks, links, packets, jammers, and cyber
//! attacks. Callers construct one per simulation instance and pass it
//! a frozen position snapshot each tick.

use std::collections::{BTreeSet, HashMap};

use arenasim_core::components::{CommRecord, CyberRecord};
use arenasim_core::enums::{CyberAttackType, DropReason, JamDirection, JammerType, LinkQuality, LinkType, PacketType, Topology};
use arenasim_core::types::Position;
use arenasim_core::EntityId;
use rand_chacha::ChaCha8Rng;

use crate::cyber::{self, CyberAttack};
use crate::datalink::{self, ExtrapolatedTrack, TrackSnapshot};
use crate::graph::{self, EdgeKey, NetworkSpec};
use crate::jammer::{self, Jammer};
use crate::link_budget::{self, LinkBudgetResult, RfLinkParams};
use crate::los::has_los;
use crate::metrics::CommsMetrics;
use crate::packet::{self, AdvanceOutcome, HopLink, Packet};
use crate::routing::{self, Adjacency, Edge};

/// Physical/radio configuration for one link, set at network construction.
#[derive(Debug, Clone)]
pub enum LinkConfig {
    Rf(RfLinkParams),
    Fiber { capacity_bps: f64 },
    Laser { capacity_bps: f64 },
}

/// A runtime link record. Keyed by unordered entity pair; one edge may
/// serve several networks at once.
#[derive(Debug, Clone)]
pub struct Link {
    pub a: EntityId,
    pub b: EntityId,
    pub network_ids: Vec<String>,
    pub link_type: LinkType,
    pub config: LinkConfig,
    pub quality: LinkQuality,
    pub margin_db: f64,
    pub distance_m: f64,
    pub los: bool,
    pub throughput_bps: f64,
    pub latency_ms: f64,
    pub packet_loss: f64,
    pub utilization: f64,
    pub jammed: bool,
    pub jam_strength_db: f64,
    pub cyber_compromised: bool,
    pub alive: bool,
    pub capacity_bps: f64,
    pub bytes_sent_this_tick: u64,
}

impl Link {
    fn new(a: EntityId, b: EntityId, network_id: String, link_type: LinkType, config: LinkConfig) -> Self {
        let capacity_bps = match &config {
            LinkConfig::Rf(_) => 0.0,
            LinkConfig::Fiber { capacity_bps } | LinkConfig::Laser { capacity_bps } => *capacity_bps,
        };
        Self {
            a,
            b,
            network_ids: vec![network_id],
            link_type,
            config,
            quality: LinkQuality::Lost,
            margin_db: 0.0,
            distance_m: 0.0,
            los: false,
            throughput_bps: 0.0,
            latency_ms: 0.0,
            packet_loss: 0.0,
            utilization: 0.0,
            jammed: false,
            jam_strength_db: 0.0,
            cyber_compromised: false,
            alive: true,
            capacity_bps,
            bytes_sent_this_tick: 0,
        }
    }

    pub fn key(&self) -> EdgeKey {
        graph::edge_key(&self.a, &self.b)
    }
}

#[derive(Debug, Clone)]
pub struct Network {
    pub spec: NetworkSpec,
    pub name: String,
}

/// If `clamp_utilization` is true, reported utilization is capped at
/// 1.0; otherwise raw (possibly >1.0) utilization is reported. Raw
/// utilization is the default: priority-8+ preemption can legitimately
/// push a link past its nominal capacity for a tick.
#[derive(Debug, Clone, Copy)]
pub struct CommEngineConfig {
    pub clamp_utilization: bool,
    pub temp_k: f64,
    pub tropospheric_fraction: f64,
    pub rain_rate_mm_per_hr: f64,
}

impl Default for CommEngineConfig {
    fn default() -> Self {
        Self { clamp_utilization: false, temp_k: 290.0, tropospheric_fraction: 0.3, rain_rate_mm_per_hr: 0.0 }
    }
}

/// Outcome of one `advance_packets` call, for the caller to apply to
/// entity state / trigger F2T2EA distribution.
pub struct DeliveryOutcome {
    pub packet: Packet,
}

pub struct CommEngine {
    config: CommEngineConfig,
    networks: HashMap<String, Network>,
    links: HashMap<EdgeKey, Link>,
    jammers: HashMap<String, Jammer>,
    cyber_attacks: HashMap<String, CyberAttack>,
    packets: Vec<Packet>,
    queued_next_tick: Vec<Packet>,
    metrics: CommsMetrics,
    next_packet_seq: u64,
    prev_hub_alive: HashMap<String, bool>,
}

impl CommEngine {
    pub fn new(config: CommEngineConfig) -> Self {
        Self {
            config,
            networks: HashMap::new(),
            links: HashMap::new(),
            jammers: HashMap::new(),
            cyber_attacks: HashMap::new(),
            packets: Vec::new(),
            queued_next_tick: Vec::new(),
            metrics: CommsMetrics::default(),
            next_packet_seq: 0,
            prev_hub_alive: HashMap::new(),
        }
    }

    pub fn metrics(&self) -> &CommsMetrics {
        &self.metrics
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn link(&self, a: &EntityId, b: &EntityId) -> Option<&Link> {
        self.links.get(&graph::edge_key(a, b))
    }

    // --- Network lifecycle ---

    pub fn add_network(&mut self, spec: NetworkSpec, name: String, link_type: LinkType, config: LinkConfig) {
        for edge in graph::edges_for(&spec) {
            self.links
                .entry(edge.clone())
                .and_modify(|l| {
                    if !l.network_ids.contains(&spec.id) {
                        l.network_ids.push(spec.id.clone());
                    }
                })
                .or_insert_with(|| Link::new(edge.0.clone(), edge.1.clone(), spec.id.clone(), link_type, config.clone()));
        }
        self.networks.insert(spec.id.clone(), Network { spec, name });
    }

    pub fn remove_network(&mut self, network_id: &str) {
        self.networks.remove(network_id);
        let remaining: Vec<NetworkSpec> = self.networks.values().map(|n| n.spec.clone()).collect();
        let live_edges: BTreeSet<EdgeKey> = graph::collapse_edges(&remaining);
        self.links.retain(|key, link| {
            link.network_ids.retain(|id| id != network_id);
            live_edges.contains(key) || !link.network_ids.is_empty()
        });
    }

    // --- Jammers ---

    pub fn add_jammer(&mut self, jammer: Jammer) {
        self.jammers.insert(jammer.id.clone(), jammer);
    }

    pub fn set_jammer_active(&mut self, jammer_id: &str, active: bool) {
        if let Some(j) = self.jammers.get_mut(jammer_id) {
            j.active = active;
        }
    }

    // --- Cyber ---

    pub fn launch_cyber_attack(&mut self, attack: CyberAttack) {
        self.cyber_attacks.insert(attack.id.clone(), attack);
    }

    pub fn cancel_cyber_attack(&mut self, attack_id: &str, comm: &mut CommRecord, cyber_rec: &mut CyberRecord) {
        if let Some(attack) = self.cyber_attacks.get_mut(attack_id) {
            cyber::cancel(attack, comm, cyber_rec);
        }
    }

    /// The node an in-progress or completed attack targets, so a caller
    /// holding only the attack ID (e.g. a queued `CancelCyberAttack`
    /// command) can look up the `CommRecord`/`CyberRecord` to mutate.
    pub fn cyber_attack_target(&self, attack_id: &str) -> Option<EntityId> {
        self.cyber_attacks.get(attack_id).map(|a| a.target.clone())
    }

    /// Advance cyber attacks by `dt`, applying effects to their targets'
    /// comm/cyber records on completion, at the comms link rate.
    pub fn step_cyber(&mut self, dt: f64, comm_records: &mut HashMap<EntityId, CommRecord>, cyber_records: &mut HashMap<EntityId, CyberRecord>) {
        for attack in self.cyber_attacks.values_mut() {
            let comm = comm_records.entry(attack.target.clone()).or_default();
            let cyber_rec = cyber_records.entry(attack.target.clone()).or_default();
            cyber::step(attack, dt, comm, cyber_rec);
        }
        self.cyber_attacks.retain(|_, a| !a.is_complete || a.attack_type == CyberAttackType::Brick);
    }

    /// Recompute every link's physical state (distance, LOS, jammer
    /// contribution, margin, quality) from a frozen position snapshot,
    /// at `COMMS_LINK_RATE_HZ`.
    pub fn step_link_budget(
        &mut self,
        positions: &HashMap<EntityId, Position>,
        bricked: &HashMap<EntityId, bool>,
        compromised: &HashMap<EntityId, bool>,
        ddos_multiplier: &HashMap<EntityId, f64>,
    ) {
        let jammers: Vec<Jammer> = self.jammers.values().cloned().collect();
        for link in self.links.values_mut() {
            link.bytes_sent_this_tick = 0;
            let (Some(pa), Some(pb)) = (positions.get(&link.a), positions.get(&link.b)) else {
                link.alive = false;
                link.quality = LinkQuality::Lost;
                continue;
            };
            link.cyber_compromised = *compromised.get(&link.a).unwrap_or(&false) || *compromised.get(&link.b).unwrap_or(&false);
            link.alive = !*bricked.get(&link.a).unwrap_or(&false) && !*bricked.get(&link.b).unwrap_or(&false);
            link.distance_m = pa.range_to(pb);
            link.los = has_los(pa, pb);

            let ddos = ddos_multiplier.get(&link.a).copied().unwrap_or(1.0).min(ddos_multiplier.get(&link.b).copied().unwrap_or(1.0));

            match &link.config {
                LinkConfig::Rf(params) => {
                    if !link.alive {
                        link.quality = LinkQuality::Lost;
                        continue;
                    }
                    let jam_w = jammer::total_jam_power_w(&jammers, pb, params.freq_hz, true)
                        + jammer::total_jam_power_w(&jammers, pa, params.freq_hz, false);
                    let mut result: LinkBudgetResult = link_budget::evaluate_rf(params, link.distance_m, jam_w);
                    if !link.los {
                        result.quality = LinkQuality::Lost;
                    }
                    let js_db = jammer::js_ratio_db(jam_w, 10f64.powf((result.received_power_dbm - 30.0) / 10.0));
                    let (kills, extra_loss) = jammer::js_degradation(js_db);
                    link.jammed = jam_w > 0.0;
                    link.jam_strength_db = if jam_w > 0.0 { 10.0 * jam_w.log10() + 30.0 } else { 0.0 };
                    link.margin_db = result.margin_db;
                    link.quality = if kills { LinkQuality::Lost } else { degrade_one_level_if(result.quality, jam_w > 0.0 && js_db > -6.0 && !kills) };
                    link.throughput_bps = link_budget::effective_data_rate_bps(params.bandwidth_hz * 4.0, result.snir_db) * ddos;
                    link.capacity_bps = link.throughput_bps;
                    link.latency_ms = (link.distance_m / arenasim_core::constants::SPEED_OF_LIGHT_MPS) * 1000.0;
                    link.packet_loss = (extra_loss + if link.quality == LinkQuality::Degraded { 0.05 } else { 0.0 }).min(1.0);
                }
                LinkConfig::Fiber { capacity_bps } => {
                    link.los = true;
                    link.jammed = false;
                    link.jam_strength_db = 0.0;
                    link.quality = if link.alive { LinkQuality::Excellent } else { LinkQuality::Lost };
                    link.margin_db = 40.0;
                    link.capacity_bps = *capacity_bps * ddos;
                    link.throughput_bps = link.capacity_bps;
                    link.latency_ms = link_budget::fiber_latency_s(link.distance_m) * 1000.0;
                    link.packet_loss = 0.0;
                }
                LinkConfig::Laser { capacity_bps } => {
                    if !link.los || !link.alive {
                        link.quality = LinkQuality::Lost;
                        continue;
                    }
                    let alt_a = position_altitude_m(pa);
                    let alt_b = position_altitude_m(pb);
                    let penalty = link_budget::laser_atmospheric_penalty_db(alt_a.min(alt_b));
                    link.jammed = false;
                    link.jam_strength_db = 0.0;
                    link.margin_db = 30.0 - penalty;
                    link.quality = link_budget::quality_from_margin(link.margin_db);
                    link.capacity_bps = *capacity_bps * ddos;
                    link.throughput_bps = link.capacity_bps;
                    link.latency_ms = (link.distance_m / arenasim_core::constants::SPEED_OF_LIGHT_MPS) * 1000.0;
                    link.packet_loss = 0.0;
                }
            }
        }
    }

    /// Build adjacency from alive, non-`Lost` links and route a packet,
    /// at `COMMS_ROUTING_RATE_HZ`.
    pub fn route(&self, source: &str, destination: &str) -> Option<routing::RouteResult> {
        let adjacency = self.build_adjacency();
        routing::shortest_path(&adjacency, source, destination)
    }

    fn build_adjacency(&self) -> Adjacency {
        let mut adjacency: Adjacency = HashMap::new();
        for link in self.links.values() {
            if !link.alive || link.quality == LinkQuality::Lost {
                continue;
            }
            let cost = routing::edge_cost(
                link.latency_ms / 1000.0,
                link.quality.cost_factor(),
                link.packet_loss,
                effective_utilization(link, self.config.clamp_utilization),
            );
            let edge = Edge { cost, latency_s: link.latency_ms / 1000.0 };
            adjacency.entry(link.a.clone()).or_default().push((link.b.clone(), edge));
            adjacency.entry(link.b.clone()).or_default().push((link.a.clone(), edge));
        }
        adjacency
    }

    pub fn enqueue_packet(&mut self, packet: Packet) {
        self.packets.push(packet);
    }

    pub fn next_packet_id(&mut self, prefix: &str) -> String {
        self.next_packet_seq += 1;
        format!("{prefix}-{}", self.next_packet_seq)
    }

    /// Sort by priority and advance every in-flight packet one hop (or
    /// re-route it), at `COMMS_ROUTING_RATE_HZ`. Returns delivered
    /// packets for the caller to apply to destination state / trigger
    /// F2T2EA distribution.
    pub fn advance_packets(
        &mut self,
        sim_time_s: f64,
        dt: f64,
        entity_alive: &HashMap<EntityId, bool>,
        rng: &mut ChaCha8Rng,
    ) -> Vec<DeliveryOutcome> {
        let mut pending: Vec<Packet> = std::mem::take(&mut self.packets);
        pending.extend(std::mem::take(&mut self.queued_next_tick));
        packet::sort_by_priority(&mut pending);

        let mut delivered = Vec::new();
        let mut still_in_flight = Vec::new();
        let mut next_tick = Vec::new();

        for mut p in pending {
            let needs_reroute = p.path.is_empty()
                || self
                    .current_hop_link(&p)
                    .map(|l| l.quality == LinkQuality::Lost || !l.alive)
                    .unwrap_or(true);

            if needs_reroute {
                match self.route(&p.source, &p.destination) {
                    Some(route) => p.path = route.path,
                    None => {
                        self.metrics.record_dropped(&p, DropReason::NoRoute, sim_time_s);
                        continue;
                    }
                }
            }

            let hop_link = self.current_hop_link(&p).map(|l| HopLink {
                link_type: l.link_type,
                quality: l.quality,
                capacity_bps: l.capacity_bps,
                latency_ms: l.latency_ms,
                packet_loss: l.packet_loss,
                next_node_bricked: !l.alive,
            });

            let src_alive = *entity_alive.get(&p.source).unwrap_or(&true);
            let dst_alive = *entity_alive.get(&p.destination).unwrap_or(&true);

            let hop_key = self.current_hop_key(&p);
            let mut bytes_sent = hop_key
                .as_ref()
                .and_then(|key| self.links.get(key))
                .map(|l| l.bytes_sent_this_tick)
                .unwrap_or(0);
            let outcome = packet::advance(&mut p, sim_time_s, dt, hop_link.as_ref(), dst_alive, src_alive, false, &mut bytes_sent, rng);

            if let Some(key) = hop_key {
                if let Some(link) = self.links.get_mut(&key) {
                    link.bytes_sent_this_tick = bytes_sent;
                    link.utilization = link.bytes_sent_this_tick as f64 * 8.0 / (link.capacity_bps * dt).max(1.0);
                }
            }

            match outcome {
                AdvanceOutcome::Delivered => {
                    self.metrics.record_delivered(&p, sim_time_s);
                    delivered.push(DeliveryOutcome { packet: p });
                }
                AdvanceOutcome::Dropped(reason) => {
                    self.metrics.record_dropped(&p, reason, sim_time_s);
                }
                AdvanceOutcome::QueuedNextTick => next_tick.push(p),
                AdvanceOutcome::Waiting | AdvanceOutcome::Advanced => still_in_flight.push(p),
            }
        }

        self.packets = still_in_flight;
        self.queued_next_tick = next_tick;
        delivered
    }

    fn current_hop_key(&self, p: &Packet) -> Option<EdgeKey> {
        if p.hop_index + 1 >= p.path.len() {
            return None;
        }
        Some(graph::edge_key(&p.path[p.hop_index], &p.path[p.hop_index + 1]))
    }

    fn current_hop_link(&self, p: &Packet) -> Option<&Link> {
        self.links.get(&self.current_hop_key(p)?)
    }

    pub fn in_flight_count(&self) -> usize {
        self.packets.len() + self.queued_next_tick.len()
    }

    /// Build targeting packets for weapon-carrying teammates when a
    /// track packet is delivered to a command node.
    pub fn distribute_f2t2ea(
        &mut self,
        command_node: &EntityId,
        network_id: &str,
        weapon_nodes: &[EntityId],
        track: &TrackSnapshot,
        latency_s: f64,
        sim_time_s: f64,
        ttl_s: f64,
    ) -> (ExtrapolatedTrack, Vec<Packet>) {
        let extrapolated = datalink::extrapolate(track, latency_s);
        let packets = datalink::build_targeting_packets(command_node, weapon_nodes, network_id, sim_time_s, ttl_s);
        for p in &packets {
            self.enqueue_packet(p.clone());
        }
        (extrapolated, packets)
    }

    /// Star-topology self-heal: if the hub is dead, promote the
    /// highest-scoring alive member and rewire links to it, marking the
    /// old hub's links `Lost`. Mesh/multihop heal implicitly via
    /// re-routing and need no explicit action here.
    pub fn self_heal(&mut self, node_alive: &HashMap<EntityId, bool>, node_score: &HashMap<EntityId, f64>) {
        let network_ids: Vec<String> = self.networks.keys().cloned().collect();
        for network_id in network_ids {
            let Some(net) = self.networks.get(&network_id) else { continue };
            if net.spec.topology != Topology::Star {
                continue;
            }
            let Some(hub) = net.spec.hub.clone() else { continue };
            let hub_alive = *node_alive.get(&hub).unwrap_or(&true);
            if hub_alive {
                self.prev_hub_alive.insert(network_id.clone(), true);
                continue;
            }
            if self.prev_hub_alive.get(&network_id).copied().unwrap_or(true) {
                // Transition to down this tick: mark old links lost.
                for edge in graph::edges_for(&net.spec) {
                    if let Some(l) = self.links.get_mut(&edge) {
                        l.quality = LinkQuality::Lost;
                        l.alive = false;
                    }
                }
            }
            self.prev_hub_alive.insert(network_id.clone(), false);

            let candidate = net
                .spec
                .node_ids
                .iter()
                .filter(|n| **n != hub && *node_alive.get(*n).unwrap_or(&false))
                .max_by(|a, b| {
                    node_score
                        .get(*a)
                        .copied()
                        .unwrap_or(0.0)
                        .partial_cmp(&node_score.get(*b).copied().unwrap_or(0.0))
                        .unwrap()
                })
                .cloned();

            if let (Some(new_hub), Some(net_mut)) = (candidate, self.networks.get_mut(&network_id)) {
                net_mut.spec.hub = Some(new_hub.clone());
                let new_edges = graph::edges_for(&net_mut.spec);
                let link_type = self.links.values().next().map(|l| l.link_type).unwrap_or(LinkType::Rf);
                for edge in new_edges {
                    self.links.entry(edge.clone()).or_insert_with(|| {
                        Link::new(edge.0.clone(), edge.1.clone(), network_id.clone(), link_type, LinkConfig::Rf(default_rf_params()))
                    });
                }
            }
        }
    }
}

fn degrade_one_level_if(quality: LinkQuality, degrade: bool) -> LinkQuality {
    if !degrade {
        return quality;
    }
    match quality {
        LinkQuality::Excellent => LinkQuality::Good,
        LinkQuality::Good => LinkQuality::Degraded,
        LinkQuality::Degraded => LinkQuality::Lost,
        LinkQuality::Lost => LinkQuality::Lost,
    }
}

/// Approximate altitude above the reference ellipsoid for a Cartesian
/// ECI position, used to pick which endpoint of a laser link takes the
/// worse atmospheric penalty.
fn position_altitude_m(p: &Position) -> f64 {
    (p.x * p.x + p.y * p.y + p.z * p.z).sqrt() - arenasim_core::constants::EARTH_RADIUS_M
}

fn effective_utilization(link: &Link, clamp: bool) -> f64 {
    if clamp {
        link.utilization.min(1.0)
    } else {
        link.utilization
    }
}

/// A reasonable default RF link configuration, used for self-heal
/// rewiring and as the convenience default a caller reaches for when a
/// scenario event adds a network without specifying link parameters.
pub fn default_rf_params() -> RfLinkParams {
    RfLinkParams {
        tx_power_dbm: 40.0,
        tx_gain_db: 10.0,
        rx_gain_db: 10.0,
        receiver_sensitivity_dbm: -100.0,
        freq_hz: 2.4e9,
        bandwidth_hz: 1e6,
        temp_k: 290.0,
        tropospheric_fraction: 0.3,
        rain_rate_mm_per_hr: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rf_params() -> RfLinkParams {
        RfLinkParams {
            tx_power_dbm: 50.0,
            tx_gain_db: 15.0,
            rx_gain_db: 15.0,
            receiver_sensitivity_dbm: -100.0,
            freq_hz: 2.4e9,
            bandwidth_hz: 5e6,
            temp_k: 290.0,
            tropospheric_fraction: 0.1,
            rain_rate_mm_per_hr: 0.0,
        }
    }

    fn mesh_spec(nodes: &[&str]) -> NetworkSpec {
        NetworkSpec {
            id: "net1".to_string(),
            topology: Topology::Mesh,
            node_ids: nodes.iter().map(|s| s.to_string()).collect(),
            hub: None,
            custom_edges: Vec::new(),
        }
    }

    #[test]
    fn three_node_mesh_links_are_excellent_at_close_range() {
        let mut engine = CommEngine::new(CommEngineConfig::default());
        engine.add_network(mesh_spec(&["a", "b", "c"]), "net1".into(), LinkType::Rf, LinkConfig::Rf(rf_params()));

        let mut positions = HashMap::new();
        positions.insert("a".to_string(), Position::new(7_000_000.0, 0.0, 0.0));
        positions.insert("b".to_string(), Position::new(7_000_000.0, 50_000.0, 0.0));
        positions.insert("c".to_string(), Position::new(7_000_000.0, 100_000.0, 0.0));

        engine.step_link_budget(&positions, &HashMap::new(), &HashMap::new(), &HashMap::new());
        assert_eq!(engine.links().count(), 3);
        for link in engine.links() {
            assert_eq!(link.quality, LinkQuality::Excellent, "margin={}", link.margin_db);
        }
    }

    #[test]
    fn jammer_in_range_and_los_kills_link() {
        let mut engine = CommEngine::new(CommEngineConfig::default());
        engine.add_network(mesh_spec(&["a", "b"]), "net1".into(), LinkType::Rf, LinkConfig::Rf(rf_params()));
        engine.add_jammer(Jammer {
            id: "j1".into(),
            jammer_type: JammerType::Barrage,
            direction: JamDirection::Both,
            position: Position::new(7_000_000.0, 25_000.0, 0.0),
            power_dbw: 80.0,
            freq_min_hz: 1e9,
            freq_max_hz: 3e9,
            range_m: 30_000.0,
            active: true,
        });

        let mut positions = HashMap::new();
        positions.insert("a".to_string(), Position::new(7_000_000.0, 0.0, 0.0));
        positions.insert("b".to_string(), Position::new(7_000_000.0, 50_000.0, 0.0));

        engine.step_link_budget(&positions, &HashMap::new(), &HashMap::new(), &HashMap::new());
        let link = engine.link(&"a".to_string(), &"b".to_string()).unwrap();
        assert_eq!(link.quality, LinkQuality::Lost);
    }

    #[test]
    fn dijkstra_route_cost_matches_edge_sum() {
        let mut engine = CommEngine::new(CommEngineConfig::default());
        engine.add_network(mesh_spec(&["a", "b", "c"]), "net1".into(), LinkType::Rf, LinkConfig::Rf(rf_params()));
        let mut positions = HashMap::new();
        positions.insert("a".to_string(), Position::new(7_000_000.0, 0.0, 0.0));
        positions.insert("b".to_string(), Position::new(7_000_000.0, 20_000.0, 0.0));
        positions.insert("c".to_string(), Position::new(7_000_000.0, 40_000.0, 0.0));
        engine.step_link_budget(&positions, &HashMap::new(), &HashMap::new(), &HashMap::new());

        let route = engine.route("a", "c").expect("route should exist");
        let adjacency = engine.build_adjacency();
        let mut sum = 0.0;
        for pair in route.path.windows(2) {
            let (_, edge) = adjacency[&pair[0]].iter().find(|(n, _)| n == &pair[1]).unwrap();
            sum += edge.cost;
        }
        assert!((sum - route.total_cost).abs() < 1e-6);
    }

    #[test]
    fn packet_conservation_total_sent_equals_delivered_plus_dropped_plus_inflight() {
        let mut engine = CommEngine::new(CommEngineConfig::default());
        engine.add_network(mesh_spec(&["a", "b"]), "net1".into(), LinkType::Rf, LinkConfig::Rf(rf_params()));
        let mut positions = HashMap::new();
        positions.insert("a".to_string(), Position::new(7_000_000.0, 0.0, 0.0));
        positions.insert("b".to_string(), Position::new(7_000_000.0, 10_000.0, 0.0));
        engine.step_link_budget(&positions, &HashMap::new(), &HashMap::new(), &HashMap::new());

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut alive = HashMap::new();
        alive.insert("a".to_string(), true);
        alive.insert("b".to_string(), true);

        engine.enqueue_packet(Packet::new("p1".into(), PacketType::Track, 5, "a".into(), "b".into(), "net1".into(), 30.0, 200, 0.0));
        let total_sent = 1;
        let mut delivered_count = 0;
        let mut dropped_count = 0;
        for tick in 0..20 {
            let delivered = engine.advance_packets(tick as f64 * 0.5, 0.5, &alive, &mut rng);
            delivered_count += delivered.len();
            let total_log: usize = engine.metrics.log.len();
            dropped_count = total_log - delivered_count;
            if engine.in_flight_count() == 0 && (delivered_count + dropped_count) > 0 {
                break;
            }
        }
        assert_eq!(total_sent, delivered_count + dropped_count + engine.in_flight_count());
    }
}
