//! Tactical datalink: 1 Hz track sharing, and F2T2EA distribution when a
//! track packet reaches a command node.

use arenasim_core::constants::EARTH_RADIUS_M;
use arenasim_core::enums::PacketType;
use arenasim_core::EntityId;

use crate::packet::Packet;

#[derive(Debug, Clone, Copy)]
pub struct TrackSnapshot {
    pub lat: f64,
    pub lon: f64,
    pub speed: f64,
    pub heading: f64,
}

/// Extrapolated track position plus an uncertainty radius, after transit.
#[derive(Debug, Clone, Copy)]
pub struct ExtrapolatedTrack {
    pub lat: f64,
    pub lon: f64,
    pub uncertainty_m: f64,
}

const UNCERTAINTY_PER_METER_TRAVELED: f64 = 0.02;

/// Extrapolate a track's position forward by `latency_s` of travel time
/// and attach a position uncertainty proportional to the distance
/// travelled while in transit.
pub fn extrapolate(track: &TrackSnapshot, latency_s: f64) -> ExtrapolatedTrack {
    let travel_m = track.speed * latency_s;
    let d_north = travel_m * track.heading.cos();
    let d_east = travel_m * track.heading.sin();
    let lat = track.lat + d_north / EARTH_RADIUS_M;
    let lon = track.lon + d_east / (EARTH_RADIUS_M * track.lat.cos().max(1e-6));
    ExtrapolatedTrack { lat, lon, uncertainty_m: travel_m * UNCERTAINTY_PER_METER_TRAVELED }
}

/// Build one targeting packet (priority 9) per weapon-carrying teammate
/// on a shared network, for a track delivered to a command node.
pub fn build_targeting_packets(
    command_node: &EntityId,
    weapon_nodes: &[EntityId],
    network_id: &str,
    sim_time_s: f64,
    ttl_s: f64,
) -> Vec<Packet> {
    weapon_nodes
        .iter()
        .filter(|node| *node != command_node)
        .enumerate()
        .map(|(i, node)| {
            let mut packet = Packet::new(
                format!("{command_node}-targeting-{sim_time_s}-{i}"),
                PacketType::Targeting,
                9,
                command_node.clone(),
                node.clone(),
                network_id.to_string(),
                ttl_s,
                512,
                sim_time_s,
            );
            packet.path = vec![command_node.clone(), node.clone()];
            packet
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extrapolation_moves_track_in_heading_direction() {
        let track = TrackSnapshot { lat: 0.5, lon: 0.2, speed: 250.0, heading: 0.0 };
        let moved = extrapolate(&track, 2.0);
        assert!(moved.lat > track.lat);
        assert!((moved.lon - track.lon).abs() < 1e-9);
    }

    #[test]
    fn uncertainty_grows_with_travel_distance() {
        let track = TrackSnapshot { lat: 0.5, lon: 0.2, speed: 250.0, heading: 0.3 };
        let near = extrapolate(&track, 0.5);
        let far = extrapolate(&track, 5.0);
        assert!(far.uncertainty_m > near.uncertainty_m);
    }

    #[test]
    fn targeting_packets_exclude_the_command_node_itself() {
        let nodes = vec!["cmd".to_string(), "w1".to_string(), "w2".to_string()];
        let packets = build_targeting_packets(&"cmd".to_string(), &nodes, "net", 10.0, 30.0);
        assert_eq!(packets.len(), 2);
        assert!(packets.iter().all(|p| p.priority == 9));
    }
}
