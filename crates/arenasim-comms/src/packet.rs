//! Packet forwarding: priority-ordered per-tick advancement across a
//! routed path, with capacity, loss, and hop-timing rules
//!

use arenasim_core::enums::{DropReason, LinkQuality, LinkType, PacketType};
use arenasim_core::EntityId;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct Packet {
    pub id: String,
    pub packet_type: PacketType,
    pub priority: u8,
    pub source: EntityId,
    pub destination: EntityId,
    pub network_id: String,
    pub ttl_s: f64,
    pub created_at_s: f64,
    pub bytes: u64,
    pub path: Vec<EntityId>,
    pub hop_index: usize,
    pub hop_start_time_s: f64,
    pub bytes_sent_8: u64,
}

impl Packet {
    pub fn new(
        id: String,
        packet_type: PacketType,
        priority: u8,
        source: EntityId,
        destination: EntityId,
        network_id: String,
        ttl_s: f64,
        bytes: u64,
        created_at_s: f64,
    ) -> Self {
        Self {
            id,
            packet_type,
            priority,
            source,
            destination,
            network_id,
            ttl_s,
            created_at_s,
            bytes,
            path: Vec::new(),
            hop_index: 0,
            hop_start_time_s: created_at_s,
            bytes_sent_8: 0,
        }
    }

    fn current_hop_edge(&self) -> Option<(&str, &str)> {
        if self.hop_index + 1 >= self.path.len() {
            return None;
        }
        Some((&self.path[self.hop_index], &self.path[self.hop_index + 1]))
    }
}

/// Physical state of one hop's link, as seen by the packet engine.
#[derive(Debug, Clone, Copy)]
pub struct HopLink {
    pub link_type: LinkType,
    pub quality: LinkQuality,
    pub capacity_bps: f64,
    pub latency_ms: f64,
    pub packet_loss: f64,
    pub next_node_bricked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    Delivered,
    Dropped(DropReason),
    QueuedNextTick,
    Waiting,
    Advanced,
}

/// Sort packets by descending priority before per-tick advancement.
pub fn sort_by_priority(packets: &mut [Packet]) {
    packets.sort_by(|a, b| b.priority.cmp(&a.priority));
}

#[allow(clippy::too_many_arguments)]
pub fn advance(
    packet: &mut Packet,
    sim_time_s: f64,
    dt: f64,
    hop_link: Option<&HopLink>,
    destination_alive: bool,
    source_alive: bool,
    needs_reroute: bool,
    bytes_sent_this_tick: &mut u64,
    rng: &mut ChaCha8Rng,
) -> AdvanceOutcome {
    if sim_time_s - packet.created_at_s > packet.ttl_s {
        return AdvanceOutcome::Dropped(DropReason::TtlExceeded);
    }
    if !source_alive || !destination_alive {
        return AdvanceOutcome::Dropped(DropReason::NodeDead);
    }
    if packet.current_hop_edge().is_none() {
        return AdvanceOutcome::Delivered;
    }
    if needs_reroute {
        return AdvanceOutcome::Dropped(DropReason::NoRoute);
    }

    let Some(link) = hop_link else {
        return AdvanceOutcome::Dropped(DropReason::NoRoute);
    };
    if link.quality == LinkQuality::Lost {
        return AdvanceOutcome::Dropped(DropReason::LinkLost);
    }
    if link.next_node_bricked {
        return AdvanceOutcome::Dropped(DropReason::Cyber);
    }

    let bits_available = link.capacity_bps * dt - (*bytes_sent_this_tick as f64) * 8.0;
    let packet_bits = (packet.bytes as f64) * 8.0;
    if packet_bits > bits_available.max(0.0) {
        if packet.priority >= 8 {
            // Preempts: falls through and is charged anyway, marking
            // the link saturated (caller's responsibility to flag it).
        } else if packet.priority >= 5 {
            return AdvanceOutcome::QueuedNextTick;
        } else {
            return AdvanceOutcome::Dropped(DropReason::Bandwidth);
        }
    }

    if rng.r#gen::<f64>() < link.packet_loss {
        return AdvanceOutcome::Dropped(DropReason::Jammed);
    }

    let min_hop_time_s = link.latency_ms / 1000.0;
    if sim_time_s - packet.hop_start_time_s < min_hop_time_s {
        return AdvanceOutcome::Waiting;
    }

    *bytes_sent_this_tick += packet.bytes;
    packet.bytes_sent_8 += packet.bytes * 8;
    packet.hop_index += 1;
    packet.hop_start_time_s = sim_time_s;

    if packet.hop_index + 1 >= packet.path.len() {
        AdvanceOutcome::Delivered
    } else {
        AdvanceOutcome::Advanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn clean_link() -> HopLink {
        HopLink {
            link_type: LinkType::Rf,
            quality: LinkQuality::Excellent,
            capacity_bps: 1_000_000.0,
            latency_ms: 5.0,
            packet_loss: 0.0,
            next_node_bricked: false,
        }
    }

    fn two_hop_packet() -> Packet {
        let mut p = Packet::new(
            "p1".to_string(),
            PacketType::Track,
            5,
            "src".to_string(),
            "dst".to_string(),
            "net".to_string(),
            30.0,
            1000,
            0.0,
        );
        p.path = vec!["src".to_string(), "mid".to_string(), "dst".to_string()];
        p
    }

    #[test]
    fn ttl_exceeded_drops_packet() {
        let mut p = two_hop_packet();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sent = 0u64;
        let outcome = advance(&mut p, 60.0, 0.1, Some(&clean_link()), true, true, false, &mut sent, &mut rng);
        assert_eq!(outcome, AdvanceOutcome::Dropped(DropReason::TtlExceeded));
    }

    #[test]
    fn lost_link_drops_with_link_lost_reason() {
        let mut p = two_hop_packet();
        let mut link = clean_link();
        link.quality = LinkQuality::Lost;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sent = 0u64;
        let outcome = advance(&mut p, 0.0, 0.1, Some(&link), true, true, false, &mut sent, &mut rng);
        assert_eq!(outcome, AdvanceOutcome::Dropped(DropReason::LinkLost));
    }

    #[test]
    fn waits_until_minimum_hop_latency_elapses() {
        let mut p = two_hop_packet();
        p.hop_start_time_s = 0.0;
        let mut link = clean_link();
        link.latency_ms = 100.0;
        link.packet_loss = 0.0;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sent = 0u64;
        let outcome = advance(&mut p, 0.02, 0.02, Some(&link), true, true, false, &mut sent, &mut rng);
        assert_eq!(outcome, AdvanceOutcome::Waiting);
    }

    #[test]
    fn low_priority_drops_on_bandwidth_exhaustion() {
        let mut p = two_hop_packet();
        p.priority = 2;
        p.bytes = 10_000_000;
        let link = clean_link();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sent = 0u64;
        let outcome = advance(&mut p, 0.0, 0.01, Some(&link), true, true, false, &mut sent, &mut rng);
        assert_eq!(outcome, AdvanceOutcome::Dropped(DropReason::Bandwidth));
    }

    #[test]
    fn high_priority_preempts_bandwidth_limit() {
        let mut p = two_hop_packet();
        p.priority = 9;
        p.bytes = 10_000_000;
        let link = clean_link();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sent = 0u64;
        let outcome = advance(&mut p, 0.0, 0.01, Some(&link), true, true, false, &mut sent, &mut rng);
        assert_eq!(outcome, AdvanceOutcome::Advanced);
    }

    #[test]
    fn last_hop_delivers() {
        let mut p = two_hop_packet();
        p.hop_index = 1;
        let link = clean_link();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sent = 0u64;
        let outcome = advance(&mut p, 0.0, 0.1, Some(&link), true, true, false, &mut sent, &mut rng);
        assert_eq!(outcome, AdvanceOutcome::Delivered);
    }
}
