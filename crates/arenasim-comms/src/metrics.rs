//! Sliding-window delivery metrics and the completed-packet log
//! ("Metrics").

use std::collections::VecDeque;

use arenasim_core::constants::{METRICS_WINDOW_SECS, PACKET_LOG_CAPACITY};
use arenasim_core::enums::DropReason;

use crate::packet::Packet;

/// One completed packet's outcome, enough to replay in a packet log query.
#[derive(Debug, Clone)]
pub struct PacketLogEntry {
    pub packet_id: String,
    pub delivered: bool,
    pub drop_reason: Option<DropReason>,
    pub sim_time_s: f64,
    pub latency_s: f64,
}

struct WindowSample {
    sim_time_s: f64,
    delivered: bool,
    latency_s: f64,
    bytes: u64,
}

/// Sliding 30s window of delivery outcomes, plus a size-1000 circular
/// log of completed packets in chronological order.
pub struct CommsMetrics {
    window: VecDeque<WindowSample>,
    pub(crate) log: VecDeque<PacketLogEntry>,
}

impl Default for CommsMetrics {
    fn default() -> Self {
        Self { window: VecDeque::new(), log: VecDeque::new() }
    }
}

impl CommsMetrics {
    pub fn record_delivered(&mut self, packet: &Packet, sim_time_s: f64) {
        let latency_s = sim_time_s - packet.created_at_s;
        self.window.push_back(WindowSample {
            sim_time_s,
            delivered: true,
            latency_s,
            bytes: packet.bytes,
        });
        self.push_log(PacketLogEntry {
            packet_id: packet.id.clone(),
            delivered: true,
            drop_reason: None,
            sim_time_s,
            latency_s,
        });
        self.evict_stale(sim_time_s);
    }

    pub fn record_dropped(&mut self, packet: &Packet, reason: DropReason, sim_time_s: f64) {
        self.window.push_back(WindowSample {
            sim_time_s,
            delivered: false,
            latency_s: sim_time_s - packet.created_at_s,
            bytes: 0,
        });
        self.push_log(PacketLogEntry {
            packet_id: packet.id.clone(),
            delivered: false,
            drop_reason: Some(reason),
            sim_time_s,
            latency_s: sim_time_s - packet.created_at_s,
        });
        self.evict_stale(sim_time_s);
    }

    fn push_log(&mut self, entry: PacketLogEntry) {
        self.log.push_back(entry);
        while self.log.len() > PACKET_LOG_CAPACITY {
            self.log.pop_front();
        }
    }

    fn evict_stale(&mut self, sim_time_s: f64) {
        while let Some(front) = self.window.front() {
            if sim_time_s - front.sim_time_s > METRICS_WINDOW_SECS {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }

    /// Fraction of window samples that were delivered.
    pub fn delivery_rate(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let delivered = self.window.iter().filter(|s| s.delivered).count();
        delivered as f64 / self.window.len() as f64
    }

    /// Average latency (s) across delivered packets in the window.
    pub fn average_latency_s(&self) -> f64 {
        let delivered: Vec<&WindowSample> = self.window.iter().filter(|s| s.delivered).collect();
        if delivered.is_empty() {
            return 0.0;
        }
        delivered.iter().map(|s| s.latency_s).sum::<f64>() / delivered.len() as f64
    }

    /// Throughput in bytes/sec over the window.
    pub fn throughput_bps(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let span = (self
            .window
            .back()
            .map(|s| s.sim_time_s)
            .unwrap_or(0.0)
            - self.window.front().map(|s| s.sim_time_s).unwrap_or(0.0))
        .max(1e-6);
        let total_bytes: u64 = self.window.iter().map(|s| s.bytes).sum();
        total_bytes as f64 * 8.0 / span
    }

    pub fn log(&self) -> impl Iterator<Item = &PacketLogEntry> {
        self.log.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arenasim_core::enums::PacketType;

    fn packet() -> Packet {
        Packet::new("p1".into(), PacketType::Track, 5, "a".into(), "b".into(), "net".into(), 30.0, 1000, 0.0)
    }

    #[test]
    fn delivery_rate_reflects_mixed_outcomes() {
        let mut m = CommsMetrics::default();
        m.record_delivered(&packet(), 1.0);
        m.record_dropped(&packet(), DropReason::Bandwidth, 2.0);
        assert!((m.delivery_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn window_evicts_samples_older_than_30s() {
        let mut m = CommsMetrics::default();
        m.record_delivered(&packet(), 0.0);
        m.record_delivered(&packet(), 40.0);
        assert_eq!(m.delivery_rate(), 1.0);
        assert_eq!(m.window.len(), 1);
    }

    #[test]
    fn log_caps_at_capacity() {
        let mut m = CommsMetrics::default();
        for i in 0..(PACKET_LOG_CAPACITY + 10) {
            let mut p = packet();
            p.id = format!("p{i}");
            m.record_delivered(&p, i as f64);
        }
        assert_eq!(m.log.len(), PACKET_LOG_CAPACITY);
    }
}
