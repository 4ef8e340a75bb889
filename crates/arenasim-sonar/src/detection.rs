//! Signal excess, detection probability, and classification from the
//! sonar equation.

use arenasim_core::enums::Classification;

use crate::array::ArrayType;
use crate::propagation::{ambient_noise_db, transmission_loss_db, PropagationContext};
use crate::source_level::source_level_db;

/// Nominal detection threshold for a broadband passive processor.
const DETECTION_THRESHOLD_DB: f64 = 10.0;

/// One passive-sonar detection attempt, resolved to a margin, a
/// probability, and a classification verdict.
#[derive(Debug, Clone, Copy)]
pub struct DetectionResult {
    pub signal_excess_db: f64,
    pub probability: f64,
    pub classification: Classification,
}

#[allow(clippy::too_many_arguments)]
pub fn detect(
    target_speed_kts: f64,
    target_is_submarine: bool,
    target_is_surfaced: bool,
    array: ArrayType,
    sea_state: u8,
    propagation: &PropagationContext,
) -> DetectionResult {
    let sl = source_level_db(target_speed_kts, target_is_submarine, target_is_surfaced);
    let tl = transmission_loss_db(propagation);
    let nl = ambient_noise_db(sea_state);
    let signal_excess_db = sl - tl - nl + array.di_db() + array.pg_db() - DETECTION_THRESHOLD_DB;

    let probability = 1.0 / (1.0 + (-signal_excess_db / 3.0).exp());

    let classification = if signal_excess_db > 20.0 {
        Classification::Hostile
    } else if signal_excess_db > 10.0 {
        Classification::Suspect
    } else {
        Classification::Unknown
    };

    DetectionResult { signal_excess_db, probability, classification }
}
