use crate::config::ServiceConfig;
use crate::model::{
    ConstructionEstimate, MaxAduSize, PropertyDetails, PropertyReport, Setbacks,
    SubmissionRecord, Zoning,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

pub const ADU_ALLOWED_PROBABILITY: f64 = 0.8;

pub const ADU_ALLOWED_NOTES: [&str; 4] = [
    "Property is eligible for ADU development",
    "Zoning allows for accessory dwelling units",
    "Check with local planning department for specific ADU requirements",
    "Consider consulting with an architect for ADU design options",
];

pub const ADU_DISALLOWED_NOTES: [&str; 3] = [
    "Current zoning may not permit ADU construction",
    "Zoning variance might be required for ADU development",
    "Consider consulting with the planning department about ADU options",
];

pub const GENERAL_NOTES: [&str; 5] = [
    "Property is in a neighborhood with growing property values",
    "Check for utility access for any ADU construction",
    "Consider solar orientation for optimal energy efficiency",
    "Verify if property is in a historic district or has special requirements",
    "Water and sewer connections may require upgrades for additional unit",
];

pub const NEXT_STEPS: [&str; 4] = [
    "Schedule a consultation with a local architect",
    "Contact your municipality's planning department",
    "Research local ADU regulations and requirements",
    "Consider financing options for your ADU project",
];

pub const ESTIMATE_DISCLAIMER: &str = "Estimates are approximate and subject to change based on specific design, materials, and contractor selection.";

/// Produces a report for a record. Must not fail and must not do I/O.
pub trait ReportGenerator: Send + Sync {
    fn generate(&self, record: &SubmissionRecord) -> PropertyReport;
}

/// Placeholder analysis: random values in fixed ranges, keyed only on the
/// record's address for display. Imagery is left empty; it is attached when
/// the report is served, never stored.
pub fn generate_report<R: Rng + ?Sized>(record: &SubmissionRecord, rng: &mut R) -> PropertyReport {
    let lot_size_sq_ft = rng.gen_range(4000..=10000);
    let zoning = Zoning::ALL[rng.gen_range(0..Zoning::ALL.len())];
    let allows_adu = rng.gen_bool(ADU_ALLOWED_PROBABILITY);
    let max_adu_size_sq_ft = if allows_adu {
        MaxAduSize::SqFt(rng.gen_range(600..=1200))
    } else {
        MaxAduSize::NotApplicable
    };
    let setbacks = Setbacks {
        front: rng.gen_range(15..=30),
        back: rng.gen_range(10..=20),
        sides: rng.gen_range(5..=10),
    };
    let notes = pick_notes(allows_adu, rng);

    // low and high ranges meet at 150k, so low == high is possible
    let construction_estimate = ConstructionEstimate {
        low_estimate_usd: rng.gen_range(100..=150) * 1000,
        high_estimate_usd: rng.gen_range(150..=250) * 1000,
        estimate_disclaimer: ESTIMATE_DISCLAIMER.to_string(),
    };

    PropertyReport {
        property_details: PropertyDetails {
            address: record.address.clone(),
            lot_size_sq_ft,
            zoning,
            allows_adu,
            max_adu_size_sq_ft,
            setbacks,
        },
        notes,
        construction_estimate,
        next_steps: NEXT_STEPS.iter().map(|s| s.to_string()).collect(),
        generated_at: Utc::now(),
        imagery: None,
    }
}

/// One note for the ADU outcome, then 1-3 distinct general notes.
fn pick_notes<R: Rng + ?Sized>(allows_adu: bool, rng: &mut R) -> Vec<String> {
    let pool: &[&str] = if allows_adu {
        &ADU_ALLOWED_NOTES
    } else {
        &ADU_DISALLOWED_NOTES
    };
    let mut notes = vec![pool[rng.gen_range(0..pool.len())].to_string()];

    let extra = rng.gen_range(1..=3);
    for note in GENERAL_NOTES.choose_multiple(rng, extra) {
        if !notes.iter().any(|n| n == note) {
            notes.push(note.to_string());
        }
    }
    notes
}

pub struct RandomReportGenerator {
    seeded: Option<Mutex<StdRng>>,
}

impl Default for RandomReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomReportGenerator {
    /// Thread-local entropy for every report.
    pub fn new() -> Self {
        Self { seeded: None }
    }

    /// Reproducible sequence of reports from one seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seeded: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    pub fn from_config(cfg: &ServiceConfig) -> Self {
        match cfg.report_seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }
}

impl ReportGenerator for RandomReportGenerator {
    fn generate(&self, record: &SubmissionRecord) -> PropertyReport {
        match &self.seeded {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                generate_report(record, &mut *rng)
            }
            None => generate_report(record, &mut rand::thread_rng()),
        }
    }
}
