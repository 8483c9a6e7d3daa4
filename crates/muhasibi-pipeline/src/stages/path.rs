//! PATH: a deterministic plan and difficulty label. Never
//! calls the model — entity count and intent are enough to derive both,
//! and a fixed plan is reproducible by construction.

use muhasibi_core::models::Difficulty;
use muhasibi_model::schema::IntentType;

use crate::context::PathOutput;

const DEFAULT_PLAN: [&str; 4] = [
    "استخراج الكيانات",
    "استرجاع التعريفات والأدلة",
    "التحقق من التغطية",
    "الصياغة مع الاستشهاد",
];

/// Run PATH over the entity count and classified intent from LISTEN.
#[must_use]
pub fn run_path(entity_count: usize, intent: IntentType) -> PathOutput {
    let base = match entity_count {
        0 => Difficulty::Hard,
        1 => Difficulty::Medium,
        _ => Difficulty::Easy,
    };
    let bumps_harder = matches!(intent, IntentType::Comparison | IntentType::ConnectAcrossPillars);
    let difficulty = if bumps_harder { one_level_harder(base) } else { base };

    PathOutput {
        plan: DEFAULT_PLAN.iter().map(|s| (*s).to_string()).collect(),
        difficulty,
    }
}

fn one_level_harder(d: Difficulty) -> Difficulty {
    match d {
        Difficulty::Easy => Difficulty::Medium,
        Difficulty::Medium | Difficulty::Hard => Difficulty::Hard,
    }
}
