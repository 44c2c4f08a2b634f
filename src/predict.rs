use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Application;

/// Inputs to the heuristic scorer. `location` and `resume_version` do not
/// affect the probability, only the reported confidence.
#[derive(Debug, Clone, Default)]
pub struct PredictionInput {
    pub source: String,
    pub status: String,
    pub work_type: Option<String>,
    pub cover_letter_used: bool,
    pub location: Option<String>,
    pub resume_version: Option<String>,
}

impl PredictionInput {
    pub fn from_application(app: &Application) -> Self {
        let work_type = match app.job_type.as_str() {
            "Remote" | "Hybrid" | "On-site" => Some(app.job_type.clone()),
            _ => None, // "Unsure" carries no signal
        };
        Self {
            source: app.found_on.clone(),
            status: app.status.clone(),
            work_type,
            cover_letter_used: app.cover_letter_used,
            location: None,
            resume_version: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub success_probability: f64,
    pub confidence: f64,
    pub factors: BTreeMap<String, String>,
    pub recommendation: String,
}

const BASE_PROBABILITY: f64 = 0.35;
const MIN_PROBABILITY: f64 = 0.05;
const MAX_PROBABILITY: f64 = 0.95;

/// Fixed linear scoring rule. Starts at a 0.35 base, adds or subtracts
/// fixed deltas per categorical input, then clamps to [0.05, 0.95].
/// Explicitly a toy rule, not a trained model.
pub fn calculate_prediction(input: &PredictionInput) -> Prediction {
    let mut prob = BASE_PROBABILITY;
    let mut factors = BTreeMap::new();

    match input.source.to_lowercase().as_str() {
        "referral" => {
            prob += 0.25;
            factors.insert(
                "referral".to_string(),
                "+25% (strong referral advantage)".to_string(),
            );
        }
        "linkedin" => {
            prob += 0.05;
            factors.insert(
                "source".to_string(),
                "+5% (LinkedIn application)".to_string(),
            );
        }
        _ => {
            factors.insert("source".to_string(), "0% (standard application)".to_string());
        }
    }

    if input.cover_letter_used {
        prob += 0.10;
        factors.insert(
            "coverLetter".to_string(),
            "+10% (customized cover letter)".to_string(),
        );
    } else {
        prob -= 0.05;
        factors.insert("coverLetter".to_string(), "-5% (no cover letter)".to_string());
    }

    match input.work_type.as_deref() {
        Some("Remote") => {
            prob -= 0.05;
            factors.insert(
                "workType".to_string(),
                "-5% (remote = more competitive)".to_string(),
            );
        }
        Some("On-site") => {
            prob += 0.05;
            factors.insert(
                "workType".to_string(),
                "+5% (on-site = less competitive)".to_string(),
            );
        }
        _ => {
            factors.insert("workType".to_string(), "0% (hybrid)".to_string());
        }
    }

    match input.status.as_str() {
        "Interview" => {
            prob += 0.30;
            factors.insert(
                "status".to_string(),
                "+30% (already in interview stage)".to_string(),
            );
        }
        "Screening" => {
            prob += 0.15;
            factors.insert(
                "status".to_string(),
                "+15% (passed initial screening)".to_string(),
            );
        }
        _ => {}
    }

    let final_prob = prob.clamp(MIN_PROBABILITY, MAX_PROBABILITY);

    // Two-level confidence: higher when the optional fields are filled in
    let confidence =
        if input.location.is_some() && input.work_type.is_some() && input.resume_version.is_some() {
            0.85
        } else {
            0.70
        };

    Prediction {
        success_probability: round3(final_prob),
        confidence,
        factors,
        recommendation: recommendation_for(final_prob).to_string(),
    }
}

fn recommendation_for(prob: f64) -> &'static str {
    if prob >= 0.7 {
        "Strong candidate! Follow up in 3-5 days if no response."
    } else if prob >= 0.5 {
        "Good chances. Prepare for potential interview."
    } else if prob >= 0.3 {
        "Average odds. Continue applying to similar roles."
    } else {
        "Low probability. Focus efforts on stronger opportunities."
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(source: &str, status: &str, work_type: Option<&str>, cover: bool) -> PredictionInput {
        PredictionInput {
            source: source.to_string(),
            status: status.to_string(),
            work_type: work_type.map(String::from),
            cover_letter_used: cover,
            location: None,
            resume_version: None,
        }
    }

    #[test]
    fn test_referral_interview_cover_letter_is_clamped_high() {
        // 0.35 + 0.25 + 0.10 + 0.30 = 1.00, clamped to 0.95
        let pred = calculate_prediction(&input("Referral", "Interview", None, true));
        assert_eq!(pred.success_probability, 0.95);
        assert!(pred.factors.contains_key("referral"));
        assert!(pred.factors.contains_key("coverLetter"));
        assert!(pred.factors.contains_key("status"));
    }

    #[test]
    fn test_floor_clamp() {
        // 0.35 - 0.05 - 0.05 = 0.25 is above the floor; no valid
        // combination actually reaches it, but the clamp still applies
        let pred = calculate_prediction(&input("Indeed", "Applied", Some("Remote"), false));
        assert_eq!(pred.success_probability, 0.25);
        assert!(pred.success_probability >= 0.05);
    }

    #[test]
    fn test_source_deltas() {
        let referral = calculate_prediction(&input("referral", "Applied", None, false));
        let linkedin = calculate_prediction(&input("LinkedIn", "Applied", None, false));
        let other = calculate_prediction(&input("Indeed", "Applied", None, false));

        assert_eq!(referral.success_probability, 0.55);
        assert_eq!(linkedin.success_probability, 0.35);
        assert_eq!(other.success_probability, 0.30);
        assert_eq!(
            other.factors.get("source").map(String::as_str),
            Some("0% (standard application)")
        );
    }

    #[test]
    fn test_status_deltas() {
        let screening = calculate_prediction(&input("Indeed", "Screening", None, false));
        assert_eq!(screening.success_probability, 0.45);
        assert_eq!(
            screening.factors.get("status").map(String::as_str),
            Some("+15% (passed initial screening)")
        );

        // No status factor line outside Interview/Screening
        let applied = calculate_prediction(&input("Indeed", "Applied", None, false));
        assert!(!applied.factors.contains_key("status"));
    }

    #[test]
    fn test_work_type_deltas() {
        let onsite = calculate_prediction(&input("Indeed", "Applied", Some("On-site"), false));
        let hybrid = calculate_prediction(&input("Indeed", "Applied", Some("Hybrid"), false));
        let remote = calculate_prediction(&input("Indeed", "Applied", Some("Remote"), false));
        assert_eq!(onsite.success_probability, 0.35);
        assert_eq!(hybrid.success_probability, 0.30);
        assert_eq!(remote.success_probability, 0.25);
    }

    #[test]
    fn test_probability_always_within_bounds() {
        let sources = ["Referral", "LinkedIn", "Indeed", "Other", ""];
        let statuses = ["Applied", "Screening", "Interview", "Offer", "Rejected", "Withdrawn"];
        let work_types = [None, Some("Remote"), Some("Hybrid"), Some("On-site")];

        for source in sources {
            for status in statuses {
                for work_type in work_types {
                    for cover in [true, false] {
                        let pred =
                            calculate_prediction(&input(source, status, work_type, cover));
                        assert!(
                            (0.05..=0.95).contains(&pred.success_probability),
                            "out of bounds for {source}/{status}/{work_type:?}/{cover}: {}",
                            pred.success_probability
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_confidence_levels() {
        let low = calculate_prediction(&input("Indeed", "Applied", Some("Remote"), false));
        assert_eq!(low.confidence, 0.70);

        let mut full = input("Indeed", "Applied", Some("Remote"), false);
        full.location = Some("Seattle, WA".to_string());
        full.resume_version = Some("v3".to_string());
        let high = calculate_prediction(&full);
        assert_eq!(high.confidence, 0.85);
    }

    #[test]
    fn test_recommendation_tiers() {
        assert!(recommendation_for(0.75).starts_with("Strong candidate"));
        assert!(recommendation_for(0.55).starts_with("Good chances"));
        assert!(recommendation_for(0.35).starts_with("Average odds"));
        assert!(recommendation_for(0.10).starts_with("Low probability"));
    }

    #[test]
    fn test_from_application_drops_unsure_work_type() {
        let mut app = crate::models::Application {
            id: 1,
            company: "Acme".to_string(),
            job_title: "Engineer".to_string(),
            salary: None,
            job_type: "Unsure".to_string(),
            job_url: None,
            date_applied: chrono::NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            found_on: "Referral".to_string(),
            cover_letter_used: true,
            number_of_rounds: None,
            date_of_outcome: None,
            notes: None,
            status: "Interview".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let input = PredictionInput::from_application(&app);
        assert_eq!(input.work_type, None);
        assert_eq!(input.source, "Referral");
        assert!(input.cover_letter_used);

        app.job_type = "On-site".to_string();
        let input = PredictionInput::from_application(&app);
        assert_eq!(input.work_type.as_deref(), Some("On-site"));
    }
}
