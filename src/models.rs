use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single tracked job application.
///
/// `status` and `job_type` go through the normalizers before every write,
/// so stored values are canonical (or a title-cased echo of an
/// unrecognized input).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub company: String,
    pub job_title: String,
    pub salary: Option<String>, // free text, e.g. "$100k-$120k"
    pub job_type: String,       // "Remote", "Hybrid", "On-site", "Unsure"
    pub job_url: Option<String>,
    pub date_applied: NaiveDate,
    pub found_on: String, // "LinkedIn", "Indeed", "Referral", etc.
    pub cover_letter_used: bool,
    pub number_of_rounds: Option<u32>,
    pub date_of_outcome: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: String, // "Applied", "Screening", "Interview", "Offer", "Rejected", "Withdrawn"
    pub created_at: String,
    pub updated_at: String,
}

impl Application {
    /// True once the application has a recorded offer/rejection date.
    pub fn has_outcome(&self) -> bool {
        self.date_of_outcome.is_some()
    }

    /// True once at least one interview round has happened.
    pub fn has_interviews(&self) -> bool {
        self.number_of_rounds.is_some_and(|n| n > 0)
    }
}
