use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

use crate::models::Application;
use crate::normalize::parse_salary;

/// Aggregate view over the recorded applications. Pure computation; the
/// CLI decides how to render it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub total: usize,
    pub status_counts: Vec<(String, usize)>,
    pub source_counts: Vec<(String, usize)>,
    pub job_type_counts: Vec<(String, usize)>,
    pub with_outcomes: usize,
    pub with_cover_letters: usize,
    pub with_interviews: usize,
    pub recent_applications: usize,
    pub avg_response_days: i64,
    pub salary: Option<SalaryInsight>,
}

/// Average parsed salary band, in thousands, over applications whose
/// salary field parses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalaryInsight {
    pub avg_min: f64,
    pub avg_max: f64,
    pub sample_size: usize,
}

impl Stats {
    pub fn compute(applications: &[Application], today: NaiveDate) -> Self {
        let total = applications.len();

        let status_counts = count_by(applications, |app| Some(app.status.clone()));
        let source_counts = count_by(applications, |app| Some(app.found_on.clone()));
        let job_type_counts = count_by(applications, |app| {
            if app.job_type.is_empty() {
                None
            } else {
                Some(app.job_type.clone())
            }
        });

        let with_outcomes = applications.iter().filter(|a| a.has_outcome()).count();
        let with_cover_letters = applications.iter().filter(|a| a.cover_letter_used).count();
        let with_interviews = applications.iter().filter(|a| a.has_interviews()).count();

        let cutoff = today.checked_sub_days(Days::new(30)).unwrap_or(today);
        let recent_applications = applications
            .iter()
            .filter(|a| a.date_applied >= cutoff)
            .count();

        // Days between application and outcome, averaged over the
        // applications that have an outcome date
        let response_days: Vec<i64> = applications
            .iter()
            .filter_map(|a| {
                a.date_of_outcome
                    .map(|outcome| (outcome - a.date_applied).num_days())
            })
            .collect();
        let avg_response_days = if response_days.is_empty() {
            0
        } else {
            let sum: i64 = response_days.iter().sum();
            (sum as f64 / response_days.len() as f64).round() as i64
        };

        let salary = salary_insight(applications);

        Stats {
            total,
            status_counts,
            source_counts,
            job_type_counts,
            with_outcomes,
            with_cover_letters,
            with_interviews,
            recent_applications,
            avg_response_days,
            salary,
        }
    }
}

fn count_by<F>(applications: &[Application], key: F) -> Vec<(String, usize)>
where
    F: Fn(&Application) -> Option<String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for app in applications {
        if let Some(k) = key(app) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    // Highest count first; name breaks ties so output is stable
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

fn salary_insight(applications: &[Application]) -> Option<SalaryInsight> {
    let parsed: Vec<(f64, f64)> = applications
        .iter()
        .filter_map(|a| {
            let range = parse_salary(a.salary.as_deref());
            match (range.min, range.max) {
                (Some(min), Some(max)) => Some((min, max)),
                _ => None,
            }
        })
        .collect();

    if parsed.is_empty() {
        return None;
    }

    let n = parsed.len() as f64;
    Some(SalaryInsight {
        avg_min: parsed.iter().map(|(min, _)| min).sum::<f64>() / n,
        avg_max: parsed.iter().map(|(_, max)| max).sum::<f64>() / n,
        sample_size: parsed.len(),
    })
}
