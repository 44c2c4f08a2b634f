use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::models::Application;

// Normalizers are total: every input, including None/empty, maps to a
// defined output.

/// Normalize a free-text job type to "Remote", "Hybrid", "On-site" or
/// "Unsure". Absent or empty input defaults to "Remote".
pub fn normalize_job_type(job_type: Option<&str>) -> String {
    let Some(raw) = job_type else {
        return "Remote".to_string();
    };
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        return "Remote".to_string();
    }

    // Uncertainty indicators (question marks, "unsure", etc.)
    let uncertain = ["unsure", "unknown", "tbd", "to be determined"];
    if normalized.contains('?') || uncertain.iter().any(|w| normalized.contains(w)) {
        return "Unsure".to_string();
    }

    // Hybrid checked before remote so "remote or hybrid" lands on Hybrid
    let hybrid = [
        "hybrid",
        "flex",
        "part remote",
        "partially remote",
        "remote/hybrid",
    ];
    if hybrid.iter().any(|w| normalized.contains(w)) {
        return "Hybrid".to_string();
    }

    let remote = ["remote", "wfh", "work from home"];
    if remote.iter().any(|w| normalized.contains(w)) {
        return "Remote".to_string();
    }

    let onsite = [
        "on-site",
        "onsite",
        "on site",
        "in-office",
        "in office",
        "office",
        "in person",
    ];
    if onsite.iter().any(|w| normalized.contains(w)) {
        return "On-site".to_string();
    }

    "Unsure".to_string()
}

/// Normalize a free-text status to one of the canonical pipeline stages.
/// Absent or empty input defaults to "Applied"; unrecognized input is
/// echoed back capitalized.
pub fn normalize_status(status: Option<&str>) -> String {
    let Some(raw) = status else {
        return "Applied".to_string();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "Applied".to_string();
    }
    let normalized = trimmed.to_lowercase();

    let groups: [(&[&str], &str); 6] = [
        (&["applied", "submitted", "application sent"], "Applied"),
        (&["screening", "phone screen", "phone interview"], "Screening"),
        (
            &[
                "interview",
                "interviewing",
                "technical interview",
                "final interview",
            ],
            "Interview",
        ),
        (&["offer", "offered", "accepted"], "Offer"),
        (
            &[
                "rejected",
                "declined",
                "not selected",
                "no longer considered",
            ],
            "Rejected",
        ),
        (&["withdrawn", "withdrew", "cancelled"], "Withdrawn"),
    ];

    for (synonyms, canonical) in groups {
        if synonyms.contains(&normalized.as_str()) {
            return canonical.to_string();
        }
    }

    capitalize(trimmed)
}

/// Normalize a free-text source/platform name. Absent or empty input
/// defaults to "Other"; unrecognized input is echoed back title-cased.
pub fn normalize_source(source: Option<&str>) -> String {
    let Some(raw) = source else {
        return "Other".to_string();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "Other".to_string();
    }
    let normalized = trimmed.to_lowercase();

    let groups: [(&[&str], &str); 9] = [
        (&["linkedin", "linked in", "linked-in"], "LinkedIn"),
        (&["indeed"], "Indeed"),
        (&["glassdoor", "glass door"], "Glassdoor"),
        (&["builtin", "built in"], "Built In"),
        (&["otta"], "Otta"),
        (&["angellist", "angel list", "wellfound"], "AngelList"),
        (
            &[
                "company website",
                "companywebsite",
                "company site",
                "companysite",
                "careers page",
                "careerspage",
                "direct",
            ],
            "Company Website",
        ),
        (
            &["referral", "referred", "employee referral", "employeereferral"],
            "Referral",
        ),
        (
            &[
                "recruiter",
                "headhunter",
                "recruitment agency",
                "recruitmentagency",
            ],
            "Recruiter",
        ),
    ];

    for (synonyms, canonical) in groups {
        if synonyms.contains(&normalized.as_str()) {
            return canonical.to_string();
        }
    }

    title_case(trimmed)
}

static COMPANY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i),?\s*(inc\.?|llc|ltd\.?|corp\.?|corporation)\s*$")
        .expect("company suffix pattern")
});

/// Clean a company name: collapse whitespace and strip a trailing
/// corporate suffix ("Inc.", "LLC", ...). Absent input yields "".
pub fn normalize_company(company: Option<&str>) -> String {
    let Some(raw) = company else {
        return String::new();
    };
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    COMPANY_SUFFIX_RE
        .replace(&collapsed, "")
        .trim()
        .to_string()
}

/// A parsed salary range, in thousands of dollars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*").expect("number pattern"));

/// Best-effort salary parser. Extracts every number from the input; a "k"
/// anywhere in the string means the numbers are already in thousands,
/// otherwise they are read as full dollars and divided by 1000. Returns
/// the extremes of the extracted numbers, or an empty range when there is
/// no numeric content.
///
/// Known ambiguity: "100-120" without a "k" is read as full dollars.
pub fn parse_salary(salary: Option<&str>) -> SalaryRange {
    let Some(raw) = salary else {
        return SalaryRange::default();
    };
    let normalized = raw.trim().to_lowercase();

    let values: Vec<f64> = NUMBER_RE
        .find_iter(&normalized)
        .filter_map(|m| m.as_str().replace(',', "").parse::<i64>().ok())
        .map(|n| n as f64)
        .collect();

    if values.is_empty() {
        return SalaryRange::default();
    }

    let in_thousands = normalized.contains('k');
    let values: Vec<f64> = values
        .into_iter()
        .map(|v| if in_thousands { v } else { v / 1000.0 })
        .collect();

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    SalaryRange {
        min: Some(min),
        max: Some(max),
    }
}

/// Format a parsed range for display, e.g. "$100k - $120k".
pub fn format_salary(range: &SalaryRange) -> String {
    match (range.min, range.max) {
        (Some(min), Some(max)) if min == max => format!("${min}k"),
        (Some(min), Some(max)) => format!("${min}k - ${max}k"),
        (Some(v), None) | (None, Some(v)) => format!("${v}k"),
        (None, None) => "Not specified".to_string(),
    }
}

/// Run every normalizer over a record in place. Returns true when any
/// field changed. This is the bulk-cleanup entry point: re-running it
/// after the synonym rules change brings old records up to date.
pub fn normalize_application(app: &mut Application) -> bool {
    let before = app.clone();

    app.job_type = normalize_job_type(Some(&before.job_type));
    app.status = normalize_status(Some(&before.status));
    app.found_on = normalize_source(Some(&before.found_on));
    app.company = normalize_company(Some(&before.company));
    app.job_title = before.job_title.trim().to_string();
    app.salary = trim_opt(before.salary.as_deref());
    app.notes = trim_opt(before.notes.as_deref());

    *app != before
}

fn trim_opt(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_type_remote_synonyms() {
        assert_eq!(normalize_job_type(Some("WFH")), "Remote");
        assert_eq!(normalize_job_type(Some("work from home")), "Remote");
        assert_eq!(normalize_job_type(Some("100% remote")), "Remote");
        assert_eq!(normalize_job_type(Some("Fully Remote")), "Remote");
    }

    #[test]
    fn test_job_type_hybrid_wins_over_remote() {
        // "remote or hybrid" mentions both; hybrid is checked first
        assert_eq!(normalize_job_type(Some("remote or hybrid")), "Hybrid");
        assert_eq!(normalize_job_type(Some("Remote/Hybrid")), "Hybrid");
        assert_eq!(normalize_job_type(Some("flexible")), "Hybrid");
        assert_eq!(normalize_job_type(Some("partially remote")), "Hybrid");
    }

    #[test]
    fn test_job_type_onsite_synonyms() {
        assert_eq!(normalize_job_type(Some("on-site")), "On-site");
        assert_eq!(normalize_job_type(Some("In Office")), "On-site");
        assert_eq!(normalize_job_type(Some("in person")), "On-site");
    }

    #[test]
    fn test_job_type_uncertainty() {
        assert_eq!(normalize_job_type(Some("remote?")), "Unsure");
        assert_eq!(normalize_job_type(Some("TBD")), "Unsure");
        assert_eq!(normalize_job_type(Some("to be determined")), "Unsure");
    }

    #[test]
    fn test_job_type_defaults() {
        assert_eq!(normalize_job_type(None), "Remote");
        assert_eq!(normalize_job_type(Some("")), "Remote");
        assert_eq!(normalize_job_type(Some("   ")), "Remote");
        // Unrecognized non-empty input is Unsure, not an echo
        assert_eq!(normalize_job_type(Some("four days a week")), "Unsure");
    }

    #[test]
    fn test_status_synonyms() {
        assert_eq!(normalize_status(Some("phone screen")), "Screening");
        assert_eq!(normalize_status(Some("Phone Interview")), "Screening");
        assert_eq!(normalize_status(Some("application sent")), "Applied");
        assert_eq!(normalize_status(Some("interviewing")), "Interview");
        assert_eq!(normalize_status(Some("Final Interview")), "Interview");
        assert_eq!(normalize_status(Some("accepted")), "Offer");
        assert_eq!(normalize_status(Some("no longer considered")), "Rejected");
        assert_eq!(normalize_status(Some("withdrew")), "Withdrawn");
    }

    #[test]
    fn test_status_anchored_matching() {
        // Synonyms match the whole string, not substrings
        assert_eq!(normalize_status(Some("pre-interview chat")), "Pre-interview chat");
        assert_eq!(normalize_status(Some("GHOSTED")), "Ghosted");
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(normalize_status(None), "Applied");
        assert_eq!(normalize_status(Some("")), "Applied");
    }

    #[test]
    fn test_source_synonyms() {
        assert_eq!(normalize_source(Some("Linked In")), "LinkedIn");
        assert_eq!(normalize_source(Some("linked-in")), "LinkedIn");
        assert_eq!(normalize_source(Some("glass door")), "Glassdoor");
        assert_eq!(normalize_source(Some("builtin")), "Built In");
        assert_eq!(normalize_source(Some("wellfound")), "AngelList");
        assert_eq!(normalize_source(Some("careers page")), "Company Website");
        assert_eq!(normalize_source(Some("direct")), "Company Website");
        assert_eq!(normalize_source(Some("employee referral")), "Referral");
        assert_eq!(normalize_source(Some("headhunter")), "Recruiter");
    }

    #[test]
    fn test_source_echo_and_defaults() {
        assert_eq!(normalize_source(None), "Other");
        assert_eq!(normalize_source(Some("  ")), "Other");
        assert_eq!(normalize_source(Some("hacker news")), "Hacker News");
        assert_eq!(normalize_source(Some("COLD EMAIL")), "Cold Email");
    }

    #[test]
    fn test_company_strips_suffixes() {
        assert_eq!(normalize_company(Some("Acme Inc.")), "Acme");
        assert_eq!(normalize_company(Some("Acme, Inc.")), "Acme");
        assert_eq!(normalize_company(Some("Initech LLC")), "Initech");
        assert_eq!(normalize_company(Some("Hooli Corporation")), "Hooli");
        assert_eq!(normalize_company(Some("Stark Ltd")), "Stark");
    }

    #[test]
    fn test_company_collapses_whitespace() {
        assert_eq!(normalize_company(Some("  Foo   Bar ")), "Foo Bar");
        assert_eq!(normalize_company(None), "");
        // Suffix words in the middle of a name survive
        assert_eq!(normalize_company(Some("Corpsoft Labs")), "Corpsoft Labs");
    }

    #[test]
    fn test_parse_salary_range_with_k() {
        let range = parse_salary(Some("$100k-$120k"));
        assert_eq!(range.min, Some(100.0));
        assert_eq!(range.max, Some(120.0));
    }

    #[test]
    fn test_parse_salary_full_dollars() {
        let range = parse_salary(Some("100000"));
        assert_eq!(range.min, Some(100.0));
        assert_eq!(range.max, Some(100.0));

        let range = parse_salary(Some("$100,000 - $120,000"));
        assert_eq!(range.min, Some(100.0));
        assert_eq!(range.max, Some(120.0));
    }

    #[test]
    fn test_parse_salary_single_with_k() {
        let range = parse_salary(Some("$95K"));
        assert_eq!(range.min, Some(95.0));
        assert_eq!(range.max, Some(95.0));
    }

    #[test]
    fn test_parse_salary_out_of_order() {
        let range = parse_salary(Some("120k-100k"));
        assert_eq!(range.min, Some(100.0));
        assert_eq!(range.max, Some(120.0));
    }

    #[test]
    fn test_parse_salary_no_numbers() {
        assert_eq!(parse_salary(Some("")), SalaryRange::default());
        assert_eq!(parse_salary(Some("competitive")), SalaryRange::default());
        assert_eq!(parse_salary(None), SalaryRange::default());
    }

    #[test]
    fn test_parse_salary_ambiguous_range_reads_as_dollars() {
        // "100-120" without a "k" is full dollars: 0.1k-0.12k
        let range = parse_salary(Some("100-120"));
        assert_eq!(range.min, Some(0.1));
        assert_eq!(range.max, Some(0.12));
    }

    #[test]
    fn test_format_salary() {
        assert_eq!(
            format_salary(&SalaryRange {
                min: Some(100.0),
                max: Some(120.0)
            }),
            "$100k - $120k"
        );
        assert_eq!(
            format_salary(&SalaryRange {
                min: Some(95.0),
                max: Some(95.0)
            }),
            "$95k"
        );
        assert_eq!(format_salary(&SalaryRange::default()), "Not specified");
    }

    #[test]
    fn test_normalize_application_reports_changes() {
        let mut app = sample_app();
        app.job_type = "wfh".to_string();
        app.status = "phone screen".to_string();
        app.found_on = "linked in".to_string();
        app.company = "Acme Inc.".to_string();

        assert!(normalize_application(&mut app));
        assert_eq!(app.job_type, "Remote");
        assert_eq!(app.status, "Screening");
        assert_eq!(app.found_on, "LinkedIn");
        assert_eq!(app.company, "Acme");

        // Already canonical: second pass is a no-op
        assert!(!normalize_application(&mut app));
    }

    fn sample_app() -> Application {
        Application {
            id: 1,
            company: "Acme".to_string(),
            job_title: "Engineer".to_string(),
            salary: None,
            job_type: "Remote".to_string(),
            job_url: None,
            date_applied: chrono::NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            found_on: "LinkedIn".to_string(),
            cover_letter_used: false,
            number_of_rounds: None,
            date_of_outcome: None,
            notes: None,
            status: "Applied".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}
