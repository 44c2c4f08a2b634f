mod models;
mod normalize;
mod predict;
mod stats;
mod store;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use models::Application;
use normalize::{format_salary, parse_salary};
use predict::{PredictionInput, calculate_prediction};
use stats::Stats;
use store::{ApplicationPatch, NewApplication, Store};

#[derive(Parser)]
#[command(name = "applytrack")]
#[command(about = "Track job applications - record, normalize, and analyze your search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the application store
    Init,

    /// Add an application
    Add {
        /// Company name
        #[arg(short, long)]
        company: String,

        /// Job title
        #[arg(short, long)]
        title: String,

        /// Salary range as listed, e.g. "$100k-$120k"
        #[arg(long)]
        salary: Option<String>,

        /// Work arrangement (remote, hybrid, on-site, ...)
        #[arg(long)]
        job_type: Option<String>,

        /// Link to the job posting
        #[arg(long)]
        url: Option<String>,

        /// Date applied (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Where the posting was found (linkedin, referral, ...)
        #[arg(short, long)]
        source: Option<String>,

        /// A customized cover letter was sent
        #[arg(long)]
        cover_letter: bool,

        /// Number of interview rounds so far
        #[arg(long)]
        rounds: Option<u32>,

        /// Date of offer/rejection (YYYY-MM-DD)
        #[arg(long)]
        outcome: Option<NaiveDate>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,

        /// Status (applied, screening, interview, offer, rejected, withdrawn)
        #[arg(long)]
        status: Option<String>,
    },

    /// List applications
    List {
        /// Filter by status
        #[arg(short, long)]
        status: Option<String>,

        /// Filter by company
        #[arg(short, long)]
        company: Option<String>,

        /// Filter by source
        #[arg(long)]
        source: Option<String>,
    },

    /// Show application details
    Show {
        /// Application ID
        id: i64,
    },

    /// Edit an application
    Edit {
        /// Application ID
        id: i64,

        #[arg(short, long)]
        company: Option<String>,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(long)]
        salary: Option<String>,

        #[arg(long)]
        job_type: Option<String>,

        #[arg(long)]
        url: Option<String>,

        /// Date applied (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[arg(short, long)]
        source: Option<String>,

        /// Set whether a cover letter was sent (true/false)
        #[arg(long)]
        cover_letter: Option<bool>,

        #[arg(long)]
        rounds: Option<u32>,

        /// Clear the recorded interview rounds
        #[arg(long, conflicts_with = "rounds")]
        clear_rounds: bool,

        /// Date of offer/rejection (YYYY-MM-DD)
        #[arg(long)]
        outcome: Option<NaiveDate>,

        /// Clear the recorded outcome date
        #[arg(long, conflicts_with = "outcome")]
        clear_outcome: bool,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Delete applications
    Delete {
        /// Application ID
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<i64>,

        /// Delete every application
        #[arg(long)]
        all: bool,
    },

    /// Re-normalize stored fields after rule changes
    Normalize {
        /// Show what would change without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Estimate success probability for an application
    Predict {
        /// Application ID
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<i64>,

        /// Predict for every application
        #[arg(long)]
        all: bool,

        /// Job location, if known (raises confidence)
        #[arg(long, conflicts_with = "all")]
        location: Option<String>,

        /// Resume version sent (raises confidence)
        #[arg(long, conflicts_with = "all")]
        resume_version: Option<String>,
    },

    /// Show aggregate statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let store = Store::open()?;

    match cli.command {
        Commands::Init => {
            store.init()?;
            println!("Store initialized at {}", store.path().display());
        }

        Commands::Add {
            company,
            title,
            salary,
            job_type,
            url,
            date,
            source,
            cover_letter,
            rounds,
            outcome,
            notes,
            status,
        } => {
            store.ensure_initialized()?;
            let id = store.add(NewApplication {
                company,
                job_title: title,
                salary,
                job_type,
                job_url: url,
                date_applied: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                found_on: source,
                cover_letter_used: cover_letter,
                number_of_rounds: rounds,
                date_of_outcome: outcome,
                notes,
                status,
            })?;
            println!("Added application #{}", id);
        }

        Commands::List {
            status,
            company,
            source,
        } => {
            store.ensure_initialized()?;
            let apps = store.list(status.as_deref(), company.as_deref(), source.as_deref())?;
            if apps.is_empty() {
                println!("No applications found.");
            } else {
                println!(
                    "{:<6} {:<12} {:<25} {:<18} {:<12} {:>15}",
                    "ID", "STATUS", "TITLE", "COMPANY", "APPLIED", "SALARY"
                );
                println!("{}", "-".repeat(92));
                for app in apps {
                    let salary = format_salary(&parse_salary(app.salary.as_deref()));
                    println!(
                        "{:<6} {:<12} {:<25} {:<18} {:<12} {:>15}",
                        app.id,
                        app.status,
                        truncate(&app.job_title, 23),
                        truncate(&app.company, 16),
                        app.date_applied,
                        truncate(&salary, 15)
                    );
                }
            }
        }

        Commands::Show { id } => {
            store.ensure_initialized()?;
            match store.get(id)? {
                Some(app) => print_application(&app),
                None => println!("Application #{} not found.", id),
            }
        }

        Commands::Edit {
            id,
            company,
            title,
            salary,
            job_type,
            url,
            date,
            source,
            cover_letter,
            rounds,
            clear_rounds,
            outcome,
            clear_outcome,
            notes,
            status,
        } => {
            store.ensure_initialized()?;
            let updated = store.update(
                id,
                ApplicationPatch {
                    company,
                    job_title: title,
                    salary,
                    job_type,
                    job_url: url,
                    date_applied: date,
                    found_on: source,
                    cover_letter_used: cover_letter,
                    number_of_rounds: rounds,
                    clear_rounds,
                    date_of_outcome: outcome,
                    clear_outcome,
                    notes,
                    status,
                },
            )?;
            if updated {
                println!("Updated application #{}", id);
            } else {
                println!("Application #{} not found.", id);
            }
        }

        Commands::Delete { id, all } => {
            store.ensure_initialized()?;
            if all {
                let removed = store.delete_all()?;
                println!("Deleted {} application(s).", removed);
            } else if let Some(id) = id {
                if store.delete(id)? {
                    println!("Deleted application #{}", id);
                } else {
                    println!("Application #{} not found.", id);
                }
            }
        }

        Commands::Normalize { dry_run } => {
            store.ensure_initialized()?;
            let (changed, total) = store.normalize_all(dry_run)?;
            if dry_run {
                println!("Would normalize {} of {} application(s).", changed, total);
            } else {
                println!("Normalized {} of {} application(s).", changed, total);
            }
        }

        Commands::Predict {
            id,
            all,
            location,
            resume_version,
        } => {
            store.ensure_initialized()?;
            if all {
                let apps = store.list(None, None, None)?;
                if apps.is_empty() {
                    println!("No applications to predict.");
                }
                for app in apps {
                    let input = PredictionInput::from_application(&app);
                    let pred = calculate_prediction(&input);
                    println!(
                        "#{:<5} {:<25} {:<18} {:>6.1}%  {}",
                        app.id,
                        truncate(&app.job_title, 23),
                        truncate(&app.company, 16),
                        pred.success_probability * 100.0,
                        pred.recommendation
                    );
                }
            } else if let Some(id) = id {
                match store.get(id)? {
                    Some(app) => {
                        let mut input = PredictionInput::from_application(&app);
                        input.location = location;
                        input.resume_version = resume_version;
                        let pred = calculate_prediction(&input);

                        println!("Application #{}: {} at {}", app.id, app.job_title, app.company);
                        println!(
                            "Success probability: {:.1}%",
                            pred.success_probability * 100.0
                        );
                        println!("Confidence: {:.0}%", pred.confidence * 100.0);
                        println!("Factors:");
                        for (factor, detail) in &pred.factors {
                            println!("  {:<12} {}", factor, detail);
                        }
                        println!("Recommendation: {}", pred.recommendation);
                    }
                    None => println!("Application #{} not found.", id),
                }
            }
        }

        Commands::Stats => {
            store.ensure_initialized()?;
            let apps = store.list(None, None, None)?;
            let stats = Stats::compute(&apps, chrono::Local::now().date_naive());
            print_stats(&stats);
        }
    }

    Ok(())
}

fn print_application(app: &Application) {
    println!("Application #{}", app.id);
    println!("Company: {}", app.company);
    println!("Title: {}", app.job_title);
    println!("Status: {}", app.status);
    println!("Job type: {}", app.job_type);
    println!("Source: {}", app.found_on);
    println!("Applied: {}", app.date_applied);
    if let Some(salary) = &app.salary {
        let parsed = parse_salary(Some(salary));
        println!("Salary: {} ({})", salary, format_salary(&parsed));
    }
    if let Some(url) = &app.job_url {
        println!("URL: {}", url);
    }
    println!(
        "Cover letter: {}",
        if app.cover_letter_used { "yes" } else { "no" }
    );
    if let Some(rounds) = app.number_of_rounds {
        println!("Interview rounds: {}", rounds);
    }
    if let Some(outcome) = app.date_of_outcome {
        println!("Outcome date: {}", outcome);
    }
    if let Some(notes) = &app.notes {
        println!("Notes: {}", notes);
    }
    println!("Created: {}", app.created_at);
    println!("Updated: {}", app.updated_at);
}

fn print_stats(stats: &Stats) {
    println!("Applications: {}", stats.total);
    println!("  Last 30 days:       {}", stats.recent_applications);
    println!("  With outcomes:      {}", stats.with_outcomes);
    println!("  With cover letters: {}", stats.with_cover_letters);
    println!("  With interviews:    {}", stats.with_interviews);
    if stats.with_outcomes > 0 {
        println!("  Avg response time:  {} day(s)", stats.avg_response_days);
    }

    print_counts("By status", &stats.status_counts);
    print_counts("By source", &stats.source_counts);
    print_counts("By job type", &stats.job_type_counts);

    if let Some(salary) = &stats.salary {
        println!("\nSalary (parsed, {} listing(s)):", salary.sample_size);
        println!("  Avg min: ${:.0}k", salary.avg_min);
        println!("  Avg max: ${:.0}k", salary.avg_max);
    }
}

fn print_counts(label: &str, counts: &[(String, usize)]) {
    if counts.is_empty() {
        return;
    }
    println!("\n{}:", label);
    for (name, count) in counts {
        println!("  {:<18} {}", name, count);
    }
}

fn truncate(s: &str, max: usize) -> String {
    // Count chars, not bytes: company and title are arbitrary free text
    // and slicing a byte index would panic inside multibyte UTF-8
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
