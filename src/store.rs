use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::models::Application;
use crate::normalize::{
    normalize_application, normalize_company, normalize_job_type, normalize_source,
    normalize_status,
};

/// JSON-file backed store for application records.
pub struct Store {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    next_id: i64,
    applications: Vec<Application>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            next_id: 1,
            applications: Vec::new(),
        }
    }
}

/// Raw input for a new record. Free-text fields are normalized on write;
/// absent enum-like fields take their normalizer defaults.
#[derive(Debug, Clone, Default)]
pub struct NewApplication {
    pub company: String,
    pub job_title: String,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub job_url: Option<String>,
    pub date_applied: NaiveDate,
    pub found_on: Option<String>,
    pub cover_letter_used: bool,
    pub number_of_rounds: Option<u32>,
    pub date_of_outcome: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

/// Field-wise patch for `Store::update`. `None` leaves a field alone; an
/// empty string clears an optional text field. The non-text optionals
/// (outcome date, interview rounds) have dedicated clear flags instead,
/// since `None` already means "leave alone" for them.
#[derive(Debug, Clone, Default)]
pub struct ApplicationPatch {
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub job_url: Option<String>,
    pub date_applied: Option<NaiveDate>,
    pub found_on: Option<String>,
    pub cover_letter_used: Option<bool>,
    pub number_of_rounds: Option<u32>,
    pub clear_rounds: bool,
    pub date_of_outcome: Option<NaiveDate>,
    pub clear_outcome: bool,
    pub notes: Option<String>,
    pub status: Option<String>,
}

impl Store {
    pub fn open() -> Result<Self> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Store at an explicit path. Used by tests.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_path() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "applytrack") {
            proj_dirs.data_dir().join("applications.json")
        } else {
            PathBuf::from("applications.json")
        }
    }

    pub fn init(&self) -> Result<()> {
        if !self.path.exists() {
            self.save(&StoreFile::default())?;
        }
        Ok(())
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.path.exists() {
            return Err(anyhow!(
                "Store not initialized. Run 'applytrack init' first."
            ));
        }
        Ok(())
    }

    fn load(&self) -> Result<StoreFile> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store file: {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse store file: {}", self.path.display()))
    }

    fn save(&self, file: &StoreFile) -> Result<()> {
        let raw = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write store file: {}", self.path.display()))
    }

    /// Add a record, coercing status and job type to canonical values.
    pub fn add(&self, new: NewApplication) -> Result<i64> {
        let mut file = self.load()?;
        let id = file.next_id;
        file.next_id += 1;

        let now = timestamp();
        file.applications.push(Application {
            id,
            company: normalize_company(Some(&new.company)),
            job_title: new.job_title.trim().to_string(),
            salary: clean_opt(new.salary),
            job_type: normalize_job_type(new.job_type.as_deref()),
            job_url: clean_opt(new.job_url),
            date_applied: new.date_applied,
            found_on: normalize_source(new.found_on.as_deref()),
            cover_letter_used: new.cover_letter_used,
            number_of_rounds: new.number_of_rounds,
            date_of_outcome: new.date_of_outcome,
            notes: clean_opt(new.notes),
            status: normalize_status(new.status.as_deref()),
            created_at: now.clone(),
            updated_at: now,
        });

        self.save(&file)?;
        Ok(id)
    }

    pub fn get(&self, id: i64) -> Result<Option<Application>> {
        let file = self.load()?;
        Ok(file.applications.into_iter().find(|a| a.id == id))
    }

    /// List records, most recently applied first, optionally filtered by
    /// status, company or source (case-insensitive).
    pub fn list(
        &self,
        status: Option<&str>,
        company: Option<&str>,
        source: Option<&str>,
    ) -> Result<Vec<Application>> {
        let file = self.load()?;
        let mut apps: Vec<Application> = file
            .applications
            .into_iter()
            .filter(|a| matches_filter(&a.status, status))
            .filter(|a| matches_filter(&a.company, company))
            .filter(|a| matches_filter(&a.found_on, source))
            .collect();
        apps.sort_by(|a, b| b.date_applied.cmp(&a.date_applied).then(b.id.cmp(&a.id)));
        Ok(apps)
    }

    /// Apply a patch to a record. Patched enum-like fields go back
    /// through their normalizers. Returns false when the id is unknown.
    pub fn update(&self, id: i64, patch: ApplicationPatch) -> Result<bool> {
        let mut file = self.load()?;
        let Some(app) = file.applications.iter_mut().find(|a| a.id == id) else {
            return Ok(false);
        };

        if let Some(company) = patch.company {
            app.company = normalize_company(Some(&company));
        }
        if let Some(title) = patch.job_title {
            app.job_title = title.trim().to_string();
        }
        if let Some(salary) = patch.salary {
            app.salary = clean_opt(Some(salary));
        }
        if let Some(job_type) = patch.job_type {
            app.job_type = normalize_job_type(Some(&job_type));
        }
        if let Some(url) = patch.job_url {
            app.job_url = clean_opt(Some(url));
        }
        if let Some(date) = patch.date_applied {
            app.date_applied = date;
        }
        if let Some(source) = patch.found_on {
            app.found_on = normalize_source(Some(&source));
        }
        if let Some(cover) = patch.cover_letter_used {
            app.cover_letter_used = cover;
        }
        if patch.clear_rounds {
            app.number_of_rounds = None;
        } else if let Some(rounds) = patch.number_of_rounds {
            app.number_of_rounds = Some(rounds);
        }
        if patch.clear_outcome {
            app.date_of_outcome = None;
        } else if let Some(outcome) = patch.date_of_outcome {
            app.date_of_outcome = Some(outcome);
        }
        if let Some(notes) = patch.notes {
            app.notes = clean_opt(Some(notes));
        }
        if let Some(status) = patch.status {
            app.status = normalize_status(Some(&status));
        }
        app.updated_at = timestamp();

        self.save(&file)?;
        Ok(true)
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let mut file = self.load()?;
        let before = file.applications.len();
        file.applications.retain(|a| a.id != id);
        let removed = file.applications.len() < before;
        if removed {
            self.save(&file)?;
        }
        Ok(removed)
    }

    pub fn delete_all(&self) -> Result<usize> {
        let mut file = self.load()?;
        let removed = file.applications.len();
        file.applications.clear();
        self.save(&file)?;
        Ok(removed)
    }

    /// Re-run the normalizers over every record, e.g. after the synonym
    /// rules change. Returns (changed, total); dry-run reports without
    /// saving.
    pub fn normalize_all(&self, dry_run: bool) -> Result<(usize, usize)> {
        let mut file = self.load()?;
        let total = file.applications.len();
        let mut changed = 0;

        for app in &mut file.applications {
            if normalize_application(app) {
                app.updated_at = timestamp();
                changed += 1;
            }
        }

        if changed > 0 && !dry_run {
            self.save(&file)?;
        }
        Ok((changed, total))
    }
}

fn matches_filter(value: &str, filter: Option<&str>) -> bool {
    match filter {
        Some(f) => value.eq_ignore_ascii_case(f.trim()),
        None => true,
    }
}

fn clean_opt(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
