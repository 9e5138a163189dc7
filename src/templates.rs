use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::clock::Clock;
use crate::error::{CadenceError, Result};
use crate::models::{EntryKind, Frequency, NewTemplate, RecurringTemplate, TemplateUpdate};

pub const MAX_AMOUNT: Decimal = dec!(999999.99);
pub const MAX_DESCRIPTION_LEN: usize = 100;

// ---------------------------------------------------------------------------
// Persistence slot
// ---------------------------------------------------------------------------

/// A single durable value under a fixed key, read and written whole.
pub trait KeyValueSlot: Send + Sync {
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        let guard = self
            .value
            .lock()
            .map_err(|_| CadenceError::Store("template slot lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn write(&self, value: &str) -> Result<()> {
        let mut guard = self
            .value
            .lock()
            .map_err(|_| CadenceError::Store("template slot lock poisoned".into()))?;
        *guard = Some(value.to_string());
        Ok(())
    }
}

/// `<dir>/<key>.json` on local disk.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>, key: &str) -> Self {
        Self {
            path: dir.into().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl KeyValueSlot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&self.path)?))
    }

    fn write(&self, value: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        // Write-then-rename so a crash never leaves a truncated slot behind.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, format!("{value}\n"))?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_template(t: &RecurringTemplate) -> Result<()> {
    let invalid = |msg: &str| Err(CadenceError::Validation(msg.to_string()));

    if t.profile_id.trim().is_empty() {
        return invalid("Profile is required");
    }
    if t.description.trim().is_empty() {
        return invalid("Description is required");
    }
    if t.description.chars().count() > MAX_DESCRIPTION_LEN {
        return invalid("Description must be less than 100 characters");
    }
    if t.amount <= Decimal::ZERO {
        return invalid("Amount must be positive");
    }
    if t.amount > MAX_AMOUNT {
        return invalid("Amount must be less than $1,000,000");
    }
    if !t.frequency.is_recurring() {
        return invalid("Recurring templates need a weekly, fortnightly or monthly frequency");
    }
    if let Some(end) = t.end_date {
        if end < t.start_date {
            return invalid("End date must not be before start date");
        }
    }
    match (t.kind, t.category_id.as_deref()) {
        (EntryKind::Expense, None) => return invalid("Category is required"),
        (EntryKind::Expense, Some(c)) if c.trim().is_empty() => return invalid("Category is required"),
        (EntryKind::Income, Some(_)) => return invalid("Income templates do not take a category"),
        _ => {}
    }
    Ok(())
}

fn generate_id(kind: EntryKind, millis: i64) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}_{millis}_{suffix}", kind.id_prefix())
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Recurring templates of one kind, persisted as a JSON array in a slot.
pub struct TemplateStore {
    kind: EntryKind,
    slot: Box<dyn KeyValueSlot>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl TemplateStore {
    pub fn new(kind: EntryKind, slot: Box<dyn KeyValueSlot>, clock: Arc<dyn Clock>) -> Self {
        Self {
            kind,
            slot,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_memory(kind: EntryKind, clock: Arc<dyn Clock>) -> Self {
        Self::new(kind, Box::new(MemorySlot::new()), clock)
    }

    pub fn on_disk(kind: EntryKind, dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self::new(kind, Box::new(FileSlot::new(dir, kind.storage_key())), clock)
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    fn load(&self) -> Result<Vec<RecurringTemplate>> {
        match self.slot.read()? {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str(&raw).map_err(|e| {
                    tracing::error!(kind = %self.kind, error = %e, "template slot is unreadable");
                    CadenceError::Json(e)
                })
            }
            _ => Ok(Vec::new()),
        }
    }

    fn save(&self, templates: &[RecurringTemplate]) -> Result<()> {
        let json = serde_json::to_string_pretty(templates)?;
        self.slot.write(&json)
    }

    /// Run a read-modify-write cycle under the store's write lock.
    fn modify<T>(&self, f: impl FnOnce(&mut Vec<RecurringTemplate>) -> Result<T>) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| CadenceError::Store("template store lock poisoned".into()))?;
        let mut templates = self.load()?;
        let out = f(&mut templates)?;
        self.save(&templates)?;
        Ok(out)
    }

    pub fn create(&self, fields: NewTemplate) -> Result<String> {
        let now = self.clock.now();
        let template = RecurringTemplate {
            id: generate_id(self.kind, now.and_utc().timestamp_millis()),
            kind: self.kind,
            profile_id: fields.profile_id,
            description: fields.description.trim().to_string(),
            amount: fields.amount,
            category_id: fields.category_id,
            frequency: fields.frequency,
            start_date: fields.start_date,
            end_date: fields.end_date,
            is_active: true,
            created_at: now,
        };
        validate_template(&template)?;

        let id = self.modify(|templates| {
            let mut template = template;
            while templates.iter().any(|t| t.id == template.id) {
                template.id = generate_id(self.kind, now.and_utc().timestamp_millis());
            }
            let id = template.id.clone();
            templates.push(template);
            Ok(id)
        })?;

        tracing::info!(
            template_id = %id,
            kind = %self.kind,
            frequency = %fields.frequency,
            "added recurring template"
        );
        Ok(id)
    }

    /// Every template of this kind, active or not.
    pub fn list(&self) -> Result<Vec<RecurringTemplate>> {
        self.load()
    }

    pub fn list_by_profile(&self, profile_id: &str) -> Result<Vec<RecurringTemplate>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|t| t.profile_id == profile_id)
            .collect())
    }

    /// Templates eligible for generation, optionally limited to one profile.
    pub fn list_active(&self, profile_id: Option<&str>) -> Result<Vec<RecurringTemplate>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|t| t.is_active && t.frequency.is_recurring())
            .filter(|t| profile_id.map_or(true, |p| t.profile_id == p))
            .collect())
    }

    pub fn get(&self, template_id: &str) -> Result<Option<RecurringTemplate>> {
        Ok(self.load()?.into_iter().find(|t| t.id == template_id))
    }

    pub fn update(&self, template_id: &str, changes: TemplateUpdate) -> Result<RecurringTemplate> {
        let updated = self.modify(|templates| {
            let slot = templates
                .iter_mut()
                .find(|t| t.id == template_id)
                .ok_or_else(|| CadenceError::TemplateNotFound(template_id.to_string()))?;

            let mut merged = slot.clone();
            if let Some(profile_id) = changes.profile_id {
                merged.profile_id = profile_id;
            }
            if let Some(description) = changes.description {
                merged.description = description.trim().to_string();
            }
            if let Some(amount) = changes.amount {
                merged.amount = amount;
            }
            if let Some(category_id) = changes.category_id {
                merged.category_id = Some(category_id);
            }
            if let Some(frequency) = changes.frequency {
                merged.frequency = frequency;
            }
            if let Some(start_date) = changes.start_date {
                merged.start_date = start_date;
            }
            if let Some(end_date) = changes.end_date {
                merged.end_date = end_date;
            }
            validate_template(&merged)?;

            *slot = merged.clone();
            Ok(merged)
        })?;
        tracing::info!(template_id, kind = %self.kind, "updated recurring template");
        Ok(updated)
    }

    /// Soft-delete. Returns `false` if the template was already inactive.
    pub fn deactivate(&self, template_id: &str) -> Result<bool> {
        let changed = self.modify(|templates| {
            let template = templates
                .iter_mut()
                .find(|t| t.id == template_id)
                .ok_or_else(|| CadenceError::TemplateNotFound(template_id.to_string()))?;
            let was_active = template.is_active;
            template.is_active = false;
            Ok(was_active)
        })?;
        if changed {
            tracing::info!(template_id, kind = %self.kind, "deactivated recurring template");
        }
        Ok(changed)
    }

    /// Hard delete, for cleanup. Generated transactions are left untouched.
    pub fn delete(&self, template_id: &str) -> Result<()> {
        self.modify(|templates| {
            let before = templates.len();
            templates.retain(|t| t.id != template_id);
            if templates.len() == before {
                return Err(CadenceError::TemplateNotFound(template_id.to_string()));
            }
            Ok(())
        })?;
        tracing::info!(template_id, kind = %self.kind, "deleted recurring template");
        Ok(())
    }

    /// Approximate monthly amount of all active templates for a profile.
    pub fn monthly_recurring_total(&self, profile_id: &str) -> Result<Decimal> {
        Ok(self
            .list_active(Some(profile_id))?
            .iter()
            .map(|t| t.amount * monthly_factor(t.frequency))
            .sum())
    }
}

fn monthly_factor(frequency: Frequency) -> Decimal {
    match frequency {
        Frequency::Weekly => dec!(4.33),
        Frequency::Fortnightly => dec!(2.17),
        Frequency::Monthly => Decimal::ONE,
        Frequency::OneTime => Decimal::ZERO,
    }
}
