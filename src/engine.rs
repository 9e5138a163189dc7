//! Batch coordination of recurring templates and the management surface
//! that the front end calls into.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calendar::add_months;
use crate::clock::Clock;
use crate::dedup::existing_occurrence_dates;
use crate::error::{CadenceError, Result};
use crate::generator::generate;
use crate::materializer::{materialize, MaterializeResult};
use crate::models::{EntryKind, NewTemplate, RecurringTemplate, TemplateUpdate};
use crate::store::TransactionStore;
use crate::templates::TemplateStore;

const ALL_PROFILES: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Months past today to pre-populate when a template is added or
    /// generated on demand.
    pub horizon_months: u32,
    /// Months past today covered by `run_pending`. `0` generates up to today.
    pub run_horizon_months: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_months: 12,
            run_horizon_months: 0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub templates: usize,
    pub created: usize,
    pub failed: usize,
    /// Templates whose generation was abandoned for this run.
    pub skipped_templates: usize,
    /// Another run for the same key was in flight; nothing was done.
    pub already_running: bool,
}

struct RunGuard<'a> {
    running: &'a Mutex<HashSet<String>>,
    key: String,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut running = self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        running.remove(&self.key);
    }
}

/// Generates and manages recurring entries of one kind.
pub struct RecurringEngine {
    templates: TemplateStore,
    transactions: Arc<dyn TransactionStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    running: Mutex<HashSet<String>>,
}

impl RecurringEngine {
    pub fn new(
        templates: TemplateStore,
        transactions: Arc<dyn TransactionStore>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Result<Self> {
        if templates.kind() != transactions.kind() {
            return Err(CadenceError::Other(format!(
                "{} templates cannot be paired with a {} transaction store",
                templates.kind(),
                transactions.kind()
            )));
        }
        Ok(Self {
            templates,
            transactions,
            clock,
            config,
            running: Mutex::new(HashSet::new()),
        })
    }

    pub fn kind(&self) -> EntryKind {
        self.templates.kind()
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn transactions(&self) -> &dyn TransactionStore {
        self.transactions.as_ref()
    }

    /// On-demand generation cutoff: today plus the configured horizon.
    pub fn horizon(&self) -> Result<NaiveDate> {
        self.horizon_for(self.config.horizon_months)
    }

    /// Cutoff used by `run_pending`.
    pub fn run_horizon(&self) -> Result<NaiveDate> {
        self.horizon_for(self.config.run_horizon_months)
    }

    pub fn horizon_for(&self, months: u32) -> Result<NaiveDate> {
        add_months(self.clock.today(), months)
    }

    // -----------------------------------------------------------------------
    // Management surface
    // -----------------------------------------------------------------------

    pub fn add_template(&self, fields: NewTemplate) -> Result<String> {
        self.templates.create(fields)
    }

    pub fn update_template(&self, template_id: &str, changes: TemplateUpdate) -> Result<RecurringTemplate> {
        self.templates.update(template_id, changes)
    }

    pub fn deactivate_template(&self, template_id: &str) -> Result<bool> {
        self.templates.deactivate(template_id)
    }

    pub fn delete_template(&self, template_id: &str) -> Result<()> {
        self.templates.delete(template_id)
    }

    pub fn list_active_templates(&self, profile_id: &str) -> Result<Vec<RecurringTemplate>> {
        self.templates.list_active(Some(profile_id))
    }

    pub fn list_templates(&self, profile_id: Option<&str>) -> Result<Vec<RecurringTemplate>> {
        match profile_id {
            Some(p) => self.templates.list_by_profile(p),
            None => self.templates.list(),
        }
    }

    pub fn monthly_recurring_total(&self, profile_id: &str) -> Result<Decimal> {
        self.templates.monthly_recurring_total(profile_id)
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Materialize every missing occurrence of `template` up to `horizon`.
    ///
    /// Fails only if the existing transactions cannot be read; individual
    /// create failures are counted in the result.
    pub async fn generate_records_for_template(
        &self,
        template: &RecurringTemplate,
        horizon: NaiveDate,
    ) -> Result<MaterializeResult> {
        if template.kind != self.kind() {
            return Err(CadenceError::Other(format!(
                "template {} is a {} template, engine handles {}",
                template.id,
                template.kind,
                self.kind()
            )));
        }
        if !template.is_active || !template.frequency.is_recurring() {
            return Ok(MaterializeResult::default());
        }

        let existing = self.transactions.list(&template.profile_id).await?;
        let existing_dates = existing_occurrence_dates(&existing, template);
        let drafts = generate(template, &existing_dates, horizon)?;
        let result = materialize(self.transactions.as_ref(), &template.profile_id, &drafts).await;

        if result.created > 0 || result.failed > 0 {
            tracing::info!(
                template_id = %template.id,
                profile_id = %template.profile_id,
                created = result.created,
                failed = result.failed,
                horizon = %horizon,
                "generated recurring {} records",
                self.kind()
            );
        }
        Ok(result)
    }

    /// Look up a template by id and generate it up to `horizon`, or the
    /// default horizon when none is given.
    pub async fn force_generate(
        &self,
        template_id: &str,
        horizon: Option<NaiveDate>,
    ) -> Result<MaterializeResult> {
        let template = self
            .templates
            .get(template_id)?
            .ok_or_else(|| CadenceError::TemplateNotFound(template_id.to_string()))?;
        let horizon = match horizon {
            Some(h) => h,
            None => self.horizon()?,
        };
        self.generate_records_for_template(&template, horizon).await
    }

    /// Claim `key` for a run. An all-profiles run conflicts with every other
    /// run, a profile run with the same profile or an all-profiles run.
    fn try_begin(&self, key: &str) -> Option<RunGuard<'_>> {
        let mut running = self.running.lock().unwrap_or_else(|poisoned| {
            tracing::warn!(kind = %self.kind(), "run guard lock was poisoned, recovering");
            poisoned.into_inner()
        });
        let busy = if key == ALL_PROFILES {
            !running.is_empty()
        } else {
            running.contains(key) || running.contains(ALL_PROFILES)
        };
        if busy {
            return None;
        }
        running.insert(key.to_string());
        Some(RunGuard {
            running: &self.running,
            key: key.to_string(),
        })
    }

    /// Generate pending occurrences for all active templates, optionally
    /// limited to one profile. Best effort: failures are logged and the
    /// affected templates are retried on the next run.
    pub async fn run_pending(&self, profile_id: Option<&str>) -> RunSummary {
        let key = profile_id.unwrap_or(ALL_PROFILES);
        let Some(_guard) = self.try_begin(key) else {
            tracing::warn!(kind = %self.kind(), key, "recurring generation already running, skipping");
            return RunSummary {
                already_running: true,
                ..Default::default()
            };
        };

        let mut summary = RunSummary::default();

        let templates = match self.templates.list_active(profile_id) {
            Ok(templates) => templates,
            Err(err) => {
                tracing::error!(kind = %self.kind(), error = %err, "could not load recurring templates");
                return summary;
            }
        };
        let horizon = match self.run_horizon() {
            Ok(h) => h,
            Err(err) => {
                tracing::error!(kind = %self.kind(), error = %err, "could not compute horizon");
                return summary;
            }
        };

        tracing::info!(
            kind = %self.kind(),
            count = templates.len(),
            "processing active recurring templates"
        );
        summary.templates = templates.len();

        for template in &templates {
            match self.generate_records_for_template(template, horizon).await {
                Ok(result) => {
                    summary.created += result.created;
                    summary.failed += result.failed;
                }
                Err(err) => {
                    tracing::error!(
                        template_id = %template.id,
                        profile_id = %template.profile_id,
                        error = %err,
                        "failed to generate records for template"
                    );
                    summary.skipped_templates += 1;
                }
            }
        }

        summary
    }
}
