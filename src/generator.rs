use std::collections::HashSet;

use chrono::NaiveDate;

use crate::calendar::nth_occurrence;
use crate::error::Result;
use crate::models::{EntryKind, RecurringTemplate, TransactionDraft};

/// Drafts for every occurrence of `template` up to `horizon` (inclusive) that
/// is not already in `existing_dates`, in increasing date order.
///
/// Inactive and one-time templates produce nothing.
pub fn generate(
    template: &RecurringTemplate,
    existing_dates: &HashSet<NaiveDate>,
    horizon: NaiveDate,
) -> Result<Vec<TransactionDraft>> {
    if !template.is_active || !template.frequency.is_recurring() {
        return Ok(Vec::new());
    }

    let mut drafts = Vec::new();
    let mut n: u32 = 0;
    let mut cursor = template.start_date;

    while cursor <= horizon {
        if template.end_date.is_some_and(|end| cursor > end) {
            break;
        }
        if !existing_dates.contains(&cursor) {
            drafts.push(draft_for(template, cursor));
        }

        n += 1;
        let next = nth_occurrence(template.start_date, template.frequency, n)?;
        assert!(
            next > cursor,
            "schedule for template {} did not advance past {cursor}",
            template.id
        );
        cursor = next;
    }

    Ok(drafts)
}

fn draft_for(template: &RecurringTemplate, date: NaiveDate) -> TransactionDraft {
    TransactionDraft {
        kind: template.kind,
        profile_id: template.profile_id.clone(),
        description: template.description.clone(),
        amount: template.amount,
        date,
        category_id: template.category_id.clone(),
        frequency: match template.kind {
            EntryKind::Income => Some(template.frequency),
            EntryKind::Expense => None,
        },
        source_template_id: Some(template.id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Frequency;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn weekly(kind: EntryKind) -> RecurringTemplate {
        RecurringTemplate {
            id: "tpl-weekly".to_string(),
            kind,
            profile_id: "p1".to_string(),
            description: "Cleaner".to_string(),
            amount: dec!(80),
            category_id: match kind {
                EntryKind::Expense => Some("home".to_string()),
                EntryKind::Income => None,
            },
            frequency: Frequency::Weekly,
            start_date: d(2024, 1, 1),
            end_date: None,
            is_active: true,
            created_at: d(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    fn dates(drafts: &[TransactionDraft]) -> Vec<NaiveDate> {
        drafts.iter().map(|d| d.date).collect()
    }

    #[test]
    fn test_weekly_covers_horizon_inclusive() {
        let drafts = generate(&weekly(EntryKind::Expense), &HashSet::new(), d(2024, 1, 22)).unwrap();
        assert_eq!(
            dates(&drafts),
            vec![d(2024, 1, 1), d(2024, 1, 8), d(2024, 1, 15), d(2024, 1, 22)]
        );
    }

    #[test]
    fn test_end_date_clamps() {
        let mut t = weekly(EntryKind::Expense);
        t.end_date = Some(d(2024, 1, 10));
        let drafts = generate(&t, &HashSet::new(), d(2024, 1, 22)).unwrap();
        assert_eq!(dates(&drafts), vec![d(2024, 1, 1), d(2024, 1, 8)]);
    }

    #[test]
    fn test_end_date_on_occurrence_is_included() {
        let mut t = weekly(EntryKind::Expense);
        t.end_date = Some(d(2024, 1, 15));
        let drafts = generate(&t, &HashSet::new(), d(2024, 3, 1)).unwrap();
        assert_eq!(dates(&drafts).last(), Some(&d(2024, 1, 15)));
        assert_eq!(drafts.len(), 3);
    }

    #[test]
    fn test_existing_dates_are_skipped() {
        let existing = HashSet::from([d(2024, 1, 8)]);
        let drafts = generate(&weekly(EntryKind::Expense), &existing, d(2024, 1, 22)).unwrap();
        assert_eq!(dates(&drafts), vec![d(2024, 1, 1), d(2024, 1, 15), d(2024, 1, 22)]);
    }

    #[test]
    fn test_monthly_month_end() {
        let mut t = weekly(EntryKind::Expense);
        t.frequency = Frequency::Monthly;
        t.start_date = d(2024, 1, 31);
        let drafts = generate(&t, &HashSet::new(), d(2024, 3, 31)).unwrap();
        assert_eq!(dates(&drafts), vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31)]);
    }

    #[test]
    fn test_fortnightly() {
        let mut t = weekly(EntryKind::Income);
        t.frequency = Frequency::Fortnightly;
        let drafts = generate(&t, &HashSet::new(), d(2024, 2, 11)).unwrap();
        assert_eq!(
            dates(&drafts),
            vec![d(2024, 1, 1), d(2024, 1, 15), d(2024, 1, 29)]
        );
    }

    #[test]
    fn test_horizon_before_start_is_empty() {
        let drafts = generate(&weekly(EntryKind::Expense), &HashSet::new(), d(2023, 12, 31)).unwrap();
        assert!(drafts.is_empty());
    }

    #[test]
    fn test_inactive_and_one_time_are_noops() {
        let mut inactive = weekly(EntryKind::Expense);
        inactive.is_active = false;
        assert!(generate(&inactive, &HashSet::new(), d(2025, 1, 1)).unwrap().is_empty());

        let mut one_time = weekly(EntryKind::Expense);
        one_time.frequency = Frequency::OneTime;
        assert!(generate(&one_time, &HashSet::new(), d(2025, 1, 1)).unwrap().is_empty());
    }

    #[test]
    fn test_draft_fields_follow_kind() {
        let income = generate(&weekly(EntryKind::Income), &HashSet::new(), d(2024, 1, 1)).unwrap();
        assert_eq!(income[0].frequency, Some(Frequency::Weekly));
        assert_eq!(income[0].category_id, None);

        let expense = generate(&weekly(EntryKind::Expense), &HashSet::new(), d(2024, 1, 1)).unwrap();
        assert_eq!(expense[0].frequency, None);
        assert_eq!(expense[0].category_id.as_deref(), Some("home"));
        assert_eq!(expense[0].source_template_id.as_deref(), Some("tpl-weekly"));
        assert_eq!(expense[0].description, "Cleaner");
        assert_eq!(expense[0].amount, dec!(80));
    }
}
