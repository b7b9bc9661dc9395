//! Deadline scheduler: a pure rule table mapping categories to calendar
//! offsets. No side effects, no case mutation; callers anchor the offsets to
//! the intake date or a supplied date.

use chrono::{Duration, NaiveDate};
use rentwise_core::case::CaseCategory;
use serde::{Deserialize, Serialize};

/// A concrete calendar deadline derived from a rule offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
  pub title:       String,
  pub description: String,
  pub due_date:    NaiveDate,
}

/// `(offset_days, title, description)` per category.
fn rules(category: CaseCategory) -> &'static [(i64, &'static str, &'static str)] {
  match category {
    CaseCategory::RepairsUrgent => &[
      (
        1,
        "Urgent repair follow up",
        "Check within 24 hours that the rental provider has organised urgent \
         attendance.",
      ),
      (
        7,
        "Reimbursement due",
        "Ensure reimbursement is paid within 7 days for emergency repairs up \
         to $2,500.",
      ),
    ],
    CaseCategory::RepairsNonurgent => &[(
      14,
      "Non-urgent repair follow up",
      "If the repair isn't complete within 14 days of the written request, \
       escalate to RDRV.",
    )],
    CaseCategory::RentIncrease => &[
      (
        30,
        "Request a rent assessment",
        "Ask Consumer Affairs Victoria for a rent assessment within 30 days \
         if the increase seems excessive.",
      ),
      (
        60,
        "Increase takes effect",
        "At least 60 days' written notice is required before the new rent \
         can start.",
      ),
    ],
    CaseCategory::NoticeToVacate => &[(
      14,
      "Challenge window",
      "Apply to VCAT to challenge a notice that doesn't meet the minimum \
       period or allowable grounds.",
    )],
    CaseCategory::Bond => &[(
      14,
      "Bond claim response",
      "Respond to a disputed bond claim at the RTBA or VCAT within 14 days \
       of receiving it.",
    )],
    CaseCategory::MinStandards => &[(
      14,
      "Compliance request",
      "Give the rental provider written notice to bring the property up to \
       minimum standards.",
    )],
    CaseCategory::EntryRights => &[(
      7,
      "Written objection",
      "Object in writing if the entry notice requirements were not met.",
    )],
    CaseCategory::Other => &[],
  }
}

/// Derive concrete deadlines for `category`, anchored at `anchor`.
pub fn compute_deadlines(category: CaseCategory, anchor: NaiveDate) -> Vec<Deadline> {
  rules(category)
    .iter()
    .map(|(days, title, description)| Deadline {
      title:       (*title).to_string(),
      description: (*description).to_string(),
      due_date:    anchor + Duration::days(*days),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()
  }

  #[test]
  fn urgent_repairs_have_day_and_week_deadlines() {
    let deadlines = compute_deadlines(CaseCategory::RepairsUrgent, anchor());
    assert_eq!(deadlines.len(), 2);
    assert_eq!(
      deadlines[0].due_date,
      NaiveDate::from_ymd_opt(2025, 8, 2).unwrap()
    );
    assert_eq!(
      deadlines[1].due_date,
      NaiveDate::from_ymd_opt(2025, 8, 8).unwrap()
    );
  }

  #[test]
  fn nonurgent_repairs_get_fourteen_days() {
    let deadlines = compute_deadlines(CaseCategory::RepairsNonurgent, anchor());
    assert_eq!(deadlines.len(), 1);
    assert_eq!(
      deadlines[0].due_date,
      NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()
    );
  }

  #[test]
  fn other_category_has_no_rule_deadlines() {
    assert!(compute_deadlines(CaseCategory::Other, anchor()).is_empty());
  }

  #[test]
  fn deadlines_are_pure_over_the_anchor() {
    let first = compute_deadlines(CaseCategory::RentIncrease, anchor());
    let second = compute_deadlines(CaseCategory::RentIncrease, anchor());
    assert_eq!(first, second);
  }
}
