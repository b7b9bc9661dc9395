//! The built-in snippet corpus: curated Victorian tenancy sources.
//!
//! Each snippet carries the source URL, an as-of date, a summary, bullet
//! propositions, and retrieval keywords. Snippets are read-only reference
//! entries; citations always trace back to one of them.

use chrono::NaiveDate;
use rentwise_core::case::Citation;
use serde::{Deserialize, Serialize};

/// One citable excerpt of legal guidance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
  pub source_url: String,
  pub title:      String,
  pub as_of:      NaiveDate,
  pub summary:    String,
  /// Short propositions suitable as action steps or citation points.
  pub points:     Vec<String>,
  pub keywords:   Vec<String>,
}

impl Snippet {
  /// Derive a citation from this snippet. The first bullet proposition is
  /// the citation point; the summary stands in when no bullets exist.
  pub fn citation(&self) -> Citation {
    Citation {
      point: self
        .points
        .first()
        .cloned()
        .unwrap_or_else(|| self.summary.clone()),
      url:   self.source_url.clone(),
      as_of: self.as_of,
    }
  }
}

fn snippet(
  source_url: &str,
  title: &str,
  as_of: (i32, u32, u32),
  summary: &str,
  points: &[&str],
  keywords: &[&str],
) -> Snippet {
  Snippet {
    source_url: source_url.to_string(),
    title:      title.to_string(),
    as_of:      NaiveDate::from_ymd_opt(as_of.0, as_of.1, as_of.2)
      .expect("static corpus date"),
    summary:    summary.to_string(),
    points:     points.iter().map(|p| p.to_string()).collect(),
    keywords:   keywords.iter().map(|k| k.to_string()).collect(),
  }
}

/// The curated corpus shipped with the binary. Insertion order matters: it is
/// the retrieval tie-break.
pub fn builtin_corpus() -> Vec<Snippet> {
  vec![
    snippet(
      "https://www.consumer.vic.gov.au/housing/renting/repairs-alterations-safety-and-pets/repairs/repairs-in-rental-properties",
      "Repairs in rental properties - Consumer Affairs Victoria",
      (2025, 5, 2),
      "Urgent repairs include essential services such as hot water, heating, \
       cooking, serious leaks, gas and electrical faults. Non-urgent repairs \
       must be completed within 14 days after a written request. Renters can \
       arrange urgent repairs up to $2,500 if the rental provider does not \
       act immediately and must be reimbursed within 7 days.",
      &[
        "Urgent repairs must be arranged immediately and cover essential \
         services like hot water, heating, gas leaks, serious leaks, and \
         dangerous electrical faults.",
        "Renters may authorise urgent repairs costing up to $2,500 if the \
         rental provider does not respond and must be reimbursed within 7 \
         days after giving written notice and receipts.",
        "Non-urgent repairs must be completed within 14 days of a written \
         request, with escalation options via RDRV and VCAT.",
        "Entry for repairs requires 24 hours' notice between 8am and 6pm \
         unless otherwise agreed for urgent situations.",
      ],
      &["urgent", "hot water", "heating", "repairs", "$2,500", "7 days", "14 days", "entry"],
    ),
    snippet(
      "https://www.consumer.vic.gov.au/housing/renting/repairs-alterations-safety-and-pets/minimum-standards/minimum-standards-for-rental-properties",
      "Rental properties - minimum standards - Consumer Affairs Victoria",
      (2025, 5, 2),
      "Rental properties must meet minimum standards covering electrical \
       safety, fixed heating in the main living area, secure locks, \
       ventilation, and more.",
      &[
        "A fixed heater in the main living area is required for agreements \
         from 29 March 2021.",
        "Electrical safety and switchboard requirements apply, alongside \
         ventilation, locks, and window coverings.",
        "Renters can seek repairs or compensation if minimum standards are \
         not met.",
      ],
      &["minimum standards", "heater", "electrical", "ventilation"],
    ),
    snippet(
      "https://www.consumer.vic.gov.au/housing/renting/rent-bond-bills-and-condition-reports/rent/rent-increases",
      "Rent increases - Consumer Affairs Victoria",
      (2025, 4, 24),
      "Rent can generally only increase once every 12 months for agreements \
       starting on or after 19 June 2019 and requires 60 days' written \
       notice using the prescribed CAV form.",
      &[
        "Verify that at least 12 months have passed since the last increase.",
        "Notice must give at least 60 days and use the correct Consumer \
         Affairs Victoria form.",
        "Renters can request a CAV rent assessment if an increase seems \
         excessive.",
      ],
      &["rent", "increase", "60 days", "12 months", "assessment"],
    ),
    snippet(
      "https://www.consumer.vic.gov.au/housing/renting/moving-out-giving-notice-and-evictions/notice-to-vacate/notice-to-vacate-in-rental-properties",
      "Notice to vacate in rental properties - Consumer Affairs Victoria",
      (2025, 5, 2),
      "Notice to vacate periods vary by reason; some are immediate (unfit \
       premises), others 14, 28, 60, or 90 days. Renters can challenge \
       invalid notices.",
      &[
        "Check the stated reason matches allowable grounds and minimum \
         notice periods.",
        "Immediate notice applies only if the property is unfit for human \
         habitation or destroyed.",
        "Many notices require 60 days or more; renters can challenge \
         non-compliant notices at VCAT.",
      ],
      &["notice", "vacate", "eviction", "14 days", "60 days", "90 days"],
    ),
    snippet(
      "https://www.vcat.vic.gov.au/fees",
      "VCAT fees",
      (2025, 7, 1),
      "VCAT publishes annual fee schedules updated each 1 July. Users should \
       consult the fee calculator rather than relying on hard-coded amounts.",
      &[
        "Use the published fee calculator or fee schedules for up-to-date \
         amounts.",
        "Fees vary by list and applicant concession status; link renters to \
         the official resource.",
      ],
      &["vcat", "fees", "calculator"],
    ),
    snippet(
      "https://www.consumer.vic.gov.au/housing/renting/changes-to-renting-laws",
      "Victorian rental law reforms",
      (2025, 5, 1),
      "Additional rental reforms are scheduled for 1 November 2025, \
       including bans on no-fault evictions and longer notice periods. \
       Guidance should distinguish current law from upcoming changes.",
      &[
        "Highlight pending reforms effective 1 November 2025 where relevant.",
        "Clarify when guidance refers to current versus upcoming law.",
      ],
      &["reform", "ban", "no-fault", "2025"],
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn corpus_is_nonempty_and_citable() {
    let corpus = builtin_corpus();
    assert!(corpus.len() >= 5);
    for snippet in &corpus {
      let citation = snippet.citation();
      assert!(!citation.point.is_empty());
      assert_eq!(citation.url, snippet.source_url);
    }
  }
}
