//! Deterministic term-overlap retrieval over the snippet corpus.
//!
//! Scoring rules, per distinct query token:
//! - keyword hit: 3 points
//! - title-token hit: 2 points
//! - summary/point-token hit: 1 point
//!
//! Results are ordered by score descending; equal scores tie-break by corpus
//! insertion order. Zero-score snippets are never returned, and fewer matches
//! than `top_k` return exactly the matches. No randomness, no I/O.

use std::collections::BTreeSet;

use rentwise_core::case::CaseCategory;

use crate::corpus::Snippet;

const KEYWORD_WEIGHT: u32 = 3;
const TITLE_WEIGHT: u32 = 2;
const BODY_WEIGHT: u32 = 1;

// ─── Tokenizer ───────────────────────────────────────────────────────────────

/// Lowercase alphanumeric tokens; everything else is a separator.
fn tokenize(text: &str) -> Vec<String> {
  let mut tokens = Vec::new();
  let mut word = String::new();
  for ch in text.chars() {
    if ch.is_alphanumeric() {
      word.extend(ch.to_lowercase());
    } else if !word.is_empty() {
      tokens.push(std::mem::take(&mut word));
    }
  }
  if !word.is_empty() {
    tokens.push(word);
  }
  tokens
}

fn token_set(text: &str) -> BTreeSet<String> {
  tokenize(text).into_iter().collect()
}

// ─── Index ───────────────────────────────────────────────────────────────────

struct IndexedSnippet {
  snippet:       Snippet,
  keyword_terms: BTreeSet<String>,
  title_terms:   BTreeSet<String>,
  body_terms:    BTreeSet<String>,
}

/// A scored retrieval hit; `snippet` borrows from the index.
#[derive(Debug, Clone, Copy)]
pub struct Scored<'a> {
  pub snippet: &'a Snippet,
  pub score:   u32,
}

/// In-memory retrieval index, built once per process over an immutable
/// corpus.
pub struct LawIndex {
  docs: Vec<IndexedSnippet>,
}

impl LawIndex {
  pub fn new(corpus: Vec<Snippet>) -> Self {
    let docs = corpus
      .into_iter()
      .map(|snippet| {
        let mut body = snippet.summary.clone();
        for point in &snippet.points {
          body.push(' ');
          body.push_str(point);
        }
        IndexedSnippet {
          keyword_terms: token_set(&snippet.keywords.join(" ")),
          title_terms:   token_set(&snippet.title),
          body_terms:    token_set(&body),
          snippet,
        }
      })
      .collect();
    Self { docs }
  }

  pub fn len(&self) -> usize {
    self.docs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.docs.is_empty()
  }

  /// Rank the corpus against `query` and return at most `top_k` hits.
  ///
  /// Empty or whitespace-only queries return an empty vec rather than an
  /// error.
  pub fn search(&self, query: &str, top_k: usize) -> Vec<Scored<'_>> {
    let query_terms = token_set(query);
    if query_terms.is_empty() || top_k == 0 {
      return Vec::new();
    }

    let mut scored: Vec<(usize, Scored<'_>)> = self
      .docs
      .iter()
      .enumerate()
      .filter_map(|(position, doc)| {
        let mut score = 0u32;
        for term in &query_terms {
          if doc.keyword_terms.contains(term) {
            score += KEYWORD_WEIGHT;
          }
          if doc.title_terms.contains(term) {
            score += TITLE_WEIGHT;
          }
          if doc.body_terms.contains(term) {
            score += BODY_WEIGHT;
          }
        }
        (score > 0).then_some((position, Scored { snippet: &doc.snippet, score }))
      })
      .collect();

    // Stable ordering: score descending, then corpus insertion order.
    scored.sort_by(|(pos_a, a), (pos_b, b)| {
      b.score.cmp(&a.score).then(pos_a.cmp(pos_b))
    });

    scored.into_iter().map(|(_, hit)| hit).take(top_k).collect()
  }

  /// Category-aware retrieval: seed terms for the category are appended to
  /// the query so terse issue text still lands on on-topic snippets.
  pub fn retrieve(
    &self,
    query: &str,
    category: Option<CaseCategory>,
    top_k: usize,
  ) -> Vec<Scored<'_>> {
    match category {
      Some(category) => {
        let mut expanded = query.to_string();
        for term in category_terms(category) {
          expanded.push(' ');
          expanded.push_str(term);
        }
        self.search(&expanded, top_k)
      }
      None => self.search(query, top_k),
    }
  }
}

/// Retrieval seed terms per category.
fn category_terms(category: CaseCategory) -> &'static [&'static str] {
  match category {
    CaseCategory::RepairsUrgent => &["urgent", "repairs", "hot water", "heating"],
    CaseCategory::RepairsNonurgent => &["repairs", "14 days", "written request"],
    CaseCategory::RentIncrease => &["rent", "increase", "60 days", "assessment"],
    CaseCategory::NoticeToVacate => &["notice", "vacate", "eviction"],
    CaseCategory::Bond => &["bond", "claim"],
    CaseCategory::MinStandards => &["minimum standards", "heater", "electrical"],
    CaseCategory::EntryRights => &["entry", "notice", "privacy"],
    CaseCategory::Other => &[],
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::corpus::builtin_corpus;

  fn index() -> LawIndex {
    LawIndex::new(builtin_corpus())
  }

  #[test]
  fn search_is_deterministic() {
    let index = index();
    let first: Vec<(String, u32)> = index
      .search("hot water", 3)
      .into_iter()
      .map(|hit| (hit.snippet.source_url.clone(), hit.score))
      .collect();
    let second: Vec<(String, u32)> = index
      .search("hot water", 3)
      .into_iter()
      .map(|hit| (hit.snippet.source_url.clone(), hit.score))
      .collect();
    assert!(!first.is_empty());
    assert_eq!(first, second);
  }

  #[test]
  fn hot_water_ranks_repairs_first() {
    let index = index();
    let hits = index.search("no hot water for 5 days", 3);
    assert!(hits[0].snippet.source_url.contains("repairs"));
  }

  #[test]
  fn empty_query_returns_empty() {
    let index = index();
    assert!(index.search("", 5).is_empty());
    assert!(index.search("   \t ", 5).is_empty());
  }

  #[test]
  fn top_k_larger_than_matches_returns_all_matches() {
    let index = index();
    let hits = index.search("vcat fees", 50);
    assert!(!hits.is_empty());
    assert!(hits.len() <= index.len());
    // No padding: every hit actually matched.
    assert!(hits.iter().all(|hit| hit.score > 0));
    // No duplicates.
    let urls: BTreeSet<&str> = hits.iter().map(|h| h.snippet.source_url.as_str()).collect();
    assert_eq!(urls.len(), hits.len());
  }

  #[test]
  fn unmatched_query_returns_empty() {
    let index = index();
    assert!(index.search("zebra astronautics", 4).is_empty());
  }

  #[test]
  fn equal_scores_tie_break_by_insertion_order() {
    let corpus = vec![
      crate::corpus::Snippet {
        source_url: "https://example.invalid/a".into(),
        title:      "shared term".into(),
        as_of:      chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        summary:    String::new(),
        points:     Vec::new(),
        keywords:   Vec::new(),
      },
      crate::corpus::Snippet {
        source_url: "https://example.invalid/b".into(),
        title:      "shared term".into(),
        as_of:      chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        summary:    String::new(),
        points:     Vec::new(),
        keywords:   Vec::new(),
      },
    ];
    let index = LawIndex::new(corpus);
    let hits = index.search("shared term", 2);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].score, hits[1].score);
    assert!(hits[0].snippet.source_url.ends_with("/a"));
    assert!(hits[1].snippet.source_url.ends_with("/b"));
  }

  #[test]
  fn category_seeding_finds_snippets_for_terse_queries() {
    let index = index();
    let hits = index.retrieve("it went up again", Some(CaseCategory::RentIncrease), 3);
    assert!(!hits.is_empty());
    assert!(hits[0].snippet.source_url.contains("rent-increases"));
  }
}
