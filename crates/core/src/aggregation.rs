//! Pure frequency computations over a record set.
//!
//! Every function tolerates an empty input and returns an empty result.
//! Missing optional fields contribute nothing.

use std::collections::HashMap;

use crate::domain::{CrossTabulation, FrequencyTable, Record};
use crate::utils::{cloud_tokens, split_tags, tokenize_words};

/// Insertion-ordered counter: ties in the final table keep first-seen order.
#[derive(Debug, Default)]
struct Counter {
    index: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl Counter {
    fn add(&mut self, label: &str) {
        match self.index.get(label) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push((label.to_string(), 1));
            }
        }
    }

    fn into_table(self) -> FrequencyTable {
        FrequencyTable::from_counts(self.entries)
    }
}

fn count<'a>(labels: impl IntoIterator<Item = &'a str>) -> FrequencyTable {
    let mut counter = Counter::default();
    for label in labels {
        counter.add(label);
    }
    counter.into_table()
}

/// One count per record with a non-empty category.
pub fn category_counts(records: &[Record]) -> FrequencyTable {
    count(records.iter().filter_map(|r| r.category.as_deref()))
}

/// Every tag across all records, full table.
pub fn all_tag_frequencies(records: &[Record]) -> FrequencyTable {
    count(records.iter().filter_map(|r| r.tags.as_deref()).flat_map(split_tags))
}

pub fn tag_frequencies(records: &[Record], top_n: usize) -> FrequencyTable {
    all_tag_frequencies(records).truncated(top_n)
}

/// Lower-cased whitespace tokens of every description, no stopword filtering.
pub fn description_word_frequencies(records: &[Record], top_n: usize) -> FrequencyTable {
    let tokens: Vec<String> = records
        .iter()
        .filter_map(|r| r.description.as_deref())
        .flat_map(tokenize_words)
        .collect();
    count(tokens.iter().map(String::as_str)).truncated(top_n)
}

/// Description tokens for the word cloud, with punctuation trimmed and stopwords removed.
pub fn description_cloud_frequencies(records: &[Record], max_words: usize) -> FrequencyTable {
    let tokens: Vec<String> = records
        .iter()
        .filter_map(|r| r.description.as_deref())
        .flat_map(cloud_tokens)
        .collect();
    count(tokens.iter().map(String::as_str)).truncated(max_words)
}

pub fn user_activity_counts(records: &[Record], top_n: usize) -> FrequencyTable {
    count(records.iter().map(|r| r.user_id.as_str()).filter(|id| !id.is_empty())).truncated(top_n)
}

pub fn course_popularity_counts(records: &[Record], top_n: usize) -> FrequencyTable {
    count(records.iter().map(|r| r.course_id.as_str()).filter(|id| !id.is_empty())).truncated(top_n)
}

/// Counts per (user, category). Records lacking either key are left out.
pub fn user_category_cross_tab(records: &[Record]) -> CrossTabulation {
    let mut tab = CrossTabulation::default();
    for record in records {
        if let Some(category) = record.category.as_deref() {
            if !record.user_id.is_empty() {
                tab.increment(&record.user_id, category);
            }
        }
    }
    tab
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Vec<Record> {
        vec![
            Record::new("u1", "c1")
                .with_category("Data")
                .with_tags("python, pandas")
                .with_description("Intro to data analysis with Python"),
            Record::new("u2", "c2")
                .with_category("Systems")
                .with_tags("rust,python")
                .with_description("Systems programming in Rust"),
            Record::new("u1", "c3").with_category("Data").with_tags("sql"),
            Record::new("u3", "c1"),
        ]
    }

    #[test]
    fn test_category_counts() {
        let table = category_counts(&sample());
        assert_eq!(
            table.entries(),
            &[("Data".to_string(), 2), ("Systems".to_string(), 1)]
        );
    }

    #[test]
    fn test_category_counts_empty_input() {
        assert!(category_counts(&[]).is_empty());
    }

    #[test]
    fn test_tag_frequencies_orders_by_count_then_first_seen() {
        let table = tag_frequencies(&sample(), 15);
        let labels: Vec<&str> = table.labels().collect();
        assert_eq!(labels, vec!["python", "pandas", "rust", "sql"]);
        assert_eq!(table.entries()[0].1, 2);
    }

    #[test]
    fn test_tag_frequencies_respects_top_n() {
        assert_eq!(tag_frequencies(&sample(), 2).len(), 2);
        assert!(tag_frequencies(&sample(), 0).is_empty());
    }

    #[test]
    fn test_tag_frequencies_skips_missing_tags() {
        let records = vec![Record::new("u1", "c1"), Record::new("u2", "c2").with_tags(" , ")];
        assert!(tag_frequencies(&records, 10).is_empty());
    }

    #[test]
    fn test_description_word_frequencies_keeps_stopwords() {
        let table = description_word_frequencies(&sample(), 20);
        assert_eq!(table.entries()[0], ("intro".to_string(), 1));
        assert!(table.labels().any(|w| w == "to"));
        assert!(table.labels().any(|w| w == "in"));
        assert_eq!(table.total(), 10);
    }

    #[test]
    fn test_description_word_frequencies_lowercases() {
        let records = vec![
            Record::new("u1", "c1").with_description("Rust rust RUST"),
            Record::new("u2", "c2").with_description("go"),
        ];
        let table = description_word_frequencies(&records, 20);
        assert_eq!(
            table.entries(),
            &[("rust".to_string(), 3), ("go".to_string(), 1)]
        );
    }

    #[test]
    fn test_description_cloud_frequencies_drops_stopwords() {
        let table = description_cloud_frequencies(&sample(), 200);
        assert!(!table.labels().any(|w| w == "to"));
        assert!(!table.labels().any(|w| w == "in"));
        assert!(table.labels().any(|w| w == "rust"));
    }

    #[test]
    fn test_user_activity_counts() {
        let table = user_activity_counts(&sample(), 15);
        assert_eq!(table.entries()[0], ("u1".to_string(), 2));
        assert_eq!(table.len(), 3);
        assert_eq!(user_activity_counts(&sample(), 1).len(), 1);
    }

    #[test]
    fn test_course_popularity_counts() {
        let table = course_popularity_counts(&sample(), 15);
        assert_eq!(table.entries()[0], ("c1".to_string(), 2));
        assert_eq!(table.total(), 4);
    }

    #[test]
    fn test_user_category_cross_tab_dense() {
        let records = vec![
            Record::new("u1", "x").with_category("c1"),
            Record::new("u1", "y").with_category("c1"),
            Record::new("u2", "z").with_category("c2"),
        ];
        let tab = user_category_cross_tab(&records);
        assert_eq!(tab.get("u1", "c1"), 2);
        assert_eq!(tab.get("u1", "c2"), 0);
        assert_eq!(tab.get("u2", "c1"), 0);
        assert_eq!(tab.get("u2", "c2"), 1);
        let dense = tab.to_dense();
        assert_eq!(dense.values, vec![vec![2, 0], vec![0, 1]]);
    }

    #[test]
    fn test_user_category_cross_tab_skips_missing_category() {
        let tab = user_category_cross_tab(&sample());
        assert_eq!(tab.users(), vec!["u1", "u2"]);
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        (
            "u[0-4]",
            "c[0-4]",
            proptest::option::of("(cat[0-3])?"),
            proptest::option::of("[a-d ,]{0,12}"),
        )
            .prop_map(|(user, course, category, tags)| {
                let mut record = Record::new(user, course);
                if let Some(category) = category {
                    record = record.with_category(category);
                }
                if let Some(tags) = tags {
                    record = record.with_tags(tags);
                }
                record
            })
    }

    proptest! {
        #[test]
        fn prop_category_counts_sum_to_categorized_records(
            records in proptest::collection::vec(arb_record(), 0..40)
        ) {
            let expected = records.iter().filter(|r| r.category.is_some()).count() as u64;
            prop_assert_eq!(category_counts(&records).total(), expected);
        }

        #[test]
        fn prop_tag_frequencies_bounded_and_sorted(
            records in proptest::collection::vec(arb_record(), 0..40),
            top_n in 0usize..6,
        ) {
            let table = tag_frequencies(&records, top_n);
            prop_assert!(table.len() <= top_n);
            for pair in table.entries().windows(2) {
                prop_assert!(pair[0].1 >= pair[1].1);
            }
        }
    }
}
