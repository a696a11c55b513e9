use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TermStat {
    pub frequency: u32,
    /// `frequency / word_count`
    pub tf_score: f64,
}

/// Term counts for a single document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TermStats {
    pub word_count: u32,
    pub terms: BTreeMap<String, TermStat>,
}

impl TermStats {
    /// Count `terms` (already normalized) and derive each term's TF.
    ///
    /// An empty sequence gives `word_count == 0` and no terms.
    pub fn build<S: AsRef<str>>(terms: &[S]) -> Self {
        if terms.is_empty() {
            return Self::default();
        }
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for term in terms {
            *counts.entry(term.as_ref()).or_insert(0) += 1;
        }
        let word_count = terms.len() as u32;
        let total = f64::from(word_count);
        let terms = counts
            .into_iter()
            .map(|(term, frequency)| {
                let tf_score = f64::from(frequency) / total;
                (term.to_string(), TermStat { frequency, tf_score })
            })
            .collect();
        Self { word_count, terms }
    }

    pub fn unique_terms(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub fn get(&self, term: &str) -> Option<&TermStat> { self.terms.get(term) }
}
