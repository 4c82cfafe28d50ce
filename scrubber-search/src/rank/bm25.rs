//! Okapi BM25 over a small, fixed corpus of snippet texts.
//!
//! Score for document `d` and query `q`:
//!
//! ```text
//! Σ_{t∈q} idf(t) · tf(t,d)·(k1+1) / (tf(t,d) + k1·(1 − b + b·|d|/avgdl))
//! idf(t) = ln(1 + (N − n(t) + 0.5) / (n(t) + 0.5))
//! ```
//!
//! The `1 +` inside the logarithm keeps idf positive for terms that occur in
//! more than half of the corpus, which is common with a handful of
//! snippets about the same topic.

use std::collections::HashMap;

/// Default term-frequency saturation.
pub const DEFAULT_K1: f64 = 1.5;
/// Default length normalisation strength.
pub const DEFAULT_B: f64 = 0.75;

/// BM25 scorer. Fit once, then score any number of queries.
#[derive(Debug, Clone)]
pub struct Bm25Okapi {
    k1: f64,
    b: f64,
    term_freqs: Vec<HashMap<String, usize>>,
    doc_lens: Vec<usize>,
    avg_doc_len: f64,
    idf: HashMap<String, f64>,
}

impl Default for Bm25Okapi {
    fn default() -> Self {
        Self::with_params(DEFAULT_K1, DEFAULT_B)
    }
}

impl Bm25Okapi {
    /// Scorer with the standard `k1 = 1.5`, `b = 0.75`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scorer with custom parameters.
    pub fn with_params(k1: f64, b: f64) -> Self {
        Self {
            k1,
            b,
            term_freqs: Vec::new(),
            doc_lens: Vec::new(),
            avg_doc_len: 0.0,
            idf: HashMap::new(),
        }
    }

    /// Index `corpus`, replacing anything fitted before.
    ///
    /// Corpus order is the index space of [`Bm25Okapi::score`].
    pub fn fit<I, S>(&mut self, corpus: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.term_freqs.clear();
        self.doc_lens.clear();
        self.idf.clear();

        let mut doc_counts: HashMap<String, usize> = HashMap::new();
        for doc in corpus {
            let tokens = tokenize(doc.as_ref());
            let mut freqs: HashMap<String, usize> = HashMap::new();
            for token in tokens.iter() {
                *freqs.entry(token.clone()).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_counts.entry(term.clone()).or_insert(0) += 1;
            }
            self.doc_lens.push(tokens.len());
            self.term_freqs.push(freqs);
        }

        let n_docs = self.doc_lens.len() as f64;
        let total_len: usize = self.doc_lens.iter().sum();
        self.avg_doc_len = if self.doc_lens.is_empty() {
            0.0
        } else {
            total_len as f64 / n_docs
        };

        self.idf = doc_counts
            .into_iter()
            .map(|(term, n)| {
                let n = n as f64;
                let idf = (1.0 + (n_docs - n + 0.5) / (n + 0.5)).ln();
                (term, idf)
            })
            .collect();
    }

    /// Number of fitted documents.
    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    /// `true` when nothing has been fitted.
    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }

    /// Raw scores for `query`, one per document, in corpus order.
    ///
    /// Query terms that never occur in the corpus contribute nothing.
    pub fn score(&self, query: &str) -> Vec<f64> {
        let terms = tokenize(query);
        self.term_freqs
            .iter()
            .zip(&self.doc_lens)
            .map(|(freqs, &doc_len)| {
                let length_ratio = if self.avg_doc_len > 0.0 {
                    doc_len as f64 / self.avg_doc_len
                } else {
                    0.0
                };
                let norm = self.k1 * (1.0 - self.b + self.b * length_ratio);

                terms
                    .iter()
                    .map(|term| {
                        let Some(&idf) = self.idf.get(term) else {
                            return 0.0;
                        };
                        let tf = freqs.get(term).copied().unwrap_or(0) as f64;
                        if tf == 0.0 {
                            return 0.0;
                        }
                        idf * (tf * (self.k1 + 1.0)) / (tf + norm)
                    })
                    .sum()
            })
            .collect()
    }

    /// Min-max scale `scores` into `[0, 1]`.
    ///
    /// When every score is equal (including a single score) the result is
    /// all zeros rather than a division by zero.
    pub fn normalize(scores: &[f64]) -> Vec<f64> {
        let finite = scores.iter().copied().filter(|s| s.is_finite());
        let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s), hi.max(s))
        });

        let range = max - min;
        if !range.is_finite() || range <= 0.0 {
            return vec![0.0; scores.len()];
        }

        scores
            .iter()
            .map(|&s| {
                if s.is_finite() {
                    ((s - min) / range).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            })
            .collect()
    }
}

/// Lowercase and split on anything that is not alphanumeric.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}
