use crate::catalog::{CatalogRow, RawCourse, Table};
use crate::error::{BuildError, Result};
use crate::language::normalize_row_languages;
use crate::tokenizer::analyze;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub type TermId = u32;
pub type RowId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub row: RowId,
    pub weight: f32, // normalized tf-idf weight
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexOptions {
    /// Terms found in more than this proportion of rows are dropped.
    pub max_df: f32,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self { max_df: 0.95 }
    }
}

/// A catalog row paired with its relevance to one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub row: usize,
    pub course_no: Option<String>,
    pub title: String,
    pub about: String,
    pub audience: String,
    pub languages: BTreeSet<String>,
    pub score: f32,
}

/// Immutable TF-IDF index over the course catalog.
///
/// Built once; every query takes `&self` and allocates its own score buffer,
/// so one instance can serve any number of concurrent readers.
#[derive(Debug)]
pub struct RetrievalIndex {
    rows: Vec<CatalogRow>,
    dictionary: HashMap<String, TermId>,
    idf: Vec<f32>,
    postings: Vec<Vec<Posting>>, // postings sorted by row
}

impl RetrievalIndex {
    pub fn from_table(table: &Table) -> Result<Self> {
        let courses = table.to_courses()?;
        Self::build(courses)
    }

    pub fn build(courses: Vec<RawCourse>) -> Result<Self> {
        Self::build_with(courses, IndexOptions::default())
    }

    pub fn build_with(courses: Vec<RawCourse>, options: IndexOptions) -> Result<Self> {
        let rows: Vec<CatalogRow> = courses
            .into_iter()
            .map(|c| CatalogRow {
                languages: normalize_row_languages(c.languages_raw.as_deref()),
                course_no: c.course_no,
                title: c.title,
                about: c.about,
                audience: c.audience,
            })
            .collect();
        if rows.is_empty() {
            return Err(BuildError::EmptyCorpus.into());
        }

        // Raw term counts per row, keyed by term text until the vocabulary is fixed.
        let mut counts: Vec<HashMap<String, u32>> = Vec::with_capacity(rows.len());
        let mut df: HashMap<String, u32> = HashMap::new();
        for row in &rows {
            let mut tf: HashMap<String, u32> = HashMap::new();
            for term in analyze(&row.searchable_text()) {
                *tf.entry(term).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *df.entry(term.clone()).or_insert(0) += 1;
            }
            counts.push(tf);
        }
        if df.is_empty() {
            return Err(BuildError::EmptyCorpus.into());
        }

        let n = rows.len();
        let max_doc_count = options.max_df * n as f32;
        let total_terms = df.len();
        let mut kept: Vec<(String, u32)> = df.into_iter().filter(|(_, d)| (*d as f32) <= max_doc_count).collect();
        let pruned = total_terms - kept.len();
        if kept.is_empty() {
            return Err(BuildError::NoTermsRemain { pruned }.into());
        }
        // Sorted vocabulary keeps term ids stable across builds.
        kept.sort_by(|a, b| a.0.cmp(&b.0));

        let mut dictionary: HashMap<String, TermId> = HashMap::with_capacity(kept.len());
        let mut idf: Vec<f32> = Vec::with_capacity(kept.len());
        for (term_id, (term, df_t)) in kept.into_iter().enumerate() {
            idf.push(smoothed_idf(n, df_t));
            dictionary.insert(term, term_id as TermId);
        }

        // tf * idf per row, then L2-normalize each row vector.
        let mut postings: Vec<Vec<Posting>> = vec![Vec::new(); dictionary.len()];
        for (row, tf) in counts.into_iter().enumerate() {
            let mut weights: Vec<(TermId, f32)> = tf
                .into_iter()
                .filter_map(|(term, tf_raw)| {
                    dictionary.get(&term).map(|&tid| (tid, tf_raw as f32 * idf[tid as usize]))
                })
                .collect();
            weights.sort_by_key(|(tid, _)| *tid);
            let norm = weights.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
            if norm == 0.0 {
                continue;
            }
            for (tid, w) in weights {
                postings[tid as usize].push(Posting { row: row as RowId, weight: w / norm });
            }
        }

        tracing::info!(rows = n, vocabulary = dictionary.len(), pruned, "built retrieval index");
        Ok(Self { rows, dictionary, idf, postings })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn vocabulary_len(&self) -> usize {
        self.dictionary.len()
    }

    /// Every language tag present in the catalog, sorted.
    pub fn languages(&self) -> BTreeSet<String> {
        self.rows.iter().flat_map(|r| r.languages.iter().cloned()).collect()
    }

    /// Query weights over the fitted vocabulary, ordered by term id; unknown
    /// terms are ignored. The fixed order keeps float sums identical across calls.
    fn query_vector(&self, query: &str) -> Vec<(TermId, f32)> {
        let mut tf_q_raw: BTreeMap<TermId, u32> = BTreeMap::new();
        for term in analyze(query) {
            if let Some(&tid) = self.dictionary.get(&term) {
                *tf_q_raw.entry(tid).or_insert(0) += 1;
            }
        }
        let mut weights: Vec<(TermId, f32)> = tf_q_raw
            .into_iter()
            .map(|(tid, tf_raw)| (tid, tf_raw as f32 * self.idf[tid as usize]))
            .collect();
        let norm = weights.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in weights.iter_mut() {
                *w /= norm;
            }
        }
        weights
    }

    /// Top `k` rows by cosine similarity to `query`, ties in catalog order.
    ///
    /// A query with no known terms scores every row 0, which yields the first
    /// `k` rows in catalog order.
    pub fn search(&self, query: &str, k: usize) -> Vec<Hit> {
        let mut scores = vec![0.0f32; self.rows.len()];
        for (tid, q_w) in self.query_vector(query) {
            for p in &self.postings[tid as usize] {
                scores[p.row as usize] += p.weight * q_w; // cosine since both sides are normalized
            }
        }

        let mut ranked: Vec<(usize, f32)> = scores.into_iter().map(|s| s.clamp(0.0, 1.0)).enumerate().collect();
        // stable: equal scores keep catalog order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
            .into_iter()
            .take(k.max(1))
            .map(|(row, score)| self.hit(row, score))
            .collect()
    }

    /// Rows tagged with `language`, in catalog order, each with score 0.
    pub fn filter_by_language(&self, language: &str, k: usize) -> Vec<Hit> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.languages.contains(language))
            .take(k.max(1))
            .map(|(row, _)| self.hit(row, 0.0))
            .collect()
    }

    fn hit(&self, row: usize, score: f32) -> Hit {
        let r = &self.rows[row];
        Hit {
            row,
            course_no: r.course_no.clone(),
            title: r.title.clone(),
            about: r.about.clone(),
            audience: r.audience.clone(),
            languages: r.languages.clone(),
            score,
        }
    }
}

fn smoothed_idf(n: usize, df_t: u32) -> f32 {
    ((1.0 + n as f32) / (1.0 + df_t as f32)).ln() + 1.0
}
