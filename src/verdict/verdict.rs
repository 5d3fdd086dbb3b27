/// Verdict classification
///
/// Decides whether a learner's result is equivalent to the expected result.
/// Both axes are order-insensitive: column names are compared as a sorted
/// multiset, rows as a sorted multiset of tuples aligned to the sorted
/// column order. As a consequence a query that ignores a requested
/// `ORDER BY` is still judged correct.
use crate::config::types::{ResultSet, Scalar};
use crate::verdict::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Why a verdict came out the way it did
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictCause {
    Match,
    /// The query produced no tabular result
    NoResult,
    ColumnMismatch,
    RowCountMismatch,
    RowMismatch,
}

impl VerdictCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictCause::Match => "match",
            VerdictCause::NoResult => "no_result",
            VerdictCause::ColumnMismatch => "column_mismatch",
            VerdictCause::RowCountMismatch => "row_count_mismatch",
            VerdictCause::RowMismatch => "row_mismatch",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    pub cause: VerdictCause,
}

impl Verdict {
    fn from_cause(cause: VerdictCause) -> Self {
        Self {
            correct: cause == VerdictCause::Match,
            cause,
        }
    }
}

/// Total order over normalized cells used to sort row tuples.
///
/// NULL < numbers < text. Integers and integral reals are the same number.
#[derive(Clone, Debug)]
enum CanonicalCell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CanonicalCell {
    fn rank(&self) -> u8 {
        match self {
            CanonicalCell::Null => 0,
            CanonicalCell::Integer(_) | CanonicalCell::Real(_) => 1,
            CanonicalCell::Text(_) => 2,
        }
    }
}

impl From<&Scalar> for CanonicalCell {
    fn from(value: &Scalar) -> Self {
        match value {
            Scalar::Null => CanonicalCell::Null,
            Scalar::Integer(i) => CanonicalCell::Integer(*i),
            Scalar::Real(r) => {
                // 2^63 as f64; anything at or above it does not fit i64
                let fits = *r >= i64::MIN as f64 && *r < 9_223_372_036_854_775_808.0;
                if r.is_finite() && r.fract() == 0.0 && fits {
                    CanonicalCell::Integer(*r as i64)
                } else {
                    CanonicalCell::Real(*r)
                }
            }
            Scalar::Text(s) => CanonicalCell::Text(s.clone()),
        }
    }
}

impl Ord for CanonicalCell {
    fn cmp(&self, other: &Self) -> Ordering {
        use CanonicalCell::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Real(a), Real(b)) => a.total_cmp(b),
            (Integer(a), Real(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Real(a), Integer(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Text(a), Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for CanonicalCell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CanonicalCell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CanonicalCell {}

/// Upper bound on same-named column arrangements tried per comparison (7!).
const MAX_DUPLICATE_ARRANGEMENTS: usize = 5040;

fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for (i, first) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, *first);
            out.push(tail);
        }
    }
    out
}

/// Verdict classifier - pure function over two normalized results
pub struct VerdictClassifier;

impl VerdictClassifier {
    /// Classify an already-normalized user result against an already-normalized expected result.
    pub fn classify(user: Option<&ResultSet>, expected: Option<&ResultSet>) -> Verdict {
        let Some(user) = user else {
            return Verdict::from_cause(VerdictCause::NoResult);
        };
        let Some(expected) = expected else {
            return Verdict::from_cause(VerdictCause::ColumnMismatch);
        };

        let (user_columns, user_order) = Self::sorted_columns(user);
        let (expected_columns, expected_order) = Self::sorted_columns(expected);
        if user_columns != expected_columns {
            return Verdict::from_cause(VerdictCause::ColumnMismatch);
        }

        if user.rows.len() != expected.rows.len() {
            return Verdict::from_cause(VerdictCause::RowCountMismatch);
        }

        let expected_rows = Self::canonical_rows(expected, &expected_order);
        let matched = Self::column_arrangements(&user_columns, &user_order)
            .iter()
            .any(|order| Self::canonical_rows(user, order) == expected_rows);
        if !matched {
            return Verdict::from_cause(VerdictCause::RowMismatch);
        }

        Verdict::from_cause(VerdictCause::Match)
    }

    /// Boolean form of [`Self::classify`].
    pub fn is_correct(user: Option<&ResultSet>, expected: Option<&ResultSet>) -> bool {
        Self::classify(user, expected).correct
    }

    /// Normalize both sides with the same transform, then classify.
    ///
    /// Expected results are stored raw and normalized at comparison time.
    pub fn judge(raw_user: Option<&ResultSet>, raw_expected: &ResultSet) -> Verdict {
        let user = normalize(raw_user);
        let expected = normalize(Some(raw_expected));
        Self::classify(user.as_ref(), expected.as_ref())
    }

    /// Column names in lexicographic order, plus the source index of each.
    ///
    /// Same-named columns are ordered by their sorted cell contents, so the
    /// result does not depend on where they sat in the source.
    fn sorted_columns(set: &ResultSet) -> (Vec<&str>, Vec<usize>) {
        let contents: Vec<Vec<CanonicalCell>> = (0..set.columns.len())
            .map(|idx| {
                let mut cells: Vec<CanonicalCell> = set
                    .rows
                    .iter()
                    .map(|row| row.get(idx).map(CanonicalCell::from).unwrap_or(CanonicalCell::Null))
                    .collect();
                cells.sort();
                cells
            })
            .collect();

        let mut order: Vec<usize> = (0..set.columns.len()).collect();
        order.sort_by(|a, b| {
            set.columns[*a]
                .cmp(&set.columns[*b])
                .then_with(|| contents[*a].cmp(&contents[*b]))
        });
        let names = order.iter().map(|i| set.columns[*i].as_str()).collect();
        (names, order)
    }

    /// Every way of arranging runs of same-named columns within `order`.
    ///
    /// Content ordering alone cannot tell apart same-named columns holding
    /// the same multiset of values, so each arrangement is tried. Past
    /// [`MAX_DUPLICATE_ARRANGEMENTS`] only the content order is used.
    fn column_arrangements(names: &[&str], order: &[usize]) -> Vec<Vec<usize>> {
        let mut runs = Vec::new();
        let mut start = 0;
        while start < names.len() {
            let mut end = start + 1;
            while end < names.len() && names[end] == names[start] {
                end += 1;
            }
            if end - start > 1 {
                runs.push(start..end);
            }
            start = end;
        }

        let total = runs.iter().try_fold(1usize, |acc, run| {
            (1..=run.len()).try_fold(acc, |acc, k| acc.checked_mul(k))
        });
        if runs.is_empty() || !matches!(total, Some(n) if n <= MAX_DUPLICATE_ARRANGEMENTS) {
            return vec![order.to_vec()];
        }

        let mut arrangements = vec![order.to_vec()];
        for run in runs {
            let mut next = Vec::new();
            for base in &arrangements {
                for permuted in permutations(&base[run.clone()]) {
                    let mut candidate = base.clone();
                    candidate[run.clone()].copy_from_slice(&permuted);
                    next.push(candidate);
                }
            }
            arrangements = next;
        }
        arrangements
    }

    /// Rows re-laid in sorted column order, then sorted as tuples.
    fn canonical_rows(set: &ResultSet, column_order: &[usize]) -> Vec<Vec<CanonicalCell>> {
        let mut rows: Vec<Vec<CanonicalCell>> = set
            .rows
            .iter()
            .map(|row| {
                column_order
                    .iter()
                    .map(|idx| row.get(*idx).map(CanonicalCell::from).unwrap_or(CanonicalCell::Null))
                    .collect()
            })
            .collect();
        rows.sort();
        rows
    }
}
