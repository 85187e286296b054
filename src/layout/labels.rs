//! Locale-aware label normalization and matching.
//!
//! Header cells in payroll workbooks are typed by hand, mostly in Arabic, with
//! inconsistent hamza forms, tatweel, diacritics and punctuation. Both the cell
//! text and every accepted variant are folded to the same canonical form before
//! comparison.

use crate::config::LabelTable;
use crate::models::LogicalField;

/// How well a cell matches a label variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchScore {
    /// No variant matches.
    None,
    /// The cell contains a whole variant as a word sequence.
    Contains,
    /// The cell equals a variant.
    Exact,
}

impl MatchScore {
    /// Returns true for any match.
    pub fn is_match(self) -> bool {
        self != MatchScore::None
    }
}

/// Folds a label to its canonical comparison form.
///
/// Lowercases, unifies alef/ta marbuta/alef maqsura forms, drops tatweel and
/// harakat, turns punctuation into spaces and collapses whitespace.
///
/// # Example
///
/// ```
/// use payroll_engine::layout::normalize_label;
///
/// assert_eq!(normalize_label("  الراتب  الأساسي: "), "الراتب الاساسي");
/// assert_eq!(normalize_label("Base_Salary (USD)"), "base salary usd");
/// ```
pub fn normalize_label(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for ch in raw.chars().flat_map(char::to_lowercase) {
        let mapped = match ch {
            'أ' | 'إ' | 'آ' | 'ٱ' => 'ا',
            'ة' => 'ه',
            'ى' => 'ي',
            // tatweel and harakat
            '\u{0640}' | '\u{064B}'..='\u{0652}' | '\u{0670}' => continue,
            '_' | '-' | ':' | '.' | ',' | '(' | ')' | '[' | ']' | '/' | '\\' | '*' | '#'
            | '\u{00A0}' | '\u{200F}' | '\u{200E}' => ' ',
            c => c,
        };
        folded.push(mapped);
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A set of pre-normalized label variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    variants: Vec<String>,
}

impl LabelSet {
    /// Normalizes and stores the variants, dropping ones that fold to nothing.
    pub fn new<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = variants
            .into_iter()
            .map(|v| normalize_label(v.as_ref()))
            .filter(|v| !v.is_empty())
            .collect();
        normalized.sort();
        normalized.dedup();
        Self {
            variants: normalized,
        }
    }

    /// Scores raw cell text against the set.
    pub fn score(&self, raw: &str) -> MatchScore {
        self.score_normalized(&normalize_label(raw))
    }

    /// Scores already-normalized cell text against the set.
    pub fn score_normalized(&self, cell: &str) -> MatchScore {
        if cell.is_empty() {
            return MatchScore::None;
        }
        let padded_cell = format!(" {cell} ");
        let mut best = MatchScore::None;
        for variant in &self.variants {
            if variant == cell {
                return MatchScore::Exact;
            }
            if padded_cell.contains(&format!(" {variant} ")) {
                best = MatchScore::Contains;
            }
        }
        best
    }
}

/// Per-field label sets built from a [`LabelTable`].
///
/// A cell containing a computed-column word ("Net Payment", "Loan balance",
/// "إجمالي بدل السكن") is a summary of inputs, not an input, and only matches
/// a field exactly.
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    fields: Vec<(LogicalField, LabelSet)>,
    computed: LabelSet,
}

impl LabelMatcher {
    /// Builds the matcher, keeping fields in canonical order.
    pub fn new<I, S>(table: &LabelTable, computed_markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = LogicalField::ALL
            .iter()
            .map(|field| (*field, LabelSet::new(table.variants(*field))))
            .collect();
        Self {
            fields,
            computed: LabelSet::new(computed_markers),
        }
    }

    /// Scores normalized cell text for every field with a match.
    pub fn matches(&self, normalized_cell: &str) -> Vec<(LogicalField, MatchScore)> {
        let computed = self.computed.score_normalized(normalized_cell).is_match();
        self.fields
            .iter()
            .map(|(field, set)| (*field, set.score_normalized(normalized_cell)))
            .filter(|(_, score)| match score {
                MatchScore::Exact => true,
                MatchScore::Contains => !computed,
                MatchScore::None => false,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportConfig;

    fn builtin_matcher() -> LabelMatcher {
        LabelMatcher::new(&LabelTable::builtin(), &ImportConfig::default().computed_markers)
    }

    #[test]
    fn test_normalize_folds_hamza_and_ta_marbuta() {
        assert_eq!(normalize_label("بدل إداري"), normalize_label("بدل اداري"));
        assert_eq!(normalize_label("مكافأة"), "مكافاه");
    }

    #[test]
    fn test_normalize_drops_tatweel_and_harakat() {
        assert_eq!(normalize_label("الراتـــب"), "الراتب");
        assert_eq!(normalize_label("الرَّاتِب"), "الراتب");
    }

    #[test]
    fn test_normalize_punctuation_and_case() {
        assert_eq!(normalize_label("Employee_No."), "employee no");
        assert_eq!(normalize_label("Grade/Step"), "grade step");
        assert_eq!(normalize_label("   "), "");
    }

    #[test]
    fn test_exact_match_beats_contains() {
        let set = LabelSet::new(["base salary"]);
        assert_eq!(set.score("Base Salary"), MatchScore::Exact);
        assert_eq!(set.score("Base salary (USD)"), MatchScore::Contains);
        assert_eq!(set.score("Salary"), MatchScore::None);
    }

    #[test]
    fn test_contains_requires_whole_words() {
        let set = LabelSet::new(["eos"]);
        assert_eq!(set.score("eos accrual"), MatchScore::Contains);
        assert_eq!(set.score("videos"), MatchScore::None);
    }

    #[test]
    fn test_matcher_reports_arabic_header() {
        let matcher = builtin_matcher();
        let matches = matcher.matches(&normalize_label("الرقم الوظيفي"));
        assert_eq!(matches, vec![(LogicalField::EmployeeNo, MatchScore::Exact)]);

        let matches = matcher.matches(&normalize_label("بدل السكن"));
        assert_eq!(
            matches,
            vec![(LogicalField::HousingAllowance, MatchScore::Exact)]
        );
    }

    #[test]
    fn test_matcher_ignores_unrelated_text() {
        let matcher = builtin_matcher();
        assert!(matcher.matches(&normalize_label("كشف رواتب شهر آذار")).is_empty());
    }

    #[test]
    fn test_computed_columns_do_not_match_by_containment() {
        let matcher = builtin_matcher();
        for header in ["Net Payment", "Total additions", "Loan balance", "إجمالي بدل السكن"] {
            assert!(
                matcher.matches(&normalize_label(header)).is_empty(),
                "{} should not map to an input field",
                header
            );
        }
        assert_eq!(
            matcher.matches(&normalize_label("Loan deduction")),
            vec![(LogicalField::LoanPenaltyDeduction, MatchScore::Contains)]
        );
    }

    #[test]
    fn test_computed_marker_cell_still_matches_exactly() {
        let mut table = LabelTable::builtin();
        table.extend(LogicalField::PaymentDeduction, ["net advance"]);
        let matcher = LabelMatcher::new(&table, ["net"]);
        assert_eq!(
            matcher.matches(&normalize_label("Net Advance")),
            vec![(LogicalField::PaymentDeduction, MatchScore::Exact)]
        );
    }
}
