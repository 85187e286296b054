//! Configuration types for payroll imports.
//!
//! This module contains the built-in label synonym table and the strongly-typed
//! structures deserialized from `import.yaml`.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::models::LogicalField;

/// Default number of leading rows searched for the header.
pub const DEFAULT_MAX_SCAN_ROWS: usize = 50;

/// Default number of rows returned in a preview.
pub const DEFAULT_PREVIEW_LIMIT: usize = 10;

/// Accepted header labels per logical field, Arabic and English.
const BUILTIN_LABELS: &[(LogicalField, &[&str])] = &[
    (
        LogicalField::EmployeeNo,
        &[
            "employee_no",
            "employee no",
            "employee number",
            "emp no",
            "staff no",
            "الرقم الوظيفي",
            "رقم الموظف",
            "الرقم الذاتي",
        ],
    ),
    (
        LogicalField::FullName,
        &[
            "full_name",
            "full name",
            "employee name",
            "name",
            "الاسم",
            "اسم الموظف",
            "الاسم الكامل",
            "الاسم الثلاثي",
        ],
    ),
    (
        LogicalField::Grade,
        &["grade", "job grade", "الفئة", "الدرجة الوظيفية", "المرتبة"],
    ),
    (LogicalField::Step, &["step", "المرحلة", "الخطوة", "الدرجة"]),
    (
        LogicalField::BaseSalaryUsd,
        &[
            "base_salary_usd",
            "base salary",
            "basic salary",
            "الراتب الأساسي",
            "الراتب المقطوع",
        ],
    ),
    (
        LogicalField::AdminAllowance,
        &["admin allowance", "administrative allowance", "بدل إداري", "تعويض إداري"],
    ),
    (
        LogicalField::EducationAllowance,
        &["education allowance", "بدل تعليم", "بدل شهادة", "تعويض الشهادة"],
    ),
    (
        LogicalField::HousingAllowance,
        &["housing allowance", "بدل سكن", "بدل السكن"],
    ),
    (
        LogicalField::TransportAllowance,
        &["transport allowance", "transportation allowance", "بدل نقل", "بدل مواصلات"],
    ),
    (
        LogicalField::CostOfLivingAllowance,
        &["cost of living allowance", "cost of living", "بدل غلاء معيشة", "غلاء المعيشة"],
    ),
    (
        LogicalField::ChildrenAllowance,
        &["children allowance", "child allowance", "بدل أطفال", "بدل الأولاد", "تعويض عائلي"],
    ),
    (
        LogicalField::SpecialAllowance,
        &["special allowance", "بدل خاص", "تعويض خاص"],
    ),
    (
        LogicalField::FuelAllowance,
        &["fuel allowance", "بدل محروقات", "بدل وقود"],
    ),
    (
        LogicalField::OvertimeHours,
        &["overtime hours", "ot hours", "ساعات إضافية", "عدد الساعات الإضافية"],
    ),
    (
        LogicalField::HourlyRateUsd,
        &["hourly rate", "hour rate", "أجر الساعة", "سعر الساعة"],
    ),
    (
        LogicalField::EosAccrualUsd,
        &["end of service", "eos accrual", "eos", "مكافأة نهاية الخدمة", "نهاية الخدمة"],
    ),
    (
        LogicalField::ExceptionalAdditionsUsd,
        &["exceptional additions", "additions", "إضافات استثنائية", "مكافآت استثنائية"],
    ),
    (
        LogicalField::LoanPenaltyDeduction,
        &["loan penalty", "loan", "penalty", "سلف وعقوبات", "سلفة", "عقوبات"],
    ),
    (
        LogicalField::PaymentDeduction,
        &["payment", "advance payment", "دفعة", "دفعة مقدمة"],
    ),
    (
        LogicalField::OtherDeduction,
        &["other deductions", "other deduction", "خصومات أخرى", "حسميات أخرى"],
    ),
];

/// Marker labels placed at the top-left corner of a salary scale block.
const BUILTIN_SCALE_MARKERS: &[&str] = &[
    "grade/step",
    "grade \\ step",
    "grade x step",
    "الفئة/المرحلة",
    "الفئة / الدرجة",
    "المرتبة/الدرجة",
];

/// Labels that identify a totals row below the data region.
const BUILTIN_TOTAL_MARKERS: &[&str] = &["total", "grand total", "المجموع", "الإجمالي"];

/// Words that mark a header cell as a computed summary column. Such a cell
/// only maps to a field through an exact label match.
const BUILTIN_COMPUTED_MARKERS: &[&str] = &[
    "net",
    "gross",
    "total",
    "balance",
    "صافي",
    "الصافي",
    "إجمالي",
    "الإجمالي",
    "مجموع",
    "المجموع",
    "رصيد",
];

/// Declarative table of accepted header labels per logical field.
///
/// # Example
///
/// ```
/// use payroll_engine::config::LabelTable;
/// use payroll_engine::models::LogicalField;
///
/// let mut table = LabelTable::builtin();
/// table.extend(LogicalField::EmployeeNo, ["sicil no"]);
/// assert!(table.variants(LogicalField::EmployeeNo).contains(&"sicil no".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: BTreeMap<LogicalField, Vec<String>>,
}

impl LabelTable {
    /// Returns the built-in Arabic/English synonym table.
    pub fn builtin() -> Self {
        let labels = BUILTIN_LABELS
            .iter()
            .map(|(field, variants)| {
                (*field, variants.iter().map(|v| (*v).to_string()).collect())
            })
            .collect();
        Self { labels }
    }

    /// Appends label variants for a field.
    pub fn extend<I, S>(&mut self, field: LogicalField, variants: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels
            .entry(field)
            .or_default()
            .extend(variants.into_iter().map(Into::into));
    }

    /// Returns the accepted variants for a field.
    pub fn variants(&self, field: LogicalField) -> &[String] {
        self.labels.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Header search settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeaderSettings {
    /// Required fields that must match for a row to qualify as the header.
    /// Defaults to a majority of the required fields.
    #[serde(default)]
    pub match_threshold: Option<usize>,
    /// How many leading rows of each sheet are searched.
    #[serde(default = "default_max_scan_rows")]
    pub max_scan_rows: usize,
}

impl HeaderSettings {
    /// The effective threshold, clamped to `1..=REQUIRED.len()`.
    pub fn threshold(&self) -> usize {
        let required = LogicalField::REQUIRED.len();
        self.match_threshold
            .unwrap_or(required / 2 + 1)
            .clamp(1, required)
    }
}

impl Default for HeaderSettings {
    fn default() -> Self {
        Self {
            match_threshold: None,
            max_scan_rows: DEFAULT_MAX_SCAN_ROWS,
        }
    }
}

fn default_max_scan_rows() -> usize {
    DEFAULT_MAX_SCAN_ROWS
}

fn default_preview_limit() -> usize {
    DEFAULT_PREVIEW_LIMIT
}

/// Salary scale section of `import.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalaryScaleSettings {
    /// Extra marker labels for the scale's top-left cell.
    #[serde(default)]
    pub markers: Vec<String>,
}

/// Raw structure of `import.yaml`. Every list extends the built-in defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfigFile {
    /// Header search settings.
    #[serde(default)]
    pub header: HeaderSettings,
    /// Extra label variants per logical field.
    #[serde(default)]
    pub labels: HashMap<LogicalField, Vec<String>>,
    /// Salary scale settings.
    #[serde(default)]
    pub salary_scale: SalaryScaleSettings,
    /// Extra total-row markers.
    #[serde(default)]
    pub total_markers: Vec<String>,
    /// Extra computed-column words.
    #[serde(default)]
    pub computed_markers: Vec<String>,
    /// Number of rows returned by a preview.
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
}

/// The effective import configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Header search settings.
    pub header: HeaderSettings,
    /// Header label synonyms.
    pub labels: LabelTable,
    /// Salary scale marker labels.
    pub scale_markers: Vec<String>,
    /// Total-row marker labels.
    pub total_markers: Vec<String>,
    /// Words marking computed summary columns in the header.
    pub computed_markers: Vec<String>,
    /// Number of rows returned by a preview.
    pub preview_limit: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            header: HeaderSettings::default(),
            labels: LabelTable::builtin(),
            scale_markers: BUILTIN_SCALE_MARKERS
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
            total_markers: BUILTIN_TOTAL_MARKERS
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
            computed_markers: BUILTIN_COMPUTED_MARKERS
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}

impl From<ImportConfigFile> for ImportConfig {
    fn from(file: ImportConfigFile) -> Self {
        let mut config = ImportConfig {
            header: file.header,
            preview_limit: file.preview_limit,
            ..ImportConfig::default()
        };
        // HashMap order is unstable; extend in canonical field order.
        for field in LogicalField::ALL {
            if let Some(extra) = file.labels.get(&field) {
                config.labels.extend(field, extra.iter().cloned());
            }
        }
        config.scale_markers.extend(file.salary_scale.markers);
        config.total_markers.extend(file.total_markers);
        config.computed_markers.extend(file.computed_markers);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_has_builtin_labels() {
        let table = LabelTable::builtin();
        for field in LogicalField::ALL {
            assert!(
                !table.variants(field).is_empty(),
                "no labels for {}",
                field
            );
        }
    }

    #[test]
    fn test_default_threshold_is_majority_of_required() {
        let settings = HeaderSettings::default();
        assert_eq!(settings.threshold(), 2);
    }

    #[test]
    fn test_threshold_is_clamped() {
        let settings = HeaderSettings {
            match_threshold: Some(10),
            max_scan_rows: 5,
        };
        assert_eq!(settings.threshold(), 3);

        let settings = HeaderSettings {
            match_threshold: Some(0),
            max_scan_rows: 5,
        };
        assert_eq!(settings.threshold(), 1);
    }

    #[test]
    fn test_config_file_extends_defaults() {
        let yaml = r#"
header:
  match_threshold: 3
labels:
  employee_no: ["sicil no"]
salary_scale:
  markers: ["kademe/derece"]
computed_markers: ["net pay"]
preview_limit: 5
"#;
        let file: ImportConfigFile = serde_yaml::from_str(yaml).unwrap();
        let config = ImportConfig::from(file);

        assert_eq!(config.header.threshold(), 3);
        assert_eq!(config.header.max_scan_rows, DEFAULT_MAX_SCAN_ROWS);
        assert_eq!(config.preview_limit, 5);
        let variants = config.labels.variants(LogicalField::EmployeeNo);
        assert!(variants.contains(&"sicil no".to_string()));
        assert!(variants.contains(&"employee no".to_string()));
        assert!(config.scale_markers.contains(&"kademe/derece".to_string()));
        assert!(config.scale_markers.contains(&"grade/step".to_string()));
        assert!(config.computed_markers.contains(&"net pay".to_string()));
        assert!(config.computed_markers.contains(&"net".to_string()));
    }

    #[test]
    fn test_empty_config_file_matches_default() {
        let file: ImportConfigFile = serde_yaml::from_str("{}").unwrap();
        assert_eq!(ImportConfig::from(file), ImportConfig::default());
    }
}
