//! Rule profiles: a data description of which checks run against which
//! fields. Profiles are plain serde data (built in, or loaded from TOML) and
//! are compiled into a [`RuleSet`] once per pipeline.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::normalizer::normalize_column;
use crate::validators::{DimensionShape, FieldValidator};

pub const BUILTIN_PROFILES: [&str; 3] = ["standard", "wholesale", "strict"];

const DEFAULT_PLACEHOLDERS: [&str; 7] = ["n/a", "-", "null", "sin dato", "none", "", "na"];
const DEFAULT_FORBIDDEN_CHARS: &str = "@#?%&";
const DEFAULT_MAX_PLACEHOLDER_FRACTION: f64 = 0.30;
const KNOWN_BRANDS: [&str; 8] = [
    "NGK",
    "Denso",
    "Delphi",
    "ACDelco",
    "Bosch",
    "Valeo",
    "Magneti Marelli",
    "Hella",
];
const BOILERPLATE_PREFIXES: [&str; 3] = ["Participant", "House", "Approach"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Integer,
    Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldRule {
    CodeFormat {
        prefix: String,
        min_len: usize,
        max_len: usize,
    },
    Category {
        allowed: Vec<String>,
    },
    BoundedInteger {
        min: i64,
        max: i64,
    },
    BoundedDecimal {
        min_exclusive: f64,
        max_inclusive: f64,
    },
    Dimension {
        shape: DimensionShape,
        min: f64,
        max: f64,
    },
    /// Upper bound defaults to the reference (current) year.
    Year {
        min: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    DescriptiveText {
        min_chars: usize,
        min_tokens: usize,
        #[serde(default)]
        forbidden_prefixes: Vec<String>,
    },
    NotDigitsOnly {},
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRuleSpec {
    pub field: String,
    #[serde(flatten)]
    pub rule: FieldRule,
}

impl FieldRuleSpec {
    fn new(field: &str, rule: FieldRule) -> Self {
        Self {
            field: field.to_string(),
            rule,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleProfile {
    pub name: String,
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<String>,
    #[serde(default = "default_forbidden_chars")]
    pub forbidden_chars: String,
    #[serde(default = "default_max_placeholder_fraction")]
    pub max_placeholder_fraction: f64,
    pub business_key: Vec<String>,
    #[serde(default = "default_true")]
    pub check_row_shape: bool,
    /// Reject text that is neither lower, upper, nor Capitalized. Off by
    /// default: it rejects real brand names such as "ACDelco".
    #[serde(default)]
    pub check_capitalization: bool,
    #[serde(default)]
    pub numeric_fields: BTreeMap<String, NumericKind>,
    #[serde(default)]
    pub field_rules: Vec<FieldRuleSpec>,
}

fn default_placeholders() -> Vec<String> {
    DEFAULT_PLACEHOLDERS.iter().map(|token| token.to_string()).collect()
}

fn default_forbidden_chars() -> String {
    DEFAULT_FORBIDDEN_CHARS.to_string()
}

fn default_max_placeholder_fraction() -> f64 {
    DEFAULT_MAX_PLACEHOLDER_FRACTION
}

fn default_true() -> bool {
    true
}

impl RuleProfile {
    /// The rule set the inventory loader has always applied: stock up to 1000,
    /// one row per part code.
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            required_fields: ["codigo", "nombre", "descripcion", "marca", "stock", "precio"]
                .iter()
                .map(|field| field.to_string())
                .collect(),
            placeholders: default_placeholders(),
            forbidden_chars: default_forbidden_chars(),
            max_placeholder_fraction: DEFAULT_MAX_PLACEHOLDER_FRACTION,
            business_key: vec!["codigo".to_string()],
            check_row_shape: true,
            check_capitalization: false,
            numeric_fields: BTreeMap::from([
                ("stock".to_string(), NumericKind::Integer),
                ("precio".to_string(), NumericKind::Decimal),
                ("anio".to_string(), NumericKind::Integer),
            ]),
            field_rules: vec![
                FieldRuleSpec::new(
                    "codigo",
                    FieldRule::CodeFormat {
                        prefix: "COD-".to_string(),
                        min_len: 6,
                        max_len: 8,
                    },
                ),
                FieldRuleSpec::new(
                    "marca",
                    FieldRule::Category {
                        allowed: KNOWN_BRANDS.iter().map(|brand| brand.to_string()).collect(),
                    },
                ),
                FieldRuleSpec::new("marca", FieldRule::NotDigitsOnly {}),
                FieldRuleSpec::new("stock", FieldRule::BoundedInteger { min: 0, max: 1000 }),
                FieldRuleSpec::new(
                    "precio",
                    FieldRule::BoundedDecimal {
                        min_exclusive: 0.0,
                        max_inclusive: 10000.0,
                    },
                ),
                FieldRuleSpec::new(
                    "descripcion",
                    FieldRule::DescriptiveText {
                        min_chars: 5,
                        min_tokens: 2,
                        forbidden_prefixes: BOILERPLATE_PREFIXES
                            .iter()
                            .map(|prefix| prefix.to_string())
                            .collect(),
                    },
                ),
                FieldRuleSpec::new("descripcion", FieldRule::NotDigitsOnly {}),
                FieldRuleSpec::new(
                    "diametro",
                    FieldRule::Dimension {
                        shape: DimensionShape::Millimetres,
                        min: 30.0,
                        max: 250.0,
                    },
                ),
                FieldRuleSpec::new(
                    "medida",
                    FieldRule::Dimension {
                        shape: DimensionShape::Triple,
                        min: 1.0,
                        max: 400.0,
                    },
                ),
                FieldRuleSpec::new("anio", FieldRule::Year { min: 1950, max: None }),
            ],
        }
    }

    /// Distributor feeds: stock up to 10000 and a composite business key, so
    /// the same code may appear once per engine/size variant.
    pub fn wholesale() -> Self {
        let mut profile = Self::standard();
        profile.name = "wholesale".to_string();
        profile.business_key = ["codigo", "codigo_oem", "motor", "medida", "stock"]
            .iter()
            .map(|field| field.to_string())
            .collect();
        for spec in &mut profile.field_rules {
            if spec.field == "stock" {
                spec.rule = FieldRule::BoundedInteger { min: 0, max: 10000 };
            }
        }
        profile
    }

    /// `standard` plus the capitalization-consistency check.
    pub fn strict() -> Self {
        let mut profile = Self::standard();
        profile.name = "strict".to_string();
        profile.check_capitalization = true;
        profile
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::standard()),
            "wholesale" => Some(Self::wholesale()),
            "strict" => Some(Self::strict()),
            _ => None,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolves a built-in profile name, or else treats `source` as a path to a
    /// TOML profile.
    pub fn load(source: &str) -> Result<Self> {
        if let Some(profile) = Self::builtin(source) {
            return Ok(profile);
        }
        let path = Path::new(source);
        if path.is_file() {
            return Self::from_path(path);
        }
        Err(CoreError::UnknownProfile(source.to_string()))
    }

    /// Validates parameters and produces the executable rule set. The year rule
    /// uses `reference_year` as its default upper bound.
    pub fn compile(&self, reference_year: i32) -> Result<RuleSet> {
        let invalid = |reason: String| CoreError::InvalidProfile {
            profile: self.name.clone(),
            reason,
        };

        if self.business_key.is_empty() {
            return Err(invalid("business_key must name at least one field".to_string()));
        }
        if !(0.0..=1.0).contains(&self.max_placeholder_fraction) {
            return Err(invalid(format!(
                "max_placeholder_fraction {} is outside [0, 1]",
                self.max_placeholder_fraction
            )));
        }

        let required_fields = normalize_names(&self.required_fields, &invalid)?;
        let business_key = normalize_names(&self.business_key, &invalid)?;

        let mut field_rules = Vec::with_capacity(self.field_rules.len());
        for spec in &self.field_rules {
            let field = normalize_column(&spec.field);
            if field.is_empty() {
                return Err(invalid("field rule with an empty field name".to_string()));
            }
            let validator = compile_rule(&spec.rule, reference_year)
                .map_err(|reason| invalid(format!("rule on '{field}': {reason}")))?;
            field_rules.push(CompiledFieldRule { field, validator });
        }

        let numeric_fields = self
            .numeric_fields
            .iter()
            .map(|(field, kind)| (normalize_column(field), *kind))
            .collect();

        Ok(RuleSet {
            name: self.name.clone(),
            required_fields,
            placeholders: self
                .placeholders
                .iter()
                .map(|token| token.trim().to_lowercase())
                .collect(),
            forbidden_chars: self.forbidden_chars.chars().collect(),
            max_placeholder_fraction: self.max_placeholder_fraction,
            numeric_fields,
            field_rules,
            business_key,
            check_row_shape: self.check_row_shape,
            check_capitalization: self.check_capitalization,
            reference_year,
        })
    }
}

fn normalize_names(
    names: &[String],
    invalid: &impl Fn(String) -> CoreError,
) -> Result<Vec<String>> {
    names
        .iter()
        .map(|name| {
            let normalized = normalize_column(name);
            if normalized.is_empty() {
                Err(invalid("field names must not be empty".to_string()))
            } else {
                Ok(normalized)
            }
        })
        .collect()
}

fn compile_rule(rule: &FieldRule, reference_year: i32) -> std::result::Result<FieldValidator, String> {
    let validator = match rule {
        FieldRule::CodeFormat {
            prefix,
            min_len,
            max_len,
        } => {
            if prefix.is_empty() {
                return Err("code prefix must not be empty".to_string());
            }
            if min_len > max_len {
                return Err(format!("min_len {min_len} exceeds max_len {max_len}"));
            }
            FieldValidator::CodeFormat {
                prefix: prefix.clone(),
                min_len: *min_len,
                max_len: *max_len,
            }
        }
        FieldRule::Category { allowed } => {
            if allowed.is_empty() {
                return Err("category needs at least one allowed value".to_string());
            }
            FieldValidator::Category {
                allowed: allowed.iter().map(|value| value.trim().to_string()).collect(),
            }
        }
        FieldRule::BoundedInteger { min, max } => {
            if min > max {
                return Err(format!("min {min} exceeds max {max}"));
            }
            FieldValidator::BoundedInteger {
                min: *min,
                max: *max,
            }
        }
        FieldRule::BoundedDecimal {
            min_exclusive,
            max_inclusive,
        } => {
            if !(min_exclusive < max_inclusive) {
                return Err(format!(
                    "min_exclusive {min_exclusive} must be below max_inclusive {max_inclusive}"
                ));
            }
            FieldValidator::BoundedDecimal {
                min_exclusive: *min_exclusive,
                max_inclusive: *max_inclusive,
            }
        }
        FieldRule::Dimension { shape, min, max } => {
            if !(min <= max) {
                return Err(format!("min {min} exceeds max {max}"));
            }
            FieldValidator::Dimension {
                shape: *shape,
                min: *min,
                max: *max,
            }
        }
        FieldRule::Year { min, max } => {
            let max = max.unwrap_or(i64::from(reference_year));
            if *min > max {
                return Err(format!("min year {min} exceeds max year {max}"));
            }
            FieldValidator::Year { min: *min, max }
        }
        FieldRule::DescriptiveText {
            min_chars,
            min_tokens,
            forbidden_prefixes,
        } => FieldValidator::DescriptiveText {
            min_chars: *min_chars,
            min_tokens: *min_tokens,
            forbidden_prefixes: forbidden_prefixes.clone(),
        },
        FieldRule::NotDigitsOnly {} => FieldValidator::NotDigitsOnly,
    };
    Ok(validator)
}

#[derive(Debug, Clone)]
pub struct CompiledFieldRule {
    pub field: String,
    pub validator: FieldValidator,
}

/// A compiled, immutable rule profile. Field names are already normalized.
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    required_fields: Vec<String>,
    placeholders: HashSet<String>,
    forbidden_chars: Vec<char>,
    max_placeholder_fraction: f64,
    numeric_fields: HashMap<String, NumericKind>,
    field_rules: Vec<CompiledFieldRule>,
    business_key: Vec<String>,
    check_row_shape: bool,
    check_capitalization: bool,
    reference_year: i32,
}

impl RuleSet {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    pub fn placeholders(&self) -> &HashSet<String> {
        &self.placeholders
    }

    pub fn forbidden_chars(&self) -> &[char] {
        &self.forbidden_chars
    }

    pub fn max_placeholder_fraction(&self) -> f64 {
        self.max_placeholder_fraction
    }

    pub fn numeric_kind(&self, field: &str) -> Option<NumericKind> {
        self.numeric_fields.get(field).copied()
    }

    pub fn field_rules(&self) -> &[CompiledFieldRule] {
        &self.field_rules
    }

    pub fn business_key(&self) -> &[String] {
        &self.business_key
    }

    pub fn check_row_shape(&self) -> bool {
        self.check_row_shape
    }

    pub fn check_capitalization(&self) -> bool {
        self.check_capitalization
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }
}
