use std::collections::{BTreeMap, HashMap};
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::services::coercion::{coerce, FieldValue, InputEvent, InputKind};

/// Gender as selected on the intake form.
///
/// The form offers Male and Female. Any other text is kept verbatim and
/// forwarded to the prediction service, which treats it as non-male.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    /// Default selection
    #[default]
    Male,
    Female,
    /// Free text that matched neither option
    Unrecognized(String),
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Male" => Gender::Male,
            "Female" => Gender::Female,
            _ => Gender::Unrecognized(value),
        }
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => "Male".to_string(),
            Gender::Female => "Female".to_string(),
            Gender::Unrecognized(value) => value,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Unrecognized(value) => write!(f, "{}", value),
        }
    }
}

/// Section of the intake form a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSection {
    Demographics,
    Cardiovascular,
    MetabolicSymptoms,
}

impl FormSection {
    pub fn title(&self) -> &'static str {
        match self {
            FormSection::Demographics => "Demographics",
            FormSection::Cardiovascular => "Cardiovascular Vitals",
            FormSection::MetabolicSymptoms => "Metabolic Symptoms",
        }
    }
}

/// Static description of one intake field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    /// Wire name, identical to the JSON key sent to the prediction service
    pub name: &'static str,
    /// Human readable label
    pub label: &'static str,
    /// Declared input kind of the control that edits this field
    pub kind: InputKind,
    pub section: FormSection,
}

const fn field(
    name: &'static str,
    label: &'static str,
    kind: InputKind,
    section: FormSection,
) -> FormField {
    FormField { name, label, kind, section }
}

/// Every field of [`FormState`] in display order.
pub const FORM_FIELDS: &[FormField] = &[
    field("age", "Age", InputKind::Number, FormSection::Demographics),
    field("gender", "Gender", InputKind::Text, FormSection::Demographics),
    field("cp", "Chest Pain (1-4)", InputKind::Number, FormSection::Cardiovascular),
    field("trestbps", "BP (mmHg)", InputKind::Number, FormSection::Cardiovascular),
    field("chol", "Cholesterol", InputKind::Number, FormSection::Cardiovascular),
    field("fbs", "Fasting Blood Sugar", InputKind::Number, FormSection::Cardiovascular),
    field("restecg", "Resting ECG", InputKind::Number, FormSection::Cardiovascular),
    field("thalach", "Max HR", InputKind::Number, FormSection::Cardiovascular),
    field("exang", "Ex. Angina", InputKind::Checkbox, FormSection::Cardiovascular),
    field("oldpeak", "Oldpeak", InputKind::Number, FormSection::Cardiovascular),
    field("slope", "ST Slope", InputKind::Number, FormSection::Cardiovascular),
    field("ca", "Major Vessels", InputKind::Number, FormSection::Cardiovascular),
    field("thal", "Thal", InputKind::Number, FormSection::Cardiovascular),
    field("polyuria", "Polyuria", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("polydipsia", "Polydipsia", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("weight_loss", "Weight Loss", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("weakness", "Weakness", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("polyphagia", "Polyphagia", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("thrush", "Thrush", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("blurring", "Blurring", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("itching", "Itching", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("irritability", "Irritability", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("healing", "Healing", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("paresis", "Paresis", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("stiffness", "Stiffness", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("alopecia", "Alopecia", InputKind::Checkbox, FormSection::MetabolicSymptoms),
    field("obesity", "Obesity", InputKind::Checkbox, FormSection::MetabolicSymptoms),
];

static FIELD_INDEX: Lazy<HashMap<&'static str, &'static FormField>> =
    Lazy::new(|| FORM_FIELDS.iter().map(|f| (f.name, f)).collect());

impl FormField {
    /// Look up a field by its wire name
    pub fn lookup(name: &str) -> Option<&'static FormField> {
        FIELD_INDEX.get(name).copied()
    }
}

/// Client-held record of every clinical input on the intake form.
///
/// Created once with defaults, edited field by field, and serialized as-is
/// for each prediction request. Numbers are not range checked and may be NaN;
/// serde_json encodes a NaN as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState {
    // Demographics
    pub age: f64,
    pub gender: Gender,

    // Cardiovascular
    pub cp: f64,
    pub trestbps: f64,
    pub chol: f64,
    pub fbs: f64,
    pub restecg: f64,
    pub thalach: f64,
    pub exang: bool,
    pub oldpeak: f64,
    pub slope: f64,
    pub ca: f64,
    pub thal: f64,

    // Metabolic symptoms
    pub polyuria: bool,
    pub polydipsia: bool,
    pub weight_loss: bool,
    pub weakness: bool,
    pub polyphagia: bool,
    pub thrush: bool,
    pub blurring: bool,
    pub itching: bool,
    pub irritability: bool,
    pub healing: bool,
    pub paresis: bool,
    pub stiffness: bool,
    pub alopecia: bool,
    pub obesity: bool,

    /// Edits addressed to names outside the fixed field set. They ride along
    /// in the payload next to the known fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            age: 50.0,
            gender: Gender::Male,
            cp: 1.0,
            trestbps: 120.0,
            chol: 200.0,
            fbs: 0.0,
            restecg: 0.0,
            thalach: 150.0,
            exang: false,
            oldpeak: 0.0,
            slope: 1.0,
            ca: 0.0,
            thal: 3.0,
            polyuria: false,
            polydipsia: false,
            weight_loss: false,
            weakness: false,
            polyphagia: false,
            thrush: false,
            blurring: false,
            itching: false,
            irritability: false,
            healing: false,
            paresis: false,
            stiffness: false,
            alopecia: false,
            obesity: false,
            extra: BTreeMap::new(),
        }
    }
}

/// Mutable view of one typed field
enum Slot<'a> {
    Number(&'a mut f64),
    Flag(&'a mut bool),
    Gender(&'a mut Gender),
}

impl FormState {
    /// Create a form populated with the default values
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, name: &str) -> Option<Slot<'_>> {
        let slot = match name {
            "age" => Slot::Number(&mut self.age),
            "gender" => Slot::Gender(&mut self.gender),
            "cp" => Slot::Number(&mut self.cp),
            "trestbps" => Slot::Number(&mut self.trestbps),
            "chol" => Slot::Number(&mut self.chol),
            "fbs" => Slot::Number(&mut self.fbs),
            "restecg" => Slot::Number(&mut self.restecg),
            "thalach" => Slot::Number(&mut self.thalach),
            "exang" => Slot::Flag(&mut self.exang),
            "oldpeak" => Slot::Number(&mut self.oldpeak),
            "slope" => Slot::Number(&mut self.slope),
            "ca" => Slot::Number(&mut self.ca),
            "thal" => Slot::Number(&mut self.thal),
            "polyuria" => Slot::Flag(&mut self.polyuria),
            "polydipsia" => Slot::Flag(&mut self.polydipsia),
            "weight_loss" => Slot::Flag(&mut self.weight_loss),
            "weakness" => Slot::Flag(&mut self.weakness),
            "polyphagia" => Slot::Flag(&mut self.polyphagia),
            "thrush" => Slot::Flag(&mut self.thrush),
            "blurring" => Slot::Flag(&mut self.blurring),
            "itching" => Slot::Flag(&mut self.itching),
            "irritability" => Slot::Flag(&mut self.irritability),
            "healing" => Slot::Flag(&mut self.healing),
            "paresis" => Slot::Flag(&mut self.paresis),
            "stiffness" => Slot::Flag(&mut self.stiffness),
            "alopecia" => Slot::Flag(&mut self.alopecia),
            "obesity" => Slot::Flag(&mut self.obesity),
            _ => return None,
        };
        Some(slot)
    }

    /// Read the current value of a field by wire name
    pub fn value(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "age" => FieldValue::Number(self.age),
            "gender" => FieldValue::Text(self.gender.to_string()),
            "cp" => FieldValue::Number(self.cp),
            "trestbps" => FieldValue::Number(self.trestbps),
            "chol" => FieldValue::Number(self.chol),
            "fbs" => FieldValue::Number(self.fbs),
            "restecg" => FieldValue::Number(self.restecg),
            "thalach" => FieldValue::Number(self.thalach),
            "exang" => FieldValue::Bool(self.exang),
            "oldpeak" => FieldValue::Number(self.oldpeak),
            "slope" => FieldValue::Number(self.slope),
            "ca" => FieldValue::Number(self.ca),
            "thal" => FieldValue::Number(self.thal),
            "polyuria" => FieldValue::Bool(self.polyuria),
            "polydipsia" => FieldValue::Bool(self.polydipsia),
            "weight_loss" => FieldValue::Bool(self.weight_loss),
            "weakness" => FieldValue::Bool(self.weakness),
            "polyphagia" => FieldValue::Bool(self.polyphagia),
            "thrush" => FieldValue::Bool(self.thrush),
            "blurring" => FieldValue::Bool(self.blurring),
            "itching" => FieldValue::Bool(self.itching),
            "irritability" => FieldValue::Bool(self.irritability),
            "healing" => FieldValue::Bool(self.healing),
            "paresis" => FieldValue::Bool(self.paresis),
            "stiffness" => FieldValue::Bool(self.stiffness),
            "alopecia" => FieldValue::Bool(self.alopecia),
            "obesity" => FieldValue::Bool(self.obesity),
            other => return self.extra.get(other).map(FieldValue::from_json),
        };
        Some(value)
    }

    /// Coerce an input event and merge it into the form.
    ///
    /// Only the named field changes. This never fails.
    pub fn apply(&mut self, event: &InputEvent) {
        let value = coerce(event.kind, &event.raw);
        self.set_value(&event.name, value);
    }

    /// Store an already coerced value, converting it to the field's type
    pub fn set_value(&mut self, name: &str, value: FieldValue) {
        match self.slot_mut(name) {
            Some(Slot::Number(slot)) => *slot = value.as_number(),
            Some(Slot::Flag(slot)) => *slot = value.as_flag(),
            Some(Slot::Gender(slot)) => *slot = Gender::from(value.into_text()),
            None => {
                debug!("Storing edit for unlisted field '{}'", name);
                self.extra.insert(name.to_string(), value.into_json());
            }
        }
    }

    /// Flip a boolean field, returning its new value.
    ///
    /// Returns `None` and leaves the form untouched when the field is not boolean.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        match self.slot_mut(name) {
            Some(Slot::Flag(slot)) => {
                *slot = !*slot;
                Some(*slot)
            }
            Some(_) => None,
            None => match self.extra.get_mut(name) {
                Some(serde_json::Value::Bool(flag)) => {
                    *flag = !*flag;
                    Some(*flag)
                }
                _ => None,
            },
        }
    }

    /// Names of the metabolic symptom flags currently checked
    pub fn checked_symptoms(&self) -> Vec<&'static str> {
        FORM_FIELDS
            .iter()
            .filter(|f| f.section == FormSection::MetabolicSymptoms)
            .filter(|f| matches!(self.value(f.name), Some(FieldValue::Bool(true))))
            .map(|f| f.name)
            .collect()
    }
}
