//! Drug inventory records and field-level drug edits.
//!
//! # In-stock toggle
//!
//! The backend stores only a stock count. "In stock" is derived as
//! `stock > 0`, and toggling it is written as a stock quantity:
//!
//! | Toggle | Current stock | Written stock |
//! |--------|---------------|---------------|
//! | off    | any           | `0`           |
//! | on     | `s > 0`       | `s`           |
//! | on     | `0`           | `1`           |

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::id::DrugId;
use super::lenient::{lenient_count, null_as_default};
use crate::edit::{FieldPatch, Overlay};

/// The fixed set of drug categories offered by the inventory.
///
/// Records carrying a category outside the set decode as `Other`; it is
/// never offered in forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DrugCategory {
    #[default]
    #[serde(rename = "Pain Relief")]
    PainRelief,
    Allergy,
    Antibiotic,
    Antacid,
    Diabetes,
    #[serde(rename = "Mental Health")]
    MentalHealth,
    #[serde(other)]
    Other,
}

impl DrugCategory {
    /// All categories, in form order.
    pub const ALL: [Self; 6] = [
        Self::PainRelief,
        Self::Allergy,
        Self::Antibiotic,
        Self::Antacid,
        Self::Diabetes,
        Self::MentalHealth,
    ];

    /// The wire (and display) label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PainRelief => "Pain Relief",
            Self::Allergy => "Allergy",
            Self::Antibiotic => "Antibiotic",
            Self::Antacid => "Antacid",
            Self::Diabetes => "Diabetes",
            Self::MentalHealth => "Mental Health",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for DrugCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for DrugCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid drug category: {s}"))
    }
}

/// A drug in the pharmacy inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drug {
    #[serde(rename = "_id")]
    pub id: DrugId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: DrugCategory,
    #[serde(default, deserialize_with = "null_as_default")]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient_count")]
    pub stock: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prescription_required: bool,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl Drug {
    /// Derived in-stock flag.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Fields of a drug that can be edited inline from the drug list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrugField {
    Image,
    Name,
    Category,
    Manufacturer,
    Price,
    Stock,
    PrescriptionRequired,
    /// Virtual field; written as a stock quantity.
    InStock,
}

impl DrugField {
    /// Field name as it appears in edit requests.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Name => "name",
            Self::Category => "category",
            Self::Manufacturer => "manufacturer",
            Self::Price => "price",
            Self::Stock => "stock",
            Self::PrescriptionRequired => "prescriptionRequired",
            Self::InStock => "inStock",
        }
    }
}

/// A single-field drug edit, sent as one `update-drug` call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrugUpdate {
    Image(String),
    Name(String),
    Category(DrugCategory),
    Manufacturer(String),
    Price(Decimal),
    Stock(u32),
    PrescriptionRequired(bool),
    /// In-stock toggle carrying the stock quantity to write.
    InStock(u32),
}

impl DrugUpdate {
    /// The request body entry for this edit.
    ///
    /// `InStock` is translated into a `stock` write; the backend has no
    /// boolean in-stock field.
    #[must_use]
    pub fn body_entry(&self) -> (&'static str, Value) {
        match self {
            Self::Image(v) => ("image", Value::String(v.clone())),
            Self::Name(v) => ("name", Value::String(v.clone())),
            Self::Category(v) => ("category", Value::String(v.label().to_owned())),
            Self::Manufacturer(v) => ("manufacturer", Value::String(v.clone())),
            Self::Price(v) => ("price", decimal_to_json(*v)),
            Self::Stock(v) | Self::InStock(v) => ("stock", Value::from(*v)),
            Self::PrescriptionRequired(v) => ("prescriptionRequired", Value::Bool(*v)),
        }
    }
}

/// Build the in-stock toggle edit from the checkbox state and the stock
/// currently shown for the drug (staged if edited, canonical otherwise).
#[must_use]
pub const fn in_stock_patch(checked: bool, current_stock: u32) -> DrugUpdate {
    let quantity = match (checked, current_stock) {
        (false, _) => 0,
        (true, 0) => 1,
        (true, stock) => stock,
    };
    DrugUpdate::InStock(quantity)
}

fn decimal_to_json(value: Decimal) -> Value {
    value
        .to_f64()
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

impl FieldPatch for DrugUpdate {
    type Field = DrugField;

    fn field(&self) -> DrugField {
        match self {
            Self::Image(_) => DrugField::Image,
            Self::Name(_) => DrugField::Name,
            Self::Category(_) => DrugField::Category,
            Self::Manufacturer(_) => DrugField::Manufacturer,
            Self::Price(_) => DrugField::Price,
            Self::Stock(_) => DrugField::Stock,
            Self::PrescriptionRequired(_) => DrugField::PrescriptionRequired,
            Self::InStock(_) => DrugField::InStock,
        }
    }
}

impl Overlay<DrugUpdate> for Drug {
    /// `InStock` is virtual and leaves `stock` untouched; the view reads it
    /// back from the staged edit.
    fn apply(&mut self, patch: &DrugUpdate) {
        match patch {
            DrugUpdate::Image(v) => self.image.clone_from(v),
            DrugUpdate::Name(v) => self.name.clone_from(v),
            DrugUpdate::Category(v) => self.category = *v,
            DrugUpdate::Manufacturer(v) => self.manufacturer.clone_from(v),
            DrugUpdate::Price(v) => self.price = *v,
            DrugUpdate::Stock(v) => self.stock = *v,
            DrugUpdate::PrescriptionRequired(v) => self.prescription_required = *v,
            DrugUpdate::InStock(_) => {}
        }
    }
}

/// Form data for `POST /api/admin/add-drug` (sent as multipart with an image).
#[derive(Debug, Clone, PartialEq)]
pub struct NewDrug {
    pub name: String,
    pub category: DrugCategory,
    pub manufacturer: String,
    pub price: Decimal,
    /// Defaults to `0` when left empty.
    pub stock: Option<u32>,
    pub description: String,
    pub prescription_required: bool,
    pub expiry_date: Option<NaiveDate>,
}

impl NewDrug {
    /// Text parts of the multipart form, in the order the backend expects.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("category", self.category.label().to_owned()),
            ("manufacturer", self.manufacturer.clone()),
            ("price", self.price.to_string()),
            ("stock", self.stock.unwrap_or(0).to_string()),
            ("description", self.description.clone()),
            ("prescriptionRequired", self.prescription_required.to_string()),
            (
                "expiryDate",
                self.expiry_date
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
        ]
    }
}
