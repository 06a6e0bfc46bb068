//! Doctor records and doctor-profile edits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::DoctorId;
use super::lenient::string_or_number;
use crate::edit::{FieldPatch, Overlay};

/// Two free-text address lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
}

/// A doctor as listed by the admin API and returned as a doctor's own profile.
///
/// Doctors are never deleted from the client; they change only through the
/// availability toggle or a profile update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: DoctorId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub speciality: String,
    #[serde(default)]
    pub degree: String,
    /// Free text such as "4 Years". A bare number is kept as its digits.
    #[serde(default, deserialize_with = "string_or_number")]
    pub experience: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub fees: Decimal,
    #[serde(default)]
    pub address: Address,
}

/// Body of `POST /api/doctor/update-profile`.
///
/// The backend accepts exactly these four fields; name, degree and the rest
/// of the profile are read-only from the doctor's side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub address: Address,
    #[serde(with = "rust_decimal::serde::float")]
    pub fees: Decimal,
    pub about: String,
    pub available: bool,
}

impl ProfileUpdate {
    /// Build the update body from an (already overlaid) profile.
    #[must_use]
    pub fn from_profile(profile: &Doctor) -> Self {
        Self {
            address: profile.address.clone(),
            fees: profile.fees,
            about: profile.about.clone(),
            available: profile.available,
        }
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    About,
    Fees,
    AddressLine1,
    AddressLine2,
    Available,
}

/// A pending edit to one field of a doctor's profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfilePatch {
    About(String),
    Fees(Decimal),
    AddressLine1(String),
    AddressLine2(String),
    Available(bool),
}

impl FieldPatch for ProfilePatch {
    type Field = ProfileField;

    fn field(&self) -> ProfileField {
        match self {
            Self::About(_) => ProfileField::About,
            Self::Fees(_) => ProfileField::Fees,
            Self::AddressLine1(_) => ProfileField::AddressLine1,
            Self::AddressLine2(_) => ProfileField::AddressLine2,
            Self::Available(_) => ProfileField::Available,
        }
    }
}

impl Overlay<ProfilePatch> for Doctor {
    fn apply(&mut self, patch: &ProfilePatch) {
        match patch {
            ProfilePatch::About(about) => self.about.clone_from(about),
            ProfilePatch::Fees(fees) => self.fees = *fees,
            ProfilePatch::AddressLine1(line) => self.address.line1.clone_from(line),
            ProfilePatch::AddressLine2(line) => self.address.line2.clone_from(line),
            ProfilePatch::Available(available) => self.available = *available,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Doctor {
        serde_json::from_value(json!({
            "_id": "d1",
            "name": "Dr. Grey",
            "speciality": "Neurologist",
            "degree": "MBBS",
            "experience": "4 Years",
            "about": "Calm",
            "available": true,
            "fees": 50,
            "address": { "line1": "1 Main St", "line2": "Springfield" }
        }))
        .unwrap()
    }

    #[test]
    fn test_doctor_deserializes_backend_shape() {
        let doctor = sample();
        assert_eq!(doctor.id.as_str(), "d1");
        assert_eq!(doctor.fees, Decimal::new(50, 0));
        assert_eq!(doctor.address.line2, "Springfield");
        assert!(doctor.email.is_empty());
    }

    #[test]
    fn test_profile_update_carries_only_editable_fields() {
        let mut doctor = sample();
        doctor.apply(&ProfilePatch::Fees(Decimal::new(75, 0)));
        doctor.apply(&ProfilePatch::AddressLine1("2 Side St".to_owned()));

        let body = serde_json::to_value(ProfileUpdate::from_profile(&doctor)).unwrap();
        assert_eq!(
            body,
            json!({
                "address": { "line1": "2 Side St", "line2": "Springfield" },
                "fees": 75.0,
                "about": "Calm",
                "available": true
            })
        );
    }

    #[test]
    fn test_experience_accepts_number_or_null() {
        let numeric: Doctor =
            serde_json::from_value(json!({ "_id": "d2", "name": "Dr. Lee", "experience": 4 }))
                .unwrap();
        assert_eq!(numeric.experience, "4");

        let missing: Doctor =
            serde_json::from_value(json!({ "_id": "d3", "name": "Dr. Kim", "experience": null }))
                .unwrap();
        assert!(missing.experience.is_empty());

        assert_eq!(sample().experience, "4 Years");
    }
}
