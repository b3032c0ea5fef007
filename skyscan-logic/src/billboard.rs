use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{geo::GeoPoint, matcher::RegisteredAsset};

/// Status given to every newly registered billboard
pub const ACTIVE_STATUS: &str = "active";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A billboard row as stored by the backend
pub struct Billboard {
    pub id: String,
    pub address: String,
    pub owner: String,
    pub status: String,
    pub image_url: String,
    pub validity_from: NaiveDate,
    pub validity_till: NaiveDate,
    /// Free-form, e.g. "40x20 ft"
    pub size: String,
    #[serde(alias = "gps_latitude")]
    pub latitude: f64,
    #[serde(alias = "gps_longitude")]
    pub longitude: f64,
}

impl Billboard {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

impl From<&Billboard> for RegisteredAsset {
    fn from(b: &Billboard) -> Self {
        RegisteredAsset::new(b.id.clone(), b.location())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Raw registration input, everything is text until [BillboardForm::validate] is called
pub struct BillboardForm {
    pub billboard_id: String,
    pub latitude: String,
    pub longitude: String,
    pub size: String,
    pub address: String,
    pub owner: String,
    pub validity_from: String,
    pub validity_to: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// A required text field was blank, contains the field name
    MissingField(&'static str),
    /// No image was uploaded for the billboard
    MissingImage,
    /// Latitude or longitude didn't parse or was out of range
    InvalidCoordinates,
    /// A validity date wasn't in YYYY-MM-DD form, contains the field name
    InvalidDate(&'static str),
    /// Validity ends on or before it starts
    ValidityOrder,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => {
                write!(f, "Please fill in the {} field.", field.replacen('_', " ", 1))
            }
            Self::MissingImage => write!(f, "Please upload a billboard image."),
            Self::InvalidCoordinates => {
                write!(f, "Please enter valid latitude and longitude coordinates.")
            }
            Self::InvalidDate(field) => write!(
                f,
                "The {} field must be a date in YYYY-MM-DD form.",
                field.replacen('_', " ", 1)
            ),
            Self::ValidityOrder => write!(f, "Validity end date must be after start date."),
        }
    }
}

impl std::error::Error for RegistrationError {}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_date(raw: &str, field: &'static str) -> Result<NaiveDate, RegistrationError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| RegistrationError::InvalidDate(field))
}

impl BillboardForm {
    fn fields(&self) -> [(&'static str, &str); 9] {
        [
            ("billboard_id", self.billboard_id.as_str()),
            ("latitude", self.latitude.as_str()),
            ("longitude", self.longitude.as_str()),
            ("size", self.size.as_str()),
            ("address", self.address.as_str()),
            ("owner", self.owner.as_str()),
            ("validity_from", self.validity_from.as_str()),
            ("validity_to", self.validity_to.as_str()),
            ("image_url", self.image_url.as_str()),
        ]
    }

    /// Check the form and turn it into a [Billboard] ready to insert. Only the first problem
    /// found is reported.
    pub fn validate(&self) -> Result<Billboard, RegistrationError> {
        if let Some((field, _)) = self.fields().into_iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(if field == "image_url" {
                RegistrationError::MissingImage
            } else {
                RegistrationError::MissingField(field)
            });
        }

        let location = parse_coordinate(self.latitude.trim())
            .zip(parse_coordinate(self.longitude.trim()))
            .map(|(lat, lon)| GeoPoint::new(lat, lon))
            .filter(GeoPoint::is_valid)
            .ok_or(RegistrationError::InvalidCoordinates)?;

        let validity_from = parse_date(self.validity_from.trim(), "validity_from")?;
        let validity_till = parse_date(self.validity_to.trim(), "validity_to")?;

        if validity_till <= validity_from {
            return Err(RegistrationError::ValidityOrder);
        }

        Ok(Billboard {
            id: self.billboard_id.trim().to_string(),
            address: self.address.trim().to_string(),
            owner: self.owner.trim().to_string(),
            status: ACTIVE_STATUS.to_string(),
            image_url: self.image_url.trim().to_string(),
            validity_from,
            validity_till,
            size: self.size.trim().to_string(),
            latitude: location.latitude,
            longitude: location.longitude,
        })
    }
}
