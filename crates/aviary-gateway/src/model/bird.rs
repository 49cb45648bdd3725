use std::fmt::Display;
use std::str::FromStr;

use aviary_core::{BirdFields, Photo, Upload};
use axum::extract::Multipart;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Name of the single file input on the create and update forms.
pub const IMAGE_FIELD: &str = "bird_image";

/// A submitted create or update form.
#[derive(Debug, Default)]
pub struct BirdForm {
    pub fields: BirdFields,
    pub photographer: Option<String>,
    pub upload: Option<Upload>,
}

impl BirdForm {
    /// Reads every part of a multipart body. Unknown parts are ignored.
    ///
    /// A file input left empty by the browser arrives with no file name and
    /// no content, and is not treated as an upload.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = BirdForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == IMAGE_FIELD {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !(original_name.is_empty() && bytes.is_empty()) {
                    form.upload = Some(Upload::new(original_name, bytes.to_vec()));
                }
                continue;
            }

            let value = field.text().await?;
            form.set(&name, value)?;
        }

        Ok(form)
    }

    fn set(&mut self, name: &str, value: String) -> Result<()> {
        match name {
            "primary_name" => self.fields.primary_name = value,
            "english_name" => self.fields.english_name = value,
            "scientific_name" => self.fields.scientific_name = value,
            "order_name" => self.fields.order_name = value,
            "family" => self.fields.family = value,
            "weight" => self.fields.weight = parse_measurement(name, &value)?,
            "length" => self.fields.length = parse_measurement(name, &value)?,
            "status_id" => self.fields.status_id = parse_optional(name, &value)?,
            "photographer" => {
                let trimmed = value.trim();
                self.photographer = (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            _ => {}
        }
        Ok(())
    }

    /// The photo row for a stored upload, credited to the submitted photographer.
    pub fn photo(&self, filename: String) -> Photo {
        Photo::new(filename, self.photographer.clone())
    }
}

/// Query string of `GET /birds/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub bird_identifier: Option<String>,
}

fn parse_optional<T>(name: &str, value: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|err| AppError::BadRequest(format!("{name}: {err}")))
}

fn parse_measurement(name: &str, value: &str) -> Result<Option<f64>> {
    match parse_optional::<f64>(name, value)? {
        Some(n) if !n.is_finite() => {
            Err(AppError::BadRequest(format!("{name}: not a finite number")))
        }
        parsed => Ok(parsed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_numbers_are_absent() {
        let mut form = BirdForm::default();
        form.set("weight", "  ".into()).unwrap();
        form.set("status_id", "".into()).unwrap();

        assert_eq!(form.fields.weight, None);
        assert_eq!(form.fields.status_id, None);
    }

    #[test]
    fn numbers_are_parsed() {
        let mut form = BirdForm::default();
        form.set("weight", "2800".into()).unwrap();
        form.set("length", " 40.5 ".into()).unwrap();
        form.set("status_id", "3".into()).unwrap();

        assert_eq!(form.fields.weight, Some(2800.0));
        assert_eq!(form.fields.length, Some(40.5));
        assert_eq!(form.fields.status_id, Some(3));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let mut form = BirdForm::default();

        assert!(matches!(
            form.set("weight", "heavy".into()),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            form.set("length", "NaN".into()),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            form.set("status_id", "3.5".into()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn text_fields_are_kept_verbatim() {
        let mut form = BirdForm::default();
        form.set("primary_name", " Kiwi ".into()).unwrap();
        form.set("unknown", "ignored".into()).unwrap();

        assert_eq!(form.fields.primary_name, " Kiwi ");
    }

    #[test]
    fn blank_photographer_is_absent() {
        let mut form = BirdForm::default();
        form.set("photographer", "   ".into()).unwrap();
        assert_eq!(form.photo("1.jpg".into()).photographer, None);

        form.set("photographer", "Ann".into()).unwrap();
        assert_eq!(form.photo("1.jpg".into()).photographer.as_deref(), Some("Ann"));
    }
}
