//! Pet models.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::temporal;

/// A pet registered by an owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    /// Local UUID
    pub id: String,
    /// Owning account - every read and write is scoped to it
    pub owner_id: String,
    /// Pet name
    pub name: String,
    /// Species (e.g., "dog", "cat")
    pub species: String,
    /// Breed, if known
    pub breed: Option<String>,
    /// Birth date (`YYYY-MM-DD`)
    pub birth_date: Option<String>,
    /// Weight in kg
    pub weight_kg: Option<f64>,
    /// Spayed/neutered
    pub sterilized: bool,
    /// Public URL of the uploaded photo
    pub photo_url: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Pet {
    /// Create a new pet with required fields.
    pub fn new(owner_id: String, name: String, species: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id,
            name,
            species,
            breed: None,
            birth_date: None,
            weight_kg: None,
            sterilized: false,
            photo_url: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whole years since birth as of `today`.
    ///
    /// `None` when the birth date is missing or unreadable. A birth date in
    /// the future counts as zero.
    pub fn age_years(&self, today: NaiveDate) -> Option<u32> {
        let born = temporal::parse_flexible_date(self.birth_date.as_deref()?)?.date_naive();
        let mut years = today.year() - born.year();
        if (today.month(), today.day()) < (born.month(), born.day()) {
            years -= 1;
        }
        u32::try_from(years.max(0)).ok()
    }

    /// Breed for display; unknown breeds read as mixed.
    pub fn breed_label(&self) -> &str {
        match self.breed.as_deref().map(str::trim) {
            Some(breed) if !breed.is_empty() => breed,
            _ => "Mixed breed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_pet() {
        let pet = Pet::new("owner-1".into(), "Rex".into(), "dog".into());
        assert_eq!(pet.name, "Rex");
        assert_eq!(pet.owner_id, "owner-1");
        assert!(!pet.sterilized);
        assert_eq!(pet.id.len(), 36); // UUID format
    }

    #[test]
    fn test_age_years() {
        let mut pet = Pet::new("owner-1".into(), "Rex".into(), "dog".into());
        assert_eq!(pet.age_years(date(2024, 6, 1)), None);

        pet.birth_date = Some("2020-06-02".into());
        assert_eq!(pet.age_years(date(2024, 6, 1)), Some(3));
        assert_eq!(pet.age_years(date(2024, 6, 2)), Some(4));

        pet.birth_date = Some("2030-01-01".into());
        assert_eq!(pet.age_years(date(2024, 6, 1)), Some(0));

        pet.birth_date = Some("someday".into());
        assert_eq!(pet.age_years(date(2024, 6, 1)), None);
    }

    #[test]
    fn test_breed_label() {
        let mut pet = Pet::new("owner-1".into(), "Mia".into(), "cat".into());
        assert_eq!(pet.breed_label(), "Mixed breed");
        pet.breed = Some("Siamese".into());
        assert_eq!(pet.breed_label(), "Siamese");
    }
}
