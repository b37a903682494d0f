//! Pet database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::Pet;

const PET_COLUMNS: &str = "id, owner_id, name, species, breed, birth_date, weight_kg, \
                           sterilized, photo_url, created_at, updated_at";

fn pet_from_row(row: &Row<'_>) -> rusqlite::Result<Pet> {
    Ok(Pet {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        species: row.get(3)?,
        breed: row.get(4)?,
        birth_date: row.get(5)?,
        weight_kg: row.get(6)?,
        sterilized: row.get(7)?,
        photo_url: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl Database {
    /// Insert a new pet for its owner.
    pub fn insert_pet(&self, pet: &Pet) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO pets (
                id, owner_id, name, species, breed, birth_date, weight_kg,
                sterilized, photo_url, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                pet.id,
                pet.owner_id,
                pet.name,
                pet.species,
                pet.breed,
                pet.birth_date,
                pet.weight_kg,
                pet.sterilized,
                pet.photo_url,
                pet.created_at,
                pet.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing pet. Returns false when the owner has no such pet.
    pub fn update_pet(&self, owner_id: &str, pet: &Pet) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE pets SET
                name = ?3,
                species = ?4,
                breed = ?5,
                birth_date = ?6,
                weight_kg = ?7,
                sterilized = ?8,
                photo_url = ?9,
                updated_at = datetime('now')
            WHERE id = ?1 AND owner_id = ?2
            "#,
            params![
                pet.id,
                owner_id,
                pet.name,
                pet.species,
                pet.breed,
                pet.birth_date,
                pet.weight_kg,
                pet.sterilized,
                pet.photo_url,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get one of the owner's pets.
    pub fn get_pet(&self, owner_id: &str, pet_id: &str) -> DbResult<Option<Pet>> {
        self.conn
            .query_row(
                &format!("SELECT {PET_COLUMNS} FROM pets WHERE id = ?1 AND owner_id = ?2"),
                [pet_id, owner_id],
                pet_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List the owner's pets, newest first.
    pub fn list_pets(&self, owner_id: &str) -> DbResult<Vec<Pet>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PET_COLUMNS} FROM pets WHERE owner_id = ? ORDER BY created_at DESC, name"
        ))?;

        let rows = stmt.query_map([owner_id], pet_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a pet along with its courses and events.
    pub fn delete_pet(&self, owner_id: &str, pet_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "DELETE FROM pets WHERE id = ? AND owner_id = ?",
            [pet_id, owner_id],
        )?;
        Ok(rows_affected > 0)
    }
}
