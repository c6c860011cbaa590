use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::parentage::{validate_parent, validate_parentage};
use super::{DogError, DogLookup, DogRecord, DogResult, ParentRole};
use crate::auth::validation::{bounded_text, optional_lengths};
use crate::models::{BreedSummary, Dog, DogSex, NewDog};
use crate::schema::{breeds, dogs};
use crate::utils::escape_like;
use crate::utils::json::Patch;
use crate::utils::pagination::{PageRequest, Paginated};

const DUPLICATE_NUMBER: &str = "registration or microchip number is already registered";

// Column widths from the dogs migration.
const NAME_MAX: usize = 200;
const CALL_NAME_MAX: usize = 100;
const COLOR_MAX: usize = 100;
const REGISTRATION_NUMBER_MAX: usize = 100;
const MICROCHIP_NUMBER_MAX: usize = 50;
const TITLES_MAX: usize = 500;
const PHOTO_URL_MAX: usize = 500;

#[derive(Debug, Deserialize)]
pub struct CreateDogRequest {
    pub name: String,
    pub call_name: Option<String>,
    pub sex: DogSex,
    pub date_of_birth: NaiveDate,
    pub breed_id: i32,
    pub color: Option<String>,
    pub registration_number: Option<String>,
    pub microchip_number: Option<String>,
    pub sire_id: Option<Uuid>,
    pub dam_id: Option<Uuid>,
    pub health_tests: Option<String>,
    pub titles: Option<String>,
    pub description: Option<String>,
    pub is_available_for_breeding: Option<bool>,
    pub photo_url: Option<String>,
}

/// Sparse update: only fields present in the payload are written.
#[derive(Debug, Default, Deserialize)]
pub struct DogPatch {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub call_name: Patch<String>,
    #[serde(default)]
    pub color: Patch<String>,
    #[serde(default)]
    pub registration_number: Patch<String>,
    #[serde(default)]
    pub microchip_number: Patch<String>,
    #[serde(default)]
    pub sire_id: Patch<Uuid>,
    #[serde(default)]
    pub dam_id: Patch<Uuid>,
    #[serde(default)]
    pub health_tests: Patch<String>,
    #[serde(default)]
    pub titles: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub is_available_for_breeding: Patch<bool>,
    #[serde(default)]
    pub photo_url: Patch<String>,
}

#[derive(AsChangeset, Debug, Default, PartialEq)]
#[diesel(table_name = dogs)]
pub struct DogChangeset {
    pub name: Option<String>,
    pub call_name: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub registration_number: Option<Option<String>>,
    pub microchip_number: Option<Option<String>>,
    pub sire_id: Option<Option<Uuid>>,
    pub dam_id: Option<Option<Uuid>>,
    pub health_tests: Option<Option<String>>,
    pub titles: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub is_available_for_breeding: Option<Option<bool>>,
    pub photo_url: Option<Option<String>>,
    pub updated_at: Option<NaiveDateTime>,
}

impl DogChangeset {
    pub fn is_empty(&self) -> bool {
        *self == DogChangeset::default()
    }
}

impl DogPatch {
    /// Validates the supplied fields and turns them into a changeset.
    /// Text is trimmed and blank optional text clears the column.
    pub fn into_changeset(self) -> DogResult<DogChangeset> {
        let name = match self.name.into_required("name").map_err(DogError::Validation)? {
            Some(value) => {
                Some(bounded_text("name", &value, NAME_MAX).map_err(DogError::Validation)?)
            }
            None => None,
        };

        let changeset = DogChangeset {
            name,
            call_name: self.call_name.trimmed().into_nullable(),
            color: self.color.trimmed().into_nullable(),
            registration_number: self.registration_number.trimmed().into_nullable(),
            microchip_number: self.microchip_number.trimmed().into_nullable(),
            sire_id: self.sire_id.into_nullable(),
            dam_id: self.dam_id.into_nullable(),
            health_tests: self.health_tests.trimmed().into_nullable(),
            titles: self.titles.trimmed().into_nullable(),
            description: self.description.trimmed().into_nullable(),
            is_available_for_breeding: self.is_available_for_breeding.into_nullable(),
            photo_url: self.photo_url.trimmed().into_nullable(),
            updated_at: None,
        };

        check_lengths(
            patched(&changeset.call_name),
            patched(&changeset.color),
            patched(&changeset.registration_number),
            patched(&changeset.microchip_number),
            patched(&changeset.titles),
            patched(&changeset.photo_url),
        )?;
        Ok(changeset)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DogSort {
    #[default]
    Newest,
    Name,
}

#[derive(Debug, Clone, Default)]
pub struct DogFilters {
    pub breed_id: Option<i32>,
    pub sex: Option<DogSex>,
    pub is_available_for_breeding: Option<bool>,
    pub owner_id: Option<Uuid>,
    pub name: Option<String>,
    pub sort: DogSort,
}

pub fn create_dog(
    conn: &mut PgConnection,
    owner_id: Uuid,
    request: CreateDogRequest,
) -> DogResult<DogRecord> {
    let name = bounded_text("name", &request.name, NAME_MAX).map_err(DogError::Validation)?;

    let new_dog = NewDog {
        id: Uuid::new_v4(),
        owner_id,
        breed_id: request.breed_id,
        name,
        call_name: trim_optional(request.call_name),
        sex: request.sex,
        date_of_birth: request.date_of_birth,
        color: trim_optional(request.color),
        registration_number: trim_optional(request.registration_number),
        microchip_number: trim_optional(request.microchip_number),
        sire_id: request.sire_id,
        dam_id: request.dam_id,
        health_tests: trim_optional(request.health_tests),
        titles: trim_optional(request.titles),
        description: trim_optional(request.description),
        is_available_for_breeding: request.is_available_for_breeding,
        photo_url: trim_optional(request.photo_url),
    };
    check_lengths(
        new_dog.call_name.as_deref(),
        new_dog.color.as_deref(),
        new_dog.registration_number.as_deref(),
        new_dog.microchip_number.as_deref(),
        new_dog.titles.as_deref(),
        new_dog.photo_url.as_deref(),
    )?;

    let record = conn.transaction::<DogRecord, DogError, _>(|conn| {
        validate_parentage(conn, new_dog.breed_id, new_dog.sire_id, new_dog.dam_id)?;

        diesel::insert_into(dogs::table)
            .values(&new_dog)
            .execute(conn)
            .map_err(map_unique_violation)?;

        conn.find_dog(new_dog.id)?.ok_or(DogError::NotFound)
    })?;

    info!(dog_id = %record.dog.id, %owner_id, breed_id = record.breed.id, "dog created");
    Ok(record)
}

/// Public read path: soft-deleted dogs are reported as missing.
pub fn get_active(conn: &mut PgConnection, dog_id: Uuid) -> DogResult<DogRecord> {
    conn.find_dog(dog_id)?
        .filter(|record| record.dog.is_active)
        .ok_or(DogError::NotFound)
}

pub fn update_dog(
    conn: &mut PgConnection,
    dog_id: Uuid,
    requester_id: Uuid,
    patch: DogPatch,
) -> DogResult<DogRecord> {
    let record = conn.transaction::<DogRecord, DogError, _>(|conn| {
        let existing = owned_active_dog(conn, dog_id, requester_id)?;

        let mut changeset = patch.into_changeset()?;
        if let Some(Some(sire_id)) = changeset.sire_id {
            validate_parent(conn, ParentRole::Sire, sire_id)?;
        }
        if let Some(Some(dam_id)) = changeset.dam_id {
            validate_parent(conn, ParentRole::Dam, dam_id)?;
        }

        if changeset.is_empty() {
            return Ok(existing);
        }

        changeset.updated_at = Some(Utc::now().naive_utc());
        diesel::update(dogs::table.find(dog_id))
            .set(&changeset)
            .execute(conn)
            .map_err(map_unique_violation)?;

        conn.find_dog(dog_id)?.ok_or(DogError::NotFound)
    })?;

    info!(%dog_id, %requester_id, "dog updated");
    Ok(record)
}

/// Marks the dog inactive. Other dogs keep pointing at it as sire or dam.
pub fn soft_delete(conn: &mut PgConnection, dog_id: Uuid, requester_id: Uuid) -> DogResult<()> {
    conn.transaction::<(), DogError, _>(|conn| {
        owned_active_dog(conn, dog_id, requester_id)?;

        diesel::update(dogs::table.find(dog_id))
            .set((
                dogs::is_active.eq(false),
                dogs::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;
        Ok(())
    })?;

    info!(%dog_id, %requester_id, "dog soft-deleted");
    Ok(())
}

pub fn list_dogs(
    conn: &mut PgConnection,
    filters: &DogFilters,
    page: PageRequest,
) -> DogResult<Paginated<DogRecord>> {
    let total: i64 = active_dogs_matching(filters).count().get_result(conn)?;

    let query = active_dogs_matching(filters);
    let query = match filters.sort {
        DogSort::Newest => query.order((dogs::created_at.desc(), dogs::id.asc())),
        DogSort::Name => query.order((dogs::name.asc(), dogs::id.asc())),
    };
    let rows: Vec<Dog> = query
        .limit(page.limit)
        .offset(page.offset())
        .select(Dog::as_select())
        .load(conn)?;

    let items = attach_breeds(conn, rows)?;
    Ok(Paginated::new(items, total, page))
}

/// All active dogs of one owner, newest first.
pub fn list_owner_dogs(conn: &mut PgConnection, owner_id: Uuid) -> DogResult<Vec<DogRecord>> {
    let rows: Vec<Dog> = dogs::table
        .filter(dogs::owner_id.eq(owner_id))
        .filter(dogs::is_active.eq(true))
        .order((dogs::created_at.desc(), dogs::id.asc()))
        .select(Dog::as_select())
        .load(conn)?;

    attach_breeds(conn, rows)
}

fn owned_active_dog(
    conn: &mut PgConnection,
    dog_id: Uuid,
    requester_id: Uuid,
) -> DogResult<DogRecord> {
    let record = get_active(conn, dog_id)?;
    if record.dog.owner_id != requester_id {
        return Err(DogError::Forbidden);
    }
    Ok(record)
}

fn active_dogs_matching(filters: &DogFilters) -> dogs::BoxedQuery<'static, Pg> {
    let mut query = dogs::table.filter(dogs::is_active.eq(true)).into_boxed();

    if let Some(breed_id) = filters.breed_id {
        query = query.filter(dogs::breed_id.eq(breed_id));
    }
    if let Some(sex) = filters.sex {
        query = query.filter(dogs::sex.eq(sex));
    }
    if let Some(available) = filters.is_available_for_breeding {
        query = query.filter(dogs::is_available_for_breeding.eq(available));
    }
    if let Some(owner_id) = filters.owner_id {
        query = query.filter(dogs::owner_id.eq(owner_id));
    }
    if let Some(name) = filters
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        query = query.filter(dogs::name.ilike(format!("%{}%", escape_like(name))));
    }

    query
}

fn attach_breeds(conn: &mut PgConnection, rows: Vec<Dog>) -> DogResult<Vec<DogRecord>> {
    let mut breed_ids: Vec<i32> = rows.iter().map(|dog| dog.breed_id).collect();
    breed_ids.sort_unstable();
    breed_ids.dedup();

    let summaries: HashMap<i32, BreedSummary> = breeds::table
        .filter(breeds::id.eq_any(&breed_ids))
        .select(BreedSummary::as_select())
        .load::<BreedSummary>(conn)?
        .into_iter()
        .map(|breed| (breed.id, breed))
        .collect();

    rows.into_iter()
        .map(|dog| {
            let breed = summaries
                .get(&dog.breed_id)
                .cloned()
                .ok_or(DogError::Database(DieselError::NotFound))?;
            Ok(DogRecord { dog, breed })
        })
        .collect()
}

fn map_unique_violation(err: DieselError) -> DogError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DogError::Validation(DUPLICATE_NUMBER.to_string())
        }
        other => DogError::Database(other),
    }
}

fn check_lengths(
    call_name: Option<&str>,
    color: Option<&str>,
    registration_number: Option<&str>,
    microchip_number: Option<&str>,
    titles: Option<&str>,
    photo_url: Option<&str>,
) -> DogResult<()> {
    optional_lengths(&[
        ("call_name", call_name, CALL_NAME_MAX),
        ("color", color, COLOR_MAX),
        ("registration_number", registration_number, REGISTRATION_NUMBER_MAX),
        ("microchip_number", microchip_number, MICROCHIP_NUMBER_MAX),
        ("titles", titles, TITLES_MAX),
        ("photo_url", photo_url, PHOTO_URL_MAX),
    ])
    .map_err(DogError::Validation)
}

fn patched(value: &Option<Option<String>>) -> Option<&str> {
    value.as_ref().and_then(|inner| inner.as_deref())
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
