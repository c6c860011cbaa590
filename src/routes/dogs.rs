use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    config::DEFAULT_PEDIGREE_GENERATIONS,
    dogs::{
        pedigree::{self, PedigreeNode},
        repository::{self, CreateDogRequest, DogFilters, DogPatch, DogSort},
        DogRecord,
    },
    error::{AppError, AppResult},
    models::{BreedSummary, DogSex},
    routes::to_iso,
    state::AppState,
    utils::pagination::{PageRequest, Paginated},
    utils::query::ApiQuery,
};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Serialize)]
pub struct DogResponse {
    pub id: Uuid,
    pub name: String,
    pub call_name: Option<String>,
    pub sex: DogSex,
    pub date_of_birth: NaiveDate,
    pub color: Option<String>,
    pub breed: BreedSummary,
    pub owner_id: Uuid,
    pub registration_number: Option<String>,
    pub microchip_number: Option<String>,
    pub sire_id: Option<Uuid>,
    pub dam_id: Option<Uuid>,
    pub health_tests: Option<String>,
    pub titles: Option<String>,
    pub description: Option<String>,
    pub is_available_for_breeding: Option<bool>,
    pub photo_url: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<DogRecord> for DogResponse {
    fn from(DogRecord { dog, breed }: DogRecord) -> Self {
        Self {
            id: dog.id,
            name: dog.name,
            call_name: dog.call_name,
            sex: dog.sex,
            date_of_birth: dog.date_of_birth,
            color: dog.color,
            breed,
            owner_id: dog.owner_id,
            registration_number: dog.registration_number,
            microchip_number: dog.microchip_number,
            sire_id: dog.sire_id,
            dam_id: dog.dam_id,
            health_tests: dog.health_tests,
            titles: dog.titles,
            description: dog.description,
            is_available_for_breeding: dog.is_available_for_breeding,
            photo_url: dog.photo_url,
            is_active: dog.is_active,
            created_at: to_iso(dog.created_at),
        }
    }
}

#[derive(Deserialize)]
pub struct DogListQuery {
    pub breed_id: Option<i32>,
    pub sex: Option<DogSex>,
    pub is_available_for_breeding: Option<bool>,
    pub owner_id: Option<Uuid>,
    pub name: Option<String>,
    pub sort_by: Option<DogSort>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct PedigreeQuery {
    pub generations: Option<i32>,
}

pub async fn list_dogs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<DogListQuery>,
) -> AppResult<Json<Paginated<DogResponse>>> {
    let page =
        PageRequest::from_query(params.page, params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;
    let filters = DogFilters {
        breed_id: params.breed_id,
        sex: params.sex,
        is_available_for_breeding: params.is_available_for_breeding,
        owner_id: params.owner_id,
        name: params.name,
        sort: params.sort_by.unwrap_or_default(),
    };

    let mut conn = state.db()?;
    let listing = repository::list_dogs(&mut conn, &filters, page)?;
    Ok(Json(listing.map(DogResponse::from)))
}

pub async fn create_dog(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateDogRequest>,
) -> AppResult<(StatusCode, Json<DogResponse>)> {
    let mut conn = state.db()?;
    let record = repository::create_dog(&mut conn, user.user_id, payload).map_err(|err| {
        tracing::warn!(owner_id = %user.user_id, error = %err, "dog creation rejected");
        AppError::from(err)
    })?;
    Ok((StatusCode::CREATED, Json(DogResponse::from(record))))
}

pub async fn get_dog(
    State(state): State<AppState>,
    Path(dog_id): Path<Uuid>,
) -> AppResult<Json<DogResponse>> {
    let mut conn = state.db()?;
    let record = repository::get_active(&mut conn, dog_id)?;
    Ok(Json(DogResponse::from(record)))
}

pub async fn update_dog(
    State(state): State<AppState>,
    Path(dog_id): Path<Uuid>,
    user: AuthenticatedUser,
    Json(patch): Json<DogPatch>,
) -> AppResult<Json<DogResponse>> {
    let mut conn = state.db()?;
    let record = repository::update_dog(&mut conn, dog_id, user.user_id, patch)?;
    Ok(Json(DogResponse::from(record)))
}

pub async fn delete_dog(
    State(state): State<AppState>,
    Path(dog_id): Path<Uuid>,
    user: AuthenticatedUser,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    repository::soft_delete(&mut conn, dog_id, user.user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_pedigree(
    State(state): State<AppState>,
    Path(dog_id): Path<Uuid>,
    ApiQuery(params): ApiQuery<PedigreeQuery>,
) -> AppResult<Json<PedigreeNode>> {
    let max = state.config.max_pedigree_generations;
    let generations = params.generations.unwrap_or(DEFAULT_PEDIGREE_GENERATIONS.min(max));
    if !(1..=max).contains(&generations) {
        return Err(AppError::bad_request(format!(
            "generations must be between 1 and {max}"
        )));
    }

    let mut conn = state.db()?;
    let tree = pedigree::resolve(&mut *conn, dog_id, generations)?
        .ok_or_else(AppError::not_found)?;
    tracing::debug!(
        %dog_id,
        generations,
        depth = tree.depth(),
        nodes = tree.node_count(),
        "pedigree resolved"
    );
    Ok(Json(tree))
}
