use axum::{
    extract::{Path, State},
    Json,
};
use diesel::{dsl::count_star, pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{Breed, SizeCategory},
    schema::breeds,
    state::AppState,
    utils::escape_like,
    utils::pagination::{PageRequest, Paginated},
    utils::query::ApiQuery,
};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Serialize)]
pub struct BreedResponse {
    pub id: i32,
    pub name_pl: String,
    pub name_en: Option<String>,
    pub fci_number: Option<i32>,
    pub fci_group: Option<i32>,
    pub fci_section: Option<i32>,
    pub size_category: Option<SizeCategory>,
    pub description_pl: Option<String>,
    pub image_url: Option<String>,
}

impl From<Breed> for BreedResponse {
    fn from(breed: Breed) -> Self {
        Self {
            id: breed.id,
            name_pl: breed.name_pl,
            name_en: breed.name_en,
            fci_number: breed.fci_number,
            fci_group: breed.fci_group,
            fci_section: breed.fci_section,
            size_category: breed.size_category,
            description_pl: breed.description_pl,
            image_url: breed.image_url,
        }
    }
}

#[derive(Serialize)]
pub struct FciGroupResponse {
    pub fci_group: i32,
    pub breed_count: i64,
}

#[derive(Deserialize)]
pub struct BreedListQuery {
    pub q: Option<String>,
    pub fci_group: Option<i32>,
    pub size_category: Option<SizeCategory>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_breeds(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<BreedListQuery>,
) -> AppResult<Json<Paginated<BreedResponse>>> {
    let page =
        PageRequest::from_query(params.page, params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;
    let mut conn = state.db()?;

    let total: i64 = filtered_breeds(&params).count().get_result(&mut conn)?;
    let rows: Vec<Breed> = filtered_breeds(&params)
        .order((breeds::name_pl.asc(), breeds::id.asc()))
        .limit(page.limit)
        .offset(page.offset())
        .select(Breed::as_select())
        .load(&mut conn)?;

    let items = rows.into_iter().map(BreedResponse::from).collect();
    Ok(Json(Paginated::new(items, total, page)))
}

/// FCI groups that have at least one breed, with their breed counts.
pub async fn list_groups(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<FciGroupResponse>>> {
    let mut conn = state.db()?;

    let rows: Vec<(Option<i32>, i64)> = breeds::table
        .filter(breeds::fci_group.is_not_null())
        .group_by(breeds::fci_group)
        .select((breeds::fci_group, count_star()))
        .order(breeds::fci_group.asc())
        .load(&mut conn)?;

    let groups = rows
        .into_iter()
        .filter_map(|(group, breed_count)| {
            group.map(|fci_group| FciGroupResponse {
                fci_group,
                breed_count,
            })
        })
        .collect();

    Ok(Json(groups))
}

pub async fn get_breed(
    State(state): State<AppState>,
    Path(breed_id): Path<i32>,
) -> AppResult<Json<BreedResponse>> {
    let mut conn = state.db()?;
    let breed: Breed = breeds::table
        .find(breed_id)
        .select(Breed::as_select())
        .first(&mut conn)
        .optional()?
        .ok_or_else(AppError::not_found)?;
    Ok(Json(BreedResponse::from(breed)))
}

fn filtered_breeds(params: &BreedListQuery) -> breeds::BoxedQuery<'static, Pg> {
    let mut query = breeds::table.into_boxed();

    if let Some(term) = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
    {
        let pattern = format!("%{}%", escape_like(term));
        query = query.filter(
            breeds::name_pl
                .ilike(pattern.clone())
                .or(breeds::name_en.ilike(pattern)),
        );
    }
    if let Some(group) = params.fci_group {
        query = query.filter(breeds::fci_group.eq(group));
    }
    if let Some(size) = params.size_category {
        query = query.filter(breeds::size_category.eq(size));
    }

    query
}
