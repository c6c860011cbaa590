use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{validation, AuthenticatedUser},
    dogs::repository,
    error::{AppError, AppResult},
    models::User,
    routes::{dogs::DogResponse, to_iso},
    schema::users,
    state::AppState,
    utils::escape_like,
    utils::json::Patch,
    utils::pagination::{PageRequest, Paginated},
    utils::query::ApiQuery,
};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

pub(crate) const NAME_MAX: usize = 100;
const PHONE_MAX: usize = 20;
const CITY_MAX: usize = 100;
const VOIVODESHIP_MAX: usize = 50;
const KENNEL_NAME_MAX: usize = 200;
const AVATAR_URL_MAX: usize = 500;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub voivodeship: Option<String>,
    pub bio: Option<String>,
    pub kennel_name: Option<String>,
    pub is_breeder: bool,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            city: user.city,
            voivodeship: user.voivodeship,
            bio: user.bio,
            kennel_name: user.kennel_name,
            is_breeder: user.is_breeder,
            avatar_url: user.avatar_url,
            is_active: user.is_active,
            created_at: to_iso(user.created_at),
        }
    }
}

#[derive(Deserialize)]
pub struct UserListQuery {
    pub q: Option<String>,
    pub is_breeder: Option<bool>,
    pub city: Option<String>,
    pub voivodeship: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: Patch<String>,
    #[serde(default)]
    pub last_name: Patch<String>,
    #[serde(default)]
    pub phone: Patch<String>,
    #[serde(default)]
    pub city: Patch<String>,
    #[serde(default)]
    pub voivodeship: Patch<String>,
    #[serde(default)]
    pub bio: Patch<String>,
    #[serde(default)]
    pub kennel_name: Patch<String>,
    #[serde(default)]
    pub is_breeder: Patch<bool>,
    #[serde(default)]
    pub avatar_url: Patch<String>,
}

#[derive(AsChangeset, Debug, Default, PartialEq)]
#[diesel(table_name = users)]
struct UserChangeset {
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<Option<String>>,
    city: Option<Option<String>>,
    voivodeship: Option<Option<String>>,
    bio: Option<Option<String>>,
    kennel_name: Option<Option<String>>,
    is_breeder: Option<bool>,
    avatar_url: Option<Option<String>>,
    updated_at: Option<NaiveDateTime>,
}

impl UpdateProfileRequest {
    fn into_changeset(self) -> Result<UserChangeset, String> {
        let first_name = match self.first_name.into_required("first_name")? {
            Some(value) => Some(validation::bounded_text("first_name", &value, NAME_MAX)?),
            None => None,
        };
        let last_name = match self.last_name.into_required("last_name")? {
            Some(value) => Some(validation::bounded_text("last_name", &value, NAME_MAX)?),
            None => None,
        };

        let changeset = UserChangeset {
            first_name,
            last_name,
            phone: self.phone.trimmed().into_nullable(),
            city: self.city.trimmed().into_nullable(),
            voivodeship: self.voivodeship.trimmed().into_nullable(),
            bio: self.bio.trimmed().into_nullable(),
            kennel_name: self.kennel_name.trimmed().into_nullable(),
            is_breeder: self.is_breeder.into_required("is_breeder")?,
            avatar_url: self.avatar_url.trimmed().into_nullable(),
            updated_at: None,
        };

        validation::optional_lengths(&[
            ("phone", patched(&changeset.phone), PHONE_MAX),
            ("city", patched(&changeset.city), CITY_MAX),
            ("voivodeship", patched(&changeset.voivodeship), VOIVODESHIP_MAX),
            ("kennel_name", patched(&changeset.kennel_name), KENNEL_NAME_MAX),
            ("avatar_url", patched(&changeset.avatar_url), AVATAR_URL_MAX),
        ])?;
        Ok(changeset)
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserListQuery>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let page =
        PageRequest::from_query(params.page, params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;
    let mut conn = state.db()?;

    let total: i64 = filtered_users(&params).count().get_result(&mut conn)?;
    let rows: Vec<User> = filtered_users(&params)
        .order((
            users::last_name.asc(),
            users::first_name.asc(),
            users::id.asc(),
        ))
        .limit(page.limit)
        .offset(page.offset())
        .select(User::as_select())
        .load(&mut conn)?;

    let items = rows.into_iter().map(UserResponse::from).collect();
    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let mut conn = state.db()?;
    let user = find_active_user(&mut conn, user_id)?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn update_me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let mut changeset = payload.into_changeset().map_err(AppError::bad_request)?;
    let mut conn = state.db()?;

    if changeset != UserChangeset::default() {
        changeset.updated_at = Some(Utc::now().naive_utc());
        diesel::update(users::table.find(user.user_id))
            .set(&changeset)
            .execute(&mut conn)?;
        tracing::info!(user_id = %user.user_id, "profile updated");
    }

    let profile = find_active_user(&mut conn, user.user_id)?;
    Ok(Json(UserResponse::from(profile)))
}

pub async fn list_user_dogs(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<DogResponse>>> {
    let mut conn = state.db()?;
    find_active_user(&mut conn, user_id)?;

    let records = repository::list_owner_dogs(&mut conn, user_id)?;
    Ok(Json(records.into_iter().map(DogResponse::from).collect()))
}

fn filtered_users(params: &UserListQuery) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table
        .filter(users::is_active.eq(true))
        .into_boxed();

    if let Some(term) = non_blank(params.q.as_deref()) {
        let pattern = format!("%{}%", escape_like(term));
        query = query.filter(
            users::first_name
                .ilike(pattern.clone())
                .or(users::last_name.ilike(pattern.clone()))
                .or(users::kennel_name.ilike(pattern)),
        );
    }
    if let Some(is_breeder) = params.is_breeder {
        query = query.filter(users::is_breeder.eq(is_breeder));
    }
    if let Some(city) = non_blank(params.city.as_deref()) {
        query = query.filter(users::city.ilike(format!("%{}%", escape_like(city))));
    }
    if let Some(voivodeship) = non_blank(params.voivodeship.as_deref()) {
        query = query.filter(users::voivodeship.eq(voivodeship.to_string()));
    }
    query
}

fn find_active_user(conn: &mut PgConnection, user_id: Uuid) -> AppResult<User> {
    users::table
        .find(user_id)
        .filter(users::is_active.eq(true))
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(AppError::not_found)
}

fn patched(value: &Option<Option<String>>) -> Option<&str> {
    value.as_ref().and_then(|inner| inner.as_deref())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
