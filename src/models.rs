use std::fmt;
use std::io::Write;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum DogSex {
    Male,
    Female,
}

impl DogSex {
    pub const fn as_str(self) -> &'static str {
        match self {
            DogSex::Male => "male",
            DogSex::Female => "female",
        }
    }
}

impl fmt::Display for DogSex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DogSex {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "male" => Ok(DogSex::Male),
            "female" => Ok(DogSex::Female),
            other => Err(ParseEnumError {
                kind: "sex",
                value: other.to_string(),
            }),
        }
    }
}

impl ToSql<Text, Pg> for DogSex {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for DogSex {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        Ok(raw.parse()?)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum SizeCategory {
    Mini,
    Small,
    Medium,
    Large,
    Giant,
}

impl SizeCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            SizeCategory::Mini => "mini",
            SizeCategory::Small => "small",
            SizeCategory::Medium => "medium",
            SizeCategory::Large => "large",
            SizeCategory::Giant => "giant",
        }
    }
}

impl FromStr for SizeCategory {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mini" => Ok(SizeCategory::Mini),
            "small" => Ok(SizeCategory::Small),
            "medium" => Ok(SizeCategory::Medium),
            "large" => Ok(SizeCategory::Large),
            "giant" => Ok(SizeCategory::Giant),
            other => Err(ParseEnumError {
                kind: "size category",
                value: other.to_string(),
            }),
        }
    }
}

impl ToSql<Text, Pg> for SizeCategory {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for SizeCategory {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        Ok(raw.parse()?)
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(Pg))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
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
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = breeds)]
#[diesel(check_for_backend(Pg))]
pub struct Breed {
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

#[derive(Debug, Insertable)]
#[diesel(table_name = breeds)]
pub struct NewBreed {
    pub name_pl: String,
    pub name_en: Option<String>,
    pub fci_number: Option<i32>,
    pub fci_group: Option<i32>,
    pub fci_section: Option<i32>,
    pub size_category: Option<SizeCategory>,
}

/// The slice of a breed that travels with every dog.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize)]
#[diesel(table_name = breeds)]
#[diesel(check_for_backend(Pg))]
pub struct BreedSummary {
    pub id: i32,
    pub name_pl: String,
    pub name_en: Option<String>,
    pub fci_group: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = dogs)]
#[diesel(belongs_to(Breed))]
#[diesel(belongs_to(User, foreign_key = owner_id))]
#[diesel(check_for_backend(Pg))]
pub struct Dog {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub breed_id: i32,
    pub name: String,
    pub call_name: Option<String>,
    pub sex: DogSex,
    pub date_of_birth: NaiveDate,
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
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = dogs)]
pub struct NewDog {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub breed_id: i32,
    pub name: String,
    pub call_name: Option<String>,
    pub sex: DogSex,
    pub date_of_birth: NaiveDate,
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

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = refresh_tokens)]
#[diesel(belongs_to(User))]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub revoked_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}
