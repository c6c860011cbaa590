use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use super::DogResult;
use crate::models::{BreedSummary, Dog};
use crate::schema::{breeds, dogs};

/// A dog row joined with the breed summary it is always shown with.
#[derive(Debug, Clone, PartialEq)]
pub struct DogRecord {
    pub dog: Dog,
    pub breed: BreedSummary,
}

/// Key-based access to dogs and breeds.
///
/// `find_dog` ignores the active flag: soft-deleted dogs stay reachable as
/// ancestors and as named parents.
pub trait DogLookup {
    fn find_dog(&mut self, dog_id: Uuid) -> DogResult<Option<DogRecord>>;

    fn breed_exists(&mut self, breed_id: i32) -> DogResult<bool>;
}

impl DogLookup for PgConnection {
    fn find_dog(&mut self, dog_id: Uuid) -> DogResult<Option<DogRecord>> {
        let row = dogs::table
            .inner_join(breeds::table)
            .filter(dogs::id.eq(dog_id))
            .select((Dog::as_select(), BreedSummary::as_select()))
            .first::<(Dog, BreedSummary)>(self)
            .optional()?;

        Ok(row.map(|(dog, breed)| DogRecord { dog, breed }))
    }

    fn breed_exists(&mut self, breed_id: i32) -> DogResult<bool> {
        let found = diesel::select(exists(breeds::table.find(breed_id))).get_result(self)?;
        Ok(found)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;

    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::{DogLookup, DogRecord};
    use crate::dogs::DogResult;
    use crate::models::{BreedSummary, Dog, DogSex};

    pub const BORDER_COLLIE: i32 = 1;

    /// Hash-map backed store that counts lookups.
    #[derive(Default)]
    pub struct MemoryLookup {
        dogs: HashMap<Uuid, Dog>,
        breeds: HashMap<i32, BreedSummary>,
        pub fetches: usize,
    }

    impl MemoryLookup {
        pub fn new() -> Self {
            let mut lookup = Self::default();
            lookup.breeds.insert(
                BORDER_COLLIE,
                BreedSummary {
                    id: BORDER_COLLIE,
                    name_pl: "Border Collie".to_string(),
                    name_en: Some("Border Collie".to_string()),
                    fci_group: Some(1),
                },
            );
            lookup
        }

        pub fn add_dog(&mut self, name: &str, sex: DogSex) -> Uuid {
            let id = Uuid::new_v4();
            let now = Utc::now().naive_utc();
            self.dogs.insert(
                id,
                Dog {
                    id,
                    owner_id: Uuid::nil(),
                    breed_id: BORDER_COLLIE,
                    name: name.to_string(),
                    call_name: None,
                    sex,
                    date_of_birth: NaiveDate::from_ymd_opt(2020, 5, 17).expect("valid date"),
                    color: None,
                    registration_number: None,
                    microchip_number: None,
                    sire_id: None,
                    dam_id: None,
                    health_tests: None,
                    titles: None,
                    description: None,
                    is_available_for_breeding: None,
                    photo_url: None,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                },
            );
            id
        }

        pub fn set_parents(&mut self, dog_id: Uuid, sire_id: Option<Uuid>, dam_id: Option<Uuid>) {
            let dog = self.dogs.get_mut(&dog_id).expect("dog exists");
            dog.sire_id = sire_id;
            dog.dam_id = dam_id;
        }

        pub fn deactivate(&mut self, dog_id: Uuid) {
            self.dogs.get_mut(&dog_id).expect("dog exists").is_active = false;
        }
    }

    impl DogLookup for MemoryLookup {
        fn find_dog(&mut self, dog_id: Uuid) -> DogResult<Option<DogRecord>> {
            self.fetches += 1;
            Ok(self.dogs.get(&dog_id).map(|dog| DogRecord {
                dog: dog.clone(),
                breed: self.breeds[&dog.breed_id].clone(),
            }))
        }

        fn breed_exists(&mut self, breed_id: i32) -> DogResult<bool> {
            Ok(self.breeds.contains_key(&breed_id))
        }
    }
}
