use uuid::Uuid;

use super::{DogError, DogLookup, DogResult, ParentRole};

/// Checks the references a new dog is about to be written with.
///
/// The breed is checked first, then the sire, then the dam; the first
/// failure wins. Nothing is written here.
pub fn validate_parentage<L>(
    lookup: &mut L,
    breed_id: i32,
    sire_id: Option<Uuid>,
    dam_id: Option<Uuid>,
) -> DogResult<()>
where
    L: DogLookup + ?Sized,
{
    if !lookup.breed_exists(breed_id)? {
        return Err(DogError::UnknownBreed);
    }

    if let Some(sire_id) = sire_id {
        validate_parent(lookup, ParentRole::Sire, sire_id)?;
    }

    if let Some(dam_id) = dam_id {
        validate_parent(lookup, ParentRole::Dam, dam_id)?;
    }

    Ok(())
}

/// The parent must exist (active or not) and have the sex its role demands.
pub fn validate_parent<L>(lookup: &mut L, role: ParentRole, parent_id: Uuid) -> DogResult<()>
where
    L: DogLookup + ?Sized,
{
    match lookup.find_dog(parent_id)? {
        Some(parent) if parent.dog.sex == role.required_sex() => Ok(()),
        _ => Err(DogError::InvalidParent { role }),
    }
}
