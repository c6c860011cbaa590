//! Ancestor trees.
//!
//! Every call fetches its dog afresh and allocates a new node, so a dog that
//! is both a paternal and a maternal ancestor shows up twice. The generation
//! count is the only bound on recursion: the store does not keep the sire/dam
//! graph acyclic, and a loop inside the cap is simply walked until the cap
//! runs out.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::{DogLookup, DogRecord, DogResult, ParentRole};
use crate::models::{BreedSummary, DogSex};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PedigreeNode {
    pub id: Uuid,
    pub name: String,
    pub sex: DogSex,
    pub date_of_birth: NaiveDate,
    pub breed: BreedSummary,
    pub registration_number: Option<String>,
    pub photo_url: Option<String>,
    pub sire: Option<Box<PedigreeNode>>,
    pub dam: Option<Box<PedigreeNode>>,
}

impl PedigreeNode {
    /// Number of generations present, counting this node as the first.
    pub fn depth(&self) -> usize {
        let sire = self.sire.as_ref().map_or(0, |node| node.depth());
        let dam = self.dam.as_ref().map_or(0, |node| node.depth());
        1 + sire.max(dam)
    }

    pub fn node_count(&self) -> usize {
        1 + self.sire.as_ref().map_or(0, |node| node.node_count())
            + self.dam.as_ref().map_or(0, |node| node.node_count())
    }
}

/// Builds the tree rooted at `dog_id`, at most `generations` levels deep.
///
/// Returns `None` when `generations <= 0` or when the root does not exist.
/// Soft-deleted dogs are included. A parent reference that points nowhere
/// becomes an absent branch instead of an error; only storage failures
/// propagate.
pub fn resolve<L>(lookup: &mut L, dog_id: Uuid, generations: i32) -> DogResult<Option<PedigreeNode>>
where
    L: DogLookup + ?Sized,
{
    if generations <= 0 {
        return Ok(None);
    }

    let Some(DogRecord { dog, breed }) = lookup.find_dog(dog_id)? else {
        return Ok(None);
    };

    let remaining = generations - 1;
    let sire = resolve_parent(lookup, dog.id, ParentRole::Sire, dog.sire_id, remaining)?;
    let dam = resolve_parent(lookup, dog.id, ParentRole::Dam, dog.dam_id, remaining)?;

    Ok(Some(PedigreeNode {
        id: dog.id,
        name: dog.name,
        sex: dog.sex,
        date_of_birth: dog.date_of_birth,
        breed,
        registration_number: dog.registration_number,
        photo_url: dog.photo_url,
        sire,
        dam,
    }))
}

fn resolve_parent<L>(
    lookup: &mut L,
    child_id: Uuid,
    role: ParentRole,
    parent_id: Option<Uuid>,
    remaining: i32,
) -> DogResult<Option<Box<PedigreeNode>>>
where
    L: DogLookup + ?Sized,
{
    let Some(parent_id) = parent_id else {
        return Ok(None);
    };
    if remaining <= 0 {
        return Ok(None);
    }

    let node = resolve(lookup, parent_id, remaining)?;
    if node.is_none() {
        debug!(dog_id = %child_id, %parent_id, %role, "dangling parent reference; lineage unknown");
    }
    Ok(node.map(Box::new))
}
