//! Common repository traits
//!
//! Generic interfaces for the single-row operations shared by the catalog,
//! user and order repositories. Aggregate specific queries live as inherent
//! methods on each repository.

/// Trait for creating new entities in the database
///
/// # Type Parameters
/// * `Entity` - Type of the returned entity (with ID assigned by the database)
/// * `CreateDTO` - Data for creation (without ID, generated by AUTO_INCREMENT)
pub trait Create<Entity, CreateDTO> {
    /// Inserts the row and returns it as stored
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Trait for reading a single entity by primary key
///
/// # Type Parameters
/// * `Entity` - Type of the entity to read
/// * `Id` - Type of the primary key (e.g. `i32`)
pub trait Read<Entity, Id> {
    /// # Returns
    /// * `Ok(Some(Entity))` - Entity found
    /// * `Ok(None)` - No entity with that ID
    /// * `Err(sqlx::Error)` - Error during reading
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Trait for updating existing entities
///
/// # Type Parameters
/// * `Entity` - Type of the updated entity
/// * `UpdateDTO` - Partial update (only `Some(_)` fields are modified)
/// * `Id` - Type of the primary key
pub trait Update<Entity, UpdateDTO, Id> {
    /// Returns the updated entity, `sqlx::Error::RowNotFound` if it does not exist
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}

/// Trait for deleting entities
pub trait Delete<Id> {
    /// Deletes the row; deleting a missing row is not an error
    async fn delete(&self, id: &Id) -> Result<(), sqlx::Error>;
}
