//! LookupRepository - Tabelle di riferimento composte da solo nome
//!
//! Materiali, unità di misura e forme hanno la stessa forma (`id`, `name`) e
//! le stesse regole: nome univoco e cancellazione vietata se referenziati.

use super::inserted_id;
use crate::entities::Lookup;
use sqlx::{Error, MySqlPool};
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Material,
    Unit,
    FormType,
}

impl LookupKind {
    pub fn table(self) -> &'static str {
        match self {
            LookupKind::Material => "materials",
            LookupKind::Unit => "units",
            LookupKind::FormType => "form_types",
        }
    }

    pub fn id_column(self) -> &'static str {
        match self {
            LookupKind::Material => "material_id",
            LookupKind::Unit => "unit_id",
            LookupKind::FormType => "form_type_id",
        }
    }

    /// Table whose rows reference this kind through the same id column
    pub fn referenced_by(self) -> &'static str {
        match self {
            LookupKind::Material | LookupKind::Unit => "packaging_types",
            LookupKind::FormType => "products",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LookupKind::Material => "material",
            LookupKind::Unit => "unit",
            LookupKind::FormType => "form type",
        }
    }
}

pub struct LookupRepository {
    connection_pool: MySqlPool,
}

impl LookupRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    pub async fn list(&self, kind: LookupKind) -> Result<Vec<Lookup>, Error> {
        sqlx::query_as::<_, Lookup>(&format!(
            "SELECT {} AS id, name FROM {} ORDER BY name",
            kind.id_column(),
            kind.table()
        ))
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn read(&self, kind: LookupKind, id: i32) -> Result<Option<Lookup>, Error> {
        sqlx::query_as::<_, Lookup>(&format!(
            "SELECT {col} AS id, name FROM {table} WHERE {col} = ?",
            col = kind.id_column(),
            table = kind.table()
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    pub async fn exists(&self, kind: LookupKind, id: i32) -> Result<bool, Error> {
        Ok(self.read(kind, id).await?.is_some())
    }

    pub async fn name_taken(
        &self,
        kind: LookupKind,
        name: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, Error> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {table} WHERE name = ? AND {col} <> COALESCE(?, 0)",
            col = kind.id_column(),
            table = kind.table()
        ))
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.connection_pool)
        .await?;
        Ok(count > 0)
    }

    /// Number of rows still referencing the entry
    pub async fn usage_count(&self, kind: LookupKind, id: i32) -> Result<i64, Error> {
        sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ?",
            kind.referenced_by(),
            kind.id_column()
        ))
        .bind(id)
        .fetch_one(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn create(&self, kind: LookupKind, name: &str) -> Result<Lookup, Error> {
        let result = sqlx::query(&format!("INSERT INTO {} (name) VALUES (?)", kind.table()))
            .bind(name)
            .execute(&self.connection_pool)
            .await?;

        let new_id = inserted_id(result.last_insert_id())?;
        info!("Created {} with id {}", kind.label(), new_id);
        Ok(Lookup {
            id: new_id,
            name: name.to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn rename(&self, kind: LookupKind, id: i32, name: &str) -> Result<Lookup, Error> {
        sqlx::query(&format!(
            "UPDATE {} SET name = ? WHERE {} = ?",
            kind.table(),
            kind.id_column()
        ))
        .bind(name)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        self.read(kind, id).await?.ok_or(Error::RowNotFound)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, kind: LookupKind, id: i32) -> Result<(), Error> {
        sqlx::query(&format!(
            "DELETE FROM {} WHERE {} = ?",
            kind.table(),
            kind.id_column()
        ))
        .bind(id)
        .execute(&self.connection_pool)
        .await?;
        info!("Deleted {} {}", kind.label(), id);
        Ok(())
    }
}
