//! Prompt pack repository.
//!
//! Packs are reference data: read by the generation pipeline, written
//! only by seeding.

use pixgen_models::{Pack, PackPrompt};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::StoreError;

#[derive(Clone)]
pub struct PackRepository {
    pool: SqlitePool,
}

impl PackRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Pack>, StoreError> {
        let rows = sqlx::query("SELECT * FROM packs ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(pack_from_row).collect::<Result<_, _>>()?)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Pack>, StoreError> {
        let row = sqlx::query("SELECT * FROM packs WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| pack_from_row(&r)).transpose()
    }

    /// Prompts belonging to a pack; empty when the pack is unknown.
    pub async fn prompts_for_pack(&self, pack_id: &str) -> Result<Vec<PackPrompt>, StoreError> {
        let rows = sqlx::query("SELECT * FROM pack_prompts WHERE pack_id = ?1 ORDER BY id")
            .bind(pack_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| {
                Ok(PackPrompt {
                    id: r.try_get("id")?,
                    pack_id: r.try_get("pack_id")?,
                    prompt: r.try_get("prompt")?,
                })
            })
            .collect()
    }

    /// Seed a pack with its prompts. Used by ops seeding and tests.
    pub async fn seed_pack(&self, pack: &Pack, prompts: &[String]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO packs (id, name, description, cover_url) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&pack.id)
        .bind(&pack.name)
        .bind(&pack.description)
        .bind(&pack.cover_url)
        .execute(&mut *tx)
        .await?;

        for prompt in prompts {
            sqlx::query("INSERT INTO pack_prompts (id, pack_id, prompt) VALUES (?1, ?2, ?3)")
                .bind(uuid::Uuid::new_v4().to_string())
                .bind(&pack.id)
                .bind(prompt)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

fn pack_from_row(row: &SqliteRow) -> Result<Pack, StoreError> {
    Ok(Pack {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        cover_url: row.try_get("cover_url")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;

    fn pack(id: &str, name: &str) -> Pack {
        Pack {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            cover_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_seed_and_list() {
        let store = Store::in_memory().await.unwrap();
        let repo = store.packs();
        repo.seed_pack(&pack("p-1", "Headshots"), &["a".into(), "b".into()])
            .await
            .unwrap();
        repo.seed_pack(&pack("p-2", "Astronaut"), &[]).await.unwrap();

        let packs = repo.list_all().await.unwrap();
        assert_eq!(packs.len(), 2);
        // Ordered by name.
        assert_eq!(packs[0].name, "Astronaut");

        let prompts = repo.prompts_for_pack("p-1").await.unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts.iter().all(|p| p.pack_id == "p-1"));
    }

    #[tokio::test]
    async fn test_unknown_pack_has_no_prompts() {
        let store = Store::in_memory().await.unwrap();
        assert!(store.packs().prompts_for_pack("nope").await.unwrap().is_empty());
        assert!(store.packs().find_by_id("nope").await.unwrap().is_none());
    }
}
