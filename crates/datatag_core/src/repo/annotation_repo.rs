//! SQLite-backed annotation store.
//!
//! # Responsibility
//! - Persist committed tag sets per dataset as an alternative to rewriting
//!   the dataset catalog file.
//! - Overlay stored tag sets onto a freshly loaded dataset collection.
//!
//! # Invariants
//! - A write replaces all three lists of one dataset in a single transaction.
//! - Stored list order is the committed order (`position ASC`).
//! - A dataset committed with empty lists is distinguishable from one never
//!   committed (`annotation_sets` row present).

use crate::gateway::{AnnotationUpdate, GatewayError, GatewayResult, PersistenceGateway};
use crate::model::annotation::{Annotation, TagList};
use crate::model::dataset::Dataset;
use log::{error, info};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::time::Instant;

/// Annotation store over a migrated SQLite connection.
pub struct SqliteAnnotationRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteAnnotationRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> GatewayResult<Self> {
        for table in ["annotation_sets", "dataset_annotations"] {
            if !table_exists(conn, table)? {
                return Err(GatewayError::InvalidData(format!(
                    "annotation store requires table `{table}`"
                )));
            }
        }
        Ok(Self { conn })
    }

    /// Loads the committed tag sets for one dataset, if any were committed.
    pub fn load_annotations(&self, dataset_id: &str) -> GatewayResult<Option<AnnotationUpdate>> {
        let committed: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM annotation_sets WHERE dataset_id = ?1);",
            [dataset_id],
            |row| row.get(0),
        )?;
        if committed != 1 {
            return Ok(None);
        }

        Ok(Some(AnnotationUpdate {
            dataset_id: dataset_id.to_string(),
            keywords: load_list(self.conn, dataset_id, TagList::Keyword)?,
            inclusion_terms: load_list(self.conn, dataset_id, TagList::Inclusion)?,
            exclusion_terms: load_list(self.conn, dataset_id, TagList::Exclusion)?,
        }))
    }

    /// Lists committed dataset ids sorted ascending.
    pub fn committed_dataset_ids(&self) -> GatewayResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT dataset_id FROM annotation_sets ORDER BY dataset_id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    /// Replaces tag sets of every dataset that has a committed record.
    ///
    /// Returns the number of datasets updated.
    pub fn apply_stored(&self, datasets: &mut [Dataset]) -> GatewayResult<usize> {
        let mut applied = 0;
        for dataset in datasets.iter_mut() {
            if let Some(stored) = self.load_annotations(&dataset.id)? {
                dataset.keywords = stored.keywords;
                dataset.inclusion_terms = stored.inclusion_terms;
                dataset.exclusion_terms = stored.exclusion_terms;
                applied += 1;
            }
        }
        Ok(applied)
    }

    fn overwrite(&mut self, update: &AnnotationUpdate) -> GatewayResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO annotation_sets (dataset_id, updated_at)
             VALUES (?1, (strftime('%s', 'now') * 1000))
             ON CONFLICT(dataset_id) DO UPDATE SET updated_at = excluded.updated_at;",
            [update.dataset_id.as_str()],
        )?;
        tx.execute(
            "DELETE FROM dataset_annotations WHERE dataset_id = ?1;",
            [update.dataset_id.as_str()],
        )?;
        for list in TagList::ALL {
            insert_list(&tx, &update.dataset_id, list, update.tags(list))?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl PersistenceGateway for SqliteAnnotationRepository<'_> {
    fn write_annotations(&mut self, update: &AnnotationUpdate) -> GatewayResult<()> {
        let started_at = Instant::now();
        match self.overwrite(update) {
            Ok(()) => {
                info!(
                    "event=commit module=repo status=ok backend=sqlite dataset_id={} keywords={} inclusions={} exclusions={} duration_ms={}",
                    update.dataset_id,
                    update.keywords.len(),
                    update.inclusion_terms.len(),
                    update.exclusion_terms.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=commit module=repo status=error backend=sqlite dataset_id={} duration_ms={} error={}",
                    update.dataset_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn insert_list(
    tx: &Transaction<'_>,
    dataset_id: &str,
    list: TagList,
    tags: &[Annotation],
) -> GatewayResult<()> {
    let mut stmt = tx.prepare(
        "INSERT OR IGNORE INTO dataset_annotations (
            dataset_id, list_kind, position, tag_id, label, comment, source_text
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
    )?;
    for (position, tag) in tags.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|_| GatewayError::InvalidData("tag list too long".to_string()))?;
        stmt.execute(params![
            dataset_id,
            list.as_str(),
            position,
            tag.id,
            tag.label,
            tag.comment,
            tag.text,
        ])?;
    }
    Ok(())
}

fn load_list(conn: &Connection, dataset_id: &str, list: TagList) -> GatewayResult<Vec<Annotation>> {
    let mut stmt = conn.prepare(
        "SELECT tag_id, label, comment, source_text
         FROM dataset_annotations
         WHERE dataset_id = ?1 AND list_kind = ?2
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query(params![dataset_id, list.as_str()])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(Annotation {
            id: row.get("tag_id")?,
            label: row.get("label")?,
            comment: row.get("comment")?,
            text: row.get("source_text")?,
        });
    }
    Ok(tags)
}

fn table_exists(conn: &Connection, table: &str) -> GatewayResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
