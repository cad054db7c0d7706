use crate::error::DbError;
use crate::paths::TransferPath;
use crate::transaction::UnitOfWork;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A row from the `rules` table: a named owner of zero or more
/// source -> sink associations.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TransferRule {
    pub id: i64,
    pub name: String,
    pub date_added: DateTime<Utc>,
}

/// A row from the `rule_paths` table: a directed, deduplicated pairing of
/// one source path to one sink path, optionally owned by a rule.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RulePath {
    pub id: i64,
    pub rule_id: Option<i64>,
    pub source_id: i64,
    pub sink_id: i64,
}

/// An association joined with its endpoint path strings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RulePathDetail {
    pub id: i64,
    pub rule_id: Option<i64>,
    pub source_path: String,
    pub sink_path: String,
}

/// What `run_all` processed and how long it took.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rules: usize,
    pub elapsed: Duration,
}

impl RulePath {
    /// Creates an association between `source` and `sink` with no owning
    /// rule. A duplicate (source, sink) pair is an expected outcome and
    /// returns `Ok(None)`; the first association remains the only one.
    pub async fn create(
        uow: &mut UnitOfWork,
        source: &TransferPath,
        sink: &TransferPath,
    ) -> Result<Option<RulePath>, DbError> {
        Self::insert(uow, None, source, sink).await
    }

    async fn insert(
        uow: &mut UnitOfWork,
        rule_id: Option<i64>,
        source: &TransferPath,
        sink: &TransferPath,
    ) -> Result<Option<RulePath>, DbError> {
        let existing = sqlx::query_as::<_, RulePath>(
            "SELECT id, rule_id, source_id, sink_id FROM rule_paths
             WHERE source_id = ?1 AND sink_id = ?2",
        )
        .bind(source.id)
        .bind(sink.id)
        .fetch_optional(uow.conn())
        .await?;

        if existing.is_some() {
            debug!(
                uow = uow.id(),
                source_id = source.id,
                sink_id = sink.id,
                "pair already associated"
            );
            return Ok(None);
        }

        // RETURNING makes the assigned id available to the caller before
        // the transaction finalizes.
        let record = sqlx::query_as::<_, RulePath>(
            "INSERT INTO rule_paths (rule_id, source_id, sink_id)
             VALUES (?1, ?2, ?3)
             RETURNING id, rule_id, source_id, sink_id",
        )
        .bind(rule_id)
        .bind(source.id)
        .bind(sink.id)
        .fetch_one(uow.conn())
        .await?;

        debug!(uow = uow.id(), id = record.id, "association created");
        Ok(Some(record))
    }

    /// Fetches an association by id, joined with its endpoint paths.
    pub async fn get(uow: &mut UnitOfWork, id: i64) -> Result<Option<RulePathDetail>, DbError> {
        let record = sqlx::query_as::<_, RulePathDetail>(
            "SELECT rp.id, rp.rule_id, src.path AS source_path, snk.path AS sink_path
             FROM rule_paths AS rp
             JOIN paths AS src ON src.id = rp.source_id
             JOIN paths AS snk ON snk.id = rp.sink_id
             WHERE rp.id = ?1",
        )
        .bind(id)
        .fetch_optional(uow.conn())
        .await?;
        Ok(record)
    }
}

impl TransferRule {
    /// Creates a named rule with no associations. Seeding a rule with
    /// pairs is an explicit second step: call [`TransferRule::add_association`]
    /// once per pair.
    pub async fn create(uow: &mut UnitOfWork, name: &str) -> Result<TransferRule, DbError> {
        let record = sqlx::query_as::<_, TransferRule>(
            "INSERT INTO rules (name, date_added)
             VALUES (?1, ?2)
             RETURNING id, name, date_added",
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(uow.conn())
        .await?;

        debug!(uow = uow.id(), id = record.id, name, "rule created");
        Ok(record)
    }

    /// Associates a (source, sink) pair under this rule, with the same
    /// duplicate-pair sentinel as [`RulePath::create`].
    pub async fn add_association(
        &self,
        uow: &mut UnitOfWork,
        source: &TransferPath,
        sink: &TransferPath,
    ) -> Result<Option<RulePath>, DbError> {
        RulePath::insert(uow, Some(self.id), source, sink).await
    }

    /// Fetches a rule by id.
    pub async fn get(uow: &mut UnitOfWork, id: i64) -> Result<Option<TransferRule>, DbError> {
        let record = sqlx::query_as::<_, TransferRule>(
            "SELECT id, name, date_added FROM rules WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(uow.conn())
        .await?;
        Ok(record)
    }

    /// Fetches every persisted rule, oldest first.
    pub async fn list(uow: &mut UnitOfWork) -> Result<Vec<TransferRule>, DbError> {
        let records = sqlx::query_as::<_, TransferRule>(
            "SELECT id, name, date_added FROM rules ORDER BY id ASC",
        )
        .fetch_all(uow.conn())
        .await?;
        Ok(records)
    }

    /// The associations owned by this rule, joined with their endpoints.
    pub async fn associations(
        &self,
        uow: &mut UnitOfWork,
    ) -> Result<Vec<RulePathDetail>, DbError> {
        let records = sqlx::query_as::<_, RulePathDetail>(
            "SELECT rp.id, rp.rule_id, src.path AS source_path, snk.path AS sink_path
             FROM rule_paths AS rp
             JOIN paths AS src ON src.id = rp.source_id
             JOIN paths AS snk ON snk.id = rp.sink_id
             WHERE rp.rule_id = ?1
             ORDER BY rp.id ASC",
        )
        .bind(self.id)
        .fetch_all(uow.conn())
        .await?;
        Ok(records)
    }

    /// Runs this rule: visits each associated pair and records the
    /// transfer it stands for. The byte-copy executor is an external
    /// collaborator, so this only logs. Returns how many pairs it visited.
    pub async fn run(&self, uow: &mut UnitOfWork) -> Result<usize, DbError> {
        let pairs = self.associations(uow).await?;
        for pair in &pairs {
            info!(
                uow = uow.id(),
                rule = %self.name,
                source = %pair.source_path,
                sink = %pair.sink_path,
                "transfer scheduled"
            );
        }
        Ok(pairs.len())
    }
}

/// Runs every persisted rule through the given handle and reports how many
/// were processed along with the elapsed wall-clock time.
pub async fn run_all(uow: &mut UnitOfWork) -> Result<RunSummary, DbError> {
    let started = Instant::now();

    let rules = TransferRule::list(uow).await?;
    for rule in &rules {
        rule.run(uow).await?;
    }

    let summary = RunSummary {
        rules: rules.len(),
        elapsed: started.elapsed(),
    };
    info!(
        uow = uow.id(),
        rules = summary.rules,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "ran all rules"
    );
    Ok(summary)
}
