//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) on account insert | `23505` | `DuplicateEmail` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed, network, decode | N/A | `Backend` |
//!
//! Updates that touch no row report `NotFound`.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use async_trait::async_trait;

use mentorhub_auth::Role;
use mentorhub_core::{AccountId, AnswerId, MenteeId, MentorId, QuestionId};
use mentorhub_mentorship::{
    Account, Answer, AnswerSort, Mentee, MenteeRecord, Mentor, MentorRecord, ProfileId, Question,
    Vote,
};

use super::schema::STATEMENTS;
use super::{
    AccountStore, AnswerFilter, AnswerStore, Paged, Pagination, QuestionStore, StoreError,
};

const ACCOUNT_COLUMNS: &str = "a.id, a.firstname, a.lastname, a.email, a.track, a.account_type, \
     a.owner_id, a.password_hash, a.created_at, a.updated_at";

const MENTOR_COLUMNS: &str = "m.id AS mentor_id, m.specialization, m.years_of_experience, \
     m.bio AS mentor_bio, m.created_at AS mentor_created_at, m.updated_at AS mentor_updated_at";

const MENTEE_COLUMNS: &str = "e.id AS mentee_id, e.bio AS mentee_bio, \
     e.created_at AS mentee_created_at, e.updated_at AS mentee_updated_at";

const QUESTION_COLUMNS: &str = "id, author_id, title, body, tags, created_at, updated_at";

const ANSWER_COLUMNS: &str =
    "id, question_id, author_id, body, upvotes, downvotes, created_at, updated_at";

const MAX_CONNECTIONS: u32 = 10;

/// Store backed by a Postgres connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes that do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        tracing::info!(statements = STATEMENTS.len(), "database schema ready");
        Ok(())
    }

    async fn insert_account(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        account: &Account,
        owner_id: Uuid,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts
                (id, firstname, lastname, email, track, account_type, owner_id, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(*account.id.as_uuid())
        .bind(&account.firstname)
        .bind(&account.lastname)
        .bind(&account.email)
        .bind(&account.track)
        .bind(account.account_type.as_str())
        .bind(owner_id)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateEmail(account.email.clone())
            } else {
                map_sqlx_error("insert_account", e)
            }
        })?;
        Ok(())
    }

    /// Run a `COUNT(*) AS total` query, binding `question` as `$1` when given.
    async fn count(&self, operation: &str, sql: &str, question: Option<Uuid>) -> Result<u64, StoreError> {
        let mut query = sqlx::query(sql);
        if let Some(question) = question {
            query = query.bind(question);
        }
        let row = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        let total: i64 = row.try_get("total").map_err(|e| map_sqlx_error(operation, e))?;
        Ok(total.max(0) as u64)
    }
}

#[async_trait]
impl AccountStore for PostgresStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE lower(a.email) = lower($1)");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_email", e))?;
        row.as_ref()
            .map(account_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_by_email", e))
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE a.id = $1");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;
        row.as_ref()
            .map(account_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_by_id", e))
    }

    #[instrument(skip(self, account, mentor), fields(mentor_id = %mentor.id), err)]
    async fn create_mentor(&self, account: Account, mentor: Mentor) -> Result<MentorRecord, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("create_mentor", e))?;

        sqlx::query(
            r#"
            INSERT INTO mentors (id, specialization, years_of_experience, bio, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*mentor.id.as_uuid())
        .bind(&mentor.specialization)
        .bind(mentor.years_of_experience.map(|y| y as i32))
        .bind(&mentor.bio)
        .bind(mentor.created_at)
        .bind(mentor.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("create_mentor", e))?;

        Self::insert_account(&mut tx, &account, *mentor.id.as_uuid()).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("create_mentor", e))?;
        Ok(MentorRecord { account, mentor })
    }

    #[instrument(skip(self, account, mentee), fields(mentee_id = %mentee.id), err)]
    async fn create_mentee(&self, account: Account, mentee: Mentee) -> Result<MenteeRecord, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("create_mentee", e))?;

        sqlx::query("INSERT INTO mentees (id, bio, created_at, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(*mentee.id.as_uuid())
            .bind(&mentee.bio)
            .bind(mentee.created_at)
            .bind(mentee.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("create_mentee", e))?;

        Self::insert_account(&mut tx, &account, *mentee.id.as_uuid()).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("create_mentee", e))?;
        Ok(MenteeRecord { account, mentee })
    }

    async fn update_account(&self, account: &Account) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET firstname = $2, lastname = $3, track = $4, password_hash = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(*account.id.as_uuid())
        .bind(&account.firstname)
        .bind(&account.lastname)
        .bind(&account.track)
        .bind(&account.password_hash)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_account", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Account"));
        }
        Ok(())
    }

    async fn get_mentor(&self, id: MentorId) -> Result<Option<MentorRecord>, StoreError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS}, {MENTOR_COLUMNS} \
             FROM accounts a JOIN mentors m ON m.id = a.owner_id \
             WHERE m.id = $1"
        );
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_mentor", e))?;
        row.as_ref()
            .map(mentor_record_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_mentor", e))
    }

    async fn get_mentee(&self, id: MenteeId) -> Result<Option<MenteeRecord>, StoreError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS}, {MENTEE_COLUMNS} \
             FROM accounts a JOIN mentees e ON e.id = a.owner_id \
             WHERE e.id = $1"
        );
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_mentee", e))?;
        row.as_ref()
            .map(mentee_record_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_mentee", e))
    }

    #[instrument(skip(self, record), fields(mentor_id = %record.mentor.id), err)]
    async fn update_mentor(&self, record: &MentorRecord) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("update_mentor", e))?;

        let mentor = &record.mentor;
        let updated = sqlx::query(
            r#"
            UPDATE mentors
            SET specialization = $2, years_of_experience = $3, bio = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(*mentor.id.as_uuid())
        .bind(&mentor.specialization)
        .bind(mentor.years_of_experience.map(|y| y as i32))
        .bind(&mentor.bio)
        .bind(mentor.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_mentor", e))?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound("Mentor"));
        }

        let account = &record.account;
        let updated = sqlx::query(
            "UPDATE accounts SET firstname = $2, lastname = $3, track = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(*account.id.as_uuid())
        .bind(&account.firstname)
        .bind(&account.lastname)
        .bind(&account.track)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_mentor", e))?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound("Account"));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("update_mentor", e))
    }

    async fn list_mentors(&self, page: Pagination) -> Result<Paged<MentorRecord>, StoreError> {
        let total = self
            .count(
                "list_mentors",
                "SELECT COUNT(*) AS total FROM mentors m JOIN accounts a ON a.owner_id = m.id",
                None,
            )
            .await?;

        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS}, {MENTOR_COLUMNS} \
             FROM accounts a JOIN mentors m ON m.id = a.owner_id \
             ORDER BY a.created_at ASC, a.id ASC \
             LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(page.limit))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_mentors", e))?;

        let items = rows
            .iter()
            .map(mentor_record_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_mentors", e))?;
        Ok(Paged::new(items, total, page))
    }
}

#[async_trait]
impl QuestionStore for PostgresStore {
    async fn insert_question(&self, question: &Question) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO questions (id, author_id, title, body, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*question.id.as_uuid())
        .bind(*question.author.as_uuid())
        .bind(&question.title)
        .bind(&question.body)
        .bind(&question.tags)
        .bind(question.created_at)
        .bind(question.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_question", e))?;
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StoreError> {
        let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_question", e))?;
        row.as_ref()
            .map(question_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_question", e))
    }

    async fn update_question(&self, question: &Question) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE questions SET title = $2, body = $3, tags = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(*question.id.as_uuid())
        .bind(&question.title)
        .bind(&question.body)
        .bind(&question.tags)
        .bind(question.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_question", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Question"));
        }
        Ok(())
    }

    async fn list_questions(&self, page: Pagination) -> Result<Paged<Question>, StoreError> {
        let total = self
            .count(
                "list_questions",
                "SELECT COUNT(*) AS total FROM questions",
                None,
            )
            .await?;

        let sql = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions \
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(page.limit))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_questions", e))?;

        let items = rows
            .iter()
            .map(question_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_questions", e))?;
        Ok(Paged::new(items, total, page))
    }
}

#[async_trait]
impl AnswerStore for PostgresStore {
    async fn insert_answer(&self, answer: &Answer) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO answers (id, question_id, author_id, body, upvotes, downvotes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(*answer.id.as_uuid())
        .bind(*answer.question.as_uuid())
        .bind(*answer.author.as_uuid())
        .bind(&answer.body)
        .bind(answer.upvotes as i64)
        .bind(answer.downvotes as i64)
        .bind(answer.created_at)
        .bind(answer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_answer", e))?;
        Ok(())
    }

    async fn get_answer(&self, id: AnswerId) -> Result<Option<Answer>, StoreError> {
        let sql = format!("SELECT {ANSWER_COLUMNS} FROM answers WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_answer", e))?;
        row.as_ref()
            .map(answer_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_answer", e))
    }

    async fn update_answer(&self, answer: &Answer) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE answers SET body = $2, updated_at = $3 WHERE id = $1")
            .bind(*answer.id.as_uuid())
            .bind(&answer.body)
            .bind(answer.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_answer", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Answer"));
        }
        Ok(())
    }

    async fn list_answers(&self, filter: AnswerFilter, page: Pagination) -> Result<Paged<Answer>, StoreError> {
        let question = filter.question.map(|q| *q.as_uuid());
        let count_sql = match question {
            Some(_) => "SELECT COUNT(*) AS total FROM answers WHERE question_id = $1",
            None => "SELECT COUNT(*) AS total FROM answers",
        };
        let total = self.count("list_answers", count_sql, question).await?;

        let sql = format!(
            "SELECT {ANSWER_COLUMNS} FROM answers \
             WHERE ($1::uuid IS NULL OR question_id = $1) \
             ORDER BY {} LIMIT $2 OFFSET $3",
            order_by(filter.sort)
        );
        let rows = sqlx::query(&sql)
            .bind(question)
            .bind(i64::from(page.limit))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_answers", e))?;

        let items = rows
            .iter()
            .map(answer_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_answers", e))?;
        Ok(Paged::new(items, total, page))
    }

    #[instrument(skip(self), fields(answer_id = %id), err)]
    async fn vote(&self, id: AnswerId, vote: Vote) -> Result<Option<Answer>, StoreError> {
        let counter = match vote {
            Vote::Up => "upvotes = upvotes + 1",
            Vote::Down => "downvotes = downvotes + 1",
        };
        let sql = format!("UPDATE answers SET {counter} WHERE id = $1 RETURNING {ANSWER_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("vote", e))?;
        row.as_ref()
            .map(answer_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("vote", e))
    }
}

fn order_by(sort: AnswerSort) -> &'static str {
    match sort {
        AnswerSort::Newest => "created_at DESC, id DESC",
        AnswerSort::Oldest => "created_at ASC, id ASC",
        AnswerSort::Votes => "(upvotes - downvotes) DESC, created_at DESC",
    }
}

// Row decoding

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    let account_type: String = row.try_get("account_type")?;
    let account_type: Role = account_type
        .parse()
        .map_err(|e: String| sqlx::Error::Decode(e.into()))?;
    let owner_id: Uuid = row.try_get("owner_id")?;
    let owner = match account_type {
        Role::Mentor => ProfileId::Mentor(MentorId::from_uuid(owner_id)),
        Role::Mentee => ProfileId::Mentee(MenteeId::from_uuid(owner_id)),
    };

    Ok(Account {
        id: AccountId::from_uuid(row.try_get("id")?),
        firstname: row.try_get("firstname")?,
        lastname: row.try_get("lastname")?,
        email: row.try_get("email")?,
        track: row.try_get("track")?,
        account_type,
        owner,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn mentor_record_from_row(row: &PgRow) -> Result<MentorRecord, sqlx::Error> {
    let years: Option<i32> = row.try_get("years_of_experience")?;
    let mentor = Mentor {
        id: MentorId::from_uuid(row.try_get("mentor_id")?),
        specialization: row.try_get("specialization")?,
        years_of_experience: years.map(|y| y.max(0) as u32),
        bio: row.try_get("mentor_bio")?,
        created_at: row.try_get::<DateTime<Utc>, _>("mentor_created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("mentor_updated_at")?,
    };
    Ok(MentorRecord {
        account: account_from_row(row)?,
        mentor,
    })
}

fn mentee_record_from_row(row: &PgRow) -> Result<MenteeRecord, sqlx::Error> {
    let mentee = Mentee {
        id: MenteeId::from_uuid(row.try_get("mentee_id")?),
        bio: row.try_get("mentee_bio")?,
        created_at: row.try_get("mentee_created_at")?,
        updated_at: row.try_get("mentee_updated_at")?,
    };
    Ok(MenteeRecord {
        account: account_from_row(row)?,
        mentee,
    })
}

fn question_from_row(row: &PgRow) -> Result<Question, sqlx::Error> {
    Ok(Question {
        id: QuestionId::from_uuid(row.try_get("id")?),
        author: AccountId::from_uuid(row.try_get("author_id")?),
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        tags: row.try_get("tags")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn answer_from_row(row: &PgRow) -> Result<Answer, sqlx::Error> {
    let upvotes: i64 = row.try_get("upvotes")?;
    let downvotes: i64 = row.try_get("downvotes")?;
    Ok(Answer {
        id: AnswerId::from_uuid(row.try_get("id")?),
        question: QuestionId::from_uuid(row.try_get("question_id")?),
        author: AccountId::from_uuid(row.try_get("author_id")?),
        body: row.try_get("body")?,
        upvotes: upvotes.max(0) as u64,
        downvotes: downvotes.max(0) as u64,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Backend(format!(
            "database error in {}: {}",
            operation,
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Check if an error is a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_ordering_uses_net_score() {
        assert_eq!(order_by(AnswerSort::Votes), "(upvotes - downvotes) DESC, created_at DESC");
        assert!(order_by(AnswerSort::Oldest).starts_with("created_at ASC"));
    }

    #[test]
    fn non_database_errors_are_backend_errors() {
        let err = map_sqlx_error("get_answer", sqlx::Error::PoolClosed);
        assert_eq!(
            err,
            StoreError::Backend("connection pool closed in get_answer".to_string())
        );
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
