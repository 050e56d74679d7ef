//! DDL applied by `PostgresStore::ensure_schema`. Every statement is idempotent.

pub(super) const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS mentors (
        id UUID PRIMARY KEY,
        specialization TEXT,
        years_of_experience INTEGER CHECK (years_of_experience >= 0),
        bio TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS mentees (
        id UUID PRIMARY KEY,
        bio TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY,
        firstname TEXT NOT NULL,
        lastname TEXT NOT NULL,
        email TEXT NOT NULL,
        track TEXT NOT NULL,
        account_type TEXT NOT NULL CHECK (account_type IN ('Mentor', 'Mentee')),
        owner_id UUID NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS accounts_email_key ON accounts (lower(email))",
    "CREATE INDEX IF NOT EXISTS accounts_owner_idx ON accounts (owner_id)",
    r#"
    CREATE TABLE IF NOT EXISTS questions (
        id UUID PRIMARY KEY,
        author_id UUID NOT NULL REFERENCES accounts (id),
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        tags TEXT[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS answers (
        id UUID PRIMARY KEY,
        question_id UUID NOT NULL REFERENCES questions (id),
        author_id UUID NOT NULL REFERENCES accounts (id),
        body TEXT NOT NULL,
        upvotes BIGINT NOT NULL DEFAULT 0 CHECK (upvotes >= 0),
        downvotes BIGINT NOT NULL DEFAULT 0 CHECK (downvotes >= 0),
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS answers_question_idx ON answers (question_id)",
];
