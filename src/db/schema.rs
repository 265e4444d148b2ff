//! Database schema and migrations for CloudBox.
//!
//! Migrations are applied sequentially when the database is first opened or
//! upgraded; the schema_version table tracks which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users and settings
    r#"
CREATE TABLE users (
    id              TEXT PRIMARY KEY,                 -- UUID v4
    username        TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash   TEXT NOT NULL,                    -- Argon2id PHC string
    is_admin        INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_is_admin ON users(is_admin);

CREATE TABLE settings (
    key     TEXT PRIMARY KEY,
    value   TEXT NOT NULL
);

INSERT OR IGNORE INTO settings (key, value) VALUES ('admin_setup_done', 'false');
"#,
    // v2: file metadata
    r#"
CREATE TABLE metadata (
    id          TEXT PRIMARY KEY,                     -- UUID v4
    user_id     TEXT NOT NULL,                        -- uploader; not a foreign key, files outlive accounts
    filename    TEXT NOT NULL,
    size        INTEGER NOT NULL,
    path        TEXT NOT NULL,
    is_shared   INTEGER NOT NULL DEFAULT 0,
    uploaded_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Personal names are unique per owner, shared names are unique globally
CREATE UNIQUE INDEX idx_metadata_personal_name ON metadata(user_id, filename) WHERE is_shared = 0;
CREATE UNIQUE INDEX idx_metadata_shared_name ON metadata(filename) WHERE is_shared = 1;
CREATE INDEX idx_metadata_user_id ON metadata(user_id);
"#,
];
