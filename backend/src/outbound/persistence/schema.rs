//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts owned by the authentication subsystem.
    users (id) {
        id -> Int8,
        username -> Varchar,
        email -> Varchar,
    }
}

diesel::table! {
    /// One profile per user, carrying the opaque API token.
    profiles (id) {
        id -> Int8,
        user_id -> Int8,
        api_token -> Varchar,
    }
}

diesel::table! {
    /// Polls that comments may target.
    polls (id) {
        id -> Int8,
        title -> Varchar,
        description -> Text,
        owner_id -> Int8,
        is_published -> Bool,
    }
}

diesel::table! {
    /// Threaded comments; `parent_id` references another comment on the same
    /// poll (checked by the service, not the database).
    comments (id) {
        id -> Int8,
        poll_id -> Int8,
        parent_id -> Nullable<Int8>,
        user_id -> Int8,
        text -> Text,
        is_published -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(profiles -> users (user_id));
diesel::joinable!(polls -> users (owner_id));
diesel::joinable!(comments -> polls (poll_id));
diesel::joinable!(comments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, profiles, polls, comments);
