mod fixture;
mod memory;
mod models;
mod postgres;
mod querier;
mod store;

pub use self::{
    fixture::Fixture,
    memory::{MemoryStore, MemoryWriter},
    models::{
        AUTHOR_FALLBACK_NAME, Article, ArticleHit, ArticleStatus, Author, CATEGORY_FALLBACK_NAME,
        CATEGORY_FALLBACK_SLUG, Category, Role, SearchHits,
    },
    postgres::{DBPool, SCHEMA_FILE, check_ctype, migrate, new_db_pool},
    querier::Querier,
    store::{SqlxStore, Store},
};
