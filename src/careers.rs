//! Static career-exploration lookup table.
//!
//! The table is data, not code: it is embedded as JSON, deserialized into
//! typed records and validated once at startup, then served read-only to the
//! career-exploration front-end. Slugs are the stable identifiers the client
//! keys on, so they must be unique kebab-case.

use anyhow::Context;
use axum::{extract::State, routing::get, Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

const CAREERS_JSON: &str = include_str!("../data/careers.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerCategory {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub average_salary: String,
    pub growth_rate: String,
    pub top_skills: Vec<String>,
    pub recommended_template: String,
}

fn is_valid_slug(slug: &str) -> bool {
    lazy_static! {
        static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap();
    }
    SLUG_RE.is_match(slug)
}

fn validate(categories: &[CareerCategory]) -> anyhow::Result<()> {
    anyhow::ensure!(!categories.is_empty(), "career table is empty");

    let mut seen = std::collections::HashSet::new();
    for c in categories {
        anyhow::ensure!(is_valid_slug(&c.slug), "invalid career slug '{}'", c.slug);
        anyhow::ensure!(seen.insert(c.slug.as_str()), "duplicate career slug '{}'", c.slug);
        anyhow::ensure!(!c.name.trim().is_empty(), "career '{}' has no name", c.slug);
        anyhow::ensure!(
            !c.top_skills.is_empty(),
            "career '{}' lists no skills",
            c.slug
        );
    }
    Ok(())
}

/// Parse and validate the embedded table. Called once during state init so a
/// malformed table fails the process at startup instead of at request time.
pub fn load_table() -> anyhow::Result<Arc<[CareerCategory]>> {
    let categories: Vec<CareerCategory> =
        serde_json::from_str(CAREERS_JSON).context("parse embedded career table")?;
    validate(&categories)?;
    Ok(categories.into())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/careers", get(list_careers))
}

async fn list_careers(State(state): State<AppState>) -> Json<Vec<CareerCategory>> {
    Json(state.careers.to_vec())
}
