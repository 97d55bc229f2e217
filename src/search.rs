// src/search.rs
//
// Catalog search aggregation. The backend's query language cannot express
// a single OR across the joined family relation, so the search issues four
// substring queries in parallel and merges them client-side with a fixed
// field priority.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

use crate::backend::{Backend, BackendError};
use crate::error::Error;
use crate::models::{FamiliaRef, Producto};

const SELECT_WITH_FAMILY: &str = "*,familias(nombre)";

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub items: Vec<Producto>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Merges result groups into one deduplicated list, first-seen-wins. The
/// group order is the ranking: a product matched by name outranks the same
/// product only reachable through its category.
pub fn merge_ranked(groups: Vec<Vec<Producto>>) -> Vec<Producto> {
    let mut seen: HashSet<i64> = HashSet::new();
    let mut merged = Vec::new();
    for group in groups {
        for producto in group {
            if seen.insert(producto.id) {
                merged.push(producto);
            }
        }
    }
    merged
}

pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Vec<T> {
    let start = page.saturating_sub(1).saturating_mul(limit);
    items.into_iter().skip(start).take(limit).collect()
}

/// Runs the aggregated search. An empty query returns the most recently
/// created products; otherwise four ilike queries (nombre, family name,
/// descripcion, categoria) run in parallel and merge in that priority.
pub async fn buscar(
    backend: &Backend,
    q: &str,
    page: usize,
    limit: usize,
) -> Result<SearchResponse, Error> {
    let q = q.trim();

    if q.is_empty() {
        let page = backend
            .from("productos")
            .select(SELECT_WITH_FAMILY)
            .order("created_at.desc")
            .limit(limit)
            .fetch::<Producto>()
            .await?;
        let count = page.items.len();
        return Ok(SearchResponse {
            items: page.items,
            count,
            warning: None,
        });
    }

    // Over-fetch each field so the merged set can fill a page even when
    // the groups overlap heavily.
    let fetch_limit = limit.saturating_mul(4);
    let (by_nombre, by_familia, by_descripcion, by_categoria) = tokio::join!(
        fetch_field(backend, "nombre", q, fetch_limit),
        fetch_family(backend, q, fetch_limit),
        fetch_field(backend, "descripcion", q, fetch_limit),
        fetch_field(backend, "categoria", q, fetch_limit),
    );

    let results = [
        ("nombre", by_nombre),
        ("familias.nombre", by_familia),
        ("descripcion", by_descripcion),
        ("categoria", by_categoria),
    ];
    let mut groups = Vec::with_capacity(results.len());
    let mut failures = 0;
    let mut last_err = None;
    for (column, result) in results {
        match result {
            Ok(items) => groups.push(items),
            Err(e) => {
                // One broken filter degrades to an empty group; every
                // filter failing means the backend itself is down.
                log::warn!("search filter on {column} failed: {e}");
                failures += 1;
                last_err = Some(e);
                groups.push(Vec::new());
            }
        }
    }
    if failures == groups.len() {
        if let Some(e) = last_err {
            return Err(e.into());
        }
    }

    let merged = merge_ranked(groups);
    let count = merged.len();
    let mut items = paginate(merged, page, limit);
    backfill_familias(backend, &mut items).await;

    Ok(SearchResponse {
        items,
        count,
        warning: None,
    })
}

async fn fetch_field(
    backend: &Backend,
    column: &str,
    q: &str,
    limit: usize,
) -> Result<Vec<Producto>, BackendError> {
    let page = backend
        .from("productos")
        .select(SELECT_WITH_FAMILY)
        .ilike_contains(column, q)
        .limit(limit)
        .fetch::<Producto>()
        .await?;
    Ok(page.items)
}

async fn fetch_family(
    backend: &Backend,
    q: &str,
    limit: usize,
) -> Result<Vec<Producto>, BackendError> {
    let page = backend
        .from("productos")
        .select("*,familias!inner(nombre)")
        .ilike_contains("familias.nombre", q)
        .limit(limit)
        .fetch::<Producto>()
        .await?;
    Ok(page.items)
}

/// Fills in the embedded family name for merged items that carry only a
/// familia_id. Failures are ignored; items simply go out without a family.
async fn backfill_familias(backend: &Backend, items: &mut [Producto]) {
    let missing: Vec<String> = items
        .iter()
        .filter(|p| p.familias.is_none())
        .filter_map(|p| p.familia_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .map(|id| id.to_string())
        .collect();

    if missing.is_empty() {
        return;
    }

    #[derive(serde::Deserialize)]
    struct FamiliaRow {
        id: i64,
        nombre: String,
    }

    let familias = match backend
        .from("familias")
        .select("id,nombre")
        .in_list("id", &missing)
        .fetch::<FamiliaRow>()
        .await
    {
        Ok(page) => page.items,
        Err(e) => {
            log::warn!("familia backfill failed: {e}");
            return;
        }
    };

    let by_id: HashMap<i64, String> = familias.into_iter().map(|f| (f.id, f.nombre)).collect();
    for item in items.iter_mut() {
        if item.familias.is_none() {
            if let Some(nombre) = item.familia_id.and_then(|id| by_id.get(&id)) {
                item.familias = Some(FamiliaRef {
                    nombre: nombre.clone(),
                });
            }
        }
    }
}
