use crate::db;
use crate::forms::{BuildFilter, BuildForm, Pagination};
use crate::helpers::Cache;
use crate::models::{Build, BuildSummary, Component, ComponentCategory, User};
use crate::services::ServiceError;
use crate::views::build::Detail;
use sqlx::PgPool;
use std::collections::HashSet;
use std::time::Duration;

const VIEW_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Names what a set of components lacks to be a complete PC, in display order.
pub fn missing_categories(components: &[Component]) -> Vec<String> {
    let present: HashSet<ComponentCategory> =
        components.iter().map(|component| component.category).collect();

    let mut missing: Vec<String> = ComponentCategory::MANDATORY
        .iter()
        .filter(|category| !present.contains(*category))
        .map(|category| category.to_string())
        .collect();

    if !present.iter().any(ComponentCategory::is_storage) {
        missing.push("storage (SSD or HDD)".to_string());
    }

    missing
}

async fn load_components(pool: &PgPool, ids: &[i32]) -> Result<Vec<Component>, ServiceError> {
    let components = db::component::fetch_many(pool, ids).await?;
    if components.len() != ids.len() {
        let found: HashSet<i32> = components.iter().map(|component| component.id).collect();
        let unknown: Vec<String> = ids
            .iter()
            .filter(|id| !found.contains(id))
            .map(|id| id.to_string())
            .collect();
        return Err(ServiceError::Validation(format!(
            "Unknown components: {}",
            unknown.join(", ")
        )));
    }

    let missing = missing_categories(&components);
    if !missing.is_empty() {
        return Err(ServiceError::Validation(format!(
            "Build is incomplete, missing: {}",
            missing.join(", ")
        )));
    }

    Ok(components)
}

pub async fn create(pool: &PgPool, user: &User, form: BuildForm) -> Result<Detail, ServiceError> {
    load_components(pool, &form.component_ids).await?;

    let build = Build {
        user_id: user.id,
        title: form.title.trim().to_string(),
        description: form.description,
        ..Default::default()
    };
    let build = db::build::insert(pool, &build, &form.component_ids).await?;
    tracing::info!("User {} created build {}", user.id, build.id);

    detail(pool, build.id).await
}

pub async fn update(
    pool: &PgPool,
    user: &User,
    id: i32,
    form: BuildForm,
) -> Result<Detail, ServiceError> {
    let mut build = fetch(pool, id).await?;
    if build.user_id != user.id {
        return Err(ServiceError::Forbidden("Not your build".to_string()));
    }

    load_components(pool, &form.component_ids).await?;
    build.title = form.title.trim().to_string();
    build.description = form.description;
    db::build::update(pool, &build, &form.component_ids).await?;

    detail(pool, id).await
}

pub async fn delete(pool: &PgPool, user: &User, id: i32) -> Result<(), ServiceError> {
    let build = fetch(pool, id).await?;
    if build.user_id != user.id && !user.is_admin() {
        return Err(ServiceError::Forbidden("Not your build".to_string()));
    }
    db::build::delete(pool, id).await?;
    tracing::info!("User {} deleted build {}", user.id, id);
    Ok(())
}

pub(crate) async fn fetch(pool: &PgPool, id: i32) -> Result<Build, ServiceError> {
    db::build::fetch(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Build"))
}

async fn detail(pool: &PgPool, id: i32) -> Result<Detail, ServiceError> {
    let summary = db::build::fetch_summary(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Build"))?;
    let components = db::build::components(pool, id).await?;
    Ok(Detail::new(summary, components))
}

pub fn viewer_key(user: Option<&User>, ip: Option<&str>) -> String {
    match (user, ip) {
        (Some(user), _) => format!("u{}", user.id),
        (None, Some(ip)) => format!("ip{ip}"),
        (None, None) => "ipunknown".to_string(),
    }
}

/// Counts a view once per viewer per day.
async fn record_view(
    pool: &PgPool,
    cache: &dyn Cache,
    build_id: i32,
    user: Option<&User>,
    viewer: &str,
) -> Result<(), ServiceError> {
    let marker = format!("build_view:{build_id}:{viewer}");
    match cache.set_if_absent(&marker, "1".to_string(), Some(VIEW_TTL)).await {
        Ok(true) => {
            db::view::insert(pool, build_id, user.map(|user| user.id), viewer).await?;
        }
        Ok(false) => {}
        Err(err) => tracing::warn!("View dedup marker failed, view not counted: {}", err),
    }
    Ok(())
}

pub async fn view(
    pool: &PgPool,
    cache: &dyn Cache,
    id: i32,
    user: Option<&User>,
    ip: Option<&str>,
) -> Result<Detail, ServiceError> {
    fetch(pool, id).await?;
    record_view(pool, cache, id, user, &viewer_key(user, ip)).await?;
    detail(pool, id).await
}

pub async fn list(
    pool: &PgPool,
    filter: &BuildFilter,
    pagination: &Pagination,
) -> Result<(Vec<BuildSummary>, i64), ServiceError> {
    Ok(db::build::list(pool, filter, pagination).await?)
}

pub async fn list_mine(
    pool: &PgPool,
    user: &User,
    pagination: &Pagination,
) -> Result<(Vec<BuildSummary>, i64), ServiceError> {
    let filter = BuildFilter {
        author_id: Some(user.id),
        ..Default::default()
    };
    list(pool, &filter, pagination).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(id: i32, category: ComponentCategory) -> Component {
        Component {
            id,
            category,
            ..Default::default()
        }
    }

    fn complete_set() -> Vec<Component> {
        ComponentCategory::MANDATORY
            .iter()
            .enumerate()
            .map(|(i, category)| component(i as i32 + 1, *category))
            .chain(std::iter::once(component(100, ComponentCategory::Ssd)))
            .collect()
    }

    #[test]
    fn complete_build_has_nothing_missing() {
        assert!(missing_categories(&complete_set()).is_empty());
    }

    #[test]
    fn hdd_counts_as_storage() {
        let mut components = complete_set();
        components.pop();
        components.push(component(101, ComponentCategory::Hdd));
        assert!(missing_categories(&components).is_empty());
    }

    #[test]
    fn missing_storage_is_reported() {
        let mut components = complete_set();
        components.pop();
        assert_eq!(missing_categories(&components), vec!["storage (SSD or HDD)"]);
    }

    #[test]
    fn missing_mandatory_categories_are_listed_in_order() {
        let components = vec![
            component(1, ComponentCategory::Cpu),
            component(2, ComponentCategory::Ram),
            component(3, ComponentCategory::Hdd),
        ];
        assert_eq!(
            missing_categories(&components),
            vec!["GPU", "MOTHERBOARD", "PSU", "CASE", "COOLER"]
        );
    }

    #[test]
    fn viewer_key_prefers_user() {
        let user = User {
            id: 9,
            ..Default::default()
        };
        assert_eq!(viewer_key(Some(&user), Some("10.0.0.1")), "u9");
        assert_eq!(viewer_key(None, Some("10.0.0.1")), "ip10.0.0.1");
        assert_eq!(viewer_key(None, None), "ipunknown");
    }

    #[tokio::test]
    async fn repeated_views_are_not_recorded_twice() {
        use crate::helpers::MemoryCache;

        let cache = MemoryCache::new();
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        // marker already present: no DB write is attempted
        cache
            .set("build_view:5:u1", "1".to_string(), None)
            .await
            .unwrap();
        let user = User {
            id: 1,
            ..Default::default()
        };
        assert!(record_view(&pool, &cache, 5, Some(&user), "u1").await.is_ok());
    }
}
