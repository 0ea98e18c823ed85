use crate::db;
use crate::forms::{ComponentFilter, EditComponent, NewComponent, Pagination};
use crate::models::{CategoryCount, Component, ComponentCategory};
use crate::services::ServiceError;
use sqlx::PgPool;

pub async fn list(
    pool: &PgPool,
    filter: &ComponentFilter,
    pagination: &Pagination,
) -> Result<(Vec<Component>, i64), ServiceError> {
    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        if min > max {
            return Err(ServiceError::Validation(
                "min_price is greater than max_price".to_string(),
            ));
        }
    }
    Ok(db::component::list(pool, filter, pagination).await?)
}

/// Every category with its component count, including empty ones.
pub async fn categories(pool: &PgPool) -> Result<Vec<CategoryCount>, ServiceError> {
    let counts = db::component::category_counts(pool).await?;
    Ok(fill_categories(counts))
}

fn fill_categories(counts: Vec<CategoryCount>) -> Vec<CategoryCount> {
    ComponentCategory::ALL
        .iter()
        .map(|category| CategoryCount {
            category: *category,
            count: counts
                .iter()
                .find(|count| count.category == *category)
                .map_or(0, |count| count.count),
        })
        .collect()
}

pub async fn get(pool: &PgPool, id: i32) -> Result<Component, ServiceError> {
    db::component::fetch(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Component"))
}

pub async fn create(pool: &PgPool, form: NewComponent) -> Result<Component, ServiceError> {
    let component = Component {
        name: form.name.trim().to_string(),
        link: form.link,
        price: form.price,
        image: form.image,
        category: form.category,
        ..Default::default()
    };
    Ok(db::component::insert(pool, &component).await?)
}

pub async fn update(pool: &PgPool, id: i32, form: EditComponent) -> Result<Component, ServiceError> {
    let mut component = get(pool, id).await?;
    form.update(&mut component);
    Ok(db::component::update(pool, &component).await?)
}

pub async fn delete(pool: &PgPool, id: i32) -> Result<(), ServiceError> {
    if db::component::is_in_use(pool, id).await? {
        return Err(ServiceError::Conflict(
            "Component is used in builds".to_string(),
        ));
    }
    if !db::component::delete(pool, id).await? {
        return Err(ServiceError::not_found("Component"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_include_empty_ones() {
        let filled = fill_categories(vec![
            CategoryCount {
                category: ComponentCategory::Gpu,
                count: 12,
            },
            CategoryCount {
                category: ComponentCategory::Hdd,
                count: 3,
            },
        ]);

        assert_eq!(filled.len(), ComponentCategory::ALL.len());
        let gpu = filled
            .iter()
            .find(|c| c.category == ComponentCategory::Gpu)
            .unwrap();
        assert_eq!(gpu.count, 12);
        let cpu = filled
            .iter()
            .find(|c| c.category == ComponentCategory::Cpu)
            .unwrap();
        assert_eq!(cpu.count, 0);
    }
}
