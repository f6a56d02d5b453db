use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::require_user;
use crate::error::LedgerResult;
use crate::models::category::{Category, CreateCategory};
use crate::store::Store;

/// Lists global categories plus the user's private ones, by name
pub async fn list_categories<S>(store: &S, user_id: Uuid) -> LedgerResult<Vec<Category>>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    Ok(store.list_categories_for(user_id).await?)
}

/// Creates a category private to the user
pub async fn create_category<S>(
    store: &S,
    user_id: Uuid,
    input: CreateCategory,
) -> LedgerResult<Category>
where
    S: Store + ?Sized,
{
    require_user(store, user_id).await?;
    input.validate()?;

    let category = store.create_category(Some(user_id), &input).await?;

    info!(user_id = %user_id, category_id = %category.id, "Category created");
    Ok(category)
}
