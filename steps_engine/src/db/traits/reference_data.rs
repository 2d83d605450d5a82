use crate::{db_types::WalkForm, engine_api::errors::AccountApiError};

/// Read access to administrator-managed reference data, plus the key/value settings store.
#[allow(async_fn_in_trait)]
pub trait ReferenceData {
    /// The coefficient for the walk form, or 1 if none is configured.
    async fn walk_form_coefficient(&self, form: WalkForm) -> Result<i64, AccountApiError>;

    /// The coefficient of the first band for `form` whose inclusive `[min, max]` range contains `temp_c`, or 1 if no
    /// band matches.
    async fn temperature_coefficient(&self, form: WalkForm, temp_c: i64) -> Result<i64, AccountApiError>;

    async fn fetch_setting(&self, key: &str) -> Result<Option<String>, AccountApiError>;

    async fn store_setting(&self, key: &str, value: &str) -> Result<(), AccountApiError>;
}
