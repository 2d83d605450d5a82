use log::*;

use crate::{db_types::WalkForm, traits::ReferenceData};

/// `max(1, form × temperature)`.
pub fn total_multiplier(form_coefficient: i64, temperature_coefficient: i64) -> i64 {
    form_coefficient.saturating_mul(temperature_coefficient).max(1)
}

/// Looks up the multiplier for a walk. An unknown temperature, or a lookup failure, counts as a coefficient of 1.
pub async fn multiplier_for<R: ReferenceData>(db: &R, form: WalkForm, temp_c: Option<i64>) -> i64 {
    let form_coefficient = db.walk_form_coefficient(form).await.unwrap_or_else(|e| {
        warn!("🚶️ Could not read the {form} walk coefficient: {e}. Using 1.");
        1
    });
    let temperature_coefficient = match temp_c {
        None => 1,
        Some(t) => db.temperature_coefficient(form, t).await.unwrap_or_else(|e| {
            warn!("🚶️ Could not read the {form} temperature coefficient for {t}°C: {e}. Using 1.");
            1
        }),
    };
    let result = total_multiplier(form_coefficient, temperature_coefficient);
    trace!("🚶️ Multiplier for {form} at {temp_c:?}°C: {form_coefficient} × {temperature_coefficient} → {result}");
    result
}
