//! # Product Cache Commands
//!
//! Per-product caches filled from the product-extraction endpoint.
//!
//! Both caches are plain key-value maps: the chart stores whatever it is
//! given and returns it unchanged. Reads of an unknown product yield `None`.

use tracing::debug;

use dentalab_core::validation::{parse_extraction_types, validate_product_id};
use dentalab_core::{ExtractionType, ProductExtractions};

use crate::error::ApiError;
use crate::state::SelectionState;

/// Caches the extraction payload for a product, replacing any previous one.
///
/// ## Arguments
/// * `product_id` - Product identifier (trimmed, 1-100 characters)
/// * `data` - Payload from the product-extraction endpoint
pub async fn set_product_extractions(
    state: &SelectionState,
    product_id: String,
    data: ProductExtractions,
) -> Result<(), ApiError> {
    debug!(product_id = %product_id, extractions = data.extractions.len(), "set_product_extractions command");

    let product_id = validate_product_id(&product_id)?;
    state
        .update(|chart| chart.set_product_extractions(product_id, data))
        .await;
    Ok(())
}

pub async fn get_product_extractions(
    state: &SelectionState,
    product_id: String,
) -> Option<ProductExtractions> {
    debug!(product_id = %product_id, "get_product_extractions command");
    state.with_selection(|chart| chart.product_extractions(product_id.trim()).cloned())
}

pub async fn clear_product_extractions(state: &SelectionState, product_id: String) {
    debug!(product_id = %product_id, "clear_product_extractions command");
    state
        .update(|chart| chart.clear_product_extractions(product_id.trim()))
        .await;
}

/// Caches the default categories for a product.
///
/// ## Arguments
/// * `product_id` - Product identifier
/// * `extraction_types` - Display names or snake_case keys, in order
///
/// ## Returns
/// The parsed list as stored (duplicates dropped, order kept)
///
/// ## Errors
/// A single unknown name rejects the whole list.
pub async fn set_default_extraction_types(
    state: &SelectionState,
    product_id: String,
    extraction_types: Vec<String>,
) -> Result<Vec<ExtractionType>, ApiError> {
    debug!(
        product_id = %product_id,
        count = extraction_types.len(),
        "set_default_extraction_types command"
    );

    let product_id = validate_product_id(&product_id)?;
    let extraction_types = parse_extraction_types(extraction_types.as_slice())?;

    let stored = extraction_types.clone();
    state
        .update(|chart| chart.set_default_extraction_types(product_id, extraction_types))
        .await;
    Ok(stored)
}

pub async fn get_default_extraction_types(
    state: &SelectionState,
    product_id: String,
) -> Option<Vec<ExtractionType>> {
    debug!(product_id = %product_id, "get_default_extraction_types command");
    state.with_selection(|chart| {
        chart
            .default_extraction_types(product_id.trim())
            .map(<[ExtractionType]>::to_vec)
    })
}

pub async fn clear_default_extraction_types(state: &SelectionState, product_id: String) {
    debug!(product_id = %product_id, "clear_default_extraction_types command");
    state
        .update(|chart| chart.clear_default_extraction_types(product_id.trim()))
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn payload() -> ProductExtractions {
        ProductExtractions {
            extractions: vec![json!({"name": "Missing teeth", "color": "#e11d48"})],
            has_extraction: Some(true),
            extraction_options: Some(json!({"allowImplant": false})),
        }
    }

    #[tokio::test]
    async fn test_product_extractions_are_isolated_per_product() {
        let state = SelectionState::default();
        set_product_extractions(&state, "p1".to_string(), payload())
            .await
            .unwrap();

        assert_eq!(get_product_extractions(&state, "p1".to_string()).await, Some(payload()));
        assert_eq!(get_product_extractions(&state, "p2".to_string()).await, None);

        clear_product_extractions(&state, "p1".to_string()).await;
        assert_eq!(get_product_extractions(&state, "p1".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_blank_product_id_is_rejected() {
        let state = SelectionState::default();
        let err = set_product_extractions(&state, "   ".to_string(), payload())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_default_extraction_types() {
        let state = SelectionState::default();

        let stored = set_default_extraction_types(
            &state,
            "crown-01".to_string(),
            vec![
                "Prepped".to_string(),
                "missing_teeth".to_string(),
                "prepped".to_string(),
            ],
        )
        .await
        .unwrap();
        assert_eq!(stored, vec![ExtractionType::Prepped, ExtractionType::MissingTeeth]);
        assert_eq!(
            get_default_extraction_types(&state, "crown-01".to_string()).await,
            Some(stored)
        );

        clear_default_extraction_types(&state, "crown-01".to_string()).await;
        assert_eq!(get_default_extraction_types(&state, "crown-01".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_unknown_default_type_rejects_whole_list() {
        let state = SelectionState::default();
        let err = set_default_extraction_types(
            &state,
            "crown-01".to_string(),
            vec!["Implant".to_string(), "Bridge".to_string()],
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get_default_extraction_types(&state, "crown-01".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_caches_survive_clear_all_selections() {
        let state = SelectionState::default();
        set_product_extractions(&state, "p1".to_string(), payload())
            .await
            .unwrap();
        crate::commands::clear_all_selections(&state).await;
        assert!(get_product_extractions(&state, "p1".to_string()).await.is_some());
    }
}
