use retirement_core::EngineError;
use retirement_core::model::MarketRegime;

use crate::error::{ApiError, ApiResult};

pub fn validate_plan_name(name: &str) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::ValidationError {
            field: "name".to_string(),
            message: "plan name cannot be empty".to_string(),
        });
    }
    if name.len() > 200 {
        return Err(ApiError::ValidationError {
            field: "name".to_string(),
            message: "plan name cannot exceed 200 characters".to_string(),
        });
    }
    Ok(())
}

pub fn parse_regime(label: &str) -> ApiResult<MarketRegime> {
    MarketRegime::parse(label)
        .ok_or_else(|| EngineError::InvalidRegimeLabel(label.to_string()))
        .map_err(ApiError::from)
}

pub fn parse_band(label: &str) -> ApiResult<retirement_core::model::Band> {
    use retirement_core::model::Band;
    match label {
        "lower" => Ok(Band::Lower),
        "median" => Ok(Band::Median),
        "upper" => Ok(Band::Upper),
        _ => Err(ApiError::ValidationError {
            field: "band".to_string(),
            message: format!("unrecognized band '{label}', expected lower|median|upper"),
        }),
    }
}

/// §6 compare endpoint caps the batch at three plans.
pub fn validate_compare_plan_ids(plan_ids: &[String]) -> ApiResult<()> {
    if plan_ids.is_empty() || plan_ids.len() > 3 {
        return Err(ApiError::ValidationError {
            field: "plan_ids".to_string(),
            message: "must supply between 1 and 3 plan ids".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_name_rejects_empty_and_overlong() {
        assert!(validate_plan_name("Retirement at 62").is_ok());
        assert!(validate_plan_name("").is_err());
        assert!(validate_plan_name("   ").is_err());
        assert!(validate_plan_name(&"a".repeat(201)).is_err());
    }

    #[test]
    fn regime_label_round_trips() {
        assert_eq!(parse_regime("bear").unwrap(), MarketRegime::Bear);
        assert_eq!(parse_regime("bull").unwrap(), MarketRegime::Bull);
        assert_eq!(parse_regime("none").unwrap(), MarketRegime::None);
        assert!(parse_regime("bearish").is_err());
    }

    #[test]
    fn compare_plan_ids_cap_at_three() {
        assert!(validate_compare_plan_ids(&["a".into()]).is_ok());
        assert!(validate_compare_plan_ids(&[]).is_err());
        assert!(validate_compare_plan_ids(&["a".into(), "b".into(), "c".into(), "d".into()]).is_err());
    }
}
