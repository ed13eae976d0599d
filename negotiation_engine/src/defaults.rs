//! Negotiation Engine — Core Parameter Defaults
//!
//! The seven core parameters in wizard order, with default weights
//! summing to 100.

use std::collections::BTreeMap;

use crate::domain::{ParameterDefinition, ParameterSource};

pub const TARGET_UNIT_PRICE: &str = "targetUnitPrice";
pub const MAX_ACCEPTABLE_PRICE: &str = "maxAcceptablePrice";
pub const VOLUME_DISCOUNT_EXPECTATION: &str = "volumeDiscountExpectation";
pub const PAYMENT_TERMS_RANGE: &str = "paymentTermsRange";
pub const DELIVERY_DATE: &str = "deliveryDate";
pub const WARRANTY_PERIOD: &str = "warrantyPeriod";
pub const QUALITY_STANDARDS: &str = "qualityStandards";

/// (id, display name, source, default weight)
const CORE_PARAMETERS: [(&str, &str, ParameterSource, u32); 7] = [
    (TARGET_UNIT_PRICE, "Target Unit Price", ParameterSource::CoreStep2, 35),
    (MAX_ACCEPTABLE_PRICE, "Max Acceptable Price", ParameterSource::CoreStep2, 20),
    (VOLUME_DISCOUNT_EXPECTATION, "Volume Discount Expectation", ParameterSource::CoreStep2, 10),
    (PAYMENT_TERMS_RANGE, "Payment Terms Range", ParameterSource::CoreStep2, 5),
    (DELIVERY_DATE, "Delivery Date", ParameterSource::CoreStep3, 15),
    (WARRANTY_PERIOD, "Warranty Period", ParameterSource::CoreStep3, 10),
    (QUALITY_STANDARDS, "Quality Standards", ParameterSource::CoreStep3, 5),
];

pub fn core_parameter_definitions() -> Vec<ParameterDefinition> {
    CORE_PARAMETERS
        .iter()
        .map(|(id, name, source, _)| ParameterDefinition::new(id, name, *source))
        .collect()
}

pub fn default_weight_table() -> BTreeMap<String, u32> {
    CORE_PARAMETERS
        .iter()
        .map(|(id, _, _, weight)| (id.to_string(), *weight))
        .collect()
}
