//! Centralized Rule IDs for ttnn-tidy.

/// Call sites: `nanobind_overload_t` wrapping a single overload.
pub const RULE_ID_NANOBIND_OVERLOAD: &str = "ttnn-nanobind-unnecessary-overload";
/// Naming: generic `operation_attributes_t` / `tensor_args_t` structs.
pub const RULE_ID_OPERATION_TYPE_NAMING: &str = "ttnn-operation-type-naming";
/// Aliases: `spec_return_value_t` / `tensor_return_value_t` spelling a canonical type.
pub const RULE_ID_RETURN_VALUE_ALIAS: &str = "ttnn-return-value-type-alias";

/// Every built-in rule id, in registration order.
pub const ALL_RULE_IDS: &[&str] = &[
    RULE_ID_NANOBIND_OVERLOAD,
    RULE_ID_OPERATION_TYPE_NAMING,
    RULE_ID_RETURN_VALUE_ALIAS,
];
