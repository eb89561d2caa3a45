//! Deterministic classification of deployed resources.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::urn::TypeToken;

/// Type token of the stack root resource.
pub const ROOT_STACK_TYPE: &str = "pulumi:pulumi:Stack";

const RESERVED_PACKAGE: &str = "pulumi";
const PROVIDERS_MODULE: &str = "providers";

/// The three mutually exclusive roles a resource plays in a deployed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    StackRoot,
    Provider,
    Managed,
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceClass::StackRoot => "stack_root",
            ResourceClass::Provider => "provider",
            ResourceClass::Managed => "managed",
        };
        f.write_str(name)
    }
}

/// Classify a type token.
///
/// - `StackRoot` for exactly `pulumi:pulumi:Stack`.
/// - `Provider` for any `pulumi:providers:<package>` token.
/// - `Managed` for everything else, including tokens that do not parse.
pub fn classify_type(token: TypeToken<'_>) -> ResourceClass {
    match token.parts() {
        Some((RESERVED_PACKAGE, RESERVED_PACKAGE, "Stack")) => ResourceClass::StackRoot,
        Some((RESERVED_PACKAGE, PROVIDERS_MODULE, _)) => ResourceClass::Provider,
        Some(_) | None => ResourceClass::Managed,
    }
}

/// True if `token` names a provider resource.
pub fn is_provider_type(token: TypeToken<'_>) -> bool {
    classify_type(token) == ResourceClass::Provider
}
