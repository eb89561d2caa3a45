//! Resource identities.
//!
//! A URN has the shape `urn:pulumi:<stack>::<project>::<qualified-type>::<name>`
//! where `<qualified-type>` is the `$`-joined chain of parent types ending in
//! the resource's own type token. Hand-written fixtures may use the shorthand
//! `<type>::<name>`, where the bare type `stack` stands for the stack root.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::core::classifier::ROOT_STACK_TYPE;

const URN_PREFIX: &str = "urn:pulumi:";
const SEPARATOR: &str = "::";
/// Shorthand type of the stack root, e.g. `stack::root`.
const SHORTHAND_STACK_TYPE: &str = "stack";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrnError {
    #[error("invalid urn '{urn}': {reason}")]
    Invalid { urn: String, reason: &'static str },
}

/// Parsed resource identity. Ordering and equality use the full URN text.
#[derive(Debug, Clone)]
pub struct Urn {
    raw: String,
    stack: String,
    project: String,
    qualified_type: String,
    name: String,
}

impl Urn {
    pub fn parse(raw: &str) -> Result<Self, UrnError> {
        let invalid = |reason| UrnError::Invalid {
            urn: raw.to_string(),
            reason,
        };

        let shorthand = !raw.starts_with(URN_PREFIX);
        let (stack, project, rest) = match raw.strip_prefix(URN_PREFIX) {
            Some(body) => {
                let (stack, rest) = body
                    .split_once(SEPARATOR)
                    .ok_or_else(|| invalid("missing project"))?;
                let (project, rest) = rest
                    .split_once(SEPARATOR)
                    .ok_or_else(|| invalid("missing type"))?;
                (stack, project, rest)
            }
            None => ("", "", raw),
        };

        let (qualified_type, name) = rest
            .split_once(SEPARATOR)
            .ok_or_else(|| invalid("missing name"))?;
        if qualified_type.is_empty() {
            return Err(invalid("empty type"));
        }
        if name.is_empty() {
            return Err(invalid("empty name"));
        }
        // The raw text keeps `stack`, so ordering still sees the identity as written.
        let qualified_type = if shorthand && qualified_type == SHORTHAND_STACK_TYPE {
            ROOT_STACK_TYPE
        } else {
            qualified_type
        };

        Ok(Self {
            raw: raw.to_string(),
            stack: stack.to_string(),
            project: project.to_string(),
            qualified_type: qualified_type.to_string(),
            name: name.to_string(),
        })
    }

    /// Build a full URN from its parts.
    pub fn new(stack: &str, project: &str, qualified_type: &str, name: &str) -> Self {
        Self {
            raw: format!("{URN_PREFIX}{stack}::{project}::{qualified_type}::{name}"),
            stack: stack.to_string(),
            project: project.to_string(),
            qualified_type: qualified_type.to_string(),
            name: name.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Parent types and own type, `$`-joined.
    pub fn qualified_type(&self) -> &str {
        &self.qualified_type
    }

    /// The resource's own type token (last element of the qualified type).
    pub fn type_token(&self) -> TypeToken<'_> {
        let own = self
            .qualified_type
            .rsplit('$')
            .next()
            .unwrap_or(&self.qualified_type);
        TypeToken::new(own)
    }

    /// Type token of the enclosing parent, if any.
    pub fn parent_type(&self) -> Option<TypeToken<'_>> {
        let (parents, _) = self.qualified_type.rsplit_once('$')?;
        let parent = parents.rsplit('$').next().unwrap_or(parents);
        Some(TypeToken::new(parent))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Urn {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Urn {}

impl PartialOrd for Urn {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Urn {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl std::hash::Hash for Urn {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Urn {
    type Err = UrnError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl Serialize for Urn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Urn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A `package:module:Name` type token borrowed from a URN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeToken<'a> {
    raw: &'a str,
}

impl<'a> TypeToken<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// `(package, module, name)` when the token is well formed.
    ///
    /// Provider tokens have only two colons before the provider package, e.g.
    /// `pulumi:providers:kubernetes`, which splits as module `providers` and
    /// name `kubernetes`.
    pub fn parts(&self) -> Option<(&'a str, &'a str, &'a str)> {
        let mut parts = self.raw.splitn(3, ':');
        let package = parts.next()?;
        let module = parts.next()?;
        let name = parts.next()?;
        if package.is_empty() || name.is_empty() {
            return None;
        }
        Some((package, module, name))
    }
}

impl fmt::Display for TypeToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_urn() {
        let urn =
            Urn::parse("urn:pulumi:dev::get::kubernetes:core/v1:Pod::kube-dashboard").expect("urn");
        assert_eq!(urn.stack(), "dev");
        assert_eq!(urn.project(), "get");
        assert_eq!(urn.type_token().as_str(), "kubernetes:core/v1:Pod");
        assert_eq!(urn.name(), "kube-dashboard");
        assert_eq!(urn.parent_type(), None);
    }

    #[test]
    fn parses_qualified_type_chain() {
        let urn = Urn::parse(
            "urn:pulumi:dev::helm::kubernetes:helm.sh/v2:Chart$kubernetes:core/v1:Service::simple-nginx-nginx-lego",
        )
        .expect("urn");
        assert_eq!(urn.type_token().as_str(), "kubernetes:core/v1:Service");
        assert_eq!(
            urn.parent_type().map(|token| token.as_str()),
            Some("kubernetes:helm.sh/v2:Chart")
        );
    }

    #[test]
    fn name_may_contain_separator() {
        let urn = Urn::parse("urn:pulumi:dev::proj::pkg:mod:Res::ns::name").expect("urn");
        assert_eq!(urn.name(), "ns::name");
    }

    #[test]
    fn accepts_shorthand_identity() {
        let urn = Urn::parse("pulumi:providers:kubernetes::default").expect("urn");
        assert_eq!(urn.stack(), "");
        assert_eq!(urn.type_token().as_str(), "pulumi:providers:kubernetes");
        assert_eq!(urn.name(), "default");
    }

    #[test]
    fn shorthand_stack_is_root_type() {
        let urn = Urn::parse("stack::root").expect("urn");
        assert_eq!(urn.as_str(), "stack::root");
        assert_eq!(urn.type_token().as_str(), ROOT_STACK_TYPE);
        assert_eq!(urn.name(), "root");

        let full = Urn::parse("urn:pulumi:dev::proj::stack::root").expect("urn");
        assert_eq!(full.type_token().as_str(), "stack");
    }

    #[test]
    fn new_renders_full_form() {
        let urn = Urn::new("dev", "get", "pulumi:pulumi:Stack", "get-dev");
        assert_eq!(urn.as_str(), "urn:pulumi:dev::get::pulumi:pulumi:Stack::get-dev");
        assert_eq!(Urn::parse(urn.as_str()).expect("parse"), urn);
    }

    #[test]
    fn rejects_malformed_urns() {
        for raw in [
            "",
            "urn:pulumi:dev",
            "urn:pulumi:dev::proj",
            "no-separator",
            "::name",
            "type::",
        ] {
            assert!(Urn::parse(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn token_parts_split_on_first_two_colons() {
        assert_eq!(
            TypeToken::new("kubernetes:core/v1:Pod").parts(),
            Some(("kubernetes", "core/v1", "Pod"))
        );
        assert_eq!(
            TypeToken::new("pulumi:providers:kubernetes").parts(),
            Some(("pulumi", "providers", "kubernetes"))
        );
        assert_eq!(TypeToken::new("stack").parts(), None);
    }
}
