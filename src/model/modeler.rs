//! Annotation-to-model mapping.
//!
//! # Responsibilities
//! - Resolve the full annotation key for each declared field
//! - Check values against the field's constraint
//! - Hand accepted values to the field's setter
//!
//! # Design Decisions
//! - Keys are `<prefix>/<context>.<field>` when a context is given,
//!   `<prefix>/<field>` otherwise
//! - Absent annotations leave the field at its default
//! - The first constraint violation fails the whole mapping

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Binding between one annotation and one field of `T`.
pub struct Field<T> {
    /// Annotation key, relative to the modeler prefix and context.
    pub key: &'static str,
    /// Pattern the raw value must match, if any.
    pub constraint: Option<&'static LazyLock<Regex>>,
    /// Stores an accepted value into the target.
    pub apply: fn(&mut T, &str),
}

/// Types that can be populated from an annotation map.
pub trait Annotated: Sized + 'static {
    /// Declarative field table for this type.
    fn fields() -> &'static [Field<Self>];
}

/// Maps annotation maps onto [`Annotated`] types under a fixed key prefix.
#[derive(Debug, Clone, Copy)]
pub struct Modeler {
    prefix: &'static str,
}

impl Modeler {
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    /// Full annotation key for `field` within `context`.
    pub fn annotation_key(&self, context: &str, field: &str) -> String {
        if context.is_empty() {
            format!("{}/{}", self.prefix, field)
        } else {
            format!("{}/{}.{}", self.prefix, context, field)
        }
    }

    /// Copy every declared field found in `annotations` into `dst`.
    pub fn map_to_model<T: Annotated>(
        &self,
        annotations: &BTreeMap<String, String>,
        context: &str,
        dst: &mut T,
    ) -> Result<()> {
        for field in T::fields() {
            let key = self.annotation_key(context, field.key);
            let Some(value) = annotations.get(&key) else {
                continue;
            };

            if let Some(constraint) = field.constraint {
                if !constraint.is_match(value) {
                    return Err(Error::Validation {
                        key,
                        value: value.clone(),
                    });
                }
            }

            (field.apply)(dst, value);
        }
        Ok(())
    }
}
