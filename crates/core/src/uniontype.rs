//! Runtime-checked tagged unions: closed variant sets declared as data.
//!
//! `build_union_type` takes a type name and an ordered list of
//! (variant name, field names) pairs and produces a [`UnionType`] descriptor
//! plus one [`Constructor`] per variant, in declaration order. Values are
//! immutable [`UnionValue`]s carrying an integer discriminant (the variant's
//! declaration index) and a payload holding exactly that variant's fields.
//!
//! Field access is variant-guarded: reading a field that belongs to a
//! different variant fails with a [`FieldAccessError`] naming the type, the
//! value's actual variant, and the requested field. It never falls through to
//! a foreign field that happens to share the name.
//!
//! The variant table is written once at definition time and shared read-only
//! behind an `Arc`, so descriptors, constructors, and values are freely
//! cloneable and shareable across threads without synchronization.

use std::fmt;
use std::sync::Arc;

use crate::error::{ConstructionError, DefinitionError, FieldAccessError, InternalError};

#[derive(Debug)]
struct VariantInfo {
    name: String,
    fields: Vec<String>,
}

#[derive(Debug)]
struct TypeInfo {
    name: String,
    variants: Vec<VariantInfo>,
}

/// Descriptor for one union type: the name and the ordered variant table.
///
/// Cloning is cheap (a shared handle). Two descriptors denote the same union
/// type only if they originate from the same `build_union_type` call.
#[derive(Debug, Clone)]
pub struct UnionType {
    info: Arc<TypeInfo>,
}

impl UnionType {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn variant_count(&self) -> usize {
        self.info.variants.len()
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.info.variants.iter().map(|v| v.name.as_str())
    }

    /// Declared field names of the variant at `discriminant`, if in range.
    pub fn fields_of(&self, discriminant: usize) -> Option<&[String]> {
        self.info
            .variants
            .get(discriminant)
            .map(|v| v.fields.as_slice())
    }

    /// Look up a variant's constructor by name.
    pub fn constructor(&self, variant_name: &str) -> Option<Constructor> {
        self.info
            .variants
            .iter()
            .position(|v| v.name == variant_name)
            .map(|discriminant| Constructor {
                ty: self.clone(),
                discriminant,
            })
    }

    /// Whether two descriptors denote the same union type (same definition).
    pub fn same_type(&self, other: &UnionType) -> bool {
        Arc::ptr_eq(&self.info, &other.info)
    }
}

/// Define a union type from an ordered list of (variant name, field names).
///
/// The Nth declared variant receives discriminant N; that ordering is part of
/// the contract (it fixes constructor order and display order). Returns the
/// descriptor and the constructors in declaration order.
///
/// Fails with [`DefinitionError`] if `variant_specs` is empty without
/// `allow_empty`, or if a variant name or a field name within one variant is
/// declared twice. With `allow_empty`, an empty spec list yields a type with
/// no valid values and an empty constructor list.
pub fn build_union_type(
    type_name: &str,
    variant_specs: &[(&str, &[&str])],
    allow_empty: bool,
) -> Result<(UnionType, Vec<Constructor>), DefinitionError> {
    if !allow_empty && variant_specs.is_empty() {
        return Err(DefinitionError::NoVariants {
            type_name: type_name.to_string(),
        });
    }

    let mut variants = Vec::with_capacity(variant_specs.len());
    for (variant_name, fields) in variant_specs {
        if variants.iter().any(|v: &VariantInfo| v.name == *variant_name) {
            return Err(DefinitionError::DuplicateVariant {
                type_name: type_name.to_string(),
                variant: variant_name.to_string(),
            });
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].contains(field) {
                return Err(DefinitionError::DuplicateField {
                    type_name: type_name.to_string(),
                    variant: variant_name.to_string(),
                    field: field.to_string(),
                });
            }
        }
        variants.push(VariantInfo {
            name: variant_name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
    }

    let ty = UnionType {
        info: Arc::new(TypeInfo {
            name: type_name.to_string(),
            variants,
        }),
    };
    let constructors = (0..ty.variant_count())
        .map(|discriminant| Constructor {
            ty: ty.clone(),
            discriminant,
        })
        .collect();
    Ok((ty, constructors))
}

/// Constructor for one variant of a union type.
///
/// Also serves as that variant's predicate and field accessor object:
/// [`Constructor::matches`] is the `is_<Variant>` check and
/// [`Constructor::field`] is the (variant, field)-keyed guarded read.
#[derive(Debug, Clone)]
pub struct Constructor {
    ty: UnionType,
    discriminant: usize,
}

impl Constructor {
    pub fn union_type(&self) -> &UnionType {
        &self.ty
    }

    pub fn discriminant(&self) -> usize {
        self.discriminant
    }

    pub fn name(&self) -> &str {
        &self.variant().name
    }

    pub fn field_names(&self) -> &[String] {
        &self.variant().fields
    }

    fn variant(&self) -> &VariantInfo {
        &self.ty.info.variants[self.discriminant]
    }

    /// Construct a value from positional arguments only.
    pub fn positional<T>(&self, values: Vec<T>) -> Result<UnionValue<T>, ConstructionError> {
        self.construct(values, Vec::new())
    }

    /// Construct a value from named arguments only.
    pub fn named<T>(&self, fields: Vec<(&str, T)>) -> Result<UnionValue<T>, ConstructionError> {
        self.construct(Vec::new(), fields)
    }

    /// Construct a value from positional arguments followed by named ones.
    ///
    /// The combined argument count must equal the variant's declared field
    /// count; every named identifier must belong to this variant; a field
    /// supplied both positionally and by name (or by name twice) is rejected.
    /// Positional arguments fill fields in declared order, named arguments
    /// fill the rest by name.
    pub fn construct<T>(
        &self,
        positional: Vec<T>,
        named: Vec<(&str, T)>,
    ) -> Result<UnionValue<T>, ConstructionError> {
        let variant = self.variant();
        let expected = variant.fields.len();
        let got = positional.len() + named.len();
        if got != expected {
            return Err(ConstructionError::ArityMismatch {
                type_name: self.ty.name().to_string(),
                variant: variant.name.clone(),
                expected,
                got,
            });
        }

        let mut slots: Vec<Option<T>> = positional.into_iter().map(Some).collect();
        slots.resize_with(expected, || None);
        for (field, value) in named {
            let index = variant
                .fields
                .iter()
                .position(|f| f == field)
                .ok_or_else(|| ConstructionError::UnknownField {
                    type_name: self.ty.name().to_string(),
                    variant: variant.name.clone(),
                    field: field.to_string(),
                })?;
            if slots[index].is_some() {
                return Err(ConstructionError::DuplicateField {
                    type_name: self.ty.name().to_string(),
                    variant: variant.name.clone(),
                    field: field.to_string(),
                });
            }
            slots[index] = Some(value);
        }

        // Counts match and every named argument landed in a distinct empty
        // slot, so all slots are filled.
        let payload: Vec<T> = slots.into_iter().flatten().collect();
        debug_assert_eq!(payload.len(), expected);

        Ok(UnionValue {
            ty: self.ty.clone(),
            discriminant: self.discriminant,
            payload,
        })
    }

    /// True iff `value` belongs to the same union type and holds this variant.
    pub fn matches<T>(&self, value: &UnionValue<T>) -> bool {
        self.ty.same_type(&value.ty) && self.discriminant == value.discriminant
    }

    /// Guarded read of this variant's field `name` out of `value`.
    ///
    /// Checks the runtime discriminant on every call; a value holding any
    /// other variant fails even if that variant declares a same-named field.
    pub fn field<'a, T>(
        &self,
        value: &'a UnionValue<T>,
        name: &str,
    ) -> Result<&'a T, FieldAccessError> {
        if !self.matches(value) {
            return Err(FieldAccessError::NoSuchField {
                type_name: value.ty.name().to_string(),
                variant: value.variant_name().to_string(),
                field: name.to_string(),
            });
        }
        value.get(name)
    }
}

/// An immutable value of a union type: one variant's discriminant plus its
/// payload, in declared field order.
#[derive(Debug, Clone)]
pub struct UnionValue<T> {
    ty: UnionType,
    discriminant: usize,
    payload: Vec<T>,
}

impl<T> UnionValue<T> {
    pub fn union_type(&self) -> &UnionType {
        &self.ty
    }

    pub fn discriminant(&self) -> usize {
        self.discriminant
    }

    fn variant(&self) -> &VariantInfo {
        &self.ty.info.variants[self.discriminant]
    }

    /// Declared name of the variant this value holds.
    pub fn variant_name(&self) -> &str {
        &self.variant().name
    }

    /// True iff this value holds the variant named `variant_name`.
    /// A name not declared on the union never matches.
    pub fn is(&self, variant_name: &str) -> bool {
        self.variant().name == variant_name
    }

    /// Tag-only equality: compares discriminants, ignores payloads.
    /// Distinct from `==`, which also compares payloads structurally.
    pub fn is_same_variant(&self, other: &UnionValue<T>) -> bool {
        self.discriminant == other.discriminant
    }

    /// Variant-guarded field read. Fails unless the value's current variant
    /// declares `field`; never returns a foreign variant's field.
    pub fn get(&self, field: &str) -> Result<&T, FieldAccessError> {
        let variant = self.variant();
        variant
            .fields
            .iter()
            .position(|f| f == field)
            .map(|i| &self.payload[i])
            .ok_or_else(|| FieldAccessError::NoSuchField {
                type_name: self.ty.name().to_string(),
                variant: variant.name.clone(),
                field: field.to_string(),
            })
    }

    /// Payload values in declared field order.
    pub fn as_tuple(&self) -> &[T] {
        &self.payload
    }

    /// Alias for [`UnionValue::as_tuple`].
    pub fn get_values(&self) -> &[T] {
        self.as_tuple()
    }

    /// (field name, value) pairs in declared field order.
    pub fn as_dict(&self) -> Vec<(&str, &T)> {
        self.variant()
            .fields
            .iter()
            .map(String::as_str)
            .zip(self.payload.iter())
            .collect()
    }

    /// Canonical rendering `Variant(field1=value1, ...)` in declared order.
    ///
    /// Fails with [`InternalError::BadDiscriminant`] if the discriminant is
    /// outside the variant table; unreachable through the public API, kept as
    /// a consistency check.
    pub fn render(&self) -> Result<String, InternalError>
    where
        T: fmt::Debug,
    {
        let variant = self.ty.info.variants.get(self.discriminant).ok_or(
            InternalError::BadDiscriminant {
                type_name: self.ty.name().to_string(),
                discriminant: self.discriminant,
                variant_count: self.ty.variant_count(),
            },
        )?;
        let fields = variant
            .fields
            .iter()
            .zip(self.payload.iter())
            .map(|(name, value)| format!("{}={:?}", name, value))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("{}({})", variant.name, fields))
    }
}

impl<T: Clone> UnionValue<T> {
    /// New value of the same variant with the named fields overwritten and
    /// all other fields copied unchanged. The original is unmodified.
    ///
    /// A field name not declared on the current variant fails like an unknown
    /// constructor argument; naming the same field twice is rejected.
    pub fn replace(&self, changes: Vec<(&str, T)>) -> Result<UnionValue<T>, ConstructionError> {
        let variant = self.variant();
        let mut payload = self.payload.clone();
        let mut touched = vec![false; payload.len()];
        for (field, value) in changes {
            let index = variant
                .fields
                .iter()
                .position(|f| f == field)
                .ok_or_else(|| ConstructionError::UnknownField {
                    type_name: self.ty.name().to_string(),
                    variant: variant.name.clone(),
                    field: field.to_string(),
                })?;
            if touched[index] {
                return Err(ConstructionError::DuplicateField {
                    type_name: self.ty.name().to_string(),
                    variant: variant.name.clone(),
                    field: field.to_string(),
                });
            }
            touched[index] = true;
            payload[index] = value;
        }
        Ok(UnionValue {
            ty: self.ty.clone(),
            discriminant: self.discriminant,
            payload,
        })
    }
}

/// Structural equality: discriminant and payload. Tag-only comparison is
/// [`UnionValue::is_same_variant`].
impl<T: PartialEq> PartialEq for UnionValue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.discriminant == other.discriminant && self.payload == other.payload
    }
}

impl<T: Eq> Eq for UnionValue<T> {}

impl<T: fmt::Debug> fmt::Display for UnionValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.render().map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}
