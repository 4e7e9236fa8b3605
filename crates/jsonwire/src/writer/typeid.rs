//! Polymorphic type-id wrapper protocol.
//!
//! Data-binding layers that embed type information delegate the physical
//! layout to the generator: [`Generator::write_type_prefix`] synthesizes the
//! wrapper structure (and the value's own start marker, when the value is a
//! container), and [`Generator::write_type_suffix`] unwinds it symmetrically.
//! The [`TypeId`] passed to the prefix call records what was actually written
//! so the suffix call needs no further decisions.

use std::io::Write;

use super::Generator;
use crate::{error::Result, token::Token};

/// Where the type id is physically placed relative to the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeIdInclusion {
    /// As a regular property of the value object.
    Property,
    /// Value wrapped in `{ "<id>": <value> }`.
    WrapperObject,
    /// Value wrapped in `[ "<id>", <value> ]`.
    WrapperArray,
    /// As the first property of the value object (metadata, not data).
    Metadata,
    /// As a property alongside the payload properties.
    Payload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WrittenWrapper {
    Array,
    Object,
}

/// A type id to embed, plus the bookkeeping the prefix/suffix pair shares.
#[derive(Debug, Clone)]
pub struct TypeId {
    /// The type identifier text.
    pub id: String,
    /// Property name for the property-style inclusions.
    pub property: String,
    /// Requested placement.
    pub inclusion: TypeIdInclusion,
    /// Shape of the value being wrapped: `StartObject`, `StartArray`, or any
    /// scalar token.
    pub value_shape: Token,
    pub(crate) wrapper: Option<WrittenWrapper>,
}

impl TypeId {
    /// A type id with the given placement; `property` defaults to `"@type"`.
    #[must_use]
    pub fn new(id: impl Into<String>, inclusion: TypeIdInclusion, value_shape: Token) -> Self {
        TypeId {
            id: id.into(),
            property: "@type".to_owned(),
            inclusion,
            value_shape,
            wrapper: None,
        }
    }

    /// Same id, different property name.
    #[must_use]
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }
}

impl<W: Write> Generator<W> {
    /// Writes the type wrapper (and the value's start marker for container
    /// shapes). Property-style placements only exist for object values;
    /// other shapes degrade to a wrapper array.
    ///
    /// # Errors
    ///
    /// Generation errors for illegal call sequence, I/O errors from the sink.
    pub fn write_type_prefix(&mut self, type_id: &mut TypeId) -> Result<()> {
        let inclusion = match type_id.inclusion {
            inc @ (TypeIdInclusion::Property
            | TypeIdInclusion::Metadata
            | TypeIdInclusion::Payload)
                if type_id.value_shape == Token::StartObject =>
            {
                inc
            }
            TypeIdInclusion::WrapperObject => TypeIdInclusion::WrapperObject,
            _ => TypeIdInclusion::WrapperArray,
        };

        match inclusion {
            TypeIdInclusion::WrapperArray => {
                self.write_start_array()?;
                self.write_string(&type_id.id)?;
                type_id.wrapper = Some(WrittenWrapper::Array);
                self.write_value_shape_start(type_id.value_shape)
            }
            TypeIdInclusion::WrapperObject => {
                self.write_start_object()?;
                let id = type_id.id.clone();
                self.write_field_name(&id)?;
                type_id.wrapper = Some(WrittenWrapper::Object);
                self.write_value_shape_start(type_id.value_shape)
            }
            // All property placements stream the id as the first member; a
            // true trailing payload property is not expressible write-forward.
            TypeIdInclusion::Property | TypeIdInclusion::Metadata | TypeIdInclusion::Payload => {
                self.write_start_object()?;
                let (property, id) = (type_id.property.clone(), type_id.id.clone());
                self.write_field_name(&property)?;
                self.write_string(&id)?;
                type_id.wrapper = None;
                Ok(())
            }
        }
    }

    /// Closes the value (for container shapes) and the wrapper written by
    /// [`write_type_prefix`](Self::write_type_prefix).
    ///
    /// # Errors
    ///
    /// Generation errors for illegal call sequence, I/O errors from the sink.
    pub fn write_type_suffix(&mut self, type_id: &TypeId) -> Result<()> {
        match type_id.value_shape {
            Token::StartObject => self.write_end_object()?,
            Token::StartArray => self.write_end_array()?,
            _ => {}
        }
        match type_id.wrapper {
            Some(WrittenWrapper::Array) => self.write_end_array(),
            Some(WrittenWrapper::Object) => self.write_end_object(),
            None => Ok(()),
        }
    }

    fn write_value_shape_start(&mut self, shape: Token) -> Result<()> {
        match shape {
            Token::StartObject => self.write_start_object(),
            Token::StartArray => self.write_start_array(),
            // Scalar shapes: the caller writes the value itself next.
            _ => Ok(()),
        }
    }
}
