//! SDP Attributes
//!
//! Attribute identifiers and the attribute list found at the top of every
//! service record: a sequence alternating a `UInt16` id and its value.

use super::element::DataElement;
use crate::error::DecodeError;

/// Attribute ID type
pub type AttributeId = u16;

/// Universal attribute IDs this crate reads or writes
pub mod universal_attributes {
    use super::AttributeId;

    /// Service Record Handle
    pub const SERVICE_RECORD_HANDLE: AttributeId = 0x0000;
    /// Service Class ID List
    pub const SERVICE_CLASS_ID_LIST: AttributeId = 0x0001;
    /// Service ID
    pub const SERVICE_ID: AttributeId = 0x0003;
    /// Protocol Descriptor List
    pub const PROTOCOL_DESCRIPTOR_LIST: AttributeId = 0x0004;
    /// Browse Group List
    pub const BROWSE_GROUP_LIST: AttributeId = 0x0005;
    /// Bluetooth Profile Descriptor List
    pub const BLUETOOTH_PROFILE_DESCRIPTOR_LIST: AttributeId = 0x0009;
}

/// Language-based attribute offsets, added to a language base ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum LanguageAttributeOffset {
    /// Service Name
    ServiceName = 0x0000,
    /// Service Description
    ServiceDescription = 0x0001,
    /// Provider Name
    ProviderName = 0x0002,
}

impl LanguageAttributeOffset {
    /// Attribute ID under the primary (English) language base
    #[must_use]
    pub const fn id(self) -> AttributeId {
        ENGLISH_LANGUAGE_BASE_ID + self as u16
    }
}

/// Standard Language Base ID for English
pub const ENGLISH_LANGUAGE_BASE_ID: AttributeId = 0x0100;

/// Attribute List Entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEntry {
    /// Attribute ID
    pub id: AttributeId,
    /// Attribute value
    pub value: DataElement,
}

impl AttributeEntry {
    /// Create new attribute entry
    #[must_use]
    pub const fn new(id: AttributeId, value: DataElement) -> Self {
        Self { id, value }
    }
}

/// Attribute List Parser
///
/// Walks the children of a decoded attribute list two at a time.
#[derive(Debug)]
pub struct AttributeListParser<'a> {
    items: &'a [DataElement],
    position: usize,
}

impl<'a> AttributeListParser<'a> {
    /// Create a parser over the children of an attribute list sequence
    #[must_use]
    pub const fn new(items: &'a [DataElement]) -> Self {
        Self { items, position: 0 }
    }

    /// Parse the next id/value pair
    ///
    /// # Errors
    /// Returns [`DecodeError::UnexpectedElement`] if an id is not a `UInt16`
    /// or has no value after it
    pub fn parse_next(&mut self) -> Result<Option<AttributeEntry>, DecodeError> {
        let Some(id) = self.items.get(self.position) else {
            return Ok(None);
        };
        let DataElement::UnsignedInt16(id) = *id else {
            return Err(DecodeError::UnexpectedElement {
                expected: "UInt16 attribute id",
            });
        };
        let value = self
            .items
            .get(self.position + 1)
            .ok_or(DecodeError::UnexpectedElement {
                expected: "attribute value",
            })?;
        self.position += 2;
        Ok(Some(AttributeEntry::new(id, value.clone())))
    }
}
