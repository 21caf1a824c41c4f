use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum AttributeType {
    Unused,
    StandardInformation,
    AttributeList,
    FileName,
    ObjectId,
    SecurityDescriptor,
    VolumeName,
    VolumeInformation,
    Data,
    IndexRoot,
    IndexAllocation,
    Bitmap,
    ReparsePoint,
    EaInformation,
    Ea,
    LoggedUtilityStream,
    FirstUserDefinedAttribute,
    End,
}

impl AttributeType {
    /// Map a raw NTFS attribute type code to its enum value
    pub fn from_code(code: u32) -> Self {
        match code {
            0x0 => AttributeType::Unused,
            0x10 => AttributeType::StandardInformation,
            0x20 => AttributeType::AttributeList,
            0x30 => AttributeType::FileName,
            0x40 => AttributeType::ObjectId,
            0x50 => AttributeType::SecurityDescriptor,
            0x60 => AttributeType::VolumeName,
            0x70 => AttributeType::VolumeInformation,
            0x80 => AttributeType::Data,
            0x90 => AttributeType::IndexRoot,
            0xa0 => AttributeType::IndexAllocation,
            0xb0 => AttributeType::Bitmap,
            0xc0 => AttributeType::ReparsePoint,
            0xd0 => AttributeType::EaInformation,
            0xe0 => AttributeType::Ea,
            0x100 => AttributeType::LoggedUtilityStream,
            0x1000 => AttributeType::FirstUserDefinedAttribute,
            _ => AttributeType::End,
        }
    }

    /// Canonical NTFS flag name for the attribute type
    pub fn as_ntfs_flag(&self) -> &'static str {
        match self {
            AttributeType::Unused => "$UNUSED",
            AttributeType::StandardInformation => "$STANDARD_INFORMATION",
            AttributeType::AttributeList => "$ATTRIBUTE_LIST",
            AttributeType::FileName => "$FILE_NAME",
            AttributeType::ObjectId => "$OBJECT_ID",
            AttributeType::SecurityDescriptor => "$SECURITY_DESCRIPTOR",
            AttributeType::VolumeName => "$VOLUME_NAME",
            AttributeType::VolumeInformation => "$VOLUME_INFORMATION",
            AttributeType::Data => "$DATA",
            AttributeType::IndexRoot => "$INDEX_ROOT",
            AttributeType::IndexAllocation => "$INDEX_ALLOCATION",
            AttributeType::Bitmap => "$BITMAP",
            AttributeType::ReparsePoint => "$REPARSE_POINT",
            AttributeType::EaInformation => "$EA_INFORMATION",
            AttributeType::Ea => "$EA",
            AttributeType::LoggedUtilityStream => "$LOGGED_UTILITY_STREAM",
            AttributeType::FirstUserDefinedAttribute => "$FIRST_USER_DEFINED_ATTRIBUTE",
            AttributeType::End => "$END",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AttributeType;

    #[test]
    fn test_from_code() {
        assert_eq!(AttributeType::from_code(0x80), AttributeType::Data);
        assert_eq!(AttributeType::from_code(0x30), AttributeType::FileName);
        assert_eq!(AttributeType::from_code(0xbeef), AttributeType::End);
    }

    #[test]
    fn test_as_ntfs_flag() {
        assert_eq!(AttributeType::Data.as_ntfs_flag(), "$DATA");
        assert_eq!(
            AttributeType::StandardInformation.as_ntfs_flag(),
            "$STANDARD_INFORMATION"
        );
    }
}
