use super::sector_reader::SectorReader;
use crate::filesystem::error::FileSystemError;
use log::error;
use ntfs::{NtfsError, NtfsReadSeek, attribute_value::NtfsAttributeValue, structured_values::NtfsFileName};
use std::{fs::File, io::BufReader};

/// Return FILENAME attribute data
pub(crate) fn get_filename_attribute(
    filename_result: &Result<NtfsFileName, NtfsError>,
) -> Result<NtfsFileName, FileSystemError> {
    match filename_result {
        Ok(result) => Ok(result.clone()),
        Err(err) => {
            error!("[ntfs] Failed to get filename info, error: {err:?}");
            Err(FileSystemError::NoFilenameAttr)
        }
    }
}

/// Read a whole attribute value. This can be used to read a whole file
pub(crate) fn read_attribute_value(
    data_attr_value: &mut NtfsAttributeValue<'_, '_>,
    fs: &mut BufReader<SectorReader<File>>,
) -> Result<Vec<u8>, NtfsError> {
    let mut buff_data: Vec<u8> = Vec::new();
    loop {
        let temp_buff_size = 65536;
        let mut temp_buff: Vec<u8> = vec![0u8; temp_buff_size];
        let bytes = data_attr_value.read(fs, &mut temp_buff)?;

        let finished = 0;
        if bytes == finished {
            return Ok(buff_data);
        }

        // Make sure our temp buff does not have any extra zeros from the initialization
        if bytes < temp_buff_size {
            buff_data.append(&mut temp_buff[0..bytes].to_vec());
        } else {
            buff_data.append(&mut temp_buff);
        }
    }
}
