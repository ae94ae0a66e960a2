use dicom::core::{DataElement, PrimitiveValue, Tag, VR};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};
use dicom_dictionary_std::{tags, uids};
use std::path::Path;

/// Rescale written into every slice; decoding must ignore it.
pub const RESCALE_SLOPE: &str = "2";
pub const RESCALE_INTERCEPT: &str = "-1024";

pub struct SliceFile<'a> {
    pub series_uid: &'a str,
    pub instance: u32,
    pub rows: u16,
    pub columns: u16,
    pub content_time: Option<&'a str>,
    pub pixels: Vec<u16>,
}

fn text(tag: Tag, vr: VR, value: &str) -> DataElement<InMemDicomObject> {
    DataElement::new(tag, vr, PrimitiveValue::from(value))
}

fn short(tag: Tag, value: u16) -> DataElement<InMemDicomObject> {
    DataElement::new(tag, VR::US, PrimitiveValue::from(value))
}

/// Write a minimal uncompressed 16-bit MR slice.
pub fn write_slice(path: &Path, slice: &SliceFile<'_>) {
    let sop_uid = format!("{}.{}", slice.series_uid, slice.instance);
    let instance = slice.instance.to_string();
    let mut elements = vec![
        text(tags::SOP_CLASS_UID, VR::UI, uids::MR_IMAGE_STORAGE),
        text(tags::SOP_INSTANCE_UID, VR::UI, &sop_uid),
        text(tags::MODALITY, VR::CS, "MR"),
        text(tags::SERIES_INSTANCE_UID, VR::UI, slice.series_uid),
        text(tags::INSTANCE_NUMBER, VR::IS, &instance),
        text(tags::IMAGE_POSITION_PATIENT, VR::DS, "-10\\-20\\5"),
        text(tags::PIXEL_SPACING, VR::DS, "0.5\\0.25"),
        text(tags::RESCALE_INTERCEPT, VR::DS, RESCALE_INTERCEPT),
        text(tags::RESCALE_SLOPE, VR::DS, RESCALE_SLOPE),
        short(tags::SAMPLES_PER_PIXEL, 1),
        text(tags::PHOTOMETRIC_INTERPRETATION, VR::CS, "MONOCHROME2"),
        short(tags::ROWS, slice.rows),
        short(tags::COLUMNS, slice.columns),
        short(tags::BITS_ALLOCATED, 16),
        short(tags::BITS_STORED, 16),
        short(tags::HIGH_BIT, 15),
        short(tags::PIXEL_REPRESENTATION, 0),
        DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U16(slice.pixels.clone().into()),
        ),
    ];
    if let Some(time) = slice.content_time {
        elements.push(text(tags::CONTENT_TIME, VR::TM, time));
    }

    let object = InMemDicomObject::from_element_iter(elements);
    let file = object
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::MR_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(sop_uid),
        )
        .expect("should have built the file meta group");
    file.write_to_file(path)
        .expect("should have written the DICOM file");
}
