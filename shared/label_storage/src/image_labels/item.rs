//! Dynamo DB item encoding for annotation records
//!
//! Confidence values are written as Dynamo DB numbers straight from their decimal
//! representation and parsed back into `Decimal`, so no floating point value is ever
//! involved on the storage path.

use std::collections::HashMap;
use std::str::FromStr;

use aws_sdk_dynamodb::types::AttributeValue;
use rust_decimal::Decimal;

use super::{
    AnnotationRecord, ImageLabelsAttribute, LabelStorageError, LabelStorageResult, StoredLabel,
};

type Item = HashMap<String, AttributeValue>;

pub fn to_item(record: &AnnotationRecord) -> Item {
    let labels = record
        .labels
        .iter()
        .map(|label| {
            AttributeValue::M(HashMap::from([
                (
                    ImageLabelsAttribute::Name.to_string(),
                    AttributeValue::S(label.name.clone()),
                ),
                (
                    ImageLabelsAttribute::Confidence.to_string(),
                    AttributeValue::N(label.confidence.to_string()),
                ),
            ]))
        })
        .collect();

    HashMap::from([
        (
            ImageLabelsAttribute::ImageKey.to_string(),
            AttributeValue::S(record.image_key.clone()),
        ),
        (ImageLabelsAttribute::Labels.to_string(), AttributeValue::L(labels)),
        (
            ImageLabelsAttribute::Celebrities.to_string(),
            string_list(&record.celebrities),
        ),
        (ImageLabelsAttribute::Faces.to_string(), string_list(&record.faces)),
    ])
}

pub fn from_item(item: &Item) -> LabelStorageResult<AnnotationRecord> {
    let image_key = required(item, ImageLabelsAttribute::ImageKey)?
        .as_s()
        .map_err(|_| malformed(ImageLabelsAttribute::ImageKey, "expected a string"))?
        .clone();

    let labels = optional_list(item, ImageLabelsAttribute::Labels)?
        .iter()
        .map(parse_label)
        .collect::<LabelStorageResult<Vec<_>>>()?;

    Ok(AnnotationRecord {
        image_key,
        labels,
        celebrities: parse_string_list(item, ImageLabelsAttribute::Celebrities)?,
        faces: parse_string_list(item, ImageLabelsAttribute::Faces)?,
    })
}

fn string_list(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().cloned().map(AttributeValue::S).collect())
}

fn required(item: &Item, attribute: ImageLabelsAttribute) -> LabelStorageResult<&AttributeValue> {
    item.get(&attribute.to_string())
        .ok_or_else(|| malformed(attribute, "missing attribute"))
}

// Absent lists decode as empty
fn optional_list(
    item: &Item,
    attribute: ImageLabelsAttribute,
) -> LabelStorageResult<&[AttributeValue]> {
    match item.get(&attribute.to_string()) {
        None => Ok(&[]),
        Some(value) => value
            .as_l()
            .map(Vec::as_slice)
            .map_err(|_| malformed(attribute, "expected a list")),
    }
}

fn parse_string_list(
    item: &Item,
    attribute: ImageLabelsAttribute,
) -> LabelStorageResult<Vec<String>> {
    optional_list(item, attribute)?
        .iter()
        .map(|value| {
            value
                .as_s()
                .cloned()
                .map_err(|_| malformed(attribute, "expected a list of strings"))
        })
        .collect()
}

fn parse_label(value: &AttributeValue) -> LabelStorageResult<StoredLabel> {
    let fields = value
        .as_m()
        .map_err(|_| malformed(ImageLabelsAttribute::Labels, "expected a list of maps"))?;

    let name = required(fields, ImageLabelsAttribute::Name)?
        .as_s()
        .map_err(|_| malformed(ImageLabelsAttribute::Name, "expected a string"))?
        .clone();

    let raw_confidence = required(fields, ImageLabelsAttribute::Confidence)?
        .as_n()
        .map_err(|_| malformed(ImageLabelsAttribute::Confidence, "expected a number"))?;

    Ok(StoredLabel {
        name,
        confidence: parse_number(raw_confidence)?,
    })
}

fn parse_number(raw: &str) -> LabelStorageResult<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| malformed(ImageLabelsAttribute::Confidence, &format!("{raw}: {e}")))
}

fn malformed(attribute: ImageLabelsAttribute, reason: &str) -> LabelStorageError {
    LabelStorageError::MalformedItem(format!("{attribute}: {reason}"))
}
