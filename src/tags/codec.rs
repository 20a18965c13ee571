//! On-disk form of the `_kMDItemUserTags` attribute: a binary property
//! list holding an array of `"<name>\n<color code>"` strings.

use std::io::Cursor;

use plist::Value;

use crate::error::{Result, TagError};
use crate::tags::types::{Color, Tag};

pub fn encode(tags: &[Tag]) -> Result<Vec<u8>> {
    let labels = tags
        .iter()
        .map(|tag| Value::String(format!("{}\n{}", tag.name, tag.color.code())))
        .collect();

    let mut data = Vec::new();
    Value::Array(labels).to_writer_binary(&mut data)?;
    Ok(data)
}

/// Parses an attribute value. Only an unreadable container is an error;
/// individual labels are decoded as leniently as possible.
pub fn decode(data: &[u8]) -> Result<Vec<Tag>> {
    let value = Value::from_reader(Cursor::new(data)).map_err(|e| TagError::Decode(e.to_string()))?;

    let Some(labels) = value.as_array() else {
        return Ok(Vec::new());
    };

    Ok(labels
        .iter()
        .filter_map(|label| label.as_string())
        .map(parse_label)
        .collect())
}

fn parse_label(label: &str) -> Tag {
    let mut components = label.split('\n');
    let name = components.next().unwrap_or_default();
    let color = components
        .next()
        .and_then(|code| code.trim().parse::<i64>().ok())
        .and_then(Color::from_code)
        .unwrap_or(Color::Custom);
    Tag::new(color, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::types::same_tag_names;

    #[test]
    fn test_encode_writes_binary_plist_of_labels() {
        let tags = vec![Tag::palette(Color::Red), Tag::new(Color::Custom, "Work")];
        let data = encode(&tags).unwrap();
        assert!(data.starts_with(b"bplist00"));

        let value = Value::from_reader(Cursor::new(&data)).unwrap();
        let labels: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_string())
            .collect();
        assert_eq!(labels, vec!["Red\n6", "Work\n0"]);
    }

    #[test]
    fn test_decode_reverses_encode() {
        let tags = vec![
            Tag::palette(Color::Green),
            Tag::new(Color::Blue, "Projects"),
            Tag::new(Color::Custom, "Ünïcode tag"),
        ];
        let decoded = decode(&encode(&tags).unwrap()).unwrap();
        assert!(same_tag_names(&decoded, &tags));
        assert_eq!(decoded, tags);
    }

    #[test]
    fn test_decode_empty_list() {
        assert!(decode(&encode(&[]).unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_decode_defaults_missing_or_bad_color_to_custom() {
        let value = Value::Array(vec![
            Value::String("NoColor".to_string()),
            Value::String("Bad\nx".to_string()),
            Value::String("OutOfRange\n9".to_string()),
            Value::String("Orange\n7".to_string()),
        ]);
        let mut data = Vec::new();
        value.to_writer_xml(&mut data).unwrap();

        let tags = decode(&data).unwrap();
        assert_eq!(
            tags,
            vec![
                Tag::new(Color::Custom, "NoColor"),
                Tag::new(Color::Custom, "Bad"),
                Tag::new(Color::Custom, "OutOfRange"),
                Tag::new(Color::Orange, "Orange"),
            ]
        );
    }

    #[test]
    fn test_decode_skips_non_string_items() {
        let value = Value::Array(vec![
            Value::Integer(plist::Integer::from(3i64)),
            Value::String("Red\n6".to_string()),
        ]);
        let mut data = Vec::new();
        value.to_writer_binary(&mut data).unwrap();

        assert_eq!(decode(&data).unwrap(), vec![Tag::palette(Color::Red)]);
    }

    #[test]
    fn test_decode_non_array_container_is_empty() {
        let mut data = Vec::new();
        Value::String("Red\n6".to_string())
            .to_writer_binary(&mut data)
            .unwrap();
        assert!(decode(&data).unwrap().is_empty());
    }

    #[test]
    fn test_decode_garbage_is_error() {
        let result = decode(b"bplist00\xff\x00\x01");
        assert!(matches!(result, Err(TagError::Decode(_))));
    }
}
