use std::io::Write;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::Codec;
use crate::error::Error;
use crate::format::Format;

const INDENT: &[u8] = b"    ";

/// A JSON codec that uses `serde_json`, writing four-space indented output.
#[derive(Clone, Copy, Debug)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    const FORMAT: Format = Format::Json;

    fn decode<T: DeserializeOwned>(payload: &str) -> Result<T, Error> {
        Ok(serde_json::from_str(payload)?)
    }

    fn encode<T: Serialize + ?Sized, W: Write>(value: &T, writer: W) -> Result<(), Error> {
        let mut ser =
            serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
        value.serialize(&mut ser)?;
        ser.into_inner().write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::Value;

    use super::*;

    #[test]
    fn untyped_map_exposes_nested_values() {
        let payload = r#"{"title":"T","database":{"server":"1.2.3.4","ports":[1,2,3]}}"#;
        let result: HashMap<String, Value> = JsonCodec::decode(payload).unwrap();

        assert_eq!(result["title"], "T");
        let ports = result["database"]
            .as_object()
            .and_then(|db| db.get("ports"))
            .and_then(Value::as_array)
            .unwrap();
        let ports: Vec<u64> = ports.iter().filter_map(Value::as_u64).collect();
        assert_eq!(ports, vec![1, 2, 3]);
    }

    #[test]
    fn output_is_indented_by_four_spaces() {
        let mut out = Vec::new();
        JsonCodec::encode(&serde_json::json!({ "a": { "b": 1 } }), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n    \"a\": {\n        \"b\": 1\n    }\n}\n"
        );
    }

    #[test]
    fn syntax_errors_come_from_serde_json() {
        let err = JsonCodec::decode::<Value>(r#"{"a":}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
