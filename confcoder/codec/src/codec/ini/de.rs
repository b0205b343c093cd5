use core::str::FromStr;
use std::vec;

use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor,
};
use ::ini::{Ini, ParseOption};
use serde::forward_to_deserialize_any;

use super::IniError;

/// Deserializes a `T` from INI text.
pub fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, IniError> {
    let document = Document::parse(s)?;
    T::deserialize(document)
}

#[derive(Debug, Default, PartialEq)]
struct Variable {
    name: String,
    values: Vec<String>,
}

#[derive(Debug, Default, PartialEq)]
struct Section {
    name: String,
    variables: Vec<Variable>,
}

/// The parsed text, with repeated sections merged and repeated keys collected.
#[derive(Debug, Default, PartialEq)]
struct Document {
    general: Vec<Variable>,
    sections: Vec<Section>,
}

impl Document {
    fn parse(s: &str) -> Result<Self, IniError> {
        let options = ParseOption {
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(&expand_lines(s), options).map_err(IniError::Parse)?;

        let mut document = Document::default();
        for (name, properties) in ini.iter() {
            let variables = match name {
                None => &mut document.general,
                Some(name) => document.section_mut(name),
            };
            for (key, value) in properties.iter() {
                push_value(variables, key, value);
            }
        }
        Ok(document)
    }

    fn section_mut(&mut self, name: &str) -> &mut Vec<Variable> {
        let index = match self
            .sections
            .iter()
            .position(|section| same_name(&section.name, name))
        {
            Some(index) => index,
            None => {
                self.sections.push(Section {
                    name: name.to_owned(),
                    variables: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[index].variables
    }
}

/// Strips line indentation, blanks comment lines and rewrites a bare `name`
/// as `name =`, which reads as `true` for booleans. Line numbers are kept for
/// parse errors; trailing ` ; comment`s are left to the parser.
fn expand_lines(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for line in s.lines().map(str::trim_start) {
        if line.starts_with(|c: char| c == ';' || c == '#') {
            out.push('\n');
            continue;
        }
        let end = line
            .find(|c: char| c == ';' || c == '#')
            .unwrap_or(line.len());
        let (body, comment) = line.split_at(end);
        let body = body.trim_end();
        if body.is_empty()
            || body.starts_with('[')
            || body.contains(|c: char| c == '=' || c == ':')
        {
            out.push_str(line);
        } else {
            out.push_str(body);
            out.push_str(" =");
            if !comment.is_empty() {
                out.push(' ');
                out.push_str(comment);
            }
        }
        out.push('\n');
    }
    out
}

fn push_value(variables: &mut Vec<Variable>, key: &str, value: &str) {
    match variables.iter_mut().find(|v| same_name(&v.name, key)) {
        Some(variable) => variable.values.push(value.to_owned()),
        None => variables.push(Variable {
            name: key.to_owned(),
            values: vec![value.to_owned()],
        }),
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}

fn same_name(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn match_field(fields: &'static [&'static str], name: &str) -> Option<&'static str> {
    let name = normalize(name);
    fields.iter().copied().find(|field| normalize(field) == name)
}

enum Node {
    Value(Variable),
    Section(Section),
}

/// Feeds `(key, node)` pairs to a struct or map visitor.
struct Entries {
    iter: vec::IntoIter<(String, Node)>,
    pending: Option<Node>,
}

impl Entries {
    fn new(entries: Vec<(String, Node)>) -> Self {
        Self {
            iter: entries.into_iter(),
            pending: None,
        }
    }
}

impl<'de> MapAccess<'de> for Entries {
    type Error = IniError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, IniError> {
        match self.iter.next() {
            Some((key, node)) => {
                self.pending = Some(node);
                let key: StringDeserializer<IniError> = key.into_deserializer();
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, IniError> {
        match self.pending.take() {
            Some(Node::Value(variable)) => seed.deserialize(ValueDeserializer(variable)),
            Some(Node::Section(section)) => seed.deserialize(SectionDeserializer(section)),
            None => Err(de::Error::custom("value requested before key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

impl<'de> de::Deserializer<'de> for Document {
    type Error = IniError;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, IniError> {
        Err(de::Error::custom(
            "type not supported by decoder: ini binds onto structs only",
        ))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, IniError> {
        let mut entries = Vec::with_capacity(self.general.len() + self.sections.len());

        for variable in self.general {
            let field = match_field(fields, &variable.name).ok_or_else(|| {
                IniError::UnknownVariable {
                    section: None,
                    name: variable.name.clone(),
                }
            })?;
            entries.push((field.to_owned(), Node::Value(variable)));
        }

        for section in self.sections {
            let field = match_field(fields, &section.name)
                .ok_or_else(|| IniError::UnknownSection(section.name.clone()))?;
            entries.push((field.to_owned(), Node::Section(section)));
        }

        visitor.visit_map(Entries::new(entries))
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, IniError> {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map enum
        identifier ignored_any
    }
}

struct SectionDeserializer(Section);

impl<'de> de::Deserializer<'de> for SectionDeserializer {
    type Error = IniError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        let entries = self
            .0
            .variables
            .into_iter()
            .map(|variable| (variable.name.clone(), Node::Value(variable)))
            .collect();
        visitor.visit_map(Entries::new(entries))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, IniError> {
        let Section { name, variables } = self.0;
        let mut entries = Vec::with_capacity(variables.len());

        for variable in variables {
            let field = match_field(fields, &variable.name).ok_or_else(|| {
                IniError::UnknownVariable {
                    section: Some(name.clone()),
                    name: variable.name.clone(),
                }
            })?;
            entries.push((field.to_owned(), Node::Value(variable)));
        }

        visitor.visit_map(Entries::new(entries))
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, IniError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct enum identifier
    }
}

/// A single variable; scalars read its last assignment, sequences read all of them.
struct ValueDeserializer(Variable);

impl ValueDeserializer {
    fn last(&self) -> &str {
        self.0.values.last().map(String::as_str).unwrap_or_default()
    }

    fn into_last(mut self) -> String {
        self.0.values.pop().unwrap_or_default()
    }

    fn parse<T: FromStr>(&self, expected: &'static str) -> Result<T, IniError> {
        let raw = self.last();
        raw.trim().parse().map_err(|_| self.invalid(expected))
    }

    fn parse_bool(&self) -> Result<bool, IniError> {
        match self.last().trim().to_ascii_lowercase().as_str() {
            "" | "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(self.invalid("a boolean")),
        }
    }

    fn invalid(&self, expected: &'static str) -> IniError {
        IniError::InvalidValue {
            name: self.0.name.clone(),
            value: self.last().to_owned(),
            expected,
        }
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident($ty:ty, $expected:literal)),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
                let value = self.parse::<$ty>($expected)?;
                visitor.$visit(value)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = IniError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        visitor.visit_string(self.into_last())
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        visitor.visit_bool(self.parse_bool()?)
    }

    deserialize_parsed! {
        deserialize_i8 => visit_i8(i8, "an integer"),
        deserialize_i16 => visit_i16(i16, "an integer"),
        deserialize_i32 => visit_i32(i32, "an integer"),
        deserialize_i64 => visit_i64(i64, "an integer"),
        deserialize_i128 => visit_i128(i128, "an integer"),
        deserialize_u8 => visit_u8(u8, "an unsigned integer"),
        deserialize_u16 => visit_u16(u16, "an unsigned integer"),
        deserialize_u32 => visit_u32(u32, "an unsigned integer"),
        deserialize_u64 => visit_u64(u64, "an unsigned integer"),
        deserialize_u128 => visit_u128(u128, "an unsigned integer"),
        deserialize_f32 => visit_f32(f32, "a number"),
        deserialize_f64 => visit_f64(f64, "a number"),
        deserialize_char => visit_char(char, "a single character"),
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        visitor.visit_byte_buf(self.into_last().into_bytes())
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        if self.last().trim().is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, IniError> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, IniError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        let Variable { name, values } = self.0;
        visitor.visit_seq(Values {
            name,
            iter: values.into_iter(),
        })
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, IniError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, IniError> {
        let variant: StringDeserializer<IniError> = self.into_last().into_deserializer();
        visitor.visit_enum(variant)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, IniError> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        str string identifier tuple_struct map struct
    }
}

/// The assignments of a multi-valued variable.
struct Values {
    name: String,
    iter: vec::IntoIter<String>,
}

impl<'de> SeqAccess<'de> for Values {
    type Error = IniError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, IniError> {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(ValueDeserializer(Variable {
                    name: self.name.clone(),
                    values: vec![value],
                }))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_derive::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Mode {
        Fast,
        Safe,
    }

    #[derive(Debug, Deserialize)]
    struct Worker {
        threads: u8,
        ratio: f64,
        mode: Mode,
        label: Option<String>,
        peer: Vec<String>,
    }

    #[derive(Debug, Deserialize)]
    struct Config {
        name: String,
        worker: Worker,
    }

    #[test]
    fn general_keys_and_sections_are_collected() {
        let doc = Document::parse(
            "outer = string\n[Section]\nenabled = true\n[section]\npath = /usr/local\n",
        )
        .unwrap();

        assert_eq!(doc.general.len(), 1);
        assert_eq!(doc.general[0].values, ["string"]);
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].variables.len(), 2);
    }

    #[test]
    fn scalars_parse_from_text() {
        let config: Config = from_str(
            "name = primary\n\
             [worker]\n\
             threads = 8\n\
             ratio = 0.5\n\
             mode = safe\n\
             label =\n\
             peer = a\n",
        )
        .unwrap();

        assert_eq!(config.name, "primary");
        assert_eq!(config.worker.threads, 8);
        assert_eq!(config.worker.ratio, 0.5);
        assert_eq!(config.worker.mode, Mode::Safe);
        assert_eq!(config.worker.label, None);
        assert_eq!(config.worker.peer, ["a"]);
    }

    #[test]
    fn repeated_assignments_feed_sequences() {
        let variable = Variable {
            name: "peer".to_owned(),
            values: vec!["a".to_owned(), "b".to_owned()],
        };
        let peers = Vec::<String>::deserialize(ValueDeserializer(variable)).unwrap();
        assert_eq!(peers, ["a", "b"]);

        let variable = Variable {
            name: "threads".to_owned(),
            values: vec!["2".to_owned(), "4".to_owned()],
        };
        assert_eq!(u8::deserialize(ValueDeserializer(variable)).unwrap(), 4);
    }

    #[test]
    fn bad_numbers_name_the_variable() {
        let err = from_str::<Config>(
            "name = x\n[worker]\nthreads = many\nratio = 1\nmode = fast\npeer = a\n",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value `many` for `threads`: expected an unsigned integer"
        );
    }

    #[test]
    fn dashes_and_case_are_ignored_in_names() {
        assert_eq!(match_field(&["max_conns"], "Max-Conns"), Some("max_conns"));
        assert_eq!(match_field(&["max_conns"], "conns"), None);
    }

    #[test]
    fn bare_names_and_comment_lines_are_rewritten() {
        assert_eq!(
            expand_lines("  ; note\n  [section]\n  enable ; on\n  name = x # y\n"),
            "\n[section]\nenable = ; on\nname = x # y\n"
        );
    }

    #[test]
    fn bare_name_reads_as_true() {
        #[derive(Debug, Deserialize)]
        struct Switches {
            enable: bool,
            verbose: bool,
        }

        #[derive(Debug, Deserialize)]
        struct Doc {
            switches: Switches,
        }

        let doc: Doc = from_str("[switches]\nenable\nverbose = off\n").unwrap();
        assert!(doc.switches.enable);
        assert!(!doc.switches.verbose);
    }
}
