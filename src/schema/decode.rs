//! Descriptor-driven element decoding.
//!
//! [`decode`] is a pure function: it never touches global state, and
//! every failure names the element and the attribute that caused it.

use glam::{Vec2, Vec3};
use serde_json::{Map, Value};

use super::{AttrKind, DefaultValue, Descriptor, Fog, Rect2D, Skybox, registry};
use crate::errors::{Result, YasfError};

/// Reserved extension key accepted on every element.
pub const CUSTOM_KEY: &str = "custom";

/// A decoded, validated attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Rgb(Vec3),
    Rect(Rect2D),
    List(Vec<Record>),
    Fog(Fog),
    Skybox(Box<Skybox>),
}

/// Validated attributes of one element, in descriptor order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    element: String,
    values: Vec<(&'static str, AttrValue)>,
    custom: Map<String, Value>,
}

impl Record {
    /// Id of the element this record was decoded from.
    #[inline]
    #[must_use]
    pub fn element(&self) -> &str {
        &self.element
    }

    /// Contents of the element's `custom` extension bag.
    #[must_use]
    pub fn custom(&self) -> &Map<String, Value> {
        &self.custom
    }

    pub(crate) fn take_custom(&mut self) -> Map<String, Value> {
        std::mem::take(&mut self.custom)
    }

    /// Raw lookup. `None` when the descriptor table has no such entry.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttrValue)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }

    fn value(&self, name: &str) -> Result<&AttrValue> {
        match self.get(name) {
            Some(AttrValue::Null) | None => Err(YasfError::missing(&self.element, name)),
            Some(v) => Ok(v),
        }
    }

    pub fn string(&self, name: &str) -> Result<&str> {
        match self.value(name)? {
            AttrValue::String(s) => Ok(s),
            _ => Err(YasfError::mismatch(&self.element, name, "a string")),
        }
    }

    /// Optional string. Empty strings count as absent.
    pub fn opt_string(&self, name: &str) -> Result<Option<&str>> {
        match self.get(name) {
            Some(AttrValue::Null) | None => Ok(None),
            Some(AttrValue::String(s)) if s.is_empty() => Ok(None),
            Some(AttrValue::String(s)) => Ok(Some(s)),
            Some(_) => Err(YasfError::mismatch(&self.element, name, "a string")),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool> {
        match self.value(name)? {
            AttrValue::Bool(b) => Ok(*b),
            _ => Err(YasfError::mismatch(&self.element, name, "a boolean")),
        }
    }

    pub fn integer(&self, name: &str) -> Result<i64> {
        match self.value(name)? {
            AttrValue::Integer(i) => Ok(*i),
            _ => Err(YasfError::mismatch(&self.element, name, "an integer")),
        }
    }

    /// Integer that must be at least `min`, as used for segment counts.
    pub fn count(&self, name: &str, min: u32) -> Result<u32> {
        let value = self.integer(name)?;
        u32::try_from(value)
            .ok()
            .filter(|v| *v >= min)
            .ok_or_else(|| YasfError::mismatch(&self.element, name, "a positive integer"))
    }

    pub fn float(&self, name: &str) -> Result<f32> {
        match self.value(name)? {
            AttrValue::Float(f) => Ok(*f),
            AttrValue::Integer(i) => Ok(*i as f32),
            _ => Err(YasfError::mismatch(&self.element, name, "a number")),
        }
    }

    pub fn vec2(&self, name: &str) -> Result<Vec2> {
        match self.value(name)? {
            AttrValue::Vec2(v) => Ok(*v),
            _ => Err(YasfError::mismatch(&self.element, name, "a vector2")),
        }
    }

    pub fn vec3(&self, name: &str) -> Result<Vec3> {
        match self.value(name)? {
            AttrValue::Vec3(v) => Ok(*v),
            _ => Err(YasfError::mismatch(&self.element, name, "a vector3")),
        }
    }

    pub fn rgb(&self, name: &str) -> Result<Vec3> {
        match self.value(name)? {
            AttrValue::Rgb(v) => Ok(*v),
            _ => Err(YasfError::mismatch(&self.element, name, "an rgb")),
        }
    }

    pub fn rect(&self, name: &str) -> Result<Rect2D> {
        match self.value(name)? {
            AttrValue::Rect(r) => Ok(*r),
            _ => Err(YasfError::mismatch(&self.element, name, "a rectangle")),
        }
    }

    pub fn list(&self, name: &str) -> Result<&[Record]> {
        match self.value(name)? {
            AttrValue::List(items) => Ok(items),
            _ => Err(YasfError::mismatch(&self.element, name, "a list")),
        }
    }

    pub fn fog(&self, name: &str) -> Result<Option<Fog>> {
        match self.get(name) {
            Some(AttrValue::Null) | None => Ok(None),
            Some(AttrValue::Fog(f)) => Ok(Some(*f)),
            Some(_) => Err(YasfError::mismatch(&self.element, name, "a fog block")),
        }
    }

    pub fn skybox(&self, name: &str) -> Result<Option<Skybox>> {
        match self.get(name) {
            Some(AttrValue::Null) | None => Ok(None),
            Some(AttrValue::Skybox(s)) => Ok(Some((**s).clone())),
            Some(_) => Err(YasfError::mismatch(&self.element, name, "a skybox block")),
        }
    }
}

/// Decodes `element` against `descriptors`.
///
/// `element_id` is the key the element was found under. It names the
/// element in errors and fills the `id` attribute, which is why documents
/// may omit `id` inside an entry keyed by that id. An `id` given inside the
/// element must be a string equal to `element_id`.
pub fn decode(element_id: &str, element: &Value, descriptors: &[Descriptor]) -> Result<Record> {
    let Some(map) = element.as_object() else {
        return Err(YasfError::mismatch(element_id, element_id, "an object"));
    };

    for key in map.keys() {
        if key != CUSTOM_KEY && !descriptors.iter().any(|d| d.name == key) {
            return Err(YasfError::unknown_attribute(element_id, key));
        }
    }

    let custom = match map.get(CUSTOM_KEY) {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(bag)) => bag.clone(),
        Some(_) => return Err(YasfError::mismatch(element_id, CUSTOM_KEY, "an object")),
    };

    let mut values = Vec::with_capacity(descriptors.len());
    for desc in descriptors {
        let raw = map.get(desc.name).filter(|v| !v.is_null());
        let value = match raw {
            Some(raw) if desc.name == "id" && raw.as_str() != Some(element_id) => {
                return Err(YasfError::mismatch(element_id, "id", "a string equal to the element key"));
            }
            _ if desc.name == "id" => AttrValue::String(element_id.to_string()),
            Some(raw) => decode_value(element_id, desc, raw)?,
            None if desc.is_required() => return Err(YasfError::missing(element_id, desc.name)),
            None => default_value(desc.default),
        };
        values.push((desc.name, value));
    }

    log::trace!("decoded element '{element_id}' ({} attributes)", values.len());

    Ok(Record {
        element: element_id.to_string(),
        values,
        custom,
    })
}

fn default_value(default: DefaultValue) -> AttrValue {
    match default {
        DefaultValue::Required | DefaultValue::Null => AttrValue::Null,
        DefaultValue::Bool(b) => AttrValue::Bool(b),
        DefaultValue::Int(i) => AttrValue::Integer(i),
        DefaultValue::Float(f) => AttrValue::Float(f),
        DefaultValue::Str(s) => AttrValue::String(s.to_string()),
    }
}

fn decode_value(element: &str, desc: &Descriptor, raw: &Value) -> Result<AttrValue> {
    let mismatch = || YasfError::mismatch(element, desc.name, desc.kind.expected());

    let value = match desc.kind {
        AttrKind::String => AttrValue::String(raw.as_str().ok_or_else(mismatch)?.to_string()),
        AttrKind::Boolean => AttrValue::Bool(raw.as_bool().ok_or_else(mismatch)?),
        AttrKind::Integer => AttrValue::Integer(as_integer(raw).ok_or_else(mismatch)?),
        AttrKind::Float => AttrValue::Float(raw.as_f64().ok_or_else(mismatch)? as f32),
        AttrKind::Vector2 => {
            let [x, y] = fields(raw, ["x", "y"]).ok_or_else(mismatch)?;
            AttrValue::Vec2(Vec2::new(x, y))
        }
        AttrKind::Vector3 => {
            let [x, y, z] = fields(raw, ["x", "y", "z"]).ok_or_else(mismatch)?;
            AttrValue::Vec3(Vec3::new(x, y, z))
        }
        AttrKind::Rgb => {
            let [r, g, b] = fields(raw, ["r", "g", "b"]).ok_or_else(mismatch)?;
            AttrValue::Rgb(Vec3::new(r, g, b))
        }
        AttrKind::Rectangle2D => AttrValue::Rect(as_rect(raw).ok_or_else(mismatch)?),
        AttrKind::ListOf(item) => {
            let prefix = format!("{element}.{}", desc.name);
            let items = match raw {
                Value::Array(entries) => entries
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| decode(&format!("{prefix}[{i}]"), entry, item))
                    .collect::<Result<Vec<_>>>()?,
                Value::Object(entries) => entries
                    .iter()
                    .map(|(key, entry)| decode(&format!("{prefix}.{key}"), entry, item))
                    .collect::<Result<Vec<_>>>()?,
                _ => return Err(mismatch()),
            };
            AttrValue::List(items)
        }
        AttrKind::Fog => {
            let record = decode(desc.name, raw, registry::FOG)?;
            AttrValue::Fog(Fog::from_record(&record)?)
        }
        AttrKind::Skybox => {
            let record = decode(desc.name, raw, registry::SKYBOX)?;
            AttrValue::Skybox(Box::new(Skybox::from_record(&record)?))
        }
    };
    Ok(value)
}

fn as_integer(raw: &Value) -> Option<i64> {
    if let Some(i) = raw.as_i64() {
        return Some(i);
    }
    let f = raw.as_f64()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// Reads a fixed set of named numeric sub-fields. Extra or missing fields fail.
fn fields<const N: usize>(raw: &Value, names: [&str; N]) -> Option<[f32; N]> {
    let map = raw.as_object()?;
    if map.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, name) in out.iter_mut().zip(names) {
        *slot = map.get(name)?.as_f64()? as f32;
    }
    Some(out)
}

fn as_rect(raw: &Value) -> Option<Rect2D> {
    let [x1, y1, x2, y2] = match raw {
        Value::String(s) => {
            let parts = s
                .split_whitespace()
                .map(str::parse::<f32>)
                .collect::<std::result::Result<Vec<_>, _>>()
                .ok()?;
            <[f32; 4]>::try_from(parts).ok()?
        }
        _ => fields(raw, ["x1", "y1", "x2", "y2"])?,
    };
    Some(Rect2D {
        p1: Vec2::new(x1, y1),
        p2: Vec2::new(x2, y2),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::SchemaViolation;
    use crate::schema::registry::{MATERIAL, NURBS, TEXTURE};

    fn material_json() -> Value {
        json!({
            "color": {"r": 1.0, "g": 0.5, "b": 0.0},
            "specular": {"r": 0.0, "g": 0.0, "b": 0.0},
            "emissive": {"r": 0.0, "g": 0.0, "b": 0.0},
            "shininess": 10
        })
    }

    #[test]
    fn id_comes_from_key() {
        let rec = decode("m1", &material_json(), MATERIAL).unwrap();
        assert_eq!(rec.string("id").unwrap(), "m1");
        assert_eq!(rec.element(), "m1");
    }

    #[test]
    fn inner_id_must_match_key() {
        let mut el = material_json();
        el["id"] = json!("m1");
        assert!(decode("m1", &el, MATERIAL).is_ok());

        for bad in [json!("other"), json!(42)] {
            el["id"] = bad;
            let err = decode("m1", &el, MATERIAL).unwrap_err();
            assert!(matches!(
                err.as_schema(),
                Some(SchemaViolation::TypeMismatch { element, attribute, .. })
                    if element == "m1" && attribute == "id"
            ));
        }
    }

    #[test]
    fn integral_float_is_accepted_as_integer() {
        let mut el = json!({"type": "nurbs", "degree_u": 1.0, "degree_v": 1, "parts_u": 2,
            "parts_v": 2, "controlpoints": []});
        assert_eq!(decode("n", &el, NURBS).unwrap().integer("degree_u").unwrap(), 1);

        el["degree_u"] = json!(1.5);
        let err = decode("n", &el, NURBS).unwrap_err();
        assert!(matches!(
            err.as_schema(),
            Some(SchemaViolation::TypeMismatch { attribute, .. }) if attribute == "degree_u"
        ));
    }

    #[test]
    fn vector_rejects_missing_component() {
        let mut el = material_json();
        el["color"] = json!({"r": 1.0, "g": 0.5});
        let err = decode("m1", &el, MATERIAL).unwrap_err();
        assert!(matches!(
            err.as_schema(),
            Some(SchemaViolation::TypeMismatch { attribute, .. }) if attribute == "color"
        ));
    }

    #[test]
    fn explicit_null_means_absent() {
        let mut el = material_json();
        el["textureref"] = Value::Null;
        let rec = decode("m1", &el, MATERIAL).unwrap();
        assert_eq!(rec.opt_string("textureref").unwrap(), None);
    }

    #[test]
    fn custom_bag_is_kept() {
        let el = json!({"filepath": "a.png", "custom": {"author": "x"}});
        let rec = decode("t", &el, TEXTURE).unwrap();
        assert_eq!(rec.custom().get("author"), Some(&json!("x")));
    }

    #[test]
    fn rectangle_accepts_string_and_object() {
        assert_eq!(
            as_rect(&json!("0 1 2 3")),
            Some(Rect2D {
                p1: Vec2::new(0.0, 1.0),
                p2: Vec2::new(2.0, 3.0)
            })
        );
        assert!(as_rect(&json!({"x1": 0, "y1": 1, "x2": 2, "y2": 3})).is_some());
        assert!(as_rect(&json!("0 1 2")).is_none());
    }
}
