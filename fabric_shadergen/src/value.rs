use crate::resource::{CubeFaces, CubeMap, Texture};
use glamx::{Mat2, Mat3, Mat4};
use serde_json::Value;

/// Uniform value that resolves to the rendering context's default 2D texture.
pub const DEFAULT_IMAGE_ID: &str = "fabric_defaultImage";
/// Uniform value that resolves to the rendering context's default cube map.
pub const DEFAULT_CUBE_MAP_ID: &str = "fabric_defaultCubeMap";

/// Type of a declared uniform.
///
/// Everything but [`UniformType::Channels`] maps onto a GLSL type. Channel
/// selectors never reach the GPU, they are spliced into the shader text.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformType {
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
    SamplerCube,
    Channels,
}

impl UniformType {
    pub fn glsl_name(self) -> Option<&'static str> {
        let name = match self {
            UniformType::Float => "float",
            UniformType::Int => "int",
            UniformType::Bool => "bool",
            UniformType::Vec2 => "vec2",
            UniformType::Vec3 => "vec3",
            UniformType::Vec4 => "vec4",
            UniformType::IVec2 => "ivec2",
            UniformType::IVec3 => "ivec3",
            UniformType::IVec4 => "ivec4",
            UniformType::Mat2 => "mat2",
            UniformType::Mat3 => "mat3",
            UniformType::Mat4 => "mat4",
            UniformType::Sampler2D => "sampler2D",
            UniformType::SamplerCube => "samplerCube",
            UniformType::Channels => return None,
        };
        Some(name)
    }

    pub fn from_glsl_name(name: &str) -> Option<Self> {
        let ty = match name {
            "float" => UniformType::Float,
            "int" => UniformType::Int,
            "bool" => UniformType::Bool,
            "vec2" => UniformType::Vec2,
            "vec3" => UniformType::Vec3,
            "vec4" => UniformType::Vec4,
            "ivec2" => UniformType::IVec2,
            "ivec3" => UniformType::IVec3,
            "ivec4" => UniformType::IVec4,
            "mat2" => UniformType::Mat2,
            "mat3" => UniformType::Mat3,
            "mat4" => UniformType::Mat4,
            "sampler2D" => UniformType::Sampler2D,
            "samplerCube" => UniformType::SamplerCube,
            _ => return None,
        };
        Some(ty)
    }

    /// Number of elements in a column major array for this matrix type.
    pub fn matrix_len(self) -> Option<usize> {
        match self {
            UniformType::Mat2 => Some(4),
            UniformType::Mat3 => Some(9),
            UniformType::Mat4 => Some(16),
            _ => None,
        }
    }

    pub fn is_sampler(self) -> bool {
        matches!(self, UniformType::Sampler2D | UniformType::SamplerCube)
    }

    /// Classifies a uniform value.
    ///
    /// | value                                   | type          |
    /// |-----------------------------------------|---------------|
    /// | record with an explicit `type`          | that type     |
    /// | number                                  | `float`       |
    /// | boolean                                 | `bool`        |
    /// | 1-4 characters out of `rgba`            | channels      |
    /// | [`DEFAULT_CUBE_MAP_ID`]                 | `samplerCube` |
    /// | any other string                        | `sampler2D`   |
    /// | sequence of 4 / 9 / 16 numbers          | `mat2/3/4`    |
    /// | record with 2-4 members                 | `vec2/3/4`    |
    /// | record with 6 members                   | `samplerCube` |
    /// | texture / cube map / matrix             | its type      |
    pub fn infer(value: &UniformValue) -> Option<Self> {
        match value {
            UniformValue::Record(record) if record.explicit_type().is_some() => {
                record.explicit_type().and_then(Self::from_glsl_name)
            }
            UniformValue::Float(_) => Some(UniformType::Float),
            UniformValue::Bool(_) => Some(UniformType::Bool),
            UniformValue::Text(text) if is_channel_selector(text) => Some(UniformType::Channels),
            UniformValue::Text(text) if text == DEFAULT_CUBE_MAP_ID => {
                Some(UniformType::SamplerCube)
            }
            UniformValue::Text(_) => Some(UniformType::Sampler2D),
            UniformValue::Sequence(items) => match items.len() {
                4 => Some(UniformType::Mat2),
                9 => Some(UniformType::Mat3),
                16 => Some(UniformType::Mat4),
                _ => None,
            },
            UniformValue::Record(record) => match record.len() {
                2 => Some(UniformType::Vec2),
                3 => Some(UniformType::Vec3),
                4 => Some(UniformType::Vec4),
                6 => Some(UniformType::SamplerCube),
                _ => None,
            },
            UniformValue::Texture(_) => Some(UniformType::Sampler2D),
            UniformValue::CubeMap(_) => Some(UniformType::SamplerCube),
            UniformValue::Mat2(_) => Some(UniformType::Mat2),
            UniformValue::Mat3(_) => Some(UniformType::Mat3),
            UniformValue::Mat4(_) => Some(UniformType::Mat4),
        }
    }
}

/// `true` for 1 to 4 characters out of `r`, `g`, `b` and `a`, case insensitive.
pub fn is_channel_selector(text: &str) -> bool {
    (1..=4).contains(&text.len())
        && text
            .chars()
            .all(|c| matches!(c.to_ascii_lowercase(), 'r' | 'g' | 'b' | 'a'))
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordField {
    Number(f32),
    Text(String),
}

impl From<f32> for RecordField {
    fn from(value: f32) -> Self {
        RecordField::Number(value)
    }
}

impl From<f64> for RecordField {
    fn from(value: f64) -> Self {
        RecordField::Number(value as f32)
    }
}

impl From<&str> for RecordField {
    fn from(value: &str) -> Self {
        RecordField::Text(value.to_string())
    }
}

impl From<String> for RecordField {
    fn from(value: String) -> Self {
        RecordField::Text(value)
    }
}

/// A small keyed record, e.g. `{ x: 1, y: 2 }` or a color `{ red, green, blue, alpha }`.
///
/// Member order is the declaration order. An explicit `type` is kept apart from
/// the members and does not count towards [`Record::len`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    ty: Option<String>,
    fields: Vec<(String, RecordField)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn typed(ty: impl Into<String>) -> Self {
        Self {
            ty: Some(ty.into()),
            fields: Vec::new(),
        }
    }

    /// Companion value of a `<name>Dimensions` uniform.
    pub fn dimensions(width: u32, height: u32) -> Self {
        Self::typed("ivec2")
            .with("x", width as f32)
            .with("y", height as f32)
    }

    pub fn cube(faces: CubeFaces<String>) -> Self {
        CubeFaces::<String>::KEYS
            .into_iter()
            .zip(faces.into_array())
            .fold(Self::new(), |record, (key, path)| record.with(key, path))
    }

    pub fn with(mut self, name: impl Into<String>, field: impl Into<RecordField>) -> Self {
        self.set(name, field);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, field: impl Into<RecordField>) {
        let name = name.into();
        let field = field.into();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = field,
            None => self.fields.push((name, field)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RecordField> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, field)| field)
    }

    pub fn number(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            RecordField::Number(n) => Some(*n),
            RecordField::Text(_) => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            RecordField::Text(text) => Some(text),
            RecordField::Number(_) => None,
        }
    }

    pub fn explicit_type(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &RecordField)> {
        self.fields.iter().map(|(key, field)| (key.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reads the six face paths of a cube map descriptor.
    pub fn cube_faces(&self) -> Option<CubeFaces<String>> {
        let mut faces = Vec::with_capacity(6);
        for key in CubeFaces::<String>::KEYS {
            faces.push(self.text(key)?.to_string());
        }
        let faces: [String; 6] = faces.try_into().ok()?;
        Some(CubeFaces::from_array(faces))
    }
}

/// A uniform value, either as written in a template or as resolved at runtime.
///
/// Templates only ever produce the literal variants. Textures, cube maps and
/// matrices appear once a resolver replaced a path, descriptor or array.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Bool(bool),
    Text(String),
    Sequence(Vec<f32>),
    Record(Record),
    Texture(Texture),
    CubeMap(CubeMap),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    /// Converts a JSON literal. Returns `None` for shapes that cannot be a uniform.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(|n| UniformValue::Float(n as f32)),
            Value::Bool(b) => Some(UniformValue::Bool(*b)),
            Value::String(s) => Some(UniformValue::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_f64().map(|n| n as f32))
                .collect::<Option<Vec<_>>>()
                .map(UniformValue::Sequence),
            Value::Object(map) => {
                let mut record = Record::new();
                for (key, field) in map {
                    match (key.as_str(), field) {
                        ("type", Value::String(ty)) => record.ty = Some(ty.clone()),
                        ("type", _) => return None,
                        (_, Value::Number(n)) => record.set(key.as_str(), n.as_f64()? as f32),
                        (_, Value::String(s)) => record.set(key.as_str(), s.as_str()),
                        _ => return None,
                    }
                }
                Some(UniformValue::Record(record))
            }
            Value::Null => None,
        }
    }

    /// Builds a matrix out of a column major array of the right length.
    pub fn matrix_from_columns(ty: UniformType, columns: &[f32]) -> Option<Self> {
        if ty.matrix_len()? != columns.len() {
            return None;
        }
        let matrix = match ty {
            UniformType::Mat2 => UniformValue::Mat2(Mat2::from_cols_slice(columns)),
            UniformType::Mat3 => UniformValue::Mat3(Mat3::from_cols_slice(columns)),
            UniformType::Mat4 => UniformValue::Mat4(Mat4::from_cols_slice(columns)),
            _ => return None,
        };
        Some(matrix)
    }

    pub fn as_texture(&self) -> Option<&Texture> {
        match self {
            UniformValue::Texture(texture) => Some(texture),
            _ => None,
        }
    }

    pub fn as_cube_map(&self) -> Option<&CubeMap> {
        match self {
            UniformValue::CubeMap(cube_map) => Some(cube_map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            UniformValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            UniformValue::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<f64> for UniformValue {
    fn from(value: f64) -> Self {
        UniformValue::Float(value as f32)
    }
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        UniformValue::Bool(value)
    }
}

impl From<&str> for UniformValue {
    fn from(value: &str) -> Self {
        UniformValue::Text(value.to_string())
    }
}

impl From<String> for UniformValue {
    fn from(value: String) -> Self {
        UniformValue::Text(value)
    }
}

impl From<Vec<f32>> for UniformValue {
    fn from(value: Vec<f32>) -> Self {
        UniformValue::Sequence(value)
    }
}

impl From<Record> for UniformValue {
    fn from(value: Record) -> Self {
        UniformValue::Record(value)
    }
}

impl From<Texture> for UniformValue {
    fn from(value: Texture) -> Self {
        UniformValue::Texture(value)
    }
}

impl From<CubeMap> for UniformValue {
    fn from(value: CubeMap) -> Self {
        UniformValue::CubeMap(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        UniformValue::Mat4(value)
    }
}
