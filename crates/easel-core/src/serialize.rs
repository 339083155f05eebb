//! Document envelope: JSON export/import of a whole scene.
//!
//! The wire schema is the flat per-object property serialization plus one
//! explicit extension field `data` carrying `{id, type, name?}`. `data` is
//! written on export and round-trips unchanged, so identity survives
//! save/load and external tools can annotate objects without the editor
//! caring. Import parses and validates the complete payload before
//! producing anything; a failed import can never leave a half-replaced
//! scene behind.

use crate::model::{
    Color, ObjectKind, ObjectMeta, PathData, Props, SceneObject, Shape, TextProps, clamp_opacity,
};
use crate::scene::Scene;
use serde::{Deserialize, Serialize};

/// Version tag written into every exported document.
pub const FORMAT_VERSION: &str = "easel/1";

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported document version `{0}`")]
    UnsupportedVersion(String),
}

// ─── Wire records ────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct Document {
    version: String,
    background: Color,
    objects: Vec<RawObject>,
}

/// One object as it appears on the wire: `type` tag, flattened property
/// record, kind-specific geometry fields, and the `data` identity record.
#[derive(Serialize, Deserialize)]
struct RawObject {
    #[serde(rename = "type")]
    kind: ObjectKind,
    #[serde(flatten)]
    props: Props,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    points: Option<PathData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    src: Option<String>,
    /// Group children, nested recursively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    objects: Option<Vec<RawObject>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<TextProps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<RawMeta>,
}

#[derive(Serialize, Deserialize)]
struct RawMeta {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<ObjectKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

// ─── Scene ↔ wire conversion ─────────────────────────────────────────────

fn raw_from_object(obj: &SceneObject) -> RawObject {
    let mut raw = RawObject {
        kind: obj.kind(),
        props: obj.props.clone(),
        width: None,
        height: None,
        radius: None,
        points: None,
        src: None,
        objects: None,
        text: obj.text.clone(),
        data: Some(RawMeta {
            id: Some(obj.id().as_str().to_string()),
            kind: Some(obj.kind()),
            name: obj.meta.name.clone(),
        }),
    };

    match &obj.shape {
        Shape::Rect { width, height } => {
            raw.width = Some(*width);
            raw.height = Some(*height);
        }
        Shape::Circle { radius } => raw.radius = Some(*radius),
        Shape::Polygon { points } | Shape::Path { points } => {
            raw.points = Some(points.clone());
        }
        Shape::Image { src } | Shape::Svg { src } => raw.src = Some(src.clone()),
        Shape::Text => {}
        Shape::Group { children } => {
            raw.objects = Some(children.iter().map(raw_from_object).collect());
        }
    }
    raw
}

fn object_from_raw(raw: RawObject) -> SceneObject {
    let shape = match raw.kind {
        ObjectKind::Rect => Shape::Rect {
            width: raw.width.unwrap_or(0.0),
            height: raw.height.unwrap_or(0.0),
        },
        ObjectKind::Circle => Shape::Circle {
            radius: raw.radius.unwrap_or(0.0),
        },
        ObjectKind::Polygon => Shape::Polygon {
            points: raw.points.unwrap_or_else(|| PathData::new(Vec::new())),
        },
        ObjectKind::Text => Shape::Text,
        ObjectKind::Path => Shape::Path {
            points: raw.points.unwrap_or_else(|| PathData::new(Vec::new())),
        },
        ObjectKind::Image => Shape::Image {
            src: raw.src.unwrap_or_default(),
        },
        ObjectKind::Svg => Shape::Svg {
            src: raw.src.unwrap_or_default(),
        },
        ObjectKind::Group => Shape::Group {
            children: raw
                .objects
                .unwrap_or_default()
                .into_iter()
                .map(object_from_raw)
                .collect(),
        },
    };

    // The outer `type` tag is authoritative; `data` supplies identity.
    // Objects that arrive without a usable id get a fresh one here, so the
    // non-empty-id invariant holds for every imported object.
    let (id, name) = match raw.data {
        Some(meta) => (meta.id, meta.name),
        None => (None, None),
    };
    let meta = ObjectMeta::ensure(id.as_deref(), raw.kind, name);

    // A text block only makes sense on text objects; drop it elsewhere.
    let text = (raw.kind == ObjectKind::Text).then(|| raw.text.unwrap_or_default());

    // Hand-edited documents sometimes carry out-of-range opacity.
    let mut props = raw.props;
    props.opacity = clamp_opacity(props.opacity);

    SceneObject::from_parts(meta, props, text, shape)
}

// ─── Public surface ──────────────────────────────────────────────────────

/// Serialize the scene to pretty-printed JSON.
pub fn export_json(scene: &Scene) -> Result<String, DocumentError> {
    let doc = Document {
        version: FORMAT_VERSION.to_string(),
        background: scene.background,
        objects: scene.objects().iter().map(raw_from_object).collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parse a document into a fresh `Scene`. Nothing outside the returned
/// value is touched: callers swap it in only on `Ok`, which is what keeps
/// a failed import from disturbing the scene being edited.
pub fn import_json(json: &str) -> Result<Scene, DocumentError> {
    let doc: Document = serde_json::from_str(json)?;
    if doc.version != FORMAT_VERSION {
        return Err(DocumentError::UnsupportedVersion(doc.version));
    }

    let objects = doc.objects.into_iter().map(object_from_raw).collect();
    let mut scene = Scene::new();
    scene.reset(doc.background, objects);
    log::debug!("imported document with {} objects", scene.len());
    Ok(scene)
}
