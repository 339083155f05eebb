//! Core object model for Easel scenes.
//!
//! A scene is a flat, ordered list of objects (stacking order == list order,
//! last object drawn on top). Every object carries a `Props` record — the
//! transform, visibility, lock, and paint state the editor tracks — plus an
//! optional text block and a kind-specific shape payload. Groups own their
//! children outright; child objects never appear in the top-level list.
//!
//! `Props` is deliberately the exact property set the snapshot codec diffs:
//! keeping it a plain value struct means capture and apply are field copies,
//! never per-key reflection.

use crate::id::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

// ─── Color ───────────────────────────────────────────────────────────────

/// RGBA color, 8 bits per channel. Serialized as a CSS-style hex string
/// (`#rrggbb`, or `#rrggbbaa` when not fully opaque) so documents read the
/// way the host canvas writes colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB`, or `#RRGGBBAA`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex.strip_prefix('#').unwrap_or(hex).as_bytes();
        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 | 8 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                let a = if bytes.len() == 8 {
                    hex_val(bytes[6])? << 4 | hex_val(bytes[7])?
                } else {
                    0xff
                };
                Some(Self::rgba(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Emit as lowercase hex, alpha channel only when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`")))
    }
}

/// Clamp an opacity value into the valid [0, 1] range.
pub fn clamp_opacity(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

// ─── Origins & text attributes ───────────────────────────────────────────

/// Horizontal anchor the object's `left` is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginX {
    Left,
    Center,
    Right,
}

/// Vertical anchor the object's `top` is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginY {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

// ─── Path data ───────────────────────────────────────────────────────────

/// A polyline in scene coordinates. Freehand strokes, polygon outlines, and
/// eraser marks all reduce to point runs at this layer; curve fitting is the
/// host's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathData(pub Vec<(f32, f32)>);

impl PathData {
    pub fn new(points: Vec<(f32, f32)>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[(f32, f32)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ─── Identity & metadata ─────────────────────────────────────────────────

/// Object kind tag. Doubles as the `type` discriminator in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Rect,
    Circle,
    Polygon,
    Text,
    Path,
    Image,
    Svg,
    Group,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Rect => "rect",
            ObjectKind::Circle => "circle",
            ObjectKind::Polygon => "polygon",
            ObjectKind::Text => "text",
            ObjectKind::Path => "path",
            ObjectKind::Image => "image",
            ObjectKind::Svg => "svg",
            ObjectKind::Group => "group",
        }
    }
}

/// The application-level identity record attached to every scene object.
/// Commands, snapshots, and the clipboard address objects exclusively
/// through `id`; it must be non-empty from the moment an object can be
/// interacted with, and is never rewritten while the object is reachable
/// from the scene, a command stack, or the clipboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ObjectMeta {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::fresh(),
            kind,
            name: None,
        }
    }

    /// Build metadata from whatever a document or host handed us.
    /// Idempotent on identity: a present, non-empty id is kept verbatim;
    /// only absent or empty ids are replaced with a fresh one.
    pub fn ensure(id: Option<&str>, kind: ObjectKind, name: Option<String>) -> Self {
        let id = match id {
            Some(s) if !s.is_empty() => ObjectId::intern(s),
            _ => ObjectId::fresh(),
        };
        Self { id, kind, name }
    }
}

// ─── Properties (the snapshot whitelist) ─────────────────────────────────

/// Every property the editor tracks for diffing and undo, as one plain
/// value struct. Field names serialize camelCase to match the canvas-side
/// vocabulary (`scaleX`, `lockMovementY`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Props {
    pub left: f32,
    pub top: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub angle: f32, // degrees
    pub skew_x: f32,
    pub skew_y: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    pub origin_x: OriginX,
    pub origin_y: OriginY,
    pub visible: bool,
    pub selectable: bool,
    pub evented: bool,
    pub lock_movement_x: bool,
    pub lock_movement_y: bool,
    pub lock_scaling_x: bool,
    pub lock_scaling_y: bool,
    pub lock_rotation: bool,
    pub opacity: f32, // 0.0 .. 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    pub stroke_width: f32,
    /// Eraser marks accumulated on this object. Most objects carry none;
    /// one gesture usually leaves one mark.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub eraser: SmallVec<[PathData; 1]>,
}

impl Default for Props {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
            flip_x: false,
            flip_y: false,
            origin_x: OriginX::Left,
            origin_y: OriginY::Top,
            visible: true,
            selectable: true,
            evented: true,
            lock_movement_x: false,
            lock_movement_y: false,
            lock_scaling_x: false,
            lock_scaling_y: false,
            lock_rotation: false,
            opacity: 1.0,
            fill: None,
            stroke: None,
            stroke_width: 1.0,
            eraser: SmallVec::new(),
        }
    }
}

/// Text-specific properties, present only on text-capable objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub text: String,
    pub font_size: f32,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
    pub underline: bool,
    pub linethrough: bool,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 16.0,
            font_family: "Inter".into(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_align: TextAlign::Left,
            underline: false,
            linethrough: false,
        }
    }
}

// ─── Shape payloads ──────────────────────────────────────────────────────

/// Kind-specific geometry. Text carries no payload here — its content lives
/// in `SceneObject::text` so the snapshot codec sees it.
#[derive(Debug, Clone)]
pub enum Shape {
    Rect { width: f32, height: f32 },
    Circle { radius: f32 },
    Polygon { points: PathData },
    Text,
    Path { points: PathData },
    Image { src: String },
    Svg { src: String },
    Group { children: Vec<SceneObject> },
}

impl Shape {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Shape::Rect { .. } => ObjectKind::Rect,
            Shape::Circle { .. } => ObjectKind::Circle,
            Shape::Polygon { .. } => ObjectKind::Polygon,
            Shape::Text => ObjectKind::Text,
            Shape::Path { .. } => ObjectKind::Path,
            Shape::Image { .. } => ObjectKind::Image,
            Shape::Svg { .. } => ObjectKind::Svg,
            Shape::Group { .. } => ObjectKind::Group,
        }
    }
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Axis-aligned bounding box, cached on the object. Stale bounds are the
/// classic retained-mode bug: every property write must be followed by
/// `SceneObject::update_coords`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

// ─── Scene object ────────────────────────────────────────────────────────

/// A single visual entity: identity + tracked properties + optional text
/// block + shape payload + cached bounds.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub meta: ObjectMeta,
    pub props: Props,
    pub text: Option<TextProps>,
    pub shape: Shape,
    coords: Bounds,
}

impl SceneObject {
    pub fn new(shape: Shape) -> Self {
        let kind = shape.kind();
        let mut obj = Self {
            meta: ObjectMeta::new(kind),
            props: Props::default(),
            text: if kind == ObjectKind::Text {
                Some(TextProps::default())
            } else {
                None
            },
            shape,
            coords: Bounds::default(),
        };
        obj.update_coords();
        obj
    }

    /// Rebuild an object from document parts. Bounds are recomputed; the
    /// caller is responsible for identity (see `ObjectMeta::ensure`).
    pub fn from_parts(
        meta: ObjectMeta,
        props: Props,
        text: Option<TextProps>,
        shape: Shape,
    ) -> Self {
        let mut obj = Self {
            meta,
            props,
            text,
            shape,
            coords: Bounds::default(),
        };
        obj.update_coords();
        obj
    }

    pub fn id(&self) -> ObjectId {
        self.meta.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.meta.kind
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    /// Cached bounding box as of the last `update_coords`.
    pub fn coords(&self) -> Bounds {
        self.coords
    }

    /// Unscaled size of the shape payload. Text measures by a rough
    /// em-width heuristic; exact metrics are the renderer's job and never
    /// feed back into the model.
    pub fn intrinsic_size(&self) -> (f32, f32) {
        match &self.shape {
            Shape::Rect { width, height } => (*width, *height),
            Shape::Circle { radius } => (radius * 2.0, radius * 2.0),
            Shape::Polygon { points } | Shape::Path { points } => extent(points),
            Shape::Text => {
                let text = self.text.as_ref();
                let size = text.map_or(16.0, |t| t.font_size);
                let longest = text
                    .map(|t| t.text.lines().map(str::len).max().unwrap_or(0))
                    .unwrap_or(0);
                let lines = text.map(|t| t.text.lines().count().max(1)).unwrap_or(1);
                (longest as f32 * size * 0.6, lines as f32 * size * 1.2)
            }
            Shape::Image { .. } | Shape::Svg { .. } => (0.0, 0.0),
            Shape::Group { children } => {
                let mut right: f32 = 0.0;
                let mut bottom: f32 = 0.0;
                for child in children {
                    let b = child.coords;
                    right = right.max(b.left + b.width);
                    bottom = bottom.max(b.top + b.height);
                }
                (right, bottom)
            }
        }
    }

    /// Recompute the cached bounding box from the current properties.
    /// Rotation is folded in by rotating the corners; skew is ignored (the
    /// cache is a conservative interaction box, not render geometry).
    pub fn update_coords(&mut self) {
        let (w, h) = self.intrinsic_size();
        let w = w * self.props.scale_x;
        let h = h * self.props.scale_y;

        let anchor_x = match self.props.origin_x {
            OriginX::Left => 0.0,
            OriginX::Center => w / 2.0,
            OriginX::Right => w,
        };
        let anchor_y = match self.props.origin_y {
            OriginY::Top => 0.0,
            OriginY::Center => h / 2.0,
            OriginY::Bottom => h,
        };

        let rad = self.props.angle.to_radians();
        let (sin, cos) = rad.sin_cos();
        let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];

        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        for (cx, cy) in corners {
            let dx = cx - anchor_x;
            let dy = cy - anchor_y;
            let rx = dx * cos - dy * sin;
            let ry = dx * sin + dy * cos;
            min_x = min_x.min(rx);
            min_y = min_y.min(ry);
            max_x = max_x.max(rx);
            max_y = max_y.max(ry);
        }

        self.coords = Bounds {
            left: self.props.left + min_x,
            top: self.props.top + min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        };
    }

    /// Mint a fresh id for this object and, recursively, for every child of
    /// a group. Required on every clone that will coexist with its source;
    /// two live objects sharing an id would make id-keyed snapshot lookups
    /// ambiguous and silently corrupt one object's history.
    pub fn regenerate_ids(&mut self) {
        self.meta.id = ObjectId::fresh();
        if let Shape::Group { children } = &mut self.shape {
            for child in children {
                child.regenerate_ids();
            }
        }
    }
}

// ─── Factory defaults ────────────────────────────────────────────────────

impl SceneObject {
    /// Default rectangle: the blue 160×110 at (120, 120).
    pub fn rect() -> Self {
        let mut obj = Self::new(Shape::Rect {
            width: 160.0,
            height: 110.0,
        });
        obj.props.left = 120.0;
        obj.props.top = 120.0;
        obj.props.fill = Color::from_hex("#3b82f6");
        obj.props.stroke = Color::from_hex("#111827");
        obj.props.stroke_width = 2.0;
        obj.update_coords();
        obj
    }

    /// Default circle: the green r=60 at (160, 160).
    pub fn circle() -> Self {
        let mut obj = Self::new(Shape::Circle { radius: 60.0 });
        obj.props.left = 160.0;
        obj.props.top = 160.0;
        obj.props.fill = Color::from_hex("#22c55e");
        obj.props.stroke = Color::from_hex("#111827");
        obj.props.stroke_width = 2.0;
        obj.update_coords();
        obj
    }

    /// Default editable text at (140, 140), 32pt.
    pub fn text() -> Self {
        let mut obj = Self::new(Shape::Text);
        obj.props.left = 140.0;
        obj.props.top = 140.0;
        obj.props.fill = Color::from_hex("#111827");
        if let Some(t) = obj.text.as_mut() {
            t.text = "Edit me".into();
            t.font_size = 32.0;
        }
        obj.update_coords();
        obj
    }

    /// A freehand stroke from captured pointer positions.
    pub fn path(points: Vec<(f32, f32)>) -> Self {
        Self::new(Shape::Path {
            points: PathData::new(points),
        })
    }

    /// A group owning `children` outright.
    pub fn group(children: Vec<SceneObject>) -> Self {
        Self::new(Shape::Group { children })
    }
}

fn extent(points: &PathData) -> (f32, f32) {
    let mut max_x: f32 = 0.0;
    let mut max_y: f32 = 0.0;
    for (x, y) in points.points() {
        max_x = max_x.max(*x);
        max_y = max_y.max(*y);
    }
    (max_x, max_y)
}

// ─── Tests ───────────────────────────────────────────────────────────────
