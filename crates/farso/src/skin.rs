//! Skins: atlas backed, 9-slice-like element styles.
//!
//! A skin file is a key/value text file. Global keys (`image`, `font`,
//! `font_size`) come first, then one `[section]` per element type:
//!
//! ```text
//! image = clean.png
//! font = LiberationSans.ttf
//! font_size = 10
//!
//! [window]
//! top_left     = 0,0,3,3
//! top          = 4,0,7,3
//! background   = 4,4,7,7
//! delta        = 0,0,0,0
//! text_area    = 4,2,4,2
//! font_color   = 255,255,255,255
//! font_align   = center
//! ```
//!
//! Geometry resolution ([`SkinElement::bounds`], [`SkinElement::body`]) is
//! pure, so widgets get the same answers whether or not the atlas is loaded.

use crate::error::{Error, Result};
use crate::font::FontAlignment;
use crate::renderer::{Draw, Renderer, Surface};
use farso_core::geometry::{Color, Rect};
use farso_core::profiling::profile_function;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Font size used when neither the element nor the skin defines one.
pub const DEFAULT_FONT_SIZE: u32 = 10;

/// Visual styles a skin can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkinElementType {
    Window,
    WindowTitleBar,
    WindowTitleBarInactive,
    ButtonEnabled,
    ButtonOver,
    ButtonPressed,
    ButtonDisabled,
    CheckBoxUnchecked,
    CheckBoxChecked,
    CheckBoxDisabled,
    Label,
    Container,
    CursorTip,
}

impl SkinElementType {
    pub const ALL: [SkinElementType; 13] = [
        Self::Window,
        Self::WindowTitleBar,
        Self::WindowTitleBarInactive,
        Self::ButtonEnabled,
        Self::ButtonOver,
        Self::ButtonPressed,
        Self::ButtonDisabled,
        Self::CheckBoxUnchecked,
        Self::CheckBoxChecked,
        Self::CheckBoxDisabled,
        Self::Label,
        Self::Container,
        Self::CursorTip,
    ];

    /// Section name used in skin files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::WindowTitleBar => "window_title_bar",
            Self::WindowTitleBarInactive => "window_title_bar_inactive",
            Self::ButtonEnabled => "button_enabled",
            Self::ButtonOver => "button_over",
            Self::ButtonPressed => "button_pressed",
            Self::ButtonDisabled => "button_disabled",
            Self::CheckBoxUnchecked => "checkbox_unchecked",
            Self::CheckBoxChecked => "checkbox_checked",
            Self::CheckBoxDisabled => "checkbox_disabled",
            Self::Label => "label",
            Self::Container => "container",
            Self::CursorTip => "cursor_tip",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

/// One source rectangle of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkinPiece {
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
    Background,
}

impl SkinPiece {
    const ALL: [SkinPiece; 9] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Left,
        Self::Right,
        Self::BottomLeft,
        Self::Bottom,
        Self::BottomRight,
        Self::Background,
    ];

    fn key(&self) -> &'static str {
        match self {
            Self::TopLeft => "top_left",
            Self::Top => "top",
            Self::TopRight => "top_right",
            Self::Left => "left",
            Self::Right => "right",
            Self::BottomLeft => "bottom_left",
            Self::Bottom => "bottom",
            Self::BottomRight => "bottom_right",
            Self::Background => "background",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

/// Per side distances, in `left,top,right,bottom` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

impl FromStr for Insets {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<i32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| format!("malformed insets '{s}'"))?;
        match values.as_slice() {
            [l, t, r, b] => Ok(Insets::new(*l, *t, *r, *b)),
            _ => Err(format!("expected 4 values, got '{s}'")),
        }
    }
}

/// A placed piece: where to copy from in the atlas and where to in the
/// target surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedPiece {
    pub piece: SkinPiece,
    pub source: Rect,
    pub dest: Rect,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinElement {
    pieces: [Option<Rect>; 9],
    /// Inset of the painted frame from the target rectangle.
    pub delta: Insets,
    /// Inset of the text area from the target rectangle.
    pub text_area: Option<Insets>,
    pub font: Option<PathBuf>,
    pub font_size: Option<u32>,
    pub font_color: Option<Color>,
    pub font_align: FontAlignment,
}

impl SkinElement {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(piece: SkinPiece) -> usize {
        SkinPiece::ALL
            .iter()
            .position(|p| *p == piece)
            .unwrap_or_default()
    }

    pub fn piece(&self, piece: SkinPiece) -> Option<Rect> {
        self.pieces[Self::slot(piece)]
    }

    pub fn set_piece(&mut self, piece: SkinPiece, source: Option<Rect>) {
        self.pieces[Self::slot(piece)] = source;
    }

    pub fn with_piece(mut self, piece: SkinPiece, source: Rect) -> Self {
        self.set_piece(piece, Some(source));
        self
    }

    pub fn with_delta(mut self, delta: Insets) -> Self {
        self.delta = delta;
        self
    }

    fn max_extent(a: Option<Rect>, b: Option<Rect>, f: fn(&Rect) -> i32) -> Option<i32> {
        match (a.map(|r| f(&r)), b.map(|r| f(&r))) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    // Thickness of each side: the edge piece, else the thickest adjacent
    // corner, else undefined.
    fn left_thickness(&self) -> Option<i32> {
        self.piece(SkinPiece::Left).map(|r| r.width()).or_else(|| {
            Self::max_extent(
                self.piece(SkinPiece::TopLeft),
                self.piece(SkinPiece::BottomLeft),
                Rect::width,
            )
        })
    }

    fn right_thickness(&self) -> Option<i32> {
        self.piece(SkinPiece::Right).map(|r| r.width()).or_else(|| {
            Self::max_extent(
                self.piece(SkinPiece::TopRight),
                self.piece(SkinPiece::BottomRight),
                Rect::width,
            )
        })
    }

    fn top_thickness(&self) -> Option<i32> {
        self.piece(SkinPiece::Top).map(|r| r.height()).or_else(|| {
            Self::max_extent(
                self.piece(SkinPiece::TopLeft),
                self.piece(SkinPiece::TopRight),
                Rect::height,
            )
        })
    }

    fn bottom_thickness(&self) -> Option<i32> {
        self.piece(SkinPiece::Bottom).map(|r| r.height()).or_else(|| {
            Self::max_extent(
                self.piece(SkinPiece::BottomLeft),
                self.piece(SkinPiece::BottomRight),
                Rect::height,
            )
        })
    }

    /// Minimal rectangle actually painted for a `width` x `height` target,
    /// relative to the target's top-left corner.
    pub fn bounds(&self, width: i32, height: i32) -> Rect {
        let left = self.left_thickness().map_or(0, |_| self.delta.left);
        let top = self.top_thickness().map_or(0, |_| self.delta.top);
        let right = self.right_thickness().map_or(0, |_| self.delta.right);
        let bottom = self.bottom_thickness().map_or(0, |_| self.delta.bottom);
        Rect::from_size(0, 0, width, height).inset(left, top, right, bottom)
    }

    /// Content rectangle inside the frame, relative to the target's top-left.
    pub fn body(&self, width: i32, height: i32) -> Rect {
        let left = self.left_thickness().map_or(0, |t| self.delta.left + t);
        let top = self.top_thickness().map_or(0, |t| self.delta.top + t);
        let right = self.right_thickness().map_or(0, |t| self.delta.right + t);
        let bottom = self.bottom_thickness().map_or(0, |t| self.delta.bottom + t);
        Rect::from_size(0, 0, width, height).inset(left, top, right, bottom)
    }

    /// Area where the element's text goes.
    pub fn text_area(&self, width: i32, height: i32) -> Rect {
        match self.text_area {
            Some(i) => Rect::from_size(0, 0, width, height).inset(i.left, i.top, i.right, i.bottom),
            None => self.body(width, height),
        }
    }

    /// Places every defined piece for `target`. Background first, then
    /// edges, then corners, which is also the paint order.
    pub fn place(&self, target: Rect) -> Vec<PlacedPiece> {
        let (dx, dy) = (target.x1, target.y1);
        let frame = self.bounds(target.width(), target.height()).translate(dx, dy);
        let body = self.body(target.width(), target.height()).translate(dx, dy);
        let width_of = |p| self.piece(p).map_or(0, |r: Rect| r.width());
        let height_of = |p| self.piece(p).map_or(0, |r: Rect| r.height());

        let mut placed = Vec::with_capacity(9);
        let mut push = |piece: SkinPiece, dest: Rect| {
            if let Some(source) = self.piece(piece)
                && !dest.is_empty()
            {
                placed.push(PlacedPiece {
                    piece,
                    source,
                    dest,
                });
            }
        };

        push(SkinPiece::Background, body);

        if let Some(src) = self.piece(SkinPiece::Top) {
            push(
                SkinPiece::Top,
                Rect::new(
                    frame.x1 + width_of(SkinPiece::TopLeft),
                    frame.y1,
                    frame.x2 - width_of(SkinPiece::TopRight),
                    frame.y1 + src.height() - 1,
                ),
            );
        }
        if let Some(src) = self.piece(SkinPiece::Bottom) {
            push(
                SkinPiece::Bottom,
                Rect::new(
                    frame.x1 + width_of(SkinPiece::BottomLeft),
                    frame.y2 - src.height() + 1,
                    frame.x2 - width_of(SkinPiece::BottomRight),
                    frame.y2,
                ),
            );
        }
        if let Some(src) = self.piece(SkinPiece::Left) {
            push(
                SkinPiece::Left,
                Rect::new(
                    frame.x1,
                    frame.y1 + height_of(SkinPiece::TopLeft),
                    frame.x1 + src.width() - 1,
                    frame.y2 - height_of(SkinPiece::BottomLeft),
                ),
            );
        }
        if let Some(src) = self.piece(SkinPiece::Right) {
            push(
                SkinPiece::Right,
                Rect::new(
                    frame.x2 - src.width() + 1,
                    frame.y1 + height_of(SkinPiece::TopRight),
                    frame.x2,
                    frame.y2 - height_of(SkinPiece::BottomRight),
                ),
            );
        }

        let corner = |piece: SkinPiece, x: i32, y: i32| {
            self.piece(piece)
                .map(|src| Rect::from_size(x, y, src.width(), src.height()))
        };
        if let Some(dest) = corner(SkinPiece::TopLeft, frame.x1, frame.y1) {
            push(SkinPiece::TopLeft, dest);
        }
        if let Some(dest) = corner(SkinPiece::TopRight, frame.x2 - width_of(SkinPiece::TopRight) + 1, frame.y1) {
            push(SkinPiece::TopRight, dest);
        }
        if let Some(dest) = corner(
            SkinPiece::BottomLeft,
            frame.x1,
            frame.y2 - height_of(SkinPiece::BottomLeft) + 1,
        ) {
            push(SkinPiece::BottomLeft, dest);
        }
        if let Some(dest) = corner(
            SkinPiece::BottomRight,
            frame.x2 - width_of(SkinPiece::BottomRight) + 1,
            frame.y2 - height_of(SkinPiece::BottomRight) + 1,
        ) {
            push(SkinPiece::BottomRight, dest);
        }

        placed
    }
}

/// A loaded skin.
pub struct Skin {
    path: PathBuf,
    image: Option<PathBuf>,
    atlas: Option<Box<dyn Surface>>,
    default_font: Option<PathBuf>,
    default_font_size: u32,
    elements: IndexMap<SkinElementType, SkinElement>,
}

impl std::fmt::Debug for Skin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Skin")
            .field("path", &self.path)
            .field("image", &self.image)
            .field("atlas_loaded", &self.atlas.is_some())
            .field("elements", &self.elements.len())
            .finish()
    }
}

impl Skin {
    /// Reads the skin file at `path` and loads its atlas through `renderer`.
    pub fn load(path: &Path, renderer: &mut dyn Renderer) -> Result<Skin> {
        profile_function!();
        let source = std::fs::read_to_string(path).map_err(|source| Error::SkinIo {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut skin = Skin::parse(&source, base_dir)?;
        skin.path = path.to_path_buf();
        if let Some(image) = &skin.image {
            skin.atlas = Some(renderer.load_image_to_surface(image)?);
        }
        tracing::info!(
            "Loaded skin {} ({} elements)",
            path.display(),
            skin.elements.len()
        );
        Ok(skin)
    }

    /// Parses a skin definition. Relative resource paths resolve against
    /// `base_dir`. The atlas is not loaded.
    pub fn parse(source: &str, base_dir: &Path) -> Result<Skin> {
        let mut skin = Skin {
            path: PathBuf::new(),
            image: None,
            atlas: None,
            default_font: None,
            default_font_size: DEFAULT_FONT_SIZE,
            elements: IndexMap::new(),
        };

        enum Section {
            Global,
            Element(SkinElementType),
            Unknown,
        }
        let mut section = Section::Global;

        for (idx, raw) in source.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let parse_err = |message: String| Error::SkinParse {
                line: line_no,
                message,
            };

            if let Some(name) = line.strip_prefix('[') {
                let name = name
                    .strip_suffix(']')
                    .ok_or_else(|| parse_err(format!("unterminated section '{line}'")))?
                    .trim();
                section = match SkinElementType::from_key(name) {
                    Some(t) => {
                        skin.elements.entry(t).or_default();
                        Section::Element(t)
                    }
                    None => {
                        tracing::warn!("Skin line {line_no}: unknown element '{name}', ignored");
                        Section::Unknown
                    }
                };
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| parse_err(format!("expected 'key = value', got '{line}'")))?;

            match &section {
                Section::Unknown => {}
                Section::Global => match key {
                    "image" => skin.image = Some(base_dir.join(value)),
                    "font" => skin.default_font = Some(base_dir.join(value)),
                    "font_size" => {
                        skin.default_font_size = value
                            .parse()
                            .map_err(|_| parse_err(format!("bad font_size '{value}'")))?
                    }
                    _ => tracing::warn!("Skin line {line_no}: unknown key '{key}', ignored"),
                },
                Section::Element(t) => {
                    let element = skin.elements.entry(*t).or_default();
                    Self::apply_element_key(element, key, value, base_dir).map_err(parse_err)?;
                }
            }
        }

        Ok(skin)
    }

    fn apply_element_key(
        element: &mut SkinElement,
        key: &str,
        value: &str,
        base_dir: &Path,
    ) -> std::result::Result<(), String> {
        if let Some(piece) = SkinPiece::from_key(key) {
            let rect = value.parse::<Rect>().map_err(|e| e.to_string())?;
            element.set_piece(piece, Some(rect));
            return Ok(());
        }
        match key {
            "delta" => element.delta = value.parse()?,
            "text_area" => element.text_area = Some(value.parse()?),
            "font" => element.font = Some(base_dir.join(value)),
            "font_size" => {
                element.font_size = Some(
                    value
                        .parse()
                        .map_err(|_| format!("bad font_size '{value}'"))?,
                )
            }
            "font_color" => {
                element.font_color = Some(value.parse::<Color>().map_err(|e| e.to_string())?)
            }
            "font_align" => {
                element.font_align = FontAlignment::from_key(value)
                    .ok_or_else(|| format!("bad font_align '{value}'"))?
            }
            _ => tracing::warn!("Unknown skin element key '{key}', ignored"),
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> Option<&Path> {
        self.image.as_deref()
    }

    pub fn element(&self, kind: SkinElementType) -> Option<&SkinElement> {
        self.elements.get(&kind)
    }

    pub fn insert_element(&mut self, kind: SkinElementType, element: SkinElement) {
        self.elements.insert(kind, element);
    }

    pub fn atlas(&self) -> Option<&dyn Surface> {
        self.atlas.as_deref()
    }

    pub fn atlas_mut(&mut self) -> Option<&mut (dyn Surface + 'static)> {
        self.atlas.as_deref_mut()
    }

    pub fn default_font(&self) -> Option<&Path> {
        self.default_font.as_deref()
    }

    /// The element's font file, falling back to the skin default.
    pub fn font_for(&self, kind: SkinElementType) -> Option<&Path> {
        self.element(kind)
            .and_then(|e| e.font.as_deref())
            .or(self.default_font.as_deref())
    }

    pub fn font_size_for(&self, kind: SkinElementType) -> u32 {
        self.element(kind)
            .and_then(|e| e.font_size)
            .unwrap_or(self.default_font_size)
    }

    /// Paints `kind` stretched over `rect` of `target`.
    ///
    /// Returns false when the element or the atlas is missing; callers then
    /// fall back to their unskinned look.
    pub fn draw_element(
        &self,
        draw: &mut dyn Draw,
        target: &mut dyn Surface,
        kind: SkinElementType,
        rect: Rect,
    ) -> bool {
        let (Some(element), Some(atlas)) = (self.element(kind), self.atlas()) else {
            return false;
        };
        for placed in element.place(rect) {
            draw.blit(atlas, placed.source, target, placed.dest);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed() -> SkinElement {
        SkinElement::new()
            .with_piece(SkinPiece::TopLeft, Rect::new(0, 0, 3, 3))
            .with_piece(SkinPiece::Top, Rect::new(4, 0, 7, 5))
            .with_piece(SkinPiece::TopRight, Rect::new(8, 0, 11, 3))
            .with_piece(SkinPiece::Left, Rect::new(0, 4, 1, 7))
            .with_piece(SkinPiece::Background, Rect::new(4, 4, 7, 7))
    }

    #[test]
    fn test_bounds_falls_back_on_undefined_sides() {
        let element = framed().with_delta(Insets::new(1, 2, 3, 4));
        // Right is defined through the top right corner, bottom is not.
        assert_eq!(element.bounds(100, 50), Rect::new(1, 2, 96, 49));
    }

    #[test]
    fn test_body_adds_thickness() {
        let element = framed().with_delta(Insets::new(1, 2, 3, 4));
        // left: 1 + 2 (edge), top: 2 + 6 (edge wins over corners),
        // right: 3 + 4 (corner), bottom: undefined.
        assert_eq!(element.body(100, 50), Rect::new(3, 8, 92, 49));
    }

    #[test]
    fn test_empty_element_is_whole_target() {
        let element = SkinElement::new();
        assert_eq!(element.bounds(20, 10), Rect::new(0, 0, 19, 9));
        assert_eq!(element.body(20, 10), Rect::new(0, 0, 19, 9));
        assert_eq!(element.text_area(20, 10), Rect::new(0, 0, 19, 9));
    }

    #[test]
    fn test_text_area_inset() {
        let mut element = framed();
        element.text_area = Some(Insets::new(4, 2, 4, 2));
        assert_eq!(element.text_area(40, 20), Rect::new(4, 2, 35, 17));
    }

    #[test]
    fn test_place_corners_and_edges() {
        let element = framed();
        let placed = element.place(Rect::from_size(10, 10, 40, 20));
        let find = |p| placed.iter().find(|pp| pp.piece == p).map(|pp| pp.dest);

        assert_eq!(placed[0].piece, SkinPiece::Background);
        assert_eq!(find(SkinPiece::TopLeft), Some(Rect::new(10, 10, 13, 13)));
        assert_eq!(find(SkinPiece::TopRight), Some(Rect::new(46, 10, 49, 13)));
        assert_eq!(find(SkinPiece::Top), Some(Rect::new(14, 10, 45, 15)));
        assert_eq!(find(SkinPiece::Left), Some(Rect::new(10, 14, 11, 29)));
        assert_eq!(find(SkinPiece::Bottom), None);
    }

    #[test]
    fn test_parse_skin() {
        let source = "\
image = atlas.png   # the atlas
font = sans.ttf
font_size = 11

[window]
top_left = 0,0,3,3
top = 4,0,7,3
delta = 1,1,1,1
font_color = 10,20,30
font_align = center

[button_enabled]
background = 0,0,1,1
font_size = 14

[sparkles]
whatever = 1
";
        let skin = Skin::parse(source, Path::new("skins")).unwrap();
        assert_eq!(skin.image(), Some(Path::new("skins/atlas.png")));
        assert_eq!(skin.default_font(), Some(Path::new("skins/sans.ttf")));

        let window = skin.element(SkinElementType::Window).unwrap();
        assert_eq!(window.piece(SkinPiece::Top), Some(Rect::new(4, 0, 7, 3)));
        assert_eq!(window.delta, Insets::new(1, 1, 1, 1));
        assert_eq!(window.font_color, Some(Color::rgb(10, 20, 30)));
        assert_eq!(window.font_align, FontAlignment::Center);

        assert_eq!(skin.font_size_for(SkinElementType::ButtonEnabled), 14);
        assert_eq!(skin.font_size_for(SkinElementType::Window), 11);
        assert!(skin.element(SkinElementType::Label).is_none());
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = Skin::parse("[window]\ntop = 1,2,3\n", Path::new("")).unwrap_err();
        match err {
            Error::SkinParse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(Skin::parse("[window\n", Path::new("")).is_err());
        assert!(Skin::parse("just words\n", Path::new("")).is_err());
    }
}
