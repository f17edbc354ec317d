use geo::{Distance, Haversine, Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned longitude/latitude rectangle in WGS84 degrees.
///
/// Widths and heights in metres are great-circle approximations evaluated along
/// the centre parallel (width) and centre meridian (height). They are only
/// meaningful for rectangles spanning less than a hemisphere, which is why the
/// quadtree compiler pre-splits the globe before measuring anything.
///
/// # Examples
///
/// ```
/// use speedregions_types::bounds::Bounds;
///
/// let bounds = Bounds::new(-10.0, 10.0, 40.0, 50.0);
/// assert_eq!(bounds.centre_lng(), 0.0);
/// assert_eq!(bounds.centre_lat(), 45.0);
///
/// let [south, north] = bounds.horizontal_split();
/// assert_eq!(south.max_lat, 45.0);
/// assert_eq!(north.min_lat, 45.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Bounds {
    /// Create bounds from their four edges.
    ///
    /// Callers must pass `min <= max` on both axes; this is checked in debug
    /// builds. Deserialized bounds are not checked, see [`Bounds::is_valid`].
    pub fn new(min_lng: f64, max_lng: f64, min_lat: f64, max_lat: f64) -> Self {
        debug_assert!(
            !(min_lng > max_lng) && !(min_lat > max_lat),
            "inverted bounds: lng {}..{}, lat {}..{}",
            min_lng,
            max_lng,
            min_lat,
            max_lat
        );
        Self {
            min_lng,
            max_lng,
            min_lat,
            max_lat,
        }
    }

    /// Whether all edges are finite and `min <= max` on both axes.
    pub fn is_valid(&self) -> bool {
        [self.min_lng, self.max_lng, self.min_lat, self.max_lat]
            .iter()
            .all(|v| v.is_finite())
            && self.min_lng <= self.max_lng
            && self.min_lat <= self.max_lat
    }

    /// Bounds covering the whole globe.
    pub fn global() -> Self {
        Self::new(-180.0, 180.0, -90.0, 90.0)
    }

    /// Create bounds from a `geo::Rect` (x = longitude, y = latitude).
    pub fn from_rect(rect: &Rect) -> Self {
        Self::new(rect.min().x, rect.max().x, rect.min().y, rect.max().y)
    }

    /// Convert to a `geo::Rect`.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            geo::coord! { x: self.min_lng, y: self.min_lat },
            geo::coord! { x: self.max_lng, y: self.max_lat },
        )
    }

    pub fn centre_lng(&self) -> f64 {
        0.5 * (self.min_lng + self.max_lng)
    }

    pub fn centre_lat(&self) -> f64 {
        0.5 * (self.min_lat + self.max_lat)
    }

    /// Width in metres, measured along the centre parallel.
    pub fn width_metres(&self) -> f64 {
        let lat = self.centre_lat();
        Haversine.distance(
            Point::new(self.min_lng, lat),
            Point::new(self.max_lng, lat),
        )
    }

    /// Height in metres, measured along the centre meridian.
    pub fn height_metres(&self) -> f64 {
        let lng = self.centre_lng();
        Haversine.distance(
            Point::new(lng, self.min_lat),
            Point::new(lng, self.max_lat),
        )
    }

    /// Split along the line of constant latitude through the centre.
    ///
    /// Returns `[south, north]`.
    pub fn horizontal_split(&self) -> [Bounds; 2] {
        let lat = self.centre_lat();
        [
            Self::new(self.min_lng, self.max_lng, self.min_lat, lat),
            Self::new(self.min_lng, self.max_lng, lat, self.max_lat),
        ]
    }

    /// Split along the line of constant longitude through the centre.
    ///
    /// Returns `[west, east]`.
    pub fn vertical_split(&self) -> [Bounds; 2] {
        let lng = self.centre_lng();
        [
            Self::new(self.min_lng, lng, self.min_lat, self.max_lat),
            Self::new(lng, self.max_lng, self.min_lat, self.max_lat),
        ]
    }

    /// Split into four equal quadrants: south-west, south-east, north-west, north-east.
    pub fn quad_split(&self) -> [Bounds; 4] {
        let [south, north] = self.horizontal_split();
        let [sw, se] = south.vertical_split();
        let [nw, ne] = north.vertical_split();
        [sw, se, nw, ne]
    }

    /// Scale the rectangle about its centre so each side grows by `fraction`
    /// of its length (0.01 gives a rectangle 1% wider and 1% taller).
    pub fn enlarged(&self, fraction: f64) -> Self {
        let half = 0.5 + fraction * 0.5;
        let width = self.max_lng - self.min_lng;
        let height = self.max_lat - self.min_lat;
        let (lng, lat) = (self.centre_lng(), self.centre_lat());
        Self::new(
            lng - width * half,
            lng + width * half,
            lat - height * half,
            lat + height * half,
        )
    }

    /// Closed-interval overlap test; rectangles sharing only an edge intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(self.max_lng < other.min_lng
            || self.min_lng > other.max_lng
            || self.max_lat < other.min_lat
            || self.min_lat > other.max_lat)
    }

    pub fn contains_point(&self, lng: f64, lat: f64) -> bool {
        lng >= self.min_lng && lng <= self.max_lng && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Grow these bounds so they also cover `other`.
    pub fn expand_to_include(&mut self, other: &Bounds) {
        self.min_lng = self.min_lng.min(other.min_lng);
        self.max_lng = self.max_lng.max(other.max_lng);
        self.min_lat = self.min_lat.min(other.min_lat);
        self.max_lat = self.max_lat.max(other.max_lat);
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self::from_rect(&rect)
    }
}
