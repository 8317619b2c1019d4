//! Command-level queries and their translation into request descriptors.
//!
//! Each query type validates its own arguments and produces a
//! [`RequestDescriptor`] for the pipeline. Validation failures are reported
//! as [`GeocodeError::InvalidInput`], which is never retried.

use super::format::OutputFormat;
use super::request::RequestDescriptor;
use crate::{GeocodeError, Result};

/// Largest `limit` the service accepts for search requests.
pub const MAX_SEARCH_LIMIT: u32 = 40;

/// Largest number of OSM ids accepted by a single lookup.
pub const MAX_LOOKUP_IDS: usize = 50;

/// Largest reverse-geocoding zoom level (building detail).
pub const MAX_ZOOM: u8 = 18;

/// Parameters shared by every geocoding endpoint.
#[derive(Debug, Clone, Default)]
pub struct CommonOptions {
    pub format: OutputFormat,
    pub address_details: bool,
    pub extra_tags: bool,
    pub name_details: bool,
    pub accept_language: Option<String>,
    pub email: Option<String>,
}

impl CommonOptions {
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn address_details(mut self, enabled: bool) -> Self {
        self.address_details = enabled;
        self
    }

    pub fn extra_tags(mut self, enabled: bool) -> Self {
        self.extra_tags = enabled;
        self
    }

    pub fn name_details(mut self, enabled: bool) -> Self {
        self.name_details = enabled;
        self
    }

    pub fn accept_language(mut self, lang: impl Into<String>) -> Self {
        self.accept_language = Some(lang.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    fn apply(&self, descriptor: RequestDescriptor) -> RequestDescriptor {
        let mut d = descriptor.param("format", self.format.as_str());
        if self.address_details {
            d = d.param("addressdetails", "1");
        }
        if self.extra_tags {
            d = d.param("extratags", "1");
        }
        if self.name_details {
            d = d.param("namedetails", "1");
        }
        d.param_opt("accept-language", self.accept_language.clone())
            .param_opt("email", self.email.clone())
    }
}

// ============================================================================
// Reverse
// ============================================================================

/// Reverse geocoding: coordinates to address.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lon: f64,
    pub zoom: Option<u8>,
}

impl ReverseQuery {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            zoom: None,
        }
    }

    /// Parse coordinates from command-line text.
    pub fn parse(lat: &str, lon: &str) -> Result<Self> {
        Ok(Self::new(
            parse_coordinate("latitude", lat)?,
            parse_coordinate("longitude", lon)?,
        ))
    }

    pub fn zoom(mut self, zoom: u8) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn to_descriptor(&self, common: &CommonOptions) -> Result<RequestDescriptor> {
        check_range("latitude", self.lat, 90.0)?;
        check_range("longitude", self.lon, 180.0)?;
        if let Some(zoom) = self.zoom
            && zoom > MAX_ZOOM
        {
            return Err(GeocodeError::InvalidInput(format!(
                "zoom must be between 0 and {MAX_ZOOM}, got {zoom}"
            )));
        }

        let d = RequestDescriptor::get("/reverse")
            .param("lat", self.lat.to_string())
            .param("lon", self.lon.to_string())
            .param_opt("zoom", self.zoom.map(|z| z.to_string()));
        Ok(common.apply(d))
    }
}

fn parse_coordinate(name: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| GeocodeError::InvalidInput(format!("{name} is not a number: {raw:?}")))?;
    if !value.is_finite() {
        return Err(GeocodeError::InvalidInput(format!(
            "{name} must be finite, got {raw:?}"
        )));
    }
    Ok(value)
}

fn check_range(name: &str, value: f64, bound: f64) -> Result<()> {
    if !value.is_finite() || value < -bound || value > bound {
        return Err(GeocodeError::InvalidInput(format!(
            "{name} must be between -{bound} and {bound}, got {value}"
        )));
    }
    Ok(())
}

fn check_limit(limit: Option<u32>) -> Result<()> {
    match limit {
        Some(l) if l == 0 || l > MAX_SEARCH_LIMIT => Err(GeocodeError::InvalidInput(format!(
            "limit must be between 1 and {MAX_SEARCH_LIMIT}, got {l}"
        ))),
        _ => Ok(()),
    }
}

// ============================================================================
// Free-form search
// ============================================================================

/// Free-form search: a single query string such as "Eiffel Tower, Paris".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<u32>,
    pub country_codes: Vec<String>,
    /// `x1,y1,x2,y2` bounding box to prefer (or restrict to, with `bounded`).
    pub viewbox: Option<String>,
    pub bounded: bool,
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn country_codes(mut self, codes: Vec<String>) -> Self {
        self.country_codes = codes;
        self
    }

    pub fn viewbox(mut self, viewbox: impl Into<String>, bounded: bool) -> Self {
        self.viewbox = Some(viewbox.into());
        self.bounded = bounded;
        self
    }

    pub fn to_descriptor(&self, common: &CommonOptions) -> Result<RequestDescriptor> {
        let q = self.q.trim();
        if q.is_empty() {
            return Err(GeocodeError::InvalidInput("search query is empty".into()));
        }
        check_limit(self.limit)?;

        let mut d = RequestDescriptor::get("/search")
            .param("q", q)
            .param_opt("limit", self.limit.map(|l| l.to_string()));
        if !self.country_codes.is_empty() {
            d = d.param("countrycodes", self.country_codes.join(","));
        }
        if let Some(viewbox) = &self.viewbox {
            d = d.param("viewbox", viewbox.as_str());
            if self.bounded {
                d = d.param("bounded", "1");
            }
        }
        Ok(common.apply(d))
    }
}

// ============================================================================
// Structured search
// ============================================================================

/// Structured search: address split into its components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredQuery {
    pub amenity: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub limit: Option<u32>,
}

impl StructuredQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amenity(mut self, v: impl Into<String>) -> Self {
        self.amenity = Some(v.into());
        self
    }

    pub fn street(mut self, v: impl Into<String>) -> Self {
        self.street = Some(v.into());
        self
    }

    pub fn city(mut self, v: impl Into<String>) -> Self {
        self.city = Some(v.into());
        self
    }

    pub fn county(mut self, v: impl Into<String>) -> Self {
        self.county = Some(v.into());
        self
    }

    pub fn state(mut self, v: impl Into<String>) -> Self {
        self.state = Some(v.into());
        self
    }

    pub fn country(mut self, v: impl Into<String>) -> Self {
        self.country = Some(v.into());
        self
    }

    pub fn postal_code(mut self, v: impl Into<String>) -> Self {
        self.postal_code = Some(v.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn fields(&self) -> [(&'static str, Option<&str>); 7] {
        [
            ("amenity", self.amenity.as_deref()),
            ("street", self.street.as_deref()),
            ("city", self.city.as_deref()),
            ("county", self.county.as_deref()),
            ("state", self.state.as_deref()),
            ("country", self.country.as_deref()),
            ("postalcode", self.postal_code.as_deref()),
        ]
    }

    pub fn to_descriptor(&self, common: &CommonOptions) -> Result<RequestDescriptor> {
        check_limit(self.limit)?;

        let mut d = RequestDescriptor::get("/search");
        let mut any = false;
        for (name, value) in self.fields() {
            if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
                d = d.param(name, v);
                any = true;
            }
        }
        if !any {
            return Err(GeocodeError::InvalidInput(
                "structured search needs at least one address field".into(),
            ));
        }
        let d = d.param_opt("limit", self.limit.map(|l| l.to_string()));
        Ok(common.apply(d))
    }
}

// ============================================================================
// Lookup
// ============================================================================

/// Address lookup for known OSM objects, e.g. `R146656` or `W104393803`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupQuery {
    pub osm_ids: Vec<String>,
}

impl LookupQuery {
    pub fn new(osm_ids: Vec<String>) -> Self {
        Self { osm_ids }
    }

    pub fn to_descriptor(&self, common: &CommonOptions) -> Result<RequestDescriptor> {
        if self.osm_ids.is_empty() || self.osm_ids.len() > MAX_LOOKUP_IDS {
            return Err(GeocodeError::InvalidInput(format!(
                "lookup takes between 1 and {MAX_LOOKUP_IDS} OSM ids, got {}",
                self.osm_ids.len()
            )));
        }
        let ids = self
            .osm_ids
            .iter()
            .map(|id| normalize_osm_id(id))
            .collect::<Result<Vec<_>>>()?;

        let d = RequestDescriptor::get("/lookup").param("osm_ids", ids.join(","));
        Ok(common.apply(d))
    }
}

fn normalize_osm_id(raw: &str) -> Result<String> {
    let id = raw.trim().to_ascii_uppercase();
    let mut chars = id.chars();
    let valid = matches!(chars.next(), Some('N' | 'W' | 'R'))
        && !chars.as_str().is_empty()
        && chars.all(|c| c.is_ascii_digit());
    if valid {
        Ok(id)
    } else {
        Err(GeocodeError::InvalidInput(format!(
            "OSM id must look like N123, W123 or R123, got {raw:?}"
        )))
    }
}

// ============================================================================
// Status
// ============================================================================

/// Service health check.
///
/// The status endpoint only knows plain text and JSON; any JSON output
/// format maps to `format=json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusQuery;

impl StatusQuery {
    pub fn to_descriptor(&self, format: OutputFormat) -> RequestDescriptor {
        let d = RequestDescriptor::get("/status");
        if format.is_json() {
            d.param("format", "json")
        } else {
            d
        }
    }
}
