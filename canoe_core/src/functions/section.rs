//! Closed intervals `[x, rx]` along the canoe's length.

use serde::{Deserialize, Serialize};

use crate::errors::{CanoeError, CanoeResult};

/// A closed interval `[x, rx]` with `0 <= x < rx`.
///
/// Fields are private so the ordering can only change through the
/// validating setters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSection")]
pub struct Section {
    x: f64,
    rx: f64,
}

#[derive(Deserialize)]
struct RawSection {
    x: f64,
    rx: f64,
}

impl TryFrom<RawSection> for Section {
    type Error = CanoeError;

    fn try_from(raw: RawSection) -> CanoeResult<Self> {
        Section::new(raw.x, raw.rx)
    }
}

impl Section {
    /// Create a section, failing when `rx <= x` or `x < 0`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use canoe_core::functions::Section;
    ///
    /// let s = Section::new(1.0, 3.0).unwrap();
    /// assert_eq!(s.length(), 2.0);
    /// assert!(Section::new(3.0, 1.0).is_err());
    /// ```
    pub fn new(x: f64, rx: f64) -> CanoeResult<Self> {
        validate(x, rx)?;
        Ok(Section { x, rx })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn rx(&self) -> f64 {
        self.rx
    }

    /// Move the left endpoint, keeping the ordering invariant.
    pub fn set_x(&mut self, x: f64) -> CanoeResult<()> {
        validate(x, self.rx)?;
        self.x = x;
        Ok(())
    }

    /// Move the right endpoint, keeping the ordering invariant.
    pub fn set_rx(&mut self, rx: f64) -> CanoeResult<()> {
        validate(self.x, rx)?;
        self.rx = rx;
        Ok(())
    }

    pub fn length(&self) -> f64 {
        self.rx - self.x
    }

    pub fn midpoint(&self) -> f64 {
        (self.x + self.rx) / 2.0
    }

    /// Whether `x` lies in the closed interval.
    pub fn contains(&self, x: f64) -> bool {
        self.x <= x && x <= self.rx
    }

    /// The overlap of two sections, if it has positive length.
    pub fn intersection(&self, other: &Section) -> Option<Section> {
        let x = self.x.max(other.x);
        let rx = self.rx.min(other.rx);
        Section::new(x, rx).ok()
    }
}

fn validate(x: f64, rx: f64) -> CanoeResult<()> {
    if !x.is_finite() || !rx.is_finite() {
        return Err(CanoeError::invalid_input(
            "section",
            format!("[{}, {}]", x, rx),
            "Section endpoints must be finite",
        ));
    }
    if x < 0.0 {
        return Err(CanoeError::invalid_input(
            "section.x",
            x.to_string(),
            "Section must start at or after x = 0",
        ));
    }
    if rx <= x {
        return Err(CanoeError::invalid_input(
            "section.rx",
            rx.to_string(),
            format!("Section right endpoint must be greater than left endpoint {}", x),
        ));
    }
    Ok(())
}
