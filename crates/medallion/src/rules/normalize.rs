//! Text normalization and categorical code expansion.

/// Sentinel for unmapped, empty or missing categorical input.
pub const NOT_AVAILABLE: &str = "n/a";

/// Trim surrounding whitespace. Blank input becomes null.
pub fn trimmed(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Trim and upper-case, for comparison against coded values.
pub fn folded(raw: Option<&str>) -> Option<String> {
    raw.map(|s| s.trim().to_uppercase()).filter(|s| !s.is_empty())
}

/// An explicit code table mapping short codes to descriptive labels.
///
/// Codes are compared after trimming and case-folding. Unknown codes map to
/// [`NOT_AVAILABLE`], or, for a passthrough map, to the trimmed input itself.
/// Missing input always maps to [`NOT_AVAILABLE`].
#[derive(Debug, Clone, Copy)]
pub struct CodeMap {
    entries: &'static [(&'static str, &'static str)],
    passthrough: bool,
}

impl CodeMap {
    /// Closed code table: anything unknown is `n/a`.
    pub const fn closed(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            entries,
            passthrough: false,
        }
    }

    /// Open code table: unknown values are kept (trimmed).
    pub const fn passthrough(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            entries,
            passthrough: true,
        }
    }

    /// Expand a raw code to its label.
    pub fn expand(&self, raw: Option<&str>) -> String {
        let Some(code) = folded(raw) else {
            return NOT_AVAILABLE.to_string();
        };
        if let Some((_, label)) = self.entries.iter().find(|(c, _)| *c == code) {
            return label.to_string();
        }
        if self.passthrough {
            trimmed(raw).unwrap_or_else(|| NOT_AVAILABLE.to_string())
        } else {
            NOT_AVAILABLE.to_string()
        }
    }

    /// Every label a closed map can produce, sentinel included.
    pub fn vocabulary(&self) -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = Vec::new();
        for (_, label) in self.entries {
            if !labels.contains(label) {
                labels.push(*label);
            }
        }
        labels.push(NOT_AVAILABLE);
        labels
    }

    /// Whether unknown values are kept rather than mapped to the sentinel.
    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }
}

/// CRM single-letter gender codes.
pub const CRM_GENDER: CodeMap = CodeMap::closed(&[("F", "Female"), ("M", "Male")]);

/// ERP gender, which mixes letters and full words.
pub const ERP_GENDER: CodeMap = CodeMap::closed(&[
    ("F", "Female"),
    ("FEMALE", "Female"),
    ("M", "Male"),
    ("MALE", "Male"),
]);

/// CRM marital status codes.
pub const MARITAL_STATUS: CodeMap = CodeMap::closed(&[("S", "Single"), ("M", "Married")]);

/// CRM product line codes.
pub const PRODUCT_LINE: CodeMap = CodeMap::closed(&[
    ("M", "Mountain"),
    ("R", "Road"),
    ("S", "Other Sales"),
    ("T", "Touring"),
]);

/// ERP country codes; full country names pass through.
pub const COUNTRY: CodeMap = CodeMap::passthrough(&[
    ("DE", "Germany"),
    ("US", "United States"),
    ("USA", "United States"),
]);
