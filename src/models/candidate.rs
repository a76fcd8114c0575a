/// A country that can appear as an answer.
///
/// Built once at catalog-ingestion time: `code` is the lowercase two-letter
/// country code used as the stable identifier, `name` is the display name
/// with any underscores already normalized to spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub code: String,
    pub name: String,
    pub region: String,
}

impl Candidate {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            region: region.into(),
        }
    }
}
